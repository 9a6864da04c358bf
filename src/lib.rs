//! Kernel Forth: a small Forth interpreter.
//!
//! The crate is split the way the interpreter works: [`lang`] covers the source side,
//! tokenizing text and compiling definitions into instruction bodies, while [`runtime`]
//! covers execution, the data stack, the dictionary, the built-in word set, and the
//! interpreter session that ties them together.
//!
//! A host embeds the interpreter by creating a session, registering the core word set,
//! and feeding it source text:
//!
//! ```
//! use korth::runtime::built_ins::register_core_words;
//! use korth::runtime::interpreter::korth_interpreter::KorthInterpreter;
//! use korth::runtime::interpreter::{CodeManagement, InterpreterStack};
//!
//! let mut interpreter = KorthInterpreter::new();
//!
//! register_core_words(&mut interpreter);
//! interpreter.process_source("<example>", ": square dup * ;  5 square").unwrap();
//!
//! assert_eq!(interpreter.pop().unwrap(), 25);
//! ```

/// The source side of the interpreter: source locations, tokenizing, instructions,
/// and compilation.
pub mod lang;

/// The execution side: the data stack, the dictionary, errors, the built-in words,
/// and the interpreter session.
pub mod runtime;
