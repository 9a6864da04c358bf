use crate::{
    lang::{
        code::ByteCode,
        compilation::Construction,
        source_buffer::SourceLocation,
        tokenizing::{Token, TokenList},
    },
    runtime::{
        data_structures::{
            dictionary::{DictEntry, Dictionary},
            value_stack::{Cell, DataStack},
        },
        error,
    },
};
use std::{
    fmt::{self, Display, Formatter},
    io::Write,
    rc::Rc,
};

pub mod korth_interpreter;

/// A record of one word execution in flight: the word's name and the location it was
/// called from.  Read-only, used for error reporting.
#[derive(Clone)]
pub struct CallItem {
    location: SourceLocation,
    word: String,
}

impl CallItem {
    pub fn new(word: String, location: SourceLocation) -> CallItem {
        CallItem { location, word }
    }

    /// Where the word was called from.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// The name of the word being executed.
    pub fn word(&self) -> &String {
        &self.word
    }
}

impl Display for CallItem {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.word)
    }
}

/// The words currently being executed, innermost last.  Snapshots of this stack ride
/// along on errors to give the user a script level trace.
pub type CallStack = Vec<CallItem>;

/// The function signature of a native word.  Can be a function or a closure.
pub type WordHandler = dyn Fn(&mut dyn Interpreter) -> error::Result<()>;

/// Trait for working with the session's data stack.  This is the primary way words
/// receive inputs and produce outputs.
pub trait InterpreterStack {
    /// Direct access to the data stack, for words that inspect it wholesale.
    fn stack(&self) -> &DataStack;

    /// Push a cell onto the data stack.
    fn push(&mut self, value: Cell);

    /// Pop the top cell.  Fails with a stack underflow error if the stack is empty.
    fn pop(&mut self) -> error::Result<Cell>;

    /// Read a cell without removing it, depth 0 being the top.  Same failure mode as
    /// pop.
    fn peek(&self, depth: usize) -> error::Result<Cell>;
}

/// Trait for managing the token stream and the compilation state.  The immediate words
/// use these to read ahead in the source and to build up definitions.
pub trait CodeManagement {
    /// Take the next token from the current source context, or None at the end of the
    /// text.
    fn try_next_token(&mut self) -> Option<Token>;

    /// Take the next token, failing with an unexpected end of input error if the text
    /// has run out.  Used by words like `:` that require something to follow them.
    fn next_token(&mut self) -> error::Result<Token>;

    /// Look at the next token without consuming it.
    fn peek_next_token(&self) -> Option<Token>;

    /// Push a new token stream for a piece of source text being processed.
    fn context_new(&mut self, tokens: TokenList);

    /// Drop the current token stream once its text is fully processed.
    fn context_drop(&mut self);

    /// Is a definition currently under construction?
    fn is_compiling(&self) -> bool;

    /// Open a new definition.  Fails if a definition is already open.
    fn construction_begin(
        &mut self,
        name: String,
        location: SourceLocation,
    ) -> error::Result<()>;

    /// The definition currently under construction.  Fails if there is none, which is
    /// how the compile-only words report being used outside a definition.
    fn construction_mut(&mut self) -> error::Result<&mut Construction>;

    /// Validate and register the definition under construction, returning the session
    /// to interpreting mode.  Fails, registering nothing, if control structures were
    /// left open or no definition was in progress.
    fn construction_finish(&mut self) -> error::Result<()>;

    /// Discard any definition under construction.  Called when an error aborts
    /// processing so a half built word is never registered.
    fn construction_abandon(&mut self);

    /// Tokenize and process a piece of source text against this session.  The path is
    /// a file name or a descriptive tag such as "\<repl\>" used in locations and error
    /// reports.
    fn process_source(&mut self, path: &str, source: &str) -> error::Result<()>;

    /// Execute a compiled body, associating a name with it for call stack reporting.
    fn execute_code(&mut self, name: &str, code: &ByteCode) -> error::Result<()>;
}

/// Trait for managing and executing the words known to the session.
pub trait WordManagement {
    /// The location execution has most recently reached, if any.
    fn current_location(&self) -> &Option<SourceLocation>;

    /// Register a word in the dictionary.  Usually invoked through the
    /// `add_native_word!` and `add_native_immediate_word!` macros, which capture the
    /// registration site in the Rust sources.
    #[allow(clippy::too_many_arguments)]
    fn add_word(
        &mut self,
        file: String,
        line: usize,
        column: usize,
        name: String,
        handler: Rc<WordHandler>,
        description: String,
        signature: String,
        immediate: bool,
    );

    /// Find a word in the dictionary.  Lookup is case-insensitive and returns the
    /// newest definition of the name.
    fn find_word(&self, name: &str) -> Option<&DictEntry>;

    /// The session's word dictionary.
    fn dictionary(&self) -> &Dictionary;

    /// Execute a resolved dictionary entry.  The location says where the call came
    /// from; use `location_here!()` when executing from native code.
    fn execute_word(
        &mut self,
        location: &SourceLocation,
        entry: &DictEntry,
    ) -> error::Result<()>;

    /// Look a word up by name and execute it.  Fails with an undefined word error if
    /// the name was never defined.
    fn execute_word_named(&mut self, location: &SourceLocation, name: &str)
        -> error::Result<()>;

    /// The current script call stack.
    fn call_stack(&self) -> &CallStack;
}

/// Trait for the session's output.  Printing words write here rather than straight to
/// stdout so that the host decides where output lands; tests capture it through a
/// shared buffer.
pub trait InterpreterOutput {
    /// The sink all printing words write to.
    fn output_mut(&mut self) -> &mut dyn Write;
}

/// The full interpreter session interface: stack, token stream and compilation state,
/// dictionary, and output, plus the few operations that span them.
pub trait Interpreter:
    InterpreterStack + CodeManagement + WordManagement + InterpreterOutput
{
    /// The index of an active `do` loop, 0 being the innermost.  None when no loop at
    /// that nesting depth is running.  Behind the `i` and `j` words.
    fn loop_index(&self, nesting: usize) -> Option<Cell>;

    /// Clear the data stack, the active loop frames, and any definition under
    /// construction.  The dictionary keeps all of its entries.
    fn reset(&mut self);
}

/// Register a native word with an interpreter session, recording where in the Rust
/// sources the registration happened.
///
/// Takes the session, the word's name, its handler, a short description, and its stack
/// signature.
#[macro_export]
macro_rules! add_native_word {
    (
        $interpreter:expr ,
        $name:expr ,
        $function:expr ,
        $description:expr ,
        $signature:expr
    ) => {{
        use std::rc::Rc;

        $interpreter.add_word(
            file!().to_string(),
            line!() as usize,
            column!() as usize,
            $name.to_string(),
            Rc::new($function),
            $description.to_string(),
            $signature.to_string(),
            false,
        );
    }};
}

/// As `add_native_word!`, but the word is marked immediate: it executes during
/// compilation rather than being compiled into the definition under construction.
#[macro_export]
macro_rules! add_native_immediate_word {
    (
        $interpreter:expr ,
        $name:expr ,
        $function:expr ,
        $description:expr ,
        $signature:expr
    ) => {{
        use std::rc::Rc;

        $interpreter.add_word(
            file!().to_string(),
            line!() as usize,
            column!() as usize,
            $name.to_string(),
            Rc::new($function),
            $description.to_string(),
            $signature.to_string(),
            true,
        );
    }};
}
