/// The arithmetic words.
pub mod arithmetic_words;

/// Words that manipulate the data stack.
pub mod stack_words;

/// Comparison and logic words.
pub mod math_logic_words;

/// Words that print to the session's output sink.
pub mod io_words;

/// Words that inspect or reset the session's state.
pub mod session_words;

/// Words that create new words.
pub mod word_creation_words;

/// The control flow and comment words.
pub mod control_flow_words;

use crate::runtime::{
    built_ins::{
        arithmetic_words::register_arithmetic_words,
        control_flow_words::register_control_flow_words, io_words::register_io_words,
        math_logic_words::register_math_logic_words, session_words::register_session_words,
        stack_words::register_stack_words, word_creation_words::register_word_creation_words,
    },
    interpreter::Interpreter,
};

/// Register the whole core word set with a session.  The host calls this once at
/// session creation; nothing in the executor assumes these words exist, so an
/// embedding host can register a different or smaller bootstrap set.
pub fn register_core_words(interpreter: &mut dyn Interpreter) {
    register_stack_words(interpreter);
    register_arithmetic_words(interpreter);
    register_math_logic_words(interpreter);
    register_io_words(interpreter);
    register_session_words(interpreter);
    register_word_creation_words(interpreter);
    register_control_flow_words(interpreter);
}
