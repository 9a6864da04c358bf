use crate::{
    add_native_immediate_word,
    runtime::{error, interpreter::Interpreter},
};

/// Start a new word definition.  The word's name is taken from the next token in the
/// source; running out of tokens instead is an unexpected end of input error.  A
/// number token's text is acceptable as a name, shadowing the literal.
fn word_start_definition(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let token = interpreter.next_token()?;
    let location = token.location().clone();
    let name = token.text();

    interpreter.construction_begin(name, location)
}

/// Finish the definition under construction and add it to the dictionary.  Fails,
/// registering nothing, if any control structure inside the body was left open.
fn word_end_definition(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.construction_finish()
}

/// Mark the definition under construction as immediate, so the finished word will
/// execute during compilation rather than being compiled into other words.
fn word_immediate(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.construction_mut()?.immediate = true;

    Ok(())
}

/// Register the word creation words.
pub fn register_word_creation_words(interpreter: &mut dyn Interpreter) {
    add_native_immediate_word!(
        interpreter,
        ":",
        word_start_definition,
        "Start a new word definition.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        ";",
        word_end_definition,
        "End the definition of the new word.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "immediate",
        word_immediate,
        "Mark the word being defined as immediate.",
        " -- "
    );
}
