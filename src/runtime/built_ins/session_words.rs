use crate::{
    add_native_word,
    runtime::{data_structures::value_stack::Cell, error, interpreter::Interpreter},
};
use std::io::Write;

/// Print the data stack without changing it, bottom first.
///
/// Signature: ` -- `
fn word_print_stack(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let cells: Vec<Cell> = interpreter.stack().cells().to_vec();
    let rendered = cells
        .iter()
        .map(|cell| cell.to_string())
        .collect::<Vec<String>>()
        .join(" ");

    writeln!(interpreter.output_mut(), "{}", rendered)?;

    Ok(())
}

/// Print the dictionary listing: every known name once, newest definition winning,
/// immediate words marked.
///
/// Signature: ` -- `
fn word_print_dictionary(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let listing = format!("{}", interpreter.dictionary());

    write!(interpreter.output_mut(), "{}", listing)?;

    Ok(())
}

/// Return the session to a clean slate: empty data stack, no active loops, no pending
/// definition.  The dictionary is untouched.
///
/// Signature: ` -- `
fn word_reset(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.reset();

    Ok(())
}

/// Register the session introspection words.
pub fn register_session_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        ".s",
        word_print_stack,
        "Print the data stack without changing it.",
        " -- "
    );

    add_native_word!(
        interpreter,
        ".w",
        word_print_dictionary,
        "Print the word dictionary.",
        " -- "
    );

    add_native_word!(
        interpreter,
        "reset",
        word_reset,
        "Clear the stack and any definition in progress.",
        " -- "
    );
}
