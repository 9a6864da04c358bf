use crate::{
    add_native_word,
    runtime::{error, interpreter::Interpreter},
};
use std::io::Write;

/// Pop and print the top of the stack, followed by a space.
///
/// Signature: `value -- `
fn word_print(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    write!(interpreter.output_mut(), "{} ", value)?;

    Ok(())
}

/// Pop the top of the stack and print it as a character.  Cells that are not valid
/// code points print the replacement character.
///
/// Signature: `value -- `
fn word_emit(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.pop()?;
    let character = char::from_u32(value as u32).unwrap_or(char::REPLACEMENT_CHARACTER);

    write!(interpreter.output_mut(), "{}", character)?;

    Ok(())
}

/// Print a new line.
///
/// Signature: ` -- `
fn word_cr(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    writeln!(interpreter.output_mut())?;

    Ok(())
}

/// Register the output words.  Everything here writes to the session's injected sink,
/// never straight to stdout.
pub fn register_io_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        ".",
        word_print,
        "Pop and print the top of the stack.",
        "value -- "
    );

    add_native_word!(
        interpreter,
        "emit",
        word_emit,
        "Pop the top of the stack and print it as a character.",
        "value -- "
    );

    add_native_word!(
        interpreter,
        "cr",
        word_cr,
        "Print a new line.",
        " -- "
    );

    add_native_word!(
        interpreter,
        "space",
        |interpreter: &mut dyn Interpreter| {
            write!(interpreter.output_mut(), " ")?;
            Ok(())
        },
        "Print a single space.",
        " -- "
    );

    add_native_word!(
        interpreter,
        "spaces",
        |interpreter: &mut dyn Interpreter| {
            let count = interpreter.pop()?;

            for _ in 0..count.max(0) {
                write!(interpreter.output_mut(), " ")?;
            }

            Ok(())
        },
        "Print the given number of spaces.",
        "n -- "
    );
}
