use crate::{
    add_native_word,
    runtime::{data_structures::value_stack::Cell, error, interpreter::Interpreter},
};

/// The canonical flag values: all bits set for true, zero for false.  Anything
/// non-zero tests as true at a branch, but the comparison words always produce these.
fn flag(test: bool) -> Cell {
    if test { -1 } else { 0 }
}

/// Compare the top two values with the given operation, leaving a flag.
fn word_compare(
    interpreter: &mut dyn Interpreter,
    compare: fn(Cell, Cell) -> bool,
) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(flag(compare(a, b)));

    Ok(())
}

/// Register the comparison and logic words.
pub fn register_math_logic_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        "=",
        |interpreter: &mut dyn Interpreter| word_compare(interpreter, |a, b| a == b),
        "Are the top two values equal?",
        "a b -- flag"
    );

    add_native_word!(
        interpreter,
        "<>",
        |interpreter: &mut dyn Interpreter| word_compare(interpreter, |a, b| a != b),
        "Are the top two values different?",
        "a b -- flag"
    );

    add_native_word!(
        interpreter,
        "<",
        |interpreter: &mut dyn Interpreter| word_compare(interpreter, |a, b| a < b),
        "Is the second value less than the top?",
        "a b -- flag"
    );

    add_native_word!(
        interpreter,
        "<=",
        |interpreter: &mut dyn Interpreter| word_compare(interpreter, |a, b| a <= b),
        "Is the second value at most the top?",
        "a b -- flag"
    );

    add_native_word!(
        interpreter,
        ">",
        |interpreter: &mut dyn Interpreter| word_compare(interpreter, |a, b| a > b),
        "Is the second value greater than the top?",
        "a b -- flag"
    );

    add_native_word!(
        interpreter,
        ">=",
        |interpreter: &mut dyn Interpreter| word_compare(interpreter, |a, b| a >= b),
        "Is the second value at least the top?",
        "a b -- flag"
    );

    add_native_word!(
        interpreter,
        "and",
        |interpreter: &mut dyn Interpreter| {
            let b = interpreter.pop()?;
            let a = interpreter.pop()?;
            interpreter.push(a & b);
            Ok(())
        },
        "Bitwise and of the top two values.  On canonical flags this is logical and.",
        "a b -- a&b"
    );

    add_native_word!(
        interpreter,
        "or",
        |interpreter: &mut dyn Interpreter| {
            let b = interpreter.pop()?;
            let a = interpreter.pop()?;
            interpreter.push(a | b);
            Ok(())
        },
        "Bitwise or of the top two values.  On canonical flags this is logical or.",
        "a b -- a|b"
    );

    add_native_word!(
        interpreter,
        "not",
        |interpreter: &mut dyn Interpreter| {
            let a = interpreter.pop()?;
            interpreter.push(flag(a == 0));
            Ok(())
        },
        "Invert a flag: zero becomes true, anything else becomes false.",
        "flag -- flag"
    );

    add_native_word!(
        interpreter,
        "true",
        |interpreter: &mut dyn Interpreter| {
            interpreter.push(flag(true));
            Ok(())
        },
        "Push the canonical true flag.",
        " -- -1"
    );

    add_native_word!(
        interpreter,
        "false",
        |interpreter: &mut dyn Interpreter| {
            interpreter.push(flag(false));
            Ok(())
        },
        "Push the false flag.",
        " -- 0"
    );
}
