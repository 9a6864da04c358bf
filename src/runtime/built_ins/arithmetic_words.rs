use crate::{
    add_native_word,
    runtime::{
        error::{self, script_error, ErrorKind},
        interpreter::Interpreter,
    },
};

/// Add the top two values.
///
/// Signature: `a b -- a+b`
fn word_add(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a + b);

    Ok(())
}

/// Subtract the top value from the one beneath it.
///
/// Signature: `a b -- a-b`
fn word_subtract(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a - b);

    Ok(())
}

/// Multiply the top two values.
///
/// Signature: `a b -- a*b`
fn word_multiply(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a * b);

    Ok(())
}

/// Divide the second value by the top value, truncating.  A zero divisor is reported
/// as a division by zero error with both operands pushed back, so the stack is exactly
/// as it was before the word ran.
///
/// Signature: `a b -- a/b`
fn word_divide(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let divisor = interpreter.pop()?;
    let dividend = interpreter.pop()?;

    if divisor == 0 {
        interpreter.push(dividend);
        interpreter.push(divisor);

        return script_error(interpreter, ErrorKind::DivisionByZero);
    }

    interpreter.push(dividend.wrapping_div(divisor));

    Ok(())
}

/// Remainder after dividing the second value by the top value.  Fails like `/` on a
/// zero divisor, leaving the operands in place.
///
/// Signature: `a b -- a%b`
fn word_modulo(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let divisor = interpreter.pop()?;
    let dividend = interpreter.pop()?;

    if divisor == 0 {
        interpreter.push(dividend);
        interpreter.push(divisor);

        return script_error(interpreter, ErrorKind::DivisionByZero);
    }

    interpreter.push(dividend.wrapping_rem(divisor));

    Ok(())
}

/// Remainder and quotient in one step.  Fails like `/` on a zero divisor, leaving the
/// operands in place.
///
/// Signature: `a b -- rem quot`
fn word_divide_modulo(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let divisor = interpreter.pop()?;
    let dividend = interpreter.pop()?;

    if divisor == 0 {
        interpreter.push(dividend);
        interpreter.push(divisor);

        return script_error(interpreter, ErrorKind::DivisionByZero);
    }

    interpreter.push(dividend.wrapping_rem(divisor));
    interpreter.push(dividend.wrapping_div(divisor));

    Ok(())
}

/// Register the arithmetic words.
pub fn register_arithmetic_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        "+",
        word_add,
        "Add the top two values.",
        "a b -- a+b"
    );

    add_native_word!(
        interpreter,
        "-",
        word_subtract,
        "Subtract the top value from the second.",
        "a b -- a-b"
    );

    add_native_word!(
        interpreter,
        "*",
        word_multiply,
        "Multiply the top two values.",
        "a b -- a*b"
    );

    add_native_word!(
        interpreter,
        "/",
        word_divide,
        "Divide the second value by the top value.",
        "a b -- a/b"
    );

    add_native_word!(
        interpreter,
        "mod",
        word_modulo,
        "Remainder after dividing the second value by the top.",
        "a b -- a%b"
    );

    add_native_word!(
        interpreter,
        "/mod",
        word_divide_modulo,
        "Remainder and quotient of dividing the second value by the top.",
        "a b -- rem quot"
    );

    add_native_word!(
        interpreter,
        "1+",
        |interpreter: &mut dyn Interpreter| {
            let a = interpreter.pop()?;
            interpreter.push(a + 1);
            Ok(())
        },
        "Add 1 to the top of the stack.",
        "n -- n+1"
    );

    add_native_word!(
        interpreter,
        "1-",
        |interpreter: &mut dyn Interpreter| {
            let a = interpreter.pop()?;
            interpreter.push(a - 1);
            Ok(())
        },
        "Subtract 1 from the top of the stack.",
        "n -- n-1"
    );

    add_native_word!(
        interpreter,
        "2*",
        |interpreter: &mut dyn Interpreter| {
            let a = interpreter.pop()?;
            interpreter.push(a * 2);
            Ok(())
        },
        "Multiply the top of the stack by 2.",
        "n -- n*2"
    );

    add_native_word!(
        interpreter,
        "2/",
        |interpreter: &mut dyn Interpreter| {
            let a = interpreter.pop()?;
            interpreter.push(a / 2);
            Ok(())
        },
        "Divide the top of the stack by 2.",
        "n -- n/2"
    );

    add_native_word!(
        interpreter,
        "abs",
        |interpreter: &mut dyn Interpreter| {
            let a = interpreter.pop()?;
            interpreter.push(a.wrapping_abs());
            Ok(())
        },
        "Absolute value of the top of the stack.",
        "n -- |n|"
    );

    add_native_word!(
        interpreter,
        "negate",
        |interpreter: &mut dyn Interpreter| {
            let a = interpreter.pop()?;
            interpreter.push(a.wrapping_neg());
            Ok(())
        },
        "Negate the top of the stack.",
        "n -- -n"
    );

    add_native_word!(
        interpreter,
        "min",
        |interpreter: &mut dyn Interpreter| {
            let b = interpreter.pop()?;
            let a = interpreter.pop()?;
            interpreter.push(a.min(b));
            Ok(())
        },
        "Keep the smaller of the top two values.",
        "a b -- min"
    );

    add_native_word!(
        interpreter,
        "max",
        |interpreter: &mut dyn Interpreter| {
            let b = interpreter.pop()?;
            let a = interpreter.pop()?;
            interpreter.push(a.max(b));
            Ok(())
        },
        "Keep the larger of the top two values.",
        "a b -- max"
    );
}
