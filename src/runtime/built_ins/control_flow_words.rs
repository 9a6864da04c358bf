use crate::{
    add_native_immediate_word, add_native_word, location_here,
    lang::source_buffer::SourceLocation,
    runtime::{
        error::{self, script_error, ErrorKind},
        interpreter::Interpreter,
    },
};

/// The location of the structure word currently executing, for tagging the
/// instructions it compiles.
fn word_location(interpreter: &dyn Interpreter) -> SourceLocation {
    interpreter
        .current_location()
        .clone()
        .unwrap_or_else(|| location_here!())
}

/// `if`: compile a conditional forward branch to be patched by the matching `else` or
/// `then`.
fn word_if(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let location = word_location(interpreter);

    interpreter.construction_mut()?.begin_if(location);

    Ok(())
}

/// `else`: land the `if` branch here and compile a jump over the else block.
fn word_else(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let location = word_location(interpreter);
    let result = interpreter.construction_mut()?.begin_else(location);

    if let Err(kind) = result {
        return script_error(interpreter, kind);
    }

    Ok(())
}

/// `then`: land the pending branch at the current end of the body.
fn word_then(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let result = interpreter.construction_mut()?.close_then();

    if let Err(kind) = result {
        return script_error(interpreter, kind);
    }

    Ok(())
}

/// `do`: compile the loop entry.  At run time it takes the limit and the starting
/// index from the stack.
fn word_do(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let location = word_location(interpreter);

    interpreter.construction_mut()?.begin_do(location);

    Ok(())
}

/// `loop`: close the `do`, compiling the step-and-repeat back to the loop body.
fn word_loop(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let location = word_location(interpreter);
    let result = interpreter.construction_mut()?.close_loop(location);

    if let Err(kind) = result {
        return script_error(interpreter, kind);
    }

    Ok(())
}

/// `begin`: mark the top of an until loop.  Nothing is compiled.
fn word_begin(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.construction_mut()?.begin_begin();

    Ok(())
}

/// `until`: close the `begin`, compiling a branch back to it that repeats while the
/// flag on the stack is false.
fn word_until(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let location = word_location(interpreter);
    let result = interpreter.construction_mut()?.close_until(location);

    if let Err(kind) = result {
        return script_error(interpreter, kind);
    }

    Ok(())
}

/// `i`: the index of the innermost running `do` loop.
fn word_loop_index(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    match interpreter.loop_index(0) {
        Some(index) => {
            interpreter.push(index);
            Ok(())
        }

        None => script_error(
            interpreter,
            ErrorKind::UnbalancedControlStructure("`i` outside of a `do` loop".to_string()),
        ),
    }
}

/// `j`: the index of the next outer running `do` loop.
fn word_outer_loop_index(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    match interpreter.loop_index(1) {
        Some(index) => {
            interpreter.push(index);
            Ok(())
        }

        None => script_error(
            interpreter,
            ErrorKind::UnbalancedControlStructure("`j` outside of a nested `do` loop".to_string()),
        ),
    }
}

/// `(`: discard tokens through the first one ending in `)`.  Comments are ordinary
/// immediate words here, which is why they work the same while interpreting and while
/// compiling.
fn word_comment(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    loop {
        match interpreter.try_next_token() {
            Some(token) => {
                if token.text().ends_with(')') {
                    return Ok(());
                }
            }

            None => return script_error(interpreter, ErrorKind::UnexpectedEndOfInput),
        }
    }
}

/// `#`: discard the rest of the source line.
fn word_line_comment(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (path, line) = match interpreter.current_location() {
        Some(location) => (location.path().clone(), location.line()),
        None => return Ok(()),
    };

    while let Some(token) = interpreter.peek_next_token() {
        let location = token.location();

        if location.path() == &path && location.line() == line {
            let _ = interpreter.try_next_token();
        } else {
            break;
        }
    }

    Ok(())
}

/// Register the control flow words and the comment words.
pub fn register_control_flow_words(interpreter: &mut dyn Interpreter) {
    add_native_immediate_word!(
        interpreter,
        "if",
        word_if,
        "Run the following words only for a true flag.",
        "flag -- "
    );

    add_native_immediate_word!(
        interpreter,
        "else",
        word_else,
        "Run the following words only when the `if` flag was false.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "then",
        word_then,
        "Close an `if` or `if`/`else`.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "do",
        word_do,
        "Count from the starting index up to the limit.",
        "limit index -- "
    );

    add_native_immediate_word!(
        interpreter,
        "loop",
        word_loop,
        "Close a `do` loop.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "begin",
        word_begin,
        "Mark the top of an `until` loop.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "until",
        word_until,
        "Close a `begin` loop, repeating while the flag is false.",
        "flag -- "
    );

    add_native_word!(
        interpreter,
        "i",
        word_loop_index,
        "The index of the innermost `do` loop.",
        " -- index"
    );

    add_native_word!(
        interpreter,
        "j",
        word_outer_loop_index,
        "The index of the next outer `do` loop.",
        " -- index"
    );

    add_native_immediate_word!(
        interpreter,
        "(",
        word_comment,
        "Comment: skip everything through the closing `)`.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "#",
        word_line_comment,
        "Comment: skip the rest of the line.",
        " -- "
    );
}
