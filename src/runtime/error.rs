use crate::{
    lang::source_buffer::SourceLocation,
    runtime::interpreter::{CallStack, Interpreter},
};
use std::fmt::{self, Debug, Display, Formatter};

pub type Result<T> = std::result::Result<T, ScriptError>;

/// The ways a script can fail.  Every failure the interpreter can report is one of
/// these kinds, so hosts and tests can match on the kind rather than scrape message
/// text.
#[derive(Clone, PartialEq, Eq, thiserror::Error, Debug)]
pub enum ErrorKind {
    /// A word needed more values than the data stack held.
    #[error("Stack underflow.")]
    StackUnderflow,

    /// A division word was given a zero divisor.  The operands are left on the stack.
    #[error("Division by zero.")]
    DivisionByZero,

    /// A token was neither a number nor a name found in the dictionary.
    #[error("Undefined word {0}.")]
    UndefinedWord(String),

    /// A control structure did not open and close properly.  The detail names the
    /// violation, for example a `loop` with no open `do`.
    #[error("Unbalanced control structure: {0}.")]
    UnbalancedControlStructure(String),

    /// The token stream ended where another token was required, such as the name
    /// following `:`.
    #[error("Unexpected end of input.")]
    UnexpectedEndOfInput,

    /// Word calls nested past the interpreter's depth bound, usually runaway
    /// recursion.
    #[error("Call depth limit exceeded.")]
    ResourceExhausted,

    /// The output sink reported a write failure.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Any error that occurs while processing or executing a script.  Combines the failure
/// kind with the source location execution had reached and the script's call stack at
/// the time, when those are available.
#[derive(Clone)]
pub struct ScriptError {
    /// Which failure occurred.
    kind: ErrorKind,

    /// The location in the source code the error occurred, if available.
    location: Option<SourceLocation>,

    /// The script's call stack at the time of the error, if available.
    call_stack: Option<CallStack>,
}

impl std::error::Error for ScriptError {}

/// Pretty print the error: the location, the message, and the call stack when one was
/// captured.
impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}", location, self.kind)?,
            None => write!(f, "{}", self.kind)?,
        }

        if let Some(call_stack) = &self.call_stack {
            if !call_stack.is_empty() {
                write!(f, "\n\nCall stack\n")?;

                for item in call_stack.iter().rev() {
                    writeln!(f, "  {}", item)?;
                }
            }
        }

        Ok(())
    }
}

impl Debug for ScriptError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl ScriptError {
    /// Create a new ScriptError.
    pub fn new(
        kind: ErrorKind,
        location: Option<SourceLocation>,
        call_stack: Option<CallStack>,
    ) -> ScriptError {
        ScriptError {
            kind,
            location,
            call_stack,
        }
    }

    /// Create a new ScriptError already wrapped in a Result::Err.
    pub fn new_as_result<T>(
        kind: ErrorKind,
        location: Option<SourceLocation>,
        call_stack: Option<CallStack>,
    ) -> Result<T> {
        Err(ScriptError::new(kind, location, call_stack))
    }

    /// Which failure occurred.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// If available, the location in the source code the error occurred.
    pub fn location(&self) -> &Option<SourceLocation> {
        &self.location
    }

    /// If available, the script's call stack at the time of the error.
    pub fn call_stack(&self) -> &Option<CallStack> {
        &self.call_stack
    }
}

/// Sink write failures surface as script errors.
impl From<std::io::Error> for ScriptError {
    fn from(error: std::io::Error) -> ScriptError {
        ScriptError::new(ErrorKind::Io(error.to_string()), None, None)
    }
}

/// Convenience for reporting a failure from within the interpreter, capturing its
/// current location and call stack.
pub fn script_error<T>(interpreter: &dyn Interpreter, kind: ErrorKind) -> Result<T> {
    let location = interpreter.current_location().clone();
    let call_stack = interpreter.call_stack().clone();

    ScriptError::new_as_result(kind, location, Some(call_stack))
}

/// As `script_error`, but reporting from a specific source location instead of the
/// interpreter's current one.
pub fn script_error_at<T>(
    interpreter: &dyn Interpreter,
    location: &SourceLocation,
    kind: ErrorKind,
) -> Result<T> {
    let call_stack = interpreter.call_stack().clone();

    ScriptError::new_as_result(kind, Some(location.clone()), Some(call_stack))
}
