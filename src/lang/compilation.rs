use crate::{
    lang::{
        code::{ByteCode, Instruction, LoopKind, Op},
        source_buffer::SourceLocation,
        tokenizing::{Token, TokenList},
    },
    runtime::{
        data_structures::dictionary::{DictEntry, Dictionary},
        error::{self, script_error_at, ErrorKind},
        interpreter::Interpreter,
    },
};

/// An open control structure within the definition being compiled.  Each records the
/// body position that will need patching or jumping back to when the structure closes.
enum ControlStructure {
    /// An `if` whose forward branch is waiting for its `else` or `then`.
    If { branch: usize },

    /// An `else` whose forward branch is waiting for its `then`.
    Else { branch: usize },

    /// A `do` recording where its loop body starts.
    Do { body_start: usize },

    /// A `begin` recording where its loop body starts.
    Begin { body_start: usize },
}

impl ControlStructure {
    /// How the structure reads in an unbalanced structure report.
    fn describe(&self) -> &'static str {
        match self {
            ControlStructure::If { .. } => "`if` without `then`",
            ControlStructure::Else { .. } => "`else` without `then`",
            ControlStructure::Do { .. } => "`do` without `loop`",
            ControlStructure::Begin { .. } => "`begin` without `until`",
        }
    }
}

/// A word definition being built up between `:` and `;`.  The control flow words work
/// against the structure stack kept here, and any imbalance is caught either at the
/// offending token or, for structures never closed, when the definition is finalized.
pub struct Construction {
    /// The new word's name as written in the source.
    pub name: String,

    /// Where the definition started.
    pub location: SourceLocation,

    /// Was the definition marked immediate?
    pub immediate: bool,

    /// The body compiled so far.
    pub code: ByteCode,

    /// Control structures opened but not yet closed.
    open_structures: Vec<ControlStructure>,
}

impl Construction {
    pub fn new(name: String, location: SourceLocation) -> Construction {
        Construction {
            name,
            location,
            immediate: false,
            code: ByteCode::new(),
            open_structures: Vec::new(),
        }
    }

    /// Append an instruction to the body.
    pub fn push_instruction(&mut self, instruction: Instruction) {
        self.code.push(instruction);
    }

    /// If any structure is still open, the description of the innermost one.  A
    /// definition may only be registered when this is None.
    pub fn unclosed_structure(&self) -> Option<String> {
        self.open_structures
            .last()
            .map(|structure| structure.describe().to_string())
    }

    /// `if`: append a placeholder conditional branch and remember it for patching.
    pub fn begin_if(&mut self, location: SourceLocation) {
        let branch = self.code.len();

        self.code.push(Instruction::new(
            Some(location),
            Op::Branch {
                offset: 0,
                conditional: true,
            },
        ));
        self.open_structures.push(ControlStructure::If { branch });
    }

    /// `else`: close the pending `if` branch so it jumps past the else block, and open
    /// an unconditional branch that will jump over it to the `then`.
    pub fn begin_else(&mut self, location: SourceLocation) -> Result<(), ErrorKind> {
        match self.open_structures.pop() {
            Some(ControlStructure::If { branch }) => {
                let else_branch = self.code.len();

                self.code.push(Instruction::new(
                    Some(location),
                    Op::Branch {
                        offset: 0,
                        conditional: false,
                    },
                ));

                // The failed test skips to the instruction following the unconditional
                // branch just appended.
                self.patch_branch(branch, self.code.len());
                self.open_structures.push(ControlStructure::Else {
                    branch: else_branch,
                });

                Ok(())
            }

            Some(other) => {
                self.open_structures.push(other);
                Err(ErrorKind::UnbalancedControlStructure(
                    "`else` without an open `if`".to_string(),
                ))
            }

            None => Err(ErrorKind::UnbalancedControlStructure(
                "`else` without an open `if`".to_string(),
            )),
        }
    }

    /// `then`: close the pending branch, conditional (`if`) or not (`else`), landing it
    /// at the current end of the body.
    pub fn close_then(&mut self) -> Result<(), ErrorKind> {
        match self.open_structures.pop() {
            Some(ControlStructure::If { branch }) | Some(ControlStructure::Else { branch }) => {
                self.patch_branch(branch, self.code.len());
                Ok(())
            }

            Some(other) => {
                self.open_structures.push(other);
                Err(ErrorKind::UnbalancedControlStructure(
                    "`then` without an open `if`".to_string(),
                ))
            }

            None => Err(ErrorKind::UnbalancedControlStructure(
                "`then` without an open `if`".to_string(),
            )),
        }
    }

    /// `do`: append the loop entry instruction and record where the body starts.
    pub fn begin_do(&mut self, location: SourceLocation) {
        self.code
            .push(Instruction::new(Some(location), Op::LoopMarker(LoopKind::Enter)));

        let body_start = self.code.len();

        self.open_structures.push(ControlStructure::Do { body_start });
    }

    /// `loop`: close the pending `do` with a back reference to its body start.
    pub fn close_loop(&mut self, location: SourceLocation) -> Result<(), ErrorKind> {
        match self.open_structures.pop() {
            Some(ControlStructure::Do { body_start }) => {
                let here = self.code.len();
                let offset = body_start as isize - here as isize;

                self.code.push(Instruction::new(
                    Some(location),
                    Op::LoopMarker(LoopKind::Next { offset }),
                ));

                Ok(())
            }

            Some(other) => {
                self.open_structures.push(other);
                Err(ErrorKind::UnbalancedControlStructure(
                    "`loop` without an open `do`".to_string(),
                ))
            }

            None => Err(ErrorKind::UnbalancedControlStructure(
                "`loop` without an open `do`".to_string(),
            )),
        }
    }

    /// `begin`: no instruction is emitted, only the body position is recorded.
    pub fn begin_begin(&mut self) {
        let body_start = self.code.len();

        self.open_structures
            .push(ControlStructure::Begin { body_start });
    }

    /// `until`: close the pending `begin` with a conditional branch back to it.  A
    /// false flag repeats the loop, a true flag falls through.
    pub fn close_until(&mut self, location: SourceLocation) -> Result<(), ErrorKind> {
        match self.open_structures.pop() {
            Some(ControlStructure::Begin { body_start }) => {
                let here = self.code.len();
                let offset = body_start as isize - here as isize;

                self.code.push(Instruction::new(
                    Some(location),
                    Op::Branch {
                        offset,
                        conditional: true,
                    },
                ));

                Ok(())
            }

            Some(other) => {
                self.open_structures.push(other);
                Err(ErrorKind::UnbalancedControlStructure(
                    "`until` without an open `begin`".to_string(),
                ))
            }

            None => Err(ErrorKind::UnbalancedControlStructure(
                "`until` without an open `begin`".to_string(),
            )),
        }
    }

    /// Point the branch at `branch` to the absolute body position `target`.
    fn patch_branch(&mut self, branch: usize, target: usize) {
        if let Op::Branch { offset, .. } = &mut self.code[branch].op {
            *offset = target as isize - branch as isize;
        }
    }
}

/// Compile a call to the named word into the definition under construction.  Calls
/// are by name and resolve through the dictionary each time they run.
fn compile_call(
    interpreter: &mut dyn Interpreter,
    location: &SourceLocation,
    name: String,
) -> error::Result<()> {
    interpreter
        .construction_mut()?
        .push_instruction(Instruction::new(
            Some(location.clone()),
            Op::CallWord(name),
        ));

    Ok(())
}

/// Handle a token that resolved to a dictionary entry: execute it right away while
/// interpreting, or when the entry is marked immediate; otherwise compile a call to it
/// into the definition under construction.
fn dispatch_entry(
    interpreter: &mut dyn Interpreter,
    location: &SourceLocation,
    entry: DictEntry,
) -> error::Result<()> {
    if entry.immediate || !interpreter.is_compiling() {
        interpreter.execute_word(location, &entry)
    } else {
        // The entry's stored name is already normalized, so the compiled call will
        // resolve no matter how the source spelled it.
        compile_call(interpreter, location, entry.name.clone())
    }
}

/// Dispatch a single token.  The dictionary is consulted first, so a definition can
/// shadow even a numeric literal; a number that names no word pushes or compiles a
/// literal depending on the mode.
///
/// While compiling, a word that is not in the dictionary still compiles into a call:
/// resolution is deferred to the moment the call runs, which is what lets a
/// definition call itself by name before its own `;` is processed.  While
/// interpreting, an unknown word is an undefined word error at that token.
pub fn process_token(interpreter: &mut dyn Interpreter, token: Token) -> error::Result<()> {
    match token {
        Token::Number(location, number) => {
            if let Some(entry) = interpreter.find_word(&number.to_string()).cloned() {
                return dispatch_entry(interpreter, &location, entry);
            }

            if interpreter.is_compiling() {
                interpreter
                    .construction_mut()?
                    .push_instruction(Instruction::new(Some(location), Op::PushLiteral(number)));
            } else {
                interpreter.push(number);
            }

            Ok(())
        }

        Token::Word(location, name) => {
            let found = interpreter.find_word(&name).cloned();

            match found {
                Some(entry) => dispatch_entry(interpreter, &location, entry),

                None if interpreter.is_compiling() => {
                    compile_call(interpreter, &location, Dictionary::normalize_name(&name))
                }

                None => script_error_at(interpreter, &location, ErrorKind::UndefinedWord(name)),
            }
        }
    }
}

/// The outer interpreter loop: feed a token list through `process_token` one token at
/// a time.  The first failure abandons any definition under construction, so a broken
/// definition is never registered, and aborts the rest of this text.  The session
/// itself remains valid and the host is free to process its next input.
pub fn process_source_from_tokens(
    tokens: TokenList,
    interpreter: &mut dyn Interpreter,
) -> error::Result<()> {
    interpreter.context_new(tokens);

    let mut result = Ok(());

    while let Some(token) = interpreter.try_next_token() {
        if let Err(error) = process_token(interpreter, token) {
            interpreter.construction_abandon();
            result = Err(error);
            break;
        }
    }

    interpreter.context_drop();

    result
}
