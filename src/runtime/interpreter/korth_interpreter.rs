use crate::{
    lang::{
        code::{pretty_print_code, ByteCode, LoopKind, Op},
        compilation::{process_source_from_tokens, Construction},
        source_buffer::SourceLocation,
        tokenizing::{tokenize_from_source, Token, TokenList},
    },
    location_here,
    runtime::{
        data_structures::{
            dictionary::{DictEntry, Dictionary, Word},
            value_stack::{Cell, DataStack},
        },
        error::{self, script_error, script_error_at, ErrorKind},
        interpreter::{
            CallItem, CallStack, CodeManagement, Interpreter, InterpreterOutput,
            InterpreterStack, WordHandler, WordManagement,
        },
    },
};
use log::trace;
use std::{io::Write, rc::Rc};

/// How deeply word executions may nest before the session refuses to recurse further.
/// A runaway recursive definition trips this bound and reports a resource exhaustion
/// error instead of overrunning the host's own stack.
const MAX_CALL_DEPTH: usize = 512;

/// A token stream for one piece of source text being processed.  Streams stack up when
/// text processing nests, the innermost stream feeding tokens first.
struct TokenCursor {
    tokens: TokenList,
    index: usize,
}

impl TokenCursor {
    fn new(tokens: TokenList) -> TokenCursor {
        TokenCursor { tokens, index: 0 }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();

        if token.is_some() {
            self.index += 1;
        }

        token
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.index).cloned()
    }
}

/// The run time state of one `do` loop: the limit it counts toward and the current
/// index.
struct LoopFrame {
    limit: Cell,
    index: Cell,
}

/// An interpreter session.  Owns the data stack, the dictionary, the compilation
/// state, the active loop frames, the call stack, and the output sink.  Sessions are
/// fully independent of one another; nothing here is shared or global.
pub struct KorthInterpreter {
    /// The data stack all words operate on.
    stack: DataStack,

    /// The dictionary of defined words.
    dictionary: Dictionary,

    /// The definition under construction when the session is compiling, None while
    /// interpreting.  Survives between calls to process_source so a definition can
    /// span several lines of interactive input.
    construction: Option<Construction>,

    /// The stack of token streams for source texts being processed.
    contexts: Vec<TokenCursor>,

    /// Frames of the `do` loops currently running, innermost last.
    loop_stack: Vec<LoopFrame>,

    /// The last location execution reached in the source code.
    current_location: Option<SourceLocation>,

    /// The words currently executing, for error reporting.
    call_stack: CallStack,

    /// Where the printing words send their output.
    output: Box<dyn Write>,
}

impl KorthInterpreter {
    /// A fresh session writing to standard output.
    pub fn new() -> KorthInterpreter {
        KorthInterpreter::with_output(Box::new(std::io::stdout()))
    }

    /// A fresh session writing to the given sink.  Hosts and tests inject their own
    /// sink here to capture what the printing words produce.
    pub fn with_output(output: Box<dyn Write>) -> KorthInterpreter {
        KorthInterpreter {
            stack: DataStack::new(),
            dictionary: Dictionary::new(),
            construction: None,
            contexts: Vec::new(),
            loop_stack: Vec::new(),
            current_location: None,
            call_stack: CallStack::with_capacity(40),
            output,
        }
    }

    /// Pop the flag a conditional branch tests, or report that an unconditional branch
    /// always jumps.  Zero is false, and a false flag takes the jump.
    fn branch_taken(&mut self, conditional: bool) -> error::Result<bool> {
        if conditional {
            Ok(self.pop()? == 0)
        } else {
            Ok(true)
        }
    }

    /// Open a loop frame from the two cells `do` expects: the index on top, the limit
    /// beneath it.
    fn loop_enter(&mut self) -> error::Result<()> {
        let index = self.pop()?;
        let limit = self.pop()?;

        self.loop_stack.push(LoopFrame { limit, index });
        Ok(())
    }

    /// Advance the innermost loop.  Returns true when the loop should run another
    /// iteration, false once the index has reached the limit and the frame is
    /// discarded.
    fn loop_next(&mut self) -> error::Result<bool> {
        if self.loop_stack.is_empty() {
            return script_error(
                self,
                ErrorKind::UnbalancedControlStructure(
                    "loop iteration outside of a `do` loop".to_string(),
                ),
            );
        }

        let last = self.loop_stack.len() - 1;
        let frame = &mut self.loop_stack[last];

        frame.index += 1;

        if frame.index < frame.limit {
            Ok(true)
        } else {
            let _ = self.loop_stack.pop();
            Ok(false)
        }
    }
}

impl Default for KorthInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpreterStack for KorthInterpreter {
    fn stack(&self) -> &DataStack {
        &self.stack
    }

    fn push(&mut self, value: Cell) {
        self.stack.push(value);
    }

    fn pop(&mut self) -> error::Result<Cell> {
        match self.stack.pop() {
            Ok(value) => Ok(value),
            Err(underflow) => script_error(self, underflow.kind().clone()),
        }
    }

    fn peek(&self, depth: usize) -> error::Result<Cell> {
        match self.stack.peek(depth) {
            Ok(value) => Ok(value),
            Err(underflow) => script_error(self, underflow.kind().clone()),
        }
    }
}

impl CodeManagement for KorthInterpreter {
    fn try_next_token(&mut self) -> Option<Token> {
        self.contexts.last_mut().and_then(|cursor| cursor.next())
    }

    fn next_token(&mut self) -> error::Result<Token> {
        match self.try_next_token() {
            Some(token) => Ok(token),
            None => script_error(self, ErrorKind::UnexpectedEndOfInput),
        }
    }

    fn peek_next_token(&self) -> Option<Token> {
        self.contexts.last().and_then(|cursor| cursor.peek())
    }

    fn context_new(&mut self, tokens: TokenList) {
        self.contexts.push(TokenCursor::new(tokens));
    }

    fn context_drop(&mut self) {
        let _ = self.contexts.pop();
    }

    fn is_compiling(&self) -> bool {
        self.construction.is_some()
    }

    fn construction_begin(
        &mut self,
        name: String,
        location: SourceLocation,
    ) -> error::Result<()> {
        if self.construction.is_some() {
            return script_error_at(
                self,
                &location,
                ErrorKind::UnbalancedControlStructure(
                    "`:` inside another definition".to_string(),
                ),
            );
        }

        self.construction = Some(Construction::new(name, location));
        Ok(())
    }

    fn construction_mut(&mut self) -> error::Result<&mut Construction> {
        if self.construction.is_none() {
            return script_error(
                self,
                ErrorKind::UnbalancedControlStructure(
                    "no definition under construction".to_string(),
                ),
            );
        }

        Ok(self.construction.as_mut().unwrap())
    }

    fn construction_finish(&mut self) -> error::Result<()> {
        let construction = match self.construction.take() {
            Some(construction) => construction,
            None => {
                return script_error(
                    self,
                    ErrorKind::UnbalancedControlStructure(
                        "`;` outside of a definition".to_string(),
                    ),
                );
            }
        };

        // The definition was already taken out of the session, so failing here leaves
        // the word unregistered and the session interpreting again.
        if let Some(detail) = construction.unclosed_structure() {
            return script_error(self, ErrorKind::UnbalancedControlStructure(detail));
        }

        trace!(
            "compiled {}\n{}",
            construction.name,
            pretty_print_code(&construction.code)
        );

        self.dictionary.define(DictEntry {
            name: construction.name,
            word: Word::Composite(Rc::new(construction.code)),
            immediate: construction.immediate,
            description: String::new(),
            signature: String::new(),
            location: construction.location,
        });

        Ok(())
    }

    fn construction_abandon(&mut self) {
        self.construction = None;
    }

    fn process_source(&mut self, path: &str, source: &str) -> error::Result<()> {
        let tokens = tokenize_from_source(path, source);

        process_source_from_tokens(tokens, self)
    }

    fn execute_code(&mut self, _name: &str, code: &ByteCode) -> error::Result<()> {
        // Loop frames opened by this body must not outlive it if an error unwinds
        // through here.
        let entry_loop_depth = self.loop_stack.len();

        let mut pc = 0;

        while pc < code.len() {
            let instruction = &code[pc];

            if let Some(location) = &instruction.location {
                self.current_location = Some(location.clone());
            }

            let mut next_pc = pc + 1;

            let result = match &instruction.op {
                Op::PushLiteral(value) => {
                    self.push(*value);
                    Ok(())
                }

                Op::CallWord(word_name) => {
                    let location = instruction
                        .location
                        .clone()
                        .unwrap_or_else(|| location_here!());

                    self.execute_word_named(&location, word_name)
                }

                Op::Branch {
                    offset,
                    conditional,
                } => match self.branch_taken(*conditional) {
                    Ok(true) => {
                        next_pc = (pc as isize + offset) as usize;
                        Ok(())
                    }
                    Ok(false) => Ok(()),
                    Err(error) => Err(error),
                },

                Op::LoopMarker(LoopKind::Enter) => self.loop_enter(),

                Op::LoopMarker(LoopKind::Next { offset }) => match self.loop_next() {
                    Ok(true) => {
                        next_pc = (pc as isize + offset) as usize;
                        Ok(())
                    }
                    Ok(false) => Ok(()),
                    Err(error) => Err(error),
                },
            };

            if let Err(error) = result {
                self.loop_stack.truncate(entry_loop_depth);
                return Err(error);
            }

            pc = next_pc;
        }

        Ok(())
    }
}

impl WordManagement for KorthInterpreter {
    fn current_location(&self) -> &Option<SourceLocation> {
        &self.current_location
    }

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
    ) {
        let location = SourceLocation::new_from_info(&file, line, column);

        self.dictionary.define(DictEntry {
            name,
            word: Word::Primitive(handler),
            immediate,
            description,
            signature,
            location,
        });
    }

    fn find_word(&self, name: &str) -> Option<&DictEntry> {
        self.dictionary.try_get(name)
    }

    fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    fn execute_word(
        &mut self,
        location: &SourceLocation,
        entry: &DictEntry,
    ) -> error::Result<()> {
        if self.call_stack.len() >= MAX_CALL_DEPTH {
            return script_error(self, ErrorKind::ResourceExhausted);
        }

        trace!("executing {}", entry.name);

        self.current_location = Some(location.clone());
        self.call_stack
            .push(CallItem::new(entry.name.clone(), location.clone()));

        let result = match &entry.word {
            Word::Primitive(handler) => {
                let handler = handler.clone();
                (*handler)(self)
            }

            Word::Composite(code) => {
                let code = code.clone();
                let name = entry.name.clone();

                self.execute_code(&name, &code)
            }
        };

        let _ = self.call_stack.pop();

        result
    }

    fn execute_word_named(
        &mut self,
        location: &SourceLocation,
        name: &str,
    ) -> error::Result<()> {
        let found = self.dictionary.try_get(name).cloned();

        match found {
            Some(entry) => self.execute_word(location, &entry),
            None => {
                script_error_at(self, location, ErrorKind::UndefinedWord(name.to_string()))
            }
        }
    }

    fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }
}

impl InterpreterOutput for KorthInterpreter {
    fn output_mut(&mut self) -> &mut dyn Write {
        &mut *self.output
    }
}

impl Interpreter for KorthInterpreter {
    fn loop_index(&self, nesting: usize) -> Option<Cell> {
        self.loop_stack
            .iter()
            .rev()
            .nth(nesting)
            .map(|frame| frame.index)
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.loop_stack.clear();
        self.construction = None;
    }
}
