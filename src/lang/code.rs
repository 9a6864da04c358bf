use crate::{
    lang::source_buffer::SourceLocation, runtime::data_structures::value_stack::Cell,
};
use std::fmt::{self, Display, Formatter};

/// The loop related operations.  `do`/`loop` compiles into a pair of these.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    /// Begin an iteration: pop the starting index, then the limit, from the data stack
    /// and open a new loop frame with them.
    Enter,

    /// Close an iteration: increment the innermost frame's index and jump back by
    /// `offset` while the index is still below the limit.  Once the limit is reached the
    /// frame is discarded and execution falls through.
    Next { offset: isize },
}

/// The operations that can appear in a compiled word body.
#[derive(Clone, PartialEq, Eq)]
pub enum Op {
    /// Push a literal cell onto the data stack.
    PushLiteral(Cell),

    /// Execute another word.  The name is resolved through the dictionary when the
    /// instruction runs, not when it is compiled, so redefinitions and self references
    /// behave as expected.
    CallWord(String),

    /// Transfer control within the body.  The offset is relative to this instruction's
    /// own index.  A conditional branch pops a cell and only jumps when it is zero
    /// (false); an unconditional branch always jumps.
    Branch { offset: isize, conditional: bool },

    /// One of the loop operations above.
    LoopMarker(LoopKind),
}

/// A single instruction of a compiled word, tagged with the source location it was
/// generated from.  Instructions synthesized by native code carry no location.
#[derive(Clone, PartialEq, Eq)]
pub struct Instruction {
    pub location: Option<SourceLocation>,
    pub op: Op,
}

impl Instruction {
    pub fn new(location: Option<SourceLocation>, op: Op) -> Instruction {
        Instruction { location, op }
    }
}

/// The body of a compiled word.
pub type ByteCode = Vec<Instruction>;

/// Instructions render in a disassembly style for logging and debugging.
impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.op {
            Op::PushLiteral(value) => write!(f, "PushLiteral  {}", value),
            Op::CallWord(name) => write!(f, "CallWord     {}", name),
            Op::Branch {
                offset,
                conditional: true,
            } => write!(f, "BranchIf0    {:+}", offset),
            Op::Branch {
                offset,
                conditional: false,
            } => write!(f, "Branch       {:+}", offset),
            Op::LoopMarker(LoopKind::Enter) => write!(f, "LoopEnter"),
            Op::LoopMarker(LoopKind::Next { offset }) => write!(f, "LoopNext     {:+}", offset),
        }
    }
}

/// Render a whole body with instruction indices, used by the word listing and when
/// tracing compilation.
pub fn pretty_print_code(code: &ByteCode) -> String {
    use std::fmt::Write;

    let mut result = String::with_capacity(code.len() * 24);

    for (index, instruction) in code.iter().enumerate() {
        writeln!(&mut result, "{:4}: {}", index, instruction)
            .expect("Writing to String should never fail.");
    }

    result
}
