/// Module for reading through original source code.
pub mod source_buffer;

/// Module for turning source code into a list of tokens for further processing.
pub mod tokenizing;

/// Module defining the instructions that compiled word bodies are made of.
pub mod code;

/// Module for turning the token list into executed words and compiled definitions.
/// Immediate words run while the rest of the source is still being processed, so this
/// phase requires an active interpreter: the code being compiled takes part in
/// compiling the code.
pub mod compilation;
