/// The data stack and its cell type.
pub mod value_stack;

/// The word dictionary.
pub mod dictionary;
