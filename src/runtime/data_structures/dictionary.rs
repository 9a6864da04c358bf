use crate::{
    lang::{code::ByteCode, source_buffer::SourceLocation},
    runtime::interpreter::WordHandler,
};
use log::debug;
use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    rc::Rc,
};

/// An executable word.  The two kinds are a closed set and the executor pattern
/// matches on them exhaustively.
#[derive(Clone)]
pub enum Word {
    /// A native word implemented in Rust.
    Primitive(Rc<WordHandler>),

    /// A word defined in Forth with `: name ... ;`.  The body is fixed when the
    /// definition completes; the words it calls are still resolved by name each time it
    /// runs.
    Composite(Rc<ByteCode>),
}

/// The information stored in the dictionary for each defined word.
#[derive(Clone)]
pub struct DictEntry {
    /// The word's name, stored uppercase.  Lookup is case-insensitive.
    pub name: String,

    /// The word's definition.
    pub word: Word,

    /// Immediate words execute during compilation instead of being compiled into the
    /// definition under construction.  The structure words and comment words rely on
    /// this, and user definitions may opt in with the `immediate` marker.
    pub immediate: bool,

    /// A short description of what the word does, shown in the dictionary listing.
    pub description: String,

    /// The word's stack signature, for documentation.
    pub signature: String,

    /// Where the word was defined, in Forth or Rust source.
    pub location: SourceLocation,
}

/// The dictionary of words known to an interpreter session.  Definitions are only ever
/// appended: redefining a name shadows the older entry rather than replacing it, so
/// compiled references can always resolve to something as long as the name was defined
/// at least once.
#[derive(Default)]
pub struct Dictionary {
    /// Every definition ever made, oldest first.
    entries: Vec<DictEntry>,

    /// Normalized name to the index of its newest definition.
    newest: HashMap<String, usize>,
}

impl Dictionary {
    pub fn new() -> Dictionary {
        Dictionary {
            entries: Vec::new(),
            newest: HashMap::new(),
        }
    }

    /// Names are matched case-insensitively, following the classic word set.  Both
    /// definition and lookup normalize through here.
    pub fn normalize_name(name: &str) -> String {
        name.to_uppercase()
    }

    /// Add a definition, shadowing any earlier entry with the same name.
    pub fn define(&mut self, mut entry: DictEntry) {
        entry.name = Dictionary::normalize_name(&entry.name);

        debug!("defining word {}", entry.name);

        let index = self.entries.len();

        self.newest.insert(entry.name.clone(), index);
        self.entries.push(entry);
    }

    /// Find the newest definition of a name, if the name was ever defined.
    pub fn try_get(&self, name: &str) -> Option<&DictEntry> {
        self.newest
            .get(&Dictionary::normalize_name(name))
            .map(|&index| &self.entries[index])
    }

    /// How many definitions have been made, shadowed entries included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The visible entries: the newest definition of each name.
    fn merged(&self) -> Vec<&DictEntry> {
        let mut entries: Vec<&DictEntry> =
            self.newest.values().map(|&index| &self.entries[index]).collect();

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}

/// Pretty print the dictionary.  Each name appears once, showing only its newest
/// definition, with immediate words marked.  This is the listing behind the `.w` word.
impl Display for Dictionary {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let merged = self.merged();
        let max_size = merged.iter().map(|entry| entry.name.len()).max().unwrap_or(0);

        writeln!(formatter, "{} words defined.", merged.len())?;
        writeln!(formatter)?;

        for entry in merged.iter() {
            let marker = if entry.immediate { "  immediate" } else { "           " };

            writeln!(
                formatter,
                "{:width$}{}  --  {}",
                entry.name,
                marker,
                entry.description,
                width = max_size
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location_here;

    fn entry(name: &str, description: &str) -> DictEntry {
        DictEntry {
            name: name.to_string(),
            word: Word::Composite(Rc::new(Vec::new())),
            immediate: false,
            description: description.to_string(),
            signature: String::new(),
            location: location_here!(),
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut dictionary = Dictionary::new();

        dictionary.define(entry("dup", ""));

        assert!(dictionary.try_get("DUP").is_some());
        assert!(dictionary.try_get("Dup").is_some());
        assert!(dictionary.try_get("dup").is_some());
    }

    #[test]
    fn redefinition_shadows_without_deleting() {
        let mut dictionary = Dictionary::new();

        dictionary.define(entry("square", "first"));
        dictionary.define(entry("square", "second"));

        assert_eq!(dictionary.try_get("square").unwrap().description, "second");
        assert_eq!(dictionary.len(), 2);
    }

    #[test]
    fn missing_names_are_none() {
        let dictionary = Dictionary::new();

        assert!(dictionary.try_get("nope").is_none());
    }
}
