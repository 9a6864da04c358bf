use core::str::Chars;
use std::fmt::{self, Display, Formatter};

/// Where in the source text a token was found.  Locations are threaded through tokens,
/// compiled instructions, and errors so that failures can always point back at the
/// offending piece of source.
///
/// Read-only once created, use the accessor methods.
#[derive(Clone, PartialEq, Eq, PartialOrd, Hash)]
pub struct SourceLocation {
    /// The path of the source file, or a tag describing where the text came from.  Text
    /// entered interactively carries the tag "\<repl\>".
    path: String,

    /// The 1 based line number.
    line: usize,

    /// The 1 based column number.
    column: usize,
}

/// Render the location for error reports.
impl Display for SourceLocation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} ({}, {})", self.path, self.line, self.column)
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        SourceLocation::new()
    }
}

impl SourceLocation {
    /// A location with placeholder values, for when nothing better is known.
    pub fn new() -> SourceLocation {
        SourceLocation {
            path: "unspecified".to_string(),
            line: 1,
            column: 1,
        }
    }

    /// The start of a given source file or tag.
    pub fn new_from_path(path: &str) -> SourceLocation {
        SourceLocation {
            path: path.to_owned(),
            line: 1,
            column: 1,
        }
    }

    /// A fully specified location.  Pairs with the `location_here!` macro for locations
    /// within the Rust sources.
    pub fn new_from_info(path: &str, line: usize, column: usize) -> SourceLocation {
        SourceLocation {
            path: path.to_owned(),
            line,
            column,
        }
    }

    /// The source path or descriptive tag.
    pub fn path(&self) -> &String {
        &self.path
    }

    /// The 1 based line number.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The 1 based column number.
    pub fn column(&self) -> usize {
        self.column
    }
}

/// Capture the location of the macro invocation itself.  Used when native code defines
/// words or executes them outside of any script source.
#[macro_export]
macro_rules! location_here {
    () => {
        $crate::lang::source_buffer::SourceLocation::new_from_info(
            file!(),
            line!() as usize,
            column!() as usize,
        )
    };
}

/// A forward-only cursor over source text used by the tokenizer.  Characters can be
/// peeked at without being consumed, and the cursor's logical line/column position is
/// maintained as characters are taken.
///
/// Only a reference to the text is held, the source string is expected to outlive the
/// buffer.
pub struct SourceBuffer<'a> {
    /// Iterator over the remaining source characters.
    chars: Chars<'a>,

    /// The cursor's position within the source text.
    location: SourceLocation,

    /// A character that has been peeked at but not yet consumed.
    peeked: Option<char>,
}

impl<'a> SourceBuffer<'a> {
    /// Wrap a source string, tagging it with the path (or tag) it came from.
    pub fn new(path: &str, source: &'a str) -> SourceBuffer<'a> {
        SourceBuffer {
            chars: source.chars(),
            location: SourceLocation::new_from_path(path),
            peeked: None,
        }
    }

    /// Where the cursor currently is in the source text.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Look at the next character without consuming it.
    pub fn peek_next(&mut self) -> Option<char> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next();
        }

        self.peeked
    }

    /// Consume and return the next character, advancing the location.
    pub fn next_char(&mut self) -> Option<char> {
        let next = match self.peeked.take() {
            Some(next) => Some(next),
            None => self.chars.next(),
        };

        if let Some(character) = next {
            self.advance_location(character);
        }

        next
    }

    /// New lines reset the column and bump the line, everything else moves the column.
    fn advance_location(&mut self, next: char) {
        if next == '\n' {
            self.location.line += 1;
            self.location.column = 1;
        } else {
            self.location.column += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_tracks_lines_and_columns() {
        let mut buffer = SourceBuffer::new("<test>", "ab\ncd");

        assert_eq!(buffer.next_char(), Some('a'));
        assert_eq!(buffer.next_char(), Some('b'));
        assert_eq!(buffer.location().line(), 1);
        assert_eq!(buffer.location().column(), 3);

        assert_eq!(buffer.next_char(), Some('\n'));
        assert_eq!(buffer.location().line(), 2);
        assert_eq!(buffer.location().column(), 1);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut buffer = SourceBuffer::new("<test>", "xy");

        assert_eq!(buffer.peek_next(), Some('x'));
        assert_eq!(buffer.peek_next(), Some('x'));
        assert_eq!(buffer.next_char(), Some('x'));
        assert_eq!(buffer.next_char(), Some('y'));
        assert_eq!(buffer.next_char(), None);
    }
}
