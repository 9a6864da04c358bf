use crate::{
    lang::source_buffer::{SourceBuffer, SourceLocation},
    runtime::data_structures::value_stack::Cell,
};
use std::fmt::{self, Debug, Display, Formatter};

/// A unit of the language as found in the source text.  The language is simple enough
/// that only two possibilities exist: a token is either a numeric literal or a word.
/// Every token remembers where in the source it was found.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// An integer literal.
    Number(SourceLocation, Cell),

    /// A word to be looked up in the dictionary, or compiled into the definition under
    /// construction.
    Word(SourceLocation, String),
}

/// The tokens found in a piece of source code, in order.
pub type TokenList = Vec<Token>;

/// Tokens print as their source text for user facing messages.
impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Token::Number(_, number) => write!(f, "{}", number),
            Token::Word(_, word) => write!(f, "{}", word),
        }
    }
}

/// The debug form includes the token's location.
impl Debug for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Token::Number(location, number) => write!(f, "{}: {}", location, number),
            Token::Word(location, word) => write!(f, "{}: {}", location, word),
        }
    }
}

impl Token {
    /// Where in the source text this token was found.
    pub fn location(&self) -> &SourceLocation {
        match self {
            Token::Number(location, _) => location,
            Token::Word(location, _) => location,
        }
    }

    /// Is this token a numeric literal?
    pub fn is_number(&self) -> bool {
        matches!(self, Token::Number(_, _))
    }

    /// The token's text, usable as a word name.  Numbers render to their decimal text,
    /// so a number can still name a word in a definition.
    pub fn text(&self) -> String {
        match self {
            Token::Number(_, number) => number.to_string(),
            Token::Word(_, word) => word.clone(),
        }
    }
}

/// Is the character one of the token separators?
fn is_whitespace(next: &char) -> bool {
    *next == ' ' || *next == '\t' || *next == '\r' || *next == '\n'
}

/// Advance the buffer to the next non-whitespace character or the end of the text.
fn skip_whitespace(buffer: &mut SourceBuffer) {
    while let Some(next) = buffer.peek_next() {
        if !is_whitespace(&next) {
            break;
        }

        let _ = buffer.next_char();
    }
}

/// Gather characters until the next whitespace or the end of the buffer.  Words may
/// contain any non-whitespace character.
fn read_until_whitespace(buffer: &mut SourceBuffer) -> (SourceLocation, String) {
    let location = buffer.location().clone();
    let mut text = String::new();

    while let Some(next) = buffer.peek_next() {
        if is_whitespace(&next) {
            break;
        }

        text.push(buffer.next_char().unwrap());
    }

    (location, text)
}

/// Does the text look like it could be a numeric literal?  This is a quick filter,
/// `to_numeric` makes the final call.  Words like `2*` and `1-` contain digits but fail
/// here or there and so stay words.
fn is_number(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    if text.starts_with("0x") || text.starts_with("0b") {
        return true;
    }

    let digits = text.strip_prefix('-').unwrap_or(text);

    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit() || c == '_')
}

/// Attempt to parse the text as an integer literal.  Decimal, hexadecimal (`0x`), and
/// binary (`0b`) forms are supported, with `_` usable as a separator for readability.
fn to_numeric(text: &str) -> Option<Cell> {
    if let Some(stripped) = text.strip_prefix("0x") {
        Cell::from_str_radix(&stripped.replace('_', ""), 16).ok()
    } else if let Some(stripped) = text.strip_prefix("0b") {
        Cell::from_str_radix(&stripped.replace('_', ""), 2).ok()
    } else {
        text.replace('_', "").parse().ok()
    }
}

/// Split source text into a token list.  Tokenizing itself can not fail, any text that
/// is not a number is a word, and it is the interpreter's dispatch that decides whether
/// a word is meaningful.
pub fn tokenize_from_source(path: &str, source: &str) -> TokenList {
    let mut buffer = SourceBuffer::new(path, source);
    let mut token_list = TokenList::new();

    while let Some(next) = buffer.peek_next() {
        if is_whitespace(&next) {
            skip_whitespace(&mut buffer);
            continue;
        }

        let (location, text) = read_until_whitespace(&mut buffer);

        let next_token = if is_number(&text) {
            match to_numeric(&text) {
                Some(number) => Token::Number(location, number),
                None => Token::Word(location, text),
            }
        } else {
            Token::Word(location, text)
        };

        token_list.push(next_token);
    }

    token_list
}
