//! Token types shared by every engine phase

use std::collections::BTreeMap;
use std::fmt;

/// Named values captured while matching, keyed by group name.
pub type Fields = BTreeMap<String, String>;

/// Type code of a leaf or rule.
///
/// Codes are assigned per rule set in declaration order when the registry is
/// finalized; two rule sets never share a code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeCode(pub(crate) u16);

impl TypeCode {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A match of a leaf or rule, with byte offsets into the original text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub code: TypeCode,
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub fields: Fields,
}

impl Token {
    pub fn new(code: TypeCode, name: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            code,
            name: name.into(),
            start,
            end,
            fields: Fields::new(),
        }
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    /// Merge a run of tokens into one token covering all of them.
    ///
    /// Later constituents override earlier ones on a key collision and the
    /// rule-level `captures` override everything.
    pub fn merge(code: TypeCode, name: &str, run: &[Token], captures: Fields) -> Token {
        let start = run.first().map_or(0, |t| t.start);
        let end = run.last().map_or(start, |t| t.end);
        let mut fields = Fields::new();
        for token in run {
            for (key, value) in &token.fields {
                fields.insert(key.clone(), value.clone());
            }
        }
        fields.extend(captures);
        Token::new(code, name, start, end).with_fields(fields)
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|v| !v.is_empty())
    }

    /// The slice of `text` this token covers.
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or("")
    }
}
