//! Error types for rule construction, parsing and record processing

/// Errors raised while building or finalizing a rule set.
///
/// These are fatal and surface at construction time, never while parsing text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("'{name}' is defined more than once")]
    Duplicate { name: String },

    #[error("'{name}' references undefined fragment '{reference}'")]
    UndefinedReference { name: String, reference: String },

    #[error("circular fragment reference: {path}")]
    CircularReference { path: String },

    #[error("invalid pattern for '{name}': {message}")]
    InvalidPattern { name: String, message: String },

    #[error("rule '{name}' can match an empty token sequence")]
    EmptyMatch { name: String },

    #[error("rewrite rule '{name}' never terminates: {cycle}")]
    NonTerminatingRule { name: String, cycle: String },

    #[error("unknown extractor '{name}'")]
    UnknownExtractor { name: String },

    #[error("invalid parser configuration: {0}")]
    Malformed(String),
}

/// Errors raised while parsing a single piece of text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("rewrite rule '{rule}' still matching after {passes} passes")]
    RewriteLimit { rule: String, passes: usize },
}

/// Errors raised while processing one record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("trait '{trait_name}' failed on field '{field}': {source}")]
    Parse {
        trait_name: String,
        field: String,
        #[source]
        source: ParseError,
    },

    #[error("record processing panicked: {0}")]
    Panicked(String),
}
