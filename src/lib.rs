//! # traiter
//!
//! Extracts typed traits (sex, life stage, body mass, body lengths, gonad
//! sizes and states) from the free-text fields of natural-history specimen
//! records.
//!
//! ## Pipeline
//!
//! Every extractor runs the same three phases over a piece of text:
//!
//! 1. [`engine::tokenize`] turns the text into leaf tokens
//! 2. [`engine::rewrite`] merges token runs until nothing changes
//! 3. [`engine::produce`] matches the final tokens against product rules
//!    whose actions build [`Trait`]s, using the helpers in [`numeric`]
//!
//! The rules come from a [`PatternRegistry`], finalized once per extractor.
//! A [`RecordParser`] runs a set of extractors over one record's fields.
//!
//! ```text
//! let parser = ExtractorRegistry::with_defaults().build(&ParserConfig::default())?;
//! let results = parser.parse_record(&record)?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod extractors;
pub mod numeric;
pub mod record;
pub mod trait_value;
pub mod vocabulary;

pub use config::{ExtractorRegistry, ParserConfig};
pub use engine::{CompiledRules, Leaf, PatternRegistry, Production, Token};
pub use error::{ConfigError, ParseError, RecordError};
pub use extractor::{Extractor, RecordPolicy, TraitExtractor};
pub use record::{ExtractionResult, Record, RecordParser, TraitResult, TraitStatus};
pub use trait_value::{Trait, TraitValue, Units};
