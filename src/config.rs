//! Parser configuration
//!
//! A [`ParserConfig`] names the record fields to search, the fields taken
//! verbatim and the traits to extract, in order. It deserializes from JSON;
//! missing keys fall back to the defaults:
//!
//! ```text
//! {
//!     "search_fields": ["dynamicproperties", "occurrenceremarks", "fieldnotes"],
//!     "verbatim": {"sex": "sex", "life_stage": "lifestage"},
//!     "traits": ["sex", "body_mass"]
//! }
//! ```
//!
//! An [`ExtractorRegistry`] maps trait names to constructors and turns a
//! configuration into a ready [`RecordParser`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::extractor::TraitExtractor;
use crate::extractors;
use crate::record::RecordParser;

pub const DEFAULT_SEARCH_FIELDS: &[&str] = &["dynamicproperties", "occurrenceremarks", "fieldnotes"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Fields scanned in order; the first one yielding a trait wins.
    pub search_fields: Vec<String>,
    /// Trait name to the field holding its value as is.
    pub verbatim: BTreeMap<String, String>,
    /// Traits to extract, in processing order.
    pub traits: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let verbatim = [("sex", "sex"), ("life_stage", "lifestage")]
            .into_iter()
            .map(|(name, field)| (name.to_string(), field.to_string()))
            .collect();
        Self {
            search_fields: DEFAULT_SEARCH_FIELDS.iter().map(|f| f.to_string()).collect(),
            verbatim,
            traits: extractors::default_order(),
        }
    }
}

impl ParserConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| ConfigError::Malformed(err.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|err| ConfigError::Malformed(err.to_string()))
    }
}

type Constructor = Box<dyn Fn() -> Result<Arc<dyn TraitExtractor>, ConfigError> + Send + Sync>;

/// Trait names to extractor constructors.
pub struct ExtractorRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        ExtractorRegistry {
            constructors: HashMap::new(),
        }
    }

    /// Register a constructor under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: &str, constructor: F) -> &mut Self
    where
        F: Fn() -> Result<Arc<dyn TraitExtractor>, ConfigError> + Send + Sync + 'static,
    {
        self.constructors.insert(name.to_string(), Box::new(constructor));
        self
    }

    /// Build the extractor registered under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn TraitExtractor>, ConfigError> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| ConfigError::UnknownExtractor {
                name: name.to_string(),
            })?;
        constructor()
    }

    pub fn has(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// All registered names (sorted)
    pub fn list_all(&self) -> Vec<String> {
        let mut names: Vec<_> = self.constructors.keys().cloned().collect();
        names.sort();
        names
    }

    /// A registry holding every built-in extractor.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, build) in extractors::BUILT_IN {
            let build = *build;
            registry.register(name, move || {
                let extractor: Arc<dyn TraitExtractor> = Arc::new(build()?);
                Ok(extractor)
            });
        }
        registry
    }

    /// A record parser for `config`. Every trait must be registered.
    pub fn build(&self, config: &ParserConfig) -> Result<RecordParser, ConfigError> {
        let mut parser = RecordParser::new(config.search_fields.clone());
        for name in &config.traits {
            parser.register(self.get(name)?);
        }
        for (name, field) in &config.verbatim {
            parser.verbatim(name, field);
        }
        debug!(traits = config.traits.len(), "record parser built");
        Ok(parser)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("names", &self.list_all())
            .finish()
    }
}
