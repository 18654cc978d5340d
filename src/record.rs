//! Record orchestration
//!
//! A [`RecordParser`] runs its extractors, in registration order, over the
//! fields of one specimen record. For each trait:
//!
//! 1. the extractor may skip it given the traits found so far
//! 2. a non-empty verbatim field is taken as is
//! 3. otherwise the search fields are scanned in order and the first field
//!    yielding any trait wins
//! 4. the extractor may adjust what was found
//!
//! [`RecordParser::parse_batch`] isolates every record: an error or a panic
//! is logged with the record id and the batch moves on.

use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::RecordError;
use crate::extractor::TraitExtractor;
use crate::trait_value::{dedup, Trait, TraitValue};

/// How a trait's traits were obtained for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TraitStatus {
    Skipped { reason: String },
    Verbatim { field: String },
    Found { field: String },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitResult {
    pub traits: Vec<Trait>,
    #[serde(flatten)]
    pub status: TraitStatus,
}

impl TraitResult {
    fn skipped(reason: String) -> Self {
        Self {
            traits: Vec::new(),
            status: TraitStatus::Skipped { reason },
        }
    }

    /// One trait per distinct measurement, for tabular output.
    ///
    /// `traits` keeps every occurrence with its own span; this collapses
    /// repeats with [`dedup`].
    pub fn distinct(&self) -> Vec<Trait> {
        dedup(self.traits.clone())
    }
}

/// Everything extracted from one record, keyed by trait name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    results: BTreeMap<String, TraitResult>,
}

impl ExtractionResult {
    pub fn get(&self, name: &str) -> Option<&TraitResult> {
        self.results.get(name)
    }

    /// The traits found for `name`, empty if none.
    pub fn traits(&self, name: &str) -> &[Trait] {
        self.results.get(name).map_or(&[], |r| r.traits.as_slice())
    }

    pub fn status(&self, name: &str) -> Option<&TraitStatus> {
        self.results.get(name).map(|r| &r.status)
    }

    /// The first sex value found, if any.
    pub fn sex(&self) -> Option<&str> {
        self.traits("sex").first().and_then(|t| t.value.as_text())
    }

    pub fn insert(&mut self, name: &str, result: TraitResult) {
        self.results.insert(name.to_string(), result);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Field name to field text for one record.
pub type Record = HashMap<String, String>;

/// Runs a fixed set of extractors over records.
#[derive(Clone)]
pub struct RecordParser {
    extractors: Vec<Arc<dyn TraitExtractor>>,
    search_fields: Vec<String>,
    verbatim: HashMap<String, String>,
}

impl RecordParser {
    pub fn new(search_fields: Vec<String>) -> Self {
        Self {
            extractors: Vec::new(),
            search_fields,
            verbatim: HashMap::new(),
        }
    }

    /// Add an extractor; traits are processed in registration order.
    pub fn register(&mut self, extractor: Arc<dyn TraitExtractor>) -> &mut Self {
        self.extractors.push(extractor);
        self
    }

    /// Take `trait_name` straight from `field` when the record has it.
    pub fn verbatim(&mut self, trait_name: &str, field: &str) -> &mut Self {
        self.verbatim
            .insert(trait_name.to_string(), field.to_string());
        self
    }

    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.extractors.iter().map(|e| e.name())
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    pub fn parse_record(&self, record: &Record) -> Result<ExtractionResult, RecordError> {
        let mut results = ExtractionResult::default();

        for extractor in &self.extractors {
            let name = extractor.name();

            if let Some(reason) = extractor.should_skip(&results) {
                debug!(trait_name = name, %reason, "skipped");
                results.insert(name, TraitResult::skipped(reason));
                continue;
            }

            let mut found = match self.from_verbatim(name, record) {
                Some(verbatim) => verbatim,
                None => self.scan(extractor.as_ref(), record)?,
            };
            extractor.adjust(&results, &mut found.traits);
            results.insert(name, found);
        }

        Ok(results)
    }

    /// Parse every `(id, record)` pair; one failure never stops the batch.
    pub fn parse_batch<I, K>(&self, records: I) -> Vec<(K, Result<ExtractionResult, RecordError>)>
    where
        I: IntoIterator<Item = (K, Record)>,
        K: std::fmt::Display,
    {
        records
            .into_iter()
            .map(|(id, record)| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.parse_record(&record)))
                    .unwrap_or_else(|payload| Err(RecordError::Panicked(panic_message(&payload))));
                if let Err(err) = &outcome {
                    warn!(record = %id, %err, "record failed");
                }
                (id, outcome)
            })
            .collect()
    }

    fn from_verbatim(&self, name: &str, record: &Record) -> Option<TraitResult> {
        let field = self.verbatim.get(name)?;
        let text = record.get(field)?.trim();
        if text.is_empty() {
            return None;
        }
        let mut verbatim = Trait::new(TraitValue::Text(text.to_string()), 0, text.len());
        verbatim.field = Some(field.clone());
        Some(TraitResult {
            traits: vec![verbatim],
            status: TraitStatus::Verbatim {
                field: field.clone(),
            },
        })
    }

    fn scan(&self, extractor: &dyn TraitExtractor, record: &Record) -> Result<TraitResult, RecordError> {
        for field in &self.search_fields {
            let Some(text) = record.get(field) else {
                continue;
            };
            let traits = extractor
                .try_parse(text, field)
                .map_err(|source| RecordError::Parse {
                    trait_name: extractor.name().to_string(),
                    field: field.clone(),
                    source,
                })?;
            if !traits.is_empty() {
                return Ok(TraitResult {
                    traits,
                    status: TraitStatus::Found {
                        field: field.clone(),
                    },
                });
            }
        }
        Ok(TraitResult {
            traits: Vec::new(),
            status: TraitStatus::NotFound,
        })
    }
}

impl std::fmt::Debug for RecordParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordParser")
            .field("traits", &self.trait_names().collect::<Vec<_>>())
            .field("search_fields", &self.search_fields)
            .field("verbatim", &self.verbatim)
            .finish()
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
