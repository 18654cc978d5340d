//! Extractors
//!
//! An [`Extractor`] wraps one finalized rule set with the hooks that turn its
//! productions into the traits of a single record attribute:
//!
//! - an optional fix-up that can veto or adjust each trait using the text
//!   around it
//! - a zero guard that drops values of exactly zero
//! - a [`RecordPolicy`] deciding when the trait is skipped for a record
//!
//! The orchestrator only sees the [`TraitExtractor`] trait, so custom
//! extractors can be registered next to the built-in ones.

use tracing::{debug, error};

use crate::engine::{produce, rewrite, tokenize, CompiledRules};
use crate::error::ParseError;
use crate::record::ExtractionResult;
use crate::trait_value::Trait;

/// Veto (`None`) or adjust a trait, given the whole field text.
pub type FixUp = fn(Trait, &str) -> Option<Trait>;

/// What a record must look like for a trait to be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordPolicy {
    #[default]
    Any,
    /// Skipped when the record's sex is "female".
    MaleOnly,
    /// Skipped when the record's sex is "male".
    FemaleOnly,
}

impl RecordPolicy {
    /// The sex that rules the trait out, and the one that confirms it.
    fn sexes(self) -> Option<(&'static str, &'static str)> {
        match self {
            RecordPolicy::Any => None,
            RecordPolicy::MaleOnly => Some(("female", "male")),
            RecordPolicy::FemaleOnly => Some(("male", "female")),
        }
    }
}

/// The interface the record orchestrator drives.
pub trait TraitExtractor: Send + Sync {
    fn name(&self) -> &str;

    /// All traits found in `text`, tagged with `field`.
    fn try_parse(&self, text: &str, field: &str) -> Result<Vec<Trait>, ParseError>;

    /// A reason to skip this trait given what the record has so far.
    fn should_skip(&self, _results: &ExtractionResult) -> Option<String> {
        None
    }

    /// Adjust the traits found using what the record has so far.
    fn adjust(&self, _results: &ExtractionResult, _traits: &mut [Trait]) {}
}

#[derive(Clone)]
pub struct Extractor {
    rules: CompiledRules,
    fix_up: Option<FixUp>,
    zero_guard: bool,
    policy: RecordPolicy,
}

impl Extractor {
    /// An extractor named after its rule set.
    pub fn new(rules: CompiledRules) -> Self {
        Self {
            rules,
            fix_up: None,
            zero_guard: false,
            policy: RecordPolicy::Any,
        }
    }

    pub fn with_fix_up(mut self, fix_up: FixUp) -> Self {
        self.fix_up = Some(fix_up);
        self
    }

    /// Treat numeric values of exactly zero as not found.
    pub fn with_zero_guard(mut self) -> Self {
        self.zero_guard = true;
        self
    }

    pub fn with_policy(mut self, policy: RecordPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn rules(&self) -> &CompiledRules {
        &self.rules
    }

    pub fn policy(&self) -> RecordPolicy {
        self.policy
    }

    /// Like [`TraitExtractor::try_parse`], but a runaway rewrite is logged
    /// and treated as "nothing found".
    pub fn parse(&self, text: &str, field: &str) -> Vec<Trait> {
        match self.try_parse(text, field) {
            Ok(traits) => traits,
            Err(err) => {
                error!(extractor = %self.rules.name(), field, %err, "parse failed");
                Vec::new()
            }
        }
    }
}

impl TraitExtractor for Extractor {
    fn name(&self) -> &str {
        self.rules.name()
    }

    fn try_parse(&self, text: &str, field: &str) -> Result<Vec<Trait>, ParseError> {
        let tokens = tokenize(&self.rules, text);
        let tokens = rewrite(&self.rules, tokens, text)?;
        let produced = produce(&self.rules, &tokens, text);

        let mut traits = Vec::with_capacity(produced.len());
        for candidate in produced {
            let kept = match self.fix_up {
                Some(fix_up) => fix_up(candidate, text),
                None => Some(candidate),
            };
            let Some(mut kept) = kept else {
                continue;
            };
            if self.zero_guard && kept.is_zero() {
                continue;
            }
            kept.field = Some(field.to_string());
            traits.push(kept);
        }

        debug!(extractor = %self.rules.name(), field, traits = traits.len(), "parsed");
        Ok(traits)
    }

    fn should_skip(&self, results: &ExtractionResult) -> Option<String> {
        let (excluded, _) = self.policy.sexes()?;
        (results.sex() == Some(excluded)).then(|| format!("Skipped because sex is '{}'", excluded))
    }

    fn adjust(&self, results: &ExtractionResult, traits: &mut [Trait]) {
        let Some((_, confirmed)) = self.policy.sexes() else {
            return;
        };
        if results.sex() == Some(confirmed) {
            for found in traits.iter_mut() {
                found.ambiguous_key = Some(false);
            }
        }
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("rules", &self.rules)
            .field("fix_up", &self.fix_up.is_some())
            .field("zero_guard", &self.zero_guard)
            .field("policy", &self.policy)
            .finish()
    }
}
