//! Extracted trait values
//!
//! A [`Trait`] is one normalized measurement or observation together with
//! the span of the field text it came from. Every recognized attribute is an
//! `Option`; rule-specific markers go in [`Trait::flags`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The value of a trait: a number, a range or a word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitValue {
    Number(f64),
    Range(f64, f64),
    Text(String),
}

impl TraitValue {
    /// Numeric parts of the value, empty for text.
    pub fn numbers(&self) -> Vec<f64> {
        match self {
            TraitValue::Number(v) => vec![*v],
            TraitValue::Range(low, high) => vec![*low, *high],
            TraitValue::Text(_) => Vec::new(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TraitValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// The unit spelling(s) found in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Units {
    One(String),
    Pair(String, String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    pub value: TraitValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Units>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units_inferred: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambiguous_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, String>,
}

impl Trait {
    pub fn new(value: TraitValue, start: usize, end: usize) -> Self {
        Self {
            value,
            field: None,
            start,
            end: end.max(start),
            dimension: None,
            units: None,
            units_inferred: None,
            estimated_value: None,
            ambiguous_key: None,
            measured_from: None,
            includes: None,
            side: None,
            skipped: None,
            flags: BTreeMap::new(),
        }
    }

    pub fn text(value: impl Into<String>, start: usize, end: usize) -> Self {
        Self::new(TraitValue::Text(value.into()), start, end)
    }

    pub fn number(value: f64, start: usize, end: usize) -> Self {
        Self::new(TraitValue::Number(value), start, end)
    }

    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    pub fn set_flag(&mut self, name: &str, value: impl Into<String>) {
        self.flags.insert(name.to_string(), value.into());
    }

    /// True when every numeric part of the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        let numbers = self.value.numbers();
        !numbers.is_empty() && numbers.iter().all(|v| *v == 0.0)
    }

    /// What makes two parses the same measurement.
    pub fn as_key(&self) -> ParseKey {
        let (low, high) = match &self.value {
            TraitValue::Range(low, high) => (TraitValue::Number(*low), Some(*high)),
            other => (other.clone(), None),
        };
        ParseKey {
            low,
            high,
            dimension: self.dimension.clone(),
            includes: self.includes.clone(),
            measured_from: self.measured_from.clone(),
            side: self.side.clone(),
        }
    }

    /// Fold the flags of a duplicate parse into this one.
    ///
    /// A key stays ambiguous only if every parse is ambiguous; a value is
    /// estimated if any parse says so.
    pub fn merge_flags(&mut self, other: &Trait) {
        if self.ambiguous_key.is_some() || other.ambiguous_key.is_some() {
            self.ambiguous_key = Some(
                self.ambiguous_key.unwrap_or(false) && other.ambiguous_key.unwrap_or(false),
            );
        }
        if self.estimated_value.is_some() || other.estimated_value.is_some() {
            self.estimated_value = Some(
                self.estimated_value.unwrap_or(false) || other.estimated_value.unwrap_or(false),
            );
        }
    }
}

/// Identity of a measurement, see [`Trait::as_key`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParseKey {
    pub low: TraitValue,
    pub high: Option<f64>,
    pub dimension: Option<String>,
    pub includes: Option<String>,
    pub measured_from: Option<String>,
    pub side: Option<String>,
}

/// Collapse parses of the same measurement, keeping the first of each.
pub fn dedup(traits: Vec<Trait>) -> Vec<Trait> {
    let mut kept: Vec<Trait> = Vec::with_capacity(traits.len());
    for candidate in traits {
        let key = candidate.as_key();
        match kept.iter_mut().find(|t| t.as_key() == key) {
            Some(existing) => existing.merge_flags(&candidate),
            None => kept.push(candidate),
        }
    }
    kept
}
