//! Sex: "sex=female ?", "sex=F", "male or female".
//!
//! Keyed values may be abbreviated or say the sex is unknown; unkeyed
//! values must be spelled out.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::engine::{Production, Token};
use crate::error::ConfigError;
use crate::extractor::Extractor;
use crate::trait_value::Trait;
use crate::vocabulary::shared;

pub const NAME: &str = "sex";

static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static SPACE_BEFORE_QUEST: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\?").unwrap());

/// Lowercase, tidy the spacing and spell out "f" and "m".
fn normalize(value: &str) -> String {
    let value = value.trim().to_lowercase();
    let value = SPACES.replace_all(&value, " ");
    let value = SPACE_BEFORE_QUEST.replace_all(&value, "?");
    match value.as_ref() {
        "f" => "female".to_string(),
        "m" => "male".to_string(),
        "f?" => "female?".to_string(),
        "m?" => "male?".to_string(),
        other => other.to_string(),
    }
}

fn convert(token: &Token) -> Production {
    match token.field("value") {
        Some(value) => Trait::text(normalize(value), token.start, token.end).into(),
        None => Production::Reject,
    }
}

pub fn build() -> Result<Extractor, ConfigError> {
    let mut registry = shared::registry(NAME);
    registry
        .keyword("sex_key", "sex")
        .keyword("sex_value", " females? | males? ")
        .keyword(
            "keyed_value",
            r" not \s+ recorded | unknown | undetermined | f | m ",
        )
        .fragment("quest", r"\?")
        .keyword("word", r" [a-z] \w* ")
        .product_rule(
            convert,
            &[
                "sex_key (?P<value> (?: sex_value | keyed_value ) quest? )",
                "(?P<value> sex_value quest? )",
            ],
        );

    Ok(Extractor::new(registry.finalize()?))
}
