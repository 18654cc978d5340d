//! Producer
//!
//! Matches the final token stream against the product rules and hands each
//! match to the rule's action as one synthetic token.

use std::sync::Arc;

use tracing::debug;

use super::registry::CompiledRules;
use super::rewriter::captured_fields;
use super::token::{Token, TypeCode};
use crate::trait_value::Trait;

/// What an action made of a match.
#[derive(Debug, Clone, PartialEq)]
pub enum Production {
    /// Zero or more traits; one match may describe several measurements.
    Traits(Vec<Trait>),
    /// The match is not a real notation (an ID number, a date, ...).
    Reject,
}

impl From<Trait> for Production {
    fn from(value: Trait) -> Self {
        Production::Traits(vec![value])
    }
}

impl From<Option<Trait>> for Production {
    fn from(value: Option<Trait>) -> Self {
        value.map_or(Production::Reject, Production::from)
    }
}

impl From<Vec<Trait>> for Production {
    fn from(value: Vec<Trait>) -> Self {
        Production::Traits(value)
    }
}

/// Callback of a product rule.
pub type Action = Arc<dyn Fn(&Token) -> Production + Send + Sync>;

/// Run every product rule over `tokens`, left to right.
pub fn produce(rules: &CompiledRules, tokens: &[Token], text: &str) -> Vec<Trait> {
    let codes: Vec<TypeCode> = tokens.iter().map(|t| t.code).collect();
    let mut traits = Vec::new();

    for found in rules.produce.find_iter(&codes) {
        let product = &rules.products[found.rule];
        let captures = captured_fields(tokens, &found, text);
        let token = Token::merge(
            product.rule.code,
            &product.rule.name,
            &tokens[found.start..found.end],
            captures,
        );
        match (product.action)(&token) {
            Production::Traits(made) => traits.extend(made),
            Production::Reject => {
                debug!(rule = %product.rule.name, start = token.start, end = token.end, "rejected");
            }
        }
    }
    traits
}
