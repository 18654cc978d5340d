//! Rewriter
//!
//! Repeatedly merges runs of adjacent tokens that match a replace rule into a
//! single token until no rule matches. Matches inside one pass are spliced
//! right to left so earlier indexes stay valid.

use tracing::{debug, error};

use super::registry::CompiledRules;
use super::sequence::SequenceMatch;
use super::token::{Fields, Token, TypeCode};
use crate::error::ParseError;

/// Rule captures as slices of the original text.
pub(crate) fn captured_fields(tokens: &[Token], found: &SequenceMatch, text: &str) -> Fields {
    found
        .captures
        .iter()
        .filter_map(|(name, first, last)| {
            let start = tokens.get(*first)?.start;
            let end = tokens.get(*last - 1)?.end;
            let value = text.get(start..end)?;
            Some((name.clone(), value.to_string()))
        })
        .collect()
}

/// Rewrite `tokens` to a fixed point.
///
/// Fails when the rules are still firing after
/// `(tokens + 1) * (replace rules + 1)` passes; the error names the rule
/// that fired first in the last pass. Every merge shortens the stream and
/// `finalize` rejects rename cycles, so finalized rules settle well inside
/// the limit.
pub fn rewrite(rules: &CompiledRules, tokens: Vec<Token>, text: &str) -> Result<Vec<Token>, ParseError> {
    let limit = (tokens.len() + 1) * (rules.replacements.len() + 1);
    rewrite_with_limit(rules, tokens, text, limit)
}

pub(crate) fn rewrite_with_limit(
    rules: &CompiledRules,
    mut tokens: Vec<Token>,
    text: &str,
    limit: usize,
) -> Result<Vec<Token>, ParseError> {
    if rules.replacements.is_empty() {
        return Ok(tokens);
    }
    let mut passes = 0;

    loop {
        let codes: Vec<TypeCode> = tokens.iter().map(|t| t.code).collect();
        let matches = rules.rewrite.find_iter(&codes);
        let Some(first) = matches.first() else {
            debug!(rules = %rules.name, passes, tokens = tokens.len(), "rewrite settled");
            return Ok(tokens);
        };

        passes += 1;
        if passes > limit {
            let rule = rules.replacements[first.rule].name.clone();
            error!(rules = %rules.name, %rule, passes, "rewrite did not settle");
            return Err(ParseError::RewriteLimit { rule, passes });
        }

        for found in matches.iter().rev() {
            let info = &rules.replacements[found.rule];
            let captures = captured_fields(&tokens, found, text);
            let merged = Token::merge(info.code, &info.name, &tokens[found.start..found.end], captures);
            tokens.splice(found.start..found.end, std::iter::once(merged));
        }
    }
}
