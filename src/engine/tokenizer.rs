//! Tokenizer
//!
//! Turns raw text into the flat token stream the later phases work on.
//! Every leaf keeps its own next candidate match; the leftmost candidate wins,
//! and on equal starts the leaf declared first wins. Text that no leaf
//! matches is dropped.

use tracing::debug;

use super::registry::{CompiledLeaf, CompiledRules};
use super::token::{Fields, Token};

#[derive(Debug, Clone)]
struct Candidate {
    start: usize,
    end: usize,
    fields: Fields,
}

/// Tokenize `text` with the leaves of `rules`.
pub fn tokenize(rules: &CompiledRules, text: &str) -> Vec<Token> {
    let leaves = &rules.leaves;
    // None: not searched yet. Some(None): the leaf has no more matches.
    let mut pending: Vec<Option<Option<Candidate>>> = vec![None; leaves.len()];
    let mut tokens = Vec::new();
    let mut cursor = 0;
    let mut empty_allowed = true;

    loop {
        let mut best: Option<(usize, usize)> = None;
        for (i, leaf) in leaves.iter().enumerate() {
            let stale = match &pending[i] {
                None => true,
                Some(None) => false,
                Some(Some(c)) => {
                    c.start < cursor || (c.start == c.end && c.start == cursor && !empty_allowed)
                }
            };
            if stale {
                pending[i] = Some(next_match(leaf, text, cursor, empty_allowed));
            }
            if let Some(Some(candidate)) = &pending[i] {
                if best.map_or(true, |(_, start)| candidate.start < start) {
                    best = Some((i, candidate.start));
                }
            }
        }

        let Some((winner, _)) = best else {
            break;
        };
        let Some(candidate) = pending[winner].take().flatten() else {
            break;
        };
        let leaf = &leaves[winner];
        empty_allowed = candidate.end > candidate.start;
        cursor = candidate.end;
        tokens.push(
            Token::new(leaf.code, leaf.name.clone(), candidate.start, candidate.end)
                .with_fields(candidate.fields),
        );
    }

    debug!(rules = %rules.name, tokens = tokens.len(), "tokenized");
    tokens
}

fn next_match(leaf: &CompiledLeaf, text: &str, from: usize, empty_allowed: bool) -> Option<Candidate> {
    let mut at = from;
    while at <= text.len() {
        let caps = leaf.regex.captures_at(text, at)?;
        let whole = caps.get(0)?;
        let (start, end) = (whole.start(), whole.end());
        let blocked = start == end && start == from && !empty_allowed;
        if !blocked {
            let fields = leaf.fields(&caps);
            if leaf.accepts(text, start, end, &fields) {
                return Some(Candidate { start, end, fields });
            }
        }
        at = text[start..]
            .chars()
            .next()
            .map_or(start + 1, |c| start + c.len_utf8());
    }
    None
}

/// The type names of a token stream, for tests and diagnostics.
pub fn token_names(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.name.as_str()).collect()
}
