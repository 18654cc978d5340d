//! Tail length: "tail 9-10 mm", "tailLengthInMM=9", "T: 35" and the second
//! slot of "11-22-33-44:55g".

use once_cell::sync::Lazy;
use regex::Regex;

use super::measure::{before, fraction, numeric_fix_ups, shorthand, simple, LOOK_BACK_FAR};
use crate::engine::Leaf;
use crate::error::ConfigError;
use crate::extractor::Extractor;
use crate::numeric::ShorthandSlot;
use crate::trait_value::Trait;
use crate::vocabulary::shared;

pub const NAME: &str = "tail_length";

/// Tail keys are often written right after the body or tag words they
/// belong to, so this look back is wider than the shared one.
const LOOK_BACK_NEAR: usize = 20;

static IS_TESTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)reproductive|gonad|test|scrotal|scrotum|scrot").unwrap()
});

static IS_ELEVATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)elevation|elev").unwrap());

static IS_TOTAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)body|nose|snout").unwrap());

static IS_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)tag").unwrap());

static IS_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)identifier|ident|id").unwrap());

fn fix_up(found: Trait, text: &str) -> Option<Trait> {
    // "snout-tail length" and friends are total lengths
    if IS_TOTAL.is_match(before(text, found.start, LOOK_BACK_NEAR)) {
        return None;
    }
    if found.ambiguous_key == Some(true) {
        let far = before(text, found.start, LOOK_BACK_FAR);
        if IS_TESTES.is_match(far) || IS_ELEVATION.is_match(far) || IS_ID.is_match(far) {
            return None;
        }
        if IS_TAG.is_match(before(text, found.start, LOOK_BACK_NEAR)) {
            return None;
        }
    }
    numeric_fix_ups(found, text)
}

pub fn build() -> Result<Extractor, ConfigError> {
    let mut registry = shared::registry(NAME);
    registry
        .leaf(shared::uuid())
        .keyword(
            "key_with_units",
            r" tail \s* (?: length | len ) \s* in \s* (?P<units> millimeters | mm ) ",
        )
        .leaf(
            Leaf::fragment("char_key", r" \b (?P<ambiguous_key> t ) ")
                .not_followed_by(r" [a-z] | _ \D "),
        )
        .keyword("keyword", r" tail \s* length | tail \s* len | tail | tal ")
        .leaf(shared::len_units())
        .leaf(shared::shorthand_key())
        .leaf(shared::shorthand())
        .leaf(shared::fraction())
        .leaf(shared::range())
        .leaf(shared::triple())
        .keyword("word", r" [a-z] \w* ")
        .fragment("sep", "[;,]")
        .replace_rule("key", &["keyword | char_key"])
        .product_rule(
            fraction,
            &["key fraction (?P<units> len_units )", "key fraction"],
        )
        .product_rule(
            simple,
            &[
                "key_with_units range",
                "key range (?P<units> len_units )",
                "key range",
            ],
        )
        .product_rule(
            shorthand(ShorthandSlot::TailLength),
            &[
                "shorthand_key shorthand",
                "shorthand",
                "shorthand_key triple (?! shorthand | range )",
            ],
        );

    Ok(Extractor::new(registry.finalize()?)
        .with_fix_up(fix_up)
        .with_zero_guard())
}
