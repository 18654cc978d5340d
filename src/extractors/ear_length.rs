//! Ear length: "ear from notch 15 mm", "E/n=15", "efc 12" and the fourth
//! slot of "11-22-33-44:55g".
//!
//! A lone "E" is easily something else (E.T., an easting, a catalog
//! number), so those parses are checked against their surroundings.

use once_cell::sync::Lazy;
use regex::Regex;

use super::measure::{
    after, before, fraction, numeric_fix_ups, shorthand, simple, LOOK_AROUND, LOOK_BACK_FAR,
    LOOK_BACK_NEAR,
};
use crate::engine::Leaf;
use crate::error::ConfigError;
use crate::extractor::Extractor;
use crate::numeric::ShorthandSlot;
use crate::trait_value::Trait;
use crate::vocabulary::shared;

pub const NAME: &str = "ear_length";

static IS_ET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)e\.?t").unwrap());

static IS_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"#").unwrap());

static IS_MAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)magnemite").unwrap());

static IS_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)identifier|ident|id").unwrap());

static IS_NORTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bn").unwrap());

fn fix_up(found: Trait, text: &str) -> Option<Trait> {
    if found.ambiguous_key == Some(true) {
        let near = before(text, found.start, LOOK_BACK_NEAR);
        if IS_ET.is_match(near) || IS_NUMBER.is_match(near) {
            return None;
        }
        let far = before(text, found.start, LOOK_BACK_FAR);
        if IS_MAG.is_match(far) || IS_ID.is_match(far) {
            return None;
        }
        if IS_NORTH.is_match(before(text, found.start, LOOK_AROUND))
            || IS_NORTH.is_match(after(text, found.end, LOOK_AROUND))
        {
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
            r" ear \s* (?: length | len ) \s* in \s* (?P<units> millimeters | mm ) ",
        )
        .leaf(
            Leaf::fragment(
                "char_measured_from",
                r" (?P<ambiguous_key> e ) /? (?P<measured_from1> n | c ) -? ",
            )
            .not_preceded_by(r" [a-z] \s? ")
            .not_followed_by(r" \.? [a-z] "),
        )
        .leaf(
            Leaf::fragment("char_key", r" (?P<ambiguous_key> e ) ")
                .not_preceded_by(r" \w \s? ")
                .not_followed_by(r" \.? \s? [a-z(] "),
        )
        .keyword("ear_tag", r" ear \s* tag ")
        .keyword(
            "keyword",
            r"
            ear \s* from \s* (?P<measured_from1> notch | crown )
            | ear \s* (?: length | len )
            | ear
            | ef (?P<measured_from2> n | c ) -?
            ",
        )
        .leaf(shared::fraction())
        .leaf(shared::shorthand_key())
        .leaf(shared::shorthand())
        .leaf(shared::range())
        .leaf(shared::len_units())
        .keyword("word", r" [a-z] \w* ")
        .fragment("sep", "[;,]")
        .replace_rule("key", &["keyword | char_key | char_measured_from"])
        .product_rule(fraction, &["key fraction (?P<units> len_units )?"])
        .product_rule(
            simple,
            &["key_with_units range", "key range (?P<units> len_units )?"],
        )
        .product_rule(
            shorthand(ShorthandSlot::EarLength),
            &["shorthand_key shorthand", "shorthand"],
        );

    Ok(Extractor::new(registry.finalize()?)
        .with_fix_up(fix_up)
        .with_zero_guard())
}
