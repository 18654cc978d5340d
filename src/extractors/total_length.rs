//! Total length, also snout-vent and fork length: "total length= 2 ft.",
//! "SVL 44 mm", "4 ft 9 in" and the first slot of "11-22-33-44:55g".

use once_cell::sync::Lazy;
use regex::Regex;

use super::measure::{
    after, before, compound, fraction, numeric_fix_ups, shorthand, simple, simple_with_units,
    LOOK_AROUND, LOOK_BACK_FAR, LOOK_BACK_NEAR,
};
use crate::engine::Leaf;
use crate::error::ConfigError;
use crate::extractor::Extractor;
use crate::numeric::ShorthandSlot;
use crate::trait_value::Trait;
use crate::vocabulary::shared;

pub const NAME: &str = "total_length";

static IS_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)identifier|ident|id|collector").unwrap());

static IS_TRAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)trap").unwrap());

static IS_TESTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)reproductive|gonad|test|scrotal|scrotum|scrot").unwrap()
});

// "L" is also short for left.
static IS_LEFT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\br\b").unwrap());

fn fix_up(found: Trait, text: &str) -> Option<Trait> {
    if IS_ID.is_match(before(text, found.start, LOOK_BACK_FAR)) {
        return None;
    }
    if IS_TRAP.is_match(before(text, found.start, LOOK_BACK_NEAR)) {
        return None;
    }
    if found.ambiguous_key == Some(true) {
        let preceding = before(text, found.start, LOOK_AROUND);
        if IS_TESTES.is_match(preceding)
            || IS_LEFT.is_match(preceding)
            || IS_LEFT.is_match(after(text, found.end, LOOK_AROUND))
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
            r" (?: total | snout \s* vent | head \s* body | fork ) \s*
                (?: length | len )? \s* in \s* (?P<units> millimeters | mm ) ",
        )
        .leaf(
            Leaf::fragment(
                "len_key",
                r"
                t \s* [o.]? \s* l [._]?
                | total [\s-]* length [\s-]* in
                | (?: total | max | standard ) [\s-]* lengths? \b
                | meas [\s*:]? \s* length [\s(]* l [)\s:]*
                | s \.? \s? v \.? \s? l \.?
                | s \.? \s? l \.?
                | label [\s.]* lengths? \b
                | (?: fork | mean | body ) [\s-]* lengths? \b
                | snout [\s-]* vent [\s-]* lengths? \b
                ",
            )
            .not_preceded_by("[a-z]")
            .not_followed_by("[a-z]"),
        )
        .keyword("skip", " horns? | tag ")
        .leaf(
            Leaf::fragment("ambiguous", r" (?P<ambiguous_key> lengths? ) ")
                .not_preceded_by(r" [a-z] \s* "),
        )
        .keyword("key_units_req", " measurements? | body | total ")
        .leaf(shared::shorthand_key())
        .leaf(shared::shorthand())
        .leaf(shared::triple())
        .leaf(shared::fraction())
        .leaf(shared::compound_len())
        .leaf(shared::range())
        .leaf(shared::len_units())
        .leaf(
            Leaf::fragment("char_key", r" \b (?P<ambiguous_key> l ) ").followed_by("[:=-]"),
        )
        .replace_rule(
            "key",
            &["key_with_units | len_key | shorthand_key | ambiguous | char_key"],
        )
        .replace_rule("value", &["range (?P<units> len_units )", "range"])
        .product_rule(
            simple,
            &[
                "value key",
                "key value key?",
                "key (?P<units> len_units ) value",
            ],
        )
        .product_rule(compound, &["key? compound_len"])
        .product_rule(
            fraction,
            &["(?: key | key_units_req ) fraction (?P<units> len_units )"],
        )
        .product_rule(simple, &["key triple value"])
        .product_rule(simple_with_units, &["key_units_req triple? value"])
        .product_rule(
            shorthand(ShorthandSlot::TotalLength),
            &[
                "(?: key | key_units_req ) shorthand",
                "shorthand",
                "(?: key | key_units_req ) triple (?! shorthand | value )",
            ],
        );

    Ok(Extractor::new(registry.finalize()?)
        .with_fix_up(fix_up)
        .with_zero_guard())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trait_value::{TraitValue, Units};

    fn parse(text: &str) -> Vec<Trait> {
        build().unwrap().parse(text, "remarks")
    }

    #[test]
    fn test_feet() {
        let traits = parse("total length= 2 ft.");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(609.6));
        assert_eq!(traits[0].units, Some(Units::One("ft".into())));
        assert_eq!(traits[0].units_inferred, Some(false));
    }

    #[test]
    fn test_units_in_key() {
        let traits = parse("totalLengthInMM=123");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(123.0));
        assert_eq!(traits[0].units, Some(Units::One("mm".into())));
    }

    #[test]
    fn test_svl_range() {
        let traits = parse("SVL 44-48 mm");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Range(44.0, 48.0));
    }

    #[test]
    fn test_shorthand_slot() {
        let traits = parse("11-22-33-44:55g");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(11.0));
        assert_eq!(traits[0].units_inferred, Some(true));
        assert_eq!(traits[0].flag("is_shorthand"), Some("true"));
    }

    #[test]
    fn test_compound_feet_inches() {
        let traits = parse("total length 4 ft 9 in");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(1447.8));
        assert_eq!(traits[0].units, Some(Units::Pair("ft".into(), "in".into())));
    }

    #[test]
    fn test_units_required_key() {
        assert!(parse("body 12").is_empty());
        let traits = parse("body 12 cm");
        assert_eq!(traits[0].value, TraitValue::Number(120.0));
    }

    #[test]
    fn test_identifier_vetoes() {
        assert!(parse("collector id 11-22-33-44").is_empty());
    }

    #[test]
    fn test_ambiguous_length_near_testes() {
        assert!(parse("testes: length 8 mm").is_empty());
        let traits = parse("length 80 mm");
        assert_eq!(traits[0].ambiguous_key, Some(true));
    }

    #[test]
    fn test_trailing_inch_mark() {
        let traits = parse(r#"total length 9" long"#);
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(228.6));
        assert_eq!(traits[0].units, Some(Units::One("\"".into())));
    }
}
