//! Actions and fix-ups shared by the numeric extractors
//!
//! Actions read the fields the shared leaves capture (`value1`, `value2`,
//! `units`, `whole`, `numerator`, ...) and never look at the text. Fix-ups
//! get the whole field text and look at fixed windows around a trait.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::engine::{Production, Token};
use crate::numeric::{self, ShorthandSlot};
use crate::trait_value::{Trait, Units};

/// Characters searched before a trait for words that disqualify it.
pub const LOOK_BACK_FAR: usize = 40;
/// A shorter look back for words that must sit right before a trait.
pub const LOOK_BACK_NEAR: usize = 10;
/// Characters searched on both sides of an abbreviated key.
pub const LOOK_AROUND: usize = 10;

static IS_COLLECTOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)collector").unwrap());

static INCH_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^\d""#).unwrap());

static CLOSES_STRING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\}").unwrap());

/// Up to `size` bytes of `text` ending at `start`.
pub fn before(text: &str, start: usize, size: usize) -> &str {
    let start = start.min(text.len());
    let mut from = start.saturating_sub(size);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    text.get(from..start).unwrap_or("")
}

/// Up to `size` bytes of `text` starting at `end`.
pub fn after(text: &str, end: usize, size: usize) -> &str {
    let end = end.min(text.len());
    let mut to = (end + size).min(text.len());
    while !text.is_char_boundary(to) {
        to += 1;
    }
    text.get(end..to).unwrap_or("")
}

fn add_flags(token: &Token, made: &mut Trait) {
    if token.has_field("ambiguous_key") {
        made.ambiguous_key = Some(true);
    }
    if token.has_field("estimated_value") {
        made.estimated_value = Some(true);
    }
    made.measured_from = token
        .field("measured_from1")
        .or_else(|| token.field("measured_from2"))
        .map(str::to_lowercase);
    made.includes = token.field("includes").map(str::to_lowercase);
}

fn units_of(token: &Token) -> Vec<&str> {
    token.field("units").into_iter().collect()
}

/// A number or range, with the units given by the rule if any.
pub fn simple(token: &Token) -> Production {
    let values = match token.field("value1") {
        Some(low) => numeric::range_values(low, token.field("value2")),
        None => None,
    };
    let Some(normalized) = values.and_then(|values| numeric::normalize(&values, &units_of(token)))
    else {
        return Production::Reject;
    };
    let mut made = normalized.into_trait(token.start, token.end);
    add_flags(token, &mut made);
    made.into()
}

/// Like [`simple`], but a bare number is not enough.
pub fn simple_with_units(token: &Token) -> Production {
    if !token.has_field("units") {
        return Production::Reject;
    }
    simple(token)
}

/// A fraction like "10 3/8", converted when the rule found units.
pub fn fraction(token: &Token) -> Production {
    let value = match (token.field("numerator"), token.field("denominator")) {
        (Some(numerator), Some(denominator)) => {
            numeric::fraction(token.field("whole"), numerator, denominator)
        }
        _ => None,
    };
    let Some(normalized) = value.and_then(|v| numeric::normalize(&[v], &units_of(token))) else {
        return Production::Reject;
    };
    let mut made = normalized.into_trait(token.start, token.end);
    add_flags(token, &mut made);
    made.into()
}

/// Two units summed, like "4 ft 9 in" or "2 lbs 3-4 oz".
pub fn compound(token: &Token) -> Production {
    let fields = ["big", "big_units", "small", "small_units"].map(|key| token.field(key));
    let [Some(big), Some(big_units), Some(small), Some(small_units)] = fields else {
        return Production::Reject;
    };
    let Some(normalized) = numeric::compound(big, big_units, small, small_units) else {
        return Production::Reject;
    };
    let mut made = normalized.into_trait(token.start, token.end);
    add_flags(token, &mut made);
    made.into()
}

/// Read one slot of a shorthand notation.
pub fn shorthand(slot: ShorthandSlot) -> impl Fn(&Token) -> Production + Send + Sync + 'static {
    move |token: &Token| {
        numeric::shorthand(&token.fields, slot)
            .map(|mut made| {
                made.start = token.start;
                made.end = token.end;
                made
            })
            .into()
    }
}

/// Shorthand next to a collector's name is a collector number.
pub fn fix_up_shorthand(found: Trait, text: &str) -> Option<Trait> {
    let shorthand = found.flag("is_shorthand").is_some();
    if shorthand && IS_COLLECTOR.is_match(before(text, found.start, LOOK_BACK_FAR)) {
        return None;
    }
    Some(found)
}

/// A unitless number followed by `"` is in inches, unless the quote closes
/// a JSON-like string or the match already holds a quote.
pub fn fix_up_inches(mut found: Trait, text: &str) -> Option<Trait> {
    if found.units.is_some() || found.end == 0 {
        return Some(found);
    }
    let marked = text
        .get(found.end - 1..)
        .is_some_and(|tail| INCH_MARK.is_match(tail) && !CLOSES_STRING.is_match(&tail[2..]));
    let quoted = text
        .get(found.start..found.end)
        .is_some_and(|span| span.contains('"'));
    if !marked || quoted {
        return Some(found);
    }
    if let Some(normalized) = numeric::normalize(&found.value.numbers(), &["\""]) {
        normalized.apply(&mut found);
        found.units = Some(Units::One("\"".to_string()));
        found.end += 1;
    }
    Some(found)
}

pub fn numeric_fix_ups(found: Trait, text: &str) -> Option<Trait> {
    fix_up_shorthand(found, text).and_then(|found| fix_up_inches(found, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Fields, TypeCode};
    use crate::trait_value::TraitValue;

    fn token(pairs: &[(&str, &str)]) -> Token {
        let fields: Fields = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Token::new(TypeCode(0), "t", 3, 12).with_fields(fields)
    }

    fn only(production: Production) -> Trait {
        match production {
            Production::Traits(mut traits) if traits.len() == 1 => traits.remove(0),
            other => panic!("expected one trait, got {:?}", other),
        }
    }

    #[test]
    fn test_windows_stop_at_text_edges() {
        assert_eq!(before("abcdef", 4, 10), "abcd");
        assert_eq!(before("abcdef", 4, 2), "cd");
        assert_eq!(after("abcdef", 4, 10), "ef");
        assert_eq!(before("é1", 2, 1), "é");
    }

    #[test]
    fn test_simple_range_with_units() {
        let made = only(simple(&token(&[("value1", "1"), ("value2", "2"), ("units", "cm")])));
        assert_eq!(made.value, TraitValue::Range(10.0, 20.0));
        assert_eq!(made.units, Some(Units::One("cm".into())));
        assert_eq!(made.units_inferred, Some(false));
        assert_eq!((made.start, made.end), (3, 12));
        assert_eq!(made.ambiguous_key, None);
    }

    #[test]
    fn test_simple_flags() {
        let made = only(simple(&token(&[
            ("value1", "9"),
            ("ambiguous_key", "e"),
            ("measured_from1", "N"),
            ("estimated_value", "["),
        ])));
        assert_eq!(made.units_inferred, Some(true));
        assert_eq!(made.ambiguous_key, Some(true));
        assert_eq!(made.estimated_value, Some(true));
        assert_eq!(made.measured_from.as_deref(), Some("n"));
    }

    #[test]
    fn test_simple_rejects_bad_numbers() {
        assert_eq!(simple(&token(&[("value1", "?")])), Production::Reject);
        assert_eq!(simple_with_units(&token(&[("value1", "9")])), Production::Reject);
    }

    #[test]
    fn test_fraction_with_units() {
        let made = only(fraction(&token(&[
            ("whole", "1 "),
            ("numerator", "1"),
            ("denominator", "2"),
            ("units", "in"),
        ])));
        assert_eq!(made.value, TraitValue::Number(38.1));
        assert_eq!(
            fraction(&token(&[("numerator", "1"), ("denominator", "0")])),
            Production::Reject
        );
    }

    #[test]
    fn test_compound_feet_and_inches() {
        let made = only(compound(&token(&[
            ("big", "4"),
            ("big_units", "ft"),
            ("small", "9"),
            ("small_units", "in"),
        ])));
        assert_eq!(made.value, TraitValue::Number(1447.8));
        assert_eq!(made.units, Some(Units::Pair("ft".into(), "in".into())));
    }

    #[test]
    fn test_shorthand_slot_span() {
        let action = shorthand(ShorthandSlot::TailLength);
        let made = only(action(&token(&[("shorthand_tl", "11"), ("shorthand_tal", "22")])));
        assert_eq!(made.value, TraitValue::Number(22.0));
        assert_eq!((made.start, made.end), (3, 12));
        assert_eq!(made.flag("is_shorthand"), Some("true"));

        let missing = action(&token(&[("shorthand_tl", "11"), ("shorthand_tal", "?")]));
        assert_eq!(missing, Production::Reject);
    }

    #[test]
    fn test_fix_up_inches() {
        let text = r#"ear 9" long"#;
        let found = Trait::number(9.0, 0, 5);
        let fixed = fix_up_inches(found, text).unwrap();
        assert_eq!(fixed.value, TraitValue::Number(228.6));
        assert_eq!(fixed.units, Some(Units::One("\"".into())));
        assert_eq!(fixed.units_inferred, Some(false));
        assert_eq!(fixed.end, 6);
    }

    #[test]
    fn test_fix_up_inches_skips_json_strings() {
        let text = r#"{"ear":"9"}"#;
        let found = Trait::number(9.0, 7, 9);
        let kept = fix_up_inches(found.clone(), text).unwrap();
        assert_eq!(kept, found);
    }

    #[test]
    fn test_fix_up_shorthand_near_collector() {
        let mut found = Trait::number(11.0, 14, 25);
        found.set_flag("is_shorthand", "true");
        assert!(fix_up_shorthand(found.clone(), "collector no. 11-22-33-44").is_none());
        assert!(fix_up_shorthand(found, "on tag label 11-22-33-44").is_some());
    }
}
