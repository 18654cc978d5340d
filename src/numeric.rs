//! Numeric value normalization
//!
//! Free functions used by trait actions to turn matched number text into
//! canonical values: plain numbers, ranges, crosses, fractions, compound
//! units ("2 ft 3 in") and the positional shorthand notation
//! ("11-22-33-44:55g"). Noisy text never panics or errors; it degrades to
//! "no value" (`None`) or to an unconverted value with inferred units.

pub mod units;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::engine::Fields;
use crate::trait_value::{Trait, TraitValue, Units};

static RANGE_JOINER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s*(?:-|–|\bto\b)\s*").unwrap());

static FRACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?P<whole>\d+)\s+)?(?P<numerator>\d+)\s*/\s*(?P<denominator>\d+)\s*$").unwrap()
});

/// Strip everything but digits and dots, then parse.
pub fn to_float(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}

/// The digits of a count like "12" or "x3"; words like "none" count as 0.
pub fn to_int(text: &str) -> u32 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `value` in millimeters or grams, `None` when the unit is unknown.
pub fn convert(value: f64, unit: &str) -> Option<f64> {
    units::multiplier(unit).map(|factor| value * factor)
}

/// Values and units ready to be copied onto a trait.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub value: TraitValue,
    pub units: Option<Units>,
    pub units_inferred: bool,
}

impl Normalized {
    pub fn apply(self, target: &mut Trait) {
        target.value = self.value;
        target.units = self.units;
        target.units_inferred = Some(self.units_inferred);
    }

    pub fn into_trait(self, start: usize, end: usize) -> Trait {
        let mut made = Trait::number(0.0, start, end);
        self.apply(&mut made);
        made
    }
}

fn squash_values(values: &[f64]) -> Option<TraitValue> {
    match values {
        [single] => Some(TraitValue::Number(*single)),
        [low, high, ..] => Some(TraitValue::Range(*low, *high)),
        [] => None,
    }
}

fn squash_units(spellings: &[String]) -> Option<Units> {
    match spellings {
        [] => None,
        [single] => Some(Units::One(single.clone())),
        [first, second, ..] if first == second => Some(Units::One(first.clone())),
        [first, second, ..] => Some(Units::Pair(first.clone(), second.clone())),
    }
}

/// Convert one or two values with their unit spellings.
///
/// A value without its own unit uses the last unit given. With no unit, or
/// an unknown one, the value stays exactly as written and the units are
/// inferred. Converted values are rounded to 2 decimals, so a value that is
/// converted later (a trailing inch mark) is only rounded once.
pub fn normalize(values: &[f64], unit_texts: &[&str]) -> Option<Normalized> {
    let spellings: Vec<String> = unit_texts
        .iter()
        .map(|u| u.trim().to_lowercase())
        .filter(|u| !u.is_empty())
        .collect();
    let mut inferred = spellings.is_empty();
    let mut converted = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        let unit = spellings.get(i).or(spellings.last());
        let value = match unit.and_then(|u| convert(*value, u)) {
            Some(v) => round2(v),
            None => {
                inferred = true;
                *value
            }
        };
        converted.push(value);
    }
    Some(Normalized {
        value: squash_values(&converted)?,
        units: squash_units(&spellings),
        units_inferred: inferred,
    })
}

/// Split "14-22" or "14 to 22" into its parts.
pub fn split_range(text: &str) -> Vec<&str> {
    RANGE_JOINER
        .split(text.trim())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Parse a range's two ends, keeping their order.
pub fn range_values(low: &str, high: Option<&str>) -> Option<Vec<f64>> {
    let mut values = vec![to_float(low)?];
    if let Some(high) = high {
        values.push(to_float(high)?);
    }
    Some(values)
}

/// `whole + numerator / denominator`; a zero denominator is no value.
pub fn fraction(whole: Option<&str>, numerator: &str, denominator: &str) -> Option<f64> {
    let whole = whole.and_then(to_float).unwrap_or(0.0);
    let numerator = to_float(numerator)?;
    let denominator = to_float(denominator)?;
    if denominator == 0.0 {
        return None;
    }
    Some(whole + numerator / denominator)
}

/// Parse a written fraction like "10 3/8" or "3/8".
pub fn fraction_text(text: &str) -> Option<f64> {
    let caps = FRACTION.captures(text)?;
    fraction(
        caps.name("whole").map(|m| m.as_str()),
        caps.name("numerator")?.as_str(),
        caps.name("denominator")?.as_str(),
    )
}

/// Sum a measurement written in two units, like "2 lbs 3-4 oz".
///
/// The smaller part may be a range, giving a range.
pub fn compound(big: &str, big_unit: &str, small: &str, small_unit: &str) -> Option<Normalized> {
    let base = convert(to_float(big)?, big_unit)?;
    let mut values = Vec::new();
    for part in split_range(small) {
        values.push(round2(base + convert(to_float(part)?, small_unit)?));
    }
    Some(Normalized {
        value: squash_values(&values)?,
        units: Some(Units::Pair(
            big_unit.trim().to_lowercase(),
            small_unit.trim().to_lowercase(),
        )),
        units_inferred: false,
    })
}

/// A positional field of the shorthand notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShorthandSlot {
    TotalLength,
    TailLength,
    HindFootLength,
    EarLength,
    Weight,
}

impl ShorthandSlot {
    fn suffix(self) -> &'static str {
        match self {
            ShorthandSlot::TotalLength => "tl",
            ShorthandSlot::TailLength => "tal",
            ShorthandSlot::HindFootLength => "hfl",
            ShorthandSlot::EarLength => "el",
            ShorthandSlot::Weight => "wt",
        }
    }

    pub fn value_field(self) -> String {
        format!("shorthand_{}", self.suffix())
    }

    pub fn estimated_field(self) -> String {
        format!("estimated_{}", self.suffix())
    }
}

/// Read one slot of a shorthand match.
///
/// Lengths have no unit in the notation, so they are inferred millimeters.
/// The weight uses its trailing unit when there is one. Unknown slots
/// ("?", "x", "n/d") give `None`.
pub fn shorthand(fields: &Fields, slot: ShorthandSlot) -> Option<Trait> {
    let value = to_float(fields.get(&slot.value_field())?)?;
    let normalized = match slot {
        ShorthandSlot::Weight => {
            let unit = fields.get("shorthand_wt_units").map_or("", String::as_str);
            normalize(&[value], &[unit])?
        }
        _ => Normalized {
            value: TraitValue::Number(round2(value)),
            units: None,
            units_inferred: true,
        },
    };
    let mut made = normalized.into_trait(0, 0);
    if fields.contains_key(&slot.estimated_field()) {
        made.estimated_value = Some(true);
    }
    made.set_flag("is_shorthand", "true");
    Some(made)
}

/// Read a cross like "12 x 34 mm" or "12mm x 34cm", or a lone value.
///
/// The second value comes from whichever cross form matched. Units from a
/// key ("units") come before the units written next to the values.
pub fn cross(fields: &Fields) -> Option<Normalized> {
    let mut values = vec![to_float(fields.get("value1")?)?];
    if let Some(second) = ["value2a", "value2b", "value2c"]
        .iter()
        .find_map(|key| fields.get(*key))
    {
        values.push(to_float(second)?);
    }
    let units: Vec<&str> = ["units", "units1a", "units1b", "units1c", "units2"]
        .iter()
        .filter_map(|key| fields.get(*key).map(String::as_str))
        .collect();
    normalize(&values, &units)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shorthand_fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_to_int() {
        assert_eq!(to_int("12"), 12);
        assert_eq!(to_int(" 3 "), 3);
        assert_eq!(to_int("none"), 0);
        assert_eq!(to_int(""), 0);
    }

    #[test]
    fn test_to_float() {
        assert_eq!(to_float("12.5"), Some(12.5));
        assert_eq!(to_float("1,192.0"), Some(1192.0));
        assert_eq!(to_float("~20"), Some(20.0));
        assert_eq!(to_float("?"), None);
        assert_eq!(to_float("1.2.3"), None);
        assert_eq!(to_float(""), None);
    }

    #[test]
    fn test_convert_canonical_identity() {
        assert_eq!(convert(42.5, "mm"), Some(42.5));
        assert_eq!(convert(42.5, "g"), Some(42.5));
    }

    #[test]
    fn test_convert_every_spelling() {
        for (spelling, factor) in units::table() {
            assert_eq!(convert(1.0, spelling), Some(factor), "{}", spelling);
        }
    }

    #[test]
    fn test_normalize_rounds() {
        let n = normalize(&[2.0], &["ft"]).unwrap();
        assert_eq!(n.value, TraitValue::Number(609.6));
        assert_eq!(n.units, Some(Units::One("ft".into())));
        assert!(!n.units_inferred);

        let n = normalize(&[1.0], &["lb"]).unwrap();
        assert_eq!(n.value, TraitValue::Number(453.59));
    }

    #[test]
    fn test_normalize_without_units() {
        let n = normalize(&[13.0], &[]).unwrap();
        assert_eq!(n.value, TraitValue::Number(13.0));
        assert_eq!(n.units, None);
        assert!(n.units_inferred);
    }

    #[test]
    fn test_unitless_values_are_not_rounded() {
        let n = normalize(&[1.0 / 3.0], &[]).unwrap();
        assert_eq!(n.value, TraitValue::Number(1.0 / 3.0));

        let n = normalize(&n.value.numbers(), &["\""]).unwrap();
        assert_eq!(n.value, TraitValue::Number(8.47));
    }

    #[test]
    fn test_normalize_unknown_unit() {
        let n = normalize(&[13.0], &["cubits"]).unwrap();
        assert_eq!(n.value, TraitValue::Number(13.0));
        assert!(n.units_inferred);
    }

    #[test]
    fn test_normalize_pair_reuses_last_unit() {
        let n = normalize(&[1.0, 2.0], &["cm"]).unwrap();
        assert_eq!(n.value, TraitValue::Range(10.0, 20.0));
        assert_eq!(n.units, Some(Units::One("cm".into())));
    }

    #[test]
    fn test_normalize_pair_with_two_units() {
        let n = normalize(&[1.0, 2.0], &["cm", "mm"]).unwrap();
        assert_eq!(n.value, TraitValue::Range(10.0, 2.0));
        assert_eq!(n.units, Some(Units::Pair("cm".into(), "mm".into())));
    }

    #[test]
    fn test_range_keeps_order() {
        assert_eq!(range_values("22", Some("14")), Some(vec![22.0, 14.0]));
        assert_eq!(range_values("x", Some("14")), None);
        assert_eq!(split_range("3.1 - 4.5"), vec!["3.1", "4.5"]);
        assert_eq!(split_range("14 to 22"), vec!["14", "22"]);
    }

    #[test]
    fn test_fraction() {
        assert_eq!(fraction_text("10 3/8"), Some(10.375));
        assert_eq!(fraction_text("3/4"), Some(0.75));
        assert_eq!(fraction(None, "1", "0"), None);
    }

    #[test]
    fn test_compound_mass_range() {
        let n = compound("2", "lbs", "3.1 - 4.5", "oz").unwrap();
        assert_eq!(n.value, TraitValue::Range(995.07, 1034.76));
        assert_eq!(n.units, Some(Units::Pair("lbs".into(), "oz".into())));
        assert!(!n.units_inferred);
    }

    #[test]
    fn test_compound_length() {
        let n = compound("4", "ft", "9", "in").unwrap();
        assert_eq!(n.value, TraitValue::Number(1447.8));
    }

    #[test]
    fn test_shorthand_slots() {
        let fields = shorthand_fields(&[
            ("shorthand_tl", "11"),
            ("shorthand_tal", "?"),
            ("shorthand_hfl", "33"),
            ("estimated_hfl", "["),
            ("shorthand_el", "44"),
            ("shorthand_wt", "55"),
            ("shorthand_wt_units", "g"),
        ]);

        let total = shorthand(&fields, ShorthandSlot::TotalLength).unwrap();
        assert_eq!(total.value, TraitValue::Number(11.0));
        assert_eq!(total.units_inferred, Some(true));
        assert_eq!(total.flag("is_shorthand"), Some("true"));

        assert!(shorthand(&fields, ShorthandSlot::TailLength).is_none());

        let foot = shorthand(&fields, ShorthandSlot::HindFootLength).unwrap();
        assert_eq!(foot.estimated_value, Some(true));

        let weight = shorthand(&fields, ShorthandSlot::Weight).unwrap();
        assert_eq!(weight.value, TraitValue::Number(55.0));
        assert_eq!(weight.units, Some(Units::One("g".into())));
        assert_eq!(weight.units_inferred, Some(false));
    }

    #[test]
    fn test_shorthand_weight_without_units() {
        let fields = shorthand_fields(&[("shorthand_wt", "13")]);
        let weight = shorthand(&fields, ShorthandSlot::Weight).unwrap();
        assert_eq!(weight.units, None);
        assert_eq!(weight.units_inferred, Some(true));
    }

    #[test]
    fn test_cross_forms() {
        let n = cross(&shorthand_fields(&[
            ("value1", "10"),
            ("value2b", "5"),
            ("units1b", "mm"),
        ]))
        .unwrap();
        assert_eq!(n.value, TraitValue::Range(10.0, 5.0));
        assert_eq!(n.units, Some(Units::One("mm".into())));

        let n = cross(&shorthand_fields(&[
            ("value1", "1"),
            ("units1a", "cm"),
            ("value2a", "5"),
            ("units2", "mm"),
        ]))
        .unwrap();
        assert_eq!(n.value, TraitValue::Range(10.0, 5.0));
        assert_eq!(n.units, Some(Units::Pair("cm".into(), "mm".into())));

        let n = cross(&shorthand_fields(&[("value1", "7")])).unwrap();
        assert_eq!(n.value, TraitValue::Number(7.0));
        assert!(n.units_inferred);
    }
}
