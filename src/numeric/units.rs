//! Unit spellings and their multipliers
//!
//! Lengths convert to millimeters and masses to grams. Lookups ignore case,
//! dots and inner whitespace, so "C.M.", "cm." and "CM" are the same unit.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Spellings of one unit and its multiplier to the canonical unit.
type UnitRow = (&'static [&'static str], f64);

const LENGTHS: &[UnitRow] = &[
    (&["mm", "mms", "millimeter", "millimeters", "millimetre", "millimetres"], 1.0),
    (&["cm", "cms", "centimeter", "centimeters", "centimetre", "centimetres"], 10.0),
    (&["m", "meter", "meters", "metre", "metres"], 1000.0),
    (&["in", "ins", "inch", "inches", "\""], 25.4),
    (&["ft", "fts", "foot", "feet", "'"], 304.8),
];

const MASSES: &[UnitRow] = &[
    (&["g", "gs", "gm", "gms", "gr", "grs", "gram", "grams", "gramme", "grammes"], 1.0),
    (&["mg", "mgs", "milligram", "milligrams"], 0.001),
    (&["kg", "kgs", "kilogram", "kilograms"], 1000.0),
    (&["lb", "lbs", "pound", "pounds"], 453.5924),
    (&["oz", "ozs", "ounce", "ounces"], 28.34952),
];

static MULTIPLIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| table().collect());

/// The lookup form of a unit spelling.
pub fn normalize_spelling(unit: &str) -> String {
    unit.chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Multiplier from `unit` to millimeters or grams.
pub fn multiplier(unit: &str) -> Option<f64> {
    MULTIPLIERS.get(normalize_spelling(unit).as_str()).copied()
}

/// Every spelling in the table with its multiplier.
pub fn table() -> impl Iterator<Item = (&'static str, f64)> {
    LENGTHS
        .iter()
        .chain(MASSES)
        .flat_map(|(spellings, factor)| spellings.iter().map(move |s| (*s, *factor)))
}
