//! Actions shared by the testes and ovaries extractors

use std::sync::Arc;

use crate::engine::{tokenize, CompiledRules, Fields, Production, Token};
use crate::error::ConfigError;
use crate::numeric;
use crate::trait_value::Trait;
use crate::vocabulary::shared;

/// The lowercased `value` capture as a text trait.
pub fn text_value(token: &Token) -> Option<Trait> {
    let value = token.field("value")?;
    Some(Trait::text(value.trim().to_lowercase(), token.start, token.end))
}

fn side_of(fields: &Fields) -> Option<String> {
    fields
        .get("side1")
        .or_else(|| fields.get("side2"))
        .map(|side| {
            side.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
                .to_lowercase()
        })
        .filter(|side| !side.is_empty())
}

fn opposite(side: &str) -> Option<&'static str> {
    match side {
        "l" => Some("r"),
        "r" => Some("l"),
        "left" => Some("right"),
        "right" => Some("left"),
        "lft" => Some("rt"),
        "rt" => Some("lft"),
        _ => None,
    }
}

/// A size measurement like "10x5 mm", with its dimension and side.
///
/// `ambiguous_char` marks a bare "T" key; a bare key followed by a single
/// number is more likely something else.
pub fn size(token: &Token) -> Production {
    if token.has_field("ambiguous_char") && !has_second_value(&token.fields) {
        return Production::Reject;
    }
    let Some(normalized) = numeric::cross(&token.fields) else {
        return Production::Reject;
    };
    let mut made = normalized.into_trait(token.start, token.end);
    if token.has_field("ambiguous_key") || token.has_field("ambiguous_char") {
        made.ambiguous_key = Some(true);
    }
    made.dimension = token.field("dim").map(str::to_lowercase);
    made.side = side_of(&token.fields);
    made.into()
}

fn has_second_value(fields: &Fields) -> bool {
    ["value2a", "value2b", "value2c"]
        .iter()
        .any(|key| fields.contains_key(*key))
}

const UNIT_FIELDS: [&str; 4] = ["units1a", "units1b", "units1c", "units2"];

fn unit_of(fields: &Fields) -> Option<String> {
    UNIT_FIELDS.iter().find_map(|key| fields.get(*key)).cloned()
}

/// Rules that split one side's text, like "left 10x5 mm", into its parts.
pub fn side_rules() -> Result<Arc<CompiledRules>, ConfigError> {
    let mut registry = shared::registry("side_cross");
    registry.leaf(shared::side()).leaf(shared::cross());
    Ok(Arc::new(registry.finalize()?))
}

/// The fields of one half of a double measurement: an optional side and a
/// cross with nothing but whitespace between them.
fn side_fields(rules: &CompiledRules, text: &str) -> Option<Fields> {
    let tokens = tokenize(rules, text);
    match tokens.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()[..] {
        ["cross"] | ["side", "cross"] => {}
        _ => return None,
    }
    let mut fields = Fields::new();
    let mut last_end = 0;
    for token in tokens {
        if !text[last_end..token.start].trim().is_empty() {
            return None;
        }
        last_end = token.end;
        fields.extend(token.fields);
    }
    Some(fields)
}

/// Two measurements, one per side: "left 10x5 mm, right 10x6 mm" or
/// "(R) 6 x 1.5 & 5 x 2 mm".
///
/// The texts of the `first` and `second` captures are split again with
/// [`side_rules`]. A side or unit given for only one measurement is shared;
/// a shared side becomes the opposite side.
pub fn double(rules: Arc<CompiledRules>) -> impl Fn(&Token) -> Production + Send + Sync + 'static {
    move |token: &Token| {
        let (Some(first), Some(second)) = (token.field("first"), token.field("second")) else {
            return Production::Reject;
        };
        let (Some(first), Some(second)) = (side_fields(&rules, first), side_fields(&rules, second))
        else {
            return Production::Reject;
        };
        let mut pair = [first, second];

        let units = [unit_of(&pair[0]), unit_of(&pair[1])];
        for (fields, other) in pair.iter_mut().zip([&units[1], &units[0]]) {
            if unit_of(fields).is_none() {
                if let Some(unit) = other {
                    fields.insert("units".to_string(), unit.clone());
                }
            }
        }

        let sides = [side_of(&pair[0]), side_of(&pair[1])];
        let sides = [
            sides[0].clone().or_else(|| sides[1].as_deref().and_then(opposite).map(String::from)),
            sides[1].clone().or_else(|| sides[0].as_deref().and_then(opposite).map(String::from)),
        ];

        let mut made = Vec::with_capacity(2);
        for (fields, side) in pair.iter().zip(sides) {
            let Some(normalized) = numeric::cross(fields) else {
                return Production::Reject;
            };
            let mut one = normalized.into_trait(token.start, token.end);
            one.side = side;
            made.push(one);
        }
        made.into()
    }
}
