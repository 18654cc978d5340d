//! Ovaries state: "ovaries immature", "large ovaries",
//! "corpus luteum visible in both ovaries", "ovaries: R 2 c. alb, L sev c. alb".

use super::reproductive::text_value;
use crate::engine::{Leaf, Production, Token};
use crate::error::ConfigError;
use crate::extractor::{Extractor, RecordPolicy};
use crate::trait_value::Trait;
use crate::vocabulary::{reproductive, shared};

pub const NAME: &str = "ovaries_state";

fn convert(token: &Token) -> Production {
    let Some(mut made) = text_value(token) else {
        return Production::Reject;
    };
    let all_digits = made
        .value
        .as_text()
        .map_or(true, |value| value.chars().all(|c| c.is_ascii_digit() || c.is_whitespace()));
    if all_digits {
        return Production::Reject;
    }
    if token.has_field("ambiguous_key") {
        made.ambiguous_key = Some(true);
    }
    made.side = token
        .field("side1")
        .or_else(|| token.field("side2"))
        .map(|side| side.trim().to_lowercase());
    made.into()
}

/// One state per side: "R 2 c. alb, L sev c. alb".
fn double(token: &Token) -> Production {
    let mut made = Vec::with_capacity(2);
    for (value, side) in [("value_a", "side_a"), ("value_b", "side_b")] {
        let Some(value) = token.field(value) else {
            return Production::Reject;
        };
        let mut one = Trait::text(value.trim().to_lowercase(), token.start, token.end);
        one.side = token.field(side).map(|side| side.trim().to_lowercase());
        made.push(one);
    }
    made.into()
}

pub fn build() -> Result<Extractor, ConfigError> {
    let mut registry = shared::registry(NAME);
    registry
        .leaf(reproductive::ovary())
        .leaf(reproductive::size())
        .leaf(reproductive::uterus())
        .leaf(reproductive::fallopian())
        .leaf(reproductive::mature())
        .leaf(reproductive::active())
        .leaf(reproductive::non())
        .leaf(reproductive::visible())
        .leaf(reproductive::destroyed())
        .leaf(reproductive::developed())
        .leaf(reproductive::count())
        .leaf(reproductive::horns())
        .leaf(reproductive::covered())
        .leaf(reproductive::fat())
        .leaf(reproductive::lut())
        .leaf(reproductive::corpus())
        .leaf(reproductive::alb())
        .leaf(shared::side())
        .leaf(reproductive::cyst())
        .leaf(reproductive::color())
        .leaf(reproductive::texture())
        .leaf(reproductive::sign())
        .leaf(reproductive::and())
        .leaf(shared::len_units())
        .keyword("skip", "womb")
        .leaf(reproductive::sep())
        .leaf(shared::cross())
        // "w/" is shorthand for "with", not part of the state
        .leaf(Leaf::fragment("word", r" [a-z] \w* ").not_followed_by("/"))
        // "ovaries and uterine horns", "ovaries and fallopian tubes"
        .replace_rule(
            "ovaries",
            &["ovary (?: (?: and? uterus horns? ) | and? fallopian )?"],
        )
        .replace_rule("coverage", &["covered word{0,2} fat"])
        .replace_rule("luteum", &["sign? corpus? (?: alb | lut )"])
        .replace_rule(
            "state",
            &["non? (?: active | mature | destroyed | visible | developed )"],
        )
        .replace_rule("measurement", &["cross len_units", "len_units cross", "cross"])
        .product_rule(
            double,
            &["ovaries
                (?P<side_a> side ) (?: measurement | count )? (?P<value_a> word? luteum )
                (?P<side_b> side ) (?: measurement | count )? (?P<value_b> word? luteum )"],
        )
        .product_rule(
            convert,
            &[
                "side? ovaries measurement?
                    (?P<value>
                        (?: word | color | texture | luteum | state | size | and | cyst ){0,3}
                        (?: color | texture | luteum | state | size | cyst | fallopian ) )",
                "side ovaries cross? size
                    (?P<value>
                        (?: word | color | texture | luteum | state | size | and | cyst ){0,3}
                        (?: color | texture | luteum | state | size | cyst | fallopian ) )",
                "ovaries side? (?P<value> word{0,3} (?: size | state | luteum ) )",
                "(?P<value> (?: size | state | count ){1,3} ) ovaries",
                "ovaries (?P<value> coverage )",
                "ovaries (?P<value> color | texture )",
                "(?P<value> luteum ) side? ovaries",
                "ovaries side? (?P<value> luteum )",
                "(?P<value> cyst ) side? ovaries",
                "(?P<value> luteum state? ) (?: word | len_units ){0,3} side? ovaries",
            ],
        );

    Ok(Extractor::new(registry.finalize()?).with_policy(RecordPolicy::FemaleOnly))
}
