//! Placental scar count: "7 plac scar", "5 plac scar 3L 2R",
//! "2+1=3 placental scars", "no placental scars".
//!
//! Counts given per side are kept as flags named after the side ("left",
//! "right"). A count without a side is flagged "side1" or "side2" by its
//! position. A bare mention of scarring is the state "present".

use crate::engine::{Leaf, Production, Token};
use crate::error::ConfigError;
use crate::extractor::{Extractor, RecordPolicy};
use crate::numeric;
use crate::trait_value::Trait;
use crate::vocabulary::{reproductive, shared};

pub const NAME: &str = "placental_scar_count";

/// Counts this high are catalog or field numbers.
const MAX_COUNT: u32 = 1000;

fn side_name(side: Option<&str>) -> Option<&'static str> {
    let letter = side?.chars().find(char::is_ascii_alphabetic)?;
    match letter.to_ascii_lowercase() {
        'l' => Some("left"),
        'r' => Some("right"),
        _ => None,
    }
}

/// The total is written or is the sum of the per-side counts.
fn convert_count(token: &Token) -> Production {
    let count = |key: &str| token.field(key).map_or(0, numeric::to_int);
    let (count1, count2) = (count("count1"), count("count2"));
    let value = match count("value") {
        0 => count1 + count2,
        written => written,
    };
    if value >= MAX_COUNT {
        return Production::Reject;
    }

    let mut made = Trait::number(f64::from(value), token.start, token.end);
    for (side_count, side, position) in [(count1, "side1", "side1"), (count2, "side2", "side2")] {
        match side_name(token.field(side)) {
            Some(side) => made.set_flag(side, side_count.to_string()),
            None if side_count > 0 => made.set_flag(position, side_count.to_string()),
            None => {}
        }
    }
    made.into()
}

fn convert_state(token: &Token) -> Production {
    Trait::text("present", token.start, token.end).into()
}

pub fn build() -> Result<Extractor, ConfigError> {
    let mut registry = shared::registry(NAME);
    registry
        .leaf(shared::uuid())
        .fragment(
            "scar_key",
            r"
            (?: placental | plac \b | postnatal | pac \b | \b pl \b ) [.\s]* (?: scarring | scars? )
            | \b p [\s.-] (?: scarring | scars? )
            | (?: uterus | uterine | \b ut \b ) [.\s]* (?: scarring | scars? )
            | \b (?: ps | pslc | plac | plscr ) \b
            ",
        )
        // Scars "on" or "above" something are not placental
        .leaf(
            Leaf::keyword("scar_word", r" scarring | scars? ")
                .not_followed_by(r" \s* (?: on | above | below ) \b "),
        )
        .leaf(Leaf::fragment("integer", r" \d+ ").not_followed_by(r" [%\d-] "))
        .leaf(
            Leaf::fragment(
                "side",
                r" [(\[] \s* [lr] \s* [)\]] | left | right | lf | lt | rt | [lr] ",
            )
            .not_preceded_by("[a-z]")
            .not_followed_by("[a-z]"),
        )
        .keyword("none", " no | none | not | non ")
        .fragment("op", " [+:&] ")
        .fragment("eq", " = ")
        .leaf(reproductive::embryo())
        .keyword("conj", " or | and ")
        .keyword("prep", " to | with | on | of ")
        .keyword("adj", " faint | prominent | recent | old | possible ")
        .keyword("visible", " visible | definite ")
        .leaf(reproductive::word())
        .fragment("sep", " [;/] ")
        .replace_rule("plac_scar", &["scar_key", "scar_word"])
        .replace_rule(
            "count",
            &["none embryo conj", "none visible", "integer", "none"],
        )
        .product_rule(
            convert_count,
            &[
                // 2+1=3 placental scars
                "(?P<count1> count ) op (?P<count2> count ) (?: eq (?P<value> count ) )? plac_scar",
                "plac_scar
                    (?P<count1> count ) prep? (?P<side1> side )
                    (?: (?P<count2> count ) prep? (?P<side2> side ) )?",
                "(?P<count1> count ) prep? (?P<side1> side ) plac_scar
                    (?: (?P<count2> count ) prep? (?P<side2> side ) plac_scar? )?",
                "(?P<side1> side ) (?P<count1> count ) (?: visible | op )? plac_scar
                    (?: (?P<side2> side ) (?P<count2> count ) visible? (?: visible | op )? plac_scar? )?",
                "(?P<count1> count ) prep? (?P<side1> side )
                    (?: (?P<count2> count ) prep? (?P<side2> side ) )?
                    plac_scar",
                "(?P<count1> count ) plac_scar (?P<side1> side )
                    (?: (?P<count2> count ) plac_scar (?P<side2> side ) )?",
                "plac_scar (?P<side1> side ) (?P<count1> count )
                    (?: plac_scar (?P<side2> side ) (?P<count2> count ) )?",
                "plac_scar (?P<count1> count ) op (?P<count2> count ) (?: eq (?P<value> count ) )?",
                // 5 plac scars: 3(R)&2(L)
                "(?P<value> count ) adj? plac_scar op?
                    (?: (?P<count1> count ) (?P<side1> side ) op? (?P<count2> count ) (?P<side2> side ) )?",
                "(?P<value> count ) embryo? plac_scar",
                "plac_scar eq? (?P<count1> count ) (?P<side1> side )",
                "plac_scar eq? (?P<value> count )",
            ],
        )
        .product_rule(convert_state, &["plac_scar"]);

    Ok(Extractor::new(registry.finalize()?).with_policy(RecordPolicy::FemaleOnly))
}
