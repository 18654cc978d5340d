//! Hind foot length: "hind foot with claw 30 mm", "HFL=22" and the third
//! slot of "11-22-33-44:55g".

use super::measure::{fraction, numeric_fix_ups, shorthand, simple};
use crate::error::ConfigError;
use crate::extractor::Extractor;
use crate::numeric::ShorthandSlot;
use crate::vocabulary::shared;

pub const NAME: &str = "hind_foot_length";

pub fn build() -> Result<Extractor, ConfigError> {
    let mut registry = shared::registry(NAME);
    registry
        .leaf(shared::uuid())
        .keyword(
            "key_with_units",
            r" (?: hind \s* )? foot \s* (?: length | len ) \s* in \s* (?P<units> millimeters | mm ) ",
        )
        .keyword(
            "key",
            r"
            hind \s* foot \s* with \s* (?P<includes> claw )
            | hind \s* foot (?: \s* (?: length | len ) )?
            | hfl | hf
            ",
        )
        .leaf(shared::shorthand_key())
        .leaf(shared::shorthand())
        .leaf(shared::fraction())
        .leaf(shared::range())
        .leaf(shared::triple())
        .leaf(shared::len_units())
        .keyword("word", r" [a-z] \w* ")
        .fragment("sep", "[;,]")
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
            shorthand(ShorthandSlot::HindFootLength),
            &[
                "shorthand_key shorthand",
                "shorthand",
                "shorthand_key triple (?! shorthand | range )",
            ],
        );

    Ok(Extractor::new(registry.finalize()?)
        .with_fix_up(numeric_fix_ups)
        .with_zero_guard())
}
