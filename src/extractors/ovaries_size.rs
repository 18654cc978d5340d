//! Ovaries size: "ovaries 10x5 mm", "left ovary: 4 x 2 mm",
//! "reproductive data: ovaries left 10x5 mm, right 10x6 mm",
//! "ovaries: 20mm X 12mm, 18mm X 9mm".

use super::reproductive::{double, side_rules, size};
use crate::error::ConfigError;
use crate::extractor::{Extractor, RecordPolicy};
use crate::vocabulary::{reproductive, shared};

pub const NAME: &str = "ovaries_size";

pub fn build() -> Result<Extractor, ConfigError> {
    let mut registry = shared::registry(NAME);
    registry
        .leaf(reproductive::ovary())
        .leaf(reproductive::other())
        .leaf(reproductive::horns())
        .leaf(reproductive::covered())
        .leaf(reproductive::fat())
        .leaf(reproductive::developed())
        .leaf(reproductive::visible())
        .leaf(reproductive::destroyed())
        .leaf(reproductive::mature())
        .leaf(reproductive::uterus())
        .leaf(reproductive::fallopian())
        .leaf(reproductive::active())
        .leaf(reproductive::lut())
        .leaf(reproductive::corpus())
        .leaf(reproductive::alb())
        .leaf(reproductive::label())
        .leaf(reproductive::gonads("ambiguous_key"))
        .leaf(reproductive::non())
        .leaf(reproductive::fully())
        .leaf(reproductive::partially())
        .leaf(shared::side())
        .leaf(shared::dimension())
        .leaf(shared::cross())
        .leaf(shared::len_units())
        .leaf(reproductive::in_word())
        .leaf(reproductive::and())
        .leaf(reproductive::word())
        .leaf(reproductive::sep())
        .fragment("comma", ",")
        .replace_rule(
            "key_with_units",
            &["ambiguous_key dimension in (?P<units> len_units )"],
        )
        .replace_rule("state", &["active | mature | destroyed | visible | developed"])
        .replace_rule(
            "ambiguous",
            &["side ambiguous_key dimension | ambiguous_key dimension"],
        )
        .replace_rule(
            "side_cross",
            &["(?P<first> side? cross ) (?: and | comma )? (?P<second> side? cross )"],
        )
        .product_rule(
            double(side_rules()?),
            &[
                "label ovary side_cross",
                "label side_cross",
                "ovary side_cross",
                "side_cross",
            ],
        )
        .product_rule(
            size,
            &[
                "label ovary cross",
                "label side ovary cross",
                "side ovary cross",
                "label cross",
                "label (?: ovary | state | word | sep ){0,3} (?: ovary | state ) cross",
                "(?: key_with_units | ambiguous ) cross",
                "(?: key_with_units | ambiguous )
                    (?: ovary | state | word | sep ){0,3} (?: ovary | state ) cross",
                "ovary (?: state | word | sep ){0,3} state cross",
                "side? ovary (?: state | word ) cross",
                "side? ovary cross",
            ],
        );

    Ok(Extractor::new(registry.finalize()?)
        .with_zero_guard()
        .with_policy(RecordPolicy::FemaleOnly))
}
