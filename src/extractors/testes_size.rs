//! Testes size: "testes 10x5 mm", "gonadLengthInMM 4x3",
//! "reproductive data: testes left 10x5 mm, right 10x6 mm",
//! "testes (R) 6 x 1.5 & 5 x 2 mm".

use super::reproductive::{double, side_rules, size};
use crate::engine::Leaf;
use crate::error::ConfigError;
use crate::extractor::{Extractor, RecordPolicy};
use crate::vocabulary::{reproductive, shared};

pub const NAME: &str = "testes_size";

pub fn build() -> Result<Extractor, ConfigError> {
    let mut registry = shared::registry(NAME);
    registry
        .leaf(reproductive::testes())
        .keyword("abbrev", " tes | ts | tnd | td | tns | ta ")
        .leaf(Leaf::fragment("char_key", r" \b t ").not_followed_by("[a-z]"))
        .leaf(reproductive::descended())
        .leaf(reproductive::scrotal())
        .leaf(reproductive::abdominal())
        .leaf(reproductive::size())
        .leaf(reproductive::other())
        .leaf(shared::uuid())
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
        .replace_rule(
            "state",
            &["(?: non | partially | fully )? descended | scrotal | abdominal | size | other"],
        )
        .replace_rule(
            "key_with_units",
            &["ambiguous_key dimension in (?P<units> len_units )"],
        )
        .replace_rule(
            "ambiguous",
            &["side ambiguous_key dimension | ambiguous_key dimension"],
        )
        .replace_rule(
            "side_cross",
            &["(?P<first> side? cross ) and? (?P<second> side? cross )"],
        )
        .product_rule(
            double(side_rules()?),
            &[
                "label (?: testes | abbrev | char_key ) side_cross",
                "label side_cross",
                "(?: testes | abbrev | char_key ) side_cross",
            ],
        )
        .product_rule(
            size,
            &[
                "label side (?: testes | abbrev | char_key ) cross",
                "label (?: testes | abbrev | char_key ) side? cross",
                "label side? cross",
                "(?: testes | abbrev ) side? cross",
                "label (?: testes | abbrev | state | word | sep | char_key ){0,3}
                    (?: testes | abbrev | state | char_key ) cross",
                "(?: ambiguous | key_with_units ) cross",
                "(?: key_with_units | ambiguous )
                    (?: testes | abbrev | state | word | sep | char_key ){0,3}
                    (?: testes | abbrev | state | char_key ) cross",
                "testes (?: abbrev | state | word | sep | char_key ){0,3}
                    (?: abbrev | state | char_key ) cross",
                "testes (?: abbrev | state | word | char_key ) cross",
                "(?: testes | state | abbrev ) cross",
                "(?P<ambiguous_char> char_key ) cross",
            ],
        );

    Ok(Extractor::new(registry.finalize()?)
        .with_zero_guard()
        .with_policy(RecordPolicy::MaleOnly))
}
