//! Testes state: "testes descended", "reproductive data: nonScrotal",
//! "ts inguinal", "no gonads".

use super::reproductive::text_value;
use crate::engine::{Production, Token};
use crate::error::ConfigError;
use crate::extractor::{Extractor, RecordPolicy};
use crate::vocabulary::{reproductive, shared};

pub const NAME: &str = "testes_state";

fn convert(token: &Token) -> Production {
    text_value(token).map(|mut made| {
        made.ambiguous_key = Some(token.has_field("ambiguous_key"));
        made
    }).into()
}

pub fn build() -> Result<Extractor, ConfigError> {
    let mut registry = shared::registry(NAME);
    registry
        .leaf(reproductive::label())
        .leaf(reproductive::testes())
        .leaf(reproductive::fully())
        .leaf(reproductive::non())
        .leaf(reproductive::descended())
        .keyword("abbrev", " tes | ts | tnd | td | tns | ta | t ")
        .leaf(reproductive::scrotal())
        .leaf(reproductive::partially())
        .keyword("state_abbrev", " ns | sc ")
        .leaf(reproductive::abdominal())
        .leaf(reproductive::size())
        .leaf(reproductive::gonads("gonads"))
        .leaf(reproductive::other())
        .leaf(shared::cross())
        .leaf(shared::len_units())
        .leaf(reproductive::and())
        .leaf(reproductive::word())
        .replace_rule(
            "state",
            &[
                "non fully descended",
                "abdominal non descended",
                "abdominal descended",
                "non descended",
                "fully descended",
                "partially descended",
                "size non descended",
                "size descended",
                "descended",
                "size",
            ],
        )
        // Sizes sit between the key and the state
        .replace_rule("length", &["cross len_units?"])
        .product_rule(
            convert,
            &[
                "label (?: testes | abbrev )? length?
                    (?P<value> state | state_abbrev | abdominal | scrotal
                        | non scrotal | other | non testes )",
                "label length? (?P<value> non testes | non scrotal | scrotal )",
                "abbrev length? (?P<value> state | abdominal | non scrotal | scrotal | other )",
                "testes length?
                    (?P<value>
                        (?: state | state_abbrev | abdominal | non scrotal | scrotal | other )
                        (?: state | state_abbrev | abdominal | non scrotal | scrotal | other | and ){,3}
                        (?: state | state_abbrev | abdominal | non scrotal | scrotal | other ) )",
                "testes length?
                    (?P<value> state | state_abbrev | abdominal | non scrotal | scrotal | other )",
                "(?P<value> non (?: testes | scrotal | gonads ) | scrotal )",
            ],
        );

    Ok(Extractor::new(registry.finalize()?).with_policy(RecordPolicy::MaleOnly))
}
