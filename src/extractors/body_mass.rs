//! Body mass: "body mass=20 g", "massInGrams=20.1", "2 lbs. 3.1 - 4.5 oz" and
//! the weight slot of "11-22-33-44:55g".

use super::measure::{compound, shorthand, simple};
use crate::engine::Leaf;
use crate::error::ConfigError;
use crate::extractor::Extractor;
use crate::numeric::ShorthandSlot;
use crate::vocabulary::shared;

pub const NAME: &str = "body_mass";

pub fn build() -> Result<Extractor, ConfigError> {
    let mut registry = shared::registry(NAME);
    registry
        .leaf(shared::uuid())
        .keyword(
            "key_with_units",
            r" (?: weight | mass ) [\s-]* in [\s-]* (?P<units> grams | g | lbs ) ",
        )
        .keyword("key_leader", " full | observed | total ")
        .keyword("weight", r" weights? | weigh (?: ed | ing | s )? ")
        .leaf(Leaf::fragment("key_with_dots", r" \b w \.? \s? t s? \.? ").not_followed_by("[a-z]"))
        .keyword("mass", "mass")
        .keyword("body", "body")
        .leaf(shared::shorthand_key())
        .leaf(shared::shorthand())
        .keyword(
            "other_wt",
            r" femur | baculum | bacu | bac | spleen | thymus | kidney
                | testes | testis | ovaries | epididymis | epid ",
        )
        .leaf(shared::compound_wt())
        .leaf(shared::range())
        .leaf(shared::mass_units())
        .leaf(shared::len_units())
        .keyword("word", r" [a-z] \w* ")
        // Any weight word not preceded by another organ
        .replace_rule(
            "wt_key",
            &[r"(?<! other_wt )
                (?: key_leader weight | key_leader mass | body weight | body mass
                    | body | weight | mass | key_with_dots )"],
        )
        .product_rule(
            shorthand(ShorthandSlot::Weight),
            &["shorthand_key shorthand", "shorthand"],
        )
        .product_rule(compound, &["wt_key compound_wt"])
        .product_rule(compound, &["(?P<ambiguous_key> compound_wt )"])
        .product_rule(
            simple,
            &[
                "key_with_units range",
                "wt_key (?P<units> mass_units ) range (?! len_units )",
                "wt_key range (?P<units> mass_units )",
                "shorthand_key range (?P<units> mass_units )",
                "shorthand_key (?P<units> mass_units ) range (?! len_units )",
                "wt_key range (?! len_units )",
            ],
        );

    Ok(Extractor::new(registry.finalize()?).with_zero_guard())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trait_value::{Trait, TraitValue, Units};

    fn parse(text: &str) -> Vec<Trait> {
        build().unwrap().parse(text, "remarks")
    }

    #[test]
    fn test_keyed_with_units() {
        let traits = parse("body mass=20 g");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(20.0));
        assert_eq!(traits[0].units, Some(Units::One("g".into())));
        assert_eq!(traits[0].units_inferred, Some(false));
        assert_eq!((traits[0].start, traits[0].end), (0, 14));
    }

    #[test]
    fn test_units_in_key() {
        let traits = parse(r#"{ "massingrams"="20.1" }"#);
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(20.1));
        assert_eq!(traits[0].units, Some(Units::One("grams".into())));
    }

    #[test]
    fn test_pounds_and_ounces() {
        let traits = parse("weight 2 lbs. 3.1 - 4.5 oz");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Range(995.07, 1034.76));
        assert_eq!(traits[0].units, Some(Units::Pair("lbs".into(), "oz".into())));
        assert_eq!(traits[0].units_inferred, Some(false));
        assert_eq!(traits[0].ambiguous_key, None);
    }

    #[test]
    fn test_unkeyed_compound_is_ambiguous() {
        let traits = parse("2 lbs. 3.1 - 4.5 oz");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].ambiguous_key, Some(true));
    }

    #[test]
    fn test_shorthand_weight() {
        let traits = parse("762-292-121-76 2435.0g");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(2435.0));
        assert_eq!(traits[0].units, Some(Units::One("g".into())));
        assert_eq!(traits[0].flag("is_shorthand"), Some("true"));

        let traits = parse("143-63-20-17=13");
        assert_eq!(traits[0].value, TraitValue::Number(13.0));
        assert_eq!(traits[0].units, None);
        assert_eq!(traits[0].units_inferred, Some(true));
    }

    #[test]
    fn test_quote_after_shorthand_is_not_inches() {
        let traits = parse(r#"{"totalLengthInMM":"270-165-18-22-31", "#);
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(31.0));
        assert_eq!(traits[0].units, None);
        assert_eq!(traits[0].units_inferred, Some(true));
        assert_eq!(traits[0].flag("is_shorthand"), Some("true"));
        assert_eq!((traits[0].start, traits[0].end), (20, 36));
    }

    #[test]
    fn test_other_organ_weights_are_skipped() {
        assert!(parse("spleen weight 3 g").is_empty());
    }

    #[test]
    fn test_length_units_are_not_mass() {
        assert!(parse("weight 20 mm").is_empty());
    }

    #[test]
    fn test_zero_is_not_found() {
        assert!(parse("body weight 0 g").is_empty());
    }

    #[test]
    fn test_no_shorthand_weight() {
        assert!(parse("143-63-20-17").is_empty());
    }
}
