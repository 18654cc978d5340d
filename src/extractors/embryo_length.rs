//! Embryo length: "crown-rump length=13 mm", "CRL=59 mm", "cr=9x8mm",
//! "4 embs, 2R, 2L, 12 mm 4 2 2".
//!
//! A list of lengths after the embryo count gives one trait per length.
//! Lengths without a unit take the unit written before them, marked as
//! inferred.

use std::sync::Arc;

use super::measure::fix_up_inches;
use crate::engine::{tokenize, CompiledRules, Leaf, Production, Token};
use crate::error::ConfigError;
use crate::extractor::{Extractor, RecordPolicy};
use crate::numeric;
use crate::trait_value::{Trait, Units};
use crate::vocabulary::{reproductive, shared};

pub const NAME: &str = "embryo_length";

const UNIT_FIELDS: [&str; 4] = ["units1a", "units1b", "units1c", "units2"];

/// Lengths this long are catalog numbers.
const MAX_LENGTH: f64 = 1000.0;

fn too_long(made: &Trait) -> bool {
    made.value.numbers().iter().any(|v| *v >= MAX_LENGTH)
}

fn add_flags(token: &Token, made: &mut Trait) {
    if token.has_field("estimated_value") {
        made.estimated_value = Some(true);
    }
    if token.has_field("quest") {
        made.set_flag("uncertain", "true");
    }
}

fn convert(token: &Token) -> Production {
    let Some(normalized) = numeric::cross(&token.fields) else {
        return Production::Reject;
    };
    let mut made = normalized.into_trait(token.start, token.end);
    if too_long(&made) {
        return Production::Reject;
    }
    add_flags(token, &mut made);
    made.into()
}

/// Rules that split a list of lengths back into single lengths.
fn length_rules() -> Result<Arc<CompiledRules>, ConfigError> {
    let mut registry = shared::registry("lengths");
    registry.leaf(shared::cross());
    Ok(Arc::new(registry.finalize()?))
}

/// One trait per length in the `lengths` capture.
fn convert_many(rules: Arc<CompiledRules>) -> impl Fn(&Token) -> Production + Send + Sync + 'static {
    move |token: &Token| {
        let Some(lengths) = token.field("lengths") else {
            return Production::Reject;
        };
        let mut made = Vec::new();
        let mut last_unit: Option<String> = None;
        for length in tokenize(&rules, lengths) {
            let written = UNIT_FIELDS.iter().any(|key| length.has_field(key));
            let inferred = !written && last_unit.is_some();
            let mut fields = length.fields;
            if let (false, Some(unit)) = (written, &last_unit) {
                fields.insert("units".to_string(), unit.clone());
            }
            let Some(normalized) = numeric::cross(&fields) else {
                return Production::Reject;
            };
            let mut one = normalized.into_trait(token.start, token.end);
            if inferred {
                one.units_inferred = Some(true);
            }
            if too_long(&one) {
                return Production::Reject;
            }
            add_flags(token, &mut one);
            if let Some(Units::One(unit)) = &one.units {
                last_unit = Some(unit.clone());
            }
            made.push(one);
        }
        made.into()
    }
}

pub fn build() -> Result<Extractor, ConfigError> {
    let mut registry = shared::registry(NAME);
    registry
        .leaf(shared::uuid())
        .leaf(reproductive::embryo())
        .leaf(
            Leaf::fragment(
                "key",
                r" (?: crown | cr ) (?: [_\s-] | \s+ to \s+ )? rump | \b crl \b | \b cr \b ",
            )
            .not_preceded_by(r" (?: collector | reg ) [\s=:.] "),
        )
        .fragment("other", r" \( \s* \d+ \s* \w+ \s* \) ")
        // "2R", "3 L" or "2(R)": embryos counted per side
        .leaf(
            Leaf::fragment("side_count", r" \d+ \s* (?: [lr] | [(\[] \s* [lr] \s* [)\]] ) ")
                .not_followed_by("[a-z]"),
        )
        .leaf(shared::cross())
        .leaf(shared::side())
        .keyword("prep", " to | with | on | of | from ")
        // Words allowed between a key and its value
        .leaf(Leaf::fragment("noise", r" \b length | \b x ").not_followed_by("[a-z]"))
        .leaf(reproductive::word())
        .fragment("quest", r" (?P<quest> \? ) ")
        .fragment("separator", r#" [;"/.] "#)
        .replace_rule("count", &["side_count side_count"])
        .replace_rule("skip", &["prep word cross", "other", "side", "side_count"])
        .product_rule(
            convert_many(length_rules()?),
            &["embryo count? (?P<lengths> cross{2,} ) (?! skip ) quest?"],
        )
        .product_rule(
            convert,
            &[
                "embryo? key noise? cross quest?",
                "embryo? noise? cross key quest?",
                "embryo count? noise? cross (?! skip ) quest?",
            ],
        );

    Ok(Extractor::new(registry.finalize()?)
        .with_fix_up(fix_up_inches)
        .with_zero_guard()
        .with_policy(RecordPolicy::FemaleOnly))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trait_value::TraitValue;

    fn parse(text: &str) -> Vec<Trait> {
        build().unwrap().parse(text, "remarks")
    }

    fn span(found: &Trait) -> (usize, usize) {
        (found.start, found.end)
    }

    fn mm() -> Option<Units> {
        Some(Units::One("mm".into()))
    }

    #[test]
    fn test_keyed_length() {
        let traits = parse("crown-rump length=13 mm");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(13.0));
        assert_eq!(traits[0].units, mm());
        assert_eq!(traits[0].units_inferred, Some(false));
        assert_eq!(span(&traits[0]), (0, 23));
    }

    #[test]
    fn test_unitless_length() {
        let traits = parse("Embryo crown-rump length 22");
        assert_eq!(traits[0].value, TraitValue::Number(22.0));
        assert_eq!(traits[0].units, None);
        assert_eq!(traits[0].units_inferred, Some(true));
        assert_eq!(span(&traits[0]), (0, 27));
    }

    #[test]
    fn test_key_after_value() {
        let traits = parse("reproductive data: 4 embryos - 15 mm, crown-rump length");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(15.0));
        assert_eq!(span(&traits[0]), (21, 48));
    }

    #[test]
    fn test_abbreviated_keys() {
        let traits = parse(", CR (crown-rump length) =7 ;");
        assert_eq!(traits[0].value, TraitValue::Number(7.0));
        assert_eq!(span(&traits[0]), (6, 27));

        let traits = parse(", CRL=59 mm; ");
        assert_eq!(traits[0].value, TraitValue::Number(59.0));
        assert_eq!(span(&traits[0]), (2, 11));

        let traits = parse("pregnant; 1 emb; cr-28");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(28.0));
        assert_eq!(span(&traits[0]), (17, 22));
    }

    #[test]
    fn test_side_counts_are_skipped() {
        let traits = parse("4 embs/1R/3L/cr=2mm");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(2.0));
        assert_eq!(span(&traits[0]), (13, 19));

        let traits = parse("3 embs/2L+2R/cr=X34mm");
        assert_eq!(traits[0].value, TraitValue::Number(34.0));
        assert_eq!(span(&traits[0]), (13, 21));

        let traits = parse("4 embs: 2(R)&2(L)=9mm ");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(9.0));
        assert_eq!(span(&traits[0]), (2, 21));
    }

    #[test]
    fn test_cross() {
        let traits = parse(", cr=5x5 ;");
        assert_eq!(traits[0].value, TraitValue::Range(5.0, 5.0));
        assert_eq!(traits[0].units_inferred, Some(true));
        assert_eq!(span(&traits[0]), (2, 8));

        let traits = parse("sex=recorded as unknown ; reproductive data=cr=9x8mm");
        assert_eq!(traits[0].value, TraitValue::Range(9.0, 8.0));
        assert_eq!(traits[0].units, mm());
        assert_eq!(span(&traits[0]), (44, 52));
    }

    #[test]
    fn test_counts_between_embryos_and_key() {
        let traits =
            parse("reproductive data=Embryos: 2 (1 resorbing) R, 3 Left, crown-rump length, 36 mm.");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(36.0));
        assert_eq!(span(&traits[0]), (54, 78));
    }

    #[test]
    fn test_place_names_are_not_keys() {
        assert!(parse("collector=CR 910025, E. E. Makela ;").is_empty());
        assert!(parse("snap 47: middle Cow Cr.").is_empty());
        assert!(parse("headwaters Kaluich Cr, ca 1500 ft").is_empty());
    }

    #[test]
    fn test_whole_record() {
        let text = "sex=female ; total length=158 mm; tail length=28 mm; \
            hind foot with claw=20 mm; ear from notch=12 mm; weight=60 g; \
            reproductive data=embryos 2R,3L CR=15mm left intact";
        let traits = parse(text);
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(15.0));
        assert_eq!(&text[traits[0].start..traits[0].end], "CR=15mm");
    }

    #[test]
    fn test_catalog_number_after_embryos() {
        let traits = parse("Embryos of AF 48621. Eight embryos of AF 48621.  CR=6");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(6.0));
        assert_eq!(span(&traits[0]), (49, 53));
    }

    #[test]
    fn test_one_trait_per_length() {
        let traits = parse("OCGR pg, 4 embs, 2R, 2L, 12 mm 4 2 2");
        let values: Vec<_> = traits.iter().map(|t| t.value.clone()).collect();
        assert_eq!(
            values,
            [12.0, 4.0, 2.0, 2.0].map(TraitValue::Number).to_vec()
        );
        assert!(traits.iter().all(|t| span(t) == (11, 36) && t.units == mm()));
        assert_eq!(traits[0].units_inferred, Some(false));
        assert_eq!(traits[1].units_inferred, Some(true));

        let traits = parse("3 embs, 2L, 1R, 19 mm, 17 mm, 17 mm");
        assert_eq!(traits.len(), 3);
        assert!(traits.iter().all(|t| span(t) == (2, 35) && t.units_inferred == Some(false)));
    }

    #[test]
    fn test_length_after_embryo_count() {
        let traits = parse("Mammals 7 embs, 3 mm");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(3.0));
        assert_eq!(span(&traits[0]), (10, 20));
    }

    #[test]
    fn test_question_mark_is_uncertain() {
        let traits = parse("Mammals vagina open; mammae tiny; not lactating9 embryos; cr-10 ?");
        assert_eq!(traits.len(), 1);
        assert_eq!(traits[0].value, TraitValue::Number(10.0));
        assert_eq!(traits[0].flag("uncertain"), Some("true"));
        assert_eq!(span(&traits[0]), (58, 65));
    }

    #[test]
    fn test_zero_is_not_a_length() {
        assert!(parse("embryo cr=0 mm").is_empty());
    }

    #[test]
    fn test_inch_mark() {
        let traits = parse(r#"embryo CR 1""#);
        assert_eq!(traits[0].value, TraitValue::Number(25.4));
        assert_eq!(traits[0].units, Some(Units::One("\"".into())));
    }
}
