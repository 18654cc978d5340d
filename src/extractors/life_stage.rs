//! Life stage: "life stage juvenile/yearling", "age class: adult",
//! "ageInYears 1st year", or a stage word on its own ("Juvenile").

use crate::engine::{Leaf, Production, Token};
use crate::error::ConfigError;
use crate::extractor::Extractor;
use crate::trait_value::Trait;
use crate::vocabulary::shared;

pub const NAME: &str = "life_stage";

const INTRINSIC: &str = r"
    yolk \s? sac | young [\s-]? of [\s-]? the [\s-]? year
    | adult \s* young | young \s* adult
    | ads? | adulte?s? | chicks? | fledgelings? | fleglings? | fry
    | hatched | hatchlings? | imagos? | imms? | immatures?
    | jeunes? | juvs? | juveniles? | juvéniles?
    | larvae? | larvals? | larves? | leptocephales? | leptocephalus
    | matures? | metamorphs? | neonates? | nestlings? | nulliparous
    | premetamorphs? | sub-adults? | subads? | subadulte?s?
    | tadpoles? | têtard | yearlings? | yg | ygs | young
";

fn convert(token: &Token) -> Production {
    match token.field("value") {
        Some(value) => Trait::text(value.trim().to_lowercase(), token.start, token.end).into(),
        None => Production::Reject,
    }
}

pub fn build() -> Result<Extractor, ConfigError> {
    let mut registry = shared::registry(NAME);
    registry
        .keyword(
            "json_key",
            r"
            life \s* stage \s* (?: remarks? )?
            | age \s* class
            | age \s* in \s* (?P<time_units> {time_unit} )
            | age
            ",
        )
        // A stage word running into more word characters is just a word
        .leaf(Leaf::keyword("intrinsic", INTRINSIC).not_followed_by(r"[?.-]"))
        // "undetermined" and friends are not a stage
        .keyword("skip", r" determin \w* ")
        .fragment("joiner", r" \s* [/-] \s* ")
        .fragment("separator", r#" [;,"?] "#)
        .keyword("ordinals", " first | second | third | fourth | fifth | 1st | 2nd | 3rd | 4th | 5th ")
        .keyword("time_units", "{time_unit}")
        .keyword("after", "after")
        .keyword("hatching", "hatching")
        .leaf(Leaf::fragment("word", r" \b \w [\w?.-]* ").not_followed_by("/"))
        .replace_rule("as_time", &["after? (?: ordinals | hatching ) time_units"])
        .product_rule(
            convert,
            &[
                "json_key (?P<value> (?: intrinsic | word ) joiner intrinsic )",
                "json_key (?P<value> (?: intrinsic | word ) intrinsic )",
                "json_key (?P<value> intrinsic )",
                "json_key (?P<value> (?: intrinsic | word | joiner ){1,5} ) separator",
                "json_key (?P<value> (?: intrinsic | word | joiner ){1,5} ) (?! intrinsic | word | joiner )",
                "json_key (?P<value> as_time )",
                "(?P<value> intrinsic )",
                "(?P<value> as_time )",
            ],
        );

    Ok(Extractor::new(registry.finalize()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(text: &str) -> Vec<String> {
        build()
            .unwrap()
            .parse(text, "remarks")
            .into_iter()
            .filter_map(|t| t.value.as_text().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_keyed_compound_stage() {
        assert_eq!(values("life stage juvenile/yearling"), vec!["juvenile/yearling"]);
        assert_eq!(values("life stage young adult"), vec!["young adult"]);
    }

    fn spans(text: &str) -> Vec<(usize, usize)> {
        build()
            .unwrap()
            .parse(text, "remarks")
            .iter()
            .map(|t| (t.start, t.end))
            .collect()
    }

    #[test]
    fn test_keyed_words_until_separator() {
        assert_eq!(values("LifeStage Remarks: 5-6 wks;"), vec!["5-6 wks"]);
        assert_eq!(spans("LifeStage Remarks: 5-6 wks;"), vec![(0, 27)]);
    }

    #[test]
    fn test_abbreviation_with_dot() {
        assert_eq!(values("age=u ad."), vec!["u ad."]);
        assert_eq!(spans("age=u ad."), vec![(0, 9)]);
    }

    #[test]
    fn test_time_phrases() {
        assert_eq!(values("LifeStage = 1st month"), vec!["1st month"]);
        assert_eq!(values("age=after hatching year"), vec!["after hatching year"]);
        assert_eq!(values("1st year"), vec!["1st year"]);
    }

    #[test]
    fn test_unkeyed_stage() {
        assert_eq!(values("Juvenile"), vec!["juvenile"]);
    }

    #[test]
    fn test_too_many_words() {
        assert!(values("age determination unknown, more than five words here and there").is_empty());
    }
}
