//! A custom extractor built on the public rule API

use traiter::engine::{produce, rewrite, tokenize, tokenizer::token_names};
use traiter::numeric;
use traiter::trait_value::dedup;
use traiter::{ConfigError, Extractor, PatternRegistry, Production, Token, TraitValue, Units};

fn span(token: &Token) -> Production {
    let Some(value) = token.field("number").and_then(numeric::to_float) else {
        return Production::Reject;
    };
    let units = token.field("units").unwrap_or("");
    numeric::normalize(&[value], &[units])
        .map(|normalized| normalized.into_trait(token.start, token.end))
        .into()
}

fn registry() -> PatternRegistry {
    let mut registry = PatternRegistry::new("wingspan");
    registry
        .part("digits", r" \d+ (?: \. \d+ )? ")
        .keyword("key", r" wing \s* span | ws ")
        .fragment("value", r" (?P<number> {digits} ) ")
        .keyword("units", r" (?P<units> mm | cm ) ")
        .replace_rule("measure", &["value units?"])
        .product_rule(span, &["key measure"]);
    registry
}

fn wingspan() -> Extractor {
    Extractor::new(registry().finalize().unwrap()).with_zero_guard()
}

#[test]
fn phases_in_order() {
    let rules = registry().finalize().unwrap();
    let text = "wingspan 12 cm";

    let tokens = tokenize(&rules, text);
    assert_eq!(token_names(&tokens), vec!["key", "value", "units"]);

    let tokens = rewrite(&rules, tokens, text).unwrap();
    assert_eq!(token_names(&tokens), vec!["key", "measure"]);
    assert_eq!(tokens[1].field("number"), Some("12"));
    assert_eq!(tokens[1].field("units"), Some("cm"));

    let traits = produce(&rules, &tokens, text);
    assert_eq!(traits.len(), 1);
    assert_eq!((traits[0].start, traits[0].end), (0, 14));
}

#[test]
fn converts_units() {
    let traits = wingspan().parse("wing span 12 cm", "notes");
    assert_eq!(traits[0].value, TraitValue::Number(120.0));
    assert_eq!(traits[0].units, Some(Units::One("cm".into())));
    assert_eq!(traits[0].units_inferred, Some(false));
    assert_eq!(traits[0].field.as_deref(), Some("notes"));
}

#[test]
fn unitless_value_is_inferred() {
    let traits = wingspan().parse("ws 45", "notes");
    assert_eq!(traits[0].value, TraitValue::Number(45.0));
    assert_eq!(traits[0].units, None);
    assert_eq!(traits[0].units_inferred, Some(true));
}

#[test]
fn same_measurement_twice() {
    let traits = wingspan().parse("wing span 3.5 cm; ws 35 mm", "notes");
    assert_eq!(traits.len(), 2);
    assert_eq!((traits[0].start, traits[0].end), (0, 16));
    assert_eq!((traits[1].start, traits[1].end), (18, 26));

    let distinct = dedup(traits);
    assert_eq!(distinct.len(), 1);
    assert_eq!(distinct[0].units, Some(Units::One("cm".into())));
}

#[test]
fn zero_guard() {
    assert!(wingspan().parse("ws 0", "notes").is_empty());
}

#[test]
fn nothing_found_is_empty() {
    assert!(wingspan().parse("no measurements here", "notes").is_empty());
    assert!(wingspan().parse("", "notes").is_empty());
}

#[test]
fn construction_errors() {
    let mut registry = registry();
    registry.fragment("bad", "{missing}");
    assert!(matches!(
        registry.finalize().unwrap_err(),
        ConfigError::UndefinedReference { .. }
    ));

    let mut registry = registry_with_duplicate();
    assert!(matches!(
        registry.finalize().unwrap_err(),
        ConfigError::Duplicate { ref name } if name == "key"
    ));

    registry = PatternRegistry::new("empty");
    registry.keyword("key", "key").replace_rule("maybe", &["key?"]);
    assert!(matches!(
        registry.finalize().unwrap_err(),
        ConfigError::EmptyMatch { .. }
    ));
}

fn registry_with_duplicate() -> PatternRegistry {
    let mut registry = registry();
    registry.keyword("key", "wing");
    registry
}
