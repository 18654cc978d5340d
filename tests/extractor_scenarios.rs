//! Notations seen in specimen records, run through the built-in extractors

use rstest::rstest;
use traiter::extractors::{
    body_mass, ear_length, embryo_length, hind_foot_length, life_stage, nipple_count,
    ovaries_size, ovaries_state, placental_scar_count, sex, tail_length, testes_size,
    testes_state, total_length, Constructor,
};
use traiter::{Trait, TraitValue, Units};

fn parse(build: Constructor, text: &str) -> Vec<Trait> {
    build().expect("built-in rules finalize").parse(text, "dynamicproperties")
}

fn one(build: Constructor, text: &str) -> Trait {
    let mut traits = parse(build, text);
    assert_eq!(traits.len(), 1, "{text}: {traits:?}");
    traits.remove(0)
}

#[rstest]
#[case::total_length(total_length::build, 11.0)]
#[case::tail_length(tail_length::build, 22.0)]
#[case::hind_foot_length(hind_foot_length::build, 33.0)]
#[case::ear_length(ear_length::build, 44.0)]
fn shorthand_lengths_are_inferred_millimeters(#[case] build: Constructor, #[case] expected: f64) {
    let found = one(build, "11-22-33-44:55g");
    assert_eq!(found.value, TraitValue::Number(expected));
    assert_eq!(found.units, None);
    assert_eq!(found.units_inferred, Some(true));
    assert_eq!(found.flag("is_shorthand"), Some("true"));
    assert_eq!(found.field.as_deref(), Some("dynamicproperties"));
}

#[test]
fn shorthand_weight_keeps_its_unit() {
    let found = one(body_mass::build, "11-22-33-44:55g");
    assert_eq!(found.value, TraitValue::Number(55.0));
    assert_eq!(found.units, Some(Units::One("g".into())));
    assert_eq!(found.units_inferred, Some(false));
}

#[rstest]
#[case(body_mass::build, "body mass=20 g", 20.0, "g")]
#[case(total_length::build, "total length= 2 ft.", 609.6, "ft")]
#[case(total_length::build, "SVL 44-48 mm", 44.0, "mm")]
#[case(tail_length::build, "tail 9-10 mm", 9.0, "mm")]
#[case(hind_foot_length::build, "hind foot with claw 30 mm", 30.0, "mm")]
#[case(ear_length::build, "ear from notch 15 mm", 15.0, "mm")]
fn keyed_values_with_units(
    #[case] build: Constructor,
    #[case] text: &str,
    #[case] low: f64,
    #[case] unit: &str,
) {
    let found = one(build, text);
    assert_eq!(found.value.numbers()[0], low);
    assert_eq!(found.units, Some(Units::One(unit.into())));
    assert_eq!(found.units_inferred, Some(false));
}

#[test]
fn compound_pounds_and_ounces() {
    let found = one(body_mass::build, "weight 2 lbs. 3.1 - 4.5 oz");
    assert_eq!(found.value, TraitValue::Range(995.07, 1034.76));
    assert_eq!(found.units, Some(Units::Pair("lbs".into(), "oz".into())));
    assert_eq!(found.units_inferred, Some(false));
}

#[rstest]
#[case::body_mass(body_mass::build, "body weight 0 g")]
#[case::testes_size(testes_size::build, "testes 0x0 mm")]
#[case::ovaries_size(ovaries_size::build, "ovaries 0x0 mm")]
fn zero_is_not_a_measurement(#[case] build: Constructor, #[case] text: &str) {
    assert!(parse(build, text).is_empty());
}

#[rstest]
#[case("sex=female ?", "female?")]
#[case("sex=F crown rump length=8 mm", "female")]
#[case("sex=unknown ; crown-rump length=8 mm", "unknown")]
fn sex_values(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(one(sex::build, text).value, TraitValue::Text(expected.into()));
}

#[rstest]
#[case("life stage juvenile/yearling", "juvenile/yearling")]
#[case("LifeStage = 1st month", "1st month")]
#[case("Juvenile", "juvenile")]
fn life_stage_values(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(one(life_stage::build, text).value, TraitValue::Text(expected.into()));
}

#[test]
fn testes_descended() {
    let found = one(testes_state::build, "testes descended");
    assert_eq!(found.value, TraitValue::Text("descended".into()));
    assert_eq!(found.ambiguous_key, Some(false));
}

#[test]
fn gonad_sizes_by_side() {
    let traits = parse(testes_size::build, "reproductive data: testes left 10x5 mm, right 10x6 mm");
    let sides: Vec<_> = traits.iter().map(|t| t.side.as_deref()).collect();
    assert_eq!(sides, vec![Some("left"), Some("right")]);

    let traits = parse(ovaries_size::build, "ovaries left 10x5 mm, right 10x6 mm");
    assert_eq!(traits.len(), 2);
}

#[test]
fn ovaries_state_phrases() {
    let found = one(ovaries_state::build, "corpus luteum visible in both ovaries");
    assert_eq!(found.value, TraitValue::Text("corpus luteum visible".into()));
}

#[test]
fn embryo_length_next_to_sex() {
    let found = one(embryo_length::build, "sex=F crown rump length=8 mm");
    assert_eq!(found.value, TraitValue::Number(8.0));
    assert_eq!(found.units, Some(Units::One("mm".into())));
}

#[rstest]
#[case::nipples(nipple_count::build, "6 mammae, nipples prominent", 6.0)]
#[case::teats(nipple_count::build, "nipples 8", 8.0)]
#[case::scars(placental_scar_count::build, "3 placental scars, 1L, 2R", 3.0)]
#[case::no_scars(placental_scar_count::build, "no placental scars", 0.0)]
fn counts(#[case] build: Constructor, #[case] text: &str, #[case] expected: f64) {
    assert_eq!(one(build, text).value, TraitValue::Number(expected));
}

#[rstest]
#[case::collector_number(total_length::build, "collector id 11-22-33-44")]
#[case::ear_tag(ear_length::build, "ear tag 1234")]
#[case::organ_weight(body_mass::build, "spleen weight 3 g")]
fn identifiers_are_not_measurements(#[case] build: Constructor, #[case] text: &str) {
    assert!(parse(build, text).is_empty());
}
