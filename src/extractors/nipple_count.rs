//! Nipple count: "6 mammae", "nipples 5", "1:2 = 6 mammae",
//! "3 pec, 3 ing mammae".

use crate::engine::{Leaf, Production, Token};
use crate::error::ConfigError;
use crate::extractor::{Extractor, RecordPolicy};
use crate::numeric;
use crate::trait_value::Trait;
use crate::vocabulary::{reproductive, shared};

pub const NAME: &str = "nipple_count";

/// Anything above this is a specimen or page number.
const MAX_COUNT: u32 = 100;

fn convert(token: &Token) -> Production {
    let Some(value) = token.field("value").map(numeric::to_int) else {
        return Production::Reject;
    };
    if value > MAX_COUNT {
        return Production::Reject;
    }
    let mut made = Trait::number(f64::from(value), token.start, token.end);
    if let Some(notation) = token.field("notation") {
        made.set_flag("notation", notation.trim());
    }
    made.into()
}

/// Counts per body region added up: "3 pec, 3 ing".
fn typed(token: &Token) -> Production {
    let count = |key: &str| token.field(key).map_or(0, numeric::to_int);
    let mut made = Trait::number(f64::from(count("value1") + count("value2")), token.start, token.end);
    if let Some(notation) = token.field("notation") {
        made.set_flag("notation", notation.trim());
    }
    made.into()
}

pub fn build() -> Result<Extractor, ConfigError> {
    let mut registry = shared::registry(NAME);
    registry
        .leaf(shared::uuid())
        .keyword("id", r" \d+ - \d+ ")
        .fragment(
            "nipple",
            r"
            \b (?: nipples? | nipp?s? | teats?
                | (?: mammae | mamm[ae]ry | mammaries | mamm ) (?: \s+ (?: glands? | tisss?ue ) )?
            ) \b
            ",
        )
        .leaf(Leaf::fragment("integer", r" \d+ ").not_followed_by(r" [%\d-] "))
        .leaf(reproductive::visible())
        .keyword("none", " no | none | not | non ")
        .fragment("op", " [+:&] ")
        .fragment("eq", r" \b (?: is | eq | equals? ) \b | = ")
        .keyword("adj", " inguinal | ing | pectoral | pec | pr ")
        .fragment("number", r" \b number \b | \# ")
        .fragment("word", r" \w+ ")
        .leaf(reproductive::sep())
        .replace_rule("count", &["integer", "none"])
        .replace_rule("modifier", &["adj", "visible"])
        // "# is 70034" is a catalog number
        .replace_rule("skip", &["number eq? integer"])
        .product_rule(
            typed,
            &["(?P<notation> (?P<value1> count ) modifier (?P<value2> count ) modifier ) nipple"],
        )
        .product_rule(
            convert,
            &[
                // mammae: 1:2 = 6
                "nipple op?
                    (?P<notation> count modifier? op? count modifier? (?: eq (?P<value> count ) )? )",
                // 1:2 = 6 mammae
                "(?P<notation> count modifier? op? count modifier? (?: eq (?P<value> count ) )? )
                    nipple",
                "(?P<value> count ) modifier? nipple",
                "nipple (?P<value> count )",
            ],
        );

    Ok(Extractor::new(registry.finalize()?).with_policy(RecordPolicy::FemaleOnly))
}
