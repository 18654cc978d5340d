//! Numbers, units and notations used by most extractors
//!
//! [`registry`] starts a rule set with the shared parts already declared.
//! Parts are only visible through `{name}` references; the functions below
//! build the shared leaves that become tokens under their usual names.
//!
//! Parts must not contain named groups: several leaves reference the same
//! part more than once.

use crate::engine::{Fields, Leaf, PatternRegistry};

/// A registry named `name` holding the shared parts.
pub fn registry(name: &str) -> PatternRegistry {
    let mut registry = PatternRegistry::new(name);
    registry
        .part(
            "number",
            r" (?: \d{1,3} (?: , \d{3} ){1,3} | \d+ ) (?: \. \d+ )? | \. \d+ ",
        )
        .part("range_joiner", r" - | – | \b to \b ")
        .part("cross_joiner", r" x | × | \b by \b | \* | - ")
        .part("feet_unit", r" feet | foot | fts? ")
        .part("inch_unit", r" inch (?: es )? | ins? ")
        .part(
            "metric_len_unit",
            r" (?: milli | centi )? met (?: er | re ) s? | [cm] [\s.]? m s? ",
        )
        .part("length_unit", r" {metric_len_unit} | {feet_unit} | {inch_unit} ")
        // A foot mark is only a unit right after a number
        .part("cross_unit", r" {length_unit} | ' ")
        .part("pound_unit", r" pounds? | lbs? ")
        .part("ounce_unit", r" ounces? | ozs? ")
        .part(
            "metric_mass_unit",
            r" (?: milligram | kilogram | gram ) s? | m \.? g s? | k \.? \s? g s? | g [mr]? s? ",
        )
        .part("mass_unit", r" {metric_mass_unit} | {pound_unit} | {ounce_unit} ")
        .part("sh_val", r" \d+ (?: \. \d+ )? | \. \d+ | [?x]{1,2} | n/?d ")
        .part("time_unit", r" years? | months? | weeks? | days? | hours? ");
    registry
}

/// UUIDs look like shorthand and ranges, so they are consumed first.
pub fn uuid() -> Leaf {
    Leaf::keyword(
        "uuid",
        r" [0-9a-f]{8} - [0-9a-f]{4} - [1-5][0-9a-f]{3} - [89ab][0-9a-f]{3} - [0-9a-f]{12} ",
    )
}

/// A number or a pair like "12 to 34" or "12.3-45.6".
///
/// Pieces of dates and other dashed numbers ("2014-12-11") are rejected.
pub fn range() -> Leaf {
    Leaf::fragment(
        "range",
        r"
        (?P<estimated_value> \[ \s* )?
        (?P<value1> {number} ) \]?
        (?: \s* (?: {range_joiner} ) \s* (?P<value2> {number} ) \]? )?
        ",
    )
    .not_preceded_by(r" \d [|,.\#+-]? | \# | \b to \s ")
    .not_followed_by(r" \d | [|,.+-] \d | \s+ to \b ")
}

/// Length times width like "12 x 34 mm" or "12mm x 34mm".
pub fn cross() -> Leaf {
    Leaf::fragment(
        "cross",
        r"
        (?P<estimated_value> \[ \s* )?
        (?P<value1> {number} ) \]?
        (?:
            \s* (?P<units1a> {cross_unit} ) \s* (?: {cross_joiner} )
                \s* (?P<value2a> {number} ) \s* (?P<units2> {cross_unit} )
            | \s* (?: {cross_joiner} ) \s* (?P<value2b> {number} ) \s* (?P<units1b> {cross_unit} )
            | \s* (?: {cross_joiner} ) \s* (?P<value2c> {number} )
            | \s* (?P<units1c> {cross_unit} )
        )?
        ",
    )
    .not_preceded_by(r" [\d/,.-] \d | \b by \s* ")
    .not_followed_by(r" [a-z\d] | \s* {mass_unit} (?: [^a-z] | \z ) ")
}

/// Fractions like "1 2/3" or "1/2", but not dates like "1/2/34".
pub fn fraction() -> Leaf {
    Leaf::fragment(
        "fraction",
        r" (?P<whole> \d+ \s+ )? (?P<numerator> \d+ ) / (?P<denominator> \d+ ) ",
    )
    .not_preceded_by(r" [\d/,.] ")
    .not_followed_by(r" [\d/,.] ")
}

/// Feet and inches together: "4 ft 7-8 in".
pub fn compound_len() -> Leaf {
    Leaf::fragment(
        "compound_len",
        r"
        (?P<big> {number} ) \s* (?P<big_units> {feet_unit} ) \.? [\s,]*
        (?P<small> {number} (?: \s* (?: {range_joiner} ) \s* {number} )? )
        \s* (?P<small_units> {inch_unit} )
        ",
    )
    .not_preceded_by(r" [\d.] ")
    .not_followed_by(r" [a-z] ")
}

/// Pounds and ounces together: "2 lbs. 3.1 - 4.5 oz".
pub fn compound_wt() -> Leaf {
    Leaf::fragment(
        "compound_wt",
        r"
        (?P<big> {number} ) \s* (?P<big_units> {pound_unit} ) \.? [\s,]*
        (?P<small> {number} (?: \s* (?: {range_joiner} ) \s* {number} )? )
        \s* (?P<small_units> {ounce_unit} )
        ",
    )
    .not_preceded_by(r" [\d.] ")
    .not_followed_by(r" [a-z] ")
}

pub fn len_units() -> Leaf {
    Leaf::fragment("len_units", "{length_unit}").not_followed_by("[a-z]")
}

pub fn mass_units() -> Leaf {
    Leaf::fragment("mass_units", "{mass_unit}")
        .not_preceded_by("[a-z]")
        .not_followed_by("[a-z]")
}

/// Words that introduce a shorthand notation: "on tag", "meas:", ...
pub fn shorthand_key() -> Leaf {
    Leaf::fragment(
        "shorthand_key",
        r"
        on \s* tag | specimens? | catalog
        | (?: measurements? | meas ) [:.,]{0,2} (?: \s* length \s* )?
            (?: \s* [({\[})]? [a-z]{1,2} [)}\]]? \. )?
        | tag \s+ \d+ \s* =? (?: male | female )? \s* ,
        | measurements? | mesurements? | measurementsnt
        ",
    )
    .not_preceded_by("[a-z]")
}

/// The positional notation "11-22-33-44:55g".
///
/// Slots are total, tail, hind foot and ear length, then optional extended
/// fields like "-fa55" and an optional weight with an optional unit. Unknown
/// slots are written "?", "x" or "n/d". Brackets mark estimated values.
pub fn shorthand() -> Leaf {
    Leaf::fragment(
        "shorthand",
        r"
        (?P<shorthand_tl> (?P<estimated_tl> \[ )? {sh_val} \]? )
        (?P<sep1> [:/-] )
        (?P<shorthand_tal> (?P<estimated_tal> \[ )? {sh_val} \]? )
        (?P<sep2> [:/-] )
        (?P<shorthand_hfl> (?P<estimated_hfl> \[ )? {sh_val} \]? )
        (?P<sep3> [:/-] )
        (?P<shorthand_el> (?P<estimated_el> \[ )? {sh_val} \]? )
        (?P<shorthand_ext> (?: [:/-] [a-z]{1,4} (?: {sh_val} ) )* )
        (?:
            [\s=:/-] \s*
            (?P<estimated_wt> \[ \s* )?
            (?P<shorthand_wt> {sh_val} ) \s* \]?
            (?P<shorthand_wt_units> {metric_mass_unit} )?
            \]?
        )?
        ",
    )
    .not_preceded_by(r" [\d/a-z-] ")
    .not_followed_by(r" [\d/:=a-z-] ")
    .check(same_separators)
}

/// A shorthand notation missing its last slots. Dates are excluded.
pub fn triple() -> Leaf {
    Leaf::fragment(
        "triple",
        r"
        (?P<shorthand_tl> (?P<estimated_tl> \[ )? {sh_val} \]? )
        (?P<sep1> [:/-] )
        (?P<shorthand_tal> (?P<estimated_tal> \[ )? {sh_val} \]? )
        (?P<sep2> [:/-] )
        (?P<shorthand_hfl> (?P<estimated_hfl> \[ )? {sh_val} \]? )
        ",
    )
    .not_preceded_by(r" [\d/a-z-] ")
    .not_followed_by(r" [\d/:=a-z-] ")
    .check(same_separators)
}

/// Left or right, like "(L)", "left" or "rt".
pub fn side() -> Leaf {
    Leaf::fragment(
        "side",
        r" [/(\[] \s* (?P<side1> [lr] \b ) \s* [)\]]? | (?P<side2> both | left | right | lft | rt | [lr] \b ) ",
    )
    .not_preceded_by("[a-z]")
}

pub fn dimension() -> Leaf {
    Leaf::fragment("dimension", r" (?P<dim> length | width ) ")
}

/// Every shorthand separator must be the same character.
fn same_separators(fields: &Fields) -> bool {
    let first = fields.get("sep1");
    ["sep2", "sep3"]
        .iter()
        .all(|key| fields.get(*key).map_or(true, |sep| Some(sep) == first))
}
