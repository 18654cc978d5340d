//! Built-in extractors
//!
//! One module per trait. Each exposes its trait `NAME` and a `build`
//! function that finalizes its rules; building is the only step that can
//! fail, and only on a malformed rule set.

mod measure;
mod reproductive;

pub mod body_mass;
pub mod ear_length;
pub mod embryo_length;
pub mod hind_foot_length;
pub mod life_stage;
pub mod nipple_count;
pub mod ovaries_size;
pub mod ovaries_state;
pub mod placental_scar_count;
pub mod sex;
pub mod tail_length;
pub mod testes_size;
pub mod testes_state;
pub mod total_length;

use crate::error::ConfigError;
use crate::extractor::Extractor;

/// Builds one extractor.
pub type Constructor = fn() -> Result<Extractor, ConfigError>;

/// Every built-in extractor in its default processing order.
///
/// Sex comes first: the gonad and embryo extractors are skipped or
/// adjusted on it.
pub const BUILT_IN: &[(&str, Constructor)] = &[
    (sex::NAME, sex::build),
    (life_stage::NAME, life_stage::build),
    (body_mass::NAME, body_mass::build),
    (total_length::NAME, total_length::build),
    (tail_length::NAME, tail_length::build),
    (hind_foot_length::NAME, hind_foot_length::build),
    (ear_length::NAME, ear_length::build),
    (testes_size::NAME, testes_size::build),
    (testes_state::NAME, testes_state::build),
    (ovaries_size::NAME, ovaries_size::build),
    (ovaries_state::NAME, ovaries_state::build),
    (embryo_length::NAME, embryo_length::build),
    (nipple_count::NAME, nipple_count::build),
    (placental_scar_count::NAME, placental_scar_count::build),
];

/// The built-in trait names in default order.
pub fn default_order() -> Vec<String> {
    BUILT_IN.iter().map(|(name, _)| name.to_string()).collect()
}
