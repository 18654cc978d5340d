//! Vocabulary shared between extractors
//!
//! - [`shared`]: numbers, units, ranges, crosses, fractions and the shorthand
//!   notation, plus [`shared::registry`] which every extractor starts from
//! - [`reproductive`]: words for testes and ovaries

pub mod reproductive;
pub mod shared;
