//! The token engine
//!
//! Text passes through three phases, all driven by one [`CompiledRules`]:
//!
//! 1. [`tokenizer`]: leaf regexes turn text into a flat token stream
//! 2. [`rewriter`]: replace rules merge token runs until nothing changes
//! 3. [`producer`]: product rules hand token runs to actions that build traits
//!
//! Rules over tokens are written in the small language of [`sequence`].

pub mod producer;
pub mod registry;
pub mod rewriter;
pub mod sequence;
pub mod token;
pub mod tokenizer;

pub use producer::{produce, Action, Production};
pub use registry::{Check, CompiledRules, Guard, Leaf, PatternRegistry};
pub use rewriter::rewrite;
pub use token::{Fields, Token, TypeCode};
pub use tokenizer::tokenize;
