//! Pattern registry
//!
//! A [`PatternRegistry`] collects the vocabulary and rules of one extractor in
//! declaration order and compiles them into [`CompiledRules`]:
//!
//! - **parts**: named regex sub-patterns that are only referenced by others
//! - **leaves**: regexes that become tokens (`fragment`, `keyword`, `literal`)
//! - **replace rules**: token sequences merged into a new token
//! - **product rules**: token sequences handed to an action that builds traits
//!
//! Regexes may reference any part or leaf with `{name}`. References are
//! resolved at [`PatternRegistry::finalize`], so they may point forward.
//! Leaf regexes are compiled case-insensitively with insignificant whitespace.
//!
//! The regex engine has no lookaround, so leaves carry [`Guard`]s that are
//! checked against the text around each candidate match instead.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};

use super::producer::{Action, Production};
use super::sequence::{SequenceMatcher, SequencePattern};
use super::token::{Fields, Token, TypeCode};
use crate::error::ConfigError;

/// Bytes of text before a candidate that lookbehind guards can see.
const GUARD_WINDOW: usize = 32;

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Predicate over the named groups of a candidate leaf match.
pub type Check = fn(&Fields) -> bool;

/// A constraint on the text around a leaf match.
#[derive(Debug, Clone)]
pub enum Guard {
    NotPrecededBy(String),
    NotFollowedBy(String),
    FollowedBy(String),
    Check(Check),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeafKind {
    Fragment,
    Keyword,
    Literal,
}

/// A regex that produces tokens.
#[derive(Debug, Clone)]
pub struct Leaf {
    name: String,
    pattern: String,
    kind: LeafKind,
    guards: Vec<Guard>,
}

impl Leaf {
    /// A regex matched anywhere in the text.
    pub fn fragment(name: &str, pattern: &str) -> Self {
        Self::new(name, pattern, LeafKind::Fragment)
    }

    /// A regex that must start and end on word boundaries.
    pub fn keyword(name: &str, pattern: &str) -> Self {
        Self::new(name, pattern, LeafKind::Keyword)
    }

    /// Literal text, no regex syntax.
    pub fn literal(name: &str, text: &str) -> Self {
        Self::new(name, text, LeafKind::Literal)
    }

    fn new(name: &str, pattern: &str, kind: LeafKind) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            kind,
            guards: Vec::new(),
        }
    }

    pub fn not_preceded_by(mut self, pattern: &str) -> Self {
        self.guards.push(Guard::NotPrecededBy(pattern.to_string()));
        self
    }

    pub fn not_followed_by(mut self, pattern: &str) -> Self {
        self.guards.push(Guard::NotFollowedBy(pattern.to_string()));
        self
    }

    pub fn followed_by(mut self, pattern: &str) -> Self {
        self.guards.push(Guard::FollowedBy(pattern.to_string()));
        self
    }

    pub fn check(mut self, check: Check) -> Self {
        self.guards.push(Guard::Check(check));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

enum Definition {
    Part { name: String, pattern: String },
    Leaf(Leaf),
    Replace { name: String, alternatives: Vec<String> },
    Product {
        name: String,
        action: Action,
        alternatives: Vec<String>,
    },
}

impl Definition {
    fn name(&self) -> &str {
        match self {
            Definition::Part { name, .. }
            | Definition::Replace { name, .. }
            | Definition::Product { name, .. } => name,
            Definition::Leaf(leaf) => &leaf.name,
        }
    }

    /// The regex text other definitions see through `{name}`.
    fn pattern(&self) -> Option<&str> {
        match self {
            Definition::Part { pattern, .. } => Some(pattern),
            Definition::Leaf(leaf) if leaf.kind != LeafKind::Literal => Some(&leaf.pattern),
            _ => None,
        }
    }
}

/// Builder for the rules of one extractor.
pub struct PatternRegistry {
    name: String,
    definitions: Vec<Definition>,
    products: usize,
}

impl PatternRegistry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            definitions: Vec::new(),
            products: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A named sub-pattern that never becomes a token by itself.
    pub fn part(&mut self, name: &str, pattern: &str) -> &mut Self {
        self.definitions.push(Definition::Part {
            name: name.to_string(),
            pattern: pattern.to_string(),
        });
        self
    }

    pub fn fragment(&mut self, name: &str, pattern: &str) -> &mut Self {
        self.leaf(Leaf::fragment(name, pattern))
    }

    pub fn keyword(&mut self, name: &str, pattern: &str) -> &mut Self {
        self.leaf(Leaf::keyword(name, pattern))
    }

    pub fn literal(&mut self, name: &str, text: &str) -> &mut Self {
        self.leaf(Leaf::literal(name, text))
    }

    pub fn leaf(&mut self, leaf: Leaf) -> &mut Self {
        self.definitions.push(Definition::Leaf(leaf));
        self
    }

    /// Merge any of the token sequences into one token named `name`.
    pub fn replace_rule(&mut self, name: &str, alternatives: &[&str]) -> &mut Self {
        self.definitions.push(Definition::Replace {
            name: name.to_string(),
            alternatives: alternatives.iter().map(|a| a.to_string()).collect(),
        });
        self
    }

    /// Hand any of the token sequences to `action`.
    pub fn product_rule<F>(&mut self, action: F, alternatives: &[&str]) -> &mut Self
    where
        F: Fn(&Token) -> Production + Send + Sync + 'static,
    {
        self.products += 1;
        self.definitions.push(Definition::Product {
            name: format!("{}_product_{}", self.name, self.products),
            action: Arc::new(action),
            alternatives: alternatives.iter().map(|a| a.to_string()).collect(),
        });
        self
    }

    /// Check and compile everything registered so far.
    pub fn finalize(&self) -> Result<CompiledRules, ConfigError> {
        let mut index: HashMap<&str, &Definition> = HashMap::new();
        for definition in &self.definitions {
            if index.insert(definition.name(), definition).is_some() {
                return Err(ConfigError::Duplicate {
                    name: definition.name().to_string(),
                });
            }
        }

        let mut resolver = Resolver {
            index: &index,
            resolved: HashMap::new(),
        };

        let mut next_code: u16 = 0;
        let mut assign = |name: &str| -> Result<TypeCode, ConfigError> {
            let code = TypeCode(next_code);
            next_code = next_code.checked_add(1).ok_or_else(|| {
                ConfigError::Malformed(format!("too many rules at '{}'", name))
            })?;
            Ok(code)
        };

        let mut leaves = Vec::new();
        let mut codes: HashMap<String, TypeCode> = HashMap::new();
        for definition in &self.definitions {
            if let Definition::Leaf(leaf) = definition {
                let code = assign(&leaf.name)?;
                codes.insert(leaf.name.clone(), code);
                leaves.push(compile_leaf(leaf, code, &mut resolver)?);
            }
        }

        let mut replacements = Vec::new();
        let mut replace_patterns = Vec::new();
        for definition in &self.definitions {
            if let Definition::Replace { name, alternatives } = definition {
                let code = assign(name)?;
                codes.insert(name.clone(), code);
                replacements.push(RuleInfo {
                    name: name.clone(),
                    code,
                });
                replace_patterns.push(parse_alternatives(name, alternatives)?);
            }
        }

        let mut products = Vec::new();
        let mut product_patterns = Vec::new();
        for definition in &self.definitions {
            if let Definition::Product {
                name,
                action,
                alternatives,
            } = definition
            {
                let code = assign(name)?;
                products.push(ProductInfo {
                    rule: RuleInfo {
                        name: name.clone(),
                        code,
                    },
                    action: Arc::clone(action),
                });
                product_patterns.push(parse_alternatives(name, alternatives)?);
            }
        }

        let names: Vec<&str> = replacements
            .iter()
            .map(|r| r.name.as_str())
            .chain(products.iter().map(|p| p.rule.name.as_str()))
            .collect();
        for (name, patterns) in names
            .iter()
            .zip(replace_patterns.iter().chain(product_patterns.iter()))
        {
            check_references(name, patterns, &codes)?;
        }
        check_rename_cycles(&replacements, &replace_patterns)?;

        let lookup = |symbol: &str| codes.get(symbol).copied();
        let rewrite = SequenceMatcher::compile(&replace_patterns, &lookup).map_err(
            |(rule, message)| ConfigError::InvalidPattern {
                name: replacements[rule].name.clone(),
                message,
            },
        )?;
        let produce = SequenceMatcher::compile(&product_patterns, &lookup).map_err(
            |(rule, message)| ConfigError::InvalidPattern {
                name: products[rule].rule.name.clone(),
                message,
            },
        )?;

        Ok(CompiledRules {
            name: self.name.clone(),
            leaves,
            replacements,
            rewrite,
            products,
            produce,
        })
    }
}

fn parse_alternatives(name: &str, alternatives: &[String]) -> Result<Vec<SequencePattern>, ConfigError> {
    alternatives
        .iter()
        .map(|source| {
            let pattern =
                SequencePattern::parse(source).map_err(|message| ConfigError::InvalidPattern {
                    name: name.to_string(),
                    message,
                })?;
            if pattern.can_match_empty() {
                return Err(ConfigError::EmptyMatch {
                    name: name.to_string(),
                });
            }
            Ok(pattern)
        })
        .collect()
}

fn check_references(
    name: &str,
    patterns: &[SequencePattern],
    codes: &HashMap<String, TypeCode>,
) -> Result<(), ConfigError> {
    for pattern in patterns {
        if let Some(missing) = pattern.symbols().into_iter().find(|s| !codes.contains_key(*s)) {
            return Err(ConfigError::UndefinedReference {
                name: name.to_string(),
                reference: missing.to_string(),
            });
        }
    }
    Ok(())
}

/// Reject replace rules that can keep renaming a single token forever.
///
/// Every other splice shortens the token list, so only chains of one-token
/// renames can loop.
fn check_rename_cycles(
    rules: &[RuleInfo],
    patterns: &[Vec<SequencePattern>],
) -> Result<(), ConfigError> {
    let mut edges: HashMap<String, BTreeSet<String>> = HashMap::new();
    for (rule, alternatives) in rules.iter().zip(patterns) {
        for pattern in alternatives {
            for symbol in pattern.single_token_symbols() {
                edges.entry(symbol).or_default().insert(rule.name.clone());
            }
        }
    }

    for rule in rules {
        let mut path = vec![rule.name.clone()];
        if let Some(cycle) = find_cycle(&rule.name, &rule.name, &edges, &mut path, &mut BTreeSet::new()) {
            return Err(ConfigError::NonTerminatingRule {
                name: rule.name.clone(),
                cycle,
            });
        }
    }
    Ok(())
}

fn find_cycle(
    origin: &str,
    current: &str,
    edges: &HashMap<String, BTreeSet<String>>,
    path: &mut Vec<String>,
    visited: &mut BTreeSet<String>,
) -> Option<String> {
    for next in edges.get(current).into_iter().flatten() {
        if next == origin {
            path.push(next.clone());
            return Some(path.join(" -> "));
        }
        if visited.insert(next.clone()) {
            path.push(next.clone());
            if let Some(cycle) = find_cycle(origin, next, edges, path, visited) {
                return Some(cycle);
            }
            path.pop();
        }
    }
    None
}

struct Resolver<'a> {
    index: &'a HashMap<&'a str, &'a Definition>,
    resolved: HashMap<String, String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, owner: &str, pattern: &str) -> Result<String, ConfigError> {
        self.expand(owner, pattern, &mut vec![owner.to_string()])
    }

    fn expand(
        &mut self,
        owner: &str,
        pattern: &str,
        stack: &mut Vec<String>,
    ) -> Result<String, ConfigError> {
        let mut out = String::with_capacity(pattern.len());
        let mut last = 0;
        for caps in REFERENCE.captures_iter(pattern) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            if pattern[..whole.start].ends_with('\\') {
                continue;
            }
            let reference = &caps[1];
            out.push_str(&pattern[last..whole.start]);
            out.push_str("(?:");
            out.push_str(&self.lookup(owner, reference, stack)?);
            out.push(')');
            last = whole.end;
        }
        out.push_str(&pattern[last..]);
        Ok(out)
    }

    fn lookup(
        &mut self,
        owner: &str,
        reference: &str,
        stack: &mut Vec<String>,
    ) -> Result<String, ConfigError> {
        if let Some(done) = self.resolved.get(reference) {
            return Ok(done.clone());
        }
        if stack.iter().any(|name| name == reference) {
            stack.push(reference.to_string());
            return Err(ConfigError::CircularReference {
                path: stack.join(" -> "),
            });
        }
        let raw = self
            .index
            .get(reference)
            .and_then(|definition| definition.pattern())
            .ok_or_else(|| ConfigError::UndefinedReference {
                name: owner.to_string(),
                reference: reference.to_string(),
            })?;
        stack.push(reference.to_string());
        let expanded = self.expand(reference, raw, stack)?;
        stack.pop();
        self.resolved.insert(reference.to_string(), expanded.clone());
        Ok(expanded)
    }
}

fn build_regex(name: &str, pattern: &str, verbose: bool) -> Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .ignore_whitespace(verbose)
        .build()
        .map_err(|e| ConfigError::InvalidPattern {
            name: name.to_string(),
            message: e.to_string(),
        })
}

fn compile_leaf(leaf: &Leaf, code: TypeCode, resolver: &mut Resolver) -> Result<CompiledLeaf, ConfigError> {
    let regex = match leaf.kind {
        LeafKind::Literal => build_regex(&leaf.name, &regex::escape(&leaf.pattern), false)?,
        LeafKind::Fragment => {
            let body = resolver.resolve(&leaf.name, &leaf.pattern)?;
            build_regex(&leaf.name, &format!("(?:{})", body), true)?
        }
        LeafKind::Keyword => {
            let body = resolver.resolve(&leaf.name, &leaf.pattern)?;
            build_regex(&leaf.name, &format!(r"\b(?:{})\b", body), true)?
        }
    };

    let mut guards = Vec::new();
    for guard in &leaf.guards {
        let compiled = match guard {
            Guard::NotPrecededBy(p) => {
                let body = resolver.resolve(&leaf.name, p)?;
                CompiledGuard::NotPrecededBy(build_regex(&leaf.name, &format!(r"(?:{})\z", body), true)?)
            }
            Guard::NotFollowedBy(p) => {
                let body = resolver.resolve(&leaf.name, p)?;
                CompiledGuard::NotFollowedBy(build_regex(&leaf.name, &format!(r"\A(?:{})", body), true)?)
            }
            Guard::FollowedBy(p) => {
                let body = resolver.resolve(&leaf.name, p)?;
                CompiledGuard::FollowedBy(build_regex(&leaf.name, &format!(r"\A(?:{})", body), true)?)
            }
            Guard::Check(check) => CompiledGuard::Check(*check),
        };
        guards.push(compiled);
    }

    Ok(CompiledLeaf {
        name: leaf.name.clone(),
        code,
        regex,
        guards,
    })
}

#[derive(Debug, Clone)]
enum CompiledGuard {
    NotPrecededBy(Regex),
    NotFollowedBy(Regex),
    FollowedBy(Regex),
    Check(Check),
}

/// A leaf ready for scanning.
#[derive(Debug, Clone)]
pub(crate) struct CompiledLeaf {
    pub(crate) name: String,
    pub(crate) code: TypeCode,
    pub(crate) regex: Regex,
    guards: Vec<CompiledGuard>,
}

impl CompiledLeaf {
    /// Named, non-empty groups of a match.
    pub(crate) fn fields(&self, caps: &Captures) -> Fields {
        self.regex
            .capture_names()
            .flatten()
            .filter_map(|group| {
                caps.name(group)
                    .filter(|m| !m.as_str().is_empty())
                    .map(|m| (group.to_string(), m.as_str().to_string()))
            })
            .collect()
    }

    pub(crate) fn accepts(&self, text: &str, start: usize, end: usize, fields: &Fields) -> bool {
        let mut window_start = start.saturating_sub(GUARD_WINDOW);
        while !text.is_char_boundary(window_start) {
            window_start -= 1;
        }
        let before = &text[window_start..start];
        let after = &text[end..];
        self.guards.iter().all(|guard| match guard {
            CompiledGuard::NotPrecededBy(re) => !re.is_match(before),
            CompiledGuard::NotFollowedBy(re) => !re.is_match(after),
            CompiledGuard::FollowedBy(re) => re.is_match(after),
            CompiledGuard::Check(check) => check(fields),
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RuleInfo {
    pub(crate) name: String,
    pub(crate) code: TypeCode,
}

#[derive(Clone)]
pub(crate) struct ProductInfo {
    pub(crate) rule: RuleInfo,
    pub(crate) action: Action,
}

/// The immutable output of [`PatternRegistry::finalize`].
///
/// Holds no interior mutability, so one instance can be shared across
/// threads.
#[derive(Clone)]
pub struct CompiledRules {
    pub(crate) name: String,
    pub(crate) leaves: Vec<CompiledLeaf>,
    pub(crate) replacements: Vec<RuleInfo>,
    pub(crate) rewrite: SequenceMatcher,
    pub(crate) products: Vec<ProductInfo>,
    pub(crate) produce: SequenceMatcher,
}

impl CompiledRules {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the leaf or rule behind a type code.
    pub fn code_name(&self, code: TypeCode) -> Option<&str> {
        self.leaves
            .iter()
            .map(|l| (l.code, l.name.as_str()))
            .chain(self.replacements.iter().map(|r| (r.code, r.name.as_str())))
            .chain(self.products.iter().map(|p| (p.rule.code, p.rule.name.as_str())))
            .find(|(c, _)| *c == code)
            .map(|(_, name)| name)
    }

    /// Type code of a leaf or replace rule.
    pub fn code_of(&self, name: &str) -> Option<TypeCode> {
        self.leaves
            .iter()
            .map(|l| (l.code, l.name.as_str()))
            .chain(self.replacements.iter().map(|r| (r.code, r.name.as_str())))
            .find(|(_, n)| *n == name)
            .map(|(code, _)| code)
    }
}

impl std::fmt::Debug for CompiledRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRules")
            .field("name", &self.name)
            .field("leaves", &self.leaves.len())
            .field("replacements", &self.replacements.len())
            .field("products", &self.products.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reject(_: &Token) -> Production {
        Production::Reject
    }

    #[test]
    fn test_codes_follow_declaration_order() {
        let mut registry = PatternRegistry::new("codes");
        registry
            .fragment("a", "a")
            .keyword("b", "b")
            .replace_rule("ab", &["a b"]);
        let rules = registry.finalize().unwrap();
        assert_eq!(rules.code_of("a"), Some(TypeCode(0)));
        assert_eq!(rules.code_of("b"), Some(TypeCode(1)));
        assert_eq!(rules.code_of("ab"), Some(TypeCode(2)));
        assert_eq!(rules.code_name(TypeCode(2)), Some("ab"));
    }

    #[test]
    fn test_instances_do_not_share_codes() {
        let mut first = PatternRegistry::new("first");
        first.fragment("x", "x").fragment("y", "y");
        let mut second = PatternRegistry::new("second");
        second.fragment("y", "y");
        let first = first.finalize().unwrap();
        let second = second.finalize().unwrap();
        assert_eq!(first.code_of("y"), Some(TypeCode(1)));
        assert_eq!(second.code_of("y"), Some(TypeCode(0)));
    }

    #[test]
    fn test_duplicate_name() {
        let mut registry = PatternRegistry::new("dup");
        registry.fragment("a", "a").keyword("a", "aa");
        assert_eq!(
            registry.finalize().unwrap_err(),
            ConfigError::Duplicate { name: "a".into() }
        );
    }

    #[test]
    fn test_forward_reference_resolves() {
        let mut registry = PatternRegistry::new("forward");
        registry.fragment("value", "{digits} {unit}").part("digits", r"\d+").part("unit", "mm");
        assert!(registry.finalize().is_ok());
    }

    #[test]
    fn test_undefined_reference() {
        let mut registry = PatternRegistry::new("undefined");
        registry.fragment("value", "{digits}");
        assert_eq!(
            registry.finalize().unwrap_err(),
            ConfigError::UndefinedReference {
                name: "value".into(),
                reference: "digits".into()
            }
        );
    }

    #[test]
    fn test_circular_reference() {
        let mut registry = PatternRegistry::new("circular");
        registry.part("a", "{b}").part("b", "{a}").fragment("c", "{a}");
        assert!(matches!(
            registry.finalize().unwrap_err(),
            ConfigError::CircularReference { .. }
        ));
    }

    #[test]
    fn test_counted_repetition_is_not_a_reference() {
        let mut registry = PatternRegistry::new("counted");
        registry.fragment("digits", r"\d{1,3}");
        assert!(registry.finalize().is_ok());
    }

    #[test]
    fn test_rule_references_unknown_token() {
        let mut registry = PatternRegistry::new("unknown");
        registry.fragment("a", "a").replace_rule("ab", &["a b"]);
        assert_eq!(
            registry.finalize().unwrap_err(),
            ConfigError::UndefinedReference {
                name: "ab".into(),
                reference: "b".into()
            }
        );
    }

    #[test]
    fn test_part_is_not_a_token() {
        let mut registry = PatternRegistry::new("part");
        registry.part("a", "a").product_rule(reject, &["a"]);
        assert!(matches!(
            registry.finalize().unwrap_err(),
            ConfigError::UndefinedReference { .. }
        ));
    }

    #[test]
    fn test_empty_rule_rejected() {
        let mut registry = PatternRegistry::new("empty");
        registry.fragment("a", "a").replace_rule("maybe", &["a?"]);
        assert_eq!(
            registry.finalize().unwrap_err(),
            ConfigError::EmptyMatch { name: "maybe".into() }
        );
    }

    #[test]
    fn test_rename_cycle_rejected() {
        let mut registry = PatternRegistry::new("cycle");
        registry
            .fragment("a", "a")
            .replace_rule("b", &["a | c"])
            .replace_rule("c", &["b"]);
        let err = registry.finalize().unwrap_err();
        assert!(matches!(err, ConfigError::NonTerminatingRule { ref name, .. } if name == "b"));
    }

    #[test]
    fn test_one_way_renames_allowed() {
        let mut registry = PatternRegistry::new("renames");
        registry
            .fragment("a", "a")
            .fragment("b", "b")
            .replace_rule("key", &["a | b"])
            .replace_rule("pair", &["key key"]);
        assert!(registry.finalize().is_ok());
    }

    #[test]
    fn test_invalid_regex() {
        let mut registry = PatternRegistry::new("bad");
        registry.fragment("a", "(unclosed");
        assert!(matches!(
            registry.finalize().unwrap_err(),
            ConfigError::InvalidPattern { .. }
        ));
    }

    #[test]
    fn test_invalid_sequence_pattern() {
        let mut registry = PatternRegistry::new("bad");
        registry.fragment("a", "a").replace_rule("r", &["a )"]);
        assert!(matches!(
            registry.finalize().unwrap_err(),
            ConfigError::InvalidPattern { .. }
        ));
    }

    #[test]
    fn test_guards() {
        let leaf = Leaf::fragment("num", r"\d+")
            .not_preceded_by(r"[a-z]")
            .not_followed_by("mm");
        let mut registry = PatternRegistry::new("guards");
        registry.leaf(leaf);
        let rules = registry.finalize().unwrap();
        let num = &rules.leaves[0];
        let fields = Fields::new();
        assert!(num.accepts("x 12 g", 2, 4, &fields));
        assert!(!num.accepts("x12 g", 1, 3, &fields));
        assert!(!num.accepts("12mm", 0, 2, &fields));
    }
}
