//! Token Sequence Patterns
//!
//! Rules in the rewrite and produce phases are written as patterns over token
//! type names instead of characters:
//!
//! ```text
//! key ( eq | dash )? (?P<value> range ) (?! mass_units )
//! ```
//!
//! The pattern language supports alternation, grouping (`(?:...)`), named
//! captures (`(?P<name>...)`), the quantifiers `?`, `*`, `+`, `{m,n}` and
//! zero-width lookaround (`(?=...)`, `(?!...)`, `(?<=...)`, `(?<!...)`).
//! Whitespace between items is ignored.
//!
//! ## Matching
//!
//! Patterns compile to a small instruction program that runs as a Pike VM
//! over a slice of [`TypeCode`]s. Every rule of a phase lives in one program,
//! so a single scan finds the leftmost match with earlier rules winning ties.
//! The VM never backtracks; a scan is linear in the number of tokens times
//! the size of the program.
//!
//! Like the grammar engines it is modelled on, this module knows nothing about
//! traits; it is tested with plain names like "A", "B", "C".

use std::collections::{BTreeSet, HashMap};

use super::token::TypeCode;

/// Parsed form of one sequence pattern.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Symbol(String),
    Concat(Vec<Node>),
    Alternate(Vec<Node>),
    Repeat {
        node: Box<Node>,
        min: u32,
        max: Option<u32>,
    },
    Group {
        name: Option<String>,
        node: Box<Node>,
    },
    Look {
        ahead: bool,
        negate: bool,
        node: Box<Node>,
    },
}

impl Node {
    fn collect_symbols<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Symbol(name) => out.push(name),
            Node::Concat(items) | Node::Alternate(items) => {
                items.iter().for_each(|n| n.collect_symbols(out))
            }
            Node::Repeat { node, .. } | Node::Group { node, .. } | Node::Look { node, .. } => {
                node.collect_symbols(out)
            }
        }
    }

    fn can_be_empty(&self) -> bool {
        match self {
            Node::Symbol(_) => false,
            Node::Concat(items) => items.iter().all(Node::can_be_empty),
            Node::Alternate(items) => items.iter().any(Node::can_be_empty),
            Node::Repeat { node, min, .. } => *min == 0 || node.can_be_empty(),
            Node::Group { node, .. } => node.can_be_empty(),
            Node::Look { .. } => true,
        }
    }

    /// Symbols that this node can match as a run of exactly one token.
    fn single_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Node::Symbol(name) => {
                out.insert(name.clone());
            }
            Node::Concat(items) => {
                for (i, item) in items.iter().enumerate() {
                    let rest_empty = items
                        .iter()
                        .enumerate()
                        .all(|(j, other)| j == i || other.can_be_empty());
                    if rest_empty {
                        item.single_symbols(out);
                    }
                }
            }
            Node::Alternate(items) => items.iter().for_each(|n| n.single_symbols(out)),
            Node::Repeat { node, min, max } => {
                if *max != Some(0) && (*min <= 1 || node.can_be_empty()) {
                    node.single_symbols(out);
                }
            }
            Node::Group { node, .. } => node.single_symbols(out),
            Node::Look { .. } => {}
        }
    }
}

/// A parsed sequence pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencePattern {
    source: String,
    node: Node,
}

impl SequencePattern {
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut parser = PatternParser {
            chars: source.chars().collect(),
            pos: 0,
        };
        let node = parser.parse_alternation()?;
        parser.skip_whitespace();
        if let Some(c) = parser.peek() {
            return Err(format!("unexpected '{}' at {}", c, parser.pos));
        }
        Ok(Self {
            source: source.to_string(),
            node,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every token name the pattern mentions.
    pub fn symbols(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.node.collect_symbols(&mut out);
        out
    }

    pub fn can_match_empty(&self) -> bool {
        self.node.can_be_empty()
    }

    /// Names of token types the pattern can match as a single token.
    pub fn single_token_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.node.single_symbols(&mut out);
        out
    }
}

struct PatternParser {
    chars: Vec<char>,
    pos: usize,
}

impl PatternParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        let len = expected.chars().count();
        let matches = self.chars.len() >= self.pos + len
            && self.chars[self.pos..self.pos + len]
                .iter()
                .copied()
                .eq(expected.chars());
        if matches {
            self.pos += len;
        }
        matches
    }

    fn parse_alternation(&mut self) -> Result<Node, String> {
        let mut alternatives = vec![self.parse_concat()?];
        while self.eat('|') {
            alternatives.push(self.parse_concat()?);
        }
        Ok(match alternatives.len() {
            1 => alternatives.remove(0),
            _ => Node::Alternate(alternatives),
        })
    }

    fn parse_concat(&mut self) -> Result<Node, String> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None | Some('|') | Some(')') => break,
                Some(_) => {
                    let atom = self.parse_atom()?;
                    items.push(self.parse_quantifiers(atom)?);
                }
            }
        }
        Ok(match items.len() {
            1 => items.remove(0),
            _ => Node::Concat(items),
        })
    }

    fn parse_atom(&mut self) -> Result<Node, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                self.parse_group()
            }
            Some(c) if c.is_alphabetic() || c == '_' => Ok(Node::Symbol(self.parse_ident())),
            Some(c) => Err(format!("unexpected '{}' at {}", c, self.pos)),
            None => Err("unexpected end of pattern".into()),
        }
    }

    fn parse_ident(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn parse_group(&mut self) -> Result<Node, String> {
        let (name, look) = if self.eat_str("?:") {
            (None, None)
        } else if self.eat_str("?=") {
            (None, Some((true, false)))
        } else if self.eat_str("?!") {
            (None, Some((true, true)))
        } else if self.eat_str("?<=") {
            (None, Some((false, false)))
        } else if self.eat_str("?<!") {
            (None, Some((false, true)))
        } else if self.eat_str("?P<") || self.eat_str("?<") {
            let name = self.parse_ident();
            if name.is_empty() || !self.eat_str(">") {
                return Err(format!("malformed group name at {}", self.pos));
            }
            (Some(name), None)
        } else if self.peek() == Some('?') {
            return Err(format!("unsupported group syntax at {}", self.pos));
        } else {
            (None, None)
        };

        let node = Box::new(self.parse_alternation()?);
        if !self.eat(')') {
            return Err(format!("missing ')' at {}", self.pos));
        }
        Ok(match look {
            Some((ahead, negate)) => Node::Look {
                ahead,
                negate,
                node,
            },
            None => Node::Group { name, node },
        })
    }

    fn parse_quantifiers(&mut self, mut atom: Node) -> Result<Node, String> {
        loop {
            self.skip_whitespace();
            let (min, max) = match self.peek() {
                Some('?') => (0, Some(1)),
                Some('*') => (0, None),
                Some('+') => (1, None),
                Some('{') => {
                    self.pos += 1;
                    let bounds = self.parse_counted()?;
                    atom = Node::Repeat {
                        node: Box::new(atom),
                        min: bounds.0,
                        max: bounds.1,
                    };
                    continue;
                }
                _ => return Ok(atom),
            };
            self.pos += 1;
            atom = Node::Repeat {
                node: Box::new(atom),
                min,
                max,
            };
        }
    }

    fn parse_number(&mut self) -> Option<u32> {
        self.skip_whitespace();
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits.parse().ok()
    }

    fn parse_counted(&mut self) -> Result<(u32, Option<u32>), String> {
        let min = self.parse_number();
        let max = if self.eat(',') {
            self.parse_number()
        } else {
            Some(min.ok_or_else(|| format!("empty repetition at {}", self.pos))?)
        };
        if !self.eat('}') {
            return Err(format!("missing '}}' at {}", self.pos));
        }
        let min = min.unwrap_or(0);
        if max.is_some_and(|max| max < min) {
            return Err(format!("repetition bounds out of order at {}", self.pos));
        }
        Ok((min, max))
    }
}

#[derive(Debug, Clone)]
enum Inst {
    Symbol(TypeCode),
    Split(usize, usize),
    Jump(usize),
    Save(usize),
    Look {
        ahead: bool,
        negate: bool,
        program: usize,
    },
    Match(usize),
}

/// A compiled instruction program plus the programs of its lookarounds.
#[derive(Debug, Clone, Default)]
struct Program {
    insts: Vec<Inst>,
    slot_count: usize,
    looks: Vec<Program>,
}

struct Hit {
    alternative: usize,
    start: usize,
    end: usize,
    slots: Vec<Option<usize>>,
}

#[derive(Clone)]
struct Thread {
    pc: usize,
    start: usize,
    slots: Vec<Option<usize>>,
}

struct ThreadList {
    threads: Vec<Thread>,
    seen: Vec<bool>,
}

impl ThreadList {
    fn new(size: usize) -> Self {
        Self {
            threads: Vec::new(),
            seen: vec![false; size],
        }
    }

    fn clear(&mut self) {
        self.threads.clear();
        self.seen.iter_mut().for_each(|s| *s = false);
    }
}

impl Program {
    fn run(
        &self,
        codes: &[TypeCode],
        from: usize,
        anchored: bool,
        must_end: Option<usize>,
    ) -> Option<Hit> {
        let limit = must_end.unwrap_or(codes.len()).min(codes.len());
        let mut current = ThreadList::new(self.insts.len());
        let mut next = ThreadList::new(self.insts.len());
        let mut hit: Option<Hit> = None;
        let mut pos = from;

        loop {
            if hit.is_none() && (pos == from || !anchored) {
                let slots = vec![None; self.slot_count];
                self.add_thread(&mut current, 0, pos, pos, slots, codes);
            }
            if current.threads.is_empty() && (hit.is_some() || anchored || pos >= limit) {
                break;
            }

            for i in 0..current.threads.len() {
                let thread = current.threads[i].clone();
                match self.insts[thread.pc] {
                    Inst::Symbol(code) => {
                        if pos < limit && codes[pos] == code {
                            self.add_thread(
                                &mut next,
                                thread.pc + 1,
                                pos + 1,
                                thread.start,
                                thread.slots,
                                codes,
                            );
                        }
                    }
                    Inst::Match(alternative) => {
                        if must_end.map_or(true, |end| end == pos) {
                            hit = Some(Hit {
                                alternative,
                                start: thread.start,
                                end: pos,
                                slots: thread.slots,
                            });
                            break;
                        }
                    }
                    _ => {}
                }
            }

            if pos >= limit {
                break;
            }
            std::mem::swap(&mut current, &mut next);
            next.clear();
            pos += 1;
        }
        hit
    }

    fn add_thread(
        &self,
        list: &mut ThreadList,
        pc: usize,
        pos: usize,
        start: usize,
        mut slots: Vec<Option<usize>>,
        codes: &[TypeCode],
    ) {
        if list.seen[pc] {
            return;
        }
        list.seen[pc] = true;
        match &self.insts[pc] {
            Inst::Jump(target) => self.add_thread(list, *target, pos, start, slots, codes),
            Inst::Split(first, second) => {
                self.add_thread(list, *first, pos, start, slots.clone(), codes);
                self.add_thread(list, *second, pos, start, slots, codes);
            }
            Inst::Save(slot) => {
                slots[*slot] = Some(pos);
                self.add_thread(list, pc + 1, pos, start, slots, codes);
            }
            Inst::Look {
                ahead,
                negate,
                program,
            } => {
                let look = &self.looks[*program];
                let found = if *ahead {
                    look.run(codes, pos, true, None).is_some()
                } else {
                    (0..=pos)
                        .rev()
                        .any(|begin| look.run(codes, begin, true, Some(pos)).is_some())
                };
                if found != *negate {
                    self.add_thread(list, pc + 1, pos, start, slots, codes);
                }
            }
            Inst::Symbol(_) | Inst::Match(_) => list.threads.push(Thread { pc, start, slots }),
        }
    }
}

struct Compiler<'a, F> {
    resolve: &'a F,
    slots: &'a mut HashMap<String, usize>,
    names: &'a mut Vec<String>,
}

impl<'a, F> Compiler<'a, F>
where
    F: Fn(&str) -> Option<TypeCode>,
{
    fn slot_for(&mut self, name: &str) -> usize {
        if let Some(index) = self.slots.get(name) {
            return *index;
        }
        let index = self.names.len();
        self.names.push(name.to_string());
        self.slots.insert(name.to_string(), index);
        index
    }

    fn emit(&mut self, program: &mut Program, node: &Node) -> Result<(), String> {
        match node {
            Node::Symbol(name) => {
                let code = (self.resolve)(name)
                    .ok_or_else(|| format!("unknown token name '{}'", name))?;
                program.insts.push(Inst::Symbol(code));
            }
            Node::Concat(items) => {
                for item in items {
                    self.emit(program, item)?;
                }
            }
            Node::Alternate(items) => {
                let mut jumps = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    if i + 1 < items.len() {
                        let split = program.insts.len();
                        program.insts.push(Inst::Split(split + 1, 0));
                        self.emit(program, item)?;
                        jumps.push(program.insts.len());
                        program.insts.push(Inst::Jump(0));
                        let next = program.insts.len();
                        program.insts[split] = Inst::Split(split + 1, next);
                    } else {
                        self.emit(program, item)?;
                    }
                }
                let end = program.insts.len();
                for jump in jumps {
                    program.insts[jump] = Inst::Jump(end);
                }
            }
            Node::Repeat { node, min, max } => {
                for _ in 0..*min {
                    self.emit(program, node)?;
                }
                match max {
                    None => {
                        let split = program.insts.len();
                        program.insts.push(Inst::Split(split + 1, 0));
                        self.emit(program, node)?;
                        program.insts.push(Inst::Jump(split));
                        let exit = program.insts.len();
                        program.insts[split] = Inst::Split(split + 1, exit);
                    }
                    Some(max) => {
                        let mut splits = Vec::new();
                        for _ in *min..*max {
                            splits.push(program.insts.len());
                            program.insts.push(Inst::Split(0, 0));
                            self.emit(program, node)?;
                        }
                        let exit = program.insts.len();
                        for split in splits {
                            program.insts[split] = Inst::Split(split + 1, exit);
                        }
                    }
                }
            }
            Node::Group { name: None, node } => self.emit(program, node)?,
            Node::Group {
                name: Some(name),
                node,
            } => {
                let slot = self.slot_for(name);
                program.insts.push(Inst::Save(slot * 2));
                self.emit(program, node)?;
                program.insts.push(Inst::Save(slot * 2 + 1));
            }
            Node::Look {
                ahead,
                negate,
                node,
            } => {
                let mut look = Program::default();
                let mut slots = HashMap::new();
                let mut names = Vec::new();
                let mut inner = Compiler {
                    resolve: self.resolve,
                    slots: &mut slots,
                    names: &mut names,
                };
                inner.emit(&mut look, node)?;
                look.insts.push(Inst::Match(0));
                look.slot_count = names.len() * 2;
                program.looks.push(look);
                program.insts.push(Inst::Look {
                    ahead: *ahead,
                    negate: *negate,
                    program: program.looks.len() - 1,
                });
            }
        }
        Ok(())
    }
}

/// A match of one rule over a token-code sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceMatch {
    /// Index of the rule that matched, in registration order.
    pub rule: usize,
    /// Index of the first matched token.
    pub start: usize,
    /// One past the last matched token.
    pub end: usize,
    /// Named captures as token index ranges.
    pub captures: Vec<(String, usize, usize)>,
}

impl SequenceMatch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Matches the union of a set of rules, each a list of alternative patterns.
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    program: Program,
    capture_names: Vec<String>,
    rule_count: usize,
}

impl SequenceMatcher {
    /// Compile rules into one matcher.
    ///
    /// On failure, returns the index of the offending rule with a message.
    pub fn compile<F>(rules: &[Vec<SequencePattern>], resolve: &F) -> Result<Self, (usize, String)>
    where
        F: Fn(&str) -> Option<TypeCode>,
    {
        let mut program = Program::default();
        let mut slots = HashMap::new();
        let mut names = Vec::new();
        for (index, alternatives) in rules.iter().enumerate() {
            let split = program.insts.len();
            let last = index + 1 == rules.len();
            if !last {
                program.insts.push(Inst::Split(split + 1, 0));
            }
            let node = Node::Alternate(alternatives.iter().map(|p| p.node.clone()).collect());
            let mut compiler = Compiler {
                resolve,
                slots: &mut slots,
                names: &mut names,
            };
            compiler
                .emit(&mut program, &node)
                .map_err(|message| (index, message))?;
            program.insts.push(Inst::Match(index));
            if !last {
                let next = program.insts.len();
                program.insts[split] = Inst::Split(split + 1, next);
            }
        }
        program.slot_count = names.len() * 2;

        Ok(Self {
            program,
            capture_names: names,
            rule_count: rules.len(),
        })
    }

    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    /// Leftmost match starting at or after `from`.
    pub fn find_at(&self, codes: &[TypeCode], from: usize) -> Option<SequenceMatch> {
        if self.rule_count == 0 || from > codes.len() {
            return None;
        }
        self.program
            .run(codes, from, false, None)
            .map(|hit| self.to_match(hit))
    }

    /// All non-overlapping, non-empty matches from left to right.
    pub fn find_iter(&self, codes: &[TypeCode]) -> Vec<SequenceMatch> {
        let mut matches = Vec::new();
        let mut from = 0;
        while let Some(found) = self.find_at(codes, from) {
            if found.is_empty() {
                from = found.start + 1;
                continue;
            }
            from = found.end;
            matches.push(found);
        }
        matches
    }

    fn to_match(&self, hit: Hit) -> SequenceMatch {
        let captures = self
            .capture_names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| match (hit.slots[i * 2], hit.slots[i * 2 + 1]) {
                (Some(start), Some(end)) if end > start => Some((name.clone(), start, end)),
                _ => None,
            })
            .collect();
        SequenceMatch {
            rule: hit.alternative,
            start: hit.start,
            end: hit.end,
            captures,
        }
    }
}
