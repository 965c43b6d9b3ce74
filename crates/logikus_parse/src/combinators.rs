//! Parser combinators over token assemblies.
//!
//! A [`Matcher`] maps a set of assemblies to a set of assemblies — the
//! set is the non-determinism carrier for alternation. Failure is the
//! empty set, except inside a [`Track`]: once a track's first element has
//! matched, a later empty set becomes a [`TrackError`] naming the
//! consumed prefix, the expected matcher and the offending token.
//!
//! Matchers are shared as `Rc<dyn Matcher>`; recursive productions tie
//! the knot through a [`Forward`] holding a weak reference, so a grammar
//! drops cleanly.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use logikus_base::{Token, TrackError};

use crate::assembly::{StackItem, TokenAssembly};

/// The outcome of a match: surviving assemblies, or a committed failure.
pub type MatchResult = Result<Vec<TokenAssembly>, TrackError>;

/// A semantic action run on each assembly a matcher lets through.
pub trait Assembler {
    fn work_on(&self, assembly: &mut TokenAssembly);
}

/// A recognizer over sets of token assemblies.
pub trait Matcher {
    /// Matches against every input assembly, returning all survivors.
    fn match_assemblies(&self, input: &[TokenAssembly]) -> MatchResult;

    /// The semantic action to run on survivors, if any.
    fn assembler(&self) -> Option<&Rc<dyn Assembler>> {
        None
    }

    /// How this matcher names itself in error messages.
    fn describe(&self) -> String;

    /// Matches, then runs the assembler on every survivor.
    fn match_and_assemble(&self, input: &[TokenAssembly]) -> MatchResult {
        let mut out = self.match_assemblies(input)?;
        if let Some(assembler) = self.assembler() {
            for assembly in &mut out {
                assembler.work_on(assembly);
            }
        }
        Ok(out)
    }

    /// The survivor that consumed the most tokens (a fully consumed
    /// assembly wins outright), or `None` when nothing matched.
    fn best_match(&self, assembly: TokenAssembly) -> Result<Option<TokenAssembly>, TrackError> {
        let out = self.match_and_assemble(&[assembly])?;
        Ok(best_of(&out).cloned())
    }

    /// Like [`best_match`](Self::best_match), but only a survivor that
    /// consumed every token counts.
    fn complete_match(&self, assembly: TokenAssembly) -> Result<Option<TokenAssembly>, TrackError> {
        Ok(self.best_match(assembly)?.filter(|a| !a.has_more()))
    }
}

/// Picks the best assembly: the first fully consumed one, otherwise the
/// earliest with the most tokens consumed.
pub(crate) fn best_of(assemblies: &[TokenAssembly]) -> Option<&TokenAssembly> {
    let mut best: Option<&TokenAssembly> = None;
    for assembly in assemblies {
        if !assembly.has_more() {
            return Some(assembly);
        }
        match best {
            Some(b) if assembly.consumed() <= b.consumed() => {}
            _ => best = Some(assembly),
        }
    }
    best
}

// ============================================================================
// Terminals
// ============================================================================

/// What a terminal requires of its token.
#[derive(Clone, Debug)]
pub enum TerminalKind {
    /// Any word token.
    Word,
    /// A word starting with a lowercase letter.
    LowercaseWord,
    /// A word starting with an uppercase letter.
    UppercaseWord,
    /// Any number token.
    Num,
    /// Any quoted-string token.
    QuotedString,
    /// Exactly this symbol token.
    Symbol(Token),
    /// Exactly this token (spelling decides word vs symbol).
    Literal(Token),
    /// This token, compared case-insensitively.
    CaselessLiteral(Token),
}

/// A matcher that consumes one qualifying token, pushing it on the stack
/// unless told to discard it.
pub struct Terminal {
    kind: TerminalKind,
    discard: bool,
    assembler: Option<Rc<dyn Assembler>>,
}

impl Terminal {
    pub fn new(kind: TerminalKind) -> Self {
        Self { kind, discard: false, assembler: None }
    }

    pub fn word() -> Self {
        Self::new(TerminalKind::Word)
    }

    pub fn lowercase_word() -> Self {
        Self::new(TerminalKind::LowercaseWord)
    }

    pub fn uppercase_word() -> Self {
        Self::new(TerminalKind::UppercaseWord)
    }

    pub fn num() -> Self {
        Self::new(TerminalKind::Num)
    }

    pub fn quoted_string() -> Self {
        Self::new(TerminalKind::QuotedString)
    }

    pub fn symbol(spelling: &str) -> Self {
        Self::new(TerminalKind::Symbol(Token::symbol(spelling)))
    }

    pub fn literal(spelling: &str) -> Self {
        Self::new(TerminalKind::Literal(Token::from_spelling(spelling)))
    }

    pub fn caseless_literal(spelling: &str) -> Self {
        Self::new(TerminalKind::CaselessLiteral(Token::from_spelling(spelling)))
    }

    /// Consume the token without pushing it.
    pub fn discard(mut self) -> Self {
        self.discard = true;
        self
    }

    pub fn with_assembler(mut self, assembler: Rc<dyn Assembler>) -> Self {
        self.assembler = Some(assembler);
        self
    }

    fn qualifies(&self, token: &Token) -> bool {
        match &self.kind {
            TerminalKind::Word => token.is_word(),
            TerminalKind::LowercaseWord => {
                token.is_word()
                    && token.text().chars().next().is_some_and(|c| c.is_lowercase())
            }
            TerminalKind::UppercaseWord => {
                token.is_word()
                    && token.text().chars().next().is_some_and(|c| c.is_uppercase())
            }
            TerminalKind::Num => token.is_number(),
            TerminalKind::QuotedString => token.is_quoted(),
            TerminalKind::Symbol(expected) | TerminalKind::Literal(expected) => expected == token,
            TerminalKind::CaselessLiteral(expected) => expected.matches_ignore_case(token),
        }
    }

    fn match_one(&self, input: &TokenAssembly) -> Option<TokenAssembly> {
        let token = input.peek()?;
        if !self.qualifies(token) {
            return None;
        }
        let mut out = input.clone();
        let consumed = out.next_element()?;
        if !self.discard {
            out.push(StackItem::Token(consumed));
        }
        Some(out)
    }
}

impl Matcher for Terminal {
    fn match_assemblies(&self, input: &[TokenAssembly]) -> MatchResult {
        Ok(input.iter().filter_map(|a| self.match_one(a)).collect())
    }

    fn assembler(&self) -> Option<&Rc<dyn Assembler>> {
        self.assembler.as_ref()
    }

    fn describe(&self) -> String {
        match &self.kind {
            TerminalKind::Word => "Word".to_string(),
            TerminalKind::LowercaseWord => "word".to_string(),
            TerminalKind::UppercaseWord => "Word".to_string(),
            TerminalKind::Num => "Num".to_string(),
            TerminalKind::QuotedString => "QuotedString".to_string(),
            TerminalKind::Symbol(t) | TerminalKind::Literal(t) | TerminalKind::CaselessLiteral(t) => {
                t.to_string()
            }
        }
    }
}

// ============================================================================
// Composites
// ============================================================================

/// The identity matcher: every input survives untouched.
pub struct Empty {
    assembler: Option<Rc<dyn Assembler>>,
}

impl Empty {
    pub fn new() -> Self {
        Self { assembler: None }
    }

    pub fn with_assembler(mut self, assembler: Rc<dyn Assembler>) -> Self {
        self.assembler = Some(assembler);
        self
    }
}

impl Default for Empty {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher for Empty {
    fn match_assemblies(&self, input: &[TokenAssembly]) -> MatchResult {
        Ok(input.to_vec())
    }

    fn assembler(&self) -> Option<&Rc<dyn Assembler>> {
        self.assembler.as_ref()
    }

    fn describe(&self) -> String {
        " empty ".to_string()
    }
}

/// A left-to-right chain; fails fast on the first empty step.
pub struct Sequence {
    name: Option<String>,
    subs: Vec<Rc<dyn Matcher>>,
    assembler: Option<Rc<dyn Assembler>>,
}

impl Sequence {
    pub fn new() -> Self {
        Self { name: None, subs: Vec::new(), assembler: None }
    }

    pub fn named(name: &str) -> Self {
        Self { name: Some(name.to_string()), subs: Vec::new(), assembler: None }
    }

    pub fn add(mut self, sub: Rc<dyn Matcher>) -> Self {
        self.subs.push(sub);
        self
    }

    pub fn with_assembler(mut self, assembler: Rc<dyn Assembler>) -> Self {
        self.assembler = Some(assembler);
        self
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher for Sequence {
    fn match_assemblies(&self, input: &[TokenAssembly]) -> MatchResult {
        let mut state = input.to_vec();
        for sub in &self.subs {
            state = sub.match_and_assemble(&state)?;
            if state.is_empty() {
                return Ok(state);
            }
        }
        Ok(state)
    }

    fn assembler(&self) -> Option<&Rc<dyn Assembler>> {
        self.assembler.as_ref()
    }

    fn describe(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => {
                let mut buf = String::from("<");
                for sub in &self.subs {
                    buf.push_str(&sub.describe());
                }
                buf.push('>');
                buf
            }
        }
    }
}

/// The union of its branches' matches.
pub struct Alternation {
    name: Option<String>,
    subs: Vec<Rc<dyn Matcher>>,
    assembler: Option<Rc<dyn Assembler>>,
}

impl Alternation {
    pub fn new() -> Self {
        Self { name: None, subs: Vec::new(), assembler: None }
    }

    pub fn named(name: &str) -> Self {
        Self { name: Some(name.to_string()), subs: Vec::new(), assembler: None }
    }

    pub fn add(mut self, sub: Rc<dyn Matcher>) -> Self {
        self.subs.push(sub);
        self
    }

    pub fn with_assembler(mut self, assembler: Rc<dyn Assembler>) -> Self {
        self.assembler = Some(assembler);
        self
    }
}

impl Default for Alternation {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher for Alternation {
    fn match_assemblies(&self, input: &[TokenAssembly]) -> MatchResult {
        let mut out = Vec::new();
        for sub in &self.subs {
            out.extend(sub.match_and_assemble(input)?);
        }
        Ok(out)
    }

    fn assembler(&self) -> Option<&Rc<dyn Assembler>> {
        self.assembler.as_ref()
    }

    fn describe(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => {
                let mut buf = String::from("<");
                for (i, sub) in self.subs.iter().enumerate() {
                    if i > 0 {
                        buf.push('|');
                    }
                    buf.push_str(&sub.describe());
                }
                buf.push('>');
                buf
            }
        }
    }
}

/// Zero or more of the sub-matcher. The result keeps every intermediate
/// assembly, so the consumer can pick the longest match.
pub struct Repetition {
    sub: Rc<dyn Matcher>,
    assembler: Option<Rc<dyn Assembler>>,
}

impl Repetition {
    pub fn new(sub: Rc<dyn Matcher>) -> Self {
        Self { sub, assembler: None }
    }

    pub fn with_assembler(mut self, assembler: Rc<dyn Assembler>) -> Self {
        self.assembler = Some(assembler);
        self
    }
}

impl Matcher for Repetition {
    fn match_assemblies(&self, input: &[TokenAssembly]) -> MatchResult {
        let mut out = input.to_vec();
        let mut state = input.to_vec();
        while !state.is_empty() {
            state = self.sub.match_and_assemble(&state)?;
            out.extend(state.iter().cloned());
        }
        Ok(out)
    }

    fn assembler(&self) -> Option<&Rc<dyn Assembler>> {
        self.assembler.as_ref()
    }

    fn describe(&self) -> String {
        format!("{}*", self.sub.describe())
    }
}

/// A sequence with a commit point: after the first element matches, any
/// later empty step raises a [`TrackError`] instead of returning the
/// empty set.
pub struct Track {
    name: Option<String>,
    subs: Vec<Rc<dyn Matcher>>,
    assembler: Option<Rc<dyn Assembler>>,
}

impl Track {
    pub fn new() -> Self {
        Self { name: None, subs: Vec::new(), assembler: None }
    }

    pub fn named(name: &str) -> Self {
        Self { name: Some(name.to_string()), subs: Vec::new(), assembler: None }
    }

    pub fn add(mut self, sub: Rc<dyn Matcher>) -> Self {
        self.subs.push(sub);
        self
    }

    pub fn with_assembler(mut self, assembler: Rc<dyn Assembler>) -> Self {
        self.assembler = Some(assembler);
        self
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher for Track {
    fn match_assemblies(&self, input: &[TokenAssembly]) -> MatchResult {
        let mut in_track = false;
        let mut state = input.to_vec();
        for sub in &self.subs {
            let out = sub.match_and_assemble(&state)?;
            if out.is_empty() {
                if in_track {
                    return Err(track_error(&state, sub.as_ref()));
                }
                return Ok(out);
            }
            in_track = true;
            state = out;
        }
        Ok(state)
    }

    fn assembler(&self) -> Option<&Rc<dyn Assembler>> {
        self.assembler.as_ref()
    }

    fn describe(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => {
                let mut buf = String::from("<");
                for sub in &self.subs {
                    buf.push_str(&sub.describe());
                }
                buf.push('>');
                buf
            }
        }
    }
}

/// Builds the committed-failure report from the assemblies that were
/// alive before the failing step.
fn track_error(state: &[TokenAssembly], expected: &dyn Matcher) -> TrackError {
    let best = best_of(state);
    let after = best.map(|a| a.consumed_string(" ")).unwrap_or_default();
    let after = if after.is_empty() { "-nothing-".to_string() } else { after };
    let found = best
        .and_then(|a| a.peek())
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-nothing-".to_string());
    TrackError { after, expected: expected.describe(), found }
}

/// A placeholder for a production defined later, breaking grammar cycles.
///
/// Holds only a weak reference; the grammar keeps the strong one. An
/// undefined forward matches nothing.
pub struct Forward {
    name: String,
    target: RefCell<Option<Weak<dyn Matcher>>>,
}

impl Forward {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), target: RefCell::new(None) }
    }

    /// Ties the knot.
    pub fn define(&self, target: &Rc<dyn Matcher>) {
        *self.target.borrow_mut() = Some(Rc::downgrade(target));
    }

    fn resolve(&self) -> Option<Rc<dyn Matcher>> {
        self.target.borrow().as_ref().and_then(Weak::upgrade)
    }
}

impl Matcher for Forward {
    fn match_assemblies(&self, input: &[TokenAssembly]) -> MatchResult {
        match self.resolve() {
            Some(target) => target.match_and_assemble(input),
            None => Ok(Vec::new()),
        }
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}
