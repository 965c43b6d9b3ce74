//! Text-level entry points: programs, axioms and queries.
//!
//! A program text is a `;`-separated sequence of axioms; whitespace and
//! `//` / `/* */` comments are ignored by the tokenizer. Each axiom slice
//! is matched with the axiom grammar; a query text is matched with the
//! condition-list grammar and wrapped into an engine [`Query`] against a
//! program.

use std::error::Error;
use std::fmt;
use std::rc::Rc;

use logikus_base::{Token, Tokenizer, TrackError};
use logikus_engine::{Axiom, Program, Query, Rule, Term};

use crate::assembly::{StackItem, TokenAssembly};
use crate::combinators::Matcher;
use crate::grammar::LogikusParser;

/// Why a text failed to parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// A committed grammar element failed (see [`TrackError`]).
    Track(TrackError),
    /// Nothing in the grammar matched the input.
    Unrecognized { text: String },
    /// The best match left tokens unconsumed.
    Leftovers { remainder: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Track(e) => write!(f, "{}", e),
            ParseError::Unrecognized { text } => write!(f, "unrecognized input: {}", text),
            ParseError::Leftovers { remainder } => {
                write!(f, "input continues past the axiom: {}", remainder)
            }
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::Track(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TrackError> for ParseError {
    fn from(e: TrackError) -> Self {
        ParseError::Track(e)
    }
}

/// Parses a multi-axiom program text.
///
/// Axioms are separated by `;`; a trailing `;` is fine. An empty slice
/// between separators ends the program, so a doubled `;;` acts as an
/// end-of-input marker.
pub fn program(text: &str) -> Result<Program, ParseError> {
    let parser = LogikusParser::new();
    let mut program = Program::new();
    for tokens in axiom_token_strings(text) {
        program.add_axiom(parse_axiom_tokens(&parser, tokens)?);
    }
    Ok(program)
}

/// Parses a single axiom text.
pub fn axiom(text: &str) -> Result<Axiom, ParseError> {
    let parser = LogikusParser::new();
    parse_axiom_tokens(&parser, Tokenizer::new(text).collect())
}

/// Parses a query text into a resumable proof iterator against `program`.
pub fn query<'p>(text: &str, program: &'p Program) -> Result<Query<'p>, ParseError> {
    let parser = LogikusParser::new();
    let rule = parse_rule(parser.query(), Tokenizer::new(text).collect())?;
    Ok(Query::new(program, &rule))
}

/// Splits the token stream on `;` delimiters; an empty slice ends the
/// stream.
fn axiom_token_strings(text: &str) -> Vec<Vec<Token>> {
    let mut tokenizer = Tokenizer::new(text);
    let mut strings = Vec::new();
    loop {
        let mut current = Vec::new();
        loop {
            let token = tokenizer.next_token();
            if token.is_eof() || (token.is_symbol() && token.text() == ";") {
                break;
            }
            current.push(token);
        }
        if current.is_empty() {
            return strings;
        }
        strings.push(current);
    }
}

fn parse_axiom_tokens(parser: &LogikusParser, tokens: Vec<Token>) -> Result<Axiom, ParseError> {
    let rule = parse_rule(parser.axiom(), tokens)?;
    Ok(classify(rule))
}

/// A single ground structure is a fact, consulted without copying;
/// everything else stays a rule entered through a fresh scope.
fn classify(rule: Rule) -> Axiom {
    if rule.terms().len() == 1 {
        if let Term::Structure(s) = &rule.terms()[0] {
            if s.is_ground() {
                return Axiom::Fact(s.clone());
            }
        }
    }
    Axiom::Rule(rule)
}

fn parse_rule(matcher: Rc<dyn Matcher>, tokens: Vec<Token>) -> Result<Rule, ParseError> {
    let source = join_spellings(&tokens);
    let assembly = TokenAssembly::new(tokens);
    let Some(mut best) = matcher.best_match(assembly)? else {
        return Err(ParseError::Unrecognized { text: source });
    };
    // A lone trailing ";" is tolerated; anything else unconsumed is an
    // error.
    if best.has_more() && best.remainder_string("") != ";" {
        return Err(ParseError::Leftovers { remainder: best.remainder_string(" ") });
    }
    match best.pop() {
        Some(StackItem::Rule(rule)) => Ok(rule),
        _ => Err(ParseError::Unrecognized { text: source }),
    }
}

fn join_spellings(tokens: &[Token]) -> String {
    let mut buf = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            buf.push(' ');
        }
        buf.push_str(&token.to_string());
    }
    buf
}
