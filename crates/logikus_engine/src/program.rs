//! Programs, axioms and rules.

use std::fmt;

use crate::scope::Scope;
use crate::term::{Structure, Term};
use crate::unify::{structure_signature, term_signature};

// ============================================================================
// Rules
// ============================================================================

/// A logic statement: the first structure (the head) is true if the
/// following series of conditions (the body) are all true.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    terms: Vec<Term>,
}

impl Rule {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// The first structure of the rule, if any.
    pub fn head(&self) -> Option<&Term> {
        self.terms.first()
    }

    /// The conditions after the head.
    pub fn body(&self) -> &[Term] {
        if self.terms.is_empty() {
            &[]
        } else {
            &self.terms[1..]
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i == 1 {
                write!(f, " :- ")?;
            }
            if i > 1 {
                write!(f, ", ")?;
            }
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}

// ============================================================================
// Axioms
// ============================================================================

/// A clause in a program: a ground fact, or a rule entered with fresh
/// variables on every consultation.
#[derive(Clone, Debug, PartialEq)]
pub enum Axiom {
    Fact(Structure),
    Rule(Rule),
}

impl Axiom {
    /// True when this axiom's head has the same functor and arity as the
    /// goal. Clause selection skips everything else without copying.
    pub fn head_matches(&self, goal: &Term) -> bool {
        let Some(goal_signature) = term_signature(goal) else { return false };
        match self {
            Axiom::Fact(s) => structure_signature(s) == goal_signature,
            Axiom::Rule(r) => match r.head() {
                Some(head) => term_signature(head) == Some(goal_signature),
                None => false,
            },
        }
    }

    /// Makes a provable copy: the head to unify against and the body
    /// terms, all sharing one fresh scope. A fact is its own head (it is
    /// ground, so nothing needs copying) with an empty body.
    ///
    /// Returns `None` for a headless rule.
    pub fn dynamic_copy(&self) -> Option<(Term, Vec<Term>)> {
        match self {
            Axiom::Fact(s) => Some((Term::Structure(s.clone()), Vec::new())),
            Axiom::Rule(r) => {
                let mut scope = Scope::new();
                let mut copies = r.terms().iter().map(|t| t.copy_for_proof(&mut scope));
                let head = copies.next()?;
                let body = copies.collect();
                Some((head, body))
            }
        }
    }

    /// A display adapter for this axiom's head, used by proof tracing.
    pub fn head_display(&self) -> HeadDisplay<'_> {
        HeadDisplay(self)
    }
}

impl fmt::Display for Axiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axiom::Fact(s) => write!(f, "{}", s),
            Axiom::Rule(r) => write!(f, "{}", r),
        }
    }
}

/// Displays just the head of an axiom.
pub struct HeadDisplay<'a>(&'a Axiom);

impl fmt::Display for HeadDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Axiom::Fact(s) => write!(f, "{}", s),
            Axiom::Rule(r) => match r.head() {
                Some(head) => write!(f, "{}", head),
                None => Ok(()),
            },
        }
    }
}

// ============================================================================
// Programs
// ============================================================================

/// An ordered collection of axioms forming a logical model.
///
/// Iteration order is source order; clause selection during a proof walks
/// this order. A program is never mutated by queries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    axioms: Vec<Axiom>,
}

impl Program {
    /// An empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an axiom at the end.
    pub fn add_axiom(&mut self, axiom: Axiom) {
        self.axioms.push(axiom);
    }

    /// Appends all the axioms of another program to this one.
    pub fn append(&mut self, other: Program) {
        self.axioms.extend(other.axioms);
    }

    pub fn axioms(&self) -> &[Axiom] {
        &self.axioms
    }

    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, axiom) in self.axioms.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{};", axiom)?;
        }
        Ok(())
    }
}
