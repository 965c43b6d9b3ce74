//! Unification and the binding trail.
//!
//! [`unify`] finds a variable substitution making two terms structurally
//! equal, binding variables through their shared cells as it goes. The
//! returned [`Unification`] is the trail: the set of variables this
//! attempt newly bound. Unbinding the trail restores the binding state to
//! exactly what it was before the attempt — that is how backtracking
//! steps back.
//!
//! There is no occurs-check; a pathological program can build a cyclic
//! term graph, matching the engine's inherited semantics.

use std::fmt;

use crate::term::{Structure, Term, Variable};

// ============================================================================
// The trail
// ============================================================================

/// The set of variables newly bound by one unification step.
///
/// Order is first-binding order; a variable appears at most once (handles
/// sharing a cell count as the same variable).
#[derive(Clone, Debug, Default)]
pub struct Unification {
    variables: Vec<Variable>,
}

impl Unification {
    /// The empty (trivially successful) unification.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A unification holding a single newly bound variable.
    pub fn with(variable: Variable) -> Self {
        Self { variables: vec![variable] }
    }

    /// Adds a variable unless a handle to its cell is already present.
    pub fn add(&mut self, variable: Variable) {
        if !self.variables.iter().any(|v| v.shares_cell(&variable)) {
            self.variables.push(variable);
        }
    }

    /// Adds every variable of `other`.
    pub fn append(&mut self, other: Unification) {
        for variable in other.variables {
            self.add(variable);
        }
    }

    /// Asks every contained variable to unbind.
    pub fn unbind(&self) {
        for variable in &self.variables {
            variable.unbind();
        }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn into_variables(self) -> Vec<Variable> {
        self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl fmt::Display for Unification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, variable) in self.variables.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", variable.definition_string())?;
        }
        Ok(())
    }
}

// ============================================================================
// Structural views
// ============================================================================

/// A borrowed view of a functor, for signature comparison without cloning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum FunctorView<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> FunctorView<'a> {
    fn of(functor: &'a crate::term::Functor) -> Self {
        match functor {
            crate::term::Functor::Text(s) => FunctorView::Text(s),
            crate::term::Functor::Number(n) => FunctorView::Number(*n),
        }
    }
}

pub(crate) fn structure_signature(s: &Structure) -> (FunctorView<'_>, usize) {
    (FunctorView::of(s.functor()), s.arity())
}

/// The functor and children of any structure-like term.
///
/// Operator nodes behave as structures labelled by their operator, the
/// empty list as the nullary `.` structure, and a negation as its inner
/// structure. Variables and the anonymous variable have no parts.
pub(crate) fn structural_parts(term: &Term) -> Option<(FunctorView<'_>, Vec<&Term>)> {
    match term {
        Term::Variable(_) | Term::Anonymous => None,
        Term::Structure(s) | Term::Not(s) => {
            Some((FunctorView::of(s.functor()), s.terms().iter().collect()))
        }
        Term::EmptyList => Some((FunctorView::Text("."), Vec::new())),
        Term::Arithmetic(a) => {
            Some((FunctorView::Text(a.op().as_str()), vec![a.left(), a.right()]))
        }
        Term::Comparison(c) => {
            Some((FunctorView::Text(c.op().as_str()), vec![c.left(), c.right()]))
        }
        Term::Evaluation(e) => Some((FunctorView::Text("#"), vec![e.target(), e.expr()])),
        Term::Write(w) => Some((FunctorView::Text("write"), w.terms().iter().collect())),
    }
}

/// The functor/arity signature of a structure-like term.
pub(crate) fn term_signature(term: &Term) -> Option<(FunctorView<'_>, usize)> {
    structural_parts(term).map(|(functor, children)| (functor, children.len()))
}

// ============================================================================
// Unification
// ============================================================================

/// Unifies two terms, returning the trail of newly bound variables, or
/// `None` on failure. On failure every binding made by this call has
/// already been undone.
pub fn unify(left: &Term, right: &Term) -> Option<Unification> {
    match (left, right) {
        (Term::Anonymous, _) | (_, Term::Anonymous) => Some(Unification::empty()),
        (Term::Variable(v), other) => unify_variable(v, other),
        (other, Term::Variable(v)) => unify_variable(v, other),
        _ => unify_structural(left, right),
    }
}

fn unify_variable(variable: &Variable, other: &Term) -> Option<Unification> {
    if let Some(bound) = variable.binding() {
        return unify(&bound, other);
    }
    match other {
        Term::Variable(w) => {
            if variable.shares_cell(w) {
                return Some(Unification::empty());
            }
            if let Some(bound) = w.binding() {
                return unify_variable(variable, &bound);
            }
            variable.bind(Term::Variable(w.clone()));
            Some(Unification::with(variable.clone()))
        }
        Term::Anonymous => Some(Unification::empty()),
        _ => {
            variable.bind(other.clone());
            Some(Unification::with(variable.clone()))
        }
    }
}

fn unify_structural(left: &Term, right: &Term) -> Option<Unification> {
    let (left_functor, left_children) = structural_parts(left)?;
    let (right_functor, right_children) = structural_parts(right)?;
    if left_functor != right_functor || left_children.len() != right_children.len() {
        return None;
    }
    let mut unification = Unification::empty();
    for (a, b) in left_children.iter().zip(right_children.iter()) {
        match unify(a, b) {
            Some(sub) => unification.append(sub),
            None => {
                // A failed child undoes everything this call bound.
                unification.unbind();
                return None;
            }
        }
    }
    Some(unification)
}
