//! The term model.
//!
//! Every value the engine manipulates is a [`Term`]: a variable with a
//! shared binding cell, a structure (functor plus child terms), the empty
//! list, or one of the operator nodes (negation, arithmetic, comparison,
//! evaluation, write). The parser produces static terms owned by a
//! program; entering a clause copies them with fresh variables via
//! [`Term::copy_for_proof`].
//!
//! A list is ordinary structure: a cons cell is a structure with functor
//! `.` and two children, the second of which is itself a list (another
//! cons, the empty list, or a variable). [`Term::EmptyList`] is the unique
//! terminator, rendered `[]`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::scope::Scope;

// ============================================================================
// Functors
// ============================================================================

/// The label at a structure's root: a text symbol or a number.
///
/// Together with the arity it identifies a predicate during clause
/// selection.
#[derive(Clone, Debug, PartialEq)]
pub enum Functor {
    Text(String),
    Number(f64),
}

impl Functor {
    pub fn text(s: impl Into<String>) -> Self {
        Functor::Text(s.into())
    }

    pub fn number(n: f64) -> Self {
        Functor::Number(n)
    }
}

impl fmt::Display for Functor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Functor::Text(s) => write!(f, "{}", s),
            Functor::Number(n) => write!(f, "{}", n),
        }
    }
}

// ============================================================================
// Variables
// ============================================================================

/// A named term with a mutable binding cell.
///
/// Cloning a variable shares the cell, so every copy of a term sees the
/// same binding. Within one rule invocation, same-named occurrences share
/// one cell (arranged by [`Scope`]); different invocations get disjoint
/// cells.
///
/// A variable is in one of two states: unbound, or bound to another term.
/// A bound variable is never re-bound without first being unbound through
/// the unification trail.
#[derive(Clone, Debug)]
pub struct Variable {
    name: Rc<str>,
    binding: Rc<RefCell<Option<Term>>>,
}

impl Variable {
    /// Creates a fresh unbound variable.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Rc::from(name.as_ref()),
            binding: Rc::new(RefCell::new(None)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_key(&self) -> Rc<str> {
        Rc::clone(&self.name)
    }

    /// The bound term, if any.
    pub fn binding(&self) -> Option<Term> {
        self.binding.borrow().clone()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.borrow().is_some()
    }

    pub(crate) fn bind(&self, term: Term) {
        *self.binding.borrow_mut() = Some(term);
    }

    /// Marks this variable as no longer having a bound value.
    pub fn unbind(&self) {
        *self.binding.borrow_mut() = None;
    }

    /// True when both handles point at the same binding cell.
    pub fn shares_cell(&self, other: &Variable) -> bool {
        Rc::ptr_eq(&self.binding, &other.binding)
    }

    /// `name = value` when bound, bare `name` otherwise.
    pub fn definition_string(&self) -> String {
        match self.binding() {
            Some(term) => format!("{} = {}", self.name, term),
            None => self.name.to_string(),
        }
    }
}

/// Variables compare by name and by the equality of their bound values.
/// Use [`Variable::shares_cell`] for identity.
impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && *self.binding.borrow() == *other.binding.borrow()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.binding.borrow() {
            Some(term) => write!(f, "{}", term),
            None => write!(f, "{}", self.name),
        }
    }
}

// ============================================================================
// Structures
// ============================================================================

/// A functor with an ordered sequence of child terms.
#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
    functor: Functor,
    terms: Vec<Term>,
}

impl Structure {
    pub fn new(functor: Functor, terms: Vec<Term>) -> Self {
        Self { functor, terms }
    }

    /// A structure with no terms.
    pub fn atom(functor: Functor) -> Self {
        Self { functor, terms: Vec::new() }
    }

    pub fn functor(&self) -> &Functor {
        &self.functor
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    /// Builds a proper list: cons cells ending in the empty list.
    ///
    /// An empty `terms` gives [`Term::EmptyList`] directly.
    pub fn list(terms: Vec<Term>) -> Term {
        Self::list_with_tail(terms, Term::EmptyList)
    }

    /// Builds a list of the given terms ending in `tail` (usually a
    /// variable or another list).
    pub fn list_with_tail(terms: Vec<Term>, tail: Term) -> Term {
        let mut list = tail;
        for term in terms.into_iter().rev() {
            list = Term::Structure(Structure::new(Functor::text("."), vec![term, list]));
        }
        list
    }

    /// A cons cell whose spine ends in the empty list, a cons, or a
    /// variable.
    pub fn is_list(&self) -> bool {
        self.terms.len() == 2 && self.functor == Functor::text(".") && self.terms[1].is_list()
    }

    /// True when no variable occurs anywhere below this structure.
    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(Term::is_ground)
    }

    fn fmt_list_terms(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.terms[0])?;
        if self.terms.len() > 1 {
            self.terms[1].fmt_list_tail(f)?;
        }
        Ok(())
    }
}

/// Copies a structure for use in a proof, copying each child term
/// through `scope` (see [`Term::copy_for_proof`]).
fn copy_structure(s: &Structure, scope: &mut Scope) -> Structure {
    Structure::new(
        s.functor().clone(),
        s.terms().iter().map(|t| t.copy_for_proof(scope)).collect(),
    )
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_list() {
            write!(f, "[")?;
            self.fmt_list_terms(f)?;
            return write!(f, "]");
        }
        if self.terms.is_empty() {
            // Atoms with embedded spaces round-trip through quotes.
            if let Functor::Text(text) = &self.functor {
                if text.contains(' ') {
                    return write!(f, "\"{}\"", text);
                }
            }
            return write!(f, "{}", self.functor);
        }
        write!(f, "{}(", self.functor)?;
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", term)?;
        }
        write!(f, ")")
    }
}

// ============================================================================
// Operator nodes
// ============================================================================

/// A binary arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    /// `%` evaluates as floor division, the behavior this engine inherits;
    /// it is not a remainder.
    Rem,
}

impl ArithOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Rem => "%",
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An arithmetic operation that performs itself during evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct ArithmeticOperator {
    op: ArithOp,
    left: Box<Term>,
    right: Box<Term>,
}

impl ArithmeticOperator {
    pub fn new(op: ArithOp, left: Term, right: Term) -> Self {
        Self { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn op(&self) -> ArithOp {
        self.op
    }

    pub fn left(&self) -> &Term {
        &self.left
    }

    pub fn right(&self) -> &Term {
        &self.right
    }
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Parenthesized infix keeps printed axioms parseable.
        write!(f, "({} {} {})", self.left, self.op, self.right)
    }
}

/// A comparison operator spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Eq,
    Le,
    Ge,
    Ne,
}

impl CompareOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(CompareOp::Lt),
            ">" => Some(CompareOp::Gt),
            "=" => Some(CompareOp::Eq),
            "<=" => Some(CompareOp::Le),
            ">=" => Some(CompareOp::Ge),
            "!=" => Some(CompareOp::Ne),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Eq => "=",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
            CompareOp::Ne => "!=",
        }
    }

    /// Applies the operator to any partially ordered pair.
    pub fn holds<T: PartialOrd>(self, left: T, right: T) -> bool {
        match self {
            CompareOp::Lt => left < right,
            CompareOp::Gt => left > right,
            CompareOp::Eq => left == right,
            CompareOp::Le => left <= right,
            CompareOp::Ge => left >= right,
            CompareOp::Ne => left != right,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A comparison gateway term: proves itself by evaluating and comparing
/// its two children.
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    op: CompareOp,
    left: Box<Term>,
    right: Box<Term>,
}

impl Comparison {
    pub fn new(op: CompareOp, left: Term, right: Term) -> Self {
        Self { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    pub fn left(&self) -> &Term {
        &self.left
    }

    pub fn right(&self) -> &Term {
        &self.right
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.op, self.left, self.right)
    }
}

/// The `#` gateway: unifies its target with the evaluated expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    target: Box<Term>,
    expr: Box<Term>,
}

impl Evaluation {
    pub fn new(target: Term, expr: Term) -> Self {
        Self { target: Box::new(target), expr: Box::new(expr) }
    }

    pub fn target(&self) -> &Term {
        &self.target
    }

    pub fn expr(&self) -> &Term {
        &self.expr
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#({}, {})", self.target, self.expr)
    }
}

/// The variadic write side-effect term.
#[derive(Clone, Debug, PartialEq)]
pub struct Write {
    terms: Vec<Term>,
}

impl Write {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }
}

impl fmt::Display for Write {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "write(")?;
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", term)?;
        }
        write!(f, ")")
    }
}

// ============================================================================
// Terms
// ============================================================================

/// The closed sum of every term kind the engine manipulates.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// A named variable with a shared binding cell.
    Variable(Variable),
    /// `_`: unifies with anything, never binds.
    Anonymous,
    /// A functor with child terms; arity 0 is an atom.
    Structure(Structure),
    /// `[]`, the unique list terminator.
    EmptyList,
    /// Negation-as-failure around a structure.
    Not(Structure),
    /// A binary arithmetic node.
    Arithmetic(ArithmeticOperator),
    /// A comparison gateway.
    Comparison(Comparison),
    /// The `#` evaluation gateway.
    Evaluation(Evaluation),
    /// The write side-effect gateway.
    Write(Write),
}

impl Term {
    /// An atom with a text functor.
    pub fn atom(text: impl Into<String>) -> Term {
        Term::Structure(Structure::atom(Functor::text(text)))
    }

    /// An atom with a numeric functor.
    pub fn number(value: f64) -> Term {
        Term::Structure(Structure::atom(Functor::number(value)))
    }

    /// True for a term whose spine can still grow into a list: a cons
    /// with a list tail, the empty list, or an unbound variable.
    pub fn is_list(&self) -> bool {
        match self {
            Term::Structure(s) => s.is_list(),
            Term::EmptyList => true,
            Term::Variable(v) => match v.binding() {
                Some(bound) => bound.is_list(),
                None => true,
            },
            Term::Anonymous => true,
            _ => false,
        }
    }

    /// True when no variable occurs anywhere in the term.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Variable(_) | Term::Anonymous => false,
            Term::Structure(s) => s.is_ground(),
            Term::EmptyList => true,
            Term::Not(s) => s.is_ground(),
            Term::Arithmetic(a) => a.left().is_ground() && a.right().is_ground(),
            Term::Comparison(c) => c.left().is_ground() && c.right().is_ground(),
            Term::Evaluation(e) => e.target().is_ground() && e.expr().is_ground(),
            Term::Write(w) => w.terms().iter().all(Term::is_ground),
        }
    }

    /// Returns a copy for use in a proof: variables are resolved through
    /// `scope`, so same-named occurrences share one fresh cell and the
    /// copy shares no cell with the original outside the scope's mapping.
    pub fn copy_for_proof(&self, scope: &mut Scope) -> Term {
        match self {
            Term::Variable(v) => Term::Variable(scope.lookup(v.name())),
            Term::Anonymous => Term::Anonymous,
            Term::Structure(s) => Term::Structure(copy_structure(s, scope)),
            Term::EmptyList => Term::EmptyList,
            Term::Not(s) => Term::Not(copy_structure(s, scope)),
            Term::Arithmetic(a) => Term::Arithmetic(ArithmeticOperator::new(
                a.op(),
                a.left().copy_for_proof(scope),
                a.right().copy_for_proof(scope),
            )),
            Term::Comparison(c) => Term::Comparison(Comparison::new(
                c.op(),
                c.left().copy_for_proof(scope),
                c.right().copy_for_proof(scope),
            )),
            Term::Evaluation(e) => Term::Evaluation(Evaluation::new(
                e.target().copy_for_proof(scope),
                e.expr().copy_for_proof(scope),
            )),
            Term::Write(w) => Term::Write(Write::new(
                w.terms().iter().map(|t| t.copy_for_proof(scope)).collect(),
            )),
        }
    }

    /// Collects the variables of this term, in order of first appearance,
    /// into `out`.
    pub fn collect_variables(&self, out: &mut crate::unify::Unification) {
        match self {
            Term::Variable(v) => out.add(v.clone()),
            Term::Anonymous | Term::EmptyList => {}
            Term::Structure(s) | Term::Not(s) => {
                for term in s.terms() {
                    term.collect_variables(out);
                }
            }
            Term::Arithmetic(a) => {
                a.left().collect_variables(out);
                a.right().collect_variables(out);
            }
            Term::Comparison(c) => {
                c.left().collect_variables(out);
                c.right().collect_variables(out);
            }
            Term::Evaluation(e) => {
                e.target().collect_variables(out);
                e.expr().collect_variables(out);
            }
            Term::Write(w) => {
                for term in w.terms() {
                    term.collect_variables(out);
                }
            }
        }
    }

    /// Writes this term as the tail of a list under construction.
    fn fmt_list_tail(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::EmptyList => Ok(()),
            Term::Structure(s) if s.is_list() => {
                write!(f, ", ")?;
                s.fmt_list_terms(f)
            }
            Term::Variable(v) => match v.binding() {
                Some(bound) => bound.fmt_list_tail(f),
                None => write!(f, "|{}", v.name()),
            },
            Term::Anonymous => write!(f, "|_"),
            other => write!(f, "|{}", other),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(v) => write!(f, "{}", v),
            Term::Anonymous => write!(f, "_"),
            Term::Structure(s) => write!(f, "{}", s),
            Term::EmptyList => write!(f, "[]"),
            Term::Not(s) => write!(f, "not {}", s),
            Term::Arithmetic(a) => write!(f, "{}", a),
            Term::Comparison(c) => write!(f, "{}", c),
            Term::Evaluation(e) => write!(f, "{}", e),
            Term::Write(w) => write!(f, "{}", w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atoms_display_bare_or_quoted() {
        assert_eq!(Term::atom("isaac").to_string(), "isaac");
        assert_eq!(Term::atom("old testament").to_string(), "\"old testament\"");
        assert_eq!(Term::number(3.0).to_string(), "3");
        assert_eq!(Term::number(-0.5).to_string(), "-0.5");
    }

    #[test]
    fn structures_display_functor_form() {
        let s = Structure::new(
            Functor::text("father"),
            vec![Term::atom("abraham"), Term::atom("isaac")],
        );
        assert_eq!(s.to_string(), "father(abraham, isaac)");
    }

    #[test]
    fn lists_display_bracketed() {
        let list = Structure::list(vec![Term::atom("a"), Term::atom("b"), Term::atom("c")]);
        assert_eq!(list.to_string(), "[a, b, c]");
        assert_eq!(Term::EmptyList.to_string(), "[]");
    }

    #[test]
    fn list_with_variable_tail_displays_bar() {
        let tail = Term::Variable(Variable::new("T"));
        let list = Structure::list_with_tail(vec![Term::atom("a"), Term::atom("b")], tail);
        assert_eq!(list.to_string(), "[a, b|T]");
    }

    #[test]
    fn cons_with_non_list_tail_displays_functor_form() {
        let cons = Structure::new(Functor::text("."), vec![Term::atom("a"), Term::atom("b")]);
        assert!(!cons.is_list());
        assert_eq!(cons.to_string(), ".(a, b)");
    }

    #[test]
    fn parser_built_list_has_n_cons_cells() {
        let list = Structure::list(vec![Term::atom("a"), Term::atom("b"), Term::atom("c")]);
        let mut cells = 0;
        let mut spine = list;
        while let Term::Structure(s) = spine {
            assert_eq!(s.functor(), &Functor::text("."));
            assert_eq!(s.arity(), 2);
            cells += 1;
            spine = s.terms()[1].clone();
        }
        assert_eq!(cells, 3);
        assert_eq!(spine, Term::EmptyList);
    }

    #[test]
    fn bound_variable_displays_its_value() {
        let v = Variable::new("X");
        assert_eq!(v.to_string(), "X");
        assert_eq!(v.definition_string(), "X");
        v.bind(Term::atom("isaac"));
        assert_eq!(v.to_string(), "isaac");
        assert_eq!(v.definition_string(), "X = isaac");
    }

    #[test]
    fn cloned_variables_share_their_cell() {
        let v = Variable::new("X");
        let w = v.clone();
        v.bind(Term::atom("a"));
        assert_eq!(w.to_string(), "a");
        assert!(v.shares_cell(&w));
        assert!(!v.shares_cell(&Variable::new("X")));
    }

    #[test]
    fn copy_for_proof_shares_no_cell_outside_the_scope() {
        let x = Variable::new("X");
        let original = Term::Structure(Structure::new(
            Functor::text("p"),
            vec![Term::Variable(x.clone()), Term::Variable(x.clone())],
        ));
        let mut scope = Scope::new();
        let copy = original.copy_for_proof(&mut scope);
        let Term::Structure(s) = copy else { panic!("expected structure") };
        let (Term::Variable(a), Term::Variable(b)) = (&s.terms()[0], &s.terms()[1]) else {
            panic!("expected variables")
        };
        // Same-named occurrences share one fresh cell,
        assert!(a.shares_cell(b));
        // which is not the original's cell.
        assert!(!a.shares_cell(&x));
    }

    #[test]
    fn arithmetic_displays_parenthesized_infix() {
        let expr = ArithmeticOperator::new(
            ArithOp::Add,
            Term::Variable(Variable::new("M")),
            Term::number(1.0),
        );
        assert_eq!(expr.to_string(), "(M + 1)");
    }

    #[test]
    fn comparison_and_evaluation_display_call_form() {
        let cmp = Comparison::new(CompareOp::Ne, Term::atom("a"), Term::atom("b"));
        assert_eq!(cmp.to_string(), "!=(a, b)");
        let eval = Evaluation::new(
            Term::Variable(Variable::new("N")),
            Term::Arithmetic(ArithmeticOperator::new(
                ArithOp::Add,
                Term::Variable(Variable::new("M")),
                Term::number(1.0),
            )),
        );
        assert_eq!(eval.to_string(), "#(N, (M + 1))");
    }

    #[test]
    fn not_displays_prefix() {
        let s = Structure::new(Functor::text("p"), vec![Term::atom("a")]);
        assert_eq!(Term::Not(s).to_string(), "not p(a)");
    }

    #[test]
    fn groundness() {
        assert!(Term::atom("a").is_ground());
        assert!(Term::EmptyList.is_ground());
        assert!(!Term::Variable(Variable::new("X")).is_ground());
        assert!(!Term::Anonymous.is_ground());
        let s = Structure::new(
            Functor::text("p"),
            vec![Term::atom("a"), Term::Variable(Variable::new("X"))],
        );
        assert!(!Term::Structure(s).is_ground());
    }
}
