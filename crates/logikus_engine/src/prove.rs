//! The backtracking proof procedure.
//!
//! Proofs are driven by a pair of mutually recursive resumable iterators:
//!
//! - a [`ConsultingStructure`] proves one goal by walking the program's
//!   axioms in order, unifying its goal against each candidate head and
//!   asking the selected clause's remaining body — its *resolvent* — to
//!   establish itself;
//! - a [`DynamicRule`] is a body under proof: its first goal plus the
//!   rest, with a flag remembering whether the first goal has already been
//!   involved in a proof, so the next request resumes the tail before
//!   re-proving the head.
//!
//! `can_find_next_proof` returns on each solution with the variables bound
//! to the values that make the proof true; calling it again steps the
//! search to the next solution. Stepping back unbinds through the
//! unification trail. The result is chronological backtracking: solutions
//! arrive in strict depth-first, left-to-right, clause order.
//!
//! All of this state lives inside the [`Query`] that owns the proof copies
//! of the goal terms, so the consulted [`Program`] stays immutable and a
//! dropped query cannot leave bindings behind in it.

use std::fmt;
use std::io;

use crate::eval::EvalError;
use crate::program::Program;
use crate::scope::Scope;
use crate::term::{Comparison, Evaluation, Term, Variable, Write};
use crate::trace::ProofTracer;
use crate::unify::{unify, Unification};

// ============================================================================
// Proof context
// ============================================================================

/// What a running proof needs at hand: the program it consults, an
/// optional attempt listener, and the sink for write goals.
pub struct ProofContext<'a, 'b> {
    program: &'a Program,
    tracer: Option<&'a mut (dyn ProofTracer + 'b)>,
    out: &'a mut (dyn io::Write + 'b),
}

impl ProofContext<'_, '_> {
    fn trace_attempt(&mut self, head: &dyn fmt::Display, unification: Option<&Unification>) {
        if let Some(tracer) = self.tracer.as_deref_mut() {
            tracer.clause_attempt(head, unification);
        }
    }
}

// ============================================================================
// Consulting structures
// ============================================================================

/// A goal consulting an axiom source, with its proof state: a cursor into
/// the axioms, the head unification of the currently selected clause, and
/// that clause's remaining body.
pub struct ConsultingStructure {
    goal: Term,
    cursor: usize,
    unification: Option<Unification>,
    resolvent: Option<Box<DynamicRule>>,
}

impl ConsultingStructure {
    /// Wraps a proof-side goal term (a structure or the empty list).
    pub fn new(goal: Term) -> Self {
        Self { goal, cursor: 0, unification: None, resolvent: None }
    }

    pub fn goal(&self) -> &Term {
        &self.goal
    }

    /// Finds another proof of this goal, leaving the variables bound to
    /// the values that make it true.
    ///
    /// The resolvent may have several proofs, and each counts as a new
    /// proof of this goal; only when it is exhausted does the search step
    /// back, unbind, and move on to the next matching clause. When the
    /// axioms run out the cursor is reset, so the next request starts
    /// over from the beginning of the program.
    pub fn can_find_next_proof(&mut self, ctx: &mut ProofContext<'_, '_>) -> bool {
        if let Some(resolvent) = self.resolvent.as_deref_mut() {
            if resolvent.can_find_next_proof(ctx) {
                return true;
            }
        }
        loop {
            self.unbind();
            if !self.can_unify(ctx) {
                self.cursor = 0;
                return false;
            }
            let established = match self.resolvent.as_deref_mut() {
                Some(resolvent) => resolvent.can_establish(ctx),
                None => true,
            };
            if established {
                return true;
            }
        }
    }

    /// Advances to the next axiom whose head unifies with the goal,
    /// recording the unification and taking the clause's body as the new
    /// resolvent.
    pub fn can_unify(&mut self, ctx: &mut ProofContext<'_, '_>) -> bool {
        let program = ctx.program;
        while self.cursor < program.axioms().len() {
            let axiom = &program.axioms()[self.cursor];
            self.cursor += 1;
            if !axiom.head_matches(&self.goal) {
                continue;
            }
            let Some((head, body)) = axiom.dynamic_copy() else { continue };
            match unify(&head, &self.goal) {
                Some(unification) => {
                    ctx.trace_attempt(&axiom.head_display(), Some(&unification));
                    self.unification = Some(unification);
                    self.resolvent = Some(Box::new(DynamicRule::from_terms(body)));
                    return true;
                }
                None => ctx.trace_attempt(&axiom.head_display(), None),
            }
        }
        false
    }

    /// Releases the bindings the last head unification produced.
    fn unbind(&mut self) {
        if let Some(unification) = self.unification.take() {
            unification.unbind();
        }
        self.resolvent = None;
    }

    /// Unwinds every binding this goal's search made, at any depth, and
    /// rewinds clause selection to the start of the program.
    pub fn reset(&mut self) {
        if let Some(resolvent) = self.resolvent.as_deref_mut() {
            resolvent.reset();
        }
        self.unbind();
        self.cursor = 0;
    }

    fn collect_variables(&self, out: &mut Unification) {
        self.goal.collect_variables(out);
    }
}

impl fmt::Display for ConsultingStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.goal)
    }
}

// ============================================================================
// Gateways
// ============================================================================

/// Swings the one-proof-per-entry gate shared by all gateways.
///
/// A closed gate tries to prove once and opens on success. An open gate
/// means the last request succeeded; the rule has now failed back to this
/// point, so the gate shuts and the goal fails, sending the search
/// further back.
fn swing_gate(open: &mut bool, prove_once: impl FnOnce() -> bool) -> bool {
    if *open {
        *open = false;
    } else {
        *open = prove_once();
    }
    *open
}

/// A comparison goal: at most one proof, no bindings to clean up.
pub struct ComparisonGateway {
    comparison: Comparison,
    open: bool,
}

impl ComparisonGateway {
    fn new(comparison: Comparison) -> Self {
        Self { comparison, open: false }
    }

    fn can_find_next_proof(&mut self) -> bool {
        let comparison = &self.comparison;
        swing_gate(&mut self.open, || comparison.holds())
    }

    fn reset(&mut self) {
        self.open = false;
    }
}

/// The `#` goal: unifies its target with the evaluated expression, and
/// undoes that binding when the rule fails back through it.
pub struct EvaluationGateway {
    evaluation: Evaluation,
    open: bool,
    unification: Option<Unification>,
}

impl EvaluationGateway {
    fn new(evaluation: Evaluation) -> Self {
        Self { evaluation, open: false, unification: None }
    }

    fn can_find_next_proof(&mut self) -> bool {
        let evaluation = &self.evaluation;
        let unification = &mut self.unification;
        let opened = swing_gate(&mut self.open, || match evaluation.attempt() {
            Ok(Some(bindings)) => {
                *unification = Some(bindings);
                true
            }
            Ok(None) | Err(_) => false,
        });
        if !opened {
            if let Some(bindings) = self.unification.take() {
                bindings.unbind();
            }
        }
        opened
    }

    fn reset(&mut self) {
        if let Some(bindings) = self.unification.take() {
            bindings.unbind();
        }
        self.open = false;
    }
}

/// The write goal: evaluates its terms, emits their concatenated string
/// forms and a newline, and succeeds unless any term is undefined.
pub struct WriteGateway {
    write: Write,
    open: bool,
}

impl WriteGateway {
    fn new(write: Write) -> Self {
        Self { write, open: false }
    }

    fn can_find_next_proof(&mut self, ctx: &mut ProofContext<'_, '_>) -> bool {
        let write = &self.write;
        let out = &mut ctx.out;
        swing_gate(&mut self.open, || {
            let values: Result<Vec<_>, EvalError> =
                write.terms().iter().map(Term::eval).collect();
            match values {
                Ok(values) => {
                    let mut emit = || -> io::Result<()> {
                        for value in &values {
                            write!(out, "{}", value)?;
                        }
                        writeln!(out)
                    };
                    emit().is_ok()
                }
                Err(_) => {
                    let _ = writeln!(out, "undefined");
                    false
                }
            }
        })
    }

    fn reset(&mut self) {
        self.open = false;
    }
}

/// Negation-as-failure: succeeds exactly when the wrapped goal cannot
/// unify with any clause whose body can be established. Bindings made
/// while finding out are unwound either way, so a successful `not` never
/// leaks bindings into its caller.
pub struct ConsultingNot {
    structure: ConsultingStructure,
    open: bool,
}

impl ConsultingNot {
    fn new(structure: ConsultingStructure) -> Self {
        Self { structure, open: false }
    }

    fn can_find_next_proof(&mut self, ctx: &mut ProofContext<'_, '_>) -> bool {
        let structure = &mut self.structure;
        let opened = swing_gate(&mut self.open, || {
            let provable = structure.can_find_next_proof(ctx);
            structure.reset();
            !provable
        });
        if !opened {
            self.structure.reset();
        }
        opened
    }

    fn reset(&mut self) {
        self.structure.reset();
        self.open = false;
    }
}

impl fmt::Display for ConsultingNot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not {}", self.structure)
    }
}

// ============================================================================
// Goals
// ============================================================================

/// One provable element of a rule body, with its proof state.
pub enum Goal {
    Structure(ConsultingStructure),
    Not(ConsultingNot),
    Comparison(ComparisonGateway),
    Evaluation(EvaluationGateway),
    Write(WriteGateway),
    /// A term that cannot stand as a goal (a bare variable or arithmetic
    /// node); it never proves.
    Never(Term),
}

impl Goal {
    /// Wraps a proof-side term copy into its provable counterpart.
    pub fn from_term(term: Term) -> Goal {
        match term {
            Term::Structure(_) | Term::EmptyList => {
                Goal::Structure(ConsultingStructure::new(term))
            }
            Term::Not(s) => {
                Goal::Not(ConsultingNot::new(ConsultingStructure::new(Term::Structure(s))))
            }
            Term::Comparison(c) => Goal::Comparison(ComparisonGateway::new(c)),
            Term::Evaluation(e) => Goal::Evaluation(EvaluationGateway::new(e)),
            Term::Write(w) => Goal::Write(WriteGateway::new(w)),
            other => Goal::Never(other),
        }
    }

    fn can_find_next_proof(&mut self, ctx: &mut ProofContext<'_, '_>) -> bool {
        match self {
            Goal::Structure(g) => g.can_find_next_proof(ctx),
            Goal::Not(g) => g.can_find_next_proof(ctx),
            Goal::Comparison(g) => g.can_find_next_proof(),
            Goal::Evaluation(g) => g.can_find_next_proof(),
            Goal::Write(g) => g.can_find_next_proof(ctx),
            Goal::Never(_) => false,
        }
    }

    fn reset(&mut self) {
        match self {
            Goal::Structure(g) => g.reset(),
            Goal::Not(g) => g.reset(),
            Goal::Comparison(g) => g.reset(),
            Goal::Evaluation(g) => g.reset(),
            Goal::Write(g) => g.reset(),
            Goal::Never(_) => {}
        }
    }

    fn collect_variables(&self, out: &mut Unification) {
        match self {
            Goal::Structure(g) => g.collect_variables(out),
            Goal::Not(g) => g.structure.collect_variables(out),
            Goal::Comparison(g) => {
                g.comparison.left().collect_variables(out);
                g.comparison.right().collect_variables(out);
            }
            Goal::Evaluation(g) => {
                g.evaluation.target().collect_variables(out);
                g.evaluation.expr().collect_variables(out);
            }
            Goal::Write(g) => {
                for term in g.write.terms() {
                    term.collect_variables(out);
                }
            }
            Goal::Never(term) => term.collect_variables(out),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Structure(g) => write!(f, "{}", g),
            Goal::Not(g) => write!(f, "{}", g),
            Goal::Comparison(g) => write!(f, "{}", g.comparison),
            Goal::Evaluation(g) => write!(f, "{}", g.evaluation),
            Goal::Write(g) => write!(f, "{}", g.write),
            Goal::Never(term) => write!(f, "{}", term),
        }
    }
}

// ============================================================================
// Dynamic rules
// ============================================================================

/// A rule body being proved: its first goal, the rest, and whether the
/// first goal is already involved in a proof.
pub struct DynamicRule {
    chain: Option<Box<Link>>,
}

struct Link {
    head: Goal,
    tail: DynamicRule,
    head_involved: bool,
}

impl DynamicRule {
    /// The empty body.
    pub fn empty() -> Self {
        Self { chain: None }
    }

    /// Builds a body from proof-side term copies.
    pub fn from_terms(terms: Vec<Term>) -> Self {
        let mut rule = DynamicRule::empty();
        for term in terms.into_iter().rev() {
            rule = DynamicRule {
                chain: Some(Box::new(Link {
                    head: Goal::from_term(term),
                    tail: rule,
                    head_involved: false,
                })),
            };
        }
        rule
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_none()
    }

    /// An empty body establishes itself trivially; a non-empty one must
    /// find a proof. (An empty body cannot find a *next* proof: asking
    /// again returns false.)
    pub fn can_establish(&mut self, ctx: &mut ProofContext<'_, '_>) -> bool {
        if self.chain.is_none() {
            return true;
        }
        self.can_find_next_proof(ctx)
    }

    /// Finds another joint proof of the goals in this body.
    ///
    /// If the head was already involved in a proof, the next proof may
    /// come from re-proving just the tail; only when the tail is
    /// exhausted does the head step to its own next proof.
    pub fn can_find_next_proof(&mut self, ctx: &mut ProofContext<'_, '_>) -> bool {
        let Some(link) = self.chain.as_deref_mut() else { return false };
        if link.head_involved && link.tail.can_find_next_proof(ctx) {
            return true;
        }
        loop {
            link.head_involved = link.head.can_find_next_proof(ctx);
            if !link.head_involved {
                return false;
            }
            if link.tail.can_establish(ctx) {
                return true;
            }
        }
    }

    /// Unwinds all proof state below this body.
    pub fn reset(&mut self) {
        if let Some(link) = self.chain.as_deref_mut() {
            link.head.reset();
            link.tail.reset();
            link.head_involved = false;
        }
    }

    fn collect_variables(&self, out: &mut Unification) {
        if let Some(link) = self.chain.as_deref() {
            link.head.collect_variables(out);
            link.tail.collect_variables(out);
        }
    }
}

impl fmt::Display for DynamicRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rule = self;
        let mut first = true;
        while let Some(link) = rule.chain.as_deref() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", link.head)?;
            first = false;
            rule = &link.tail;
        }
        Ok(())
    }
}

// ============================================================================
// Queries
// ============================================================================

/// One binding of a query variable in a solution snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    name: String,
    value: Option<String>,
}

impl Binding {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bound value's printed form, or `None` when unbound.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} = {}", self.name, value),
            None => write!(f, "{}", self.name),
        }
    }
}

/// An owned snapshot of the query variables at one solution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    entries: Vec<Binding>,
}

impl Bindings {
    pub fn entries(&self) -> &[Binding] {
        &self.entries
    }

    /// The printed value bound to `name`, if any.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|b| b.name == name).and_then(|b| b.value())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, binding) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", binding)?;
        }
        Ok(())
    }
}

/// A rule standing outside a program, proving itself against it.
///
/// The query owns proof copies of its goals; its variables are fresh and
/// disjoint from the parsed rule's. [`advance`](Self::advance) steps to
/// the next solution, leaving the variables bound; once it returns false
/// the search is exhausted and a further call starts over from the
/// beginning.
pub struct Query<'p> {
    program: &'p Program,
    rule: DynamicRule,
    variables: Vec<Variable>,
    tracer: Option<Box<dyn ProofTracer + 'p>>,
    out: Option<Box<dyn io::Write + 'p>>,
}

impl<'p> Query<'p> {
    /// Creates a query proving `rule`'s terms, in order, against
    /// `program`.
    pub fn new(program: &'p Program, rule: &crate::program::Rule) -> Self {
        let mut scope = Scope::new();
        let copies: Vec<Term> =
            rule.terms().iter().map(|t| t.copy_for_proof(&mut scope)).collect();
        let rule = DynamicRule::from_terms(copies);
        let mut unification = Unification::empty();
        rule.collect_variables(&mut unification);
        Self {
            program,
            rule,
            variables: unification.into_variables(),
            tracer: None,
            out: None,
        }
    }

    /// Attaches a clause-attempt listener.
    pub fn with_tracer(mut self, tracer: Box<dyn ProofTracer + 'p>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Redirects write-goal output (stdout by default).
    pub fn with_output(mut self, out: Box<dyn io::Write + 'p>) -> Self {
        self.out = Some(out);
        self
    }

    /// Steps to the next solution. True leaves the query variables bound
    /// to the values that make the proof true; false means exhausted.
    pub fn advance(&mut self) -> bool {
        let program = self.program;
        let tracer = self.tracer.as_deref_mut();
        match self.out.as_deref_mut() {
            Some(sink) => {
                let mut ctx = ProofContext { program, tracer, out: sink };
                self.rule.can_find_next_proof(&mut ctx)
            }
            None => {
                let mut stdout = io::stdout();
                let mut ctx = ProofContext { program, tracer, out: &mut stdout };
                self.rule.can_find_next_proof(&mut ctx)
            }
        }
    }

    /// The query's variables, in order of first appearance.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// An owned snapshot of the current variable bindings.
    pub fn bindings(&self) -> Bindings {
        Bindings {
            entries: self
                .variables
                .iter()
                .map(|v| Binding {
                    name: v.name().to_string(),
                    value: v.binding().map(|t| t.to_string()),
                })
                .collect(),
        }
    }
}

impl fmt::Display for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rule)
    }
}

/// Each successful advance yields a bindings snapshot.
impl Iterator for Query<'_> {
    type Item = Bindings;

    fn next(&mut self) -> Option<Bindings> {
        if self.advance() {
            Some(self.bindings())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{Axiom, Rule};
    use crate::term::{Functor, Structure};

    fn fact(functor: &str, atoms: &[&str]) -> Axiom {
        Axiom::Fact(Structure::new(
            Functor::text(functor),
            atoms.iter().map(|a| Term::atom(*a)).collect(),
        ))
    }

    fn goal(functor: &str, terms: Vec<Term>) -> Term {
        Term::Structure(Structure::new(Functor::text(functor), terms))
    }

    fn var(name: &str) -> Term {
        Term::Variable(Variable::new(name))
    }

    #[test]
    fn facts_enumerate_in_source_order() {
        let mut program = Program::new();
        program.add_axiom(fact("f", &["a"]));
        program.add_axiom(fact("f", &["b"]));
        program.add_axiom(fact("g", &["c"]));
        let rule = Rule::new(vec![goal("f", vec![var("X")])]);
        let solutions: Vec<String> =
            Query::new(&program, &rule).map(|b| b.to_string()).collect();
        assert_eq!(solutions, ["X = a", "X = b"]);
    }

    #[test]
    fn exhausted_query_restarts_cleanly() {
        let mut program = Program::new();
        program.add_axiom(fact("f", &["a"]));
        let rule = Rule::new(vec![goal("f", vec![var("X")])]);
        let mut query = Query::new(&program, &rule);
        let first: Vec<String> = query.by_ref().map(|b| b.to_string()).collect();
        let second: Vec<String> = query.map(|b| b.to_string()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn conjunction_backtracks_across_goals() {
        let mut program = Program::new();
        program.add_axiom(fact("f", &["a"]));
        program.add_axiom(fact("f", &["b"]));
        program.add_axiom(fact("g", &["b"]));
        let rule = Rule::new(vec![goal("f", vec![var("X")]), goal("g", vec![var("X")])]);
        let solutions: Vec<String> =
            Query::new(&program, &rule).map(|b| b.to_string()).collect();
        assert_eq!(solutions, ["X = b"]);
    }

    #[test]
    fn empty_body_establishes_once() {
        let mut ctx_out = Vec::new();
        let program = Program::new();
        let mut ctx = ProofContext { program: &program, tracer: None, out: &mut ctx_out };
        let mut body = DynamicRule::empty();
        assert!(body.can_establish(&mut ctx));
        assert!(!body.can_find_next_proof(&mut ctx));
    }

    #[test]
    fn tracer_sees_clause_attempts() {
        let mut program = Program::new();
        program.add_axiom(fact("f", &["a"]));
        program.add_axiom(fact("f", &["b"]));
        let rule = Rule::new(vec![goal("f", vec![Term::atom("b")])]);
        let mut trace = Vec::new();
        {
            let tracer = crate::trace::WriteTracer::new(&mut trace);
            let mut query = Query::new(&program, &rule).with_tracer(Box::new(tracer));
            assert!(query.advance());
        }
        let trace = String::from_utf8(trace).expect("utf8");
        // f(a) fails against the goal, then f(b) matches with no bindings.
        assert_eq!(trace, "f(a)\tFalse\nf(b)\tTrue\t\n");
    }

    #[test]
    fn anonymous_goals_do_not_bind() {
        let mut program = Program::new();
        program.add_axiom(fact("f", &["a", "b"]));
        let rule = Rule::new(vec![goal("f", vec![Term::Anonymous, Term::Anonymous])]);
        let mut query = Query::new(&program, &rule);
        assert!(query.advance());
        assert!(query.bindings().is_empty());
        assert!(!query.advance());
    }
}
