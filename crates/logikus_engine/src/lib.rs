//! The Logikus inference engine.
//!
//! This crate is the logical core: the term model, unification, and the
//! backtracking proof procedure. It knows nothing about surface syntax;
//! `logikus-parse` lowers text into the types defined here.
//!
//! # Architecture
//!
//! ```text
//! Term model (term)            what programs are made of
//!     │
//!     ▼
//! Unification (unify)          variable bindings + the trail to undo them
//!     │
//!     ▼
//! Proof iterators (prove)      ConsultingStructure / DynamicRule / Query
//! ```
//!
//! A [`Program`] is an ordered list of [`Axiom`]s. A [`Query`] walks the
//! program depth-first, left to right, in clause order; each call to
//! [`Query::advance`] either binds the query's variables to the next
//! solution or reports exhaustion. All proof state lives inside the query,
//! so a program is immutable while queried and re-queryable afterwards,
//! and dropping a query mid-enumeration cannot corrupt it.
//!
//! # Example
//!
//! ```
//! use logikus_engine::{Program, Axiom, Rule, Query, Structure, Functor, Term, Variable};
//!
//! // father(abraham, isaac).
//! let fact = Structure::new(
//!     Functor::text("father"),
//!     vec![Term::atom("abraham"), Term::atom("isaac")],
//! );
//! let mut program = Program::new();
//! program.add_axiom(Axiom::Fact(fact));
//!
//! // father(abraham, X)?
//! let goal = Structure::new(
//!     Functor::text("father"),
//!     vec![Term::atom("abraham"), Term::Variable(Variable::new("X"))],
//! );
//! let mut query = Query::new(&program, &Rule::new(vec![Term::Structure(goal)]));
//! assert!(query.advance());
//! assert_eq!(query.bindings().to_string(), "X = isaac");
//! assert!(!query.advance());
//! ```

pub mod eval;
pub mod program;
pub mod prove;
pub mod scope;
pub mod term;
pub mod trace;
pub mod unify;

pub use eval::{EvalError, Evaluated};
pub use program::{Axiom, Program, Rule};
pub use prove::{Binding, Bindings, Query};
pub use scope::Scope;
pub use term::{
    ArithOp, ArithmeticOperator, CompareOp, Comparison, Evaluation, Functor, Structure, Term,
    Variable, Write,
};
pub use trace::{ProofTracer, WriteTracer};
pub use unify::{unify, Unification};
