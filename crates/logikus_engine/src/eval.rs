//! Term evaluation for arithmetic and comparison contexts.
//!
//! [`Term::eval`] produces a host-level [`Evaluated`] value. Errors are
//! ordinary `Result` errors, caught by the enclosing gateway: an undefined
//! variable (or a division by zero) fails the gateway and the outer proof
//! backtracks. Evaluation never panics.

use std::error::Error;
use std::fmt;

use crate::term::{ArithOp, CompareOp, Comparison, Evaluation, Functor, Structure, Term};
use crate::unify::unify;

/// The host value of an evaluated term.
#[derive(Clone, Debug, PartialEq)]
pub enum Evaluated {
    /// A numeric value.
    Number(f64),
    /// A text value (an atom's functor).
    Text(String),
    /// The outcome of evaluating a gateway in term position.
    Truth(bool),
    /// A non-atomic structure evaluates to itself.
    Structure(Structure),
}

impl fmt::Display for Evaluated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluated::Number(n) => write!(f, "{}", n),
            Evaluated::Text(s) => write!(f, "{}", s),
            Evaluated::Truth(b) => write!(f, "{}", b),
            Evaluated::Structure(s) => write!(f, "{}", s),
        }
    }
}

/// Why an evaluation could not produce a value.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalError {
    /// An unbound variable was consulted.
    Undefined { variable: String },
    /// An arithmetic operand was not a number.
    NotNumeric { term: String },
    /// The right operand of `/` or `%` was zero.
    DivisionByZero,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Undefined { variable } => {
                write!(f, "variable {} is undefined", variable)
            }
            EvalError::NotNumeric { term } => write!(f, "{} is not a number", term),
            EvalError::DivisionByZero => write!(f, "division by zero"),
        }
    }
}

impl Error for EvalError {}

impl ArithOp {
    /// Applies the operator to two numbers.
    ///
    /// `%` is floor division here — the quotient rounded toward negative
    /// infinity — not a remainder. This engine inherits that mapping and
    /// keeps it.
    pub fn apply(self, left: f64, right: f64) -> Result<f64, EvalError> {
        match self {
            ArithOp::Add => Ok(left + right),
            ArithOp::Sub => Ok(left - right),
            ArithOp::Mul => Ok(left * right),
            ArithOp::Div => {
                if right == 0.0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(left / right)
                }
            }
            ArithOp::Rem => {
                if right == 0.0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok((left / right).floor())
                }
            }
        }
    }
}

impl Comparison {
    /// True when both sides evaluate and the operator holds between them.
    ///
    /// Requires both values to be numbers or both to be text; a mixed or
    /// structural pair never compares true. Evaluation errors count as
    /// failure, not as engine errors.
    pub fn holds(&self) -> bool {
        match (self.left().eval(), self.right().eval()) {
            (Ok(left), Ok(right)) => compare_values(self.op(), &left, &right),
            _ => false,
        }
    }
}

pub(crate) fn compare_values(op: CompareOp, left: &Evaluated, right: &Evaluated) -> bool {
    match (left, right) {
        (Evaluated::Number(a), Evaluated::Number(b)) => op.holds(a, b),
        (Evaluated::Text(a), Evaluated::Text(b)) => op.holds(a, b),
        _ => false,
    }
}

/// Wraps an evaluated value back into a term, for unification by the `#`
/// gateway.
pub(crate) fn term_from_evaluated(value: Evaluated) -> Term {
    match value {
        Evaluated::Number(n) => Term::Structure(Structure::atom(Functor::Number(n))),
        Evaluated::Text(s) => Term::Structure(Structure::atom(Functor::Text(s))),
        Evaluated::Truth(b) => Term::atom(if b { "true" } else { "false" }),
        Evaluated::Structure(s) => Term::Structure(s),
    }
}

impl Evaluation {
    /// Attempts the unification this gateway stands for and reports
    /// whether it succeeded, leaving the attempt's bindings in place.
    /// The caller owns the returned trail.
    pub(crate) fn attempt(&self) -> Result<Option<crate::unify::Unification>, EvalError> {
        let value = self.expr().eval()?;
        Ok(unify(self.target(), &term_from_evaluated(value)))
    }
}

/// Evaluates `term` and requires the result to be a number.
fn numeric(term: &Term) -> Result<f64, EvalError> {
    match term.eval()? {
        Evaluated::Number(n) => Ok(n),
        other => Err(EvalError::NotNumeric { term: other.to_string() }),
    }
}

impl Term {
    /// Evaluates this term to a host value.
    pub fn eval(&self) -> Result<Evaluated, EvalError> {
        match self {
            Term::Variable(v) => match v.binding() {
                Some(bound) => bound.eval(),
                None => Err(EvalError::Undefined { variable: v.name().to_string() }),
            },
            Term::Anonymous => Ok(Evaluated::Text("_".to_string())),
            Term::Structure(s) => {
                if s.arity() > 0 {
                    return Ok(Evaluated::Structure(s.clone()));
                }
                Ok(match s.functor() {
                    Functor::Text(text) => Evaluated::Text(text.clone()),
                    Functor::Number(n) => Evaluated::Number(*n),
                })
            }
            Term::EmptyList => Ok(Evaluated::Text(".".to_string())),
            Term::Not(s) => Ok(Evaluated::Structure(s.clone())),
            Term::Arithmetic(a) => {
                let left = numeric(a.left())?;
                let right = numeric(a.right())?;
                Ok(Evaluated::Number(a.op().apply(left, right)?))
            }
            Term::Comparison(c) => Ok(Evaluated::Truth(c.holds())),
            Term::Evaluation(e) => {
                // In term position the attempt is a test: succeed or not,
                // its bindings are discarded.
                let outcome = e.attempt()?;
                if let Some(unification) = &outcome {
                    unification.unbind();
                }
                Ok(Evaluated::Truth(outcome.is_some()))
            }
            // Write output is produced only when proven as a goal.
            Term::Write(_) => Ok(Evaluated::Truth(true)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{ArithmeticOperator, Variable};

    fn num(n: f64) -> Term {
        Term::number(n)
    }

    fn arith(op: ArithOp, left: Term, right: Term) -> Term {
        Term::Arithmetic(ArithmeticOperator::new(op, left, right))
    }

    #[test]
    fn atoms_evaluate_to_their_functor() {
        assert_eq!(Term::atom("a").eval(), Ok(Evaluated::Text("a".to_string())));
        assert_eq!(num(3.0).eval(), Ok(Evaluated::Number(3.0)));
    }

    #[test]
    fn arithmetic_evaluates() {
        assert_eq!(arith(ArithOp::Add, num(2.0), num(3.0)).eval(), Ok(Evaluated::Number(5.0)));
        assert_eq!(arith(ArithOp::Sub, num(2.0), num(3.0)).eval(), Ok(Evaluated::Number(-1.0)));
        assert_eq!(arith(ArithOp::Mul, num(2.0), num(3.0)).eval(), Ok(Evaluated::Number(6.0)));
        assert_eq!(arith(ArithOp::Div, num(5.0), num(2.0)).eval(), Ok(Evaluated::Number(2.5)));
    }

    #[test]
    fn rem_is_floor_division() {
        assert_eq!(arith(ArithOp::Rem, num(7.0), num(2.0)).eval(), Ok(Evaluated::Number(3.0)));
        assert_eq!(arith(ArithOp::Rem, num(-7.0), num(2.0)).eval(), Ok(Evaluated::Number(-4.0)));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(arith(ArithOp::Div, num(1.0), num(0.0)).eval(), Err(EvalError::DivisionByZero));
        assert_eq!(arith(ArithOp::Rem, num(1.0), num(0.0)).eval(), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn unbound_variable_is_undefined() {
        let x = Term::Variable(Variable::new("X"));
        assert_eq!(
            x.eval(),
            Err(EvalError::Undefined { variable: "X".to_string() })
        );
    }

    #[test]
    fn bound_variable_evaluates_through_its_binding() {
        let x = Variable::new("X");
        x.bind(num(4.0));
        let expr = arith(ArithOp::Mul, Term::Variable(x), num(2.0));
        assert_eq!(expr.eval(), Ok(Evaluated::Number(8.0)));
    }

    #[test]
    fn nonatomic_structure_evaluates_to_itself() {
        let s = Structure::new(Functor::text("p"), vec![Term::atom("a")]);
        assert_eq!(Term::Structure(s.clone()).eval(), Ok(Evaluated::Structure(s)));
    }

    #[test]
    fn comparison_evaluates_to_truth() {
        let c = Comparison::new(CompareOp::Gt, num(5.0), num(3.0));
        assert_eq!(Term::Comparison(c).eval(), Ok(Evaluated::Truth(true)));
        let c = Comparison::new(CompareOp::Gt, num(1.0), num(3.0));
        assert_eq!(Term::Comparison(c).eval(), Ok(Evaluated::Truth(false)));
    }

    #[test]
    fn string_comparison_and_mixed_pairs() {
        let text = |s: &str| Evaluated::Text(s.to_string());
        assert!(compare_values(CompareOp::Lt, &text("abc"), &text("abd")));
        assert!(compare_values(CompareOp::Ne, &text("a"), &text("b")));
        // Mixed number/text pairs never compare true.
        assert!(!compare_values(CompareOp::Eq, &Evaluated::Number(1.0), &text("1")));
    }
}
