//! Semantic actions for the Logikus grammar.
//!
//! Each assembler runs after its matcher succeeds and rewrites the
//! assembly's stack: popping operand items, building an engine term,
//! pushing the result. Dynamic-arity collections (structure arguments,
//! list contents) pop back to a fence token the grammar pushed earlier —
//! `(` or `[` respectively.
//!
//! The pops are shaped by the grammar, so a mismatched stack cannot occur
//! on any input the grammar accepts; the assemblers bail out quietly
//! rather than panic if handed one anyway.

use logikus_base::Token;
use logikus_engine::{
    ArithOp, ArithmeticOperator, CompareOp, Comparison, Evaluation, Functor, Rule, Structure,
    Term, Variable,
};

use crate::assembly::{StackItem, TokenAssembly};
use crate::combinators::Assembler;

fn pop_term(assembly: &mut TokenAssembly) -> Option<Term> {
    match assembly.pop()? {
        StackItem::Term(term) => Some(term),
        _ => None,
    }
}

fn pop_token(assembly: &mut TokenAssembly) -> Option<Token> {
    match assembly.pop()? {
        StackItem::Token(token) => Some(token),
        _ => None,
    }
}

/// Source-order terms from a top-first fence pop.
fn terms_below(items: Vec<StackItem>) -> Vec<Term> {
    items
        .into_iter()
        .rev()
        .filter_map(|item| match item {
            StackItem::Term(term) => Some(term),
            _ => None,
        })
        .collect()
}

/// Pops a token and pushes it as an atom. Quoted spellings lose their
/// delimiters; numbers keep their numeric functor.
pub struct AtomAssembler;

impl Assembler for AtomAssembler {
    fn work_on(&self, assembly: &mut TokenAssembly) {
        let Some(token) = pop_token(assembly) else { return };
        let functor = if token.is_quoted() {
            let text = token.text();
            Functor::text(&text[1..text.len() - 1])
        } else if token.is_number() {
            Functor::number(token.value())
        } else {
            Functor::text(token.text())
        };
        assembly.push(StackItem::Term(Term::Structure(Structure::atom(functor))));
    }
}

/// Pops an uppercase word and pushes a variable of that name.
pub struct VariableAssembler;

impl Assembler for VariableAssembler {
    fn work_on(&self, assembly: &mut TokenAssembly) {
        let Some(token) = pop_token(assembly) else { return };
        assembly.push(StackItem::Term(Term::Variable(Variable::new(token.text()))));
    }
}

/// Pushes the anonymous variable (its `_` token was discarded).
pub struct AnonymousAssembler;

impl Assembler for AnonymousAssembler {
    fn work_on(&self, assembly: &mut TokenAssembly) {
        assembly.push(StackItem::Term(Term::Anonymous));
    }
}

/// Pops the argument terms back to the `(` fence, then the functor
/// token, and pushes the structure.
pub struct StructureWithTermsAssembler;

impl Assembler for StructureWithTermsAssembler {
    fn work_on(&self, assembly: &mut TokenAssembly) {
        let fence = Token::symbol("(");
        let terms = terms_below(assembly.elements_above(&fence));
        let Some(token) = pop_token(assembly) else { return };
        // A quoted functor with arguments keeps its quotes in the name.
        let functor = if token.is_number() {
            Functor::number(token.value())
        } else {
            Functor::text(token.text())
        };
        assembly.push(StackItem::Term(Term::Structure(Structure::new(functor, terms))));
    }
}

/// Pops list contents back to the `[` fence and pushes a proper list
/// (or the empty list).
pub struct ListAssembler;

impl Assembler for ListAssembler {
    fn work_on(&self, assembly: &mut TokenAssembly) {
        let fence = Token::symbol("[");
        let terms = terms_below(assembly.elements_above(&fence));
        if terms.is_empty() {
            assembly.push(StackItem::Term(Term::EmptyList));
        } else {
            assembly.push(StackItem::Term(Structure::list(terms)));
        }
    }
}

/// Pops the tail term, then the list contents back to the `[` fence, and
/// pushes the list ending in that tail.
pub struct ListWithTailAssembler;

impl Assembler for ListWithTailAssembler {
    fn work_on(&self, assembly: &mut TokenAssembly) {
        let Some(tail) = pop_term(assembly) else { return };
        let fence = Token::symbol("[");
        let terms = terms_below(assembly.elements_above(&fence));
        assembly.push(StackItem::Term(Structure::list_with_tail(terms, tail)));
    }
}

/// Wraps the popped structure in negation-as-failure.
pub struct NotAssembler;

impl Assembler for NotAssembler {
    fn work_on(&self, assembly: &mut TokenAssembly) {
        let Some(Term::Structure(structure)) = pop_term(assembly) else { return };
        assembly.push(StackItem::Term(Term::Not(structure)));
    }
}

/// Pops two terms and the operator token and pushes the comparison.
pub struct ComparisonAssembler;

impl Assembler for ComparisonAssembler {
    fn work_on(&self, assembly: &mut TokenAssembly) {
        let Some(second) = pop_term(assembly) else { return };
        let Some(first) = pop_term(assembly) else { return };
        let Some(token) = pop_token(assembly) else { return };
        let Some(op) = CompareOp::from_symbol(token.text()) else { return };
        assembly.push(StackItem::Term(Term::Comparison(Comparison::new(op, first, second))));
    }
}

/// Pops two terms and pushes the `#` evaluation.
pub struct EvaluationAssembler;

impl Assembler for EvaluationAssembler {
    fn work_on(&self, assembly: &mut TokenAssembly) {
        let Some(second) = pop_term(assembly) else { return };
        let Some(first) = pop_term(assembly) else { return };
        assembly.push(StackItem::Term(Term::Evaluation(Evaluation::new(first, second))));
    }
}

/// Pops two operands and pushes the arithmetic node for its operator.
pub struct ArithmeticAssembler {
    op: ArithOp,
}

impl ArithmeticAssembler {
    pub fn new(op: ArithOp) -> Self {
        Self { op }
    }
}

impl Assembler for ArithmeticAssembler {
    fn work_on(&self, assembly: &mut TokenAssembly) {
        let Some(right) = pop_term(assembly) else { return };
        let Some(left) = pop_term(assembly) else { return };
        assembly.push(StackItem::Term(Term::Arithmetic(ArithmeticOperator::new(
            self.op, left, right,
        ))));
    }
}

/// Collects the whole stack, in order, into a rule.
pub struct AxiomAssembler;

impl Assembler for AxiomAssembler {
    fn work_on(&self, assembly: &mut TokenAssembly) {
        let terms: Vec<Term> = assembly
            .drain_stack()
            .into_iter()
            .filter_map(|item| match item {
                StackItem::Term(term) => Some(term),
                _ => None,
            })
            .collect();
        assembly.push(StackItem::Rule(Rule::new(terms)));
    }
}
