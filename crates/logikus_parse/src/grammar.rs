//! The Logikus grammar.
//!
//! ```text
//! axiom        = structure (ruleDef | Empty);
//! structure    = functor ('(' commaList(term) ')' | Empty);
//! functor      = '.' | LowercaseWord | QuotedString;
//! term         = structure | Num | list | variable;
//! variable     = UppercaseWord | '_';
//! ruleDef      = ":-" commaList(condition);
//! condition    = structure | not | evaluation | comparison | list;
//! not          = "not" structure;
//! evaluation   = '#' '(' arg ',' arg ')';
//! comparison   = operator '(' arg ',' arg ')';
//! arg          = expression | functor;
//! expression   = phrase ('+' phrase | '-' phrase)*;
//! phrase       = factor ('*' factor | '/' factor)*;
//! list         = '[' (listContents | Empty) ']';
//! listContents = commaList(term) listTail;
//! listTail     = ('|' (variable | list)) | Empty;
//! commaList(p) = p (',' p)*;
//! ```
//!
//! The `(` and `[` tokens are pushed un-discarded as fences; the
//! structure and list assemblers pop back to them to collect their
//! dynamic-arity contents. Recursive productions (structure and list
//! inside term, expression inside factor, list inside its own tail) go
//! through [`Forward`] placeholders tied after construction.

use std::rc::Rc;

use logikus_engine::ArithOp;

use crate::assemblers::{
    AnonymousAssembler, ArithmeticAssembler, AtomAssembler, AxiomAssembler, ComparisonAssembler,
    EvaluationAssembler, ListAssembler, ListWithTailAssembler, NotAssembler,
    StructureWithTermsAssembler, VariableAssembler,
};
use crate::combinators::{
    Alternation, Empty, Forward, Matcher, Repetition, Sequence, Terminal, Track,
};

fn rc<M: Matcher + 'static>(matcher: M) -> Rc<dyn Matcher> {
    Rc::new(matcher)
}

/// `p (',' p)*` — the comma is discarded; the track commits once a comma
/// has been seen.
fn comma_list(p: Rc<dyn Matcher>) -> Sequence {
    let comma_p = Track::new().add(rc(Terminal::symbol(",").discard())).add(Rc::clone(&p));
    Sequence::new().add(p).add(rc(Repetition::new(rc(comma_p))))
}

/// The assembled Logikus grammar: entry points for axioms and queries.
pub struct LogikusParser {
    axiom: Rc<dyn Matcher>,
    query: Rc<dyn Matcher>,
    // Strong holders behind the Forward placeholders.
    #[allow(dead_code)]
    structure: Rc<dyn Matcher>,
    #[allow(dead_code)]
    expression: Rc<dyn Matcher>,
    #[allow(dead_code)]
    list: Rc<dyn Matcher>,
}

impl LogikusParser {
    pub fn new() -> Self {
        let structure_forward = Rc::new(Forward::new("structure"));
        let expression_forward = Rc::new(Forward::new("expression"));
        let list_forward = Rc::new(Forward::new("list"));

        // variable = UppercaseWord | '_'
        let variable = || {
            rc(Alternation::new()
                .add(rc(Terminal::uppercase_word().with_assembler(Rc::new(VariableAssembler))))
                .add(rc(Terminal::symbol("_")
                    .discard()
                    .with_assembler(Rc::new(AnonymousAssembler)))))
        };

        // functor = '.' | LowercaseWord | QuotedString
        let functor = || {
            Alternation::named("functor")
                .add(rc(Terminal::symbol(".")))
                .add(rc(Terminal::lowercase_word()))
                .add(rc(Terminal::quoted_string()))
        };

        // num = Num (atomized)
        let num = || rc(Terminal::num().with_assembler(Rc::new(AtomAssembler)));

        // term = structure | Num | list | variable
        let term: Rc<dyn Matcher> = rc(Alternation::named("term")
            .add(Rc::clone(&structure_forward) as Rc<dyn Matcher>)
            .add(num())
            .add(Rc::clone(&list_forward) as Rc<dyn Matcher>)
            .add(variable()));

        // structure = functor ('(' commaList(term) ')' | Empty)
        // The '(' stays on the stack as the arguments' fence.
        let structure: Rc<dyn Matcher> = {
            let with_terms = Track::named("list in parens")
                .add(rc(Terminal::symbol("(")))
                .add(rc(comma_list(Rc::clone(&term))))
                .add(rc(Terminal::symbol(")").discard()))
                .with_assembler(Rc::new(StructureWithTermsAssembler));
            rc(Sequence::named("structure").add(rc(functor())).add(rc(Alternation::new()
                .add(rc(with_terms))
                .add(rc(Empty::new().with_assembler(Rc::new(AtomAssembler)))))))
        };
        structure_forward.define(&structure);

        // factor = '(' expression ')' | Num | variable
        let factor: Rc<dyn Matcher> = rc(Alternation::named("factor")
            .add(rc(Sequence::new()
                .add(rc(Terminal::symbol("(").discard()))
                .add(Rc::clone(&expression_forward) as Rc<dyn Matcher>)
                .add(rc(Terminal::symbol(")").discard()))))
            .add(num())
            .add(variable()));

        // phrase = factor ('*' factor | '/' factor)*
        let phrase: Rc<dyn Matcher> = {
            let times = Sequence::named("timesFactor")
                .add(rc(Terminal::symbol("*").discard()))
                .add(Rc::clone(&factor))
                .with_assembler(Rc::new(ArithmeticAssembler::new(ArithOp::Mul)));
            let divide = Sequence::named("divideFactor")
                .add(rc(Terminal::symbol("/").discard()))
                .add(Rc::clone(&factor))
                .with_assembler(Rc::new(ArithmeticAssembler::new(ArithOp::Div)));
            rc(Sequence::named("phrase")
                .add(factor)
                .add(rc(Repetition::new(rc(Alternation::new().add(rc(times)).add(rc(divide)))))))
        };

        // expression = phrase ('+' phrase | '-' phrase)*
        let expression: Rc<dyn Matcher> = {
            let plus = Sequence::named("plusPhrase")
                .add(rc(Terminal::symbol("+").discard()))
                .add(Rc::clone(&phrase))
                .with_assembler(Rc::new(ArithmeticAssembler::new(ArithOp::Add)));
            let minus = Sequence::named("minusPhrase")
                .add(rc(Terminal::symbol("-").discard()))
                .add(Rc::clone(&phrase))
                .with_assembler(Rc::new(ArithmeticAssembler::new(ArithOp::Sub)));
            rc(Sequence::named("expression")
                .add(phrase)
                .add(rc(Repetition::new(rc(Alternation::new().add(rc(plus)).add(rc(minus)))))))
        };
        expression_forward.define(&expression);

        // list = '[' (listContents | Empty) ']'
        // The '[' stays on the stack as the contents' fence.
        let list: Rc<dyn Matcher> = {
            // listTail = ('|' (variable | list)) | Empty
            let bar_tail = Track::named("bar tail")
                .add(rc(Terminal::symbol("|").discard()))
                .add(rc(Alternation::new()
                    .add(variable())
                    .add(Rc::clone(&list_forward) as Rc<dyn Matcher>)))
                .with_assembler(Rc::new(ListWithTailAssembler));
            let list_tail = Alternation::new()
                .add(rc(bar_tail))
                .add(rc(Empty::new().with_assembler(Rc::new(ListAssembler))));
            // listContents = commaList(term) listTail
            let list_contents = comma_list(Rc::clone(&term)).add(rc(list_tail));
            rc(Track::named("list")
                .add(rc(Terminal::symbol("[")))
                .add(rc(Alternation::new()
                    .add(rc(list_contents))
                    .add(rc(Empty::new().with_assembler(Rc::new(ListAssembler))))))
                .add(rc(Terminal::symbol("]").discard())))
        };
        list_forward.define(&list);

        // arg = expression | functor (atomized)
        let arg = || {
            rc(Alternation::new()
                .add(Rc::clone(&expression))
                .add(rc(functor().with_assembler(Rc::new(AtomAssembler)))))
        };

        // comparison = operator '(' arg ',' arg ')'
        let comparison: Rc<dyn Matcher> = {
            let operator = Alternation::named("operator")
                .add(rc(Terminal::symbol("<")))
                .add(rc(Terminal::symbol(">")))
                .add(rc(Terminal::symbol("=")))
                .add(rc(Terminal::symbol("<=")))
                .add(rc(Terminal::symbol(">=")))
                .add(rc(Terminal::symbol("!=")));
            rc(Track::named("comparison")
                .add(rc(operator))
                .add(rc(Terminal::symbol("(").discard()))
                .add(arg())
                .add(rc(Terminal::symbol(",").discard()))
                .add(arg())
                .add(rc(Terminal::symbol(")").discard()))
                .with_assembler(Rc::new(ComparisonAssembler)))
        };

        // evaluation = '#' '(' arg ',' arg ')'
        let evaluation: Rc<dyn Matcher> = rc(Track::named("evaluation")
            .add(rc(Terminal::symbol("#").discard()))
            .add(rc(Terminal::symbol("(").discard()))
            .add(arg())
            .add(rc(Terminal::symbol(",").discard()))
            .add(arg())
            .add(rc(Terminal::symbol(")").discard()))
            .with_assembler(Rc::new(EvaluationAssembler)));

        // not = "not" structure
        let not: Rc<dyn Matcher> = rc(Track::named("not")
            .add(rc(Terminal::literal("not").discard()))
            .add(Rc::clone(&structure))
            .with_assembler(Rc::new(NotAssembler)));

        // condition = structure | not | evaluation | comparison | list
        let condition: Rc<dyn Matcher> = rc(Alternation::named("condition")
            .add(Rc::clone(&structure))
            .add(not)
            .add(evaluation)
            .add(comparison)
            .add(Rc::clone(&list)));

        // ruleDef = ":-" commaList(condition)
        let rule_def: Rc<dyn Matcher> = rc(Track::named("rule definition")
            .add(rc(Terminal::symbol(":-").discard()))
            .add(rc(comma_list(Rc::clone(&condition)))));

        // axiom = structure (ruleDef | Empty)
        let axiom: Rc<dyn Matcher> = rc(Sequence::named("axiom")
            .add(Rc::clone(&structure))
            .add(rc(Alternation::new().add(rule_def).add(rc(Empty::new()))))
            .with_assembler(Rc::new(AxiomAssembler)));

        // query = commaList(condition)
        let query: Rc<dyn Matcher> =
            rc(comma_list(condition).with_assembler(Rc::new(AxiomAssembler)));

        Self { axiom, query, structure, expression, list }
    }

    /// The entry point for one axiom.
    pub fn axiom(&self) -> Rc<dyn Matcher> {
        Rc::clone(&self.axiom)
    }

    /// The entry point for a query: a comma-list of conditions.
    pub fn query(&self) -> Rc<dyn Matcher> {
        Rc::clone(&self.query)
    }
}

impl Default for LogikusParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{StackItem, TokenAssembly};
    use logikus_base::Tokenizer;
    use logikus_engine::Rule;

    fn parse_axiom(text: &str) -> Rule {
        let parser = LogikusParser::new();
        let assembly = TokenAssembly::new(Tokenizer::new(text).collect());
        let best = parser
            .axiom()
            .complete_match(assembly)
            .expect("no parse error")
            .expect("a complete match");
        let mut best = best;
        match best.pop() {
            Some(StackItem::Rule(rule)) => rule,
            other => panic!("expected a rule on the stack, got {:?}", other),
        }
    }

    #[test]
    fn fact_parses_to_a_bodyless_rule() {
        let rule = parse_axiom("father(abraham, isaac)");
        assert_eq!(rule.to_string(), "father(abraham, isaac)");
        assert_eq!(rule.terms().len(), 1);
    }

    #[test]
    fn atom_parses_without_parentheses() {
        let rule = parse_axiom("halts");
        assert_eq!(rule.to_string(), "halts");
    }

    #[test]
    fn rule_parses_head_and_body() {
        let rule = parse_axiom("grandfather(X, Z) :- father(X, Y), father(Y, Z)");
        assert_eq!(rule.to_string(), "grandfather(X, Z) :- father(X, Y), father(Y, Z)");
        assert_eq!(rule.terms().len(), 3);
    }

    #[test]
    fn lists_parse_with_heads_tails_and_nesting() {
        assert_eq!(parse_axiom("p([])").to_string(), "p([])");
        assert_eq!(parse_axiom("p([a, b, c])").to_string(), "p([a, b, c])");
        assert_eq!(parse_axiom("p([X|T])").to_string(), "p([X|T])");
        assert_eq!(parse_axiom("p([a, [b], c])").to_string(), "p([a, [b], c])");
        assert_eq!(parse_axiom("p([_|T])").to_string(), "p([_|T])");
    }

    #[test]
    fn comparisons_and_evaluations_parse_as_conditions() {
        let rule = parse_axiom("ok(X) :- >(X, 3)");
        assert_eq!(rule.to_string(), "ok(X) :- >(X, 3)");
        let rule = parse_axiom("len([_|T], N) :- len(T, M), #(N, M + 1)");
        assert_eq!(rule.to_string(), "len([_|T], N) :- len(T, M), #(N, (M + 1))");
    }

    #[test]
    fn expressions_nest_left_associatively() {
        let rule = parse_axiom("p(X) :- #(X, 1 + 2 * 3 - 4)");
        // 2 * 3 binds tighter; + and - associate left.
        assert_eq!(rule.to_string(), "p(X) :- #(X, ((1 + (2 * 3)) - 4))");
    }

    #[test]
    fn parenthesized_expressions_parse() {
        let rule = parse_axiom("p(X) :- #(X, (1 + 2) * 3)");
        assert_eq!(rule.to_string(), "p(X) :- #(X, ((1 + 2) * 3))");
    }

    #[test]
    fn negation_parses_as_a_condition() {
        let rule = parse_axiom("bachelor(X) :- male(X), not married(X)");
        assert_eq!(rule.to_string(), "bachelor(X) :- male(X), not married(X)");
    }

    #[test]
    fn quoted_functors_parse() {
        assert_eq!(parse_axiom("p(\"old testament\")").to_string(), "p(\"old testament\")");
    }

    #[test]
    fn anonymous_variables_parse() {
        let rule = parse_axiom("first([X|_], X)");
        assert_eq!(rule.to_string(), "first([X|_], X)");
    }

    #[test]
    fn query_grammar_accepts_condition_lists() {
        let parser = LogikusParser::new();
        let assembly =
            TokenAssembly::new(Tokenizer::new("father(X, Y), father(Y, Z)").collect());
        let mut best = parser
            .query()
            .complete_match(assembly)
            .expect("no parse error")
            .expect("a complete match");
        let Some(StackItem::Rule(rule)) = best.pop() else { panic!("expected a rule") };
        assert_eq!(rule.terms().len(), 2);
    }

    #[test]
    fn unterminated_structure_raises_a_track_error() {
        let parser = LogikusParser::new();
        let assembly = TokenAssembly::new(Tokenizer::new("foo(a, b").collect());
        let err = parser.axiom().complete_match(assembly).expect_err("commit");
        assert_eq!(err.after, "foo ( a , b");
        assert_eq!(err.expected, ")");
        assert_eq!(err.found, "-nothing-");
    }
}
