//! E2E: arithmetic, evaluation and comparison gateways.

mod common;

use common::assert_solutions;

#[test]
fn list_length_accumulates_through_evaluation() {
    let program = "len([], 0); len([_|T], N) :- len(T, M), #(N, M + 1);";
    assert_solutions(program, "len([a, b, c], N)", &["N = 3"]);
    assert_solutions(program, "len([], N)", &["N = 0"]);
}

#[test]
fn numeric_comparison_gates_a_rule() {
    let program = "ok(X) :- >(X, 3);";
    assert_solutions(program, "ok(5)", &[""]);
    assert_solutions(program, "ok(1)", &[]);
}

#[test]
fn comparison_operators_cover_both_directions() {
    let program = "small(X) :- <=(X, 10); exact(X) :- =(X, 7);";
    assert_solutions(program, "small(10)", &[""]);
    assert_solutions(program, "small(11)", &[]);
    assert_solutions(program, "exact(7)", &[""]);
    assert_solutions(program, "exact(8)", &[]);
}

#[test]
fn string_comparisons_order_lexically() {
    let program = "before(X, Y) :- <(X, Y);";
    assert_solutions(program, "before(apple, banana)", &[""]);
    assert_solutions(program, "before(banana, apple)", &[]);
}

#[test]
fn mixed_number_and_string_comparisons_fail() {
    let program = "eq(X, Y) :- =(X, Y);";
    assert_solutions(program, "eq(1, one)", &[]);
}

#[test]
fn evaluation_computes_nested_expressions() {
    let program = "calc(X) :- #(X, (2 + 3) * 4);";
    assert_solutions(program, "calc(X)", &["X = 20"]);
}

#[test]
fn evaluation_checks_when_target_is_bound() {
    let program = "double(X, Y) :- #(Y, X * 2);";
    assert_solutions(program, "double(3, 6)", &[""]);
    assert_solutions(program, "double(3, 7)", &[]);
}

#[test]
fn division_yields_fractions() {
    assert_solutions("half(X, Y) :- #(Y, X / 2);", "half(5, Y)", &["Y = 2.5"]);
}

#[test]
fn rem_operator_is_floor_division_through_the_engine() {
    // `%` has no surface production; embedders reach it through the
    // engine API.
    use logikus_engine::{
        ArithOp, ArithmeticOperator, Evaluation, Query, Rule, Term, Variable,
    };

    let program = logikus_parse::program("t;").expect("program parses");
    let z = Variable::new("Z");
    let rule = Rule::new(vec![Term::Evaluation(Evaluation::new(
        Term::Variable(z),
        Term::Arithmetic(ArithmeticOperator::new(
            ArithOp::Rem,
            Term::number(7.0),
            Term::number(2.0),
        )),
    ))]);
    let mut query = Query::new(&program, &rule);
    assert!(query.advance());
    assert_eq!(query.bindings().to_string(), "Z = 3");
    assert!(!query.advance());
}

#[test]
fn division_by_zero_fails_the_gateway() {
    assert_solutions("bad(X) :- #(X, 1 / 0);", "bad(X)", &[]);
}

#[test]
fn comparison_on_unbound_variable_fails_not_panics() {
    // Y is never bound; eval's undefined error fails the gateway.
    assert_solutions("odd(X) :- >(Y, 3);", "odd(1)", &[]);
}

#[test]
fn evaluation_bindings_undo_on_backtrack() {
    // The first clause binds N via evaluation and then fails the guard;
    // the second clause must see N unbound again through a fresh scope,
    // and the query variable must end up with the second clause's value.
    let program = "pick(X, N) :- #(N, X + 1), >(N, 10); pick(X, N) :- #(N, X - 1);";
    assert_solutions(program, "pick(5, N)", &["N = 4"]);
}

#[test]
fn arithmetic_over_list_elements() {
    let program = "sum([], 0); sum([H|T], N) :- sum(T, M), #(N, M + H);";
    assert_solutions(program, "sum([1, 2, 3, 4], N)", &["N = 10"]);
}

#[test]
fn negative_and_fractional_literals_flow_through() {
    let program = "shift(X, Y) :- #(Y, X + -1.5);";
    assert_solutions(program, "shift(1, Y)", &["Y = -0.5"]);
}
