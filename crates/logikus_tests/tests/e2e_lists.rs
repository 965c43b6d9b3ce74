//! E2E: list syntax, head/tail patterns and anonymous variables.

mod common;

use common::assert_solutions;

const MEMBER: &str = "member(X, [X|_]); member(X, [_|T]) :- member(X, T);";

#[test]
fn member_enumerates_every_element_in_order() {
    assert_solutions(MEMBER, "member(X, [a, b, c])", &["X = a", "X = b", "X = c"]);
}

#[test]
fn member_checks_a_ground_element() {
    assert_solutions(MEMBER, "member(b, [a, b, c])", &[""]);
    assert_solutions(MEMBER, "member(d, [a, b, c])", &[]);
}

#[test]
fn first_and_rest_split_a_list() {
    let program = "first([X|_], X); rest([_|T], T);";
    assert_solutions(program, "first([a, b, c], X)", &["X = a"]);
    assert_solutions(program, "rest([a, b, c], T)", &["T = [b, c]"]);
    assert_solutions(program, "rest([a], T)", &["T = []"]);
}

#[test]
fn append_enumerates_every_split() {
    let program = "append([], L, L); append([H|T], L, [H|R]) :- append(T, L, R);";
    assert_solutions(program, "append(X, Y, [a, b])", &[
        "X = [], Y = [a, b]",
        "X = [a], Y = [b]",
        "X = [a, b], Y = []",
    ]);
}

#[test]
fn append_builds_a_list_forward() {
    let program = "append([], L, L); append([H|T], L, [H|R]) :- append(T, L, R);";
    assert_solutions(program, "append([a], [b, c], Z)", &["Z = [a, b, c]"]);
}

#[test]
fn nested_lists_match_structurally() {
    let program = "p([a, [b, c], d]);";
    assert_solutions(program, "p([a, X, d])", &["X = [b, c]"]);
    assert_solutions(program, "p([a, [X, c], d])", &["X = b"]);
}

#[test]
fn empty_list_only_matches_empty_list() {
    let program = "empty([]);";
    assert_solutions(program, "empty([])", &[""]);
    assert_solutions(program, "empty([a])", &[]);
}

#[test]
fn two_anonymous_variables_are_independent() {
    let program = "pair(a, b);";
    // Each `_` matches its own position; neither binds nor constrains.
    assert_solutions(program, "pair(_, _)", &[""]);
}

#[test]
fn open_tail_queries_resume_without_exhausting() {
    // The solution space of an open-ended tail is infinite; take the
    // first two solutions and stop.
    let program = logikus_parse::program(MEMBER).expect("program should parse");
    let mut query = logikus_parse::query("member(b, [_|X])", &program).expect("query should parse");
    assert!(query.advance());
    assert_eq!(query.bindings().to_string(), "X");
    assert!(query.advance());
    assert_eq!(query.bindings().to_string(), "X = [b|_]");
}

#[test]
fn variable_tail_query_binds_to_partial_lists() {
    let program = "p([a, b]);";
    assert_solutions(program, "p([a|T])", &["T = [b]"]);
    assert_solutions(program, "p([X|[b]])", &["X = a"]);
}

#[test]
fn numbers_live_in_lists() {
    assert_solutions(MEMBER, "member(X, [1, 2.5, -3])", &["X = 1", "X = 2.5", "X = -3"]);
}
