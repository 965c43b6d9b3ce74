//! Shared helpers for the end-to-end tests.

/// Parses `program_text` and `query_text`, runs the query to exhaustion,
/// and returns one binding string per solution (empty string for a
/// solution with no variables).
#[allow(dead_code)]
pub fn solutions(program_text: &str, query_text: &str) -> Vec<String> {
    let program = logikus_parse::program(program_text).expect("program should parse");
    let mut query = logikus_parse::query(query_text, &program).expect("query should parse");
    let mut out = Vec::new();
    while query.advance() {
        out.push(query.bindings().to_string());
    }
    out
}

/// Asserts the exact solution sequence of a query.
#[allow(dead_code)]
pub fn assert_solutions(program_text: &str, query_text: &str, expected: &[&str]) {
    assert_eq!(solutions(program_text, query_text), expected, "query: {}", query_text);
}
