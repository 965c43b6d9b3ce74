//! Argument parsing and command dispatch.
//!
//! Built on [`clap`] derive macros; each variant of [`Commands`] maps to
//! a handler below. Handlers take an output sink so tests can drive them
//! without a terminal.
//!
//! # Examples
//!
//! ```bash
//! # One-shot query
//! logikus run family.lgk --query "grandfather(X, jacob)"
//!
//! # Machine-readable solutions, one JSON object per line
//! logikus run family.lgk --query "father(X, Y)" --json
//!
//! # Interactive session
//! logikus repl family.lgk
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write as _};
use std::path::{Path, PathBuf};

use logikus_engine::{Bindings, Program, WriteTracer};

use crate::CliError;

/// Command-line interface for the Logikus engine.
#[derive(Parser)]
#[command(name = "logikus")]
#[command(about = "A Prolog-like logic-programming engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Load a program and run one query to exhaustion.
    ///
    /// Prints one line per solution (`X = a, Y = b`, or `true` for a
    /// solution without variables), then `Yes` or `No`.
    Run {
        /// The program file (`;`-separated axioms).
        file: PathBuf,
        /// The query text.
        #[arg(short, long)]
        query: String,
        /// Print each solution as a JSON object instead.
        #[arg(long)]
        json: bool,
        /// Trace clause attempts to stderr.
        #[arg(long)]
        trace: bool,
    },

    /// Load a program and read queries interactively from stdin.
    ///
    /// One query per line; `exit` or `quit` (or end of input) leaves.
    Repl {
        /// The program file; with none, queries run against an empty
        /// program.
        file: Option<PathBuf>,
        /// Trace clause attempts to stderr.
        #[arg(long)]
        trace: bool,
    },

    /// Parse a program file and report what it holds.
    Check {
        /// The program file.
        file: PathBuf,
    },

    /// Parse a program file and print it back, one axiom per line.
    Print {
        /// The program file.
        file: PathBuf,
    },
}

/// Parses arguments and dispatches to the matching handler.
pub fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    let mut stdout = io::stdout();
    match cli.command {
        Commands::Run { file, query, json, trace } => {
            let program = load_program(&file)?;
            run_query(&program, &query, json, trace, &mut stdout)
        }
        Commands::Repl { file, trace } => {
            let program = match file {
                Some(file) => load_program(&file)?,
                None => Program::new(),
            };
            let stdin = io::stdin();
            repl(&program, trace, &mut stdin.lock(), &mut stdout)
        }
        Commands::Check { file } => {
            let program = load_program(&file)?;
            writeln!(stdout, "{}: {} axioms", file.display(), program.len())?;
            Ok(())
        }
        Commands::Print { file } => {
            let program = load_program(&file)?;
            writeln!(stdout, "{}", program)?;
            Ok(())
        }
    }
}

/// Reads and parses a program file.
pub fn load_program(path: &Path) -> Result<Program, CliError> {
    let text = fs::read_to_string(path)?;
    Ok(logikus_parse::program(&text)?)
}

/// Runs one query to exhaustion, writing solutions to `out`.
pub fn run_query(
    program: &Program,
    query_text: &str,
    json: bool,
    trace: bool,
    out: &mut dyn io::Write,
) -> Result<(), CliError> {
    let mut stderr = io::stderr();
    let mut query = logikus_parse::query(query_text, program)?;
    if trace {
        query = query.with_tracer(Box::new(WriteTracer::new(&mut stderr)));
    }
    let mut found = false;
    while query.advance() {
        found = true;
        let bindings = query.bindings();
        if json {
            writeln!(out, "{}", bindings_to_json(&bindings))?;
        } else if bindings.is_empty() {
            writeln!(out, "true")?;
        } else {
            writeln!(out, "{}", bindings)?;
        }
    }
    if !json {
        writeln!(out, "{}", if found { "Yes" } else { "No" })?;
    }
    Ok(())
}

/// One solution as a JSON object; unbound variables map to null.
fn bindings_to_json(bindings: &Bindings) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for binding in bindings.entries() {
        let value = match binding.value() {
            Some(value) => serde_json::Value::String(value.to_string()),
            None => serde_json::Value::Null,
        };
        map.insert(binding.name().to_string(), value);
    }
    serde_json::Value::Object(map)
}

/// Reads queries line by line and answers each one.
pub fn repl(
    program: &Program,
    trace: bool,
    input: &mut dyn BufRead,
    out: &mut dyn io::Write,
) -> Result<(), CliError> {
    loop {
        write!(out, "? ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            return Ok(());
        }
        if let Err(e) = run_query(program, line, false, trace, out) {
            writeln!(out, "{}", e)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn run_to_string(program_text: &str, query: &str, json: bool) -> String {
        let program = logikus_parse::program(program_text).expect("program parses");
        let mut out = Vec::new();
        run_query(&program, query, json, false, &mut out).expect("query runs");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn run_prints_solutions_then_yes() {
        let out = run_to_string("f(a); f(b);", "f(X)", false);
        assert_eq!(out, "X = a\nX = b\nYes\n");
    }

    #[test]
    fn run_prints_true_for_variable_free_solutions() {
        let out = run_to_string("f(a);", "f(a)", false);
        assert_eq!(out, "true\nYes\n");
    }

    #[test]
    fn run_prints_no_when_exhausted_without_solutions() {
        let out = run_to_string("f(a);", "f(b)", false);
        assert_eq!(out, "No\n");
    }

    #[test]
    fn json_mode_prints_one_object_per_solution() {
        let out = run_to_string("f(a); f(b);", "f(X)", true);
        assert_eq!(out, "{\"X\":\"a\"}\n{\"X\":\"b\"}\n");
    }

    #[test]
    fn parse_errors_surface_as_cli_errors() {
        let program = logikus_parse::program("f(a);").expect("program parses");
        let mut out = Vec::new();
        let err = run_query(&program, "f(a", false, false, &mut out).expect_err("should fail");
        assert!(matches!(err, CliError::Parse(_)));
    }

    #[test]
    fn load_program_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "father(abraham, isaac); father(isaac, jacob);").expect("write");
        let program = load_program(file.path()).expect("loads");
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn repl_answers_until_exit() {
        let program = logikus_parse::program("f(a);").expect("program parses");
        let mut input = io::Cursor::new("f(X)\nexit\n");
        let mut out = Vec::new();
        repl(&program, false, &mut input, &mut out).expect("repl runs");
        let out = String::from_utf8(out).expect("utf8");
        assert_eq!(out, "? X = a\nYes\n? ");
    }

    #[test]
    fn repl_reports_bad_queries_and_continues() {
        let program = logikus_parse::program("f(a);").expect("program parses");
        let mut input = io::Cursor::new("f(a\nquit\n");
        let mut out = Vec::new();
        repl(&program, false, &mut input, &mut out).expect("repl runs");
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.contains("Expected"));
    }
}
