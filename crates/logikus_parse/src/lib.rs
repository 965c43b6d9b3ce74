//! The Logikus surface parser.
//!
//! Lowers Prolog-like source text into `logikus-engine` objects in three
//! layers:
//!
//! ```text
//! Tokens (logikus-base)
//!     │
//!     ▼
//! Combinators (combinators)    matchers over token assemblies
//!     │
//!     ▼
//! Grammar (grammar)            the Logikus productions + assemblers
//!     │
//!     ▼
//! Facade (facade)              program / axiom / query from text
//! ```
//!
//! The combinators carry non-determinism as a set of assemblies; semantic
//! actions ([`Assembler`]s) build engine terms on each assembly's stack.
//! [`Track`](combinators::Track) sequences commit after their first match
//! and report failures as [`TrackError`]s naming what was consumed,
//! expected and found.
//!
//! # Example
//!
//! ```
//! let program = logikus_parse::program(
//!     "father(abraham, isaac); \
//!      father(isaac, jacob); \
//!      grandfather(X, Z) :- father(X, Y), father(Y, Z);",
//! ).expect("parses");
//! let mut query = logikus_parse::query("grandfather(X, jacob)", &program).expect("parses");
//! assert!(query.advance());
//! assert_eq!(query.bindings().to_string(), "X = abraham");
//! assert!(!query.advance());
//! ```

pub mod assembly;
pub mod assemblers;
pub mod combinators;
pub mod facade;
pub mod grammar;

pub use assembly::{StackItem, TokenAssembly};
pub use combinators::{Assembler, Matcher};
pub use facade::{axiom, program, query, ParseError};
pub use grammar::LogikusParser;
pub use logikus_base::TrackError;
