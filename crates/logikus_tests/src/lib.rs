//! End-to-end tests for the logikus workspace.
//!
//! The crate itself is empty; everything lives under `tests/`, driving
//! the parser and engine together the way an embedder would.
