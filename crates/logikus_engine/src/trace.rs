//! Proof tracing.
//!
//! Instead of a global debug flag, a [`ProofTracer`] is threaded through
//! query construction ([`crate::Query::with_tracer`]). The engine reports
//! each clause attempt; the provided [`WriteTracer`] renders the classic
//! `head\tTrue\tbindings` / `head\tFalse` lines to any sink.

use std::fmt;
use std::io;

use crate::unify::Unification;

/// A listener for clause attempts during a proof.
pub trait ProofTracer {
    /// Called once per candidate clause whose head signature matched:
    /// `unification` holds the bindings on success, `None` on failure.
    fn clause_attempt(&mut self, head: &dyn fmt::Display, unification: Option<&Unification>);
}

/// A tracer that writes tab-separated attempt lines to a sink.
pub struct WriteTracer<W: io::Write> {
    sink: W,
}

impl<W: io::Write> WriteTracer<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: io::Write> ProofTracer for WriteTracer<W> {
    fn clause_attempt(&mut self, head: &dyn fmt::Display, unification: Option<&Unification>) {
        // Tracing is best-effort; a failed sink never fails the proof.
        let _ = match unification {
            Some(u) => writeln!(self.sink, "{}\tTrue\t{}", head, u),
            None => writeln!(self.sink, "{}\tFalse", head),
        };
    }
}
