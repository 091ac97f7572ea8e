//! Non-fatal signals emitted while expanding assignments.
//!
//! A discarded branch never fails the enumeration; it is recorded here so a
//! broken supplier can still be diagnosed.

use std::fmt;

/// A search branch that contributed nothing because a candidate could not be produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscardedBranch {
    /// Number of parameters already bound when the branch was dropped.
    pub depth: usize,
    /// Label of the parameter being assigned.
    pub parameter: String,
    /// The candidate source that failed, or `None` when listing the
    /// candidates themselves failed (the whole subtree is dropped).
    pub source: Option<String>,
    pub reason: String,
}

impl fmt::Display for DiscardedBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(
                f,
                "discarded branch at depth {} ({} <- {}): {}",
                self.depth, self.parameter, source, self.reason
            ),
            None => write!(
                f,
                "discarded subtree at depth {} ({}): {}",
                self.depth, self.parameter, self.reason
            ),
        }
    }
}
