//! Depth-first expansion of partial assignments into complete ones.
//!
//! Enumeration order is parameter declaration order outermost and candidate
//! order innermost. The search keeps an explicit stack of frames instead of
//! recursing; each frame holds a state and the candidates still to try for
//! its next parameter, and a candidate's value is only materialized when its
//! turn comes.
//!
//! Candidate sources must be finite, otherwise expansion does not terminate.

use postulate_model::source::PotentialAssignment;

use crate::assignment::Assignments;
use crate::signal::DiscardedBranch;

/// Configuration for one expansion.
#[derive(Debug, Clone, Default)]
pub struct ExpansionConfig {
    /// Maximum number of complete assignments to produce (0 = all).
    pub max_assignments: usize,
}

/// Result of expanding one starting state.
#[derive(Debug)]
pub struct Expansion {
    /// Complete assignments in enumeration order.
    pub assignments: Vec<Assignments>,
    /// Branches dropped because a candidate could not be produced.
    pub discarded: Vec<DiscardedBranch>,
    /// States visited, complete or not.
    pub nodes_visited: u64,
    /// Whether `max_assignments` stopped the search early.
    pub truncated: bool,
}

struct Frame {
    state: Assignments,
    pending: std::vec::IntoIter<PotentialAssignment>,
}

/// Expand `start` into every complete assignment reachable from it.
pub fn expand(start: Assignments, config: &ExpansionConfig) -> Expansion {
    let mut search = Search {
        stack: Vec::new(),
        expansion: Expansion {
            assignments: Vec::new(),
            discarded: Vec::new(),
            nodes_visited: 0,
            truncated: false,
        },
        limit: config.max_assignments,
    };

    search.enter(start);
    while !search.limit_reached() {
        let step = match search.stack.last_mut() {
            None => break,
            Some(frame) => frame
                .pending
                .next()
                .map(|source| (frame.state.assign_next(&source), source, frame.state.bindings().len())),
        };
        match step {
            None => {
                search.stack.pop();
            }
            Some((Ok(next), _, _)) => search.enter(next),
            Some((Err(e), source, depth)) => {
                let parameter = search.parameter_label(depth);
                search.discard(DiscardedBranch {
                    depth,
                    parameter,
                    source: Some(source.name().to_string()),
                    reason: e.to_string(),
                });
            }
        }
    }
    // Exhausted frames may still sit on the stack when the cap hits the last leaf.
    search.expansion.truncated = search.limit_reached()
        && search
            .stack
            .iter()
            .any(|frame| !frame.pending.as_slice().is_empty());

    let expansion = search.expansion;
    tracing::debug!(
        complete = expansion.assignments.len(),
        discarded = expansion.discarded.len(),
        nodes = expansion.nodes_visited,
        truncated = expansion.truncated,
        "expanded assignments"
    );
    expansion
}

/// Convenience: expand without a cap and keep only the complete assignments.
pub fn expand_all(start: Assignments) -> Vec<Assignments> {
    expand(start, &ExpansionConfig::default()).assignments
}

struct Search {
    stack: Vec<Frame>,
    expansion: Expansion,
    limit: usize,
}

impl Search {
    fn limit_reached(&self) -> bool {
        self.limit > 0 && self.expansion.assignments.len() >= self.limit
    }

    /// Visit a state: record it if complete, otherwise push a frame over its candidates.
    fn enter(&mut self, state: Assignments) {
        self.expansion.nodes_visited += 1;
        if state.is_complete() {
            self.expansion.assignments.push(state);
            return;
        }
        match state.potentials_for_next() {
            Ok(potentials) => self.stack.push(Frame {
                state,
                pending: potentials.into_iter(),
            }),
            Err(e) => {
                let depth = state.bindings().len();
                let parameter = state
                    .next_unassigned()
                    .map(|sig| sig.label())
                    .unwrap_or_default();
                self.discard(DiscardedBranch {
                    depth,
                    parameter,
                    source: None,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn parameter_label(&self, depth: usize) -> String {
        self.stack
            .last()
            .and_then(|frame| frame.state.next_unassigned())
            .map(|sig| sig.label())
            .unwrap_or_else(|| format!("arg{depth}"))
    }

    fn discard(&mut self, branch: DiscardedBranch) {
        tracing::warn!(
            depth = branch.depth,
            parameter = %branch.parameter,
            source = ?branch.source,
            reason = %branch.reason,
            "discarding assignment branch"
        );
        self.expansion.discarded.push(branch);
    }
}
