use postulate_explore::signal::DiscardedBranch;

use crate::execute::{Outcome, OutcomeKind};

/// Receives invocation results as a run progresses.
///
/// Results arrive in enumeration order whatever the execution mode.
pub trait RunListener {
    /// Announces an invocation ahead of its `test_finished`. In parallel mode
    /// every invocation of a method has already run by the time this fires,
    /// so it only marks ordering there.
    fn test_started(&mut self, _display_name: &str) {}

    fn test_finished(&mut self, display_name: &str, outcome: &Outcome);

    fn discarded(&mut self, _method: &str, _branch: &DiscardedBranch) {}
}

/// Keeps every event it sees; handy in tests.
#[derive(Debug, Default)]
pub struct RecordingListener {
    pub started: Vec<String>,
    pub finished: Vec<(String, OutcomeKind)>,
    pub discarded: Vec<(String, DiscardedBranch)>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names_with(&self, kind: OutcomeKind) -> Vec<&str> {
        self.finished
            .iter()
            .filter(|(_, k)| *k == kind)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl RunListener for RecordingListener {
    fn test_started(&mut self, display_name: &str) {
        self.started.push(display_name.to_string());
    }

    fn test_finished(&mut self, display_name: &str, outcome: &Outcome) {
        self.finished.push((display_name.to_string(), outcome.kind()));
    }

    fn discarded(&mut self, method: &str, branch: &DiscardedBranch) {
        self.discarded.push((method.to_string(), branch.clone()));
    }
}

/// Ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentListener;

impl RunListener for SilentListener {
    fn test_finished(&mut self, _display_name: &str, _outcome: &Outcome) {}
}
