//! Serializable results of a run.

use serde::Serialize;

use postulate_explore::signal::DiscardedBranch;

use crate::execute::{Outcome, OutcomeKind};

#[derive(Debug, Clone, Serialize)]
pub struct InvocationReport {
    pub method: String,
    pub display_name: String,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InvocationReport {
    pub fn new(method: &str, display_name: String, outcome: &Outcome) -> Self {
        Self {
            method: method.to_string(),
            display_name,
            outcome: outcome.kind(),
            message: outcome.message(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscardReport {
    pub method: String,
    pub depth: usize,
    pub parameter: String,
    pub source: Option<String>,
    pub reason: String,
}

impl DiscardReport {
    pub fn new(method: &str, branch: &DiscardedBranch) -> Self {
        Self {
            method: method.to_string(),
            depth: branch.depth,
            parameter: branch.parameter.clone(),
            source: branch.source.clone(),
            reason: branch.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Passed => self.passed += 1,
            OutcomeKind::Skipped => self.skipped += 1,
            OutcomeKind::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub class: String,
    pub invocations: Vec<InvocationReport>,
    pub discarded: Vec<DiscardReport>,
    /// Methods whose invocations were cut short by the configured cap.
    pub truncated: Vec<String>,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            invocations: Vec::new(),
            discarded: Vec::new(),
            truncated: Vec::new(),
            summary: RunSummary::default(),
        }
    }

    pub fn push(&mut self, invocation: InvocationReport) {
        self.summary.record(invocation.outcome);
        self.invocations.push(invocation);
    }

    pub fn failures(&self) -> impl Iterator<Item = &InvocationReport> {
        self.invocations
            .iter()
            .filter(|r| r.outcome == OutcomeKind::Failed)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_each_outcome() {
        let mut report = RunReport::new("Arithmetic");
        report.push(InvocationReport::new("adds", "adds(1 <from a>)".into(), &Outcome::Passed));
        report.push(InvocationReport::new(
            "adds",
            "adds(null <from n>)".into(),
            &Outcome::Skipped { reason: "argument 0 is null".into() },
        ));
        assert_eq!(report.summary, RunSummary { passed: 1, skipped: 1, failed: 0 });
        assert_eq!(report.summary.total(), 2);
        assert!(!report.summary.has_failures());
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn test_json_shape() {
        let mut report = RunReport::new("Arithmetic");
        report.push(InvocationReport::new("adds", "adds(1 <from a>)".into(), &Outcome::Passed));
        report.discarded.push(DiscardReport::new(
            "adds",
            &DiscardedBranch {
                depth: 0,
                parameter: "arg0".into(),
                source: Some("broken".into()),
                reason: "offline".into(),
            },
        ));
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["class"], "Arithmetic");
        assert_eq!(json["invocations"][0]["outcome"], "passed");
        assert!(json["invocations"][0].get("message").is_none());
        assert_eq!(json["discarded"][0]["source"], "broken");
        assert_eq!(json["summary"]["passed"], 1);
    }
}
