//! Aggregated verdicts for a suite run.

use std::fmt::Write as _;

use serde::Serialize;

use crate::scenario::{ScenarioId, ScenarioResult, Verdict};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    results: Vec<ScenarioResult>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: Summary,
    results: &'a [ScenarioResult],
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ScenarioResult) {
        self.results.push(result);
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = ScenarioResult>) {
        self.results.extend(results);
    }

    /// All results in the order they were produced.
    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }

    pub fn find(&self, instance: &str, scenario: &ScenarioId) -> Option<&ScenarioResult> {
        self.results
            .iter()
            .find(|r| r.instance() == instance && r.scenario() == scenario)
    }

    pub fn for_instance<'a>(&'a self, instance: &'a str) -> impl Iterator<Item = &'a ScenarioResult> {
        self.results.iter().filter(move |r| r.instance() == instance)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|r| r.verdict() == Verdict::Fail)
    }

    pub fn summary(&self) -> Summary {
        let passed = self.results.iter().filter(|r| r.passed()).count();
        Summary {
            total: self.results.len(),
            passed,
            failed: self.results.len() - passed,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(ScenarioResult::passed)
    }

    /// Scenario ids in first-seen order.
    fn scenarios(&self) -> Vec<&ScenarioId> {
        let mut ids: Vec<&ScenarioId> = Vec::new();
        for r in &self.results {
            if !ids.contains(&r.scenario()) {
                ids.push(r.scenario());
            }
        }
        ids
    }

    /// Plain-text report grouped by scenario.
    pub fn render_text(&self) -> String {
        let width = self
            .results
            .iter()
            .map(|r| r.instance().len())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for id in self.scenarios() {
            let _ = writeln!(out, "\n=== {} ===", id);
            for r in self.results.iter().filter(|r| r.scenario() == id) {
                let _ = writeln!(
                    out,
                    "{:<width$}  {}  {}",
                    r.instance(),
                    r.verdict(),
                    r.detail(),
                    width = width
                );
            }
        }

        let s = self.summary();
        let _ = writeln!(
            out,
            "\n[*] {} passed, {} failed, {} total",
            s.passed, s.failed, s.total
        );
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&JsonReport {
            summary: self.summary(),
            results: &self.results,
        })
    }

    pub fn print(&self) {
        print!("{}", self.render_text());
    }
}
