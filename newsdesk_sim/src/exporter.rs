//! Run report and JSON export.
//!
//! A report carries the full event journal plus a handful of derived counts,
//! so a run can be inspected or diffed after the fact.

use crate::error::SimError;
use newsdesk_core::{JournalEntry, PanelEvent, SimulationConfig};
use newsdesk_env::CommentatorId;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// Outcome of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Scenario name, if the run came from a preset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,

    /// Seed of the random source (0 for entropy or scripted sources)
    pub seed: u64,

    /// Parameters the run used
    pub config: SimulationConfig,

    /// Questions the moderator finished
    pub rounds_completed: usize,

    /// Breaking-news ticks the driver ran
    pub ticks: u64,

    /// Wall-clock duration of the run
    pub elapsed_ms: u64,

    /// Every journaled event, in record order
    pub events: Vec<JournalEntry>,
}

impl SimulationReport {
    /// Tags the report with the preset it came from.
    pub fn with_scenario(mut self, name: &str) -> Self {
        self.scenario = Some(name.to_string());
        self
    }

    /// Decisions to answer.
    pub fn answers(&self) -> usize {
        self.count(|e| matches!(e, PanelEvent::Queued { .. }))
    }

    /// Decisions to pass.
    pub fn skips(&self) -> usize {
        self.count(|e| matches!(e, PanelEvent::Skipped { .. }))
    }

    /// Speeches that ran their full length.
    pub fn finished_speeches(&self) -> usize {
        self.count(|e| matches!(e, PanelEvent::Finished { .. }))
    }

    /// Speeches interrupted by breaking news.
    pub fn cut_short(&self) -> usize {
        self.count(|e| matches!(e, PanelEvent::CutShort { .. }))
    }

    pub fn news_activations(&self) -> usize {
        self.count(|e| matches!(e, PanelEvent::BreakingNewsStarted))
    }

    /// Commentators in the order they took the floor for `question`.
    pub fn speaking_order(&self, question: usize) -> Vec<CommentatorId> {
        self.ids_where(question, |e| matches!(e, PanelEvent::Speaking { .. }))
    }

    /// Commentators in the order they joined the ready queue for `question`.
    pub fn queue_order(&self, question: usize) -> Vec<CommentatorId> {
        self.ids_where(question, |e| matches!(e, PanelEvent::Queued { .. }))
    }

    /// Renders the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the report to a JSON file.
    pub fn write_to_file(&self, path: &str) -> Result<(), SimError> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    fn count(&self, pred: impl Fn(&PanelEvent) -> bool) -> usize {
        self.events.iter().filter(|entry| pred(&entry.event)).count()
    }

    fn ids_where(&self, question: usize, pred: impl Fn(&PanelEvent) -> bool) -> Vec<CommentatorId> {
        self.events
            .iter()
            .map(|entry| &entry.event)
            .filter(|e| e.question() == Some(question) && pred(e))
            .filter_map(PanelEvent::commentator)
            .collect()
    }
}
