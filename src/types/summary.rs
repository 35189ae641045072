use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counters and warnings describing one scoring run. Rendered by
/// `report::render_summary` as Markdown or JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated: DateTime<Utc>,
    pub input_rows: usize,
    pub rows_scored: usize,
    pub rows_dropped_missing_anchor: usize,
    pub columns_normalized: Vec<String>,
    pub columns_skipped: Vec<String>,
    pub warnings: Vec<String>,
}

impl RunSummary {
    pub fn new() -> Self {
        RunSummary {
            generated: Utc::now(),
            input_rows: 0,
            rows_scored: 0,
            rows_dropped_missing_anchor: 0,
            columns_normalized: Vec::new(),
            columns_skipped: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        RunSummary::new()
    }
}
