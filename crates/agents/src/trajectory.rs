//! Run trajectory record.

use serde::Serialize;

use crate::engine::EngineReport;

/// Summary of one agent run, persisted alongside any downloaded files.
#[derive(Debug, Clone, Serialize)]
pub struct Trajectory {
    pub duration_secs: f64,
    pub result: Option<String>,
    pub errors: Vec<String>,
    pub success: bool,
    pub steps: u32,
}

impl Trajectory {
    pub fn from_report(report: EngineReport) -> Self {
        Self {
            duration_secs: report.duration_secs,
            result: report.result,
            // Engines occasionally pad the list with empty strings.
            errors: report.errors.into_iter().filter(|e| !e.trim().is_empty()).collect(),
            success: report.success,
            steps: report.steps,
        }
    }

    /// Final answer text, if the run produced one.
    pub fn final_result(&self) -> Option<&str> {
        self.result.as_deref()
    }
}
