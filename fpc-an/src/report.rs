//! Report generation and formatting
//!
//! **Purpose:** CLI output and JSON export of an analysis run.

use crate::analysis::Analysis;
use crate::engine::{AttributeChange, DiffResult, ScoreOutcome};
use fpc_common::config::write_atomic;
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Complete analysis run report
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Run metadata
    pub session: SessionInfo,

    /// Capture folder analyzed
    pub source: PathBuf,

    /// Browser and pv derived from the source, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pv: Option<String>,

    /// Diffs and score
    pub analysis: Analysis,
}

/// Run metadata
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    /// Unique id of this run
    pub run_id: Uuid,

    /// Run timestamp (ISO 8601)
    pub timestamp: String,

    /// Tool version
    pub version: String,
}

impl AnalysisReport {
    pub fn new(source: impl Into<PathBuf>, analysis: Analysis) -> Self {
        Self {
            session: SessionInfo {
                run_id: Uuid::new_v4(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            source: source.into(),
            browser: None,
            pv: None,
            analysis,
        }
    }

    pub fn with_browser_and_pv(mut self, browser: impl Into<String>, pv: impl Into<String>) -> Self {
        self.browser = Some(browser.into());
        self.pv = Some(pv.into());
        self
    }

    /// Export report to JSON file (temp file + rename)
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> fpc_common::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(path.as_ref(), json.as_bytes())
    }
}

/// CLI formatter for analysis results
pub struct CliFormatter;

impl CliFormatter {
    /// `RAW:` and `SCORE:` lines
    ///
    /// Example: `SCORE: 10/20 (50%)`
    pub fn format_outcome(outcome: &ScoreOutcome) -> String {
        format!(
            "RAW: {}/{} ({}%)\nSCORE: {}/{} ({}%)",
            outcome.counted,
            outcome.max_attributes,
            outcome.raw_percent,
            outcome.points,
            outcome.max_points,
            outcome.points_percent
        )
    }

    /// One diff: totals, scored changes, ignored changes
    pub fn format_diff(title: &str, diff: &DiffResult) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n------------- {} -------------\n\n", title));
        output.push_str(&format!("Number of attributes: {}\n", diff.total));
        output.push_str(&format!("Number of changed attributes: {}\n", diff.changed));

        output.push_str("\nCHANGES:\n");
        output.push_str(&Self::format_changes(&diff.changes));

        output.push_str("\nIGNORED CHANGES:\n");
        output.push_str(&Self::format_changes(&diff.ignored_changes));

        if !diff.missing.is_empty() {
            output.push_str("\nMISSING:\n");
            for key in &diff.missing {
                output.push_str(&format!("{} - {}\n", key.category, key.attribute));
            }
        }

        output
    }

    /// Both diffs of an analysis
    pub fn format_debug(analysis: &Analysis) -> String {
        let mut output = Self::format_diff("DURING SESSION", &analysis.session);
        output.push_str(&Self::format_diff("BETWEEN SESSIONS", &analysis.cross_session));
        output.push_str("\n------------------------------------------\n");
        output
    }

    fn format_changes(changes: &[AttributeChange]) -> String {
        changes
            .iter()
            .map(|c| format!("{} - {}\n", c.category, c.name))
            .collect()
    }
}
