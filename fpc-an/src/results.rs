//! Analysis results history
//!
//! Accumulated scores per browser and prefixed version (pv), stored as one
//! JSON document:
//!
//! ```json
//! { "<browser>": { "<pv>": {
//!     "test_results": [..], "pointsystem_average": 0.0,
//!     "raw_results": [..], "raw_average": 0.0 } } }
//! ```

use crate::engine::{round2, ScoreOutcome};
use fpc_common::config::write_atomic;
use fpc_common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Component, Path};
use tracing::{debug, info};

/// Scores recorded for one browser and pv
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Points-weighted percentages, one per run
    #[serde(default)]
    pub test_results: Vec<f64>,
    #[serde(default)]
    pub pointsystem_average: f64,
    /// Raw percentages, one per run
    #[serde(default)]
    pub raw_results: Vec<f64>,
    #[serde(default)]
    pub raw_average: f64,
    /// Fields written by other tools, preserved on save
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ResultEntry {
    /// Append one run and recompute both averages
    pub fn push(&mut self, outcome: &ScoreOutcome) {
        self.test_results.push(outcome.points_percent);
        self.raw_results.push(outcome.raw_percent);
        self.pointsystem_average = average(&self.test_results);
        self.raw_average = average(&self.raw_results);
    }

    pub fn runs(&self) -> usize {
        self.test_results.len()
    }
}

/// browser → pv → entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultsHistory {
    browsers: BTreeMap<String, BTreeMap<String, ResultEntry>>,
}

impl ResultsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the history; a missing file is an empty history
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No results history yet");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the history atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(path, json.as_bytes())?;
        info!(path = %path.display(), "Saved analysis results");
        Ok(())
    }

    /// Record one run, creating the browser/pv entry when absent
    pub fn record(&mut self, browser: &str, pv: &str, outcome: &ScoreOutcome) -> &ResultEntry {
        let entry = self
            .browsers
            .entry(browser.to_string())
            .or_default()
            .entry(pv.to_string())
            .or_default();
        entry.push(outcome);
        entry
    }

    pub fn entry(&self, browser: &str, pv: &str) -> Option<&ResultEntry> {
        self.browsers.get(browser).and_then(|pvs| pvs.get(pv))
    }

    pub fn is_empty(&self) -> bool {
        self.browsers.is_empty()
    }
}

/// Browser and pv of a capture folder (`…/<pv>/<browser>`)
pub fn browser_and_pv(source: &Path) -> Result<(String, String)> {
    let mut components = source
        .components()
        .rev()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        });

    match (components.next(), components.next()) {
        (Some(browser), Some(pv)) => Ok((browser, pv)),
        _ => Err(Error::InvalidInput(format!(
            "cannot derive browser and pv from '{}', expected .../<pv>/<browser>",
            source.display()
        ))),
    }
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    round2(values.iter().sum::<f64>() / values.len() as f64)
}
