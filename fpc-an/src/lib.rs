//! # Fingerprint Change Analysis Library (fpc-an)
//!
//! Compares three browser fingerprints captured for one browser/pv and
//! reports how much of the fingerprint changed.
//!
//! **Purpose:** Measure the effectiveness of fingerprint randomization:
//! fingerprint 1 against a same-session re-measurement (2) and against a
//! separate-session re-measurement (3), weighted by a point system.
//!
//! **Architecture:** `engine` is pure and path-free; `loader`, `results` and
//! `report` own all file access.

pub mod analysis;
pub mod engine;
pub mod loader;
pub mod report;
pub mod results;

pub use analysis::{Analysis, Analyzer, FingerprintTriple};
pub use engine::{DiffOptions, DiffResult, ScoreOutcome};
pub use report::{AnalysisReport, CliFormatter};
pub use results::{browser_and_pv, ResultsHistory};
