//! Three-fingerprint change analysis
//!
//! **Purpose:** Run the session diff (1 vs 2) and the cross-session diff
//! (1 vs 3) and score them together.

use crate::engine::{DiffOptions, DiffResult, PairwiseDiffer, ScoreAggregator, ScoreOutcome};
use fpc_common::{Fingerprint, Result, WeightTable};
use serde::Serialize;
use tracing::info;

/// Baseline plus its two re-measurements
#[derive(Debug, Clone)]
pub struct FingerprintTriple {
    /// Fingerprint 1
    pub baseline: Fingerprint,
    /// Fingerprint 2, re-measured in the same browser session
    pub session: Fingerprint,
    /// Fingerprint 3, re-measured in a separate browser session
    pub cross_session: Fingerprint,
}

/// Diffs and score of one triple
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Differences during the session
    pub session: DiffResult,
    /// Differences between sessions
    pub cross_session: DiffResult,
    pub outcome: ScoreOutcome,
}

/// Analysis driver
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    differ: PairwiseDiffer,
    aggregator: ScoreAggregator,
}

impl Analyzer {
    pub fn new(options: DiffOptions) -> Self {
        Self {
            differ: PairwiseDiffer::new(options.clone()),
            aggregator: ScoreAggregator::new(options),
        }
    }

    pub fn options(&self) -> &DiffOptions {
        self.differ.options()
    }

    /// Diff both pairs and score them
    pub fn analyze(&self, triple: &FingerprintTriple, table: &WeightTable) -> Result<Analysis> {
        info!(
            baseline = %triple.baseline.name,
            session = %triple.session.name,
            cross_session = %triple.cross_session.name,
            "Analyzing fingerprint triple"
        );

        let session = self.differ.diff(&triple.baseline, &triple.session, table)?;
        let cross_session = self
            .differ
            .diff(&triple.baseline, &triple.cross_session, table)?;
        let outcome = self.aggregator.score(&session, &cross_session, table)?;

        Ok(Analysis {
            session,
            cross_session,
            outcome,
        })
    }
}
