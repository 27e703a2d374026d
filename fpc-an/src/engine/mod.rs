//! # Comparison Engine
//!
//! Pairwise fingerprint comparison and change scoring.
//!
//! **Purpose:** Decide which attributes changed between two fingerprints, and
//! turn a session diff plus a cross-session diff into points-weighted and raw
//! percentages.
//!
//! **Pipeline:**
//! - reconciler: align schemas, collect attributes present on one side only
//! - comparator: shape-dispatched value equivalence
//! - differ: per-attribute walk, media device field detection
//! - aggregator: dedup, linked-group suppression, weighting

pub mod aggregator;
pub mod comparator;
pub mod differ;
pub mod linked;
pub mod reconciler;
pub mod types;

pub use aggregator::{dedup_cross_session, MaxTotals, ScoreAggregator};
pub use comparator::values_equal;
pub use differ::{changed_record_fields, PairwiseDiffer};
pub use linked::{first_linked_wins, LinkedGroupFilter};
pub use reconciler::{find_missing, reconcile};
pub use types::{
    round2, AttributeChange, DiffOptions, DiffResult, RecordFieldPolicy, ScoreOutcome,
    QUANTITY_FIELD,
};
