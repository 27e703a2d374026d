//! # Fingerprint Value Statistics (fpc-st)
//!
//! **Purpose:** Describe how diverse the collected fingerprints are: for
//! every scored attribute, which values occurred and how often, per browser
//! and pv.

pub mod statistics;
pub mod summary;
pub mod walker;

pub use statistics::{
    bucket_values_equal, AttributeSummary, Bucket, StatisticsCollector, StatisticsSummary,
    ValueStatistics,
};
pub use summary::{format_distribution, unique_distribution, UniqueCount, UniqueDistribution};
pub use walker::{CaptureFile, CaptureScanner};

/// Raw bucket file name
pub const STATISTICS_RAW_FILE: &str = "statistics_raw.json";

/// Summary file name
pub const STATISTICS_FILE: &str = "statistics.json";
