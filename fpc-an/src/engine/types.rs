// Engine data contracts
//
// Types passed between the comparison stages: the differ produces
// DiffResult, the aggregator consumes two of them and produces ScoreOutcome.

use fpc_common::config::MediaConfig;
use fpc_common::{AttributeKey, AttributeValue};
use serde::Serialize;
use std::collections::BTreeSet;

/// Suffix of the change emitted when the device count differs
pub const QUANTITY_FIELD: &str = "Quantity";

/// One detected attribute difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeChange {
    pub category: String,
    /// Attribute name, or `"<media attribute>: <field>"` for device changes
    pub name: String,
    pub before: AttributeValue,
    pub after: AttributeValue,
}

impl AttributeChange {
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        before: AttributeValue,
        after: AttributeValue,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            before,
            after,
        }
    }

    /// True when both changes concern the same (category, name)
    pub fn same_attribute(&self, other: &AttributeChange) -> bool {
        self.category == other.category && self.name == other.name
    }

    pub fn key(&self) -> AttributeKey {
        AttributeKey::new(self.category.as_str(), self.name.as_str())
    }
}

/// Differences between two fingerprints
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffResult {
    /// Name of the fingerprint compared from
    pub source: String,
    /// Name of the fingerprint compared to
    pub target: String,
    /// Attributes counted toward the denominator
    pub total: usize,
    /// Number of scored changes
    pub changed: usize,
    /// Scored changes
    pub changes: Vec<AttributeChange>,
    /// Changes observed but excluded from scoring
    pub ignored_changes: Vec<AttributeChange>,
    /// Attributes present on one side only (excluded from comparison)
    pub missing: Vec<AttributeKey>,
}

impl DiffResult {
    /// True when no change of any kind was found
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty() && self.ignored_changes.is_empty()
    }
}

/// Which record fields the per-field change detector inspects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFieldPolicy {
    /// Fields that can raise a change, in report order
    pub tracked: Vec<String>,
    /// Fields expected to vary between measurements
    pub excluded: BTreeSet<String>,
}

impl Default for RecordFieldPolicy {
    fn default() -> Self {
        Self::from(&MediaConfig::default())
    }
}

impl From<&MediaConfig> for RecordFieldPolicy {
    fn from(config: &MediaConfig) -> Self {
        Self {
            tracked: config.tracked_fields.clone(),
            excluded: config.excluded_fields.iter().cloned().collect(),
        }
    }
}

impl RecordFieldPolicy {
    /// True when `field` may raise a change
    pub fn inspects(&self, field: &str) -> bool {
        !self.excluded.contains(field) && self.tracked.iter().any(|f| f == field)
    }
}

/// Differ configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    /// Record-list attribute with the special per-field treatment
    pub media_attribute: String,
    pub record_fields: RecordFieldPolicy,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self::from(&MediaConfig::default())
    }
}

impl From<&MediaConfig> for DiffOptions {
    fn from(config: &MediaConfig) -> Self {
        Self {
            media_attribute: config.attribute.clone(),
            record_fields: RecordFieldPolicy::from(config),
        }
    }
}

impl DiffOptions {
    /// Change name for one media field, e.g. `"Media Devices: label"`
    pub fn media_change_name(&self, field: &str) -> String {
        format!("{}: {}", self.media_attribute, field)
    }

    /// True for changes derived from the media attribute
    pub fn is_media_change(&self, name: &str) -> bool {
        name.strip_prefix(self.media_attribute.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(": "))
    }
}

/// Result of scoring a session diff and a cross-session diff
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreOutcome {
    /// Points-weighted change, percent rounded to two decimals
    pub points_percent: f64,
    /// Raw change, percent rounded to two decimals
    pub raw_percent: f64,
    /// Points awarded
    pub points: u64,
    /// Maximum achievable points (bonus applied)
    pub max_points: f64,
    /// Changes counted after linked-group suppression
    pub counted: usize,
    /// Maximum countable attributes (bonus applied)
    pub max_attributes: f64,
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
