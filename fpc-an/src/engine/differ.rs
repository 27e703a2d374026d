// Pairwise Differ
//
// Produces the structured diff between two fingerprints. Every attribute of
// the first fingerprint is visited in category then attribute order; the
// weight table decides whether a difference is scored or ignored.

use super::comparator::values_equal;
use super::reconciler::reconcile;
use super::types::{AttributeChange, DiffOptions, DiffResult, RecordFieldPolicy, QUANTITY_FIELD};
use fpc_common::{AttributeKey, AttributeValue, Fingerprint, Record, Result, WeightTable};
use std::collections::BTreeSet;
use tracing::debug;

/// Pairwise differ
///
/// Stateless apart from its options; one instance can diff any number of
/// fingerprint pairs.
#[derive(Debug, Clone, Default)]
pub struct PairwiseDiffer {
    options: DiffOptions,
}

impl PairwiseDiffer {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Diff `a` against `b`
    ///
    /// **Algorithm:**
    /// 1. Reconcile schemas (missing category → error, missing attribute → skipped)
    /// 2. For each attribute of `a`: count it toward `total` when it is the
    ///    media attribute or scored by the table
    /// 3. Media attribute: device count check, then per-field detector
    /// 4. Anything else: value comparator; differences are scored or
    ///    ignored according to the table
    pub fn diff(&self, a: &Fingerprint, b: &Fingerprint, table: &WeightTable) -> Result<DiffResult> {
        let missing = reconcile(a, b)?;

        let mut result = DiffResult {
            source: a.name.clone(),
            target: b.name.clone(),
            missing: missing.iter().cloned().collect(),
            ..Default::default()
        };

        for (category, attribute, value) in a.attributes() {
            let is_media = attribute == self.options.media_attribute;
            let scored = table.is_scored(category, attribute);

            if is_media || scored {
                result.total += 1;
            }

            if missing.contains(&AttributeKey::new(category, attribute)) {
                continue;
            }
            let Some(other) = b.get(category, attribute) else {
                continue;
            };

            if let (true, Some(devices_a), Some(devices_b)) =
                (is_media, value.as_records(), other.as_records())
            {
                self.diff_media(category, devices_a, devices_b, &mut result);
                continue;
            }

            if values_equal(value, other) {
                continue;
            }

            let change = AttributeChange::new(category, attribute, value.clone(), other.clone());
            if is_media || scored {
                debug!(
                    category = %category,
                    attribute = %attribute,
                    shape = value.shape(),
                    "Scored change between {} and {}",
                    a.name,
                    b.name
                );
                result.changes.push(change);
                result.changed += 1;
            } else {
                debug!(category = %category, attribute = %attribute, "Ignored change");
                result.ignored_changes.push(change);
            }
        }

        Ok(result)
    }

    /// Media devices: count mismatch plus per-field changes, always scored
    fn diff_media(&self, category: &str, a: &[Record], b: &[Record], result: &mut DiffResult) {
        if a.len() != b.len() {
            debug!(
                category = %category,
                before = a.len(),
                after = b.len(),
                "Media device count changed"
            );
            result.changes.push(AttributeChange::new(
                category,
                self.options.media_change_name(QUANTITY_FIELD),
                AttributeValue::Scalar(a.len().to_string()),
                AttributeValue::Scalar(b.len().to_string()),
            ));
            result.changed += 1;
        }

        for field in changed_record_fields(a, b, &self.options.record_fields) {
            debug!(category = %category, field = %field, "Media device field changed");
            result.changes.push(AttributeChange::new(
                category,
                self.options.media_change_name(&field),
                AttributeValue::RecordList(a.to_vec()),
                AttributeValue::RecordList(b.to_vec()),
            ));
            result.changed += 1;
        }
    }
}

/// Tracked fields whose value changed between two record collections
///
/// For every record of `a` without an identical record in `b`, each tracked
/// field is flagged the first time its value is found in no record of `b`.
/// Stops as soon as every tracked field is flagged. Returned in
/// `policy.tracked` order.
pub fn changed_record_fields(a: &[Record], b: &[Record], policy: &RecordFieldPolicy) -> Vec<String> {
    let mut flagged: BTreeSet<&str> = BTreeSet::new();

    for record in a {
        if policy.tracked.iter().all(|f| flagged.contains(f.as_str())) {
            break;
        }
        if b.contains(record) {
            continue;
        }

        for (field, value) in record {
            if !policy.inspects(field) || flagged.contains(field.as_str()) {
                continue;
            }
            let exists = b.iter().any(|other| other.get(field) == Some(value));
            if !exists {
                flagged.insert(field.as_str());
            }
        }
    }

    policy
        .tracked
        .iter()
        .filter(|f| flagged.contains(f.as_str()))
        .cloned()
        .collect()
}
