// Score Aggregator
//
// Merges a session diff (fingerprint 1 vs 2) and a cross-session diff
// (fingerprint 1 vs 3) into two percentages:
// - points: awarded weight-group points / maximum achievable points
// - raw: counted changes / maximum countable attributes
//
// Maximum totals come from the weight table alone. Both the maximum pass and
// the award pass use first-linked-wins suppression, in table order and in
// change order respectively.

use super::linked::first_linked_wins;
use super::types::{round2, AttributeChange, DiffOptions, DiffResult, ScoreOutcome};
use fpc_common::{AttributeKey, Error, Result, WeightEntry, WeightTable};
use tracing::info;

/// Score aggregator
#[derive(Debug, Clone, Default)]
pub struct ScoreAggregator {
    options: DiffOptions,
}

/// Maximum achievable totals for a weight table (bonus applied)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxTotals {
    pub points: f64,
    pub attributes: f64,
}

impl ScoreAggregator {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    /// Maximum points and attribute count the table can award
    ///
    /// Every scored entry contributes its group's points once, except linked
    /// siblings of an entry already counted. Both totals are multiplied by
    /// the bonus.
    pub fn max_totals(&self, table: &WeightTable) -> Result<MaxTotals> {
        let scored = table.entries().filter(|(_, entry)| entry.is_scored());
        let admitted = first_linked_wins(scored, |(key, entry)| Ok((key.clone(), *entry)))?;

        let mut points: u64 = 0;
        for a in &admitted {
            points += u64::from(group_points(table, &a.key, a.entry)?);
        }

        Ok(MaxTotals {
            points: points as f64 * table.bonus(),
            attributes: admitted.len() as f64 * table.bonus(),
        })
    }

    /// Score a session diff and a cross-session diff
    ///
    /// **Algorithm:**
    /// 1. Maximum totals from the table; zero maxima are a configuration error
    /// 2. Drop from the cross-session changes, for each session change, the
    ///    first change with the same (category, name)
    /// 3. Award session changes, then remaining cross-session changes, in
    ///    one first-linked-wins pass
    /// 4. Percentages rounded to two decimals
    pub fn score(
        &self,
        session: &DiffResult,
        cross_session: &DiffResult,
        table: &WeightTable,
    ) -> Result<ScoreOutcome> {
        let max = self.max_totals(table)?;
        if max.points <= 0.0 || max.attributes <= 0.0 {
            return Err(Error::WeightTable(format!(
                "maximum achievable score is zero (points = {}, attributes = {}); check weight groups and bonus",
                max.points, max.attributes
            )));
        }

        let cross = dedup_cross_session(&session.changes, &cross_session.changes);

        let admitted = first_linked_wins(session.changes.iter().chain(cross), |change| {
            self.weight_for(change, table)
        })?;

        let mut points: u64 = 0;
        for a in &admitted {
            points += u64::from(group_points(table, &a.key, a.entry)?);
        }
        let counted = admitted.len();

        let outcome = ScoreOutcome {
            points_percent: round2(points as f64 / max.points * 100.0),
            raw_percent: round2(counted as f64 / max.attributes * 100.0),
            points,
            max_points: max.points,
            counted,
            max_attributes: max.attributes,
        };

        info!(
            "RAW: {}/{} ({}%)",
            counted, max.attributes, outcome.raw_percent
        );
        info!(
            "SCORE: {}/{} ({}%)",
            points, max.points, outcome.points_percent
        );

        Ok(outcome)
    }

    /// Weight key and entry for an observed change
    ///
    /// Media sub-changes (`"Media Devices: label"`) without their own entry
    /// are counted as the media attribute itself, so at most one of them is
    /// awarded, matching the single entry in the maximum.
    fn weight_for<'w>(
        &self,
        change: &AttributeChange,
        table: &'w WeightTable,
    ) -> Result<(AttributeKey, &'w WeightEntry)> {
        let mut key = change.key();

        let mut entry = table.entry(&change.category, &change.name);
        if entry.is_none() && self.options.is_media_change(&change.name) {
            key = AttributeKey::new(change.category.as_str(), self.options.media_attribute.as_str());
            entry = table.entry(&key.category, &key.attribute);
        }

        match entry {
            Some(entry) if entry.is_scored() => Ok((key, entry)),
            _ => Err(Error::WeightTable(format!(
                "scored change {} has no weight group",
                change.key()
            ))),
        }
    }
}

/// Cross-session changes not already explained by a session change
///
/// Each session change removes at most one cross-session change.
pub fn dedup_cross_session<'a>(
    session: &[AttributeChange],
    cross_session: &'a [AttributeChange],
) -> Vec<&'a AttributeChange> {
    let mut remaining: Vec<&AttributeChange> = cross_session.iter().collect();
    for change in session {
        if let Some(pos) = remaining.iter().position(|c| c.same_attribute(change)) {
            remaining.remove(pos);
        }
    }
    remaining
}

fn group_points(table: &WeightTable, key: &AttributeKey, entry: &WeightEntry) -> Result<u32> {
    let group = entry
        .group
        .as_deref()
        .ok_or_else(|| Error::WeightTable(format!("{} has no weight group", key)))?;
    table.points_for(group).ok_or_else(|| {
        Error::WeightTable(format!(
            "weight group '{}' used by {} has no point value",
            group, key
        ))
    })
}
