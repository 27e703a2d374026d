// Linked-group suppression ("first linked attribute wins")
//
// Attributes that always change together are declared as linked siblings in
// the weight table. Within one counting pass an attribute is admitted unless
// it, or one of its linked siblings, was already admitted. The same utility
// drives the maximum-score pass over the table and the award pass over observed
// changes, so numerator and denominator count the same way.

use fpc_common::{AttributeKey, Result, WeightEntry};
use std::collections::BTreeSet;

/// Seen-set for one counting pass
#[derive(Debug, Default)]
pub struct LinkedGroupFilter {
    seen: BTreeSet<AttributeKey>,
}

impl LinkedGroupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `key` unless it or a linked sibling was admitted earlier
    ///
    /// Admitted keys are remembered; suppressed keys are not.
    pub fn admit(&mut self, key: &AttributeKey, linked: &[AttributeKey]) -> bool {
        if self.seen.contains(key) || linked.iter().any(|sibling| self.seen.contains(sibling)) {
            return false;
        }
        self.seen.insert(key.clone());
        true
    }
}

/// One item that survived suppression
#[derive(Debug, Clone)]
pub struct Admitted<'w, T> {
    pub item: T,
    pub key: AttributeKey,
    pub entry: &'w WeightEntry,
}

/// Filter `items` in order, keeping the first of every linked group
///
/// `weight_of` extracts each item's key and weight entry; an error from it
/// aborts the pass.
pub fn first_linked_wins<'w, T, I, F>(items: I, mut weight_of: F) -> Result<Vec<Admitted<'w, T>>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> Result<(AttributeKey, &'w WeightEntry)>,
{
    let mut filter = LinkedGroupFilter::new();
    let mut admitted = Vec::new();

    for item in items {
        let (key, entry) = weight_of(&item)?;
        if filter.admit(&key, &entry.linked) {
            admitted.push(Admitted { item, key, entry });
        }
    }

    Ok(admitted)
}
