// Value Comparator
//
// Equivalence of two attribute values, dispatched on the value's shape tag:
// - Scalar: case-insensitive, whitespace-trimmed match
// - ScalarList: mutual containment (duplicates ignored, exact membership)
// - RecordList: every record of the first side has an exact match in the
//   second; the reverse direction is not checked

use fpc_common::{AttributeValue, Record};

/// Compare two values of (possibly) different shapes
///
/// Values with different shape tags are never equal.
pub fn values_equal(a: &AttributeValue, b: &AttributeValue) -> bool {
    match (a, b) {
        (AttributeValue::Scalar(a), AttributeValue::Scalar(b)) => scalars_equal(a, b),
        (AttributeValue::ScalarList(a), AttributeValue::ScalarList(b)) => scalar_lists_equal(a, b),
        (AttributeValue::RecordList(a), AttributeValue::RecordList(b)) => record_lists_equal(a, b),
        _ => false,
    }
}

/// Case-insensitive, whitespace-trimmed comparison
pub fn scalars_equal(a: &str, b: &str) -> bool {
    a.trim().to_uppercase() == b.trim().to_uppercase()
}

/// Every element of `a` is in `b` and vice versa
pub fn scalar_lists_equal(a: &[String], b: &[String]) -> bool {
    a.iter().all(|item| b.contains(item)) && b.iter().all(|item| a.contains(item))
}

/// Every record of `a` has an identical record in `b`
///
/// Deliberately one-directional: extra records in `b` do not make the
/// collections unequal.
pub fn record_lists_equal(a: &[Record], b: &[Record]) -> bool {
    a.iter().all(|record| b.contains(record))
}
