// Attribute Reconciler
//
// Aligns two fingerprints before comparison. A missing category is a fatal
// schema mismatch; a missing attribute is recorded and skipped.

use fpc_common::{AttributeKey, Error, Fingerprint, Result};
use std::collections::BTreeSet;
use tracing::warn;

/// Attributes present in `a` but absent from `b`'s matching category
///
/// # Errors
/// `Error::SchemaMismatch` when a whole category of `a` is absent in `b`.
pub fn find_missing(a: &Fingerprint, b: &Fingerprint) -> Result<Vec<AttributeKey>> {
    let mut missing = Vec::new();

    for (category, attributes) in &a.data {
        let Some(other) = b.category(category) else {
            return Err(Error::SchemaMismatch {
                category: category.clone(),
                present_in: a.name.clone(),
                missing_from: b.name.clone(),
            });
        };

        for attribute in attributes.keys() {
            if !other.contains_key(attribute) {
                warn!(
                    category = %category,
                    attribute = %attribute,
                    "Attribute in {} does not exist in {}",
                    a.name,
                    b.name
                );
                missing.push(AttributeKey::new(category.as_str(), attribute.as_str()));
            }
        }
    }

    Ok(missing)
}

/// Union of attributes missing in either direction
pub fn reconcile(a: &Fingerprint, b: &Fingerprint) -> Result<BTreeSet<AttributeKey>> {
    let mut missing: BTreeSet<AttributeKey> = find_missing(a, b)?.into_iter().collect();
    missing.extend(find_missing(b, a)?);
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fingerprint(name: &str, doc: serde_json::Value) -> Fingerprint {
        Fingerprint::from_json(name, &doc, &[]).unwrap()
    }

    #[test]
    fn test_identical_schema_has_nothing_missing() {
        let a = fingerprint("a", json!({"C": {"x": "1", "y": "2"}}));
        let b = fingerprint("b", json!({"C": {"x": "3", "y": "4"}}));

        assert!(find_missing(&a, &b).unwrap().is_empty());
        assert!(reconcile(&a, &b).unwrap().is_empty());
    }

    #[test]
    fn test_missing_attribute_reported() {
        let a = fingerprint("a", json!({"C": {"x": "1", "y": "2"}}));
        let b = fingerprint("b", json!({"C": {"x": "1"}}));

        let missing = find_missing(&a, &b).unwrap();
        assert_eq!(missing, vec![AttributeKey::new("C", "y")]);
        assert!(find_missing(&b, &a).unwrap().is_empty());
    }

    #[test]
    fn test_reconcile_unions_both_directions() {
        let a = fingerprint("a", json!({"C": {"x": "1", "y": "2"}}));
        let b = fingerprint("b", json!({"C": {"x": "1", "z": "3"}}));

        let missing = reconcile(&a, &b).unwrap();
        assert_eq!(missing.len(), 2);
        assert!(missing.contains(&AttributeKey::new("C", "y")));
        assert!(missing.contains(&AttributeKey::new("C", "z")));
    }

    #[test]
    fn test_missing_category_is_fatal() {
        let a = fingerprint("fingerprint_1.json", json!({"C": {"x": "1"}, "D": {"y": "2"}}));
        let b = fingerprint("fingerprint_2.json", json!({"C": {"x": "1"}}));

        let err = find_missing(&a, &b).unwrap_err();
        match err {
            Error::SchemaMismatch {
                category,
                present_in,
                missing_from,
            } => {
                assert_eq!(category, "D");
                assert_eq!(present_in, "fingerprint_1.json");
                assert_eq!(missing_from, "fingerprint_2.json");
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_category_detected_in_reverse_direction() {
        let a = fingerprint("a", json!({"C": {"x": "1"}}));
        let b = fingerprint("b", json!({"C": {"x": "1"}, "D": {"y": "2"}}));

        assert!(matches!(reconcile(&a, &b), Err(Error::SchemaMismatch { .. })));
    }
}
