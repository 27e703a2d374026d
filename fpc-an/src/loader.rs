//! Fingerprint and weight table loading
//!
//! **Purpose:** Read the JSON inputs of an analysis run and pick the three
//! fingerprints of a capture folder.

use crate::analysis::FingerprintTriple;
use crate::engine::DiffOptions;
use fpc_common::{Error, Fingerprint, Result};
use std::fs;
use std::path::Path;

pub use fpc_common::loader::{load_json, load_weight_table};

/// Name fragments identifying fingerprints 1, 2 and 3
pub const TRIPLE_MARKERS: [&str; 3] = ["fingerprint_1", "fingerprint_2", "fingerprint_3"];

/// Load one fingerprint, reading the media attribute as a record list
pub fn load_fingerprint(path: &Path, options: &DiffOptions) -> Result<Fingerprint> {
    fpc_common::loader::load_fingerprint(path, std::slice::from_ref(&options.media_attribute))
}

/// Load every regular file of `dir` (not recursive), sorted by file name
pub fn load_fingerprints(dir: &Path, options: &DiffOptions) -> Result<Vec<Fingerprint>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| load_fingerprint(path, options))
        .collect()
}

/// First fingerprint whose name contains `marker`
pub fn select_fingerprint<'a>(fingerprints: &'a [Fingerprint], marker: &str) -> Result<&'a Fingerprint> {
    fingerprints
        .iter()
        .find(|fp| fp.name.contains(marker))
        .ok_or_else(|| Error::NotFound(format!("no fingerprint named like '{}'", marker)))
}

/// Pick fingerprints 1, 2 and 3 out of a loaded folder
pub fn select_triple(fingerprints: &[Fingerprint]) -> Result<FingerprintTriple> {
    let [first, second, third] = TRIPLE_MARKERS;
    Ok(FingerprintTriple {
        baseline: select_fingerprint(fingerprints, first)?.clone(),
        session: select_fingerprint(fingerprints, second)?.clone(),
        cross_session: select_fingerprint(fingerprints, third)?.clone(),
    })
}

/// Load a capture folder and pick its triple
pub fn load_triple(dir: &Path, options: &DiffOptions) -> Result<FingerprintTriple> {
    let fingerprints = load_fingerprints(dir, options)?;
    select_triple(&fingerprints).map_err(|e| match e {
        Error::NotFound(msg) => Error::NotFound(format!("{} in {}", msg, dir.display())),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fingerprint(name: &str) -> Fingerprint {
        Fingerprint::from_json(name, &json!({"C": {"x": "1"}}), &[]).unwrap()
    }

    #[test]
    fn test_select_triple_by_name() {
        let loaded = vec![
            fingerprint("chrome_fingerprint_3.json"),
            fingerprint("chrome_fingerprint_1.json"),
            fingerprint("chrome_fingerprint_2.json"),
        ];

        let triple = select_triple(&loaded).unwrap();
        assert_eq!(triple.baseline.name, "chrome_fingerprint_1.json");
        assert_eq!(triple.session.name, "chrome_fingerprint_2.json");
        assert_eq!(triple.cross_session.name, "chrome_fingerprint_3.json");
    }

    #[test]
    fn test_select_first_match_wins() {
        let loaded = vec![fingerprint("a_fingerprint_1.json"), fingerprint("b_fingerprint_1.json")];
        assert_eq!(
            select_fingerprint(&loaded, "fingerprint_1").unwrap().name,
            "a_fingerprint_1.json"
        );
    }

    #[test]
    fn test_missing_member_is_not_found() {
        let loaded = vec![fingerprint("fingerprint_1.json"), fingerprint("fingerprint_2.json")];
        let err = select_triple(&loaded).unwrap_err();
        assert!(matches!(err, Error::NotFound(ref msg) if msg.contains("fingerprint_3")));
    }
}
