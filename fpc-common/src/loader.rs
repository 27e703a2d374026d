//! JSON input loading shared by the FPC tools
//!
//! Weight tables and fingerprints are plain JSON files; both tools read them
//! through these functions so names, paths and errors come out the same.

use crate::{Error, Fingerprint, Result, WeightTable};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Parse a JSON document from disk
pub fn load_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Load and validate the weight table
pub fn load_weight_table(path: &Path) -> Result<WeightTable> {
    let table = WeightTable::from_json(&load_json(path)?)?;
    debug!(
        path = %path.display(),
        entries = table.len(),
        "Loaded weight table"
    );
    Ok(table)
}

/// Load one fingerprint, named after its file
///
/// `record_attributes` names the attributes read as record lists even when
/// empty (the media attribute).
pub fn load_fingerprint(path: &Path, record_attributes: &[String]) -> Result<Fingerprint> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidInput(format!("not a file path: {}", path.display())))?;

    let fingerprint = Fingerprint::from_json(name, &load_json(path)?, record_attributes)?;
    debug!(path = %path.display(), "Loaded fingerprint");
    Ok(fingerprint.with_path(path))
}
