//! Fingerprint tree walker
//!
//! Discovers collected fingerprints laid out as
//! `<fingerprints>/<test case>/<pv>/<browser>/<file>`.

use fpc_common::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Depth of fingerprint files below the tree root
pub const CAPTURE_DEPTH: usize = 4;

/// One fingerprint file and where it sits in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFile {
    pub test_case: String,
    pub pv: String,
    pub browser: String,
    pub path: PathBuf,
}

/// Fingerprint tree scanner
pub struct CaptureScanner {
    ignore_patterns: Vec<String>,
}

impl Default for CaptureScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureScanner {
    /// Scanner ignoring common system files (.DS_Store, Thumbs.db, .git)
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
            ],
        }
    }

    /// Every fingerprint file of the tree, sorted by path
    ///
    /// Unreadable entries are logged and skipped.
    pub fn scan(&self, root: &Path) -> Result<Vec<CaptureFile>> {
        if !root.exists() {
            return Err(Error::NotFound(format!(
                "fingerprint folder {}",
                root.display()
            )));
        }
        if !root.is_dir() {
            return Err(Error::InvalidInput(format!(
                "not a directory: {}",
                root.display()
            )));
        }

        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(CAPTURE_DEPTH)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_ignored(e));

        let mut captures = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    continue;
                }
            };

            if entry.depth() != CAPTURE_DEPTH || !entry.file_type().is_file() {
                continue;
            }

            match capture_file(root, entry.path()) {
                Some(capture) => captures.push(capture),
                None => tracing::warn!("Unexpected path layout: {}", entry.path().display()),
            }
        }

        tracing::debug!(root = %root.display(), files = captures.len(), "Fingerprint tree scanned");
        Ok(captures)
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.ignore_patterns.iter().any(|p| name.contains(p.as_str()))
    }
}

fn capture_file(root: &Path, path: &Path) -> Option<CaptureFile> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    match parts.as_slice() {
        [test_case, pv, browser, _file] => Some(CaptureFile {
            test_case: test_case.clone(),
            pv: pv.clone(),
            browser: browser.clone(),
            path: path.to_path_buf(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, parts: &[&str]) {
        let path = parts.iter().fold(root.to_path_buf(), |p, part| p.join(part));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    #[test]
    fn test_scan_finds_files_at_capture_depth() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), &["case1", "PV1", "Chrome", "fingerprint_1.json"]);
        touch(tmp.path(), &["case1", "PV2", "Firefox", "fingerprint_1.json"]);
        touch(tmp.path(), &["case1", "PV1", "stray.json"]);
        touch(tmp.path(), &["case1", "PV1", "Chrome", "deeper", "x.json"]);

        let captures = CaptureScanner::new().scan(tmp.path()).unwrap();

        assert_eq!(captures.len(), 2);
        assert_eq!(captures[0].test_case, "case1");
        assert_eq!(captures[0].pv, "PV1");
        assert_eq!(captures[0].browser, "Chrome");
        assert_eq!(captures[1].browser, "Firefox");
    }

    #[test]
    fn test_scan_skips_system_files() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), &["case1", "PV1", "Chrome", "fingerprint_1.json"]);
        touch(tmp.path(), &["case1", "PV1", "Chrome", ".DS_Store"]);

        let captures = CaptureScanner::new().scan(tmp.path()).unwrap();
        assert_eq!(captures.len(), 1);
    }

    #[test]
    fn test_scan_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let err = CaptureScanner::new()
            .scan(&tmp.path().join("absent"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
