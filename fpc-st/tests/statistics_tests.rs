//! Statistics over a fingerprint tree written to a temporary directory

use fpc_common::config::MediaConfig;
use fpc_common::{PointSystem, WeightEntry, WeightTable};
use fpc_st::{unique_distribution, StatisticsCollector, UniqueCount};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_fingerprint(root: &Path, pv: &str, browser: &str, file: &str, value: Value) {
    let dir = root.join("case1").join(pv).join(browser);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), serde_json::to_string(&value).unwrap()).unwrap();
}

fn table() -> WeightTable {
    WeightTable::new(PointSystem::default().with_group("A", 10))
        .with_entry("Navigator", "Platform", WeightEntry::scored("A"))
        .with_entry("Navigator", "Languages", WeightEntry::scored("A"))
        .with_entry("Navigator", "User Agent", WeightEntry::ignored())
}

fn device(label: &str, device_id: &str) -> Value {
    json!({"kind": "audioinput", "label": label, "deviceId": device_id, "groupId": "g"})
}

fn tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_fingerprint(
        tmp.path(),
        "PV1",
        "Chrome",
        "fingerprint_1.json",
        json!({
            "Navigator": {"Platform": "Win32", "Languages": ["en", "de"], "User Agent": "a"},
            "WebRTC Leak": {"Media Devices": [device("Mic", "d1")]}
        }),
    );
    write_fingerprint(
        tmp.path(),
        "PV1",
        "Chrome",
        "fingerprint_2.json",
        json!({
            "Navigator": {"Platform": "Win32", "Languages": ["de", "en"], "User Agent": "b"},
            "WebRTC Leak": {"Media Devices": [device("Mic", "d2")]}
        }),
    );
    write_fingerprint(
        tmp.path(),
        "PV1",
        "Chrome",
        "fingerprint_3.json",
        json!({
            "Navigator": {"Platform": "Linux x86_64", "Languages": ["en", "de"], "User Agent": "c"},
            "WebRTC Leak": {"Media Devices": []}
        }),
    );
    write_fingerprint(
        tmp.path(),
        "PV2",
        "Firefox",
        "fingerprint_1.json",
        json!({
            "Navigator": {"Platform": "Win32", "Languages": ["en"], "User Agent": "d"},
            "WebRTC Leak": {"Media Devices": []}
        }),
    );
    tmp
}

#[test]
fn test_collect_counts_values_per_browser_and_pv() {
    let tmp = tree();
    let table = table();
    let stats = StatisticsCollector::new(&table, MediaConfig::default())
        .collect(tmp.path())
        .unwrap();

    let platform = stats.buckets("Chrome", "PV1", "Navigator", "Platform").unwrap();
    assert_eq!(platform.len(), 2);
    assert_eq!(platform[0].count(), 2);
    assert_eq!(platform[1].count(), 1);

    let languages = stats.buckets("Chrome", "PV1", "Navigator", "Languages").unwrap();
    assert_eq!(languages.len(), 1);
    assert_eq!(languages[0].count(), 3);

    assert!(stats.buckets("Chrome", "PV1", "Navigator", "User Agent").is_none());
    assert!(stats.buckets("Firefox", "PV2", "Navigator", "Platform").is_some());
    assert!(stats.buckets("Firefox", "PV1", "Navigator", "Platform").is_none());
}

#[test]
fn test_media_devices_bucketed_per_field() {
    let tmp = tree();
    let table = table();
    let stats = StatisticsCollector::new(&table, MediaConfig::default())
        .collect(tmp.path())
        .unwrap();

    let labels = stats
        .buckets("Chrome", "PV1", "WebRTC Leak", "Media Devices: label")
        .unwrap();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].count(), 2);

    let ids = stats
        .buckets("Chrome", "PV1", "WebRTC Leak", "Media Devices: deviceId")
        .unwrap();
    assert_eq!(ids.len(), 2);
}

#[test]
fn test_summary_and_distribution() {
    let tmp = tree();
    let table = table();
    let summary = StatisticsCollector::new(&table, MediaConfig::default())
        .collect(tmp.path())
        .unwrap()
        .summarize();

    let platform = summary
        .attribute("Chrome", "PV1", "Navigator", "Platform")
        .unwrap();
    assert_eq!(platform.num_elements, 3);
    assert_eq!(platform.unique, 2);
    assert_eq!(platform.distribution, vec![2, 1]);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["Chrome"]["PV1"]["Navigator"]["Languages"]["unique"], 1);

    let distribution = unique_distribution(&summary, "Media Devices");
    assert_eq!(
        distribution["Chrome"]["PV1"],
        vec![
            UniqueCount { unique: 1, num: 1 },
            UniqueCount { unique: 2, num: 1 },
        ]
    );
}
