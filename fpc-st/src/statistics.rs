//! Attribute value statistics
//!
//! **Purpose:** Count how often each distinct value of every scored attribute
//! occurs, per browser and pv, across a collected fingerprint tree.
//!
//! Raw statistics hold `[count, value]` buckets; the summary reduces each
//! attribute to its element count, unique value count and distribution.

use crate::walker::{CaptureFile, CaptureScanner};
use fpc_common::config::MediaConfig;
use fpc_common::loader::load_fingerprint;
use fpc_common::{AttributeValue, Fingerprint, Record, Result, WeightTable};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// browser → pv → category → attribute
pub type Nested<T> = BTreeMap<String, BTreeMap<String, BTreeMap<String, BTreeMap<String, T>>>>;

/// Occurrences of one distinct value, serialized as `[count, value]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket(pub usize, pub AttributeValue);

impl Bucket {
    pub fn count(&self) -> usize {
        self.0
    }

    pub fn value(&self) -> &AttributeValue {
        &self.1
    }
}

/// Value buckets per browser, pv, category and attribute
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValueStatistics {
    data: Nested<Vec<Bucket>>,
}

/// Summary of one attribute's buckets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSummary {
    /// Values seen in total
    pub num_elements: usize,
    /// Distinct values
    pub unique: usize,
    /// Bucket counts, largest first
    pub distribution: Vec<usize>,
}

/// Summary statistics per browser, pv, category and attribute
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatisticsSummary {
    data: Nested<AttributeSummary>,
}

impl ValueStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one observed value
    pub fn add(&mut self, browser: &str, pv: &str, category: &str, attribute: &str, value: AttributeValue) {
        let buckets = self
            .data
            .entry(browser.to_string())
            .or_default()
            .entry(pv.to_string())
            .or_default()
            .entry(category.to_string())
            .or_default()
            .entry(attribute.to_string())
            .or_default();

        match buckets.iter_mut().find(|b| bucket_values_equal(&value, &b.1)) {
            Some(bucket) => bucket.0 += 1,
            None => buckets.push(Bucket(1, value)),
        }
    }

    pub fn buckets(&self, browser: &str, pv: &str, category: &str, attribute: &str) -> Option<&[Bucket]> {
        self.data
            .get(browser)?
            .get(pv)?
            .get(category)?
            .get(attribute)
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reduce every attribute to its summary
    pub fn summarize(&self) -> StatisticsSummary {
        let data = self
            .data
            .iter()
            .map(|(browser, pvs)| {
                let pvs = pvs
                    .iter()
                    .map(|(pv, categories)| {
                        let categories = categories
                            .iter()
                            .map(|(category, attributes)| {
                                let attributes = attributes
                                    .iter()
                                    .map(|(attribute, buckets)| (attribute.clone(), summarize_buckets(buckets)))
                                    .collect();
                                (category.clone(), attributes)
                            })
                            .collect();
                        (pv.clone(), categories)
                    })
                    .collect();
                (browser.clone(), pvs)
            })
            .collect();

        StatisticsSummary { data }
    }
}

impl StatisticsSummary {
    pub fn attribute(&self, browser: &str, pv: &str, category: &str, attribute: &str) -> Option<&AttributeSummary> {
        self.data.get(browser)?.get(pv)?.get(category)?.get(attribute)
    }

    /// browser → pv → category → attribute → summary
    pub fn browsers(&self) -> &Nested<AttributeSummary> {
        &self.data
    }
}

/// Bucket equality
///
/// Scalars compare trimmed and case-sensitive; scalar lists as sorted
/// multisets; record lists when every record of `a` is in `b`. Values of
/// different shapes never share a bucket.
pub fn bucket_values_equal(a: &AttributeValue, b: &AttributeValue) -> bool {
    match (a, b) {
        (AttributeValue::Scalar(a), AttributeValue::Scalar(b)) => a.trim() == b.trim(),
        (AttributeValue::ScalarList(a), AttributeValue::ScalarList(b)) => {
            let mut a = a.clone();
            let mut b = b.clone();
            a.sort();
            b.sort();
            a == b
        }
        (AttributeValue::RecordList(a), AttributeValue::RecordList(b)) => {
            a.iter().all(|record| b.contains(record))
        }
        _ => false,
    }
}

fn summarize_buckets(buckets: &[Bucket]) -> AttributeSummary {
    let mut distribution: Vec<usize> = buckets.iter().map(Bucket::count).collect();
    distribution.sort_unstable_by(|a, b| b.cmp(a));

    AttributeSummary {
        num_elements: distribution.iter().sum(),
        unique: buckets.len(),
        distribution,
    }
}

/// Collects value statistics from fingerprint files
pub struct StatisticsCollector<'a> {
    table: &'a WeightTable,
    media: MediaConfig,
}

impl<'a> StatisticsCollector<'a> {
    pub fn new(table: &'a WeightTable, media: MediaConfig) -> Self {
        Self { table, media }
    }

    /// Walk the fingerprint tree and count every relevant value
    pub fn collect(&self, fingerprints_dir: &Path) -> Result<ValueStatistics> {
        let captures = CaptureScanner::new().scan(fingerprints_dir)?;

        let mut stats = ValueStatistics::new();
        for capture in &captures {
            let fingerprint = self.load(capture)?;
            self.add_fingerprint(&mut stats, &capture.browser, &capture.pv, &fingerprint);
        }

        info!(
            files = captures.len(),
            "Collected value statistics from {}",
            fingerprints_dir.display()
        );
        Ok(stats)
    }

    /// Count the scored attributes of one fingerprint
    ///
    /// **Algorithm:**
    /// 1. Skip attributes the table does not score, except the media attribute
    /// 2. Media devices: one bucket per device for each tracked field, under
    ///    `"<media attribute>: <field>"`
    /// 3. Anything else: one bucket for the whole value
    pub fn add_fingerprint(&self, stats: &mut ValueStatistics, browser: &str, pv: &str, fingerprint: &Fingerprint) {
        for (category, attribute, value) in fingerprint.attributes() {
            let is_media = attribute == self.media.attribute;
            if !is_media && !self.table.is_scored(category, attribute) {
                continue;
            }

            match (is_media, value.as_records()) {
                (true, Some(devices)) => self.add_devices(stats, browser, pv, category, devices),
                _ => stats.add(browser, pv, category, attribute, value.clone()),
            }
        }
    }

    fn add_devices(&self, stats: &mut ValueStatistics, browser: &str, pv: &str, category: &str, devices: &[Record]) {
        let fields = self
            .media
            .tracked_fields
            .iter()
            .filter(|f| !self.media.excluded_fields.contains(*f));

        for device in devices {
            for field in fields.clone() {
                let Some(value) = device.get(field) else {
                    debug!(category = %category, field = %field, "Device record without field");
                    continue;
                };
                let name = format!("{}: {}", self.media.attribute, field);
                stats.add(browser, pv, category, &name, AttributeValue::Scalar(value.clone()));
            }
        }
    }

    fn load(&self, capture: &CaptureFile) -> Result<Fingerprint> {
        load_fingerprint(&capture.path, std::slice::from_ref(&self.media.attribute))
    }
}
