// Unique-value distribution
//
// For each browser and pv: how many attributes have exactly N unique values.
// Media device attributes are left out.

use crate::statistics::StatisticsSummary;
use serde::Serialize;
use std::collections::BTreeMap;

/// Attributes sharing one unique-value count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueCount {
    pub unique: usize,
    pub num: usize,
}

/// browser → pv → counts, in order of first occurrence
pub type UniqueDistribution = BTreeMap<String, BTreeMap<String, Vec<UniqueCount>>>;

pub fn unique_distribution(summary: &StatisticsSummary, media_attribute: &str) -> UniqueDistribution {
    summary
        .browsers()
        .iter()
        .map(|(browser, pvs)| {
            let pvs = pvs
                .iter()
                .map(|(pv, categories)| {
                    let mut counts: Vec<UniqueCount> = Vec::new();
                    let attributes = categories
                        .values()
                        .flat_map(|attributes| attributes.iter())
                        .filter(|(name, _)| !name.contains(media_attribute));

                    for (_, stats) in attributes {
                        match counts.iter_mut().find(|c| c.unique == stats.unique) {
                            Some(count) => count.num += 1,
                            None => counts.push(UniqueCount {
                                unique: stats.unique,
                                num: 1,
                            }),
                        }
                    }
                    (pv.clone(), counts)
                })
                .collect();
            (browser.clone(), pvs)
        })
        .collect()
}

/// Console listing, one block per browser and pv
pub fn format_distribution(distribution: &UniqueDistribution) -> String {
    let mut output = String::new();
    for (browser, pvs) in distribution {
        for (pv, counts) in pvs {
            output.push_str(&format!("{} - {}\n", browser, pv));
            for count in counts {
                output.push_str(&format!(
                    "{} (unique values): {} (occurrences)\n",
                    count.unique, count.num
                ));
            }
            output.push('\n');
        }
    }
    output
}
