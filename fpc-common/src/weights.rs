//! Weight table (point system) model
//!
//! JSON layout:
//!
//! ```json
//! {
//!   "pointsystem": { "A": 10, "B": 5, "bonus": 1 },
//!   "WebGL Report": {
//!     "WebGL Report Hash": ["A", ["WebGL Report;WebGL Image Hash"]],
//!     "WebGL Image Hash": ["A", ["WebGL Report;WebGL Report Hash"]],
//!     "Unmasked Vendor": [false, []]
//!   }
//! }
//! ```
//!
//! Each entry is `[weight-group-or-false, [linked attribute keys]]`. Linked
//! keys use the `"{category};{attribute}"` form; bare names are qualified
//! with the entry's own category.

use crate::fingerprint::AttributeKey;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reserved top-level key holding the point system
pub const POINTSYSTEM_KEY: &str = "pointsystem";

/// Reserved point system key holding the bonus multiplier
pub const BONUS_KEY: &str = "bonus";

/// Weighting of one attribute
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeightEntry {
    /// Weight group id, `None` when the attribute is not scored
    pub group: Option<String>,
    /// Attributes that always change together with this one
    pub linked: Vec<AttributeKey>,
}

impl WeightEntry {
    /// Scored entry in `group`
    pub fn scored(group: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            linked: Vec::new(),
        }
    }

    /// Entry observed but never scored
    pub fn ignored() -> Self {
        Self::default()
    }

    /// Add linked siblings
    pub fn with_linked<I, K>(mut self, linked: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<AttributeKey>,
    {
        self.linked.extend(linked.into_iter().map(Into::into));
        self
    }

    pub fn is_scored(&self) -> bool {
        self.group.is_some()
    }
}

/// Point values per weight group plus the global bonus multiplier
#[derive(Debug, Clone, PartialEq)]
pub struct PointSystem {
    pub points: BTreeMap<String, u32>,
    pub bonus: f64,
}

impl Default for PointSystem {
    fn default() -> Self {
        Self {
            points: BTreeMap::new(),
            bonus: 1.0,
        }
    }
}

impl PointSystem {
    pub fn with_group(mut self, group: impl Into<String>, points: u32) -> Self {
        self.points.insert(group.into(), points);
        self
    }

    pub fn with_bonus(mut self, bonus: f64) -> Self {
        self.bonus = bonus;
        self
    }
}

/// Category → attribute → weighting, plus the point system
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeightTable {
    categories: BTreeMap<String, BTreeMap<String, WeightEntry>>,
    points: PointSystem,
}

impl WeightTable {
    pub fn new(points: PointSystem) -> Self {
        Self {
            categories: BTreeMap::new(),
            points,
        }
    }

    /// Insert or replace one entry
    pub fn insert(
        &mut self,
        category: impl Into<String>,
        attribute: impl Into<String>,
        entry: WeightEntry,
    ) {
        self.categories
            .entry(category.into())
            .or_default()
            .insert(attribute.into(), entry);
    }

    /// Builder form of [`WeightTable::insert`]
    pub fn with_entry(
        mut self,
        category: impl Into<String>,
        attribute: impl Into<String>,
        entry: WeightEntry,
    ) -> Self {
        self.insert(category, attribute, entry);
        self
    }

    /// Parse the JSON weight table
    pub fn from_json(json: &Value) -> Result<Self> {
        let Value::Object(top) = json else {
            return Err(Error::InvalidInput(
                "weight table must be a JSON object".to_string(),
            ));
        };

        let points = match top.get(POINTSYSTEM_KEY) {
            Some(value) => parse_point_system(value)?,
            None => {
                return Err(Error::WeightTable(format!(
                    "missing '{}' section",
                    POINTSYSTEM_KEY
                )))
            }
        };

        let mut table = WeightTable::new(points);
        for (category, attributes) in top {
            if category == POINTSYSTEM_KEY {
                continue;
            }
            let Value::Object(attributes) = attributes else {
                return Err(Error::InvalidInput(format!(
                    "weight table category '{}' must be an object",
                    category
                )));
            };
            for (attribute, raw) in attributes {
                let entry = parse_entry(category, raw).map_err(|e| {
                    Error::InvalidInput(format!("weight entry {};{}: {}", category, attribute, e))
                })?;
                table.insert(category.clone(), attribute.clone(), entry);
            }
        }

        Ok(table)
    }

    /// Weighting for one attribute, if the table knows it
    pub fn entry(&self, category: &str, attribute: &str) -> Option<&WeightEntry> {
        self.categories
            .get(category)
            .and_then(|attrs| attrs.get(attribute))
    }

    /// True when the attribute carries a weight group
    pub fn is_scored(&self, category: &str, attribute: &str) -> bool {
        self.entry(category, attribute)
            .is_some_and(WeightEntry::is_scored)
    }

    /// Every entry in category then attribute order
    pub fn entries(&self) -> impl Iterator<Item = (AttributeKey, &WeightEntry)> {
        self.categories.iter().flat_map(|(category, attrs)| {
            attrs
                .iter()
                .map(move |(attribute, entry)| (AttributeKey::new(category.as_str(), attribute.as_str()), entry))
        })
    }

    /// Point value of a weight group
    pub fn points_for(&self, group: &str) -> Option<u32> {
        self.points.points.get(group).copied()
    }

    pub fn bonus(&self) -> f64 {
        self.points.bonus
    }

    pub fn point_system(&self) -> &PointSystem {
        &self.points
    }

    /// Number of attribute entries
    pub fn len(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_point_system(value: &Value) -> Result<PointSystem> {
    let Value::Object(map) = value else {
        return Err(Error::WeightTable(format!(
            "'{}' must be an object",
            POINTSYSTEM_KEY
        )));
    };

    let mut system = PointSystem::default();
    for (key, raw) in map {
        if key == BONUS_KEY {
            system.bonus = raw.as_f64().ok_or_else(|| {
                Error::WeightTable(format!("'{}' must be a number, got {}", BONUS_KEY, raw))
            })?;
            continue;
        }
        let points = raw
            .as_u64()
            .and_then(|p| u32::try_from(p).ok())
            .ok_or_else(|| {
                Error::WeightTable(format!(
                    "points for group '{}' must be a non-negative integer, got {}",
                    key, raw
                ))
            })?;
        system.points.insert(key.clone(), points);
    }

    Ok(system)
}

fn parse_entry(category: &str, raw: &Value) -> Result<WeightEntry> {
    let Value::Array(parts) = raw else {
        return Err(Error::InvalidInput(format!("expected [group, [linked]], got {}", raw)));
    };

    let group = match parts.first() {
        Some(value) => parse_group(value)?,
        None => return Err(Error::InvalidInput("empty entry".to_string())),
    };

    let linked = match parts.get(1) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| {
                name.as_str()
                    .map(|s| AttributeKey::parse(s, category))
                    .ok_or_else(|| Error::InvalidInput(format!("linked name must be text, got {}", name)))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(Value::Bool(false)) => Vec::new(),
        Some(other) => {
            return Err(Error::InvalidInput(format!(
                "linked attributes must be a list, got {}",
                other
            )))
        }
    };

    Ok(WeightEntry { group, linked })
}

/// Group ids follow truthiness: `false`, `null`, `0` and `""` mean unscored
fn parse_group(value: &Value) -> Result<Option<String>> {
    match value {
        Value::Bool(false) | Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(None),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(Error::InvalidInput(format!("invalid weight group {}", other))),
    }
}
