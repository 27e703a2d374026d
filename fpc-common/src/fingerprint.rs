//! Fingerprint data model
//!
//! A fingerprint is one snapshot of observable browser attributes, grouped
//! into named categories. Attribute values carry an explicit shape tag that
//! is decided once, at load time, from the JSON shape.

use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// One record of a record-list attribute (e.g. a media device descriptor)
pub type Record = BTreeMap<String, String>;

/// Attribute values keyed by attribute name
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Shape-tagged attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Scalar text
    Scalar(String),
    /// Unordered collection of scalar text
    ScalarList(Vec<String>),
    /// Unordered collection of records
    RecordList(Vec<Record>),
}

impl AttributeValue {
    /// Build a tagged value from its JSON form
    ///
    /// `record_hint` decides the tag of an empty array: record attributes
    /// (media devices) stay record lists even when no device was reported.
    pub fn from_json(value: &Value, record_hint: bool) -> Result<Self> {
        match value {
            Value::Array(items) if items.is_empty() => Ok(if record_hint {
                AttributeValue::RecordList(Vec::new())
            } else {
                AttributeValue::ScalarList(Vec::new())
            }),
            Value::Array(items) if items.iter().all(Value::is_object) => {
                let records = items
                    .iter()
                    .map(record_from_json)
                    .collect::<Result<Vec<_>>>()?;
                Ok(AttributeValue::RecordList(records))
            }
            Value::Array(items) => {
                let scalars = items
                    .iter()
                    .map(|item| {
                        scalar_text(item).ok_or_else(|| {
                            Error::InvalidInput(format!(
                                "list element must be a scalar, got {}",
                                item
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(AttributeValue::ScalarList(scalars))
            }
            Value::Object(_) => Err(Error::InvalidInput(
                "attribute value must be a scalar or a list, got an object".to_string(),
            )),
            other => scalar_text(other)
                .map(AttributeValue::Scalar)
                .ok_or_else(|| Error::InvalidInput(format!("unsupported value: {}", other))),
        }
    }

    /// Shape name for diagnostics
    pub fn shape(&self) -> &'static str {
        match self {
            AttributeValue::Scalar(_) => "scalar",
            AttributeValue::ScalarList(_) => "scalar list",
            AttributeValue::RecordList(_) => "record list",
        }
    }

    /// Records, if this is a record list
    pub fn as_records(&self) -> Option<&[Record]> {
        match self {
            AttributeValue::RecordList(records) => Some(records),
            _ => None,
        }
    }

    /// Trim every scalar leaf in place
    fn trim_leaves(&mut self) {
        match self {
            AttributeValue::Scalar(s) => trim_string(s),
            AttributeValue::ScalarList(items) => items.iter_mut().for_each(trim_string),
            AttributeValue::RecordList(records) => records
                .iter_mut()
                .flat_map(|r| r.values_mut())
                .for_each(trim_string),
        }
    }
}

fn trim_string(s: &mut String) {
    let trimmed = s.trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_string();
    }
}

/// Text form of a JSON scalar; `None` for arrays and objects
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn record_from_json(value: &Value) -> Result<Record> {
    let Value::Object(map) = value else {
        return Err(Error::InvalidInput(format!("record must be an object, got {}", value)));
    };

    map.iter()
        .map(|(field, v)| {
            scalar_text(v)
                .map(|text| (field.clone(), text))
                .ok_or_else(|| {
                    Error::InvalidInput(format!("record field '{}' must be a scalar", field))
                })
        })
        .collect()
}

/// Category-qualified attribute name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AttributeKey {
    pub category: String,
    pub attribute: String,
}

impl AttributeKey {
    pub fn new(category: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            attribute: attribute.into(),
        }
    }

    /// Parse the `"{category};{attribute}"` form
    ///
    /// A bare attribute name is qualified with `default_category`.
    pub fn parse(s: &str, default_category: &str) -> Self {
        match s.split_once(';') {
            Some((category, attribute)) => Self::new(category, attribute),
            None => Self::new(default_category, s),
        }
    }
}

impl From<(&str, &str)> for AttributeKey {
    fn from((category, attribute): (&str, &str)) -> Self {
        AttributeKey::new(category, attribute)
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.category, self.attribute)
    }
}

/// One browser fingerprint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fingerprint {
    /// Identifier (usually the file name)
    pub name: String,
    /// Where the fingerprint was loaded from, if anywhere
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// category → attribute → value
    pub data: BTreeMap<String, Attributes>,
}

impl Fingerprint {
    /// Build a fingerprint from in-memory data, trimming every scalar leaf
    pub fn new(name: impl Into<String>, data: BTreeMap<String, Attributes>) -> Self {
        let mut fingerprint = Self {
            name: name.into(),
            path: None,
            data,
        };
        fingerprint.trim_leaves();
        fingerprint
    }

    /// Parse a fingerprint from its JSON document
    ///
    /// `record_attributes` names the attributes whose empty arrays should be
    /// tagged as record lists.
    pub fn from_json(name: impl Into<String>, json: &Value, record_attributes: &[String]) -> Result<Self> {
        let name = name.into();
        let Value::Object(categories) = json else {
            return Err(Error::InvalidInput(format!(
                "{}: top level must be an object of categories",
                name
            )));
        };

        let mut data = BTreeMap::new();
        for (category, attributes) in categories {
            let Value::Object(attributes) = attributes else {
                return Err(Error::InvalidInput(format!(
                    "{}: category '{}' must be an object of attributes",
                    name, category
                )));
            };

            let mut values = Attributes::new();
            for (attribute, raw) in attributes {
                let record_hint = record_attributes.iter().any(|a| a == attribute);
                let value = AttributeValue::from_json(raw, record_hint).map_err(|e| {
                    Error::InvalidInput(format!("{}: {};{}: {}", name, category, attribute, e))
                })?;
                values.insert(attribute.clone(), value);
            }
            data.insert(category.clone(), values);
        }

        Ok(Self::new(name, data))
    }

    /// Attach the source path
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attributes of one category
    pub fn category(&self, category: &str) -> Option<&Attributes> {
        self.data.get(category)
    }

    /// Value of one attribute
    pub fn get(&self, category: &str, attribute: &str) -> Option<&AttributeValue> {
        self.data.get(category).and_then(|attrs| attrs.get(attribute))
    }

    /// Every (category, attribute, value) in category then attribute order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str, &AttributeValue)> {
        self.data.iter().flat_map(|(category, attrs)| {
            attrs
                .iter()
                .map(move |(attribute, value)| (category.as_str(), attribute.as_str(), value))
        })
    }

    fn trim_leaves(&mut self) {
        self.data
            .values_mut()
            .flat_map(|attrs| attrs.values_mut())
            .for_each(AttributeValue::trim_leaves);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_from_string() {
        let value = AttributeValue::from_json(&json!("Win32"), false).unwrap();
        assert_eq!(value, AttributeValue::Scalar("Win32".to_string()));
    }

    #[test]
    fn test_number_rendered_as_text() {
        let value = AttributeValue::from_json(&json!(24), false).unwrap();
        assert_eq!(value, AttributeValue::Scalar("24".to_string()));
    }

    #[test]
    fn test_scalar_list() {
        let value = AttributeValue::from_json(&json!(["en-US", "en"]), false).unwrap();
        assert_eq!(
            value,
            AttributeValue::ScalarList(vec!["en-US".to_string(), "en".to_string()])
        );
    }

    #[test]
    fn test_record_list() {
        let value = AttributeValue::from_json(
            &json!([{"kind": "audioinput", "label": "Mic", "deviceId": "abc", "groupId": "g"}]),
            true,
        )
        .unwrap();

        let records = value.as_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["label"], "Mic");
    }

    #[test]
    fn test_empty_array_uses_hint() {
        assert_eq!(
            AttributeValue::from_json(&json!([]), true).unwrap().shape(),
            "record list"
        );
        assert_eq!(
            AttributeValue::from_json(&json!([]), false).unwrap().shape(),
            "scalar list"
        );
    }

    #[test]
    fn test_object_value_rejected() {
        let err = AttributeValue::from_json(&json!({"a": "b"}), false).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_nested_list_rejected() {
        let err = AttributeValue::from_json(&json!([["a"]]), false).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_from_json_trims_all_leaves() {
        let doc = json!({
            "Navigator": {
                "Platform": "  Win32 ",
                "Languages": [" en ", "sv"],
            },
            "WebRTC Leak": {
                "Media Devices": [{"label": " Mic ", "deviceId": "x "}],
            }
        });

        let fp = Fingerprint::from_json("fingerprint_1.json", &doc, &["Media Devices".to_string()]).unwrap();

        assert_eq!(
            fp.get("Navigator", "Platform"),
            Some(&AttributeValue::Scalar("Win32".to_string()))
        );
        assert_eq!(
            fp.get("Navigator", "Languages"),
            Some(&AttributeValue::ScalarList(vec!["en".to_string(), "sv".to_string()]))
        );
        let devices = fp.get("WebRTC Leak", "Media Devices").unwrap().as_records().unwrap();
        assert_eq!(devices[0]["label"], "Mic");
        assert_eq!(devices[0]["deviceId"], "x");
    }

    #[test]
    fn test_from_json_rejects_non_object_category() {
        let doc = json!({"Navigator": "oops"});
        let err = Fingerprint::from_json("fp", &doc, &[]).unwrap_err();
        assert!(err.to_string().contains("category 'Navigator'"));
    }

    #[test]
    fn test_attribute_iteration_is_sorted() {
        let doc = json!({
            "B": {"z": "1", "a": "2"},
            "A": {"m": "3"},
        });
        let fp = Fingerprint::from_json("fp", &doc, &[]).unwrap();

        let keys: Vec<(&str, &str)> = fp.attributes().map(|(c, a, _)| (c, a)).collect();
        assert_eq!(keys, vec![("A", "m"), ("B", "a"), ("B", "z")]);
    }

    #[test]
    fn test_attribute_key_parse_and_display() {
        let key = AttributeKey::parse("WebGL Report;WebGL Image Hash", "Other");
        assert_eq!(key, AttributeKey::new("WebGL Report", "WebGL Image Hash"));
        assert_eq!(key.to_string(), "WebGL Report;WebGL Image Hash");

        let bare = AttributeKey::parse("Unicode Glyphs", "Font Fingerprinting");
        assert_eq!(bare.category, "Font Fingerprinting");
        assert_eq!(bare.attribute, "Unicode Glyphs");
    }
}
