//! Open, ordered key/value bag for analyzer-specific data.

use crate::error::{Error, Result};
use crate::json::{FromJson, ToJson};
use crate::models::attribute::json_kind;
use crate::xml::Element;
use serde_json::{Map, Value as Json};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A custom field value: only strings and integers are representable.
pub enum CustomValue {
    Str(String),
    Int(i64),
}

impl CustomValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CustomValue::Str(s) => Some(s),
            CustomValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            CustomValue::Int(i) => Some(*i),
            CustomValue::Str(_) => None,
        }
    }
}

impl fmt::Display for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomValue::Str(s) => f.write_str(s),
            CustomValue::Int(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for CustomValue {
    fn from(s: &str) -> Self {
        CustomValue::Str(s.to_string())
    }
}

impl From<String> for CustomValue {
    fn from(s: String) -> Self {
        CustomValue::Str(s)
    }
}

impl From<i64> for CustomValue {
    fn from(i: i64) -> Self {
        CustomValue::Int(i)
    }
}

impl From<i32> for CustomValue {
    fn from(i: i32) -> Self {
        CustomValue::Int(i64::from(i))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
/// Insertion-ordered mapping with unique keys.
///
/// Equality is order-sensitive, matching what round-trips through either
/// wire format.
pub struct CustomFields {
    entries: Vec<(String, CustomValue)>,
}

impl CustomFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<CustomValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CustomValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CustomValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("custom-fields");
        for (key, value) in &self.entries {
            let (tag, text) = match value {
                CustomValue::Str(s) => ("str-field", s.clone()),
                CustomValue::Int(i) => ("int-field", i.to_string()),
            };
            let mut field = Element::new(tag).with_text(text);
            field.set_attr("name", key.as_str());
            node.push(field);
        }
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        let mut fields = CustomFields::new();
        for child in &node.children {
            let value = match child.tag.as_str() {
                // an empty <str-field/> is the empty string
                "str-field" => CustomValue::Str(child.text_or_empty().to_string()),
                "int-field" => {
                    let raw = child.text_or_empty().trim();
                    let i = raw.parse::<i64>().map_err(|e| {
                        Error::schema(format!("<int-field> has invalid value '{}': {}", raw, e))
                    })?;
                    CustomValue::Int(i)
                }
                other => {
                    return Err(Error::schema(format!(
                        "unrecognized element within <custom-fields>: {}",
                        other
                    )))
                }
            };
            let key = child.required_attr("name")?;
            fields.set(key, value);
        }
        Ok(fields)
    }
}

impl<K: Into<String>, V: Into<CustomValue>> FromIterator<(K, V)> for CustomFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = CustomFields::new();
        for (k, v) in iter {
            fields.set(k, v);
        }
        fields
    }
}

impl ToJson for CustomFields {
    fn to_json(&self) -> Json {
        let mut map = Map::new();
        for (key, value) in &self.entries {
            let v = match value {
                CustomValue::Str(s) => Json::String(s.clone()),
                CustomValue::Int(i) => Json::from(*i),
            };
            map.insert(key.clone(), v);
        }
        Json::Object(map)
    }
}

impl FromJson for CustomFields {
    fn from_json(raw: &Json) -> Result<Self> {
        let obj = raw.as_object().ok_or_else(|| {
            Error::schema(format!(
                "custom fields must be a JSON object, found {}",
                json_kind(raw)
            ))
        })?;
        let mut fields = CustomFields::new();
        for (key, value) in obj {
            let v = match value {
                Json::String(s) => CustomValue::Str(s.clone()),
                Json::Number(n) => match n.as_i64() {
                    Some(i) => CustomValue::Int(i),
                    None => {
                        return Err(Error::UnsupportedCustomValue {
                            key: key.clone(),
                            found: json_kind(value),
                        })
                    }
                },
                other => {
                    return Err(Error::UnsupportedCustomValue {
                        key: key.clone(),
                        found: json_kind(other),
                    })
                }
            };
            fields.set(key.as_str(), v);
        }
        Ok(fields)
    }
}
