//! Generic JSON codec.
//!
//! Entities implement [`Described`]: an ordered attribute list plus a way to
//! produce field values and rebuild from a [`Record`]. [`encode`] and
//! [`decode`] do the rest, so no entity hand-writes its JSON layout.
//! Polymorphic groups add their `type` discriminator on top.

use crate::error::{Error, Result};
use crate::models::attribute::{json_kind, Attribute, Record};
use serde_json::{Map, Number, Value as Json};

pub trait ToJson {
    fn to_json(&self) -> Json;
}

pub trait FromJson: Sized {
    fn from_json(raw: &Json) -> Result<Self>;
}

/// An entity whose JSON form is fully described by its attribute list.
pub trait Described: Sized {
    /// Type name, also used as the `type` discriminator for variants.
    const TYPE_NAME: &'static str;
    const ATTRS: &'static [Attribute];

    /// Field values in `ATTRS` order; absent optionals are `Json::Null`.
    fn field_values(&self) -> Vec<Json>;

    fn from_record(record: &Record<'_>) -> Result<Self>;
}

/// Encode a described entity. Null values of nullable fields are omitted.
pub fn encode<T: Described>(value: &T) -> Json {
    let values = value.field_values();
    debug_assert_eq!(values.len(), T::ATTRS.len());
    let mut out = Map::new();
    for (attr, v) in T::ATTRS.iter().zip(values) {
        if v.is_null() && attr.nullable {
            continue;
        }
        out.insert(attr.name.to_string(), v);
    }
    Json::Object(out)
}

pub fn decode<T: Described>(raw: &Json) -> Result<T> {
    let record = Record::new(T::TYPE_NAME, T::ATTRS, raw)?;
    T::from_record(&record)
}

/// Encode a variant payload and tag it with its `type` discriminator.
pub fn encode_tagged<T: Described>(value: &T) -> Json {
    let mut json = encode(value);
    if let Json::Object(map) = &mut json {
        map.insert("type".to_string(), Json::String(T::TYPE_NAME.to_string()));
    }
    json
}

/// Read the `type` discriminator of a polymorphic object.
pub fn type_tag<'a>(group: &str, raw: &'a Json) -> Result<&'a str> {
    let obj = raw.as_object().ok_or_else(|| {
        Error::schema(format!(
            "{} must be a JSON object, found {}",
            group,
            json_kind(raw)
        ))
    })?;
    obj.get("type")
        .and_then(Json::as_str)
        .ok_or_else(|| Error::schema(format!("{} is missing its 'type' discriminator", group)))
}

/// Implement [`ToJson`]/[`FromJson`] for described entities.
macro_rules! described_json {
    ($($t:ty),* $(,)?) => {
        $(
            impl $crate::json::ToJson for $t {
                fn to_json(&self) -> serde_json::Value {
                    $crate::json::encode(self)
                }
            }

            impl $crate::json::FromJson for $t {
                fn from_json(raw: &serde_json::Value) -> $crate::error::Result<Self> {
                    $crate::json::decode(raw)
                }
            }
        )*
    };
}
pub(crate) use described_json;

impl ToJson for i64 {
    fn to_json(&self) -> Json {
        Json::from(*self)
    }
}

impl FromJson for i64 {
    fn from_json(raw: &Json) -> Result<Self> {
        raw.as_i64()
            .ok_or_else(|| Error::schema(format!("expected integer, found {}", json_kind(raw))))
    }
}

impl ToJson for f64 {
    fn to_json(&self) -> Json {
        Number::from_f64(*self).map(Json::Number).unwrap_or(Json::Null)
    }
}

impl FromJson for f64 {
    fn from_json(raw: &Json) -> Result<Self> {
        raw.as_f64()
            .ok_or_else(|| Error::schema(format!("expected number, found {}", json_kind(raw))))
    }
}

impl ToJson for String {
    fn to_json(&self) -> Json {
        Json::String(self.clone())
    }
}

impl FromJson for String {
    fn from_json(raw: &Json) -> Result<Self> {
        raw.as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::schema(format!("expected string, found {}", json_kind(raw))))
    }
}

impl<T: ToJson> ToJson for Option<T> {
    fn to_json(&self) -> Json {
        match self {
            Some(v) => v.to_json(),
            None => Json::Null,
        }
    }
}

impl<T: ToJson> ToJson for Vec<T> {
    fn to_json(&self) -> Json {
        Json::Array(self.iter().map(ToJson::to_json).collect())
    }
}

impl<T: FromJson> FromJson for Vec<T> {
    fn from_json(raw: &Json) -> Result<Self> {
        raw.as_array()
            .ok_or_else(|| Error::schema(format!("expected array, found {}", json_kind(raw))))?
            .iter()
            .map(T::from_json)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attribute::FieldKind;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Pair {
        left: i64,
        label: Option<String>,
    }

    impl Described for Pair {
        const TYPE_NAME: &'static str = "Pair";
        const ATTRS: &'static [Attribute] = &[
            Attribute::new("left", FieldKind::Int),
            Attribute::new("label", FieldKind::Str).nullable(),
        ];

        fn field_values(&self) -> Vec<Json> {
            vec![self.left.to_json(), self.label.to_json()]
        }

        fn from_record(record: &Record<'_>) -> Result<Self> {
            Ok(Pair {
                left: record.required("left")?,
                label: record.optional("label")?,
            })
        }
    }

    #[test]
    fn test_encode_omits_absent_nullable_fields() {
        let p = Pair {
            left: 3,
            label: None,
        };
        assert_eq!(encode(&p), json!({"left": 3}));
        let tagged = encode_tagged(&Pair {
            left: 1,
            label: Some("x".into()),
        });
        assert_eq!(tagged, json!({"left": 1, "label": "x", "type": "Pair"}));
    }

    #[test]
    fn test_decode_accepts_explicit_null_and_ignores_extra_keys() {
        let p: Pair = decode(&json!({"left": 7, "label": null, "type": "Pair"})).unwrap();
        assert_eq!(
            p,
            Pair {
                left: 7,
                label: None
            }
        );
        assert!(decode::<Pair>(&json!({"label": "x"})).is_err());
    }

    #[test]
    fn test_type_tag() {
        assert_eq!(type_tag("Result", &json!({"type": "Issue"})).unwrap(), "Issue");
        assert!(type_tag("Result", &json!({})).is_err());
        assert!(type_tag("Result", &json!("Issue")).is_err());
    }
}
