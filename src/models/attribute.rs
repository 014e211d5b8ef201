//! Per-field metadata driving the generic JSON codec.
//!
//! Every entity publishes an ordered list of [`Attribute`]s. The JSON encoder
//! walks that list to build an object, and the decoder reads each field back
//! through [`Attribute::decode`]. XML stays hand-written per entity because
//! attribute-vs-child placement differs field by field.

use crate::error::{Error, Result};
use crate::json::FromJson;
use serde_json::{Map, Value as Json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Logical type of a described field.
pub enum FieldKind {
    Int,
    Float,
    Str,
    /// Another described entity, by type name.
    Entity(&'static str),
    /// A sequence of described entities, by element type name.
    List(&'static str),
}

impl FieldKind {
    fn accepts(&self, raw: &Json) -> bool {
        match self {
            FieldKind::Int => raw.is_i64() || raw.is_u64(),
            FieldKind::Float => raw.is_number(),
            FieldKind::Str => raw.is_string(),
            FieldKind::Entity(_) => raw.is_object(),
            FieldKind::List(_) => raw.is_array(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FieldKind::Int => "int".to_string(),
            FieldKind::Float => "float".to_string(),
            FieldKind::Str => "string".to_string(),
            FieldKind::Entity(name) => (*name).to_string(),
            FieldKind::List(name) => format!("[{}]", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Description of one field of an entity: name, logical type, nullability.
pub struct Attribute {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl Attribute {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Attribute {
            name,
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(self) -> Self {
        Attribute {
            nullable: true,
            ..self
        }
    }

    /// Decode a raw JSON value for this field.
    ///
    /// A missing value or `null` yields `Ok(None)` regardless of
    /// `nullable`; callers that need a value go through
    /// [`Record::required`], which reports the absence.
    pub fn decode<T: FromJson>(&self, raw: Option<&Json>) -> Result<Option<T>> {
        let raw = match raw {
            None | Some(Json::Null) => return Ok(None),
            Some(v) => v,
        };
        if !self.kind.accepts(raw) {
            return Err(Error::schema(format!(
                "field '{}' expects {}, found {}",
                self.name,
                self.kind.describe(),
                json_kind(raw)
            )));
        }
        T::from_json(raw).map(Some)
    }
}

/// Short name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(n) if n.is_f64() => "float",
        Json::Number(_) => "integer",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// A JSON object being decoded against an entity's attribute list.
pub struct Record<'a> {
    type_name: &'static str,
    attrs: &'static [Attribute],
    object: &'a Map<String, Json>,
}

impl<'a> Record<'a> {
    pub fn new(
        type_name: &'static str,
        attrs: &'static [Attribute],
        raw: &'a Json,
    ) -> Result<Self> {
        let object = raw.as_object().ok_or_else(|| {
            Error::schema(format!(
                "{} must be a JSON object, found {}",
                type_name,
                json_kind(raw)
            ))
        })?;
        Ok(Record {
            type_name,
            attrs,
            object,
        })
    }

    fn attr(&self, name: &str) -> Result<&'static Attribute> {
        self.attrs.iter().find(|a| a.name == name).ok_or_else(|| {
            Error::schema(format!("{} has no field named '{}'", self.type_name, name))
        })
    }

    pub fn optional<T: FromJson>(&self, name: &str) -> Result<Option<T>> {
        self.attr(name)?.decode(self.object.get(name))
    }

    pub fn required<T: FromJson>(&self, name: &str) -> Result<T> {
        self.optional(name)?.ok_or_else(|| {
            Error::schema(format!(
                "{} is missing required field '{}'",
                self.type_name, name
            ))
        })
    }
}
