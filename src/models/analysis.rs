//! Top-level document: metadata about one run plus its ordered results.

use crate::error::{Error, Result};
use crate::json::{described_json, Described, FromJson, ToJson};
use crate::models::attribute::{Attribute, FieldKind, Record};
use crate::models::custom_fields::{CustomFields, CustomValue};
use crate::models::primitives::{File, Generator, Stats};
use crate::models::result::AnalysisResult;
use crate::models::sut::Sut;
use crate::xml::Element;
use serde_json::Value as Json;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// What produced the analysis and what it ran against.
pub struct Metadata {
    pub generator: Generator,
    pub sut: Option<Sut>,
    pub file: Option<File>,
    pub stats: Option<Stats>,
}

impl Metadata {
    pub fn new(
        generator: Generator,
        sut: Option<Sut>,
        file: Option<File>,
        stats: Option<Stats>,
    ) -> Self {
        Metadata {
            generator,
            sut,
            file,
            stats,
        }
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("metadata");
        node.push(self.generator.to_xml());
        node.push_opt(self.sut.as_ref().map(Sut::to_xml));
        node.push_opt(self.file.as_ref().map(File::to_xml));
        node.push_opt(self.stats.as_ref().map(Stats::to_xml));
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Ok(Metadata {
            generator: Generator::from_xml(node.require("generator")?)?,
            sut: node.find("sut").map(Sut::from_xml).transpose()?,
            file: node.find("file").map(File::from_xml).transpose()?,
            stats: node.find("stats").map(Stats::from_xml).transpose()?,
        })
    }
}

impl Described for Metadata {
    const TYPE_NAME: &'static str = "Metadata";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("generator", FieldKind::Entity("Generator")),
        Attribute::new("sut", FieldKind::Entity("Sut")).nullable(),
        Attribute::new("file", FieldKind::Entity("File")).nullable(),
        Attribute::new("stats", FieldKind::Entity("Stats")).nullable(),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![
            self.generator.to_json(),
            self.sut.to_json(),
            self.file.to_json(),
            self.stats.to_json(),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Metadata::new(
            record.required("generator")?,
            record.optional("sut")?,
            record.optional("file")?,
            record.optional("stats")?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One analyzer run. `results` order is the canonical issue order.
pub struct Analysis {
    pub metadata: Metadata,
    pub results: Vec<AnalysisResult>,
    pub customfields: Option<CustomFields>,
}

// Only the metadata is hashed: analyses that differ only in their results
// collide, which is accepted.
impl Hash for Analysis {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.metadata.hash(state);
    }
}

impl Analysis {
    pub fn new(metadata: Metadata, results: Vec<AnalysisResult>) -> Self {
        Analysis {
            metadata,
            results,
            customfields: None,
        }
    }

    pub fn with_custom_fields(mut self, customfields: CustomFields) -> Self {
        self.customfields = Some(customfields);
        self
    }

    /// Set a top-level custom field, creating the bag on first use.
    pub fn set_custom_field(&mut self, key: impl Into<String>, value: impl Into<CustomValue>) {
        self.customfields
            .get_or_insert_with(CustomFields::new)
            .set(key, value);
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("analysis");
        node.push(self.metadata.to_xml());
        let mut results = Element::new("results");
        for result in &self.results {
            results.push(result.to_xml());
        }
        node.push(results);
        node.push_opt(self.customfields.as_ref().map(CustomFields::to_xml));
        node
    }

    pub fn from_xml_element(node: &Element) -> Result<Self> {
        if node.tag != "analysis" {
            return Err(Error::schema(format!(
                "expected root element <analysis>, found <{}>",
                node.tag
            )));
        }
        let metadata = Metadata::from_xml(node.require("metadata")?)?;
        let mut results = Vec::new();
        for child in &node.require("results")?.children {
            if let Some(result) = AnalysisResult::from_xml(child)? {
                results.push(result);
            }
        }
        let customfields = node
            .find("custom-fields")
            .map(CustomFields::from_xml)
            .transpose()?;
        Ok(Analysis {
            metadata,
            results,
            customfields,
        })
    }

    /// Parse an XML document.
    pub fn from_xml(input: &str) -> Result<Self> {
        Analysis::from_xml_element(&Element::parse(input)?)
    }

    pub fn from_xml_bytes(input: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(input)
            .map_err(|e| Error::schema(format!("document is not valid UTF-8: {}", e)))?;
        Analysis::from_xml(text.trim_start_matches('\u{feff}'))
    }

    /// Serialize as a UTF-8 XML document.
    pub fn to_xml_bytes(&self) -> Result<Vec<u8>> {
        self.to_xml().to_document_bytes()
    }

    pub fn to_xml_string(&self) -> Result<String> {
        let bytes = self.to_xml_bytes()?;
        String::from_utf8(bytes).map_err(|e| Error::schema(e.to_string()))
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        let raw: Json = serde_json::from_str(input)?;
        Analysis::from_json(&raw)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let json = self.to_json();
        let out = if pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        };
        Ok(out)
    }
}

impl Described for Analysis {
    const TYPE_NAME: &'static str = "Analysis";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("metadata", FieldKind::Entity("Metadata")),
        Attribute::new("results", FieldKind::List("Result")),
        Attribute::new("customfields", FieldKind::Entity("CustomFields")).nullable(),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![
            self.metadata.to_json(),
            self.results.to_json(),
            self.customfields.to_json(),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Analysis {
            metadata: record.required("metadata")?,
            results: record.required("results")?,
            customfields: record.optional("customfields")?,
        })
    }
}

described_json!(Metadata, Analysis);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::location::Location;
    use crate::models::primitives::{Function, Message, Point};
    use crate::models::result::Issue;
    use std::collections::hash_map::DefaultHasher;

    fn simple() -> Analysis {
        let issue = Issue::new(
            Location::new(File::new("foo.c", None), None, Some(Point::new(10, 15))),
            Message::new("something bad involving pointers"),
        );
        Analysis::new(
            Metadata::new(Generator::new("cpychecker", None), None, None, None),
            vec![issue.into()],
        )
    }

    fn hash_of<T: Hash>(t: &T) -> u64 {
        let mut h = DefaultHasher::new();
        t.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_optional_metadata_children_omitted() {
        let a = simple();
        let node = a.metadata.to_xml();
        let tags: Vec<&str> = node.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, ["generator"]);
        let json = a.metadata.to_json();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["generator"]);
    }

    #[test]
    fn test_root_layout() {
        let mut a = simple();
        a.set_custom_field("foo", "bar");
        let node = a.to_xml();
        let tags: Vec<&str> = node.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, ["metadata", "results", "custom-fields"]);
    }

    #[test]
    fn test_set_custom_field_creates_bag() {
        let mut a = simple();
        assert!(a.customfields.is_none());
        a.set_custom_field("foo", "bar");
        let cf = a.customfields.as_ref().unwrap();
        assert_eq!(cf.get("foo").and_then(CustomValue::as_str), Some("bar"));
    }

    #[test]
    fn test_unrecognized_result_tags_skipped() {
        let a = Analysis::from_xml(
            r#"<analysis>
                 <metadata><generator name="test"/></metadata>
                 <results>
                   <issue><message>m</message><location><file given-path="a.c"/></location></issue>
                   <future-kind foo="bar"/>
                   <info info-id="x"/>
                 </results>
               </analysis>"#,
        )
        .unwrap();
        assert_eq!(a.results.len(), 2);
        assert!(matches!(a.results[1], AnalysisResult::Info(_)));
    }

    #[test]
    fn test_wrong_root_and_missing_metadata_rejected() {
        assert!(Analysis::from_xml("<report/>").is_err());
        assert!(Analysis::from_xml("<analysis><results/></analysis>").is_err());
        assert!(Analysis::from_xml_bytes(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn test_hash_ignores_results() {
        let a = simple();
        let mut b = simple();
        b.results.clear();
        assert_ne!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let mut c = simple();
        c.metadata.generator.version = Some("0.11".into());
        assert_ne!(hash_of(&a.metadata), hash_of(&c.metadata));
    }

    #[test]
    fn test_equal_values_hash_equal() {
        let mut a = simple();
        a.metadata.stats = Some(Stats::new(0.4).unwrap());
        if let AnalysisResult::Issue(i) = &mut a.results[0] {
            i.location.function = Some(Function::new("bar"));
        }
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(hash_of(&a.results[0]), hash_of(&b.results[0]));
    }
}
