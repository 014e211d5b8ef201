//! Results of an analyzer run: issues, failures and informational notes.
//!
//! The XML discriminant is the element name (`issue`, `failure`, `info`);
//! the JSON discriminant is the `type` field. Each variant writes its own.

use crate::error::{Error, Result};
use crate::json::{described_json, encode_tagged, type_tag, Described, FromJson, ToJson};
use crate::models::attribute::{Attribute, FieldKind, Record};
use crate::models::custom_fields::CustomFields;
use crate::models::location::{Location, Trace};
use crate::models::primitives::{Message, Notes};
use crate::xml::Element;
use serde_json::Value as Json;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnalysisResult {
    Issue(Issue),
    Failure(Failure),
    Info(Info),
}

impl AnalysisResult {
    pub fn location(&self) -> Option<&Location> {
        match self {
            AnalysisResult::Issue(i) => Some(&i.location),
            AnalysisResult::Failure(f) => f.location.as_ref(),
            AnalysisResult::Info(i) => i.location.as_ref(),
        }
    }

    pub fn message(&self) -> Option<&Message> {
        match self {
            AnalysisResult::Issue(i) => Some(&i.message),
            AnalysisResult::Failure(f) => f.message.as_ref(),
            AnalysisResult::Info(i) => i.message.as_ref(),
        }
    }

    pub fn customfields(&self) -> Option<&CustomFields> {
        match self {
            AnalysisResult::Issue(i) => i.customfields.as_ref(),
            AnalysisResult::Failure(f) => f.customfields.as_ref(),
            AnalysisResult::Info(i) => i.customfields.as_ref(),
        }
    }

    pub fn as_issue(&self) -> Option<&Issue> {
        match self {
            AnalysisResult::Issue(i) => Some(i),
            _ => None,
        }
    }

    pub fn to_xml(&self) -> Element {
        match self {
            AnalysisResult::Issue(i) => i.to_xml(),
            AnalysisResult::Failure(f) => f.to_xml(),
            AnalysisResult::Info(i) => i.to_xml(),
        }
    }

    /// Decode one child of `<results>`. Unrecognized tags yield `Ok(None)`
    /// so documents from newer schemas still load.
    pub fn from_xml(node: &Element) -> Result<Option<Self>> {
        let result = match node.tag.as_str() {
            "issue" => AnalysisResult::Issue(Issue::from_xml(node)?),
            "failure" => AnalysisResult::Failure(Failure::from_xml(node)?),
            "info" => AnalysisResult::Info(Info::from_xml(node)?),
            _ => return Ok(None),
        };
        Ok(Some(result))
    }
}

impl From<Issue> for AnalysisResult {
    fn from(i: Issue) -> Self {
        AnalysisResult::Issue(i)
    }
}

impl From<Failure> for AnalysisResult {
    fn from(f: Failure) -> Self {
        AnalysisResult::Failure(f)
    }
}

impl From<Info> for AnalysisResult {
    fn from(i: Info) -> Self {
        AnalysisResult::Info(i)
    }
}

impl ToJson for AnalysisResult {
    fn to_json(&self) -> Json {
        match self {
            AnalysisResult::Issue(i) => encode_tagged(i),
            AnalysisResult::Failure(f) => encode_tagged(f),
            AnalysisResult::Info(i) => encode_tagged(i),
        }
    }
}

impl FromJson for AnalysisResult {
    fn from_json(raw: &Json) -> Result<Self> {
        match type_tag("Result", raw)? {
            "Issue" => Issue::from_json(raw).map(AnalysisResult::Issue),
            "Failure" => Failure::from_json(raw).map(AnalysisResult::Failure),
            "Info" => Info::from_json(raw).map(AnalysisResult::Info),
            other => Err(Error::schema(format!("unknown result type: {}", other))),
        }
    }
}

fn optional_custom_fields(node: &Element) -> Result<Option<CustomFields>> {
    node.find("custom-fields")
        .map(CustomFields::from_xml)
        .transpose()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A problem reported against the code under test.
pub struct Issue {
    pub cwe: Option<i64>,
    pub testid: Option<String>,
    pub location: Location,
    pub message: Message,
    pub notes: Option<Notes>,
    pub trace: Option<Trace>,
    pub severity: Option<String>,
    pub customfields: Option<CustomFields>,
}

impl Issue {
    pub fn new(location: Location, message: Message) -> Self {
        Issue {
            cwe: None,
            testid: None,
            location,
            message,
            notes: None,
            trace: None,
            severity: None,
            customfields: None,
        }
    }

    /// `CWE-<n>` when a CWE identifier is set.
    pub fn cwe_str(&self) -> Option<String> {
        self.cwe.map(|cwe| format!("CWE-{}", cwe))
    }

    pub fn cwe_url(&self) -> Option<String> {
        self.cwe
            .map(|cwe| format!("http://cwe.mitre.org/data/definitions/{}.html", cwe))
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("issue");
        node.set_opt_attr("cwe", self.cwe);
        node.set_opt_attr("test-id", self.testid.as_deref());
        node.set_opt_attr("severity", self.severity.as_deref());
        node.push(self.message.to_xml());
        node.push_opt(self.notes.as_ref().map(Notes::to_xml));
        node.push(self.location.to_xml());
        node.push_opt(self.trace.as_ref().map(Trace::to_xml));
        node.push_opt(self.customfields.as_ref().map(CustomFields::to_xml));
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Ok(Issue {
            cwe: node.parse_attr("cwe")?,
            testid: node.attr("test-id").map(str::to_string),
            location: Location::from_xml(node.require("location")?)?,
            message: Message::from_xml(node.require("message")?)?,
            notes: node.find("notes").map(Notes::from_xml).transpose()?,
            trace: node.find("trace").map(Trace::from_xml).transpose()?,
            severity: node.attr("severity").map(str::to_string),
            customfields: optional_custom_fields(node)?,
        })
    }
}

impl Described for Issue {
    const TYPE_NAME: &'static str = "Issue";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("cwe", FieldKind::Int).nullable(),
        Attribute::new("testid", FieldKind::Str).nullable(),
        Attribute::new("location", FieldKind::Entity("Location")),
        Attribute::new("message", FieldKind::Entity("Message")),
        Attribute::new("notes", FieldKind::Entity("Notes")).nullable(),
        Attribute::new("trace", FieldKind::Entity("Trace")).nullable(),
        Attribute::new("severity", FieldKind::Str).nullable(),
        Attribute::new("customfields", FieldKind::Entity("CustomFields")).nullable(),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![
            self.cwe.to_json(),
            self.testid.to_json(),
            self.location.to_json(),
            self.message.to_json(),
            self.notes.to_json(),
            self.trace.to_json(),
            self.severity.to_json(),
            self.customfields.to_json(),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Issue {
            cwe: record.optional("cwe")?,
            testid: record.optional("testid")?,
            location: record.required("location")?,
            message: record.required("message")?,
            notes: record.optional("notes")?,
            trace: record.optional("trace")?,
            severity: record.optional("severity")?,
            customfields: record.optional("customfields")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
/// The analyzer itself failed (crash, timeout, out of memory...).
pub struct Failure {
    pub failureid: Option<String>,
    pub location: Option<Location>,
    pub message: Option<Message>,
    pub customfields: Option<CustomFields>,
}

impl Failure {
    pub fn new(
        failureid: Option<String>,
        location: Option<Location>,
        message: Option<Message>,
        customfields: Option<CustomFields>,
    ) -> Self {
        Failure {
            failureid,
            location,
            message,
            customfields,
        }
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("failure");
        node.set_opt_attr("failure-id", self.failureid.as_deref());
        node.push_opt(self.location.as_ref().map(Location::to_xml));
        node.push_opt(self.message.as_ref().map(Message::to_xml));
        node.push_opt(self.customfields.as_ref().map(CustomFields::to_xml));
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Ok(Failure {
            failureid: node.attr("failure-id").map(str::to_string),
            location: node.find("location").map(Location::from_xml).transpose()?,
            message: node.find("message").map(Message::from_xml).transpose()?,
            customfields: optional_custom_fields(node)?,
        })
    }
}

impl Described for Failure {
    const TYPE_NAME: &'static str = "Failure";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("failureid", FieldKind::Str).nullable(),
        Attribute::new("location", FieldKind::Entity("Location")).nullable(),
        Attribute::new("message", FieldKind::Entity("Message")).nullable(),
        Attribute::new("customfields", FieldKind::Entity("CustomFields")).nullable(),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![
            self.failureid.to_json(),
            self.location.to_json(),
            self.message.to_json(),
            self.customfields.to_json(),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Failure::new(
            record.optional("failureid")?,
            record.optional("location")?,
            record.optional("message")?,
            record.optional("customfields")?,
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
/// Informational output that is neither an issue nor a failure.
pub struct Info {
    pub infoid: Option<String>,
    pub location: Option<Location>,
    pub message: Option<Message>,
    pub customfields: Option<CustomFields>,
}

impl Info {
    pub fn new(
        infoid: Option<String>,
        location: Option<Location>,
        message: Option<Message>,
        customfields: Option<CustomFields>,
    ) -> Self {
        Info {
            infoid,
            location,
            message,
            customfields,
        }
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("info");
        node.set_opt_attr("info-id", self.infoid.as_deref());
        node.push_opt(self.location.as_ref().map(Location::to_xml));
        node.push_opt(self.message.as_ref().map(Message::to_xml));
        node.push_opt(self.customfields.as_ref().map(CustomFields::to_xml));
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Ok(Info {
            infoid: node.attr("info-id").map(str::to_string),
            location: node.find("location").map(Location::from_xml).transpose()?,
            message: node.find("message").map(Message::from_xml).transpose()?,
            customfields: optional_custom_fields(node)?,
        })
    }
}

impl Described for Info {
    const TYPE_NAME: &'static str = "Info";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("infoid", FieldKind::Str).nullable(),
        Attribute::new("location", FieldKind::Entity("Location")).nullable(),
        Attribute::new("message", FieldKind::Entity("Message")).nullable(),
        Attribute::new("customfields", FieldKind::Entity("CustomFields")).nullable(),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![
            self.infoid.to_json(),
            self.location.to_json(),
            self.message.to_json(),
            self.customfields.to_json(),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Info::new(
            record.optional("infoid")?,
            record.optional("location")?,
            record.optional("message")?,
            record.optional("customfields")?,
        ))
    }
}

described_json!(Issue, Failure, Info);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::primitives::{File, Function, Point};
    use serde_json::json;

    fn sample_issue() -> Issue {
        let mut issue = Issue::new(
            Location::new(
                File::new("foo.c", None),
                Some(Function::new("bar")),
                Some(Point::new(10, 15)),
            ),
            Message::new("something bad involving pointers"),
        );
        issue.cwe = Some(681);
        issue.testid = Some("refcount-too-high".into());
        issue.severity = Some("really bad".into());
        issue
    }

    #[test]
    fn test_cwe_helpers() {
        let issue = sample_issue();
        assert_eq!(issue.cwe_str().as_deref(), Some("CWE-681"));
        assert_eq!(
            issue.cwe_url().as_deref(),
            Some("http://cwe.mitre.org/data/definitions/681.html")
        );
        let plain = Issue::new(issue.location.clone(), issue.message.clone());
        assert_eq!(plain.cwe_str(), None);
        assert_eq!(plain.cwe_url(), None);
    }

    #[test]
    fn test_issue_xml_layout() {
        let node = sample_issue().to_xml();
        assert_eq!(node.tag, "issue");
        assert_eq!(node.attr("cwe"), Some("681"));
        assert_eq!(node.attr("test-id"), Some("refcount-too-high"));
        assert_eq!(node.attr("severity"), Some("really bad"));
        let order: Vec<&str> = node.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(order, ["message", "location"]);
    }

    #[test]
    fn test_issue_bad_cwe_is_schema_error() {
        let mut node = sample_issue().to_xml();
        node.set_attr("cwe", "CWE-681");
        assert!(matches!(Issue::from_xml(&node), Err(Error::Schema(_))));
    }

    #[test]
    fn test_discriminant_fidelity() {
        let results = [
            AnalysisResult::from(sample_issue()),
            AnalysisResult::from(Failure::new(Some("out-of-memory".into()), None, None, None)),
            AnalysisResult::from(Info::new(Some("gimple-stats".into()), None, None, None)),
        ];
        for r in &results {
            let via_xml = AnalysisResult::from_xml(&r.to_xml()).unwrap().unwrap();
            let via_json = AnalysisResult::from_json(&r.to_json()).unwrap();
            assert_eq!(std::mem::discriminant(&via_xml), std::mem::discriminant(r));
            assert_eq!(std::mem::discriminant(&via_json), std::mem::discriminant(r));
            assert_eq!(&via_xml, r);
            assert_eq!(&via_json, r);
        }
        assert_eq!(results[1].to_json()["type"], "Failure");
        assert_eq!(results[2].to_json()["type"], "Info");
    }

    #[test]
    fn test_unknown_xml_tag_is_skipped_unknown_json_type_is_error() {
        let node = Element::new("warning");
        assert!(AnalysisResult::from_xml(&node).unwrap().is_none());
        assert!(AnalysisResult::from_json(&json!({"type": "Warning"})).is_err());
    }

    #[test]
    fn test_issue_json_missing_message_is_schema_error() {
        let mut json = sample_issue().to_json();
        json.as_object_mut().unwrap().remove("message");
        assert!(matches!(AnalysisResult::from_json(&json), Err(Error::Schema(_))));
    }
}
