//! Small value records: points, ranges, files, messages and run metadata.

use crate::error::{Error, Result};
use crate::json::{described_json, Described, ToJson};
use crate::models::attribute::{Attribute, FieldKind, Record};
use crate::xml::Element;
use serde_json::Value as Json;
use std::hash::{Hash as StdHash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// A position in a source file. `column == 0` means unknown/start of line.
pub struct Point {
    pub line: i64,
    pub column: i64,
}

impl Point {
    pub fn new(line: i64, column: i64) -> Self {
        Point { line, column }
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("point");
        node.set_attr("line", self.line.to_string());
        node.set_attr("column", self.column.to_string());
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Ok(Point {
            line: node.parse_required_attr("line")?,
            column: node.parse_required_attr("column")?,
        })
    }
}

impl Described for Point {
    const TYPE_NAME: &'static str = "Point";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("line", FieldKind::Int),
        Attribute::new("column", FieldKind::Int),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![self.line.to_json(), self.column.to_json()]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Point::new(record.required("line")?, record.required("column")?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// A span between two points in the same file.
pub struct Range {
    pub start: Point,
    pub end: Point,
}

impl Range {
    pub fn new(start: Point, end: Point) -> Self {
        Range { start, end }
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("range");
        node.push(self.start.to_xml());
        node.push(self.end.to_xml());
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        let points: Vec<&Element> = node.find_all("point").collect();
        match points.as_slice() {
            [start, end] => Ok(Range::new(Point::from_xml(start)?, Point::from_xml(end)?)),
            _ => Err(Error::schema(format!(
                "<range> needs exactly two <point> children, found {}",
                points.len()
            ))),
        }
    }
}

impl Described for Range {
    const TYPE_NAME: &'static str = "Range";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("start", FieldKind::Entity("Point")),
        Attribute::new("end", FieldKind::Entity("Point")),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![self.start.to_json(), self.end.to_json()]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Range::new(record.required("start")?, record.required("end")?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Content digest of a file.
pub struct Hash {
    pub alg: String,
    pub hexdigest: String,
}

impl Hash {
    pub fn new(alg: impl Into<String>, hexdigest: impl Into<String>) -> Self {
        Hash {
            alg: alg.into(),
            hexdigest: hexdigest.into(),
        }
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("hash");
        node.set_attr("alg", self.alg.as_str());
        node.set_attr("hexdigest", self.hexdigest.as_str());
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Ok(Hash::new(
            node.required_attr("alg")?,
            node.required_attr("hexdigest")?,
        ))
    }
}

impl Described for Hash {
    const TYPE_NAME: &'static str = "Hash";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("alg", FieldKind::Str),
        Attribute::new("hexdigest", FieldKind::Str),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![self.alg.to_json(), self.hexdigest.to_json()]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Hash::new(
            record.required::<String>("alg")?,
            record.required::<String>("hexdigest")?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Function {
    pub name: String,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Function { name: name.into() }
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("function");
        node.set_attr("name", self.name.as_str());
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Ok(Function::new(node.required_attr("name")?))
    }
}

impl Described for Function {
    const TYPE_NAME: &'static str = "Function";
    const ATTRS: &'static [Attribute] = &[Attribute::new("name", FieldKind::Str)];

    fn field_values(&self) -> Vec<Json> {
        vec![self.name.to_json()]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Function::new(record.required::<String>("name")?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A source file as named by the analyzer.
///
/// `abspath` and `hash` are normally left empty by adapters and filled in
/// afterwards by the fix-up pass.
pub struct File {
    pub givenpath: String,
    pub abspath: Option<String>,
    pub hash: Option<Hash>,
}

impl File {
    pub fn new(givenpath: impl Into<String>, abspath: Option<String>) -> Self {
        File {
            givenpath: givenpath.into(),
            abspath,
            hash: None,
        }
    }

    pub fn with_hash(mut self, hash: Hash) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Path to read the file from: the absolute path when known.
    pub fn best_path(&self) -> &str {
        self.abspath.as_deref().unwrap_or(&self.givenpath)
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("file");
        node.set_attr("given-path", self.givenpath.as_str());
        node.set_opt_attr("absolute-path", self.abspath.as_deref());
        node.push_opt(self.hash.as_ref().map(Hash::to_xml));
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Ok(File {
            givenpath: node.required_attr("given-path")?.to_string(),
            abspath: node.attr("absolute-path").map(str::to_string),
            hash: node.find("hash").map(Hash::from_xml).transpose()?,
        })
    }
}

impl Described for File {
    const TYPE_NAME: &'static str = "File";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("givenpath", FieldKind::Str),
        Attribute::new("abspath", FieldKind::Str).nullable(),
        Attribute::new("hash", FieldKind::Entity("Hash")).nullable(),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![
            self.givenpath.to_json(),
            self.abspath.to_json(),
            self.hash.to_json(),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(File {
            givenpath: record.required("givenpath")?,
            abspath: record.optional("abspath")?,
            hash: record.optional("hash")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Headline text of a result. May be empty, never absent.
pub struct Message {
    pub text: String,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Message { text: text.into() }
    }

    pub fn to_xml(&self) -> Element {
        Element::new("message").with_text(self.text.as_str())
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Ok(Message::new(node.text_or_empty()))
    }
}

impl Described for Message {
    const TYPE_NAME: &'static str = "Message";
    const ATTRS: &'static [Attribute] = &[Attribute::new("text", FieldKind::Str)];

    fn field_values(&self) -> Vec<Json> {
        vec![self.text.to_json()]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Message::new(record.required::<String>("text")?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Longer free-form explanation attached to an issue or a trace state.
pub struct Notes {
    pub text: String,
}

impl Notes {
    pub fn new(text: impl Into<String>) -> Self {
        Notes { text: text.into() }
    }

    pub fn to_xml(&self) -> Element {
        Element::new("notes").with_text(self.text.as_str())
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Ok(Notes::new(node.text_or_empty()))
    }
}

impl Described for Notes {
    const TYPE_NAME: &'static str = "Notes";
    const ATTRS: &'static [Attribute] = &[Attribute::new("text", FieldKind::Str)];

    fn field_values(&self) -> Vec<Json> {
        vec![self.text.to_json()]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Notes::new(record.required::<String>("text")?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// The tool that produced the analysis.
pub struct Generator {
    pub name: String,
    pub version: Option<String>,
}

impl Generator {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Generator {
            name: name.into(),
            version,
        }
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("generator");
        node.set_attr("name", self.name.as_str());
        node.set_opt_attr("version", self.version.as_deref());
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Ok(Generator::new(
            node.required_attr("name")?,
            node.attr("version").map(str::to_string),
        ))
    }
}

impl Described for Generator {
    const TYPE_NAME: &'static str = "Generator";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("name", FieldKind::Str),
        Attribute::new("version", FieldKind::Str).nullable(),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![self.name.to_json(), self.version.to_json()]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Generator::new(
            record.required::<String>("name")?,
            record.optional("version")?,
        ))
    }
}

#[derive(Debug, Clone, Copy)]
/// Run statistics. The wall-clock time is always finite.
pub struct Stats {
    wallclocktime: f64,
}

impl Stats {
    pub fn new(wallclocktime: f64) -> Result<Self> {
        if !wallclocktime.is_finite() {
            return Err(Error::validation(format!(
                "wall-clock time must be finite, got {}",
                wallclocktime
            )));
        }
        Ok(Stats { wallclocktime })
    }

    pub fn wallclocktime(&self) -> f64 {
        self.wallclocktime
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("stats");
        node.set_attr("wall-clock-time", self.wallclocktime.to_string());
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Stats::new(node.parse_required_attr("wall-clock-time")?)
    }
}

impl PartialEq for Stats {
    fn eq(&self, other: &Self) -> bool {
        self.wallclocktime == other.wallclocktime
    }
}

// Finite by construction, so equality is reflexive.
impl Eq for Stats {}

impl StdHash for Stats {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // -0.0 == 0.0, so both must hash alike
        let v = if self.wallclocktime == 0.0 {
            0.0f64
        } else {
            self.wallclocktime
        };
        v.to_bits().hash(state);
    }
}

impl Described for Stats {
    const TYPE_NAME: &'static str = "Stats";
    const ATTRS: &'static [Attribute] = &[Attribute::new("wallclocktime", FieldKind::Float)];

    fn field_values(&self) -> Vec<Json> {
        vec![self.wallclocktime.to_json()]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Stats::new(record.required("wallclocktime")?)
    }
}

described_json!(Point, Range, Hash, Function, File, Message, Notes, Generator, Stats);
