//! Where a result happened, and the path of states that led there.

use crate::error::Result;
use crate::json::{described_json, Described, ToJson};
use crate::models::attribute::{Attribute, FieldKind, Record};
use crate::models::primitives::{File, Function, Notes, Point, Range};
use crate::xml::Element;
use serde_json::Value as Json;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A file plus an optional function and an optional point or range in it.
///
/// Adapters set at most one of `point` and `range`; both absent is valid.
pub struct Location {
    pub file: File,
    pub function: Option<Function>,
    pub point: Option<Point>,
    pub range: Option<Range>,
}

impl Location {
    pub fn new(file: File, function: Option<Function>, point: Option<Point>) -> Self {
        Location {
            file,
            function,
            point,
            range: None,
        }
    }

    pub fn with_range(file: File, function: Option<Function>, range: Range) -> Self {
        Location {
            file,
            function,
            point: None,
            range: Some(range),
        }
    }

    /// Line of the point, else of the range start.
    pub fn line(&self) -> Option<i64> {
        self.anchor().map(|p| p.line)
    }

    /// Column of the point, else of the range start.
    pub fn column(&self) -> Option<i64> {
        self.anchor().map(|p| p.column)
    }

    fn anchor(&self) -> Option<&Point> {
        self.point.as_ref().or(self.range.as_ref().map(|r| &r.start))
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("location");
        node.push(self.file.to_xml());
        node.push_opt(self.function.as_ref().map(Function::to_xml));
        node.push_opt(self.point.as_ref().map(Point::to_xml));
        node.push_opt(self.range.as_ref().map(Range::to_xml));
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Ok(Location {
            file: File::from_xml(node.require("file")?)?,
            function: node.find("function").map(Function::from_xml).transpose()?,
            point: node.find("point").map(Point::from_xml).transpose()?,
            range: node.find("range").map(Range::from_xml).transpose()?,
        })
    }
}

impl Described for Location {
    const TYPE_NAME: &'static str = "Location";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("file", FieldKind::Entity("File")),
        Attribute::new("function", FieldKind::Entity("Function")).nullable(),
        Attribute::new("point", FieldKind::Entity("Point")).nullable(),
        Attribute::new("range", FieldKind::Entity("Range")).nullable(),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![
            self.file.to_json(),
            self.function.to_json(),
            self.point.to_json(),
            self.range.to_json(),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Location {
            file: record.required("file")?,
            function: record.optional("function")?,
            point: record.optional("point")?,
            range: record.optional("range")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// One step of a trace.
pub struct State {
    pub location: Location,
    pub notes: Option<Notes>,
}

impl State {
    pub fn new(location: Location, notes: Option<Notes>) -> Self {
        State { location, notes }
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("state");
        node.push(self.location.to_xml());
        node.push_opt(self.notes.as_ref().map(Notes::to_xml));
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        Ok(State {
            location: Location::from_xml(node.require("location")?)?,
            notes: node.find("notes").map(Notes::from_xml).transpose()?,
        })
    }
}

impl Described for State {
    const TYPE_NAME: &'static str = "State";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("location", FieldKind::Entity("Location")),
        Attribute::new("notes", FieldKind::Entity("Notes")).nullable(),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![self.location.to_json(), self.notes.to_json()]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(State::new(record.required("location")?, record.optional("notes")?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
/// Ordered sequence of states leading to an issue.
pub struct Trace {
    pub states: Vec<State>,
}

impl Trace {
    pub fn new(states: Vec<State>) -> Self {
        Trace { states }
    }

    /// Append a state while a trace is being assembled.
    pub fn add_state(&mut self, state: State) {
        self.states.push(state);
    }

    pub fn to_xml(&self) -> Element {
        let mut node = Element::new("trace");
        for state in &self.states {
            node.push(state.to_xml());
        }
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        let states = node
            .find_all("state")
            .map(State::from_xml)
            .collect::<Result<Vec<_>>>()?;
        Ok(Trace::new(states))
    }
}

impl Described for Trace {
    const TYPE_NAME: &'static str = "Trace";
    const ATTRS: &'static [Attribute] = &[Attribute::new("states", FieldKind::List("State"))];

    fn field_values(&self) -> Vec<Json> {
        vec![self.states.to_json()]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Trace::new(record.required("states")?))
    }
}

described_json!(Location, State, Trace);
