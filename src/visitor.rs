//! Tree walks over an `Analysis`.
//!
//! Both walks are pre-order: a parent is visited before its children, and
//! children are visited in schema field order. Metadata comes before the
//! results; an issue visits its location, message, notes and then each trace
//! state. Custom fields are not visited.

use crate::error::Result;
use crate::models::{
    Analysis, AnalysisResult, Failure, File, Function, Generator, Info, Issue, Location, Message,
    Metadata, Notes, Point, Range, State, Stats, Sut,
};

/// Read-only visitor. Every callback defaults to a no-op.
#[allow(unused_variables)]
pub trait Visitor {
    fn visit_analysis(&mut self, analysis: &Analysis) {}
    fn visit_metadata(&mut self, metadata: &Metadata) {}
    fn visit_generator(&mut self, generator: &Generator) {}
    fn visit_sut(&mut self, sut: &Sut) {}
    fn visit_stats(&mut self, stats: &Stats) {}
    fn visit_result_issue(&mut self, issue: &Issue) {}
    fn visit_result_failure(&mut self, failure: &Failure) {}
    fn visit_result_info(&mut self, info: &Info) {}
    fn visit_message(&mut self, message: &Message) {}
    fn visit_notes(&mut self, notes: &Notes) {}
    fn visit_state(&mut self, state: &State) {}
    fn visit_location(&mut self, location: &Location) {}
    fn visit_file(&mut self, file: &File) {}
    fn visit_function(&mut self, function: &Function) {}
    fn visit_point(&mut self, point: &Point) {}
    fn visit_range(&mut self, range: &Range) {}
}

/// Mutating visitor with fallible callbacks; the first error stops the walk.
#[allow(unused_variables)]
pub trait VisitorMut {
    fn visit_analysis(&mut self, analysis: &mut Analysis) -> Result<()> {
        Ok(())
    }
    fn visit_metadata(&mut self, metadata: &mut Metadata) -> Result<()> {
        Ok(())
    }
    fn visit_generator(&mut self, generator: &mut Generator) -> Result<()> {
        Ok(())
    }
    fn visit_sut(&mut self, sut: &mut Sut) -> Result<()> {
        Ok(())
    }
    fn visit_stats(&mut self, stats: &mut Stats) -> Result<()> {
        Ok(())
    }
    fn visit_result_issue(&mut self, issue: &mut Issue) -> Result<()> {
        Ok(())
    }
    fn visit_result_failure(&mut self, failure: &mut Failure) -> Result<()> {
        Ok(())
    }
    fn visit_result_info(&mut self, info: &mut Info) -> Result<()> {
        Ok(())
    }
    fn visit_message(&mut self, message: &mut Message) -> Result<()> {
        Ok(())
    }
    fn visit_notes(&mut self, notes: &mut Notes) -> Result<()> {
        Ok(())
    }
    fn visit_state(&mut self, state: &mut State) -> Result<()> {
        Ok(())
    }
    fn visit_location(&mut self, location: &mut Location) -> Result<()> {
        Ok(())
    }
    fn visit_file(&mut self, file: &mut File) -> Result<()> {
        Ok(())
    }
    fn visit_function(&mut self, function: &mut Function) -> Result<()> {
        Ok(())
    }
    fn visit_point(&mut self, point: &mut Point) -> Result<()> {
        Ok(())
    }
    fn visit_range(&mut self, range: &mut Range) -> Result<()> {
        Ok(())
    }
}

impl Analysis {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_analysis(self);
        self.metadata.accept(visitor);
        for result in &self.results {
            result.accept(visitor);
        }
    }

    pub fn accept_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) -> Result<()> {
        visitor.visit_analysis(self)?;
        self.metadata.accept_mut(visitor)?;
        for result in &mut self.results {
            result.accept_mut(visitor)?;
        }
        Ok(())
    }

    /// Every file reachable from the document, in traversal order.
    pub fn files(&self) -> Vec<File> {
        let mut collector = FileCollector::default();
        self.accept(&mut collector);
        collector.files
    }
}

impl Metadata {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_metadata(self);
        visitor.visit_generator(&self.generator);
        if let Some(sut) = &self.sut {
            visitor.visit_sut(sut);
        }
        if let Some(file) = &self.file {
            visitor.visit_file(file);
        }
        if let Some(stats) = &self.stats {
            visitor.visit_stats(stats);
        }
    }

    pub fn accept_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) -> Result<()> {
        visitor.visit_metadata(self)?;
        visitor.visit_generator(&mut self.generator)?;
        if let Some(sut) = &mut self.sut {
            visitor.visit_sut(sut)?;
        }
        if let Some(file) = &mut self.file {
            visitor.visit_file(file)?;
        }
        if let Some(stats) = &mut self.stats {
            visitor.visit_stats(stats)?;
        }
        Ok(())
    }
}

impl AnalysisResult {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            AnalysisResult::Issue(issue) => {
                visitor.visit_result_issue(issue);
                issue.location.accept(visitor);
                visitor.visit_message(&issue.message);
                if let Some(notes) = &issue.notes {
                    visitor.visit_notes(notes);
                }
                if let Some(trace) = &issue.trace {
                    for state in &trace.states {
                        state.accept(visitor);
                    }
                }
            }
            AnalysisResult::Failure(failure) => {
                visitor.visit_result_failure(failure);
                walk_optional(visitor, failure.location.as_ref(), failure.message.as_ref());
            }
            AnalysisResult::Info(info) => {
                visitor.visit_result_info(info);
                walk_optional(visitor, info.location.as_ref(), info.message.as_ref());
            }
        }
    }

    pub fn accept_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) -> Result<()> {
        match self {
            AnalysisResult::Issue(issue) => {
                visitor.visit_result_issue(issue)?;
                issue.location.accept_mut(visitor)?;
                visitor.visit_message(&mut issue.message)?;
                if let Some(notes) = &mut issue.notes {
                    visitor.visit_notes(notes)?;
                }
                if let Some(trace) = &mut issue.trace {
                    for state in &mut trace.states {
                        state.accept_mut(visitor)?;
                    }
                }
                Ok(())
            }
            AnalysisResult::Failure(failure) => {
                visitor.visit_result_failure(failure)?;
                walk_optional_mut(visitor, failure.location.as_mut(), failure.message.as_mut())
            }
            AnalysisResult::Info(info) => {
                visitor.visit_result_info(info)?;
                walk_optional_mut(visitor, info.location.as_mut(), info.message.as_mut())
            }
        }
    }
}

fn walk_optional<V: Visitor + ?Sized>(
    visitor: &mut V,
    location: Option<&Location>,
    message: Option<&Message>,
) {
    if let Some(location) = location {
        location.accept(visitor);
    }
    if let Some(message) = message {
        visitor.visit_message(message);
    }
}

fn walk_optional_mut<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    location: Option<&mut Location>,
    message: Option<&mut Message>,
) -> Result<()> {
    if let Some(location) = location {
        location.accept_mut(visitor)?;
    }
    if let Some(message) = message {
        visitor.visit_message(message)?;
    }
    Ok(())
}

impl State {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_state(self);
        self.location.accept(visitor);
        if let Some(notes) = &self.notes {
            visitor.visit_notes(notes);
        }
    }

    pub fn accept_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) -> Result<()> {
        visitor.visit_state(self)?;
        self.location.accept_mut(visitor)?;
        if let Some(notes) = &mut self.notes {
            visitor.visit_notes(notes)?;
        }
        Ok(())
    }
}

impl Location {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_location(self);
        visitor.visit_file(&self.file);
        if let Some(function) = &self.function {
            visitor.visit_function(function);
        }
        if let Some(point) = &self.point {
            visitor.visit_point(point);
        }
        if let Some(range) = &self.range {
            visitor.visit_range(range);
            visitor.visit_point(&range.start);
            visitor.visit_point(&range.end);
        }
    }

    pub fn accept_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) -> Result<()> {
        visitor.visit_location(self)?;
        visitor.visit_file(&mut self.file)?;
        if let Some(function) = &mut self.function {
            visitor.visit_function(function)?;
        }
        if let Some(point) = &mut self.point {
            visitor.visit_point(point)?;
        }
        if let Some(range) = &mut self.range {
            visitor.visit_range(range)?;
            visitor.visit_point(&mut range.start)?;
            visitor.visit_point(&mut range.end)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
/// Collects a copy of every `File` it sees.
pub struct FileCollector {
    pub files: Vec<File>,
}

impl Visitor for FileCollector {
    fn visit_file(&mut self, file: &File) {
        self.files.push(file.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Trace, Hash};

    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
    }

    impl Visitor for Recorder {
        fn visit_analysis(&mut self, _: &Analysis) {
            self.seen.push("analysis".into());
        }
        fn visit_metadata(&mut self, _: &Metadata) {
            self.seen.push("metadata".into());
        }
        fn visit_generator(&mut self, g: &Generator) {
            self.seen.push(format!("generator:{}", g.name));
        }
        fn visit_result_issue(&mut self, _: &Issue) {
            self.seen.push("issue".into());
        }
        fn visit_result_failure(&mut self, _: &Failure) {
            self.seen.push("failure".into());
        }
        fn visit_message(&mut self, _: &Message) {
            self.seen.push("message".into());
        }
        fn visit_notes(&mut self, _: &Notes) {
            self.seen.push("notes".into());
        }
        fn visit_state(&mut self, _: &State) {
            self.seen.push("state".into());
        }
        fn visit_location(&mut self, _: &Location) {
            self.seen.push("location".into());
        }
        fn visit_file(&mut self, f: &File) {
            self.seen.push(format!("file:{}", f.givenpath));
        }
        fn visit_function(&mut self, f: &Function) {
            self.seen.push(format!("function:{}", f.name));
        }
        fn visit_point(&mut self, p: &Point) {
            self.seen.push(format!("point:{}", p.line));
        }
        fn visit_range(&mut self, _: &Range) {
            self.seen.push("range".into());
        }
    }

    fn sample() -> Analysis {
        let mut issue = Issue::new(
            Location::new(
                File::new("foo.c", None),
                Some(Function::new("bar")),
                Some(Point::new(10, 15)),
            ),
            Message::new("m"),
        );
        issue.notes = Some(Notes::new("n"));
        issue.trace = Some(Trace::new(vec![State::new(
            Location::with_range(
                File::new("foo.c", None),
                None,
                Range::new(Point::new(7, 1), Point::new(8, 2)),
            ),
            None,
        )]));
        let failure = Failure::new(
            Some("timeout".into()),
            Some(Location::new(File::new("baz.c", None), None, None)),
            None,
            None,
        );
        Analysis::new(
            Metadata::new(
                Generator::new("cpychecker", None),
                None,
                Some(File::new("top.c", None)),
                None,
            ),
            vec![issue.into(), failure.into()],
        )
    }

    #[test]
    fn test_preorder_in_field_order() {
        let mut rec = Recorder::default();
        sample().accept(&mut rec);
        assert_eq!(
            rec.seen,
            [
                "analysis",
                "metadata",
                "generator:cpychecker",
                "file:top.c",
                "issue",
                "location",
                "file:foo.c",
                "function:bar",
                "point:10",
                "message",
                "notes",
                "state",
                "location",
                "file:foo.c",
                "range",
                "point:7",
                "point:8",
                "failure",
                "location",
                "file:baz.c",
            ]
        );
    }

    #[test]
    fn test_files_lists_every_reachable_file() {
        let names: Vec<String> = sample().files().into_iter().map(|f| f.givenpath).collect();
        assert_eq!(names, ["top.c", "foo.c", "foo.c", "baz.c"]);
    }

    struct Stamp;

    impl VisitorMut for Stamp {
        fn visit_file(&mut self, file: &mut File) -> Result<()> {
            file.hash = Some(Hash::new("sha1", "00"));
            Ok(())
        }
    }

    #[test]
    fn test_visitor_mut_reaches_every_file() {
        let mut a = sample();
        a.accept_mut(&mut Stamp).unwrap();
        assert!(a.files().iter().all(|f| f.hash.is_some()));
    }

    struct FailOnSecond(usize);

    impl VisitorMut for FailOnSecond {
        fn visit_file(&mut self, _: &mut File) -> Result<()> {
            self.0 += 1;
            if self.0 == 2 {
                return Err(crate::error::Error::validation("stop"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_visitor_mut_stops_on_first_error() {
        let mut a = sample();
        let mut v = FailOnSecond(0);
        assert!(a.accept_mut(&mut v).is_err());
        assert_eq!(v.0, 2);
    }
}
