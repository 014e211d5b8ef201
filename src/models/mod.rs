//! Data model for analyzer output: the `Analysis` tree and its parts.

pub mod analysis;
pub mod attribute;
pub mod custom_fields;
pub mod location;
pub mod primitives;
pub mod result;
pub mod sut;

pub use analysis::{Analysis, Metadata};
pub use attribute::{Attribute, FieldKind};
pub use custom_fields::{CustomFields, CustomValue};
pub use location::{Location, State, Trace};
pub use primitives::{File, Function, Generator, Hash, Message, Notes, Point, Range, Stats};
pub use result::{AnalysisResult, Failure, Info, Issue};
pub use sut::{DebianBinary, DebianSource, SourceRpm, Sut};
