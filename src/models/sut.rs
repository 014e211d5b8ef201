//! Software-under-test: which package was analyzed.
//!
//! Three variants share one dispatch. In XML the variant is the single child
//! of a `<sut>` wrapper; in JSON it is the `type` field.

use crate::error::{Error, Result};
use crate::json::{described_json, encode_tagged, type_tag, Described, FromJson, ToJson};
use crate::models::attribute::{Attribute, FieldKind, Record};
use crate::xml::Element;
use serde_json::Value as Json;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sut {
    SourceRpm(SourceRpm),
    DebianSource(DebianSource),
    DebianBinary(DebianBinary),
}

impl Sut {
    pub fn name(&self) -> &str {
        match self {
            Sut::SourceRpm(s) => &s.name,
            Sut::DebianSource(s) => s.name(),
            Sut::DebianBinary(s) => s.name(),
        }
    }

    pub fn version(&self) -> &str {
        match self {
            Sut::SourceRpm(s) => &s.version,
            Sut::DebianSource(s) => s.version(),
            Sut::DebianBinary(s) => s.version(),
        }
    }

    pub fn to_xml(&self) -> Element {
        let inner = match self {
            Sut::SourceRpm(s) => s.inner_xml(),
            Sut::DebianSource(s) => s.inner_xml(),
            Sut::DebianBinary(s) => s.inner_xml(),
        };
        let mut node = Element::new("sut");
        node.push(inner);
        node
    }

    pub fn from_xml(node: &Element) -> Result<Self> {
        if let Some(n) = node.find("source-rpm") {
            return SourceRpm::from_xml(n).map(Sut::SourceRpm);
        }
        if let Some(n) = node.find("debian-source") {
            return DebianSource::from_xml(n).map(Sut::DebianSource);
        }
        if let Some(n) = node.find("debian-binary") {
            return DebianBinary::from_xml(n).map(Sut::DebianBinary);
        }
        Err(Error::schema("unknown sut kind"))
    }
}

impl From<SourceRpm> for Sut {
    fn from(s: SourceRpm) -> Self {
        Sut::SourceRpm(s)
    }
}

impl From<DebianSource> for Sut {
    fn from(s: DebianSource) -> Self {
        Sut::DebianSource(s)
    }
}

impl From<DebianBinary> for Sut {
    fn from(s: DebianBinary) -> Self {
        Sut::DebianBinary(s)
    }
}

impl ToJson for Sut {
    fn to_json(&self) -> Json {
        match self {
            Sut::SourceRpm(s) => encode_tagged(s),
            Sut::DebianSource(s) => encode_tagged(s),
            Sut::DebianBinary(s) => encode_tagged(s),
        }
    }
}

impl FromJson for Sut {
    fn from_json(raw: &Json) -> Result<Self> {
        match type_tag("Sut", raw)? {
            "SourceRpm" => SourceRpm::from_json(raw).map(Sut::SourceRpm),
            "DebianSource" => DebianSource::from_json(raw).map(Sut::DebianSource),
            "DebianBinary" => DebianBinary::from_json(raw).map(Sut::DebianBinary),
            other => Err(Error::schema(format!("unknown sut type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A source RPM, e.g. `python-ethtool-0.7-4.fc19` built for `x86_64`.
pub struct SourceRpm {
    pub name: String,
    pub version: String,
    pub release: String,
    pub buildarch: String,
}

impl SourceRpm {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        release: impl Into<String>,
        buildarch: impl Into<String>,
    ) -> Self {
        SourceRpm {
            name: name.into(),
            version: version.into(),
            release: release.into(),
            buildarch: buildarch.into(),
        }
    }

    fn inner_xml(&self) -> Element {
        let mut node = Element::new("source-rpm");
        node.set_attr("name", self.name.as_str());
        node.set_attr("version", self.version.as_str());
        node.set_attr("release", self.release.as_str());
        node.set_attr("build-arch", self.buildarch.as_str());
        node
    }

    fn from_xml(node: &Element) -> Result<Self> {
        Ok(SourceRpm::new(
            node.required_attr("name")?,
            node.required_attr("version")?,
            node.required_attr("release")?,
            node.required_attr("build-arch")?,
        ))
    }
}

impl Described for SourceRpm {
    const TYPE_NAME: &'static str = "SourceRpm";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("name", FieldKind::Str),
        Attribute::new("version", FieldKind::Str),
        Attribute::new("release", FieldKind::Str),
        Attribute::new("buildarch", FieldKind::Str),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![
            self.name.to_json(),
            self.version.to_json(),
            self.release.to_json(),
            self.buildarch.to_json(),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(SourceRpm::new(
            record.required::<String>("name")?,
            record.required::<String>("version")?,
            record.required::<String>("release")?,
            record.required::<String>("buildarch")?,
        ))
    }
}

/// Debian native packages have no release and no '-' in their version.
fn check_native_version(version: &str, release: Option<&str>) -> Result<()> {
    if release.is_none() && version.contains('-') {
        return Err(Error::validation(format!(
            "native package with dash in the version string: {}",
            version
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A Debian source package. Fields are read-only to keep the
/// native-package invariant.
pub struct DebianSource {
    name: String,
    version: String,
    release: Option<String>,
}

impl DebianSource {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        release: Option<String>,
    ) -> Result<Self> {
        let version = version.into();
        check_native_version(&version, release.as_deref())?;
        Ok(DebianSource {
            name: name.into(),
            version,
            release,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn release(&self) -> Option<&str> {
        self.release.as_deref()
    }

    fn inner_xml(&self) -> Element {
        let mut node = Element::new("debian-source");
        node.set_attr("name", self.name.as_str());
        node.set_attr("version", self.version.as_str());
        node.set_opt_attr("release", self.release.as_deref());
        node
    }

    fn from_xml(node: &Element) -> Result<Self> {
        DebianSource::new(
            node.required_attr("name")?,
            node.required_attr("version")?,
            node.attr("release").map(str::to_string),
        )
    }
}

impl Described for DebianSource {
    const TYPE_NAME: &'static str = "DebianSource";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("name", FieldKind::Str),
        Attribute::new("version", FieldKind::Str),
        Attribute::new("release", FieldKind::Str).nullable(),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![
            self.name.to_json(),
            self.version.to_json(),
            self.release.to_json(),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        DebianSource::new(
            record.required::<String>("name")?,
            record.required::<String>("version")?,
            record.optional("release")?,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A Debian binary package built for one architecture (amd64, armhf, ...).
pub struct DebianBinary {
    name: String,
    version: String,
    release: Option<String>,
    buildarch: String,
}

impl DebianBinary {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        release: Option<String>,
        buildarch: impl Into<String>,
    ) -> Result<Self> {
        let version = version.into();
        check_native_version(&version, release.as_deref())?;
        Ok(DebianBinary {
            name: name.into(),
            version,
            release,
            buildarch: buildarch.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn release(&self) -> Option<&str> {
        self.release.as_deref()
    }

    pub fn buildarch(&self) -> &str {
        &self.buildarch
    }

    fn inner_xml(&self) -> Element {
        let mut node = Element::new("debian-binary");
        node.set_attr("name", self.name.as_str());
        node.set_attr("version", self.version.as_str());
        node.set_opt_attr("release", self.release.as_deref());
        node.set_attr("build-arch", self.buildarch.as_str());
        node
    }

    fn from_xml(node: &Element) -> Result<Self> {
        DebianBinary::new(
            node.required_attr("name")?,
            node.required_attr("version")?,
            node.attr("release").map(str::to_string),
            node.required_attr("build-arch")?,
        )
    }
}

impl Described for DebianBinary {
    const TYPE_NAME: &'static str = "DebianBinary";
    const ATTRS: &'static [Attribute] = &[
        Attribute::new("name", FieldKind::Str),
        Attribute::new("version", FieldKind::Str),
        Attribute::new("release", FieldKind::Str).nullable(),
        Attribute::new("buildarch", FieldKind::Str),
    ];

    fn field_values(&self) -> Vec<Json> {
        vec![
            self.name.to_json(),
            self.version.to_json(),
            self.release.to_json(),
            self.buildarch.to_json(),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        DebianBinary::new(
            record.required::<String>("name")?,
            record.required::<String>("version")?,
            record.optional("release")?,
            record.required::<String>("buildarch")?,
        )
    }
}

described_json!(SourceRpm, DebianSource, DebianBinary);
