//! Loading and saving analysis documents on disk.
//!
//! The wire format is taken from the file extension, falling back to the
//! first non-whitespace byte (`<` for XML, `{` for JSON).

use crate::error::{Error, Result};
use crate::models::Analysis;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xml,
    Json,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Xml => "xml",
            Format::Json => "json",
        }
    }

    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xml" => Some(Format::Xml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }

    pub fn sniff(bytes: &[u8]) -> Option<Format> {
        let body = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
        match body.iter().find(|b| !b.is_ascii_whitespace())? {
            b'<' => Some(Format::Xml),
            b'{' => Some(Format::Json),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(Format::Xml),
            "json" => Ok(Format::Json),
            other => Err(Error::validation(format!(
                "unknown document format '{}' (expected xml|json)",
                other
            ))),
        }
    }
}

/// Parse `bytes` as the given format.
pub fn parse(bytes: &[u8], format: Format) -> Result<Analysis> {
    match format {
        Format::Xml => Analysis::from_xml_bytes(bytes),
        Format::Json => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| Error::schema(format!("document is not valid UTF-8: {}", e)))?;
            Analysis::from_json_str(text)
        }
    }
}

/// Read and parse the document at `path`, returning it with its format.
pub fn load_analysis(path: &Path) -> Result<(Analysis, Format)> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    let format = Format::from_path(path)
        .or_else(|| Format::sniff(&bytes))
        .ok_or_else(|| {
            Error::schema(format!(
                "cannot tell whether {} is XML or JSON",
                path.display()
            ))
        })?;
    debug!(path = %path.display(), %format, "loading analysis");
    let analysis = parse(&bytes, format)?;
    Ok((analysis, format))
}

/// Serialize to text. `pretty` only affects JSON; XML is always written
/// compactly after its declaration.
pub fn render(analysis: &Analysis, format: Format, pretty: bool) -> Result<String> {
    match format {
        Format::Xml => analysis.to_xml_string(),
        Format::Json => analysis.to_json_string(pretty),
    }
}

pub fn save_analysis(path: &Path, analysis: &Analysis, format: Format, pretty: bool) -> Result<()> {
    let mut text = render(analysis, format, pretty)?;
    if !text.ends_with('\n') {
        text.push('\n');
    }
    fs::write(path, text)?;
    debug!(path = %path.display(), %format, "wrote analysis");
    Ok(())
}
