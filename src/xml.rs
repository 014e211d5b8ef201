//! Minimal owned XML element tree on top of `quick-xml`.
//!
//! Entities encode themselves into an [`Element`] and decode from one; this
//! module only handles the byte-level reading and writing. Short identifying
//! tokens live in attributes, free text lives in `text`.
//!
//! Text is never trimmed: whitespace inside `<message>` or `<notes>` is
//! content. Whitespace between child elements of a container is collected
//! too but simply ignored by the container's decoder.

use crate::error::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq)]
/// A single XML element with ordered attributes and children.
pub struct Element {
    pub tag: String,
    attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set (or replace) an attribute.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Set an attribute only when a value is present.
    pub fn set_opt_attr(&mut self, name: &str, value: Option<impl ToString>) {
        if let Some(v) = value {
            self.set_attr(name, v.to_string());
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn push_opt(&mut self, child: Option<Element>) {
        if let Some(c) = child {
            self.children.push(c);
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn required_attr(&self, name: &str) -> Result<&str> {
        self.attr(name).ok_or_else(|| {
            Error::schema(format!(
                "<{}> is missing required attribute '{}'",
                self.tag, name
            ))
        })
    }

    /// Parse an optional attribute with `FromStr`; a present but unparseable
    /// value is a schema error.
    pub fn parse_attr<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.attr(name) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
                Error::schema(format!(
                    "<{}> attribute '{}' has invalid value '{}': {}",
                    self.tag, name, raw, e
                ))
            }),
        }
    }

    pub fn parse_required_attr<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.parse_attr(name)?.ok_or_else(|| {
            Error::schema(format!(
                "<{}> is missing required attribute '{}'",
                self.tag, name
            ))
        })
    }

    /// First child with the given tag.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn require(&self, tag: &str) -> Result<&Element> {
        self.find(tag).ok_or_else(|| {
            Error::schema(format!("<{}> is missing required <{}>", self.tag, tag))
        })
    }

    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Element text, with an absent text node read as the empty string.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Parse a whole document and return its root element.
    pub fn parse(input: &str) -> Result<Element> {
        let mut reader = Reader::from_str(input);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(element_from_start(&e)?),
                Event::Empty(e) => {
                    let el = element_from_start(&e)?;
                    attach(&mut stack, &mut root, el)?;
                }
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| Error::schema("unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, el)?;
                }
                Event::Text(t) => {
                    if let Some(top) = stack.last_mut() {
                        let text = t.unescape()?;
                        top.text.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Event::CData(c) => {
                    if let Some(top) = stack.last_mut() {
                        let raw = c.into_inner();
                        let text = std::str::from_utf8(&raw)
                            .map_err(|e| Error::schema(format!("CDATA is not UTF-8: {}", e)))?;
                        top.text.get_or_insert_with(String::new).push_str(text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::schema(format!(
                "unexpected end of document inside <{}>",
                stack[stack.len() - 1].tag
            )));
        }
        root.ok_or_else(|| Error::schema("document has no root element"))
    }

    /// Serialize as a complete UTF-8 document with an XML declaration.
    pub fn to_document_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.write_into(&mut writer)?;
        Ok(writer.into_inner())
    }

    fn write_into<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.tag.as_str());
        for (k, v) in &self.attrs {
            start.push_attribute((k.as_str(), v.as_str()));
        }
        if self.children.is_empty() && self.text.is_none() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_into(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.tag.as_str())))?;
        Ok(())
    }
}

fn element_from_start(e: &BytesStart<'_>) -> Result<Element> {
    let tag = std::str::from_utf8(e.name().as_ref())
        .map_err(|err| Error::schema(format!("element name is not UTF-8: {}", err)))?
        .to_string();
    let mut el = Element::new(tag);
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| Error::schema(format!("attribute name is not UTF-8: {}", err)))?
            .to_string();
        let value = attr.unescape_value()?.into_owned();
        el.attrs.push((key, value));
    }
    Ok(el)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(el),
        None => {
            if root.is_some() {
                return Err(Error::schema("document has more than one root element"));
            }
            *root = Some(el);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attrs_text_and_children() {
        let el = Element::parse(
            r#"<?xml version="1.0"?>
<root a="1" b="x &amp; y"><child>hello &lt;world&gt;</child><leaf/></root>"#,
        )
        .unwrap();
        assert_eq!(el.tag, "root");
        assert_eq!(el.attr("a"), Some("1"));
        assert_eq!(el.attr("b"), Some("x & y"));
        assert_eq!(el.require("child").unwrap().text_or_empty(), "hello <world>");
        assert_eq!(el.find("leaf").unwrap().text, None);
        assert!(el.find("missing").is_none());
    }

    #[test]
    fn test_text_whitespace_preserved() {
        let el = Element::parse("<notes>  line one\n  line two\n</notes>").unwrap();
        assert_eq!(el.text_or_empty(), "  line one\n  line two\n");
    }

    #[test]
    fn test_write_then_parse_escapes() {
        let mut root = Element::new("root");
        root.set_attr("q", "\"quoted\" <tag>");
        root.push(Element::new("m").with_text("a & b"));
        root.push(Element::new("empty"));
        let bytes = root.to_document_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("<empty/>"));
        let back = Element::parse(&text).unwrap();
        assert_eq!(back, root);
    }

    #[test]
    fn test_parse_attr_errors_are_schema() {
        let el = Element::parse(r#"<point line="ten" column="3"/>"#).unwrap();
        assert!(matches!(
            el.parse_required_attr::<i64>("line"),
            Err(Error::Schema(_))
        ));
        assert_eq!(el.parse_required_attr::<i64>("column").unwrap(), 3);
        assert!(matches!(
            el.parse_required_attr::<i64>("missing"),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_unbalanced_document_rejected() {
        assert!(Element::parse("<a><b></a>").is_err());
        assert!(Element::parse("   ").is_err());
    }
}
