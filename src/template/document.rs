//! # Template Documents
//!
//! A minimal owned node tree over XML template files, plus the sources that
//! produce it. The page pipeline only uses the narrow accessors on
//! [`DocumentNode`]: numeric attributes, named children and sibling iteration.

use crate::{LoadError, PageResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One element of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentNode {
    name: String,
    attributes: HashMap<String, String>,
    children: Vec<DocumentNode>,
    text: String,
}

impl DocumentNode {
    /// Creates an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute value parsed as an integer.
    pub fn numeric_attribute(&self, name: &str) -> Option<i64> {
        self.attribute(name)?.trim().parse().ok()
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&DocumentNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All child elements with the given name, in document order.
    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a DocumentNode> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Concatenated text content directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    fn from_start(start: &BytesStart<'_>) -> PageResult<Self> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|err| LoadError::Xml(format!("invalid UTF-8 in element name: {}", err)))?
            .to_string();

        let mut attributes = HashMap::new();
        for attr in start.attributes() {
            let attr = attr
                .map_err(|err| LoadError::Xml(format!("bad attribute in <{}>: {}", name, err)))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|err| LoadError::Xml(format!("invalid UTF-8 in attribute name: {}", err)))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|err| LoadError::Xml(format!("bad value for '{}': {}", key, err)))?
                .into_owned();
            attributes.insert(key, value);
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }
}

/// Parses XML text into its root element.
///
/// # Examples
///
/// ```
/// use pagegen::parse_document;
///
/// let root = parse_document(r#"<map width="4"><layer/></map>"#).unwrap();
/// assert_eq!(root.numeric_attribute("width"), Some(4));
/// assert!(root.child("layer").is_some());
/// ```
pub fn parse_document(xml: &str) -> PageResult<DocumentNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<DocumentNode> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(DocumentNode::from_start(e)?),
            Ok(Event::Empty(ref e)) => {
                let node = DocumentNode::from_start(e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(node),
                }
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| LoadError::Xml("unexpected closing tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(node),
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(node) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| LoadError::Xml(format!("invalid text: {}", err)))?;
                    node.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::Eof) => {
                let reason = if stack.is_empty() {
                    "empty document"
                } else {
                    "unclosed element at end of document"
                };
                return Err(LoadError::Xml(reason.to_string()));
            }
            Err(e) => return Err(LoadError::Xml(format!("{}", e))),
            _ => {} // Skip comments, declarations, etc.
        }
    }
}

/// Outcome of asking a source for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentState {
    /// Parsed and ready to read
    Ready(DocumentNode),
    /// Still loading
    Unready,
    /// Not found or not parsable
    Failed(String),
}

/// Anything that can hand out parsed template documents by path.
pub trait DocumentSource {
    /// Fetches the document at `path`.
    fn fetch(&self, path: &Path) -> DocumentState;
}

/// Reads and parses XML documents from the filesystem.
#[derive(Debug, Clone, Default)]
pub struct XmlDocumentSource {
    base_dir: Option<PathBuf>,
}

impl XmlDocumentSource {
    /// Creates a source resolving paths as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source resolving relative paths against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl DocumentSource for XmlDocumentSource {
    fn fetch(&self, path: &Path) -> DocumentState {
        let full_path = self.resolve(path);
        let content = match std::fs::read_to_string(&full_path) {
            Ok(content) => content,
            Err(err) => return DocumentState::Failed(format!("{}: {}", full_path.display(), err)),
        };

        match parse_document(&content) {
            Ok(root) => DocumentState::Ready(root),
            Err(err) => DocumentState::Failed(err.to_string()),
        }
    }
}

/// Serves documents held in memory, keyed by path.
///
/// Useful for bundled templates and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentSource {
    documents: HashMap<PathBuf, String>,
    unready: Vec<PathBuf>,
}

impl MemoryDocumentSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers document text under a path.
    pub fn insert(&mut self, path: impl Into<PathBuf>, xml: impl Into<String>) {
        self.documents.insert(path.into(), xml.into());
    }

    /// Marks a path as still loading.
    pub fn mark_unready(&mut self, path: impl Into<PathBuf>) {
        self.unready.push(path.into());
    }
}

impl DocumentSource for MemoryDocumentSource {
    fn fetch(&self, path: &Path) -> DocumentState {
        if self.unready.iter().any(|p| p == path) {
            return DocumentState::Unready;
        }
        match self.documents.get(path) {
            Some(xml) => match parse_document(xml) {
                Ok(root) => DocumentState::Ready(root),
                Err(err) => DocumentState::Failed(err.to_string()),
            },
            None => DocumentState::Failed(format!("{}: not registered", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <!-- page template -->
            <map width="3" height="3">
              <layer name="a &amp; b"><data>1,2,3</data></layer>
              <layer name="second"/>
            </map>"#;
        let root = parse_document(xml).unwrap();

        assert_eq!(root.name(), "map");
        assert_eq!(root.numeric_attribute("height"), Some(3));
        assert_eq!(root.children_named("layer").count(), 2);

        let layer = root.child("layer").unwrap();
        assert_eq!(layer.attribute("name"), Some("a & b"));
        assert_eq!(layer.child("data").unwrap().text(), "1,2,3");
    }

    #[test]
    fn test_numeric_attribute_rejects_garbage() {
        let root = parse_document(r#"<map width="wide" height=" 8 "/>"#).unwrap();
        assert_eq!(root.numeric_attribute("width"), None);
        assert_eq!(root.numeric_attribute("height"), Some(8));
        assert_eq!(root.numeric_attribute("depth"), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_document(""), Err(LoadError::Xml(_))));
        assert!(matches!(parse_document("<map><layer></map>"), Err(LoadError::Xml(_))));
        assert!(matches!(parse_document("<map>"), Err(LoadError::Xml(_))));
    }

    #[test]
    fn test_memory_source_states() {
        let mut source = MemoryDocumentSource::new();
        source.insert("a.tmx", "<map/>");
        source.insert("broken.tmx", "<map>");
        source.mark_unready("later.tmx");

        assert!(matches!(source.fetch(Path::new("a.tmx")), DocumentState::Ready(_)));
        assert!(matches!(source.fetch(Path::new("broken.tmx")), DocumentState::Failed(_)));
        assert!(matches!(source.fetch(Path::new("missing.tmx")), DocumentState::Failed(_)));
        assert_eq!(source.fetch(Path::new("later.tmx")), DocumentState::Unready);
    }

    #[test]
    fn test_xml_source_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.tmx"), r#"<map width="1" height="1"/>"#).unwrap();

        let source = XmlDocumentSource::with_base_dir(dir.path());
        match source.fetch(Path::new("page.tmx")) {
            DocumentState::Ready(root) => assert_eq!(root.numeric_attribute("width"), Some(1)),
            other => panic!("expected ready document, got {:?}", other),
        }
        assert!(matches!(source.fetch(Path::new("nope.tmx")), DocumentState::Failed(_)));
    }
}
