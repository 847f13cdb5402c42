//! # Template Module
//!
//! Author-built page templates and the documents they are read from.
//!
//! A template is a square grid of raw 32-bit tile values plus a small property
//! block. Templates are stored as Tiled-style TMX documents; reading them goes
//! through the narrow [`DocumentNode`] accessors so the rest of the pipeline
//! never sees XML.

pub mod document;

pub use document::*;

use crate::symmetry::{AllowedOps, SymmetryOp};
use crate::tiles::decode_str;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-template property overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    properties: HashMap<String, String>,
}

impl TemplateMetadata {
    /// Creates empty metadata (every operation allowed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Gets a property value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Derives the allow-list of symmetry operations.
    ///
    /// Only the literal value `"false"` disables an operation; any other value,
    /// or no value at all, leaves it enabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagegen::{SymmetryOp, TemplateMetadata};
    ///
    /// let metadata = TemplateMetadata::new().with("y_flip", "false");
    /// let allowed = metadata.allowed_ops();
    /// assert!(!allowed.contains(SymmetryOp::FlipY));
    /// assert_eq!(allowed.len(), 6);
    /// ```
    pub fn allowed_ops(&self) -> AllowedOps {
        let mut allowed = AllowedOps::all();
        for op in SymmetryOp::ALL {
            if let Some(key) = op.metadata_key() {
                if self.get(key) == Some("false") {
                    allowed.disable(op);
                }
            }
        }
        allowed
    }

    /// Reads `<properties><property name=".." value=".."/></properties>`.
    pub fn from_node(node: &DocumentNode) -> Self {
        let mut metadata = Self::new();
        if let Some(properties) = node.child("properties") {
            for property in properties.children_named("property") {
                if let (Some(name), Some(value)) =
                    (property.attribute("name"), property.attribute("value"))
                {
                    metadata.set(name, value);
                }
            }
        }
        metadata
    }
}

/// A template as read from its document, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTemplate {
    /// Declared width in cells
    pub width: usize,
    /// Declared height in cells
    pub height: usize,
    /// Raw tile values, row-major
    pub cells: Vec<u32>,
    /// Property overrides
    pub metadata: TemplateMetadata,
}

impl RawTemplate {
    /// Creates a square template with default metadata.
    pub fn square(size: usize, cells: Vec<u32>) -> Self {
        Self {
            width: size,
            height: size,
            cells,
            metadata: TemplateMetadata::new(),
        }
    }

    /// Builder-style metadata replacement.
    pub fn with_metadata(mut self, metadata: TemplateMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Reads a template from a parsed TMX-style document.
    ///
    /// Dimensions come from the `<layer>` element when present and from the
    /// `<map>` root otherwise. Cells are read either from CSV text inside
    /// `<data>` or from `<tile gid=".."/>` siblings; tokens that do not parse
    /// become the default cell. Dimension and count checks are left to
    /// [`SymmetryGrid::load`](crate::SymmetryGrid::load).
    pub fn from_document(root: &DocumentNode) -> Self {
        let layer = root.child("layer");
        let dimension = |name: &str| {
            layer
                .and_then(|layer| layer.numeric_attribute(name))
                .or_else(|| root.numeric_attribute(name))
                .and_then(|value| usize::try_from(value).ok())
                .unwrap_or(0)
        };
        let width = dimension("width");
        let height = dimension("height");

        let data = layer.and_then(|layer| layer.child("data"));
        let cells = data.map(read_cells).unwrap_or_default();

        Self {
            width,
            height,
            cells,
            metadata: TemplateMetadata::from_node(root),
        }
    }
}

fn read_cells(data: &DocumentNode) -> Vec<u32> {
    let tiles: Vec<u32> = data
        .children_named("tile")
        .map(|tile| {
            tile.numeric_attribute("gid")
                .and_then(|gid| u32::try_from(gid).ok())
                .unwrap_or(0)
        })
        .collect();
    if !tiles.is_empty() {
        return tiles;
    }

    // Empty tokens are missing cells and decode to 0. A single trailing
    // comma ends the list rather than adding a cell.
    let text = data.text().trim();
    let text = text.strip_suffix(',').unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }
    text.split(',')
        .map(|token| decode_str(token).raw())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_metadata_only_false_disables() {
        let metadata = TemplateMetadata::new()
            .with("x_flip", "false")
            .with("clockwise", "FALSE")
            .with("transpose", "0")
            .with("anti-transpose", "false");

        let allowed = metadata.allowed_ops();
        assert!(!allowed.contains(SymmetryOp::FlipX));
        assert!(!allowed.contains(SymmetryOp::AntiTranspose));
        assert!(allowed.contains(SymmetryOp::RotateCw));
        assert!(allowed.contains(SymmetryOp::Transpose));
        assert_eq!(allowed.len(), 5);
    }

    #[test]
    fn test_template_from_csv_document() {
        let xml = r#"<?xml version="1.0"?>
            <map width="2" height="2">
              <properties>
                <property name="anti-clockwise" value="false"/>
              </properties>
              <layer name="terrain" width="2" height="2">
                <data encoding="csv">
                  1,0,
                  2147483650,x
                </data>
              </layer>
            </map>"#;
        let root = parse_document(xml).unwrap();
        let template = RawTemplate::from_document(&root);

        assert_eq!(template.width, 2);
        assert_eq!(template.height, 2);
        assert_eq!(template.cells, vec![1, 0, 0x8000_0002, 0]);
        assert!(!template.metadata.allowed_ops().contains(SymmetryOp::RotateCcw));
    }

    #[test]
    fn test_template_from_tile_elements() {
        let xml = r#"<map width="2" height="2">
              <layer>
                <data>
                  <tile gid="1"/><tile gid="2"/><tile/><tile gid="bad"/>
                </data>
              </layer>
            </map>"#;
        let root = parse_document(xml).unwrap();
        let template = RawTemplate::from_document(&root);

        assert_eq!((template.width, template.height), (2, 2));
        assert_eq!(template.cells, vec![1, 2, 0, 0]);
        assert_eq!(template.metadata, TemplateMetadata::new());
    }

    #[test]
    fn test_template_without_layer_is_empty() {
        let root = parse_document(r#"<map width="3" height="3"/>"#).unwrap();
        let template = RawTemplate::from_document(&root);
        assert_eq!(template.width, 3);
        assert!(template.cells.is_empty());
    }

    #[test]
    fn test_empty_csv_tokens_keep_their_cell() {
        let xml = r#"<map width="2" height="2">
              <layer><data encoding="csv">1,,0,0</data></layer>
            </map>"#;
        let template = RawTemplate::from_document(&parse_document(xml).unwrap());
        assert_eq!(template.cells, vec![1, 0, 0, 0]);

        let mut rng = StdRng::seed_from_u64(4);
        assert!(crate::SymmetryGrid::load(&template, &mut rng).is_ok());
    }

    #[test]
    fn test_csv_trailing_comma_and_empty_data() {
        let xml = r#"<map width="2" height="2">
              <layer><data encoding="csv">
                1,2,
                3,4,
              </data></layer>
            </map>"#;
        let template = RawTemplate::from_document(&parse_document(xml).unwrap());
        assert_eq!(template.cells, vec![1, 2, 3, 4]);

        let xml = r#"<map width="1" height="1">
              <layer><data encoding="csv"> </data></layer>
            </map>"#;
        let template = RawTemplate::from_document(&parse_document(xml).unwrap());
        assert!(template.cells.is_empty());
    }
}
