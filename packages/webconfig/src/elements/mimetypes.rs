//! `<mimetypes>`: known mimetypes and their file extensions.

use indexmap::IndexMap;
use roxmltree::Node;
use serde::Serialize;

use crate::config::TEXT_MIMETYPE_PREFIX;
use crate::element::TypedElement;
use crate::error::Result;
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::reader::ReadElement;
use crate::xml::{bool_attribute, expect_element, find_children, get_attribute, get_text};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extension {
    pub extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MimetypeDefinition {
    pub mimetype: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    pub text: bool,
    /// Extensions with the default one first.
    pub extensions: Vec<Extension>,
}

impl MimetypeDefinition {
    pub fn default_extension(&self) -> Option<&str> {
        self.extensions.first().map(|e| e.extension.as_str())
    }

    fn read(node: Node<'_, '_>) -> Result<Option<Self>> {
        let Some(mimetype) = get_attribute(node, "mimetype").map(|m| m.to_lowercase()) else {
            tracing::warn!("Skipping <mimetype> entry without a mimetype");
            return Ok(None);
        };

        let mut extensions: Vec<Extension> = Vec::new();
        let mut default_index = None;
        for ext in find_children(node, "extension") {
            let Some(value) = get_text(ext).map(|e| e.to_lowercase()) else {
                continue;
            };
            if bool_attribute(ext, "default")?.unwrap_or(false) && default_index.is_none() {
                default_index = Some(extensions.len());
            }
            extensions.push(Extension {
                extension: value,
                display: get_attribute(ext, "display"),
            });
        }
        if let Some(index) = default_index {
            let default = extensions.remove(index);
            extensions.insert(0, default);
        }

        let text = bool_attribute(node, "text")?.unwrap_or(false)
            || mimetype.starts_with(TEXT_MIMETYPE_PREFIX);

        Ok(Some(Self {
            display: get_attribute(node, "display"),
            text,
            extensions,
            mimetype,
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MimetypesConfigElement {
    mimetypes: IndexMap<String, MimetypeDefinition>,
}

impl MimetypesConfigElement {
    pub fn mimetypes(&self) -> &IndexMap<String, MimetypeDefinition> {
        &self.mimetypes
    }

    pub fn mimetype(&self, mimetype: &str) -> Option<&MimetypeDefinition> {
        self.mimetypes.get(&mimetype.to_lowercase())
    }

    pub fn is_text(&self, mimetype: &str) -> bool {
        self.mimetype(mimetype).is_some_and(|m| m.text)
    }

    /// Extension to mimetype, first declaration wins.
    pub fn mimetypes_by_extension(&self) -> IndexMap<&str, &str> {
        let mut by_extension = IndexMap::new();
        for definition in self.mimetypes.values() {
            for ext in &definition.extensions {
                by_extension
                    .entry(ext.extension.as_str())
                    .or_insert(definition.mimetype.as_str());
            }
        }
        by_extension
    }

    /// Mimetype to its default extension.
    pub fn extensions_by_mimetype(&self) -> IndexMap<&str, &str> {
        self.mimetypes
            .values()
            .filter_map(|m| m.default_extension().map(|ext| (m.mimetype.as_str(), ext)))
            .collect()
    }

    pub fn guess_mimetype(&self, filename: &str) -> Option<&str> {
        let (_, ext) = filename.rsplit_once('.')?;
        let ext = ext.to_lowercase();
        self.mimetypes
            .values()
            .find(|m| m.extensions.iter().any(|e| e.extension == ext))
            .map(|m| m.mimetype.as_str())
    }
}

impl ReadElement for MimetypesConfigElement {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        expect_element(node, Self::ELEMENT)?;
        let mut element = Self::default();
        for entry in find_children(node, "mimetype") {
            if let Some(definition) = MimetypeDefinition::read(entry)? {
                element.mimetypes.insert(definition.mimetype.clone(), definition);
            }
        }
        Ok(element)
    }
}

const MIMETYPES_RULES: &[FieldRule] = &[FieldRule::new("mimetype", MergeKind::MapUnion)];

impl Combine for MimetypesConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: Self::ELEMENT,
        rules: MIMETYPES_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        Self {
            mimetypes: Self::STRATEGY.map("mimetype", &self.mimetypes, &other.mimetypes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn parse(xml: &str) -> MimetypesConfigElement {
        let doc = Document::parse(xml).unwrap();
        MimetypesConfigElement::read(doc.root_element()).unwrap()
    }

    const MIMETYPES: &str = r#"
        <mimetypes>
            <mimetype mimetype="text/HTML" display="HTML">
                <extension>htm</extension>
                <extension default="true">HTML</extension>
            </mimetype>
            <mimetype mimetype="application/json" display="JSON" text="true">
                <extension>json</extension>
            </mimetype>
            <mimetype mimetype="image/png" display="PNG Image">
                <extension display="Portable Network Graphics">png</extension>
            </mimetype>
            <mimetype display="broken"/>
        </mimetypes>"#;

    #[test]
    fn test_read_normalises_and_orders_extensions() {
        let mimetypes = parse(MIMETYPES);
        assert_eq!(mimetypes.mimetypes().len(), 3);

        let html = mimetypes.mimetype("text/html").unwrap();
        assert_eq!(html.default_extension(), Some("html"));
        assert_eq!(html.extensions.len(), 2);
        assert!(html.text);

        assert!(mimetypes.is_text("application/json"));
        assert!(!mimetypes.is_text("image/png"));
        assert_eq!(mimetypes.mimetype("image/png").unwrap().default_extension(), Some("png"));
    }

    #[test]
    fn test_derived_maps() {
        let mimetypes = parse(MIMETYPES);
        let by_extension = mimetypes.mimetypes_by_extension();
        assert_eq!(by_extension.get("htm"), Some(&"text/html"));
        assert_eq!(by_extension.get("png"), Some(&"image/png"));

        let by_mimetype = mimetypes.extensions_by_mimetype();
        assert_eq!(by_mimetype.get("text/html"), Some(&"html"));
        assert_eq!(mimetypes.guess_mimetype("Report.JSON"), Some("application/json"));
        assert_eq!(mimetypes.guess_mimetype("no-extension"), None);
    }

    #[test]
    fn test_combine_replaces_definition() {
        let base = parse(MIMETYPES);
        let other = parse(
            r#"<mimetypes><mimetype mimetype="image/png"><extension>pngx</extension></mimetype></mimetypes>"#,
        );
        let (base_before, other_before) = (base.clone(), other.clone());
        let combined = base.combine(&other);
        assert_eq!(base, base_before);
        assert_eq!(other, other_before);
        assert_eq!(combined.mimetypes().len(), 3);
        assert_eq!(combined.mimetype("image/png").unwrap().default_extension(), Some("pngx"));
    }
}
