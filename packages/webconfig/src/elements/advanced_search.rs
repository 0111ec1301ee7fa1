//! `<advanced-search>`: types and custom properties offered by the advanced
//! search form.

use roxmltree::Node;
use serde::Serialize;

use crate::element::TypedElement;
use crate::error::{ConfigError, Result};
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::reader::ReadElement;
use crate::xml::{expect_element, find_child, find_children, get_attribute, get_tag_name, required_attribute};

/// A property searchable through the form, owned by a type or an aspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomProperty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect: Option<String>,
    pub property: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_id: Option<String>,
}

impl CustomProperty {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        let type_name = get_attribute(node, "type");
        let aspect = get_attribute(node, "aspect");
        if type_name.is_some() && aspect.is_some() {
            return Err(ConfigError::ConflictingAttributes {
                element: get_tag_name(node).to_string(),
                first: "type".to_string(),
                second: "aspect".to_string(),
            });
        }
        Ok(Self {
            type_name,
            aspect,
            property: required_attribute(node, "property")?,
            label_id: get_attribute(node, "display-label-id"),
        })
    }

    fn key(&self) -> (Option<String>, Option<String>, String) {
        (self.type_name.clone(), self.aspect.clone(), self.property.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdvancedSearchConfigElement {
    content_types: Vec<String>,
    folder_types: Vec<String>,
    custom_properties: Vec<CustomProperty>,
}

fn read_types(node: Node<'_, '_>, container: &str) -> Result<Vec<String>> {
    let mut types: Vec<String> = Vec::new();
    if let Some(container) = find_child(node, container) {
        for ty in find_children(container, "type") {
            let name = required_attribute(ty, "name")?;
            if !types.contains(&name) {
                types.push(name);
            }
        }
    }
    Ok(types)
}

impl AdvancedSearchConfigElement {
    pub fn content_types(&self) -> &[String] {
        &self.content_types
    }

    pub fn folder_types(&self) -> &[String] {
        &self.folder_types
    }

    pub fn custom_properties(&self) -> &[CustomProperty] {
        &self.custom_properties
    }
}

impl ReadElement for AdvancedSearchConfigElement {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        expect_element(node, Self::ELEMENT)?;
        let mut custom_properties = Vec::new();
        if let Some(container) = find_child(node, "custom-properties") {
            for meta in find_children(container, "meta-data") {
                custom_properties.push(CustomProperty::read(meta)?);
            }
        }
        Ok(Self {
            content_types: read_types(node, "content-types")?,
            folder_types: read_types(node, "folder-types")?,
            custom_properties,
        })
    }
}

const ADVANCED_SEARCH_RULES: &[FieldRule] = &[
    FieldRule::new("content-types", MergeKind::AppendIfAbsent),
    FieldRule::new("folder-types", MergeKind::AppendIfAbsent),
    FieldRule::new("custom-properties", MergeKind::AppendIfAbsent),
];

impl Combine for AdvancedSearchConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: Self::ELEMENT,
        rules: ADVANCED_SEARCH_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        let s = &Self::STRATEGY;
        Self {
            content_types: s.list(
                "content-types",
                &self.content_types,
                &other.content_types,
                String::clone,
            ),
            folder_types: s.list(
                "folder-types",
                &self.folder_types,
                &other.folder_types,
                String::clone,
            ),
            custom_properties: s.list(
                "custom-properties",
                &self.custom_properties,
                &other.custom_properties,
                CustomProperty::key,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn read(xml: &str) -> Result<AdvancedSearchConfigElement> {
        let doc = Document::parse(xml).unwrap();
        AdvancedSearchConfigElement::read(doc.root_element())
    }

    #[test]
    fn test_read_advanced_search() {
        let search = read(
            r#"<advanced-search>
                <content-types><type name="cm:dictionaryModel"/></content-types>
                <folder-types><type name="cm:folder"/></folder-types>
                <custom-properties>
                    <meta-data type="cm:content" property="cm:created"/>
                    <meta-data aspect="app:simpleworkflow" property="app:approveStep"/>
                </custom-properties>
            </advanced-search>"#,
        )
        .unwrap();

        assert_eq!(search.content_types(), &["cm:dictionaryModel".to_string()]);
        assert_eq!(search.folder_types(), &["cm:folder".to_string()]);
        assert_eq!(search.custom_properties().len(), 2);
        assert!(search.custom_properties()[0].type_name.is_some());
        assert_eq!(search.custom_properties()[1].aspect.as_deref(), Some("app:simpleworkflow"));
    }

    #[test]
    fn test_type_and_aspect_conflict() {
        let result = read(
            r#"<advanced-search><custom-properties>
                <meta-data type="cm:content" aspect="cm:titled" property="cm:title"/>
            </custom-properties></advanced-search>"#,
        );
        assert!(matches!(result, Err(ConfigError::ConflictingAttributes { .. })));
    }

    #[test]
    fn test_property_is_mandatory() {
        let result = read(
            r#"<advanced-search><custom-properties><meta-data type="cm:content"/></custom-properties></advanced-search>"#,
        );
        assert!(matches!(result, Err(ConfigError::MissingAttribute { .. })));
    }

    #[test]
    fn test_combine_appends() {
        let base = read(
            r#"<advanced-search>
                <content-types><type name="cm:dictionaryModel"/></content-types>
                <custom-properties>
                    <meta-data type="cm:content" property="cm:created"/>
                    <meta-data aspect="app:simpleworkflow" property="app:approveStep"/>
                </custom-properties>
            </advanced-search>"#,
        )
        .unwrap();
        let other = read(
            r#"<advanced-search>
                <content-types><type name="cm:dictionaryModel"/><type name="fm:post"/></content-types>
                <custom-properties>
                    <meta-data aspect="app:simpleworkflow" property="app:approveStep"/>
                    <meta-data aspect="app:simpleworkflow" property="app:rejectStep" display-label-id="reject_step"/>
                </custom-properties>
            </advanced-search>"#,
        )
        .unwrap();

        let (base_before, other_before) = (base.clone(), other.clone());
        let combined = base.combine(&other);
        assert_eq!(base, base_before);
        assert_eq!(other, other_before);
        assert_eq!(
            combined.content_types(),
            &["cm:dictionaryModel".to_string(), "fm:post".to_string()]
        );
        assert_eq!(combined.custom_properties().len(), 3);
        assert_eq!(combined.custom_properties()[2].label_id.as_deref(), Some("reject_step"));
    }
}
