//! `<property-sheet>`: the ordered properties and associations a node sheet
//! shows.
//!
//! Besides the full item map the element keeps two derived indices, the
//! names visible in view mode and in edit mode. Both follow the last flags
//! seen for a name: [`PropertySheetConfigElement::add_item`] updates them and
//! combining replays every override item against the merged item map.

use indexmap::{IndexMap, IndexSet};
use roxmltree::Node;
use serde::Serialize;

use crate::element::TypedElement;
use crate::error::Result;
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::reader::ReadElement;
use crate::xml::{bool_attribute, element_children, expect_element, get_attribute, get_tag_name, required_attribute};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    Property,
    Association,
    ChildAssociation,
    Separator,
}

impl ItemKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "show-property" => Some(Self::Property),
            "show-association" => Some(Self::Association),
            "show-child-association" => Some(Self::ChildAssociation),
            "separator" => Some(Self::Separator),
            _ => None,
        }
    }
}

/// One entry of a property sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemConfig {
    pub kind: ItemKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_label_id: Option<String>,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_generator: Option<String>,
    pub show_in_view_mode: bool,
    pub show_in_edit_mode: bool,
    pub ignore_if_missing: bool,
}

impl ItemConfig {
    /// A visible, editable item with default flags.
    #[must_use]
    pub fn new(kind: ItemKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            display_label: None,
            display_label_id: None,
            read_only: false,
            converter: None,
            component_generator: None,
            show_in_view_mode: true,
            show_in_edit_mode: true,
            ignore_if_missing: true,
        }
    }

    fn read(kind: ItemKind, node: Node<'_, '_>) -> Result<Self> {
        let mut item = Self::new(kind, required_attribute(node, "name")?);
        item.display_label = get_attribute(node, "display-label");
        item.display_label_id = get_attribute(node, "display-label-id");
        item.read_only = bool_attribute(node, "read-only")?.unwrap_or(false);
        item.converter = get_attribute(node, "converter");
        item.component_generator = get_attribute(node, "component-generator");
        item.show_in_view_mode = bool_attribute(node, "show-in-view-mode")?.unwrap_or(true);
        item.show_in_edit_mode = bool_attribute(node, "show-in-edit-mode")?.unwrap_or(true);
        item.ignore_if_missing = bool_attribute(node, "ignore-if-missing")?.unwrap_or(true);
        Ok(item)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropertySheetConfigElement {
    items: IndexMap<String, ItemConfig>,
    #[serde(skip)]
    view_items: IndexSet<String>,
    #[serde(skip)]
    edit_items: IndexSet<String>,
}

impl PropertySheetConfigElement {
    /// Add or replace an item and update the view and edit indices.
    ///
    /// A name already present keeps its position; an item hidden in a mode
    /// is removed from that mode's index.
    pub fn add_item(&mut self, item: ItemConfig) {
        Self::index(&mut self.view_items, &mut self.edit_items, &item);
        self.items.insert(item.name.clone(), item);
    }

    fn index(
        view_items: &mut IndexSet<String>,
        edit_items: &mut IndexSet<String>,
        item: &ItemConfig,
    ) {
        if item.show_in_view_mode {
            view_items.insert(item.name.clone());
        } else {
            view_items.shift_remove(&item.name);
        }
        if item.show_in_edit_mode {
            edit_items.insert(item.name.clone());
        } else {
            edit_items.shift_remove(&item.name);
        }
    }

    /// Every item ever added, shown or not.
    pub fn items(&self) -> &IndexMap<String, ItemConfig> {
        &self.items
    }

    pub fn item(&self, name: &str) -> Option<&ItemConfig> {
        self.items.get(name)
    }

    pub fn item_names_to_show(&self) -> Vec<&str> {
        self.view_items.iter().map(String::as_str).collect()
    }

    pub fn items_to_show(&self) -> impl Iterator<Item = &ItemConfig> {
        self.view_items.iter().filter_map(|name| self.items.get(name))
    }

    pub fn editable_item_names_to_show(&self) -> Vec<&str> {
        self.edit_items.iter().map(String::as_str).collect()
    }

    pub fn editable_items_to_show(&self) -> impl Iterator<Item = &ItemConfig> {
        self.edit_items.iter().filter_map(|name| self.items.get(name))
    }
}

impl ReadElement for PropertySheetConfigElement {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        expect_element(node, Self::ELEMENT)?;
        let mut element = Self::default();
        for child in element_children(node) {
            match ItemKind::from_tag(get_tag_name(child)) {
                Some(kind) => element.add_item(ItemConfig::read(kind, child)?),
                None => tracing::warn!(
                    tag = get_tag_name(child),
                    "Ignoring unknown property-sheet entry"
                ),
            }
        }
        Ok(element)
    }
}

const PROPERTY_SHEET_RULES: &[FieldRule] = &[
    FieldRule::new("items", MergeKind::MapUnion),
    FieldRule::new("view-items", MergeKind::Derived),
    FieldRule::new("edit-items", MergeKind::Derived),
];

impl Combine for PropertySheetConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: Self::ELEMENT,
        rules: PROPERTY_SHEET_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        let s = &Self::STRATEGY;
        let items = s.map("items", &self.items, &other.items);
        let mut view_items = s.set("view-items", &self.view_items, &other.view_items);
        let mut edit_items = s.set("edit-items", &self.edit_items, &other.edit_items);
        for item in other.items.keys().filter_map(|name| items.get(name)) {
            Self::index(&mut view_items, &mut edit_items, item);
        }
        Self {
            items,
            view_items,
            edit_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roxmltree::Document;

    const VIEWING: &str = r#"
        <property-sheet>
            <show-property name="name"/>
            <show-property name="description" display-label="Description"/>
            <show-property name="icon" show-in-view-mode="false" ignore-if-missing="false"/>
            <show-property name="size" show-in-edit-mode="false" read-only="true"/>
            <show-property name="uuid" show-in-view-mode="false" show-in-edit-mode="false"/>
        </property-sheet>"#;

    const VIEWING_OVERRIDE: &str = r#"
        <property-sheet>
            <show-property name="description" show-in-view-mode="false" show-in-edit-mode="false"/>
            <show-property name="icon" ignore-if-missing="false"/>
            <show-property name="uuid"/>
        </property-sheet>"#;

    fn parse(xml: &str) -> PropertySheetConfigElement {
        let doc = Document::parse(xml).unwrap();
        PropertySheetConfigElement::read(doc.root_element()).unwrap()
    }

    #[test]
    fn test_read_items_and_indices() {
        let sheet = parse(VIEWING);
        assert_eq!(sheet.items().len(), 5);
        assert_eq!(sheet.item_names_to_show(), vec!["name", "description", "size"]);
        assert_eq!(sheet.editable_item_names_to_show(), vec!["name", "description", "icon"]);

        let description = sheet.item("description").unwrap();
        assert_eq!(description.display_label.as_deref(), Some("Description"));
        assert!(!description.read_only);
        assert!(description.ignore_if_missing);

        let size = sheet.item("size").unwrap();
        assert!(size.read_only);
        assert!(!sheet.item("icon").unwrap().ignore_if_missing);
    }

    #[test]
    fn test_item_kinds() {
        let sheet = parse(
            r#"<property-sheet>
                <show-association name="cm:references"/>
                <separator name="sep1"/>
                <show-child-association name="cm:contains"/>
            </property-sheet>"#,
        );
        let kinds: Vec<_> = sheet.items().values().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![ItemKind::Association, ItemKind::Separator, ItemKind::ChildAssociation]
        );
    }

    #[test]
    fn test_add_item_tracks_last_flags() {
        let mut sheet = PropertySheetConfigElement::default();
        sheet.add_item(ItemConfig::new(ItemKind::Property, "name"));
        sheet.add_item(ItemConfig::new(ItemKind::Property, "title"));

        let mut hidden = ItemConfig::new(ItemKind::Property, "name");
        hidden.show_in_view_mode = false;
        sheet.add_item(hidden);
        assert_eq!(sheet.item_names_to_show(), vec!["title"]);
        assert_eq!(sheet.editable_item_names_to_show(), vec!["name", "title"]);

        sheet.add_item(ItemConfig::new(ItemKind::Property, "name"));
        assert_eq!(sheet.item_names_to_show(), vec!["title", "name"]);
    }

    #[test]
    fn test_combine_replays_override_items() {
        let base = parse(VIEWING);
        let other = parse(VIEWING_OVERRIDE);
        let combined = base.combine(&other);

        assert_eq!(combined.items().len(), 5);
        assert_eq!(combined.item_names_to_show(), vec!["name", "size", "icon", "uuid"]);
        assert_eq!(combined.editable_item_names_to_show(), vec!["name", "icon", "uuid"]);

        let icon = combined.item("icon").unwrap();
        assert!(icon.show_in_view_mode);
        assert!(icon.show_in_edit_mode);
        assert!(!icon.ignore_if_missing);

        assert_eq!(base.item_names_to_show(), vec!["name", "description", "size"]);
        assert_eq!(base, parse(VIEWING));
        assert_eq!(other, parse(VIEWING_OVERRIDE));
    }

    #[test]
    fn test_missing_name_fails() {
        let doc = Document::parse("<property-sheet><show-property/></property-sheet>").unwrap();
        assert!(PropertySheetConfigElement::read(doc.root_element()).is_err());
    }
}
