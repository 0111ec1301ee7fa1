//! `<sidebar>`: sidebar plug-ins and the one shown by default.

use indexmap::IndexMap;
use roxmltree::Node;
use serde::Serialize;

use crate::element::TypedElement;
use crate::error::Result;
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::reader::ReadElement;
use crate::xml::{child_text, expect_element, find_child, find_children, get_attribute, required_attribute};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideBarPlugin {
    pub id: String,
    pub page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_listener: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl SideBarPlugin {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        Ok(Self {
            id: required_attribute(node, "id")?,
            page: required_attribute(node, "page")?,
            label: get_attribute(node, "label"),
            label_id: get_attribute(node, "label-id"),
            description: get_attribute(node, "description"),
            description_id: get_attribute(node, "description-id"),
            action_listener: get_attribute(node, "action-listener"),
            icon: get_attribute(node, "icon"),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SidebarConfigElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    default_plugin: Option<String>,
    plugins: IndexMap<String, SideBarPlugin>,
}

impl SidebarConfigElement {
    pub fn default_plugin(&self) -> Option<&str> {
        self.default_plugin.as_deref()
    }

    pub fn plugins(&self) -> &IndexMap<String, SideBarPlugin> {
        &self.plugins
    }

    pub fn plugin(&self, id: &str) -> Option<&SideBarPlugin> {
        self.plugins.get(id)
    }
}

impl ReadElement for SidebarConfigElement {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        expect_element(node, Self::ELEMENT)?;
        let mut plugins = IndexMap::new();
        if let Some(container) = find_child(node, "plugins") {
            for plugin in find_children(container, "plugin") {
                let plugin = SideBarPlugin::read(plugin)?;
                plugins.insert(plugin.id.clone(), plugin);
            }
        }
        Ok(Self {
            default_plugin: child_text(node, "default-plugin"),
            plugins,
        })
    }
}

const SIDEBAR_RULES: &[FieldRule] = &[
    FieldRule::new("default-plugin", MergeKind::OverrideIfSet),
    FieldRule::new("plugins", MergeKind::MapUnion),
];

impl Combine for SidebarConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: Self::ELEMENT,
        rules: SIDEBAR_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        Self {
            default_plugin: Self::STRATEGY.option(
                "default-plugin",
                &self.default_plugin,
                &other.default_plugin,
            ),
            plugins: Self::STRATEGY.map("plugins", &self.plugins, &other.plugins),
        }
    }
}
