//! `<actions>`: UI action definitions and the groups that lay them out.
//!
//! Definitions are keyed by `id`; a later definition with the same id
//! replaces the earlier one wholesale. Groups are merged member by member so
//! an override layer can add actions to a stock group or hide some of them.

use indexmap::{IndexMap, IndexSet};
use roxmltree::Node;
use serde::Serialize;

use crate::element::TypedElement;
use crate::error::Result;
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::reader::ReadElement;
use crate::xml::{
    bool_attribute, bool_child, child_text, expect_element, find_child, find_children, get_text,
    required_attribute,
};

/// A single UI action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionDefinition {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip_id: Option<String>,
    pub show_link: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_listener: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onclick: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allow_permissions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deny_permissions: Vec<String>,
}

impl ActionDefinition {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        let id = required_attribute(node, "id")?;

        let mut params = IndexMap::new();
        if let Some(container) = find_child(node, "params") {
            for param in find_children(container, "param") {
                let name = required_attribute(param, "name")?;
                params.insert(name, get_text(param).unwrap_or_default());
            }
        }

        let mut allow_permissions = Vec::new();
        let mut deny_permissions = Vec::new();
        if let Some(container) = find_child(node, "permissions") {
            for permission in find_children(container, "permission") {
                let Some(name) = get_text(permission) else {
                    continue;
                };
                if bool_attribute(permission, "allow")?.unwrap_or(true) {
                    allow_permissions.push(name);
                } else {
                    deny_permissions.push(name);
                }
            }
        }

        Ok(Self {
            label: child_text(node, "label"),
            label_id: child_text(node, "label-id"),
            tooltip: child_text(node, "tooltip"),
            tooltip_id: child_text(node, "tooltip-id"),
            show_link: bool_child(node, "show-link")?.unwrap_or(true),
            style: child_text(node, "style"),
            style_class: child_text(node, "style-class"),
            image: child_text(node, "image"),
            evaluator: child_text(node, "evaluator"),
            action: child_text(node, "action"),
            action_listener: child_text(node, "action-listener"),
            href: child_text(node, "href"),
            target: child_text(node, "target"),
            script: child_text(node, "script"),
            onclick: child_text(node, "onclick"),
            params,
            allow_permissions,
            deny_permissions,
            id,
        })
    }
}

/// An ordered group of action references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionGroup {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    show_link: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    style_class: Option<String>,
    actions: IndexSet<String>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    hidden: IndexSet<String>,
}

impl ActionGroup {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Whether action links are rendered; `true` unless a layer says otherwise.
    pub fn show_link(&self) -> bool {
        self.show_link.unwrap_or(true)
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn style_class(&self) -> Option<&str> {
        self.style_class.as_deref()
    }

    pub fn add_action(&mut self, idref: impl Into<String>) {
        self.actions.insert(idref.into());
    }

    pub fn hide_action(&mut self, idref: impl Into<String>) {
        self.hidden.insert(idref.into());
    }

    pub fn is_hidden(&self, idref: &str) -> bool {
        self.hidden.contains(idref)
    }

    /// Visible member ids in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .filter(|id| !self.hidden.contains(*id))
            .map(String::as_str)
    }

    fn read(node: Node<'_, '_>) -> Result<Self> {
        let mut group = Self::new(required_attribute(node, "id")?);
        group.show_link = bool_child(node, "show-link")?;
        group.style = child_text(node, "style");
        group.style_class = child_text(node, "style-class");

        for action in find_children(node, "action") {
            let idref = required_attribute(action, "idref")?;
            if bool_attribute(action, "hide")?.unwrap_or(false) {
                group.hide_action(idref);
            } else {
                group.add_action(idref);
            }
        }
        Ok(group)
    }

    fn merge(&self, other: &Self) -> Self {
        let s = &ActionsConfigElement::STRATEGY;
        Self {
            id: self.id.clone(),
            show_link: s.option("action-group/show-link", &self.show_link, &other.show_link),
            style: s.option("action-group/style", &self.style, &other.style),
            style_class: s.option(
                "action-group/style-class",
                &self.style_class,
                &other.style_class,
            ),
            actions: s.set("action-group/action", &self.actions, &other.actions),
            hidden: s.set("action-group/hidden", &self.hidden, &other.hidden),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionsConfigElement {
    definitions: IndexMap<String, ActionDefinition>,
    groups: IndexMap<String, ActionGroup>,
}

impl ActionsConfigElement {
    pub fn action_definition(&self, id: &str) -> Option<&ActionDefinition> {
        self.definitions.get(id)
    }

    pub fn action_definitions(&self) -> &IndexMap<String, ActionDefinition> {
        &self.definitions
    }

    pub fn action_group(&self, id: &str) -> Option<&ActionGroup> {
        self.groups.get(id)
    }

    pub fn action_groups(&self) -> &IndexMap<String, ActionGroup> {
        &self.groups
    }

    pub fn add_action_definition(&mut self, definition: ActionDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn add_action_group(&mut self, group: ActionGroup) {
        self.groups.insert(group.id.clone(), group);
    }
}

impl ReadElement for ActionsConfigElement {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        expect_element(node, Self::ELEMENT)?;
        let mut element = Self::default();
        for action in find_children(node, "action") {
            element.add_action_definition(ActionDefinition::read(action)?);
        }
        for group in find_children(node, "action-group") {
            element.add_action_group(ActionGroup::read(group)?);
        }
        Ok(element)
    }
}

const ACTIONS_RULES: &[FieldRule] = &[
    FieldRule::new("action", MergeKind::MapUnion),
    FieldRule::new("action-group", MergeKind::Nested),
    FieldRule::new("action-group/show-link", MergeKind::OverrideIfSet),
    FieldRule::new("action-group/style", MergeKind::OverrideIfSet),
    FieldRule::new("action-group/style-class", MergeKind::OverrideIfSet),
    FieldRule::new("action-group/action", MergeKind::AppendIfAbsent),
    FieldRule::new("action-group/hidden", MergeKind::AppendIfAbsent),
];

impl Combine for ActionsConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: Self::ELEMENT,
        rules: ACTIONS_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        Self {
            definitions: Self::STRATEGY.map("action", &self.definitions, &other.definitions),
            groups: Self::STRATEGY.map_with(
                "action-group",
                &self.groups,
                &other.groups,
                ActionGroup::merge,
            ),
        }
    }
}
