//! `<dialogs>`: dialog definitions keyed by name.

use indexmap::IndexMap;
use roxmltree::Node;
use serde::Serialize;

use crate::config::{BINDING_PREFIX, DEFAULT_DIALOG_ERROR_MESSAGE_ID};
use crate::element::TypedElement;
use crate::error::{ConfigError, Result};
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::reader::ReadElement;
use crate::xml::{
    bool_attribute, expect_element, find_child, find_children, get_attribute, required_attribute,
};

/// Extra button rendered by a dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogButton {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_id: Option<String>,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onclick: Option<String>,
}

impl DialogButton {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        let id = required_attribute(node, "id")?;
        let action = required_attribute(node, "action")?;
        if !action.starts_with(BINDING_PREFIX) {
            return Err(ConfigError::invalid_value(
                "button",
                format!("action '{action}' of button '{id}' must be a method binding starting with '{BINDING_PREFIX}'"),
            ));
        }
        Ok(Self {
            label: get_attribute(node, "label"),
            label_id: get_attribute(node, "label-id"),
            disabled: get_attribute(node, "disabled"),
            onclick: get_attribute(node, "onclick"),
            id,
            action,
        })
    }
}

/// One dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogConfig {
    pub name: String,
    pub page: String,
    pub managed_bean: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions_config_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub more_actions_config_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_id: Option<String>,
    pub error_message_id: String,
    pub actions_as_menu: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions_menu_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions_menu_label_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub more_actions_menu_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub more_actions_menu_label_id: Option<String>,
    pub show_ok_button: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<DialogButton>,
}

impl DialogConfig {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        let mut buttons = Vec::new();
        if let Some(container) = find_child(node, "buttons") {
            for button in find_children(container, "button") {
                buttons.push(DialogButton::read(button)?);
            }
        }

        Ok(Self {
            name: required_attribute(node, "name")?,
            page: required_attribute(node, "page")?,
            managed_bean: required_attribute(node, "managed-bean")?,
            actions_config_id: get_attribute(node, "actions-config-id"),
            more_actions_config_id: get_attribute(node, "more-actions-config-id"),
            icon: get_attribute(node, "icon"),
            title: get_attribute(node, "title"),
            title_id: get_attribute(node, "title-id"),
            description: get_attribute(node, "description"),
            description_id: get_attribute(node, "description-id"),
            error_message_id: get_attribute(node, "error-message-id")
                .unwrap_or_else(|| DEFAULT_DIALOG_ERROR_MESSAGE_ID.to_string()),
            actions_as_menu: bool_attribute(node, "actions-as-menu")?.unwrap_or(false),
            actions_menu_label: get_attribute(node, "actions-menu-label"),
            actions_menu_label_id: get_attribute(node, "actions-menu-label-id"),
            more_actions_menu_label: get_attribute(node, "more-actions-menu-label"),
            more_actions_menu_label_id: get_attribute(node, "more-actions-menu-label-id"),
            show_ok_button: bool_attribute(node, "show-ok-button")?.unwrap_or(true),
            buttons,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DialogsConfigElement {
    dialogs: IndexMap<String, DialogConfig>,
}

impl DialogsConfigElement {
    pub fn dialog(&self, name: &str) -> Option<&DialogConfig> {
        self.dialogs.get(name)
    }

    pub fn dialogs(&self) -> &IndexMap<String, DialogConfig> {
        &self.dialogs
    }

    pub fn add_dialog(&mut self, dialog: DialogConfig) {
        self.dialogs.insert(dialog.name.clone(), dialog);
    }
}

impl ReadElement for DialogsConfigElement {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        expect_element(node, Self::ELEMENT)?;
        let mut element = Self::default();
        for dialog in find_children(node, "dialog") {
            element.add_dialog(DialogConfig::read(dialog)?);
        }
        Ok(element)
    }
}

const DIALOGS_RULES: &[FieldRule] = &[FieldRule::new("dialog", MergeKind::MapUnion)];

impl Combine for DialogsConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: Self::ELEMENT,
        rules: DIALOGS_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        Self {
            dialogs: Self::STRATEGY.map("dialog", &self.dialogs, &other.dialogs),
        }
    }
}
