//! `<wizards>`: multi-step wizard definitions keyed by name.

use indexmap::IndexMap;
use roxmltree::Node;
use serde::Serialize;

use crate::config::DEFAULT_WIZARD_ERROR_MESSAGE_ID;
use crate::element::TypedElement;
use crate::error::{ConfigError, Result};
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::reader::ReadElement;
use crate::xml::{expect_element, find_child, find_children, get_attribute, required_attribute};

/// Page shown for a wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageConfig {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_id: Option<String>,
}

impl PageConfig {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        Ok(Self {
            path: required_attribute(node, "path")?,
            title: get_attribute(node, "title"),
            title_id: get_attribute(node, "title-id"),
            description: get_attribute(node, "description"),
            description_id: get_attribute(node, "description-id"),
            instruction: get_attribute(node, "instruction"),
            instruction_id: get_attribute(node, "instruction-id"),
        })
    }
}

/// Page used instead of the default when `condition` evaluates to true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionalPageConfig {
    pub condition: String,
    #[serde(flatten)]
    pub page: PageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_page: Option<PageConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    conditional_pages: Vec<ConditionalPageConfig>,
}

impl StepConfig {
    pub fn default_page(&self) -> Option<&PageConfig> {
        self.default_page.as_ref()
    }

    pub fn conditional_pages(&self) -> &[ConditionalPageConfig] {
        &self.conditional_pages
    }

    pub fn has_conditional_pages(&self) -> bool {
        !self.conditional_pages.is_empty()
    }

    fn read(node: Node<'_, '_>) -> Result<Self> {
        let name = required_attribute(node, "name")?;

        let default_page = find_child(node, "page").map(PageConfig::read).transpose()?;
        let mut conditional_pages = Vec::new();
        for condition in find_children(node, "condition") {
            let expression = required_attribute(condition, "if")?;
            let page = find_child(condition, "page").ok_or_else(|| ConfigError::MissingElement {
                element: "condition".to_string(),
                child: "page".to_string(),
            })?;
            conditional_pages.push(ConditionalPageConfig {
                condition: expression,
                page: PageConfig::read(page)?,
            });
        }

        if default_page.is_none() && conditional_pages.is_empty() {
            return Err(ConfigError::invalid_value(
                "step",
                format!("step '{name}' does not define any pages"),
            ));
        }

        Ok(Self {
            title: get_attribute(node, "title"),
            title_id: get_attribute(node, "title-id"),
            description: get_attribute(node, "description"),
            description_id: get_attribute(node, "description-id"),
            name,
            default_page,
            conditional_pages,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardConfig {
    pub name: String,
    pub managed_bean: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions_config_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_id: Option<String>,
    pub error_message_id: String,
    steps: IndexMap<String, StepConfig>,
}

impl WizardConfig {
    pub fn step(&self, name: &str) -> Option<&StepConfig> {
        self.steps.get(name)
    }

    pub fn steps(&self) -> impl Iterator<Item = &StepConfig> {
        self.steps.values()
    }

    pub fn number_of_steps(&self) -> usize {
        self.steps.len()
    }

    fn read(node: Node<'_, '_>) -> Result<Self> {
        let mut steps = IndexMap::new();
        for step in find_children(node, "step") {
            let step = StepConfig::read(step)?;
            steps.insert(step.name.clone(), step);
        }

        Ok(Self {
            name: required_attribute(node, "name")?,
            managed_bean: required_attribute(node, "managed-bean")?,
            actions_config_id: get_attribute(node, "actions-config-id"),
            icon: get_attribute(node, "icon"),
            title: get_attribute(node, "title"),
            title_id: get_attribute(node, "title-id"),
            subtitle: get_attribute(node, "subtitle"),
            subtitle_id: get_attribute(node, "subtitle-id"),
            description: get_attribute(node, "description"),
            description_id: get_attribute(node, "description-id"),
            error_message_id: get_attribute(node, "error-message-id")
                .unwrap_or_else(|| DEFAULT_WIZARD_ERROR_MESSAGE_ID.to_string()),
            steps,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WizardsConfigElement {
    wizards: IndexMap<String, WizardConfig>,
}

impl WizardsConfigElement {
    pub fn wizard(&self, name: &str) -> Option<&WizardConfig> {
        self.wizards.get(name)
    }

    pub fn wizards(&self) -> &IndexMap<String, WizardConfig> {
        &self.wizards
    }

    pub fn add_wizard(&mut self, wizard: WizardConfig) {
        self.wizards.insert(wizard.name.clone(), wizard);
    }
}

impl ReadElement for WizardsConfigElement {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        expect_element(node, Self::ELEMENT)?;
        let mut element = Self::default();
        for wizard in find_children(node, "wizard") {
            element.add_wizard(WizardConfig::read(wizard)?);
        }
        Ok(element)
    }
}

const WIZARDS_RULES: &[FieldRule] = &[FieldRule::new("wizard", MergeKind::MapUnion)];

impl Combine for WizardsConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: Self::ELEMENT,
        rules: WIZARDS_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        Self {
            wizards: Self::STRATEGY.map("wizard", &self.wizards, &other.wizards),
        }
    }
}
