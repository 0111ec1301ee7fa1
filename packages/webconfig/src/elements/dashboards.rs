//! `<dashboards>`: page layouts and dashlets available to user dashboards.

use indexmap::IndexMap;
use roxmltree::Node;
use serde::Serialize;

use crate::element::TypedElement;
use crate::error::{ConfigError, Result};
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::reader::ReadElement;
use crate::xml::{
    bool_attribute, bool_child, expect_element, find_child, find_children, get_attribute,
    get_tag_name, number_attribute, required_attribute,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutDefinition {
    pub id: String,
    pub columns: u32,
    pub column_length: u32,
    pub image: String,
    pub jsp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashletDefinition {
    pub id: String,
    pub jsp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_jsp: Option<String>,
    pub allow_narrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_id: Option<String>,
}

fn required_number(node: Node<'_, '_>, name: &str) -> Result<u32> {
    number_attribute(node, name)?
        .ok_or_else(|| ConfigError::missing_attribute(get_tag_name(node), name))
}

/// Layouts and dashlets must carry a label one way or the other.
fn require_label(node: Node<'_, '_>, label: &Option<String>, label_id: &Option<String>) -> Result<()> {
    if label.is_none() && label_id.is_none() {
        let id = get_attribute(node, "id").unwrap_or_default();
        return Err(ConfigError::invalid_value(
            get_tag_name(node),
            format!("'{id}' must specify 'label' or 'label-id'"),
        ));
    }
    Ok(())
}

impl LayoutDefinition {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        let layout = Self {
            id: required_attribute(node, "id")?,
            columns: required_number(node, "columns")?,
            column_length: required_number(node, "column-length")?,
            image: required_attribute(node, "image")?,
            jsp: required_attribute(node, "jsp")?,
            label: get_attribute(node, "label"),
            label_id: get_attribute(node, "label-id"),
            description: get_attribute(node, "description"),
            description_id: get_attribute(node, "description-id"),
        };
        require_label(node, &layout.label, &layout.label_id)?;
        Ok(layout)
    }
}

impl DashletDefinition {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        let dashlet = Self {
            id: required_attribute(node, "id")?,
            jsp: required_attribute(node, "jsp")?,
            config_jsp: get_attribute(node, "config-jsp"),
            allow_narrow: bool_attribute(node, "allow-narrow")?.unwrap_or(true),
            label: get_attribute(node, "label"),
            label_id: get_attribute(node, "label-id"),
            description: get_attribute(node, "description"),
            description_id: get_attribute(node, "description-id"),
        };
        require_label(node, &dashlet.label, &dashlet.label_id)?;
        Ok(dashlet)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardsConfigElement {
    layouts: IndexMap<String, LayoutDefinition>,
    dashlets: IndexMap<String, DashletDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_dashlets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allow_guest_config: Option<bool>,
}

impl DashboardsConfigElement {
    pub fn layouts(&self) -> &IndexMap<String, LayoutDefinition> {
        &self.layouts
    }

    pub fn layout(&self, id: &str) -> Option<&LayoutDefinition> {
        self.layouts.get(id)
    }

    pub fn dashlets(&self) -> &IndexMap<String, DashletDefinition> {
        &self.dashlets
    }

    pub fn dashlet(&self, id: &str) -> Option<&DashletDefinition> {
        self.dashlets.get(id)
    }

    /// Dashlets placed on a fresh dashboard, empty when none are configured.
    pub fn default_dashlets(&self) -> &[String] {
        self.default_dashlets.as_deref().unwrap_or_default()
    }

    pub fn allow_guest_config(&self) -> bool {
        self.allow_guest_config.unwrap_or(false)
    }
}

impl ReadElement for DashboardsConfigElement {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        expect_element(node, Self::ELEMENT)?;
        let mut element = Self::default();

        if let Some(layouts) = find_child(node, "layouts") {
            for layout in find_children(layouts, "layout") {
                let layout = LayoutDefinition::read(layout)?;
                element.layouts.insert(layout.id.clone(), layout);
            }
        }
        if let Some(dashlets) = find_child(node, "dashlets") {
            for dashlet in find_children(dashlets, "dashlet") {
                let dashlet = DashletDefinition::read(dashlet)?;
                element.dashlets.insert(dashlet.id.clone(), dashlet);
            }
        }
        if let Some(defaults) = find_child(node, "default-dashlets") {
            let ids = find_children(defaults, "dashlet")
                .map(|dashlet| required_attribute(dashlet, "id"))
                .collect::<Result<Vec<_>>>()?;
            element.default_dashlets = Some(ids);
        }
        element.allow_guest_config = bool_child(node, "allow-guest-config")?;
        Ok(element)
    }
}

const DASHBOARDS_RULES: &[FieldRule] = &[
    FieldRule::new("layouts", MergeKind::MapUnion),
    FieldRule::new("dashlets", MergeKind::MapUnion),
    FieldRule::new("default-dashlets", MergeKind::OverrideIfSet),
    FieldRule::new("allow-guest-config", MergeKind::OverrideIfSet),
];

impl Combine for DashboardsConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: Self::ELEMENT,
        rules: DASHBOARDS_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        let s = &Self::STRATEGY;
        Self {
            layouts: s.map("layouts", &self.layouts, &other.layouts),
            dashlets: s.map("dashlets", &self.dashlets, &other.dashlets),
            default_dashlets: s.option(
                "default-dashlets",
                &self.default_dashlets,
                &other.default_dashlets,
            ),
            allow_guest_config: s.option(
                "allow-guest-config",
                &self.allow_guest_config,
                &other.allow_guest_config,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const BASE: &str = r#"
        <dashboards>
            <layouts>
                <layout id="narrow-left-2column" columns="2" column-length="5" image="/images/layouts/narrow-left.png"
                        label-id="layout_narrow_left_label" jsp="/jsp/dashboards/layouts/narrow-left-2column.jsp"/>
            </layouts>
            <dashlets>
                <dashlet id="getting-started" label-id="dashlet_gettingstarted_label"
                         jsp="/jsp/dashboards/dashlets/getting-started.jsp" allow-narrow="false"/>
                <dashlet id="tasks-todo" label-id="my_tasks_todo_title" jsp="/jsp/workflow/tasks-todo-dashlet.jsp"/>
            </dashlets>
            <default-dashlets>
                <dashlet id="getting-started"/>
            </default-dashlets>
        </dashboards>"#;

    fn read(xml: &str) -> Result<DashboardsConfigElement> {
        let doc = Document::parse(xml).unwrap();
        DashboardsConfigElement::read(doc.root_element())
    }

    #[test]
    fn test_read_dashboards() {
        let dashboards = read(BASE).unwrap();

        let layout = dashboards.layout("narrow-left-2column").unwrap();
        assert_eq!(layout.columns, 2);
        assert_eq!(layout.column_length, 5);

        assert!(!dashboards.dashlet("getting-started").unwrap().allow_narrow);
        assert!(dashboards.dashlet("tasks-todo").unwrap().allow_narrow);
        assert_eq!(dashboards.default_dashlets(), &["getting-started".to_string()]);
        assert!(!dashboards.allow_guest_config());
    }

    #[test]
    fn test_layout_requires_mandatory_attributes() {
        let missing_columns = read(
            r#"<dashboards><layouts><layout id="l" column-length="5" image="/i.png" label="L" jsp="/l.jsp"/></layouts></dashboards>"#,
        );
        assert!(matches!(missing_columns, Err(ConfigError::MissingAttribute { attribute, .. }) if attribute == "columns"));

        let missing_label = read(
            r#"<dashboards><dashlets><dashlet id="d" jsp="/d.jsp"/></dashlets></dashboards>"#,
        );
        assert!(matches!(missing_label, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_combine() {
        let base = read(BASE).unwrap();
        let other = read(
            r#"<dashboards>
                <dashlets>
                    <dashlet id="tasks-todo" label="Todo" jsp="/custom/todo.jsp"/>
                </dashlets>
                <allow-guest-config>true</allow-guest-config>
            </dashboards>"#,
        )
        .unwrap();

        let (base_before, other_before) = (base.clone(), other.clone());
        let combined = base.combine(&other);
        assert_eq!(base, base_before);
        assert_eq!(other, other_before);
        assert_eq!(combined.layouts().len(), 1);
        assert_eq!(combined.dashlet("tasks-todo").unwrap().jsp, "/custom/todo.jsp");
        assert_eq!(combined.default_dashlets(), &["getting-started".to_string()]);
        assert!(combined.allow_guest_config());
    }
}
