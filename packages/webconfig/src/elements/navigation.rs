//! `<navigation>`: overrides applied to page navigation.
//!
//! Each `<override>` maps exactly one source (a view id or an outcome) to
//! exactly one result (a view id or an outcome).

use indexmap::IndexMap;
use roxmltree::Node;
use serde::Serialize;

use crate::element::{GenericConfigElement, TypedElement};
use crate::error::{ConfigError, Result};
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::reader::ReadElement;
use crate::xml::{expect_element, find_children, get_attribute, get_tag_name};

const FROM_VIEW_ID: &str = "from-view-id";
const FROM_OUTCOME: &str = "from-outcome";
const TO_VIEW_ID: &str = "to-view-id";
const TO_OUTCOME: &str = "to-outcome";

/// Where navigation goes instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationResult {
    pub result: String,
    pub is_outcome: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationConfigElement {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    view_ids: IndexMap<String, NavigationResult>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    outcomes: IndexMap<String, NavigationResult>,
}

/// Pick exactly one of two mutually exclusive attributes.
fn exactly_one(
    node: Node<'_, '_>,
    first: &'static str,
    second: &'static str,
) -> Result<(String, bool)> {
    match (get_attribute(node, first), get_attribute(node, second)) {
        (Some(value), None) => Ok((value, false)),
        (None, Some(value)) => Ok((value, true)),
        (Some(_), Some(_)) => Err(ConfigError::ConflictingAttributes {
            element: get_tag_name(node).to_string(),
            first: first.to_string(),
            second: second.to_string(),
        }),
        (None, None) => Err(ConfigError::invalid_value(
            get_tag_name(node),
            format!("one of '{first}' or '{second}' must be set"),
        )),
    }
}

impl NavigationConfigElement {
    /// Register an override; a later one for the same source replaces the
    /// earlier one.
    pub fn add_override(
        &mut self,
        from_view_id: Option<&str>,
        from_outcome: Option<&str>,
        result: NavigationResult,
    ) -> Result<()> {
        match (from_view_id, from_outcome) {
            (Some(view_id), None) => {
                self.view_ids.insert(view_id.to_string(), result);
            }
            (None, Some(outcome)) => {
                self.outcomes.insert(outcome.to_string(), result);
            }
            (Some(_), Some(_)) => {
                return Err(ConfigError::ConflictingAttributes {
                    element: "override".to_string(),
                    first: FROM_VIEW_ID.to_string(),
                    second: FROM_OUTCOME.to_string(),
                })
            }
            (None, None) => {
                return Err(ConfigError::invalid_value(
                    "override",
                    format!("one of '{FROM_VIEW_ID}' or '{FROM_OUTCOME}' must be set"),
                ))
            }
        }
        Ok(())
    }

    /// Override for the current view or outcome.
    ///
    /// When an outcome is given only outcome overrides are consulted, even if
    /// a view id override would match.
    pub fn override_for(
        &self,
        from_view_id: Option<&str>,
        from_outcome: Option<&str>,
    ) -> Option<&NavigationResult> {
        match from_outcome {
            Some(outcome) => self.outcomes.get(outcome),
            None => from_view_id.and_then(|view_id| self.view_ids.get(view_id)),
        }
    }

    pub fn view_id_overrides(&self) -> &IndexMap<String, NavigationResult> {
        &self.view_ids
    }

    pub fn outcome_overrides(&self) -> &IndexMap<String, NavigationResult> {
        &self.outcomes
    }

    /// The effective overrides as generic `<override>` elements, view id
    /// overrides first.
    pub fn children(&self) -> Vec<GenericConfigElement> {
        let as_child = |from_attr: &str, from: &str, to: &NavigationResult| {
            let to_attr = if to.is_outcome { TO_OUTCOME } else { TO_VIEW_ID };
            GenericConfigElement::new("override")
                .with_attribute(from_attr, from)
                .with_attribute(to_attr, to.result.as_str())
        };
        self.view_ids
            .iter()
            .map(|(from, to)| as_child(FROM_VIEW_ID, from, to))
            .chain(
                self.outcomes
                    .iter()
                    .map(|(from, to)| as_child(FROM_OUTCOME, from, to)),
            )
            .collect()
    }
}

impl ReadElement for NavigationConfigElement {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        expect_element(node, Self::ELEMENT)?;
        let mut element = Self::default();
        for entry in find_children(node, "override") {
            let (from, from_is_outcome) = exactly_one(entry, FROM_VIEW_ID, FROM_OUTCOME)?;
            let (to, to_is_outcome) = exactly_one(entry, TO_VIEW_ID, TO_OUTCOME)?;
            let result = NavigationResult {
                result: to,
                is_outcome: to_is_outcome,
            };
            if from_is_outcome {
                element.add_override(None, Some(&from), result)?;
            } else {
                element.add_override(Some(&from), None, result)?;
            }
        }
        Ok(element)
    }
}

const NAVIGATION_RULES: &[FieldRule] = &[
    FieldRule::new(FROM_VIEW_ID, MergeKind::MapUnion),
    FieldRule::new(FROM_OUTCOME, MergeKind::MapUnion),
];

impl Combine for NavigationConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: Self::ELEMENT,
        rules: NAVIGATION_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        let s = &Self::STRATEGY;
        Self {
            view_ids: s.map(FROM_VIEW_ID, &self.view_ids, &other.view_ids),
            outcomes: s.map(FROM_OUTCOME, &self.outcomes, &other.outcomes),
        }
    }
}
