//! `<views>`: list renderers and per-page view defaults.
//!
//! Per-page lookups fall back to the `default` page block and then to the
//! hard defaults in [`crate::config`].

use indexmap::IndexMap;
use roxmltree::Node;
use serde::Serialize;

use crate::config::{DEFAULT_PAGE_SIZE, DEFAULT_SORT_COLUMN, DEFAULT_VIEW, VIEW_DEFAULTS_PAGE};
use crate::element::TypedElement;
use crate::error::{ConfigError, Result};
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::reader::ReadElement;
use crate::xml::{
    child_text, element_children, expect_element, find_child, find_children, get_tag_name,
    get_text, parse_number,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "ascending" => Ok(Self::Ascending),
            "descending" => Ok(Self::Descending),
            other => Err(ConfigError::invalid_value(
                "sort-direction",
                format!("expected 'ascending' or 'descending', got '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewsConfigElement {
    renderers: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    default_views: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    page_sizes: IndexMap<String, IndexMap<String, u32>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    sort_columns: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    sort_directions: IndexMap<String, SortDirection>,
}

impl ViewsConfigElement {
    /// Renderer implementations in declaration order.
    pub fn views(&self) -> &[String] {
        &self.renderers
    }

    pub fn default_view(&self, page: &str) -> &str {
        Self::lookup(&self.default_views, page)
            .map_or(DEFAULT_VIEW, String::as_str)
    }

    pub fn default_page_size(&self, page: &str, view: &str) -> u32 {
        [page, VIEW_DEFAULTS_PAGE]
            .iter()
            .find_map(|p| self.page_sizes.get(*p).and_then(|sizes| sizes.get(view)))
            .copied()
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn default_sort_column(&self, page: &str) -> &str {
        Self::lookup(&self.sort_columns, page)
            .map_or(DEFAULT_SORT_COLUMN, String::as_str)
    }

    pub fn sort_direction(&self, page: &str) -> SortDirection {
        Self::lookup(&self.sort_directions, page)
            .copied()
            .unwrap_or_default()
    }

    pub fn has_descending_sort(&self, page: &str) -> bool {
        self.sort_direction(page) == SortDirection::Descending
    }

    fn lookup<'a, V>(map: &'a IndexMap<String, V>, page: &str) -> Option<&'a V> {
        map.get(page).or_else(|| map.get(VIEW_DEFAULTS_PAGE))
    }

    fn read_page(&mut self, page_node: Node<'_, '_>) -> Result<()> {
        let page = get_tag_name(page_node).to_string();

        if let Some(view) = child_text(page_node, "default-view") {
            self.default_views.insert(page.clone(), view);
        }
        if let Some(sizes) = find_child(page_node, "page-size") {
            let entry = self.page_sizes.entry(page.clone()).or_default();
            for view in element_children(sizes) {
                let view_name = get_tag_name(view);
                let Some(text) = get_text(view) else {
                    continue;
                };
                entry.insert(view_name.to_string(), parse_number("page-size", view_name, &text)?);
            }
        }
        if let Some(column) = child_text(page_node, "sort-column") {
            self.sort_columns.insert(page.clone(), column);
        }
        if let Some(direction) = child_text(page_node, "sort-direction") {
            self.sort_directions.insert(page, SortDirection::parse(&direction)?);
        }
        Ok(())
    }
}

impl ReadElement for ViewsConfigElement {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        expect_element(node, Self::ELEMENT)?;
        let mut element = Self::default();

        for renderer in find_children(node, "view-impl").filter_map(get_text) {
            if !element.renderers.contains(&renderer) {
                element.renderers.push(renderer);
            }
        }
        if let Some(defaults) = find_child(node, "view-defaults") {
            for page in element_children(defaults) {
                element.read_page(page)?;
            }
        }
        Ok(element)
    }
}

const VIEWS_RULES: &[FieldRule] = &[
    FieldRule::new("view-impl", MergeKind::AppendIfAbsent),
    FieldRule::new("default-view", MergeKind::AppendIfAbsent),
    FieldRule::new("page-size", MergeKind::Nested),
    FieldRule::new("page-size/view", MergeKind::AppendIfAbsent),
    FieldRule::new("sort-column", MergeKind::AppendIfAbsent),
    FieldRule::new("sort-direction", MergeKind::AppendIfAbsent),
];

impl Combine for ViewsConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: Self::ELEMENT,
        rules: VIEWS_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        let s = &Self::STRATEGY;
        Self {
            renderers: s.list("view-impl", &self.renderers, &other.renderers, String::clone),
            default_views: s.map("default-view", &self.default_views, &other.default_views),
            page_sizes: s.map_with(
                "page-size",
                &self.page_sizes,
                &other.page_sizes,
                |base, other| s.map("page-size/view", base, other),
            ),
            sort_columns: s.map("sort-column", &self.sort_columns, &other.sort_columns),
            sort_directions: s.map(
                "sort-direction",
                &self.sort_directions,
                &other.sort_directions,
            ),
        }
    }
}
