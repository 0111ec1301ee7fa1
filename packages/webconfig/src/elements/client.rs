//! `<client>`: global web client settings.

use roxmltree::Node;
use serde::Serialize;

use crate::element::TypedElement;
use crate::error::{ConfigError, Result};
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::reader::ReadElement;
use crate::xml::{bool_child, child_text, expect_element, number_child};

/// How the breadcrumb trail is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreadcrumbMode {
    #[default]
    Path,
    Location,
}

impl BreadcrumbMode {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "path" => Ok(Self::Path),
            "location" => Ok(Self::Location),
            other => Err(ConfigError::invalid_value(
                "client",
                format!("breadcrumb-mode must be 'path' or 'location', got '{other}'"),
            )),
        }
    }
}

/// Client-wide settings. Every field has a hard-coded default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientConfigElement {
    error_page: Option<String>,
    login_page: Option<String>,
    home_space_permission: Option<String>,
    help_url: Option<String>,
    edit_link_type: Option<String>,
    from_email_address: Option<String>,
    cifs_url_suffix: Option<String>,
    default_home_space_path: String,
    recent_spaces_items: u32,
    search_minimum: u32,
    search_and_terms: bool,
    search_max_results: i32,
    tasks_completed_max_results: u32,
    shelf_visible: bool,
    clipboard_status_visible: bool,
    paste_all_and_clear: bool,
    breadcrumb_mode: BreadcrumbMode,
}

impl Default for ClientConfigElement {
    fn default() -> Self {
        Self {
            error_page: None,
            login_page: None,
            home_space_permission: None,
            help_url: None,
            edit_link_type: None,
            from_email_address: None,
            cifs_url_suffix: None,
            default_home_space_path: "/app:company_home".to_string(),
            recent_spaces_items: 6,
            search_minimum: 3,
            search_and_terms: false,
            search_max_results: -1,
            tasks_completed_max_results: 100,
            shelf_visible: true,
            clipboard_status_visible: true,
            paste_all_and_clear: true,
            breadcrumb_mode: BreadcrumbMode::Path,
        }
    }
}

impl ClientConfigElement {
    pub fn error_page(&self) -> Option<&str> {
        self.error_page.as_deref()
    }

    pub fn login_page(&self) -> Option<&str> {
        self.login_page.as_deref()
    }

    pub fn home_space_permission(&self) -> Option<&str> {
        self.home_space_permission.as_deref()
    }

    pub fn help_url(&self) -> Option<&str> {
        self.help_url.as_deref()
    }

    pub fn edit_link_type(&self) -> Option<&str> {
        self.edit_link_type.as_deref()
    }

    pub fn from_email_address(&self) -> Option<&str> {
        self.from_email_address.as_deref()
    }

    pub fn cifs_url_suffix(&self) -> Option<&str> {
        self.cifs_url_suffix.as_deref()
    }

    pub fn default_home_space_path(&self) -> &str {
        &self.default_home_space_path
    }

    pub fn recent_spaces_items(&self) -> u32 {
        self.recent_spaces_items
    }

    /// Minimum number of characters a search term needs.
    pub fn search_minimum(&self) -> u32 {
        self.search_minimum
    }

    pub fn search_and_terms(&self) -> bool {
        self.search_and_terms
    }

    /// Maximum search results, `-1` for unlimited.
    pub fn search_max_results(&self) -> i32 {
        self.search_max_results
    }

    pub fn tasks_completed_max_results(&self) -> u32 {
        self.tasks_completed_max_results
    }

    pub fn is_shelf_visible(&self) -> bool {
        self.shelf_visible
    }

    pub fn is_clipboard_status_visible(&self) -> bool {
        self.clipboard_status_visible
    }

    pub fn is_paste_all_and_clear(&self) -> bool {
        self.paste_all_and_clear
    }

    pub fn breadcrumb_mode(&self) -> BreadcrumbMode {
        self.breadcrumb_mode
    }
}

impl ReadElement for ClientConfigElement {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        expect_element(node, Self::ELEMENT)?;
        let defaults = Self::default();

        let breadcrumb_mode = match child_text(node, "breadcrumb-mode") {
            Some(mode) => BreadcrumbMode::parse(&mode)?,
            None => defaults.breadcrumb_mode,
        };

        Ok(Self {
            error_page: child_text(node, "error-page"),
            login_page: child_text(node, "login-page"),
            home_space_permission: child_text(node, "home-space-permission"),
            help_url: child_text(node, "help-url"),
            edit_link_type: child_text(node, "edit-link-type"),
            from_email_address: child_text(node, "from-email-address"),
            cifs_url_suffix: child_text(node, "cifs-url-suffix"),
            default_home_space_path: child_text(node, "default-home-space-path")
                .unwrap_or(defaults.default_home_space_path),
            recent_spaces_items: number_child(node, "recent-spaces-items")?
                .unwrap_or(defaults.recent_spaces_items),
            search_minimum: number_child(node, "search-minimum")?
                .unwrap_or(defaults.search_minimum),
            search_and_terms: bool_child(node, "search-and-terms")?
                .unwrap_or(defaults.search_and_terms),
            search_max_results: number_child(node, "search-max-results")?
                .unwrap_or(defaults.search_max_results),
            tasks_completed_max_results: number_child(node, "tasks-completed-max-results")?
                .unwrap_or(defaults.tasks_completed_max_results),
            shelf_visible: bool_child(node, "shelf-visible")?.unwrap_or(defaults.shelf_visible),
            clipboard_status_visible: bool_child(node, "clipboard-status-visible")?
                .unwrap_or(defaults.clipboard_status_visible),
            paste_all_and_clear: bool_child(node, "paste-all-and-clear")?
                .unwrap_or(defaults.paste_all_and_clear),
            breadcrumb_mode,
        })
    }
}

const CLIENT_RULES: &[FieldRule] = &[
    FieldRule::new("error-page", MergeKind::KeyWiseOverride),
    FieldRule::new("login-page", MergeKind::KeyWiseOverride),
    FieldRule::new("home-space-permission", MergeKind::KeyWiseOverride),
    FieldRule::new("help-url", MergeKind::KeyWiseOverride),
    FieldRule::new("edit-link-type", MergeKind::KeyWiseOverride),
    FieldRule::new("from-email-address", MergeKind::KeyWiseOverride),
    FieldRule::new("cifs-url-suffix", MergeKind::KeyWiseOverride),
    FieldRule::new("default-home-space-path", MergeKind::KeyWiseOverride),
    FieldRule::new("recent-spaces-items", MergeKind::KeyWiseOverride),
    FieldRule::new("search-minimum", MergeKind::KeyWiseOverride),
    FieldRule::new("search-and-terms", MergeKind::KeyWiseOverride),
    FieldRule::new("search-max-results", MergeKind::KeyWiseOverride),
    FieldRule::new("tasks-completed-max-results", MergeKind::KeyWiseOverride),
    FieldRule::new("shelf-visible", MergeKind::KeyWiseOverride),
    FieldRule::new("clipboard-status-visible", MergeKind::KeyWiseOverride),
    FieldRule::new("paste-all-and-clear", MergeKind::KeyWiseOverride),
    FieldRule::new("breadcrumb-mode", MergeKind::KeyWiseOverride),
];

impl Combine for ClientConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: Self::ELEMENT,
        rules: CLIENT_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        let d = Self::default();
        let s = &Self::STRATEGY;
        Self {
            error_page: s.value("error-page", &self.error_page, &other.error_page, &d.error_page),
            login_page: s.value("login-page", &self.login_page, &other.login_page, &d.login_page),
            home_space_permission: s.value(
                "home-space-permission",
                &self.home_space_permission,
                &other.home_space_permission,
                &d.home_space_permission,
            ),
            help_url: s.value("help-url", &self.help_url, &other.help_url, &d.help_url),
            edit_link_type: s.value(
                "edit-link-type",
                &self.edit_link_type,
                &other.edit_link_type,
                &d.edit_link_type,
            ),
            from_email_address: s.value(
                "from-email-address",
                &self.from_email_address,
                &other.from_email_address,
                &d.from_email_address,
            ),
            cifs_url_suffix: s.value(
                "cifs-url-suffix",
                &self.cifs_url_suffix,
                &other.cifs_url_suffix,
                &d.cifs_url_suffix,
            ),
            default_home_space_path: s.value(
                "default-home-space-path",
                &self.default_home_space_path,
                &other.default_home_space_path,
                &d.default_home_space_path,
            ),
            recent_spaces_items: s.value(
                "recent-spaces-items",
                &self.recent_spaces_items,
                &other.recent_spaces_items,
                &d.recent_spaces_items,
            ),
            search_minimum: s.value(
                "search-minimum",
                &self.search_minimum,
                &other.search_minimum,
                &d.search_minimum,
            ),
            search_and_terms: s.value(
                "search-and-terms",
                &self.search_and_terms,
                &other.search_and_terms,
                &d.search_and_terms,
            ),
            search_max_results: s.value(
                "search-max-results",
                &self.search_max_results,
                &other.search_max_results,
                &d.search_max_results,
            ),
            tasks_completed_max_results: s.value(
                "tasks-completed-max-results",
                &self.tasks_completed_max_results,
                &other.tasks_completed_max_results,
                &d.tasks_completed_max_results,
            ),
            shelf_visible: s.value(
                "shelf-visible",
                &self.shelf_visible,
                &other.shelf_visible,
                &d.shelf_visible,
            ),
            clipboard_status_visible: s.value(
                "clipboard-status-visible",
                &self.clipboard_status_visible,
                &other.clipboard_status_visible,
                &d.clipboard_status_visible,
            ),
            paste_all_and_clear: s.value(
                "paste-all-and-clear",
                &self.paste_all_and_clear,
                &other.paste_all_and_clear,
                &d.paste_all_and_clear,
            ),
            breadcrumb_mode: s.value(
                "breadcrumb-mode",
                &self.breadcrumb_mode,
                &other.breadcrumb_mode,
                &d.breadcrumb_mode,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn parse(xml: &str) -> ClientConfigElement {
        let doc = Document::parse(xml).unwrap();
        ClientConfigElement::read(doc.root_element()).unwrap()
    }

    #[test]
    fn test_defaults_when_empty() {
        let client = parse("<client/>");
        assert_eq!(client, ClientConfigElement::default());
        assert_eq!(client.recent_spaces_items(), 6);
        assert_eq!(client.search_minimum(), 3);
        assert!(client.is_shelf_visible());
        assert_eq!(client.breadcrumb_mode(), BreadcrumbMode::Path);
    }

    #[test]
    fn test_read_values() {
        let client = parse(
            r#"<client>
                <error-page>/jsp/error.jsp</error-page>
                <recent-spaces-items>4</recent-spaces-items>
                <shelf-visible>false</shelf-visible>
                <breadcrumb-mode>location</breadcrumb-mode>
            </client>"#,
        );
        assert_eq!(client.error_page(), Some("/jsp/error.jsp"));
        assert_eq!(client.recent_spaces_items(), 4);
        assert!(!client.is_shelf_visible());
        assert_eq!(client.breadcrumb_mode(), BreadcrumbMode::Location);
    }

    #[test]
    fn test_invalid_number_fails() {
        let doc = Document::parse("<client><search-minimum>ten</search-minimum></client>").unwrap();
        assert!(matches!(
            ClientConfigElement::read(doc.root_element()),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_invalid_breadcrumb_mode_fails() {
        let doc = Document::parse("<client><breadcrumb-mode>tree</breadcrumb-mode></client>").unwrap();
        assert!(ClientConfigElement::read(doc.root_element()).is_err());
    }

    #[test]
    fn test_wrong_element_fails() {
        let doc = Document::parse("<server/>").unwrap();
        assert!(matches!(
            ClientConfigElement::read(doc.root_element()),
            Err(ConfigError::WrongElement { .. })
        ));
    }

    #[test]
    fn test_combine_search_minimum() {
        let base = parse("<client><search-minimum>3</search-minimum></client>");
        let other = parse("<client><search-minimum>10</search-minimum></client>");

        let (base_before, other_before) = (base.clone(), other.clone());
        let combined = base.combine(&other);
        assert_eq!(base, base_before);
        assert_eq!(other, other_before);
        assert_eq!(combined.search_minimum(), 10);
        assert!(combined.is_shelf_visible());
    }

    #[test]
    fn test_combine_keeps_base_when_override_unset() {
        let base = parse(
            "<client><login-page>/jsp/login.jsp</login-page><recent-spaces-items>9</recent-spaces-items></client>",
        );
        let other = parse("<client><help-url>http://help</help-url></client>");

        let (base_before, other_before) = (base.clone(), other.clone());
        let combined = base.combine(&other);
        assert_eq!(base, base_before);
        assert_eq!(other, other_before);
        assert_eq!(combined.login_page(), Some("/jsp/login.jsp"));
        assert_eq!(combined.recent_spaces_items(), 9);
        assert_eq!(combined.help_url(), Some("http://help"));
    }

    #[test]
    fn test_override_back_to_default_is_indistinguishable_from_unset() {
        let base = parse("<client><shelf-visible>false</shelf-visible></client>");
        let explicit_default = parse("<client><shelf-visible>true</shelf-visible></client>");

        // Restating the default reads exactly like leaving the field out, so
        // the base value survives.
        assert_eq!(explicit_default, ClientConfigElement::default());
        assert!(!base.combine(&explicit_default).is_shelf_visible());
    }
}
