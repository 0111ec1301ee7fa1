//! End-to-end tests for layered web client configuration.
//!
//! Loads the fixture files the way a deployment layers them: the shipped
//! defaults first, then the site overrides.

use std::path::{Path, PathBuf};

use cms_webconfig::{
    ActionsConfigElement, AdvancedSearchConfigElement, ClientConfigElement, ConfigError,
    ConfigService, ConfigSource, DashboardsConfigElement, DialogsConfigElement,
    LanguagesConfigElement, LookupContext, LookupObject, MimetypesConfigElement,
    NavigationConfigElement, PropertySheetConfigElement, ServerConfigElement,
    SidebarConfigElement, ViewsConfigElement, WizardsConfigElement,
};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load(names: &[&str]) -> ConfigService {
    let sources = names.iter().map(|n| ConfigSource::file(fixture(n))).collect();
    ConfigService::load(sources).unwrap_or_else(|e| panic!("Failed to load {names:?}: {e}"))
}

fn layered() -> ConfigService {
    load(&["test-config.xml", "test-config-override.xml"])
}

#[test]
fn test_base_client_config() {
    let service = load(&["test-config.xml"]);
    let global = service.global_config().unwrap();
    let client = global.element::<ClientConfigElement>().unwrap();

    assert_eq!(client.search_minimum(), 3);
    assert_eq!(client.recent_spaces_items(), 6);
    assert_eq!(client.login_page(), Some("/jsp/login.jsp"));
    assert_eq!(client.help_url(), None);

    let server = global.element::<ServerConfigElement>().unwrap();
    assert_eq!(server.scheme(), Some("https"));
    assert_eq!(server.port(), Some(8443));
}

#[test]
fn test_client_override() {
    let global = layered().global_config().unwrap();
    let client = global.element::<ClientConfigElement>().unwrap();

    assert_eq!(client.search_minimum(), 10);
    assert_eq!(client.help_url(), Some("http://docs.example.com/help"));
    assert_eq!(client.login_page(), Some("/jsp/login.jsp"));
    assert_eq!(client.error_page(), Some("/jsp/error.jsp"));
    assert_eq!(client.from_email_address(), Some("alfresco@example.com"));
}

#[test]
fn test_languages_append_without_relabel() {
    let global = layered().global_config().unwrap();
    let languages = global.element::<LanguagesConfigElement>().unwrap();

    assert_eq!(languages.locales(), vec!["en_US", "fr_FR", "de_DE"]);
    assert_eq!(languages.label_for_language("fr_FR"), Some("French"));
    assert_eq!(languages.label_for_language("de_DE"), Some("German"));
}

#[test]
fn test_navigation_override() {
    let global = layered().global_config().unwrap();
    let navigation = global.element::<NavigationConfigElement>().unwrap();

    let outcome = navigation.override_for(None, Some("browse")).unwrap();
    assert_eq!(outcome.result, "newOutcome");
    assert!(outcome.is_outcome);

    let view = navigation
        .override_for(Some("/jsp/browse/browse.jsp"), None)
        .unwrap();
    assert_eq!(view.result, "/jsp/forums/forums.jsp");
    assert!(!view.is_outcome);

    assert!(navigation
        .override_for(Some("/jsp/browse/browse.jsp"), Some("other"))
        .is_none());
    assert_eq!(navigation.children().len(), 2);

    let element = global.config_element("navigation").unwrap();
    assert_eq!(element.children().unwrap().len(), 2);
}

#[test]
fn test_views_base_wins() {
    let global = layered().global_config().unwrap();
    let views = global.element::<ViewsConfigElement>().unwrap();

    assert_eq!(views.views().len(), 3);
    assert_eq!(views.default_view("browse"), "details");
    assert_eq!(views.default_view("topic"), "bubble");
    assert_eq!(views.default_view("unknown"), "details");
    assert_eq!(views.default_page_size("browse", "icons"), 12);
    assert_eq!(views.default_page_size("forum", "icons"), 9);
    assert_eq!(views.default_page_size("forum", "details"), 50);
    assert_eq!(views.default_page_size("topic", "list"), 10);
    assert_eq!(views.default_sort_column("topic"), "created");
    assert!(views.has_descending_sort("forum"));
    assert!(!views.has_descending_sort("browse"));
}

#[test]
fn test_advanced_search_appends() {
    let global = layered().global_config().unwrap();
    let search = global.element::<AdvancedSearchConfigElement>().unwrap();

    assert_eq!(
        search.content_types(),
        &["cm:dictionaryModel".to_string(), "fm:post".to_string()]
    );
    assert_eq!(search.folder_types(), &["cm:folder".to_string()]);

    let properties: Vec<_> = search
        .custom_properties()
        .iter()
        .map(|p| p.property.as_str())
        .collect();
    assert_eq!(properties, vec!["cm:created", "app:approveStep", "app:rejectStep"]);
}

#[test]
fn test_actions_merge_groups() {
    let global = layered().global_config().unwrap();
    let actions = global.element::<ActionsConfigElement>().unwrap();

    let details = actions.action_definition("details_doc").unwrap();
    assert_eq!(details.action.as_deref(), Some("dialog:showCustomDocDetails"));
    assert!(actions.action_definition("custom_action").is_some());

    let group = actions.action_group("document_browse").unwrap();
    assert!(group.show_link());
    assert!(group.is_hidden("details_space"));
    assert_eq!(group.iter().collect::<Vec<_>>(), vec!["details_doc", "custom_action"]);
}

#[test]
fn test_plug_in_generic_element() {
    let global = layered().global_config().unwrap();
    let settings = global.config_element("custom-settings").unwrap();

    assert_eq!(settings.attribute("mode"), Some("strict"));
    let children = settings.children().unwrap();
    let limits: Vec<_> = children
        .iter()
        .filter_map(|c| c.value())
        .collect();
    assert_eq!(limits, vec!["5", "8"]);
}

#[test]
fn test_mimetypes_loaded() {
    let global = layered().global_config().unwrap();
    let mimetypes = global.element::<MimetypesConfigElement>().unwrap();

    assert!(mimetypes.is_text("text/plain"));
    assert_eq!(mimetypes.guess_mimetype("manual.PDF"), Some("application/pdf"));
}

#[test]
fn test_property_sheet_for_node() {
    let service = layered();
    let content = LookupObject::node("cm:content");

    let config = service.get_config(&content).unwrap();
    let sheet = config.element::<PropertySheetConfigElement>().unwrap();
    assert_eq!(sheet.item_names_to_show(), vec!["name", "title", "size", "author"]);
    assert_eq!(sheet.editable_item_names_to_show(), vec!["name", "author"]);
    assert!(sheet.item("size").unwrap().read_only);
    assert!(sheet.item("description").is_some());

    let versioned = LookupObject::node("cm:content").with_aspect("cm:versionable");
    let config = service.get_config(&versioned).unwrap();
    let sheet = config.element::<PropertySheetConfigElement>().unwrap();
    assert_eq!(
        sheet.item_names_to_show(),
        vec!["name", "title", "size", "author", "versionLabel"]
    );

    let folder = service.get_config(&LookupObject::node("cm:folder")).unwrap();
    assert!(folder.element::<PropertySheetConfigElement>().is_none());
}

#[test]
fn test_replaced_section() {
    let service = layered();
    let config = service.get_config(&LookupObject::named("Dashboards")).unwrap();
    let dashboards = config.element::<DashboardsConfigElement>().unwrap();

    assert!(dashboards.layout("narrow-left-2column").is_none());
    assert!(dashboards.dashlet("getting-started").is_none());
    assert!(dashboards.dashlet("tasks-todo").is_some());
    assert!(dashboards.default_dashlets().is_empty());
    assert!(dashboards.allow_guest_config());
}

#[test]
fn test_area_lookup() {
    let service = layered();
    let sidebar = LookupObject::named("Sidebar");

    let without_area = service.get_config(&sidebar).unwrap();
    assert!(without_area.element::<SidebarConfigElement>().is_none());

    let admin = LookupContext::new().with_area("admin");
    let config = service.get_config_in(&sidebar, &admin).unwrap();
    let sidebar = config.element::<SidebarConfigElement>().unwrap();
    assert_eq!(sidebar.default_plugin(), Some("navigator"));
    assert!(config.element::<ClientConfigElement>().is_some());
}

#[test]
fn test_dialogs_combine_by_name() {
    let service = load(&["test-config-dialogs-wizards.xml"]);
    let config = service.get_config(&LookupObject::named("Dialogs")).unwrap();
    let dialogs = config.element::<DialogsConfigElement>().unwrap();

    let details = dialogs.dialog("spaceDetails").unwrap();
    assert_eq!(details.page, "/jsp/custom/space-details.jsp");
    assert_eq!(details.managed_bean, "CustomSpaceDetailsDialog");
    assert_eq!(details.title_id.as_deref(), Some("space_details_title"));
    assert_eq!(details.description_id, None);
    assert_eq!(details.error_message_id, "error_dialog");

    let create = dialogs.dialog("createSpace").unwrap();
    assert_eq!(create.title.as_deref(), Some("Create Space"));
    assert_eq!(create.actions_config_id.as_deref(), Some("space-actions"));
    assert!(!create.show_ok_button);
    assert_eq!(create.buttons.len(), 1);
    assert_eq!(create.buttons[0].action, "#{CreateSpaceDialog.finish}");

    let names: Vec<_> = dialogs.dialogs().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["spaceDetails", "createSpace"]);
}

#[test]
fn test_wizard_steps() {
    let service = load(&["test-config-dialogs-wizards.xml"]);
    let config = service.get_config(&LookupObject::named("Wizards")).unwrap();
    let wizards = config.element::<WizardsConfigElement>().unwrap();

    let wizard = wizards.wizard("createSpace").unwrap();
    assert_eq!(wizard.managed_bean, "AdvancedSpaceWizard");
    assert_eq!(wizard.error_message_id, "error_create_space_wizard");
    assert_eq!(wizard.number_of_steps(), 3);

    let properties = wizard.step("properties").unwrap();
    assert!(properties.has_conditional_pages());
    assert_eq!(
        properties.default_page().map(|p| p.path.as_str()),
        Some("/jsp/wizard/new-space/from-scratch.jsp")
    );
    assert!(config.element::<DialogsConfigElement>().is_none());
}

#[test]
fn test_missing_file_leaves_service_unloaded() {
    let service = ConfigService::new(vec![
        ConfigSource::file(fixture("test-config.xml")),
        ConfigSource::file(fixture("does-not-exist.xml")),
    ]);
    assert!(matches!(service.reload(), Err(ConfigError::Io { .. })));
    assert!(service.global_config().unwrap().is_empty());
}
