//! Typed config elements, one module per element family.

mod actions;
mod advanced_search;
mod client;
mod dashboards;
mod dialogs;
mod languages;
mod mimetypes;
mod navigation;
mod property_sheet;
mod server;
mod sidebar;
mod views;
mod wizards;

pub use actions::{ActionDefinition, ActionGroup, ActionsConfigElement};
pub use advanced_search::{AdvancedSearchConfigElement, CustomProperty};
pub use client::{BreadcrumbMode, ClientConfigElement};
pub use dashboards::{DashboardsConfigElement, DashletDefinition, LayoutDefinition};
pub use dialogs::{DialogButton, DialogConfig, DialogsConfigElement};
pub use languages::{Language, LanguagesConfigElement};
pub use mimetypes::{Extension, MimetypeDefinition, MimetypesConfigElement};
pub use navigation::{NavigationConfigElement, NavigationResult};
pub use property_sheet::{ItemConfig, ItemKind, PropertySheetConfigElement};
pub use server::ServerConfigElement;
pub use sidebar::{SideBarPlugin, SidebarConfigElement};
pub use views::{SortDirection, ViewsConfigElement};
pub use wizards::{ConditionalPageConfig, PageConfig, StepConfig, WizardConfig, WizardsConfigElement};
