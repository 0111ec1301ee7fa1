//! Configuration constants for the web client config layer.
//!
//! Element names, hard-coded defaults and loader limits live here so the
//! readers and the service agree on one vocabulary.

/// Root element of every config source.
pub const ROOT_ELEMENT: &str = "webclient-config";

/// Section element inside the root.
pub const SECTION_ELEMENT: &str = "config";

/// Plug-in declaration block inside the root.
pub const PLUG_INS_ELEMENT: &str = "plug-ins";

/// Maximum config source size in bytes (2 MB).
///
/// Web client config files are typically 10-200 KB; anything larger is
/// almost certainly not a hand-maintained config file.
pub const DEFAULT_MAX_SOURCE_SIZE: usize = 2 * 1024 * 1024;

/// Element names handled by the typed readers.
pub mod elements {
    pub const ACTIONS: &str = "actions";
    pub const ADVANCED_SEARCH: &str = "advanced-search";
    pub const CLIENT: &str = "client";
    pub const DASHBOARDS: &str = "dashboards";
    pub const DIALOGS: &str = "dialogs";
    pub const LANGUAGES: &str = "languages";
    pub const MIMETYPES: &str = "mimetypes";
    pub const NAVIGATION: &str = "navigation";
    pub const PROPERTY_SHEET: &str = "property-sheet";
    pub const SERVER: &str = "server";
    pub const SIDEBAR: &str = "sidebar";
    pub const VIEWS: &str = "views";
    pub const WIZARDS: &str = "wizards";
}

/// Keys of the built-in section evaluators.
pub mod evaluators {
    pub const STRING_COMPARE: &str = "string-compare";
    pub const NODE_TYPE: &str = "node-type";
    pub const ASPECT_NAME: &str = "aspect-name";
}

/// Default error message id for dialogs.
pub const DEFAULT_DIALOG_ERROR_MESSAGE_ID: &str = "error_dialog";

/// Default error message id for wizards.
pub const DEFAULT_WIZARD_ERROR_MESSAGE_ID: &str = "error_wizard";

/// Prefix every dialog button action binding must start with.
pub const BINDING_PREFIX: &str = "#{";

/// Fallback page id consulted by view lookups before the hard defaults.
pub const VIEW_DEFAULTS_PAGE: &str = "default";

/// Hard default view renderer id.
pub const DEFAULT_VIEW: &str = "details";

/// Hard default page size.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Hard default sort column.
pub const DEFAULT_SORT_COLUMN: &str = "name";

/// Mimetype prefix that marks a mimetype as text.
pub const TEXT_MIMETYPE_PREFIX: &str = "text/";

/// Options controlling how sources are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Reject sources larger than this many bytes.
    pub max_source_size: usize,
}

impl LoadOptions {
    /// Create options with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_source_size: DEFAULT_MAX_SOURCE_SIZE,
        }
    }

    /// Set the maximum source size.
    #[must_use]
    pub fn with_max_source_size(mut self, bytes: usize) -> Self {
        self.max_source_size = bytes;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new()
    }
}
