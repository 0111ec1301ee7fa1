//! Reader registry mapping element names to readers.
//!
//! Readers are registered under a string key and element names are bound to
//! keys. Config sources may bind additional element names through a
//! `<plug-ins>` block, but only to keys the registry already knows.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use roxmltree::Node;

use crate::config::elements as names;
use crate::element::ConfigElement;
use crate::elements::{
    ActionsConfigElement, AdvancedSearchConfigElement, ClientConfigElement,
    DashboardsConfigElement, DialogsConfigElement, LanguagesConfigElement,
    MimetypesConfigElement, NavigationConfigElement, PropertySheetConfigElement,
    ServerConfigElement, SidebarConfigElement, ViewsConfigElement, WizardsConfigElement,
};
use crate::error::{ConfigError, Result};
use crate::reader::{ElementReader, GenericReader, ReadElement, TypedReader};
use crate::xml::{find_child, find_children, get_tag_name, required_attribute};

/// Key of the fallback reader.
pub const GENERIC_READER: &str = "generic";

/// Registry of element readers.
///
/// Cheap to clone; readers are shared.
#[derive(Clone)]
pub struct ReaderRegistry {
    readers: HashMap<String, Arc<dyn ElementReader>>,
    bindings: HashMap<String, String>,
}

impl ReaderRegistry {
    /// Create a registry that only knows the generic reader.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            readers: HashMap::new(),
            bindings: HashMap::new(),
        };
        registry.register_reader(GENERIC_READER, GenericReader);
        registry
    }

    /// Register a reader under `key`, replacing any previous one.
    pub fn register_reader(&mut self, key: impl Into<String>, reader: impl ElementReader + 'static) {
        self.readers.insert(key.into(), Arc::new(reader));
    }

    /// Register a typed reader under its element name and bind the name to it.
    pub fn register_typed<T: ReadElement + 'static>(&mut self) {
        self.register_reader(T::ELEMENT, TypedReader::<T>::new());
        self.bindings.insert(T::ELEMENT.to_string(), T::ELEMENT.to_string());
    }

    /// Bind `element` to the reader registered under `key`.
    ///
    /// # Errors
    /// `UnknownReader` when no reader has that key; `InvalidValue` when the
    /// reader only accepts a different element name.
    pub fn bind(&mut self, element: &str, key: &str) -> Result<()> {
        let reader = self.readers.get(key).ok_or_else(|| ConfigError::UnknownReader {
            element: element.to_string(),
            reader: key.to_string(),
        })?;
        if let Some(accepted) = reader.element_name() {
            if accepted != element {
                return Err(ConfigError::invalid_value(
                    element,
                    format!("reader '{key}' only reads <{accepted}> elements"),
                ));
            }
        }
        if let Some(previous) = self.bindings.insert(element.to_string(), key.to_string()) {
            if previous != key {
                tracing::warn!(element, previous = %previous, reader = key, "Rebinding element reader");
            }
        }
        Ok(())
    }

    /// Apply the `<element-readers>` declarations of a `<plug-ins>` block.
    pub fn register_plug_ins(&mut self, plug_ins: Node<'_, '_>) -> Result<()> {
        let Some(readers) = find_child(plug_ins, "element-readers") else {
            return Ok(());
        };
        for declaration in find_children(readers, "element-reader") {
            let element = required_attribute(declaration, "element-name")?;
            let key = required_attribute(declaration, "reader")?;
            self.bind(&element, &key)?;
            tracing::debug!(element = %element, reader = %key, "Registered plug-in element reader");
        }
        Ok(())
    }

    /// Reader for an element name, falling back to the generic reader.
    pub fn reader_for(&self, element: &str) -> Option<&dyn ElementReader> {
        let key = self
            .bindings
            .get(element)
            .map_or(GENERIC_READER, String::as_str);
        self.readers.get(key).map(|reader| reader.as_ref())
    }

    /// Check if an element name has a dedicated (non-generic) binding.
    #[must_use]
    pub fn has_reader(&self, element: &str) -> bool {
        self.bindings.contains_key(element)
    }

    /// Parse a node with the reader bound to its name.
    pub fn parse(&self, node: Node<'_, '_>) -> Result<ConfigElement> {
        let name = get_tag_name(node);
        let reader = self.reader_for(name).ok_or_else(|| ConfigError::UnknownReader {
            element: name.to_string(),
            reader: GENERIC_READER.to_string(),
        })?;
        reader.parse(node)
    }

    /// Registered reader keys, sorted.
    #[must_use]
    pub fn reader_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.readers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderRegistry")
            .field("readers", &self.reader_keys())
            .field("bindings", &self.bindings)
            .finish()
    }
}

/// Create a registry with every web client element reader.
#[must_use]
pub fn create_webclient_registry() -> ReaderRegistry {
    let mut registry = ReaderRegistry::new();

    registry.register_typed::<ActionsConfigElement>();
    registry.register_typed::<AdvancedSearchConfigElement>();
    registry.register_typed::<ClientConfigElement>();
    registry.register_typed::<DashboardsConfigElement>();
    registry.register_typed::<DialogsConfigElement>();
    registry.register_typed::<LanguagesConfigElement>();
    registry.register_typed::<MimetypesConfigElement>();
    registry.register_typed::<NavigationConfigElement>();
    registry.register_typed::<PropertySheetConfigElement>();
    registry.register_typed::<ServerConfigElement>();
    registry.register_typed::<SidebarConfigElement>();
    registry.register_typed::<ViewsConfigElement>();
    registry.register_typed::<WizardsConfigElement>();

    registry
}

/// Element names bound by [`create_webclient_registry`].
pub const WEBCLIENT_ELEMENTS: &[&str] = &[
    names::ACTIONS,
    names::ADVANCED_SEARCH,
    names::CLIENT,
    names::DASHBOARDS,
    names::DIALOGS,
    names::LANGUAGES,
    names::MIMETYPES,
    names::NAVIGATION,
    names::PROPERTY_SHEET,
    names::SERVER,
    names::SIDEBAR,
    names::VIEWS,
    names::WIZARDS,
];
