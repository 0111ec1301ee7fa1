//! The config element base contract.
//!
//! [`ConfigElement`] is a tagged variant over every typed element kind plus
//! [`GenericConfigElement`] for element names without a dedicated reader.

use std::borrow::Cow;

use indexmap::IndexMap;
use roxmltree::Node;
use serde::Serialize;

use crate::elements::{
    ActionsConfigElement, AdvancedSearchConfigElement, ClientConfigElement,
    DashboardsConfigElement, DialogsConfigElement, LanguagesConfigElement,
    MimetypesConfigElement, NavigationConfigElement, PropertySheetConfigElement,
    ServerConfigElement, SidebarConfigElement, ViewsConfigElement, WizardsConfigElement,
};
use crate::config::elements as names;
use crate::error::{ConfigError, Result};
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::xml::{element_children, get_tag_name, get_text};

/// Untyped element: name, attributes, text value and nested children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenericConfigElement {
    name: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    attributes: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<GenericConfigElement>,
}

impl GenericConfigElement {
    /// Create an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            value: None,
            children: Vec::new(),
        }
    }

    /// Build an element tree from an XML node.
    #[must_use]
    pub fn from_node(node: Node<'_, '_>) -> Self {
        let mut element = Self::new(get_tag_name(node));
        for attr in node.attributes() {
            element
                .attributes
                .insert(attr.name().to_string(), attr.value().to_string());
        }
        element.value = get_text(node);
        element.children = element_children(node).map(Self::from_node).collect();
        element
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the text value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: GenericConfigElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn children(&self) -> &[GenericConfigElement] {
        &self.children
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&GenericConfigElement> {
        self.children.iter().find(|c| c.name == name)
    }
}

const GENERIC_RULES: &[FieldRule] = &[
    FieldRule::new("attributes", MergeKind::MapUnion),
    FieldRule::new("value", MergeKind::OverrideIfSet),
    FieldRule::new("children", MergeKind::Append),
];

impl Combine for GenericConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: "generic",
        rules: GENERIC_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        let s = &Self::STRATEGY;
        Self {
            name: self.name.clone(),
            attributes: s.map("attributes", &self.attributes, &other.attributes),
            value: s.option("value", &self.value, &other.value),
            children: s.list("children", &self.children, &other.children, |c| c.name.clone()),
        }
    }
}

/// A parsed configuration element of any kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ConfigElement {
    Generic(GenericConfigElement),
    Actions(ActionsConfigElement),
    AdvancedSearch(AdvancedSearchConfigElement),
    Client(ClientConfigElement),
    Dashboards(DashboardsConfigElement),
    Dialogs(DialogsConfigElement),
    Languages(LanguagesConfigElement),
    Mimetypes(MimetypesConfigElement),
    Navigation(NavigationConfigElement),
    PropertySheet(PropertySheetConfigElement),
    Server(ServerConfigElement),
    Sidebar(SidebarConfigElement),
    Views(ViewsConfigElement),
    Wizards(WizardsConfigElement),
}

impl ConfigElement {
    /// Element name this value was read from.
    pub fn name(&self) -> &str {
        match self {
            Self::Generic(e) => e.name(),
            Self::Actions(_) => names::ACTIONS,
            Self::AdvancedSearch(_) => names::ADVANCED_SEARCH,
            Self::Client(_) => names::CLIENT,
            Self::Dashboards(_) => names::DASHBOARDS,
            Self::Dialogs(_) => names::DIALOGS,
            Self::Languages(_) => names::LANGUAGES,
            Self::Mimetypes(_) => names::MIMETYPES,
            Self::Navigation(_) => names::NAVIGATION,
            Self::PropertySheet(_) => names::PROPERTY_SHEET,
            Self::Server(_) => names::SERVER,
            Self::Sidebar(_) => names::SIDEBAR,
            Self::Views(_) => names::VIEWS,
            Self::Wizards(_) => names::WIZARDS,
        }
    }

    /// Merge strategy table of the underlying kind.
    pub fn strategy(&self) -> MergeStrategy {
        match self {
            Self::Generic(_) => GenericConfigElement::STRATEGY,
            Self::Actions(_) => ActionsConfigElement::STRATEGY,
            Self::AdvancedSearch(_) => AdvancedSearchConfigElement::STRATEGY,
            Self::Client(_) => ClientConfigElement::STRATEGY,
            Self::Dashboards(_) => DashboardsConfigElement::STRATEGY,
            Self::Dialogs(_) => DialogsConfigElement::STRATEGY,
            Self::Languages(_) => LanguagesConfigElement::STRATEGY,
            Self::Mimetypes(_) => MimetypesConfigElement::STRATEGY,
            Self::Navigation(_) => NavigationConfigElement::STRATEGY,
            Self::PropertySheet(_) => PropertySheetConfigElement::STRATEGY,
            Self::Server(_) => ServerConfigElement::STRATEGY,
            Self::Sidebar(_) => SidebarConfigElement::STRATEGY,
            Self::Views(_) => ViewsConfigElement::STRATEGY,
            Self::Wizards(_) => WizardsConfigElement::STRATEGY,
        }
    }

    /// Combine `other` on top of `self`.
    ///
    /// # Errors
    /// Returns `IncompatibleCombine` when the two elements are of different
    /// kinds or, for generic elements, carry different names.
    pub fn combine(&self, other: &ConfigElement) -> Result<ConfigElement> {
        let combined = match (self, other) {
            (Self::Generic(a), Self::Generic(b)) if a.name() == b.name() => {
                Self::Generic(a.combine(b))
            }
            (Self::Actions(a), Self::Actions(b)) => Self::Actions(a.combine(b)),
            (Self::AdvancedSearch(a), Self::AdvancedSearch(b)) => {
                Self::AdvancedSearch(a.combine(b))
            }
            (Self::Client(a), Self::Client(b)) => Self::Client(a.combine(b)),
            (Self::Dashboards(a), Self::Dashboards(b)) => Self::Dashboards(a.combine(b)),
            (Self::Dialogs(a), Self::Dialogs(b)) => Self::Dialogs(a.combine(b)),
            (Self::Languages(a), Self::Languages(b)) => Self::Languages(a.combine(b)),
            (Self::Mimetypes(a), Self::Mimetypes(b)) => Self::Mimetypes(a.combine(b)),
            (Self::Navigation(a), Self::Navigation(b)) => Self::Navigation(a.combine(b)),
            (Self::PropertySheet(a), Self::PropertySheet(b)) => {
                Self::PropertySheet(a.combine(b))
            }
            (Self::Server(a), Self::Server(b)) => Self::Server(a.combine(b)),
            (Self::Sidebar(a), Self::Sidebar(b)) => Self::Sidebar(a.combine(b)),
            (Self::Views(a), Self::Views(b)) => Self::Views(a.combine(b)),
            (Self::Wizards(a), Self::Wizards(b)) => Self::Wizards(a.combine(b)),
            _ => {
                return Err(ConfigError::IncompatibleCombine {
                    base: self.name().to_string(),
                    other: other.name().to_string(),
                })
            }
        };
        let strategy = self.strategy();
        tracing::debug!(
            element = %combined.name(),
            strategy = strategy.element,
            rules = strategy.rules.len(),
            "Combined config element"
        );
        Ok(combined)
    }

    /// Generic child view.
    ///
    /// # Errors
    /// Typed elements other than navigation expose their data only through
    /// typed accessors and return `ChildrenUnsupported`.
    pub fn children(&self) -> Result<Cow<'_, [GenericConfigElement]>> {
        match self {
            Self::Generic(e) => Ok(Cow::Borrowed(e.children())),
            Self::Navigation(e) => Ok(Cow::Owned(e.children())),
            _ => Err(ConfigError::ChildrenUnsupported(self.name().to_string())),
        }
    }

    /// Text value of a generic element.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Generic(e) => e.value(),
            _ => None,
        }
    }

    /// Attribute of a generic element.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::Generic(e) => e.attribute(name),
            _ => None,
        }
    }

    /// Downcast to a typed element.
    pub fn downcast<T: TypedElement>(&self) -> Option<&T> {
        T::from_element(self)
    }
}

/// Typed element kinds reachable from a [`ConfigElement`].
pub trait TypedElement: Sized {
    /// Element name the type is read from.
    const ELEMENT: &'static str;

    /// Borrow the typed value if `element` is of this kind.
    fn from_element(element: &ConfigElement) -> Option<&Self>;
}

macro_rules! typed_element {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl TypedElement for $ty {
            const ELEMENT: &'static str = $name;

            fn from_element(element: &ConfigElement) -> Option<&Self> {
                match element {
                    ConfigElement::$variant(e) => Some(e),
                    _ => None,
                }
            }
        }

        impl From<$ty> for ConfigElement {
            fn from(element: $ty) -> Self {
                ConfigElement::$variant(element)
            }
        }
    };
}

typed_element!(ActionsConfigElement, Actions, names::ACTIONS);
typed_element!(AdvancedSearchConfigElement, AdvancedSearch, names::ADVANCED_SEARCH);
typed_element!(ClientConfigElement, Client, names::CLIENT);
typed_element!(DashboardsConfigElement, Dashboards, names::DASHBOARDS);
typed_element!(DialogsConfigElement, Dialogs, names::DIALOGS);
typed_element!(LanguagesConfigElement, Languages, names::LANGUAGES);
typed_element!(MimetypesConfigElement, Mimetypes, names::MIMETYPES);
typed_element!(NavigationConfigElement, Navigation, names::NAVIGATION);
typed_element!(PropertySheetConfigElement, PropertySheet, names::PROPERTY_SHEET);
typed_element!(ServerConfigElement, Server, names::SERVER);
typed_element!(SidebarConfigElement, Sidebar, names::SIDEBAR);
typed_element!(ViewsConfigElement, Views, names::VIEWS);
typed_element!(WizardsConfigElement, Wizards, names::WIZARDS);

impl From<GenericConfigElement> for ConfigElement {
    fn from(element: GenericConfigElement) -> Self {
        ConfigElement::Generic(element)
    }
}
