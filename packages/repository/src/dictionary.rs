//! Data dictionary: property definitions and the type hierarchy.

use std::collections::HashMap;

use crate::content_model::*;
use crate::model::QName;

/// Definition of one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDefinition {
    pub name: QName,
    pub data_type: QName,
    pub multi_valued: bool,
}

/// Read access to model metadata.
pub trait DictionaryService: Send + Sync {
    /// Definition of a property, if the property is modelled.
    fn property(&self, name: &QName) -> Option<&PropertyDefinition>;

    /// Direct parent of a type or aspect.
    fn parent_class(&self, class: &QName) -> Option<&QName>;

    /// Check if `class` is `ancestor` or derives from it.
    fn is_subclass(&self, class: &QName, ancestor: &QName) -> bool {
        let mut current = Some(class);
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = self.parent_class(name);
        }
        false
    }

    /// Data type of a property, if modelled.
    fn data_type(&self, name: &QName) -> Option<&QName> {
        self.property(name).map(|def| &def.data_type)
    }
}

/// Dictionary held in memory, built with the `with_*` methods.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDictionary {
    properties: HashMap<QName, PropertyDefinition>,
    parents: HashMap<QName, QName>,
}

impl InMemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary with the system and content model definitions.
    pub fn with_builtin_models() -> Self {
        Self::new()
            .with_class(TYPE_STORE_ROOT, TYPE_BASE)
            .with_class(TYPE_CONTAINER, TYPE_BASE)
            .with_class(TYPE_CMOBJECT, TYPE_BASE)
            .with_class(TYPE_FOLDER, TYPE_CMOBJECT)
            .with_class(TYPE_CONTENT, TYPE_CMOBJECT)
            .with_class(TYPE_CATEGORY, TYPE_BASE)
            .with_property(PROP_NAME, DATATYPE_TEXT, false)
            .with_property(PROP_TITLE, DATATYPE_TEXT, false)
            .with_property(PROP_CONTENT, DATATYPE_CONTENT, false)
            .with_property(PROP_CATEGORIES, DATATYPE_CATEGORY, true)
            .with_property(PROP_CASCADE_TX, DATATYPE_LONG, false)
            .with_property(PROP_CASCADE_CRC, DATATYPE_LONG, false)
    }

    #[must_use]
    pub fn with_property(mut self, name: QName, data_type: QName, multi_valued: bool) -> Self {
        self.properties.insert(
            name.clone(),
            PropertyDefinition {
                name,
                data_type,
                multi_valued,
            },
        );
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: QName, parent: QName) -> Self {
        self.parents.insert(class, parent);
        self
    }
}

impl DictionaryService for InMemoryDictionary {
    fn property(&self, name: &QName) -> Option<&PropertyDefinition> {
        self.properties.get(name)
    }

    fn parent_class(&self, class: &QName) -> Option<&QName> {
        self.parents.get(class)
    }
}
