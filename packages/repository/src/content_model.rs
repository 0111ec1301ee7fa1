//! Well-known namespaces and qualified names of the built-in models.

use crate::model::QName;

pub const SYSTEM_NS: &str = "urn:cms:model:system:1.0";
pub const CONTENT_NS: &str = "urn:cms:model:content:1.0";
pub const DICTIONARY_NS: &str = "urn:cms:model:dictionary:1.0";

/// User every privileged bootstrap operation runs as.
pub const SYSTEM_USER: &str = "System";

// Types
pub const TYPE_BASE: QName = QName::from_static(SYSTEM_NS, "base");
pub const TYPE_STORE_ROOT: QName = QName::from_static(SYSTEM_NS, "store_root");
pub const TYPE_CONTAINER: QName = QName::from_static(SYSTEM_NS, "container");
pub const TYPE_CMOBJECT: QName = QName::from_static(CONTENT_NS, "cmobject");
pub const TYPE_FOLDER: QName = QName::from_static(CONTENT_NS, "folder");
pub const TYPE_CONTENT: QName = QName::from_static(CONTENT_NS, "content");
pub const TYPE_CATEGORY: QName = QName::from_static(CONTENT_NS, "category");

// Associations
pub const ASSOC_CHILDREN: QName = QName::from_static(SYSTEM_NS, "children");
pub const ASSOC_CONTAINS: QName = QName::from_static(CONTENT_NS, "contains");
pub const ASSOC_SUBCATEGORIES: QName = QName::from_static(CONTENT_NS, "subcategories");

/// Association name of the system node under a store root.
pub const SYSTEM_CONTAINER: QName = QName::from_static(SYSTEM_NS, "system");

// Properties
pub const PROP_NAME: QName = QName::from_static(CONTENT_NS, "name");
pub const PROP_TITLE: QName = QName::from_static(CONTENT_NS, "title");
pub const PROP_CONTENT: QName = QName::from_static(CONTENT_NS, "content");
pub const PROP_CATEGORIES: QName = QName::from_static(CONTENT_NS, "categories");
pub const PROP_CASCADE_TX: QName = QName::from_static(SYSTEM_NS, "cascadeTx");
pub const PROP_CASCADE_CRC: QName = QName::from_static(SYSTEM_NS, "cascadeCRC");

// Aspects
pub const ASPECT_CASCADE_UPDATE: QName = QName::from_static(SYSTEM_NS, "cascadeUpdate");
pub const ASPECT_GEN_CLASSIFIABLE: QName = QName::from_static(CONTENT_NS, "generalclassifiable");

// Data types
pub const DATATYPE_TEXT: QName = QName::from_static(DICTIONARY_NS, "text");
pub const DATATYPE_INT: QName = QName::from_static(DICTIONARY_NS, "int");
pub const DATATYPE_LONG: QName = QName::from_static(DICTIONARY_NS, "long");
pub const DATATYPE_BOOLEAN: QName = QName::from_static(DICTIONARY_NS, "boolean");
pub const DATATYPE_DATETIME: QName = QName::from_static(DICTIONARY_NS, "datetime");
pub const DATATYPE_CONTENT: QName = QName::from_static(DICTIONARY_NS, "content");
pub const DATATYPE_NODEREF: QName = QName::from_static(DICTIONARY_NS, "noderef");
pub const DATATYPE_CATEGORY: QName = QName::from_static(DICTIONARY_NS, "category");
