//! Core node model: stores, node references, qualified names and values.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RepoError, Result};

/// `protocol://identifier/id`
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NODE_REF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*)://([^/]+)/(.+)$").expect("valid regex")
});

/// `{namespace}local`
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static QNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{([^}]*)\}(.+)$").expect("valid regex"));

// =============================================================================
// StoreRef / NodeRef
// =============================================================================

/// A store, addressed by protocol and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreRef {
    pub protocol: String,
    pub identifier: String,
}

impl StoreRef {
    pub fn new(protocol: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            identifier: identifier.into(),
        }
    }

    /// The default content store, `workspace://SpacesStore`.
    pub fn spaces_store() -> Self {
        Self::new("workspace", "SpacesStore")
    }
}

impl fmt::Display for StoreRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.identifier)
    }
}

/// Reference to a node within a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeRef {
    pub store: StoreRef,
    pub id: String,
}

impl NodeRef {
    pub fn new(store: StoreRef, id: impl Into<String>) -> Self {
        Self {
            store,
            id: id.into(),
        }
    }

    /// New node reference with a random id.
    pub fn generate(store: &StoreRef) -> Self {
        Self::new(store.clone(), Uuid::new_v4().to_string())
    }

    /// Check if `text` looks like a node reference.
    pub fn is_node_ref(text: &str) -> bool {
        NODE_REF_PATTERN.is_match(text)
    }
}

impl FromStr for NodeRef {
    type Err = RepoError;

    fn from_str(text: &str) -> Result<Self> {
        let caps = NODE_REF_PATTERN
            .captures(text.trim())
            .ok_or_else(|| RepoError::InvalidNodeRef(text.to_string()))?;
        Ok(Self::new(StoreRef::new(&caps[1], &caps[2]), &caps[3]))
    }
}

impl TryFrom<String> for NodeRef {
    type Error = RepoError;

    fn try_from(text: String) -> Result<Self> {
        text.parse()
    }
}

impl From<NodeRef> for String {
    fn from(node: NodeRef) -> Self {
        node.to_string()
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.store, self.id)
    }
}

// =============================================================================
// QName
// =============================================================================

/// Namespace-qualified name of a type, aspect, property or association.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    namespace: Cow<'static, str>,
    local: Cow<'static, str>,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Cow::Owned(namespace.into()),
            local: Cow::Owned(local.into()),
        }
    }

    /// Name built from static parts, usable in constants.
    pub const fn from_static(namespace: &'static str, local: &'static str) -> Self {
        Self {
            namespace: Cow::Borrowed(namespace),
            local: Cow::Borrowed(local),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }
}

impl FromStr for QName {
    type Err = RepoError;

    fn from_str(text: &str) -> Result<Self> {
        let caps = QNAME_PATTERN
            .captures(text)
            .ok_or_else(|| RepoError::InvalidQName(text.to_string()))?;
        Ok(Self::new(&caps[1], &caps[2]))
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local)
    }
}

// =============================================================================
// Property values
// =============================================================================

/// Metadata of a stored binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentData {
    pub content_url: String,
    pub mimetype: String,
    pub size: u64,
    pub encoding: String,
}

impl ContentData {
    pub fn new(content_url: impl Into<String>, mimetype: impl Into<String>, size: u64) -> Self {
        Self {
            content_url: content_url.into(),
            mimetype: mimetype.into(),
            size,
            encoding: "UTF-8".to_string(),
        }
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Null,
    Text(String),
    Integer(i64),
    Boolean(bool),
    Date(DateTime<Utc>),
    NodeRef(NodeRef),
    Content(ContentData),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_node_ref(&self) -> Option<&NodeRef> {
        match self {
            Self::NodeRef(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NodeRef> for PropertyValue {
    fn from(value: NodeRef) -> Self {
        Self::NodeRef(value)
    }
}

impl From<ContentData> for PropertyValue {
    fn from(value: ContentData) -> Self {
        Self::Content(value)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Property map of one node.
pub type Properties = BTreeMap<QName, PropertyValue>;

// =============================================================================
// Associations
// =============================================================================

/// A parent-child association.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildAssociationRef {
    pub assoc_type: QName,
    /// `None` for the root node of a store.
    pub parent: Option<NodeRef>,
    pub qname: QName,
    pub child: NodeRef,
    pub is_primary: bool,
}

impl ChildAssociationRef {
    pub fn new(
        assoc_type: QName,
        parent: NodeRef,
        qname: QName,
        child: NodeRef,
        is_primary: bool,
    ) -> Self {
        Self {
            assoc_type,
            parent: Some(parent),
            qname,
            child,
            is_primary,
        }
    }
}

impl fmt::Display for ChildAssociationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parent = self
            .parent
            .as_ref()
            .map_or_else(String::new, ToString::to_string);
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.assoc_type, parent, self.qname, self.child, self.is_primary
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_node_ref() {
        let node: NodeRef = "workspace://SpacesStore/1234-abcd".parse().unwrap();
        assert_eq!(node.store, StoreRef::spaces_store());
        assert_eq!(node.id, "1234-abcd");
        assert_eq!(node.to_string(), "workspace://SpacesStore/1234-abcd");
    }

    #[test]
    fn test_parse_invalid_node_ref() {
        for text in ["", "SpacesStore/123", "workspace://SpacesStore", "://x/y"] {
            assert!(
                matches!(text.parse::<NodeRef>(), Err(RepoError::InvalidNodeRef(_))),
                "{text}"
            );
            assert!(!NodeRef::is_node_ref(text));
        }
    }

    #[test]
    fn test_generated_node_refs_differ() {
        let store = StoreRef::spaces_store();
        assert_ne!(NodeRef::generate(&store), NodeRef::generate(&store));
    }

    #[test]
    fn test_node_ref_serializes_as_string() {
        let node: NodeRef = "archive://SpacesStore/x".parse().unwrap();
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, "\"archive://SpacesStore/x\"");
        let back: NodeRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_qname() {
        let name: QName = "{urn:cms:model:content:1.0}title".parse().unwrap();
        assert_eq!(name.namespace(), "urn:cms:model:content:1.0");
        assert_eq!(name.local_name(), "title");
        assert_eq!(name, QName::from_static("urn:cms:model:content:1.0", "title"));
        assert!("title".parse::<QName>().is_err());
    }

    #[test]
    fn test_property_value_conversions() {
        assert_eq!(PropertyValue::from("a"), PropertyValue::Text("a".to_string()));
        assert_eq!(
            PropertyValue::from(vec![1_i64, 2]),
            PropertyValue::List(vec![PropertyValue::Integer(1), PropertyValue::Integer(2)])
        );
        assert!(PropertyValue::Null.is_null());
        assert_eq!(PropertyValue::Integer(3).as_integer(), Some(3));
    }
}
