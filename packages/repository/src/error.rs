//! Error types for the repository node services

use thiserror::Error;

use crate::model::{NodeRef, QName};

/// Main error type for node service operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepoError {
    /// The node does not exist (or was deleted)
    #[error("Node does not exist: {0}")]
    NodeNotFound(NodeRef),

    /// The store has not been created
    #[error("Store does not exist: {0}")]
    InvalidStore(String),

    /// Text that is not of the form `protocol://identifier/id`
    #[error("Invalid node reference: {0}")]
    InvalidNodeRef(String),

    /// Text that is not of the form `{namespace}local`
    #[error("Invalid qualified name: {0}")]
    InvalidQName(String),

    /// No child association links the two nodes
    #[error("No child association from {parent} to {child}")]
    AssociationNotFound { parent: NodeRef, child: NodeRef },

    /// A content property was changed outside a trusted operation
    #[error("Content property {property} cannot be changed directly on {node}; use the content service")]
    ContentPropertyRestricted { node: String, property: QName },

    /// Structural change that would break the node hierarchy
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type alias for node service operations
pub type Result<T> = std::result::Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_model::PROP_CONTENT;

    #[test]
    fn test_error_display() {
        let err = RepoError::InvalidNodeRef("not-a-ref".to_string());
        assert_eq!(err.to_string(), "Invalid node reference: not-a-ref");

        let err = RepoError::ContentPropertyRestricted {
            node: "workspace://SpacesStore/abc".to_string(),
            property: PROP_CONTENT,
        };
        assert!(err.to_string().contains("{urn:cms:model:content:1.0}content"));
    }
}
