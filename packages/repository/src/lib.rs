//! CMS repository node services.
//!
//! A [`NodeService`] stores typed nodes with properties, aspects and
//! parent-child associations. The decorators in this crate wrap any node
//! service to add repository policies:
//!
//! - [`ContentPropertyRestriction`]: content properties can only be changed
//!   by trusted callers
//! - [`NodeRefPropertySanitizer`]: node-reference properties never expose
//!   dangling or mistyped references
//! - [`CascadeUpdateRecorder`]: nodes whose parents change are stamped for
//!   path recomputation
//!
//! Per-unit-of-work state (user, transaction, restriction scopes) travels in
//! an explicit [`OperationContext`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cms_repo::content_model::{ASSOC_CONTAINS, CONTENT_NS, TYPE_CONTENT};
//! use cms_repo::{
//!     ContentPropertyRestriction, InMemoryDictionary, InMemoryNodeService, NodeService,
//!     OperationContext, Properties, QName, StoreRef,
//! };
//!
//! let dictionary = Arc::new(InMemoryDictionary::with_builtin_models());
//! let nodes = ContentPropertyRestriction::new(InMemoryNodeService::new(), dictionary);
//! let ctx = OperationContext::new("admin");
//!
//! let root = nodes.get_root_node(&ctx, &StoreRef::spaces_store()).unwrap();
//! let doc = nodes
//!     .create_node(&ctx, &root, &ASSOC_CONTAINS, &QName::new(CONTENT_NS, "doc"), &TYPE_CONTENT, Properties::new())
//!     .unwrap();
//! assert!(nodes.exists(&doc.child));
//! ```

pub mod cascade;
pub mod content_model;
pub mod context;
pub mod dictionary;
pub mod error;
pub mod model;
pub mod node_service;
pub mod restriction;
pub mod sanitizer;
pub mod system_containers;

// Re-export commonly used items
pub use cascade::{parent_assocs_crc, CascadeUpdateRecorder};
pub use context::{OperationContext, RestrictionGuard, TrustedOperation};
pub use dictionary::{DictionaryService, InMemoryDictionary, PropertyDefinition};
pub use error::{RepoError, Result};
pub use model::{
    ChildAssociationRef, ContentData, NodeRef, Properties, PropertyValue, QName, StoreRef,
};
pub use node_service::{InMemoryNodeService, NodeService};
pub use restriction::ContentPropertyRestriction;
pub use sanitizer::NodeRefPropertySanitizer;
pub use system_containers::{get_or_create_system_container, get_system_container};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
