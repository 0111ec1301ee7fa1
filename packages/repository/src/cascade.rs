//! Cascade-update bookkeeping.
//!
//! Whenever a node's set of parent associations changes, the node is stamped
//! with the cascade-update aspect. The stamp records the transaction that
//! made the change and a checksum over the node's parent associations, so
//! consumers such as indexers can tell when a node's paths have to be
//! recomputed.

use std::collections::BTreeSet;

use sha2::{Digest, Sha256};

use crate::content_model::{ASPECT_CASCADE_UPDATE, PROP_CASCADE_CRC, PROP_CASCADE_TX};
use crate::context::OperationContext;
use crate::error::Result;
use crate::model::{ChildAssociationRef, NodeRef, Properties, PropertyValue, QName, StoreRef};
use crate::node_service::{delegate_node_service, NodeService};

/// Checksum over a set of parent associations.
///
/// The associations are sorted by their string form before hashing, so the
/// value does not depend on the order the store returns them in.
pub fn parent_assocs_crc(assocs: &[ChildAssociationRef]) -> i64 {
    let mut lines: Vec<String> = assocs.iter().map(ToString::to_string).collect();
    lines.sort();

    let mut hasher = Sha256::new();
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    let digest = hasher.finalize();
    tracing::debug!(digest = %hex::encode(digest.as_slice()), assocs = lines.len(), "Parent association checksum");

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(bytes)
}

/// Decorator stamping nodes whose parent associations changed.
pub struct CascadeUpdateRecorder<S> {
    inner: S,
}

impl<S: NodeService> CascadeUpdateRecorder<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn stamp(&self, ctx: &OperationContext, node: &NodeRef) -> Result<()> {
        let assocs = self.inner.get_parent_assocs(ctx, node)?;
        let crc = parent_assocs_crc(&assocs);
        let transaction = i64::try_from(ctx.transaction_id()).unwrap_or(i64::MAX);
        let properties = Properties::from([
            (PROP_CASCADE_TX, PropertyValue::Integer(transaction)),
            (PROP_CASCADE_CRC, PropertyValue::Integer(crc)),
        ]);
        tracing::debug!(node = %node, transaction, crc, "Recording cascade update");
        self.inner
            .add_aspect(ctx, node, &ASPECT_CASCADE_UPDATE, properties)
    }
}

impl<S: NodeService> NodeService for CascadeUpdateRecorder<S> {
    delegate_node_service! { inner;
        exists(node: &NodeRef) -> bool;
        get_root_node(ctx: &OperationContext, store: &StoreRef) -> Result<NodeRef>;
        get_type(ctx: &OperationContext, node: &NodeRef) -> Result<QName>;
        get_aspects(ctx: &OperationContext, node: &NodeRef) -> Result<BTreeSet<QName>>;
        get_property(ctx: &OperationContext, node: &NodeRef, name: &QName) -> Result<Option<PropertyValue>>;
        get_properties(ctx: &OperationContext, node: &NodeRef) -> Result<Properties>;
        set_property(ctx: &OperationContext, node: &NodeRef, name: &QName, value: PropertyValue) -> Result<()>;
        set_properties(ctx: &OperationContext, node: &NodeRef, properties: Properties) -> Result<()>;
        add_properties(ctx: &OperationContext, node: &NodeRef, properties: Properties) -> Result<()>;
        add_aspect(ctx: &OperationContext, node: &NodeRef, aspect: &QName, properties: Properties) -> Result<()>;
        create_node(ctx: &OperationContext, parent: &NodeRef, assoc_type: &QName, assoc_name: &QName, node_type: &QName, properties: Properties) -> Result<ChildAssociationRef>;
        delete_node(ctx: &OperationContext, node: &NodeRef) -> Result<()>;
        get_parent_assocs(ctx: &OperationContext, node: &NodeRef) -> Result<Vec<ChildAssociationRef>>;
        get_child_assocs(ctx: &OperationContext, node: &NodeRef) -> Result<Vec<ChildAssociationRef>>;
    }

    fn add_child(
        &self,
        ctx: &OperationContext,
        parent: &NodeRef,
        child: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
    ) -> Result<ChildAssociationRef> {
        let assoc = self
            .inner
            .add_child(ctx, parent, child, assoc_type, assoc_name)?;
        self.stamp(ctx, child)?;
        Ok(assoc)
    }

    fn remove_child(&self, ctx: &OperationContext, parent: &NodeRef, child: &NodeRef) -> Result<()> {
        self.inner.remove_child(ctx, parent, child)?;
        // Removing the primary association deletes the child.
        if self.inner.exists(child) {
            self.stamp(ctx, child)?;
        }
        Ok(())
    }

    fn move_node(
        &self,
        ctx: &OperationContext,
        node: &NodeRef,
        new_parent: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
    ) -> Result<ChildAssociationRef> {
        let assoc = self
            .inner
            .move_node(ctx, node, new_parent, assoc_type, assoc_name)?;
        self.stamp(ctx, node)?;
        Ok(assoc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_model::*;
    use crate::node_service::InMemoryNodeService;

    struct Fixture {
        service: CascadeUpdateRecorder<InMemoryNodeService>,
        ctx: OperationContext,
        root: NodeRef,
    }

    impl Fixture {
        fn new() -> Self {
            let service = CascadeUpdateRecorder::new(InMemoryNodeService::new());
            let ctx = OperationContext::new("admin").with_transaction_id(42);
            let root = service.get_root_node(&ctx, &StoreRef::spaces_store()).unwrap();
            Self { service, ctx, root }
        }

        fn folder(&self, parent: &NodeRef, name: &str) -> NodeRef {
            self.service
                .create_node(&self.ctx, parent, &ASSOC_CONTAINS, &QName::new(CONTENT_NS, name), &TYPE_FOLDER, Properties::new())
                .unwrap()
                .child
        }

        fn crc(&self, node: &NodeRef) -> Option<i64> {
            self.service
                .get_property(&self.ctx, node, &PROP_CASCADE_CRC)
                .unwrap()
                .and_then(|v| v.as_integer())
        }
    }

    #[test]
    fn test_create_does_not_stamp() {
        let f = Fixture::new();
        let node = f.folder(&f.root, "a");
        assert!(!f.service.has_aspect(&f.ctx, &node, &ASPECT_CASCADE_UPDATE).unwrap());
    }

    #[test]
    fn test_add_child_stamps_child() {
        let f = Fixture::new();
        let a = f.folder(&f.root, "a");
        let b = f.folder(&f.root, "b");
        let doc = f.folder(&a, "doc");

        f.service
            .add_child(&f.ctx, &b, &doc, &ASSOC_CONTAINS, &QName::new(CONTENT_NS, "doc"))
            .unwrap();

        assert!(f.service.has_aspect(&f.ctx, &doc, &ASPECT_CASCADE_UPDATE).unwrap());
        assert_eq!(
            f.service.get_property(&f.ctx, &doc, &PROP_CASCADE_TX).unwrap(),
            Some(PropertyValue::Integer(42))
        );
        let assocs = f.service.get_parent_assocs(&f.ctx, &doc).unwrap();
        assert_eq!(f.crc(&doc), Some(parent_assocs_crc(&assocs)));
        assert!(!f.service.has_aspect(&f.ctx, &b, &ASPECT_CASCADE_UPDATE).unwrap());
    }

    #[test]
    fn test_crc_tracks_parent_changes() {
        let f = Fixture::new();
        let a = f.folder(&f.root, "a");
        let b = f.folder(&f.root, "b");
        let doc = f.folder(&a, "doc");

        f.service
            .add_child(&f.ctx, &b, &doc, &ASSOC_CONTAINS, &QName::new(CONTENT_NS, "doc"))
            .unwrap();
        let linked = f.crc(&doc);

        f.service.remove_child(&f.ctx, &b, &doc).unwrap();
        let unlinked = f.crc(&doc);
        assert_ne!(linked, unlinked);

        f.service
            .move_node(&f.ctx, &doc, &b, &ASSOC_CONTAINS, &QName::new(CONTENT_NS, "doc"))
            .unwrap();
        assert_ne!(f.crc(&doc), unlinked);
    }

    #[test]
    fn test_remove_primary_does_not_stamp_deleted_child() {
        let f = Fixture::new();
        let a = f.folder(&f.root, "a");
        let doc = f.folder(&a, "doc");
        f.service.remove_child(&f.ctx, &a, &doc).unwrap();
        assert!(!f.service.exists(&doc));
    }

    #[test]
    fn test_crc_is_order_independent() {
        let f = Fixture::new();
        let a = f.folder(&f.root, "a");
        let b = f.folder(&f.root, "b");
        let doc = f.folder(&a, "doc");
        f.service
            .add_child(&f.ctx, &b, &doc, &ASSOC_CONTAINS, &QName::new(CONTENT_NS, "doc"))
            .unwrap();

        let mut assocs = f.service.get_parent_assocs(&f.ctx, &doc).unwrap();
        let forward = parent_assocs_crc(&assocs);
        assocs.reverse();
        assert_eq!(parent_assocs_crc(&assocs), forward);
    }
}
