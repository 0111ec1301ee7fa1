//! Node service contract and the in-memory store.
//!
//! [`NodeService`] is the seam every decorator wraps: a decorator holds an
//! inner service, intercepts the calls it cares about and forwards the rest
//! with [`delegate_node_service!`].

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

use crate::content_model::{TYPE_STORE_ROOT, ASSOC_CHILDREN};
use crate::context::OperationContext;
use crate::error::{RepoError, Result};
use crate::model::{ChildAssociationRef, NodeRef, Properties, PropertyValue, QName, StoreRef};

/// Operations on the node graph.
pub trait NodeService: Send + Sync {
    fn exists(&self, node: &NodeRef) -> bool;

    fn get_root_node(&self, ctx: &OperationContext, store: &StoreRef) -> Result<NodeRef>;

    fn get_type(&self, ctx: &OperationContext, node: &NodeRef) -> Result<QName>;

    fn get_aspects(&self, ctx: &OperationContext, node: &NodeRef) -> Result<BTreeSet<QName>>;

    fn get_property(
        &self,
        ctx: &OperationContext,
        node: &NodeRef,
        name: &QName,
    ) -> Result<Option<PropertyValue>>;

    fn get_properties(&self, ctx: &OperationContext, node: &NodeRef) -> Result<Properties>;

    fn set_property(
        &self,
        ctx: &OperationContext,
        node: &NodeRef,
        name: &QName,
        value: PropertyValue,
    ) -> Result<()>;

    /// Replace every property of the node.
    fn set_properties(&self, ctx: &OperationContext, node: &NodeRef, properties: Properties) -> Result<()>;

    /// Set the given properties, keeping the others.
    fn add_properties(&self, ctx: &OperationContext, node: &NodeRef, properties: Properties) -> Result<()>;

    fn add_aspect(
        &self,
        ctx: &OperationContext,
        node: &NodeRef,
        aspect: &QName,
        properties: Properties,
    ) -> Result<()>;

    fn create_node(
        &self,
        ctx: &OperationContext,
        parent: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
        node_type: &QName,
        properties: Properties,
    ) -> Result<ChildAssociationRef>;

    /// Add a secondary parent.
    fn add_child(
        &self,
        ctx: &OperationContext,
        parent: &NodeRef,
        child: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
    ) -> Result<ChildAssociationRef>;

    /// Remove every association from `parent` to `child`. Removing the
    /// primary association deletes the child.
    fn remove_child(&self, ctx: &OperationContext, parent: &NodeRef, child: &NodeRef) -> Result<()>;

    /// Move the node under a new primary parent.
    fn move_node(
        &self,
        ctx: &OperationContext,
        node: &NodeRef,
        new_parent: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
    ) -> Result<ChildAssociationRef>;

    /// Delete the node and its primary descendants.
    fn delete_node(&self, ctx: &OperationContext, node: &NodeRef) -> Result<()>;

    fn get_parent_assocs(&self, ctx: &OperationContext, node: &NodeRef) -> Result<Vec<ChildAssociationRef>>;

    fn get_child_assocs(&self, ctx: &OperationContext, node: &NodeRef) -> Result<Vec<ChildAssociationRef>>;

    fn has_aspect(&self, ctx: &OperationContext, node: &NodeRef, aspect: &QName) -> Result<bool> {
        Ok(self.get_aspects(ctx, node)?.contains(aspect))
    }

    /// First child reached through an association of the given type and name.
    fn get_child_by_name(
        &self,
        ctx: &OperationContext,
        parent: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
    ) -> Result<Option<NodeRef>> {
        Ok(self
            .get_child_assocs(ctx, parent)?
            .into_iter()
            .find(|assoc| &assoc.assoc_type == assoc_type && &assoc.qname == assoc_name)
            .map(|assoc| assoc.child))
    }
}

/// Forward [`NodeService`] methods to an inner service field.
///
/// ```ignore
/// impl<S: NodeService> NodeService for MyDecorator<S> {
///     delegate_node_service! { inner;
///         exists(node: &NodeRef) -> bool;
///     }
/// }
/// ```
macro_rules! delegate_node_service {
    ($inner:ident; $($method:ident($($arg:ident: $ty:ty),* $(,)?) -> $ret:ty;)*) => {
        $(
            fn $method(&self, $($arg: $ty),*) -> $ret {
                self.$inner.$method($($arg),*)
            }
        )*
    };
}
pub(crate) use delegate_node_service;

// =============================================================================
// In-memory implementation
// =============================================================================

#[derive(Debug, Clone)]
struct NodeRecord {
    node_type: QName,
    aspects: BTreeSet<QName>,
    properties: Properties,
    parents: Vec<ChildAssociationRef>,
    children: Vec<ChildAssociationRef>,
}

impl NodeRecord {
    fn new(node_type: QName, properties: Properties) -> Self {
        Self {
            node_type,
            aspects: BTreeSet::new(),
            properties,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    nodes: HashMap<NodeRef, NodeRecord>,
    roots: HashMap<StoreRef, NodeRef>,
}

impl StoreState {
    fn node(&self, node: &NodeRef) -> Result<&NodeRecord> {
        self.nodes
            .get(node)
            .ok_or_else(|| RepoError::NodeNotFound(node.clone()))
    }

    fn node_mut(&mut self, node: &NodeRef) -> Result<&mut NodeRecord> {
        self.nodes
            .get_mut(node)
            .ok_or_else(|| RepoError::NodeNotFound(node.clone()))
    }

    fn link(&mut self, assoc: &ChildAssociationRef) -> Result<()> {
        let parent = assoc
            .parent
            .as_ref()
            .ok_or_else(|| RepoError::InvalidOperation("association without parent".to_string()))?;
        self.node_mut(parent)?.children.push(assoc.clone());
        self.node_mut(&assoc.child)?.parents.push(assoc.clone());
        Ok(())
    }

    fn unlink(&mut self, assoc: &ChildAssociationRef) {
        if let Some(parent) = assoc.parent.as_ref().and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|a| a != assoc);
        }
        if let Some(child) = self.nodes.get_mut(&assoc.child) {
            child.parents.retain(|a| a != assoc);
        }
    }

    /// Check that `ancestor` is not `node` or below it.
    fn ensure_not_descendant(&self, node: &NodeRef, ancestor: &NodeRef) -> Result<()> {
        let mut pending = vec![ancestor.clone()];
        while let Some(current) = pending.pop() {
            if &current == node {
                return Err(RepoError::InvalidOperation(format!(
                    "{node} cannot be placed below itself"
                )));
            }
            if let Some(record) = self.nodes.get(&current) {
                pending.extend(record.parents.iter().filter_map(|a| a.parent.clone()));
            }
        }
        Ok(())
    }

    /// Remove `node` and everything below it through primary associations.
    fn delete(&mut self, node: &NodeRef) {
        let mut pending = vec![node.clone()];
        while let Some(current) = pending.pop() {
            let Some(record) = self.nodes.remove(&current) else {
                continue;
            };
            for assoc in &record.parents {
                self.unlink(assoc);
            }
            for assoc in record.children {
                if assoc.is_primary {
                    pending.push(assoc.child);
                } else {
                    self.unlink(&assoc);
                }
            }
        }
    }
}

/// Node service held entirely in memory.
///
/// Starts with the `workspace://SpacesStore` store.
#[derive(Debug)]
pub struct InMemoryNodeService {
    state: RwLock<StoreState>,
}

impl InMemoryNodeService {
    pub fn new() -> Self {
        let service = Self {
            state: RwLock::new(StoreState::default()),
        };
        service.create_store(&StoreRef::spaces_store());
        service
    }

    /// Create a store and return its root node. Existing stores are kept.
    pub fn create_store(&self, store: &StoreRef) -> NodeRef {
        let mut state = self.write();
        if let Some(root) = state.roots.get(store) {
            return root.clone();
        }
        let root = NodeRef::generate(store);
        let mut record = NodeRecord::new(TYPE_STORE_ROOT, Properties::new());
        record.parents.push(ChildAssociationRef {
            assoc_type: ASSOC_CHILDREN,
            parent: None,
            qname: ASSOC_CHILDREN,
            child: root.clone(),
            is_primary: true,
        });
        state.nodes.insert(root.clone(), record);
        state.roots.insert(store.clone(), root.clone());
        tracing::debug!(store = %store, root = %root, "Created store");
        root
    }

    pub fn node_count(&self) -> usize {
        self.read().nodes.len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryNodeService {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeService for InMemoryNodeService {
    fn exists(&self, node: &NodeRef) -> bool {
        self.read().nodes.contains_key(node)
    }

    fn get_root_node(&self, _ctx: &OperationContext, store: &StoreRef) -> Result<NodeRef> {
        self.read()
            .roots
            .get(store)
            .cloned()
            .ok_or_else(|| RepoError::InvalidStore(store.to_string()))
    }

    fn get_type(&self, _ctx: &OperationContext, node: &NodeRef) -> Result<QName> {
        Ok(self.read().node(node)?.node_type.clone())
    }

    fn get_aspects(&self, _ctx: &OperationContext, node: &NodeRef) -> Result<BTreeSet<QName>> {
        Ok(self.read().node(node)?.aspects.clone())
    }

    fn get_property(
        &self,
        _ctx: &OperationContext,
        node: &NodeRef,
        name: &QName,
    ) -> Result<Option<PropertyValue>> {
        Ok(self.read().node(node)?.properties.get(name).cloned())
    }

    fn get_properties(&self, _ctx: &OperationContext, node: &NodeRef) -> Result<Properties> {
        Ok(self.read().node(node)?.properties.clone())
    }

    fn set_property(
        &self,
        _ctx: &OperationContext,
        node: &NodeRef,
        name: &QName,
        value: PropertyValue,
    ) -> Result<()> {
        self.write()
            .node_mut(node)?
            .properties
            .insert(name.clone(), value);
        Ok(())
    }

    fn set_properties(&self, _ctx: &OperationContext, node: &NodeRef, properties: Properties) -> Result<()> {
        self.write().node_mut(node)?.properties = properties;
        Ok(())
    }

    fn add_properties(&self, _ctx: &OperationContext, node: &NodeRef, properties: Properties) -> Result<()> {
        self.write().node_mut(node)?.properties.extend(properties);
        Ok(())
    }

    fn add_aspect(
        &self,
        _ctx: &OperationContext,
        node: &NodeRef,
        aspect: &QName,
        properties: Properties,
    ) -> Result<()> {
        let mut state = self.write();
        let record = state.node_mut(node)?;
        record.aspects.insert(aspect.clone());
        record.properties.extend(properties);
        Ok(())
    }

    fn create_node(
        &self,
        _ctx: &OperationContext,
        parent: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
        node_type: &QName,
        properties: Properties,
    ) -> Result<ChildAssociationRef> {
        let mut state = self.write();
        state.node(parent)?;
        let child = NodeRef::generate(&parent.store);
        state
            .nodes
            .insert(child.clone(), NodeRecord::new(node_type.clone(), properties));
        let assoc = ChildAssociationRef::new(
            assoc_type.clone(),
            parent.clone(),
            assoc_name.clone(),
            child,
            true,
        );
        state.link(&assoc)?;
        Ok(assoc)
    }

    fn add_child(
        &self,
        _ctx: &OperationContext,
        parent: &NodeRef,
        child: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
    ) -> Result<ChildAssociationRef> {
        let mut state = self.write();
        state.node(child)?;
        state.node(parent)?;
        state.ensure_not_descendant(child, parent)?;
        let assoc = ChildAssociationRef::new(
            assoc_type.clone(),
            parent.clone(),
            assoc_name.clone(),
            child.clone(),
            false,
        );
        state.link(&assoc)?;
        Ok(assoc)
    }

    fn remove_child(&self, _ctx: &OperationContext, parent: &NodeRef, child: &NodeRef) -> Result<()> {
        let mut state = self.write();
        let assocs: Vec<ChildAssociationRef> = state
            .node(child)?
            .parents
            .iter()
            .filter(|a| a.parent.as_ref() == Some(parent))
            .cloned()
            .collect();
        if assocs.is_empty() {
            return Err(RepoError::AssociationNotFound {
                parent: parent.clone(),
                child: child.clone(),
            });
        }
        if assocs.iter().any(|a| a.is_primary) {
            state.delete(child);
        } else {
            for assoc in &assocs {
                state.unlink(assoc);
            }
        }
        Ok(())
    }

    fn move_node(
        &self,
        _ctx: &OperationContext,
        node: &NodeRef,
        new_parent: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
    ) -> Result<ChildAssociationRef> {
        let mut state = self.write();
        state.node(new_parent)?;
        state.ensure_not_descendant(node, new_parent)?;
        let primary = state
            .node(node)?
            .parents
            .iter()
            .find(|a| a.is_primary)
            .cloned()
            .ok_or_else(|| RepoError::InvalidOperation(format!("{node} has no primary parent")))?;
        if primary.parent.is_none() {
            return Err(RepoError::InvalidOperation(format!("{node} is a store root")));
        }
        state.unlink(&primary);
        let assoc = ChildAssociationRef::new(
            assoc_type.clone(),
            new_parent.clone(),
            assoc_name.clone(),
            node.clone(),
            true,
        );
        state.link(&assoc)?;
        Ok(assoc)
    }

    fn delete_node(&self, _ctx: &OperationContext, node: &NodeRef) -> Result<()> {
        let mut state = self.write();
        if state.roots.values().any(|root| root == node) {
            return Err(RepoError::InvalidOperation(format!("{node} is a store root")));
        }
        state.node(node)?;
        state.delete(node);
        Ok(())
    }

    fn get_parent_assocs(&self, _ctx: &OperationContext, node: &NodeRef) -> Result<Vec<ChildAssociationRef>> {
        Ok(self.read().node(node)?.parents.clone())
    }

    fn get_child_assocs(&self, _ctx: &OperationContext, node: &NodeRef) -> Result<Vec<ChildAssociationRef>> {
        Ok(self.read().node(node)?.children.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_model::*;
    use pretty_assertions::assert_eq;

    fn setup() -> (InMemoryNodeService, OperationContext, NodeRef) {
        let service = InMemoryNodeService::new();
        let ctx = OperationContext::new("admin");
        let root = service
            .get_root_node(&ctx, &StoreRef::spaces_store())
            .unwrap();
        (service, ctx, root)
    }

    fn folder(service: &InMemoryNodeService, ctx: &OperationContext, parent: &NodeRef, name: &str) -> NodeRef {
        service
            .create_node(ctx, parent, &ASSOC_CONTAINS, &QName::new(CONTENT_NS, name), &TYPE_FOLDER, Properties::new())
            .unwrap()
            .child
    }

    #[test]
    fn test_create_and_read() {
        let (service, ctx, root) = setup();
        let node = folder(&service, &ctx, &root, "docs");

        assert!(service.exists(&node));
        assert_eq!(service.get_type(&ctx, &node).unwrap(), TYPE_FOLDER);
        service
            .set_property(&ctx, &node, &PROP_NAME, "Docs".into())
            .unwrap();
        assert_eq!(
            service.get_property(&ctx, &node, &PROP_NAME).unwrap(),
            Some(PropertyValue::from("Docs"))
        );
        assert_eq!(
            service
                .get_child_by_name(&ctx, &root, &ASSOC_CONTAINS, &QName::new(CONTENT_NS, "docs"))
                .unwrap(),
            Some(node)
        );
    }

    #[test]
    fn test_unknown_store_and_node() {
        let (service, ctx, root) = setup();
        assert!(matches!(
            service.get_root_node(&ctx, &StoreRef::new("archive", "SpacesStore")),
            Err(RepoError::InvalidStore(_))
        ));
        let missing = NodeRef::generate(&root.store);
        assert!(matches!(
            service.get_type(&ctx, &missing),
            Err(RepoError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_secondary_child_and_remove() {
        let (service, ctx, root) = setup();
        let a = folder(&service, &ctx, &root, "a");
        let b = folder(&service, &ctx, &root, "b");
        let doc = folder(&service, &ctx, &a, "doc");

        service
            .add_child(&ctx, &b, &doc, &ASSOC_CONTAINS, &QName::new(CONTENT_NS, "doc"))
            .unwrap();
        assert_eq!(service.get_parent_assocs(&ctx, &doc).unwrap().len(), 2);

        service.remove_child(&ctx, &b, &doc).unwrap();
        assert!(service.exists(&doc));
        assert_eq!(service.get_parent_assocs(&ctx, &doc).unwrap().len(), 1);

        assert!(matches!(
            service.remove_child(&ctx, &b, &doc),
            Err(RepoError::AssociationNotFound { .. })
        ));

        service.remove_child(&ctx, &a, &doc).unwrap();
        assert!(!service.exists(&doc));
    }

    #[test]
    fn test_move_node() {
        let (service, ctx, root) = setup();
        let a = folder(&service, &ctx, &root, "a");
        let b = folder(&service, &ctx, &root, "b");
        let doc = folder(&service, &ctx, &a, "doc");

        let assoc = service
            .move_node(&ctx, &doc, &b, &ASSOC_CONTAINS, &QName::new(CONTENT_NS, "doc"))
            .unwrap();
        assert_eq!(assoc.parent.as_ref(), Some(&b));
        assert!(service.get_child_assocs(&ctx, &a).unwrap().is_empty());
        assert_eq!(service.get_child_assocs(&ctx, &b).unwrap().len(), 1);

        assert!(matches!(
            service.move_node(&ctx, &a, &a, &ASSOC_CONTAINS, &QName::new(CONTENT_NS, "a")),
            Err(RepoError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_delete_cascades_to_primary_children() {
        let (service, ctx, root) = setup();
        let a = folder(&service, &ctx, &root, "a");
        let b = folder(&service, &ctx, &root, "b");
        let inner = folder(&service, &ctx, &a, "inner");
        let linked = folder(&service, &ctx, &b, "linked");
        service
            .add_child(&ctx, &a, &linked, &ASSOC_CONTAINS, &QName::new(CONTENT_NS, "linked"))
            .unwrap();

        service.delete_node(&ctx, &a).unwrap();
        assert!(!service.exists(&a));
        assert!(!service.exists(&inner));
        assert!(service.exists(&linked));
        assert_eq!(service.get_parent_assocs(&ctx, &linked).unwrap().len(), 1);
        assert!(service.delete_node(&ctx, &root).is_err());
    }

    #[test]
    fn test_delete_deep_hierarchy() {
        let (service, ctx, root) = setup();
        let top = folder(&service, &ctx, &root, "top");
        let mut chain = vec![top.clone()];
        for depth in 0..20_000 {
            let parent = chain.last().unwrap().clone();
            chain.push(folder(&service, &ctx, &parent, &format!("level-{depth}")));
        }

        service.delete_node(&ctx, &top).unwrap();
        assert!(chain.iter().all(|node| !service.exists(node)));
        assert!(service.get_child_assocs(&ctx, &root).unwrap().is_empty());
    }
}
