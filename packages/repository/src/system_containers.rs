//! Named containers under a store's `sys:system` node.
//!
//! Services keep their bookkeeping nodes (people, authorities, workflow
//! definitions) in containers below the system node. Both the system node
//! and the containers are created on first use, always as the system user.

use crate::content_model::{ASSOC_CHILDREN, SYSTEM_CONTAINER, TYPE_CONTAINER};
use crate::context::OperationContext;
use crate::error::Result;
use crate::model::{NodeRef, Properties, QName, StoreRef};
use crate::node_service::NodeService;

/// Look up the system node of `store` without creating it.
fn find_system_node(nodes: &impl NodeService, ctx: &OperationContext, store: &StoreRef) -> Result<Option<NodeRef>> {
    let root = nodes.get_root_node(ctx, store)?;
    nodes.get_child_by_name(ctx, &root, &ASSOC_CHILDREN, &SYSTEM_CONTAINER)
}

/// Find or create `name` below `parent`.
fn child_container(
    nodes: &impl NodeService,
    ctx: &OperationContext,
    parent: &NodeRef,
    name: &QName,
) -> Result<(NodeRef, bool)> {
    if let Some(existing) = nodes.get_child_by_name(ctx, parent, &ASSOC_CHILDREN, name)? {
        return Ok((existing, false));
    }
    let assoc = nodes.create_node(ctx, parent, &ASSOC_CHILDREN, name, &TYPE_CONTAINER, Properties::new())?;
    tracing::info!(container = %name, node = %assoc.child, user = %ctx.current_user(), "Created system container");
    Ok((assoc.child, true))
}

/// Container `name` of `store`, if it has been created.
pub fn get_system_container(
    nodes: &impl NodeService,
    ctx: &OperationContext,
    store: &StoreRef,
    name: &QName,
) -> Result<Option<NodeRef>> {
    ctx.run_as_system(|ctx| {
        let Some(system) = find_system_node(nodes, ctx, store)? else {
            return Ok(None);
        };
        nodes.get_child_by_name(ctx, &system, &ASSOC_CHILDREN, name)
    })
}

/// Container `name` of `store`, creating it and the system node when missing.
///
/// The flag is `true` when the container was created by this call.
pub fn get_or_create_system_container(
    nodes: &impl NodeService,
    ctx: &OperationContext,
    store: &StoreRef,
    name: &QName,
) -> Result<(NodeRef, bool)> {
    ctx.run_as_system(|ctx| {
        let root = nodes.get_root_node(ctx, store)?;
        let (system, _) = child_container(nodes, ctx, &root, &SYSTEM_CONTAINER)?;
        child_container(nodes, ctx, &system, name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_model::SYSTEM_NS;
    use crate::error::RepoError;
    use crate::node_service::InMemoryNodeService;

    const PEOPLE: QName = QName::from_static(SYSTEM_NS, "people");

    #[test]
    fn test_missing_container() {
        let nodes = InMemoryNodeService::new();
        let ctx = OperationContext::new("alice");
        let found = get_system_container(&nodes, &ctx, &StoreRef::spaces_store(), &PEOPLE).unwrap();
        assert_eq!(found, None);
        assert_eq!(nodes.node_count(), 1);
    }

    #[test]
    fn test_create_once() {
        let nodes = InMemoryNodeService::new();
        let ctx = OperationContext::new("alice");
        let store = StoreRef::spaces_store();

        let (first, created) = get_or_create_system_container(&nodes, &ctx, &store, &PEOPLE).unwrap();
        assert!(created);
        let (second, created) = get_or_create_system_container(&nodes, &ctx, &store, &PEOPLE).unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(get_system_container(&nodes, &ctx, &store, &PEOPLE).unwrap(), Some(first.clone()));

        assert_eq!(nodes.get_type(&ctx, &first).unwrap(), TYPE_CONTAINER);
        let parent = nodes.get_parent_assocs(&ctx, &first).unwrap();
        let system = parent[0].parent.clone().unwrap();
        let system_parent = nodes.get_parent_assocs(&ctx, &system).unwrap();
        assert_eq!(system_parent[0].qname, SYSTEM_CONTAINER);
        assert_eq!(ctx.current_user(), "alice");
    }

    #[test]
    fn test_unknown_store() {
        let nodes = InMemoryNodeService::new();
        let ctx = OperationContext::new("alice");
        let result = get_or_create_system_container(&nodes, &ctx, &StoreRef::new("archive", "SpacesStore"), &PEOPLE);
        assert!(matches!(result, Err(RepoError::InvalidStore(_))));
    }
}
