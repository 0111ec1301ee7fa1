//! Content-property write restriction.
//!
//! Properties of type `d:content` point at stored binaries and may only be
//! changed through the content service. The [`ContentPropertyRestriction`]
//! decorator rejects direct writes of such properties unless the operation
//! context carries a [`TrustedOperation`](crate::TrustedOperation) token or
//! the restriction is lifted by a scope guard.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::content_model::DATATYPE_CONTENT;
use crate::context::OperationContext;
use crate::dictionary::DictionaryService;
use crate::error::{RepoError, Result};
use crate::model::{ChildAssociationRef, NodeRef, Properties, PropertyValue, QName, StoreRef};
use crate::node_service::{delegate_node_service, NodeService};

/// Decorator rejecting untrusted changes to content properties.
pub struct ContentPropertyRestriction<S> {
    inner: S,
    dictionary: Arc<dyn DictionaryService>,
    enabled: bool,
}

impl<S: NodeService> ContentPropertyRestriction<S> {
    pub fn new(inner: S, dictionary: Arc<dyn DictionaryService>) -> Self {
        Self {
            inner,
            dictionary,
            enabled: true,
        }
    }

    /// Turn the restriction off for every caller.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn is_content_property(&self, name: &QName) -> bool {
        self.dictionary.data_type(name) == Some(&DATATYPE_CONTENT)
    }

    fn is_allowed(&self, ctx: &OperationContext) -> bool {
        !self.enabled || ctx.is_trusted() || ctx.is_content_restriction_disabled()
    }

    /// Fail if writing `value` to `name` would change a content property.
    fn check(
        &self,
        ctx: &OperationContext,
        node: Option<&NodeRef>,
        name: &QName,
        value: &PropertyValue,
    ) -> Result<()> {
        if !self.is_content_property(name) || self.is_allowed(ctx) {
            return Ok(());
        }
        let current = match node {
            Some(node) => self.inner.get_property(ctx, node, name)?,
            None => None,
        };
        let unchanged = match &current {
            Some(current) => current == value,
            None => value.is_null(),
        };
        if unchanged {
            return Ok(());
        }
        let node = node.map_or_else(|| "<new node>".to_string(), ToString::to_string);
        tracing::warn!(node = %node, property = %name, user = %ctx.current_user(), "Rejected content property change");
        Err(RepoError::ContentPropertyRestricted {
            node,
            property: name.clone(),
        })
    }

    fn check_all(
        &self,
        ctx: &OperationContext,
        node: Option<&NodeRef>,
        properties: &Properties,
    ) -> Result<()> {
        properties
            .iter()
            .try_for_each(|(name, value)| self.check(ctx, node, name, value))
    }

    /// `set_properties` replaces the map, so content properties left out are
    /// removed and count as changed.
    fn check_replacement(
        &self,
        ctx: &OperationContext,
        node: &NodeRef,
        properties: &Properties,
    ) -> Result<()> {
        self.check_all(ctx, Some(node), properties)?;
        let current = self.inner.get_properties(ctx, node)?;
        for name in current.keys().filter(|name| !properties.contains_key(*name)) {
            self.check(ctx, Some(node), name, &PropertyValue::Null)?;
        }
        Ok(())
    }
}

impl<S: NodeService> NodeService for ContentPropertyRestriction<S> {
    delegate_node_service! { inner;
        exists(node: &NodeRef) -> bool;
        get_root_node(ctx: &OperationContext, store: &StoreRef) -> Result<NodeRef>;
        get_type(ctx: &OperationContext, node: &NodeRef) -> Result<QName>;
        get_aspects(ctx: &OperationContext, node: &NodeRef) -> Result<BTreeSet<QName>>;
        get_property(ctx: &OperationContext, node: &NodeRef, name: &QName) -> Result<Option<PropertyValue>>;
        get_properties(ctx: &OperationContext, node: &NodeRef) -> Result<Properties>;
        add_child(ctx: &OperationContext, parent: &NodeRef, child: &NodeRef, assoc_type: &QName, assoc_name: &QName) -> Result<ChildAssociationRef>;
        remove_child(ctx: &OperationContext, parent: &NodeRef, child: &NodeRef) -> Result<()>;
        move_node(ctx: &OperationContext, node: &NodeRef, new_parent: &NodeRef, assoc_type: &QName, assoc_name: &QName) -> Result<ChildAssociationRef>;
        delete_node(ctx: &OperationContext, node: &NodeRef) -> Result<()>;
        get_parent_assocs(ctx: &OperationContext, node: &NodeRef) -> Result<Vec<ChildAssociationRef>>;
        get_child_assocs(ctx: &OperationContext, node: &NodeRef) -> Result<Vec<ChildAssociationRef>>;
    }

    fn set_property(
        &self,
        ctx: &OperationContext,
        node: &NodeRef,
        name: &QName,
        value: PropertyValue,
    ) -> Result<()> {
        self.check(ctx, Some(node), name, &value)?;
        self.inner.set_property(ctx, node, name, value)
    }

    fn set_properties(&self, ctx: &OperationContext, node: &NodeRef, properties: Properties) -> Result<()> {
        self.check_replacement(ctx, node, &properties)?;
        self.inner.set_properties(ctx, node, properties)
    }

    fn add_properties(&self, ctx: &OperationContext, node: &NodeRef, properties: Properties) -> Result<()> {
        self.check_all(ctx, Some(node), &properties)?;
        self.inner.add_properties(ctx, node, properties)
    }

    fn add_aspect(
        &self,
        ctx: &OperationContext,
        node: &NodeRef,
        aspect: &QName,
        properties: Properties,
    ) -> Result<()> {
        self.check_all(ctx, Some(node), &properties)?;
        self.inner.add_aspect(ctx, node, aspect, properties)
    }

    fn create_node(
        &self,
        ctx: &OperationContext,
        parent: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
        node_type: &QName,
        properties: Properties,
    ) -> Result<ChildAssociationRef> {
        self.check_all(ctx, None, &properties)?;
        self.inner
            .create_node(ctx, parent, assoc_type, assoc_name, node_type, properties)
    }
}
