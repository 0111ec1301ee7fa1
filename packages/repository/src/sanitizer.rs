//! Node-ref property sanitising.
//!
//! Properties of type `d:noderef` and `d:category` hold references to other
//! nodes. Those nodes can disappear, and callers sometimes hand in plain
//! text. [`NodeRefPropertySanitizer`] cleans values on the way in and on the
//! way out:
//!
//! - text is converted to a node reference; unparsable text is dropped
//! - references to missing nodes are dropped
//! - category references must point at a category node
//!
//! A single-valued property with nothing left reads as absent; a
//! multi-valued property reads as a (possibly empty) list. Nothing here
//! fails the call: bad values are filtered and logged.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::content_model::{DATATYPE_CATEGORY, DATATYPE_NODEREF, TYPE_CATEGORY};
use crate::context::OperationContext;
use crate::dictionary::{DictionaryService, PropertyDefinition};
use crate::error::Result;
use crate::model::{ChildAssociationRef, NodeRef, Properties, PropertyValue, QName, StoreRef};
use crate::node_service::{delegate_node_service, NodeService};

/// Decorator filtering dangling and mistyped node references.
pub struct NodeRefPropertySanitizer<S> {
    inner: S,
    dictionary: Arc<dyn DictionaryService>,
}

impl<S: NodeService> NodeRefPropertySanitizer<S> {
    pub fn new(inner: S, dictionary: Arc<dyn DictionaryService>) -> Self {
        Self { inner, dictionary }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Definition of `name` when it holds node references.
    fn reference_property(&self, name: &QName) -> Option<&PropertyDefinition> {
        self.dictionary
            .property(name)
            .filter(|def| def.data_type == DATATYPE_NODEREF || def.data_type == DATATYPE_CATEGORY)
    }

    /// Convert one raw value into a reference that may be kept.
    fn accept(&self, ctx: &OperationContext, value: &PropertyValue, category: bool) -> Option<NodeRef> {
        let node = match value {
            PropertyValue::NodeRef(node) => node.clone(),
            PropertyValue::Text(text) => match text.parse::<NodeRef>() {
                Ok(node) => node,
                Err(err) => {
                    tracing::debug!(value = %text, error = %err, "Dropping unparsable node reference");
                    return None;
                }
            },
            PropertyValue::Null => return None,
            other => {
                tracing::debug!(value = ?other, "Dropping non-reference value");
                return None;
            }
        };
        if !self.inner.exists(&node) {
            tracing::debug!(node = %node, "Dropping reference to missing node");
            return None;
        }
        if category {
            let is_category = self
                .inner
                .get_type(ctx, &node)
                .is_ok_and(|node_type| self.dictionary.is_subclass(&node_type, &TYPE_CATEGORY));
            if !is_category {
                tracing::debug!(node = %node, "Dropping category reference to non-category node");
                return None;
            }
        }
        Some(node)
    }

    /// Sanitised value for `name`; other properties pass unchanged.
    fn sanitize(&self, ctx: &OperationContext, name: &QName, value: PropertyValue) -> PropertyValue {
        let Some(def) = self.reference_property(name) else {
            return value;
        };
        let category = def.data_type == DATATYPE_CATEGORY;
        let multi_valued = def.multi_valued;

        let raw = match value {
            PropertyValue::List(values) => values,
            single => vec![single],
        };
        let mut kept = raw.iter().filter_map(|v| self.accept(ctx, v, category));

        if multi_valued {
            PropertyValue::List(kept.map(PropertyValue::NodeRef).collect())
        } else {
            kept.next().map_or(PropertyValue::Null, PropertyValue::NodeRef)
        }
    }

    fn sanitize_all(&self, ctx: &OperationContext, properties: Properties) -> Properties {
        properties
            .into_iter()
            .map(|(name, value)| {
                let value = self.sanitize(ctx, &name, value);
                (name, value)
            })
            .collect()
    }

    /// Read-side cleanup: single-valued references that did not survive are left out.
    fn sanitize_read(&self, ctx: &OperationContext, properties: Properties) -> Properties {
        self.sanitize_all(ctx, properties)
            .into_iter()
            .filter(|(name, value)| !(value.is_null() && self.reference_property(name).is_some()))
            .collect()
    }
}

impl<S: NodeService> NodeService for NodeRefPropertySanitizer<S> {
    delegate_node_service! { inner;
        exists(node: &NodeRef) -> bool;
        get_root_node(ctx: &OperationContext, store: &StoreRef) -> Result<NodeRef>;
        get_type(ctx: &OperationContext, node: &NodeRef) -> Result<QName>;
        get_aspects(ctx: &OperationContext, node: &NodeRef) -> Result<BTreeSet<QName>>;
        add_child(ctx: &OperationContext, parent: &NodeRef, child: &NodeRef, assoc_type: &QName, assoc_name: &QName) -> Result<ChildAssociationRef>;
        remove_child(ctx: &OperationContext, parent: &NodeRef, child: &NodeRef) -> Result<()>;
        move_node(ctx: &OperationContext, node: &NodeRef, new_parent: &NodeRef, assoc_type: &QName, assoc_name: &QName) -> Result<ChildAssociationRef>;
        delete_node(ctx: &OperationContext, node: &NodeRef) -> Result<()>;
        get_parent_assocs(ctx: &OperationContext, node: &NodeRef) -> Result<Vec<ChildAssociationRef>>;
        get_child_assocs(ctx: &OperationContext, node: &NodeRef) -> Result<Vec<ChildAssociationRef>>;
    }

    fn get_property(
        &self,
        ctx: &OperationContext,
        node: &NodeRef,
        name: &QName,
    ) -> Result<Option<PropertyValue>> {
        let value = self.inner.get_property(ctx, node, name)?;
        let reference = self.reference_property(name).is_some();
        Ok(value
            .map(|value| self.sanitize(ctx, name, value))
            .filter(|value| !(reference && value.is_null())))
    }

    fn get_properties(&self, ctx: &OperationContext, node: &NodeRef) -> Result<Properties> {
        let properties = self.inner.get_properties(ctx, node)?;
        Ok(self.sanitize_read(ctx, properties))
    }

    fn set_property(
        &self,
        ctx: &OperationContext,
        node: &NodeRef,
        name: &QName,
        value: PropertyValue,
    ) -> Result<()> {
        let value = self.sanitize(ctx, name, value);
        self.inner.set_property(ctx, node, name, value)
    }

    fn set_properties(&self, ctx: &OperationContext, node: &NodeRef, properties: Properties) -> Result<()> {
        let properties = self.sanitize_all(ctx, properties);
        self.inner.set_properties(ctx, node, properties)
    }

    fn add_properties(&self, ctx: &OperationContext, node: &NodeRef, properties: Properties) -> Result<()> {
        let properties = self.sanitize_all(ctx, properties);
        self.inner.add_properties(ctx, node, properties)
    }

    fn add_aspect(
        &self,
        ctx: &OperationContext,
        node: &NodeRef,
        aspect: &QName,
        properties: Properties,
    ) -> Result<()> {
        let properties = self.sanitize_all(ctx, properties);
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
        let properties = self.sanitize_all(ctx, properties);
        self.inner
            .create_node(ctx, parent, assoc_type, assoc_name, node_type, properties)
    }
}
