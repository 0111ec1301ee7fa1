//! Element reader contract.
//!
//! A reader turns one XML element into one [`ConfigElement`]. Typed element
//! kinds implement [`ReadElement`] and are wrapped in a [`TypedReader`];
//! names with no typed reader fall back to [`GenericReader`].

use std::fmt;
use std::marker::PhantomData;

use roxmltree::Node;

use crate::element::{ConfigElement, GenericConfigElement, TypedElement};
use crate::error::Result;

/// Parse a typed element from its XML node.
pub trait ReadElement: TypedElement + Into<ConfigElement> {
    /// Build the element from `node`.
    ///
    /// # Errors
    /// `WrongElement` when `node` is not named [`TypedElement::ELEMENT`], and
    /// the shape errors of the particular element kind.
    fn read(node: Node<'_, '_>) -> Result<Self>;
}

/// Trait for element readers stored in a [`ReaderRegistry`](crate::registry::ReaderRegistry).
pub trait ElementReader: Send + Sync {
    /// Element name the reader insists on, or `None` for readers that accept
    /// any element.
    fn element_name(&self) -> Option<&'static str>;

    /// Parse `node` into a config element.
    fn parse(&self, node: Node<'_, '_>) -> Result<ConfigElement>;

    /// Parse an optional node; an absent node yields `Ok(None)`.
    fn parse_opt(&self, node: Option<Node<'_, '_>>) -> Result<Option<ConfigElement>> {
        node.map(|n| self.parse(n)).transpose()
    }
}

/// Reader for one typed element kind.
pub struct TypedReader<T> {
    _kind: PhantomData<fn() -> T>,
}

impl<T> TypedReader<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { _kind: PhantomData }
    }
}

impl<T> Default for TypedReader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypedReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedReader")
            .field("element", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: ReadElement> ElementReader for TypedReader<T> {
    fn element_name(&self) -> Option<&'static str> {
        Some(T::ELEMENT)
    }

    fn parse(&self, node: Node<'_, '_>) -> Result<ConfigElement> {
        let element = T::read(node)?;
        tracing::debug!(element = T::ELEMENT, "Parsed typed config element");
        Ok(element.into())
    }
}

/// Fallback reader producing [`GenericConfigElement`] trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericReader;

impl ElementReader for GenericReader {
    fn element_name(&self) -> Option<&'static str> {
        None
    }

    fn parse(&self, node: Node<'_, '_>) -> Result<ConfigElement> {
        Ok(GenericConfigElement::from_node(node).into())
    }
}
