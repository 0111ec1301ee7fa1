//! XML helpers shared by the element readers.
//!
//! Thin wrappers over `roxmltree` that turn absent or blank values into
//! `None` and map format problems onto [`ConfigError`].

use std::str::FromStr;

use roxmltree::Node;

use crate::error::{ConfigError, Result};

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use cms_webconfig::xml::get_tag_name;
///
/// let doc = Document::parse("<config><client/></config>").unwrap();
/// let client = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(client), "client");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Fail unless `node` is an element named `expected`.
pub fn expect_element(node: Node<'_, '_>, expected: &str) -> Result<()> {
    if node.is_element() && get_tag_name(node) == expected {
        Ok(())
    } else {
        Err(ConfigError::WrongElement {
            expected: expected.to_string(),
            found: get_tag_name(node).to_string(),
        })
    }
}

/// Find the first child element with the given tag name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use cms_webconfig::xml::find_child;
///
/// let doc = Document::parse("<root><a/><b/></root>").unwrap();
/// assert!(find_child(doc.root_element(), "b").is_some());
/// assert!(find_child(doc.root_element(), "c").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find all child elements with the given tag name.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && get_tag_name(*child) == tag)
}

/// Get all element children of a node.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Get the trimmed text of a node, or `None` when it is blank.
pub fn get_text(node: Node<'_, '_>) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Get the trimmed text of the first child element named `tag`.
pub fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    find_child(node, tag).and_then(get_text)
}

/// Get a non-blank attribute value.
pub fn get_attribute(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Get a mandatory attribute, failing with `MissingAttribute`.
pub fn required_attribute(node: Node<'_, '_>, name: &str) -> Result<String> {
    get_attribute(node, name)
        .ok_or_else(|| ConfigError::missing_attribute(get_tag_name(node), name))
}

/// Parse a boolean the way config files write them (`true`/`false`, any case).
pub fn parse_bool(element: &str, field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Ok(true),
        "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            element: element.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parse a number, failing with `InvalidNumber`.
pub fn parse_number<T: FromStr>(element: &str, field: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber {
            element: element.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// Read an optional boolean attribute.
pub fn bool_attribute(node: Node<'_, '_>, name: &str) -> Result<Option<bool>> {
    get_attribute(node, name)
        .map(|v| parse_bool(get_tag_name(node), name, &v))
        .transpose()
}

/// Read an optional boolean child element.
pub fn bool_child(node: Node<'_, '_>, tag: &str) -> Result<Option<bool>> {
    child_text(node, tag)
        .map(|v| parse_bool(get_tag_name(node), tag, &v))
        .transpose()
}

/// Read an optional numeric child element.
pub fn number_child<T: FromStr>(node: Node<'_, '_>, tag: &str) -> Result<Option<T>> {
    child_text(node, tag)
        .map(|v| parse_number(get_tag_name(node), tag, &v))
        .transpose()
}

/// Read an optional numeric attribute.
pub fn number_attribute<T: FromStr>(node: Node<'_, '_>, name: &str) -> Result<Option<T>> {
    get_attribute(node, name)
        .map(|v| parse_number(get_tag_name(node), name, &v))
        .transpose()
}
