//! `<server>`: externally visible address of the web client.

use roxmltree::Node;
use serde::Serialize;

use crate::element::TypedElement;
use crate::error::Result;
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::reader::ReadElement;
use crate::xml::{child_text, expect_element, number_child};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerConfigElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
}

impl ServerConfigElement {
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

impl ReadElement for ServerConfigElement {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        expect_element(node, Self::ELEMENT)?;
        Ok(Self {
            scheme: child_text(node, "scheme"),
            hostname: child_text(node, "hostname"),
            port: number_child(node, "port")?,
        })
    }
}

const SERVER_RULES: &[FieldRule] = &[
    FieldRule::new("scheme", MergeKind::KeyWiseOverride),
    FieldRule::new("hostname", MergeKind::KeyWiseOverride),
    FieldRule::new("port", MergeKind::KeyWiseOverride),
];

impl Combine for ServerConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: Self::ELEMENT,
        rules: SERVER_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        Self {
            scheme: Self::STRATEGY.option("scheme", &self.scheme, &other.scheme),
            hostname: Self::STRATEGY.option("hostname", &self.hostname, &other.hostname),
            port: Self::STRATEGY.option("port", &self.port, &other.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use roxmltree::Document;

    fn parse(xml: &str) -> ServerConfigElement {
        let doc = Document::parse(xml).unwrap();
        ServerConfigElement::read(doc.root_element()).unwrap()
    }

    #[test]
    fn test_read_server() {
        let server = parse(
            "<server><scheme>https</scheme><hostname>cms.example.org</hostname><port>8443</port></server>",
        );
        assert_eq!(server.scheme(), Some("https"));
        assert_eq!(server.hostname(), Some("cms.example.org"));
        assert_eq!(server.port(), Some(8443));
    }

    #[test]
    fn test_port_out_of_range_fails() {
        let doc = Document::parse("<server><port>70000</port></server>").unwrap();
        assert!(matches!(
            ServerConfigElement::read(doc.root_element()),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_combine_overrides_set_fields_only() {
        let base = parse("<server><scheme>http</scheme><hostname>localhost</hostname></server>");
        let other = parse("<server><hostname>cms.example.org</hostname><port>80</port></server>");

        let (base_before, other_before) = (base.clone(), other.clone());
        let combined = base.combine(&other);
        assert_eq!(base, base_before);
        assert_eq!(other, other_before);
        assert_eq!(combined.scheme(), Some("http"));
        assert_eq!(combined.hostname(), Some("cms.example.org"));
        assert_eq!(combined.port(), Some(80));
    }
}
