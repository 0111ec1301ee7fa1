//! Error types for the web client configuration layer.
//!
//! Every variant is a configuration-format problem raised synchronously at
//! load time. Nothing here is retried; the loader aborts and keeps the
//! previously published configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for configuration loading and lookup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The XML document could not be parsed at all.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// A reader was handed an element with the wrong name.
    #[error("Expected <{expected}> element but found <{found}>")]
    WrongElement { expected: String, found: String },

    /// A mandatory attribute is absent or empty.
    #[error("Missing mandatory attribute '{attribute}' on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    /// A mandatory child element is absent.
    #[error("Missing required element <{child}> in <{element}>")]
    MissingElement { element: String, child: String },

    /// Two mutually exclusive attributes were both supplied.
    #[error("<{element}> cannot specify both '{first}' and '{second}'")]
    ConflictingAttributes {
        element: String,
        first: String,
        second: String,
    },

    /// A numeric value could not be parsed.
    #[error("Invalid number '{value}' for {field} in <{element}>")]
    InvalidNumber {
        element: String,
        field: String,
        value: String,
    },

    /// A boolean value could not be parsed.
    #[error("Invalid boolean '{value}' for {field} in <{element}>")]
    InvalidBoolean {
        element: String,
        field: String,
        value: String,
    },

    /// A value is syntactically fine but not allowed.
    #[error("Invalid value in <{element}>: {message}")]
    InvalidValue { element: String, message: String },

    /// The generic children view is not available for this element kind.
    #[error("Element '{0}' does not support generic child access")]
    ChildrenUnsupported(String),

    /// Two elements of different kinds were asked to combine.
    #[error("Cannot combine '{base}' with '{other}': element kinds differ")]
    IncompatibleCombine { base: String, other: String },

    /// A section names an evaluator that is not registered.
    #[error("Unknown evaluator '{0}'")]
    UnknownEvaluator(String),

    /// A plug-in declaration names a reader key that is not registered.
    #[error("Unknown element reader '{reader}' for element <{element}>")]
    UnknownReader { element: String, reader: String },

    /// A source exceeds the configured size limit.
    #[error("Config source '{source_name}' is {size} bytes, limit is {limit}")]
    SourceTooLarge {
        source_name: String,
        size: usize,
        limit: usize,
    },

    /// Reading a config file failed.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendering effective config failed.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),

    /// Rendering effective config failed.
    #[error("JSON serialization failed: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

impl ConfigError {
    /// Shorthand for [`ConfigError::MissingAttribute`].
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Self::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }

    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid_value(element: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            element: element.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attribute_display() {
        let err = ConfigError::missing_attribute("dialog", "page");
        assert_eq!(
            err.to_string(),
            "Missing mandatory attribute 'page' on <dialog>"
        );
    }

    #[test]
    fn test_conflicting_attributes_display() {
        let err = ConfigError::ConflictingAttributes {
            element: "override".to_string(),
            first: "from-view-id".to_string(),
            second: "from-outcome".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "<override> cannot specify both 'from-view-id' and 'from-outcome'"
        );
    }

    #[test]
    fn test_wrong_element_display() {
        let err = ConfigError::WrongElement {
            expected: "actions".to_string(),
            found: "dialogs".to_string(),
        };
        assert!(err.to_string().contains("<actions>"));
        assert!(err.to_string().contains("<dialogs>"));
    }
}
