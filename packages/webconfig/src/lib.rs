//! CMS web client configuration.
//!
//! Loads layered `<webclient-config>` XML sources into typed config
//! elements and answers lookups for global and conditional sections.
//! Later sources override or extend earlier ones through per-element
//! combine rules.
//!
//! # Example
//!
//! ```
//! use cms_webconfig::{ConfigService, ConfigSource, LanguagesConfigElement, LookupObject};
//!
//! let xml = r#"<webclient-config>
//!     <config evaluator="string-compare" condition="Languages">
//!         <languages><language locale="en_US">English</language></languages>
//!     </config>
//! </webclient-config>"#;
//!
//! let service = ConfigService::load(vec![ConfigSource::inline("base", xml)]).unwrap();
//! let config = service.get_config(&LookupObject::named("Languages")).unwrap();
//! let languages = config.element::<LanguagesConfigElement>().unwrap();
//! assert_eq!(languages.label_for_language("en_US"), Some("English"));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Element names, defaults and load options
//! - [`error`]: Error types and Result alias
//! - [`xml`]: XML helpers shared by the readers
//! - [`merge`]: Combine primitives and per-element merge strategies
//! - [`element`]: The [`ConfigElement`] variant and generic elements
//! - [`elements`]: Typed web client elements
//! - [`reader`]: Element reader contract
//! - [`registry`]: Reader registry and plug-in bindings
//! - [`evaluator`]: Section evaluators
//! - [`service`]: Source loading, snapshots and lookups
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod element;
pub mod elements;
pub mod error;
pub mod evaluator;
pub mod merge;
pub mod reader;
pub mod registry;
pub mod service;
pub mod xml;

// Re-export commonly used items
pub use config::LoadOptions;
pub use element::{ConfigElement, GenericConfigElement, TypedElement};
pub use elements::*;
pub use error::{ConfigError, Result};
pub use evaluator::{Evaluator, EvaluatorRegistry, LookupObject};
pub use merge::{Combine, MergeKind, MergeStrategy};
pub use reader::{ElementReader, ReadElement};
pub use registry::{create_webclient_registry, ReaderRegistry};
pub use service::{Config, ConfigSection, ConfigService, ConfigSnapshot, ConfigSource, LookupContext};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
