//! Config service: loads sources into sections and answers lookups.
//!
//! Sources are read in order. Each `<config>` section is identified by its
//! evaluator, condition and area; a later section with the same identity is
//! combined into the earlier one element by element, or replaces its
//! elements when marked `replace="true"`.
//!
//! The loaded sections form an immutable [`ConfigSnapshot`] shared behind an
//! `Arc`. [`ConfigService::reload`] builds a complete new snapshot and only
//! publishes it when every source loaded cleanly.
//!
//! # Example
//!
//! ```
//! use cms_webconfig::{ClientConfigElement, ConfigService, ConfigSource};
//!
//! let xml = r#"<webclient-config>
//!     <config><client><search-minimum>4</search-minimum></client></config>
//! </webclient-config>"#;
//!
//! let service = ConfigService::load(vec![ConfigSource::inline("base", xml)]).unwrap();
//! let global = service.global_config().unwrap();
//! let client = global.element::<ClientConfigElement>().unwrap();
//! assert_eq!(client.search_minimum(), 4);
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use roxmltree::{Document, Node};
use serde::Serialize;

use crate::config::{LoadOptions, PLUG_INS_ELEMENT, ROOT_ELEMENT, SECTION_ELEMENT};
use crate::element::{ConfigElement, TypedElement};
use crate::error::{ConfigError, Result};
use crate::evaluator::{EvaluatorRegistry, LookupObject};
use crate::registry::{create_webclient_registry, ReaderRegistry};
use crate::xml::{bool_attribute, element_children, expect_element, get_attribute, get_tag_name};

// =============================================================================
// Sources
// =============================================================================

/// Where a config document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Document held in memory, with a name used in logs and errors.
    Inline { name: String, content: String },
    /// Document read from disk on every load.
    File(PathBuf),
}

impl ConfigSource {
    #[must_use]
    pub fn inline(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Inline {
            name: name.into(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    pub fn name(&self) -> String {
        match self {
            Self::Inline { name, .. } => name.clone(),
            Self::File(path) => path.display().to_string(),
        }
    }

    fn read(&self, options: &LoadOptions) -> Result<String> {
        let content = match self {
            Self::Inline { content, .. } => content.clone(),
            Self::File(path) => std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?,
        };
        if content.len() > options.max_source_size {
            return Err(ConfigError::SourceTooLarge {
                source_name: self.name(),
                size: content.len(),
                limit: options.max_source_size,
            });
        }
        Ok(content)
    }
}

// =============================================================================
// Sections and snapshots
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
struct SectionKey {
    evaluator: Option<String>,
    condition: Option<String>,
    area: Option<String>,
}

/// A `<config>` block after all sources with the same identity were merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    evaluator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    area: Option<String>,
    elements: IndexMap<String, ConfigElement>,
}

impl ConfigSection {
    fn new(key: &SectionKey) -> Self {
        Self {
            evaluator: key.evaluator.clone(),
            condition: key.condition.clone(),
            area: key.area.clone(),
            elements: IndexMap::new(),
        }
    }

    /// A section without an evaluator applies to every lookup.
    pub fn is_global(&self) -> bool {
        self.evaluator.is_none()
    }

    pub fn evaluator(&self) -> Option<&str> {
        self.evaluator.as_deref()
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn area(&self) -> Option<&str> {
        self.area.as_deref()
    }

    pub fn elements(&self) -> &IndexMap<String, ConfigElement> {
        &self.elements
    }

    pub fn element(&self, name: &str) -> Option<&ConfigElement> {
        self.elements.get(name)
    }

    /// Combine `element` into the section, or replace an existing one.
    fn put(&mut self, element: ConfigElement, replace: bool) -> Result<()> {
        let name = element.name().to_string();
        let merged = match self.elements.get(&name) {
            Some(existing) if !replace => existing.combine(&element)?,
            Some(_) => {
                tracing::debug!(element = %name, "Replacing config element");
                element
            }
            None => element,
        };
        self.elements.insert(name, merged);
        Ok(())
    }
}

/// Immutable result of loading every source once.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigSnapshot {
    sections: Vec<ConfigSection>,
}

impl ConfigSnapshot {
    /// Sections in the order their identity was first seen.
    pub fn sections(&self) -> &[ConfigSection] {
        &self.sections
    }
}

struct SnapshotBuilder<'r> {
    readers: ReaderRegistry,
    evaluators: &'r EvaluatorRegistry,
    options: &'r LoadOptions,
    sections: IndexMap<SectionKey, ConfigSection>,
}

impl<'r> SnapshotBuilder<'r> {
    fn new(readers: &ReaderRegistry, evaluators: &'r EvaluatorRegistry, options: &'r LoadOptions) -> Self {
        Self {
            readers: readers.clone(),
            evaluators,
            options,
            sections: IndexMap::new(),
        }
    }

    fn add_source(&mut self, source: &ConfigSource) -> Result<()> {
        let content = source.read(self.options)?;
        let document = Document::parse(&content)?;
        let root = document.root_element();
        expect_element(root, ROOT_ELEMENT)?;

        if let Some(plug_ins) = element_children(root).find(|n| get_tag_name(*n) == PLUG_INS_ELEMENT) {
            self.readers.register_plug_ins(plug_ins)?;
        }

        let mut section_count = 0;
        for child in element_children(root) {
            match get_tag_name(child) {
                SECTION_ELEMENT => {
                    self.add_section(child)?;
                    section_count += 1;
                }
                PLUG_INS_ELEMENT => {}
                other => tracing::warn!(
                    source = %source.name(),
                    element = other,
                    "Ignoring unexpected element in config source"
                ),
            }
        }
        tracing::info!(source = %source.name(), sections = section_count, "Loaded config source");
        Ok(())
    }

    fn add_section(&mut self, node: Node<'_, '_>) -> Result<()> {
        let evaluator = get_attribute(node, "evaluator");
        let mut condition = get_attribute(node, "condition");
        match &evaluator {
            Some(key) => {
                if !self.evaluators.contains(key) {
                    return Err(ConfigError::UnknownEvaluator(key.clone()));
                }
                if condition.is_none() {
                    return Err(ConfigError::missing_attribute(SECTION_ELEMENT, "condition"));
                }
            }
            None if condition.is_some() => {
                tracing::warn!(
                    condition = condition.as_deref().unwrap_or_default(),
                    "Ignoring condition on section without evaluator"
                );
                condition = None;
            }
            None => {}
        }

        let key = SectionKey {
            evaluator,
            condition,
            area: get_attribute(node, "area"),
        };
        let replace = bool_attribute(node, "replace")?.unwrap_or(false);

        let section = self
            .sections
            .entry(key)
            .or_insert_with_key(ConfigSection::new);
        for child in element_children(node) {
            let element = self.readers.parse(child)?;
            section.put(element, replace)?;
        }
        Ok(())
    }

    fn finish(self) -> ConfigSnapshot {
        ConfigSnapshot {
            sections: self.sections.into_values().collect(),
        }
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// Restricts a lookup to areas and optionally drops global sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupContext {
    areas: Vec<String>,
    include_global: bool,
}

impl LookupContext {
    /// No areas, global sections included.
    #[must_use]
    pub fn new() -> Self {
        Self {
            areas: Vec::new(),
            include_global: true,
        }
    }

    /// Also consider sections in `area`.
    #[must_use]
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.areas.push(area.into());
        self
    }

    /// Skip sections that have no evaluator.
    #[must_use]
    pub fn without_global(mut self) -> Self {
        self.include_global = false;
        self
    }

    fn admits(&self, section: &ConfigSection) -> bool {
        match section.area() {
            Some(area) => self.areas.iter().any(|a| a == area),
            None => true,
        }
    }
}

impl Default for LookupContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Effective configuration for one lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Config {
    elements: IndexMap<String, ConfigElement>,
}

impl Config {
    pub fn config_element(&self, name: &str) -> Option<&ConfigElement> {
        self.elements.get(name)
    }

    /// Typed element by its element name.
    pub fn element<T: TypedElement>(&self) -> Option<&T> {
        self.config_element(T::ELEMENT).and_then(T::from_element)
    }

    pub fn elements(&self) -> &IndexMap<String, ConfigElement> {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn merge_section(&mut self, section: &ConfigSection) -> Result<()> {
        for (name, element) in section.elements() {
            let merged = match self.elements.get(name) {
                Some(existing) => existing.combine(element)?,
                None => element.clone(),
            };
            self.elements.insert(name.clone(), merged);
        }
        Ok(())
    }
}

// =============================================================================
// Service
// =============================================================================

/// Loads config sources and serves effective configuration.
pub struct ConfigService {
    sources: Vec<ConfigSource>,
    readers: ReaderRegistry,
    evaluators: EvaluatorRegistry,
    options: LoadOptions,
    snapshot: RwLock<Arc<ConfigSnapshot>>,
}

impl ConfigService {
    /// Create a service with the web client readers and built-in evaluators.
    /// Nothing is loaded until [`reload`](Self::reload).
    #[must_use]
    pub fn new(sources: Vec<ConfigSource>) -> Self {
        Self {
            sources,
            readers: create_webclient_registry(),
            evaluators: EvaluatorRegistry::with_builtins(),
            options: LoadOptions::default(),
            snapshot: RwLock::new(Arc::new(ConfigSnapshot::default())),
        }
    }

    /// Create a service and load its sources.
    pub fn load(sources: Vec<ConfigSource>) -> Result<Self> {
        let service = Self::new(sources);
        service.reload()?;
        Ok(service)
    }

    #[must_use]
    pub fn with_readers(mut self, readers: ReaderRegistry) -> Self {
        self.readers = readers;
        self
    }

    #[must_use]
    pub fn with_evaluators(mut self, evaluators: EvaluatorRegistry) -> Self {
        self.evaluators = evaluators;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    /// Load every source into a new snapshot and publish it.
    ///
    /// # Errors
    /// Any source failure aborts the reload; the previously published
    /// snapshot stays active.
    pub fn reload(&self) -> Result<()> {
        let mut builder = SnapshotBuilder::new(&self.readers, &self.evaluators, &self.options);
        for source in &self.sources {
            if let Err(err) = builder.add_source(source) {
                tracing::warn!(source = %source.name(), error = %err, "Config reload failed, keeping previous configuration");
                return Err(err);
            }
        }
        let snapshot = Arc::new(builder.finish());
        let sections = snapshot.sections().len();
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
        tracing::info!(sources = self.sources.len(), sections, "Published config snapshot");
        Ok(())
    }

    /// Currently published snapshot.
    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Combined global sections without an area.
    pub fn global_config(&self) -> Result<Config> {
        self.collect(None, &LookupContext::default())
    }

    /// Global sections plus every section whose evaluator accepts `object`.
    pub fn get_config(&self, object: &LookupObject) -> Result<Config> {
        self.collect(Some(object), &LookupContext::default())
    }

    /// Like [`get_config`](Self::get_config), restricted by `context`.
    pub fn get_config_in(&self, object: &LookupObject, context: &LookupContext) -> Result<Config> {
        self.collect(Some(object), context)
    }

    fn collect(&self, object: Option<&LookupObject>, context: &LookupContext) -> Result<Config> {
        let snapshot = self.snapshot();
        let mut config = Config::default();
        for section in snapshot.sections() {
            if !context.admits(section) || !self.section_applies(section, object, context) {
                continue;
            }
            config.merge_section(section)?;
        }
        Ok(config)
    }

    fn section_applies(
        &self,
        section: &ConfigSection,
        object: Option<&LookupObject>,
        context: &LookupContext,
    ) -> bool {
        match (section.evaluator(), section.condition(), object) {
            (None, _, _) => context.include_global,
            (Some(evaluator), Some(condition), Some(object)) => {
                self.evaluators.applies(evaluator, object, condition)
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for ConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigService")
            .field("sources", &self.sources)
            .field("readers", &self.readers)
            .field("evaluators", &self.evaluators)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
