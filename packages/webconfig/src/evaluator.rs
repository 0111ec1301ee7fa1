//! Section evaluators.
//!
//! A `<config evaluator="..." condition="...">` section only applies to a
//! lookup when its evaluator accepts the lookup object for the condition.
//! Evaluators are resolved from an explicit string-keyed registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::evaluators;

/// What a config lookup is about.
///
/// Either a plain name (a page, a dialog, a section label) or a node
/// described by its type and aspects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupObject {
    name: Option<String>,
    node_type: Option<String>,
    aspects: Vec<String>,
}

impl LookupObject {
    /// Lookup by name, matched by the `string-compare` evaluator.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Lookup for a node of the given type.
    #[must_use]
    pub fn node(node_type: impl Into<String>) -> Self {
        Self {
            node_type: Some(node_type.into()),
            ..Self::default()
        }
    }

    /// Add an aspect applied to the node.
    #[must_use]
    pub fn with_aspect(mut self, aspect: impl Into<String>) -> Self {
        self.aspects.push(aspect.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn node_type(&self) -> Option<&str> {
        self.node_type.as_deref()
    }

    pub fn aspects(&self) -> &[String] {
        &self.aspects
    }
}

/// Decides whether a conditional section applies.
pub trait Evaluator: Send + Sync {
    fn applies(&self, object: &LookupObject, condition: &str) -> bool;
}

/// Matches when the lookup name equals the condition.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCompareEvaluator;

impl Evaluator for StringCompareEvaluator {
    fn applies(&self, object: &LookupObject, condition: &str) -> bool {
        object.name() == Some(condition)
    }
}

/// Matches when the node type equals the condition.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeTypeEvaluator;

impl Evaluator for NodeTypeEvaluator {
    fn applies(&self, object: &LookupObject, condition: &str) -> bool {
        object.node_type() == Some(condition)
    }
}

/// Matches when the node carries the aspect named by the condition.
#[derive(Debug, Clone, Copy, Default)]
pub struct AspectNameEvaluator;

impl Evaluator for AspectNameEvaluator {
    fn applies(&self, object: &LookupObject, condition: &str) -> bool {
        object.aspects().iter().any(|aspect| aspect == condition)
    }
}

/// Evaluators keyed by the name used in `evaluator="..."`.
#[derive(Clone)]
pub struct EvaluatorRegistry {
    evaluators: HashMap<String, Arc<dyn Evaluator>>,
}

impl EvaluatorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            evaluators: HashMap::new(),
        }
    }

    /// Create a registry with the built-in evaluators.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(evaluators::STRING_COMPARE, StringCompareEvaluator);
        registry.register(evaluators::NODE_TYPE, NodeTypeEvaluator);
        registry.register(evaluators::ASPECT_NAME, AspectNameEvaluator);
        registry
    }

    pub fn register(&mut self, key: impl Into<String>, evaluator: impl Evaluator + 'static) {
        self.evaluators.insert(key.into(), Arc::new(evaluator));
    }

    pub fn get(&self, key: &str) -> Option<&dyn Evaluator> {
        self.evaluators.get(key).map(|e| e.as_ref())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.evaluators.contains_key(key)
    }

    /// Evaluate `condition` with the evaluator registered under `key`.
    ///
    /// An unknown key never applies.
    pub fn applies(&self, key: &str, object: &LookupObject, condition: &str) -> bool {
        self.get(key)
            .is_some_and(|evaluator| evaluator.applies(object, condition))
    }
}

impl Default for EvaluatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for EvaluatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.evaluators.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("EvaluatorRegistry")
            .field("evaluators", &keys)
            .finish()
    }
}
