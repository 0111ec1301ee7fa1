//! The combine engine.
//!
//! Every config element type merges a base (earlier) definition with an
//! override (later) definition. Each type declares a [`MergeStrategy`]
//! table naming the [`MergeKind`] of every field, and its combine routes
//! each field through the strategy's typed dispatchers ([`MergeStrategy::value`],
//! [`MergeStrategy::option`], [`MergeStrategy::list`], [`MergeStrategy::map`],
//! [`MergeStrategy::map_with`], [`MergeStrategy::set`]), which pick the
//! primitive for the declared kind. Inputs are only ever borrowed; every
//! primitive builds a fresh value.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

/// How one field of a config element is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    /// Override wins when it differs from the type's fresh default.
    KeyWiseOverride,
    /// Override wins when it is present at all; collections are replaced
    /// whole when the override has entries.
    OverrideIfSet,
    /// Keyed entries: base first, override entries replace same keys in place.
    MapUnion,
    /// Entries present in both sides are themselves combined.
    Nested,
    /// Ordered entries: override appended only when its key is absent.
    AppendIfAbsent,
    /// Ordered entries: override entries appended after base entries.
    Append,
    /// Never merged directly; rebuilt from the merged source field.
    Derived,
}

/// One row of a strategy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Field (or field group) name as it appears in the XML vocabulary.
    pub field: &'static str,
    /// Merge primitive applied to the field.
    pub kind: MergeKind,
}

impl FieldRule {
    /// Create a rule.
    #[must_use]
    pub const fn new(field: &'static str, kind: MergeKind) -> Self {
        Self { field, kind }
    }
}

/// Per-type declaration of how its fields combine.
#[derive(Debug, Clone, Copy)]
pub struct MergeStrategy {
    /// Element name the strategy belongs to.
    pub element: &'static str,
    /// Field rules in declaration order.
    pub rules: &'static [FieldRule],
}

impl MergeStrategy {
    /// Look up the merge kind declared for a field.
    #[must_use]
    pub fn kind_of(&self, field: &str) -> Option<MergeKind> {
        self.rules
            .iter()
            .find(|rule| rule.field == field)
            .map(|rule| rule.kind)
    }

    /// Declared kind, with override-wins for fields the table forgot.
    fn kind(&self, field: &str) -> MergeKind {
        self.kind_of(field).unwrap_or_else(|| {
            tracing::warn!(
                element = self.element,
                field,
                "No merge rule declared; override wins"
            );
            MergeKind::OverrideIfSet
        })
    }

    /// Merge a plain value that has a fresh default.
    pub fn value<T>(&self, field: &str, base: &T, other: &T, default: &T) -> T
    where
        T: PartialEq + Clone,
    {
        match self.kind(field) {
            MergeKind::KeyWiseOverride => override_unless_default(base, other, default),
            MergeKind::AppendIfAbsent | MergeKind::Derived => base.clone(),
            MergeKind::OverrideIfSet
            | MergeKind::MapUnion
            | MergeKind::Nested
            | MergeKind::Append => other.clone(),
        }
    }

    /// Merge an optional value.
    pub fn option<T>(&self, field: &str, base: &Option<T>, other: &Option<T>) -> Option<T>
    where
        T: PartialEq + Clone,
    {
        match self.kind(field) {
            MergeKind::AppendIfAbsent => base.clone().or_else(|| other.clone()),
            MergeKind::Derived => base.clone(),
            MergeKind::KeyWiseOverride => override_unless_default(base, other, &None),
            MergeKind::OverrideIfSet
            | MergeKind::MapUnion
            | MergeKind::Nested
            | MergeKind::Append => override_if_set(base, other),
        }
    }

    /// Merge an ordered list whose entries are identified by `key`.
    pub fn list<T, K, F>(&self, field: &str, base: &[T], other: &[T], key: F) -> Vec<T>
    where
        T: Clone,
        K: Hash + Eq,
        F: Fn(&T) -> K,
    {
        match self.kind(field) {
            MergeKind::AppendIfAbsent => append_if_absent(base, other, key),
            MergeKind::Append => base.iter().chain(other).cloned().collect(),
            MergeKind::MapUnion | MergeKind::Nested => union_list(base, other, key),
            MergeKind::KeyWiseOverride | MergeKind::OverrideIfSet => {
                replace_if_nonempty(base, other)
            }
            MergeKind::Derived => base.to_vec(),
        }
    }

    /// Merge a keyed map whose shared entries are taken whole.
    pub fn map<K, V>(
        &self,
        field: &str,
        base: &IndexMap<K, V>,
        other: &IndexMap<K, V>,
    ) -> IndexMap<K, V>
    where
        K: Hash + Eq + Clone,
        V: Clone,
    {
        match self.kind(field) {
            MergeKind::AppendIfAbsent => append_map_if_absent(base, other),
            MergeKind::MapUnion | MergeKind::Nested | MergeKind::Append => union_map(base, other),
            MergeKind::KeyWiseOverride | MergeKind::OverrideIfSet => {
                if other.is_empty() {
                    base.clone()
                } else {
                    other.clone()
                }
            }
            MergeKind::Derived => base.clone(),
        }
    }

    /// Merge a keyed map; under [`MergeKind::Nested`] shared entries are
    /// combined with `merge`, otherwise this behaves like [`Self::map`].
    pub fn map_with<K, V, F>(
        &self,
        field: &str,
        base: &IndexMap<K, V>,
        other: &IndexMap<K, V>,
        merge: F,
    ) -> IndexMap<K, V>
    where
        K: Hash + Eq + Clone,
        V: Clone,
        F: Fn(&V, &V) -> V,
    {
        match self.kind(field) {
            MergeKind::Nested => union_map_with(base, other, merge),
            _ => self.map(field, base, other),
        }
    }

    /// Merge an ordered set.
    pub fn set<T>(&self, field: &str, base: &IndexSet<T>, other: &IndexSet<T>) -> IndexSet<T>
    where
        T: Hash + Eq + Clone,
    {
        match self.kind(field) {
            MergeKind::AppendIfAbsent
            | MergeKind::Append
            | MergeKind::MapUnion
            | MergeKind::Nested => union_set(base, other),
            MergeKind::KeyWiseOverride | MergeKind::OverrideIfSet => {
                if other.is_empty() {
                    base.clone()
                } else {
                    other.clone()
                }
            }
            MergeKind::Derived => base.clone(),
        }
    }
}

/// Values that can be layered on top of each other.
///
/// `self` is the base definition and `other` the override. Neither is
/// modified; the merged value is always newly constructed.
pub trait Combine: Sized {
    /// Strategy table describing how this type merges.
    const STRATEGY: MergeStrategy;

    /// Merge `other` on top of `self`.
    #[must_use]
    fn combine(&self, other: &Self) -> Self;
}

/// [`MergeKind::KeyWiseOverride`]: take `other` unless it equals `default`.
///
/// An override that explicitly restates the default is indistinguishable
/// from one that left the field unset, so the base value survives in both
/// cases.
pub fn override_unless_default<T: PartialEq + Clone>(base: &T, other: &T, default: &T) -> T {
    if other != default {
        other.clone()
    } else {
        base.clone()
    }
}

/// [`MergeKind::OverrideIfSet`]: take `other` when present.
pub fn override_if_set<T: Clone>(base: &Option<T>, other: &Option<T>) -> Option<T> {
    other.clone().or_else(|| base.clone())
}

/// [`MergeKind::MapUnion`]: base entries, then override entries replacing
/// same keys in their original position.
pub fn union_map<K, V>(base: &IndexMap<K, V>, other: &IndexMap<K, V>) -> IndexMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    let mut combined = base.clone();
    for (key, value) in other {
        combined.insert(key.clone(), value.clone());
    }
    combined
}

/// [`MergeKind::Nested`]: like [`union_map`] but entries present on both
/// sides are merged with `merge`.
pub fn union_map_with<K, V, F>(
    base: &IndexMap<K, V>,
    other: &IndexMap<K, V>,
    merge: F,
) -> IndexMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
    F: Fn(&V, &V) -> V,
{
    let mut combined = base.clone();
    for (key, value) in other {
        let merged = match base.get(key) {
            Some(existing) => merge(existing, value),
            None => value.clone(),
        };
        combined.insert(key.clone(), merged);
    }
    combined
}

/// Set union preserving base order, override additions appended.
pub fn union_set<T: Hash + Eq + Clone>(base: &IndexSet<T>, other: &IndexSet<T>) -> IndexSet<T> {
    base.iter().chain(other.iter()).cloned().collect()
}

/// [`MergeKind::AppendIfAbsent`] over a list keyed by `key`.
///
/// Base order is kept; override items whose key is already present are
/// dropped, new ones appended in override order.
pub fn append_if_absent<T, K, F>(base: &[T], other: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen: IndexSet<K> = base.iter().map(&key).collect();
    let mut combined = base.to_vec();
    for item in other {
        if seen.insert(key(item)) {
            combined.push(item.clone());
        }
    }
    combined
}

/// [`MergeKind::AppendIfAbsent`] over a keyed map: base wins on conflict.
pub fn append_map_if_absent<K, V>(base: &IndexMap<K, V>, other: &IndexMap<K, V>) -> IndexMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    let mut combined = base.clone();
    for (key, value) in other {
        combined.entry(key.clone()).or_insert_with(|| value.clone());
    }
    combined
}

/// [`MergeKind::MapUnion`] over a list keyed by `key`: base order kept,
/// same-key override entries replace in place, new ones appended.
pub fn union_list<T, K, F>(base: &[T], other: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let overrides: IndexMap<K, &T> = other.iter().map(|item| (key(item), item)).collect();
    let base_keys: IndexSet<K> = base.iter().map(&key).collect();
    let mut combined: Vec<T> = base
        .iter()
        .map(|item| overrides.get(&key(item)).map_or_else(|| item.clone(), |o| (*o).clone()))
        .collect();
    combined.extend(
        overrides
            .iter()
            .filter(|(k, _)| !base_keys.contains(*k))
            .map(|(_, item)| (*item).clone()),
    );
    combined
}

fn replace_if_nonempty<T: Clone>(base: &[T], other: &[T]) -> Vec<T> {
    if other.is_empty() {
        base.to_vec()
    } else {
        other.to_vec()
    }
}
