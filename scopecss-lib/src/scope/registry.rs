use std::collections::{BTreeMap, BTreeSet};

use log::trace;
use serde::{Deserialize, Serialize};

/// Bucket used for modifiers that have no owning tag in their compound selector.
pub const COMMON_ELEMENT: &str = "__common__";

/// Which half of an [`Element`] an attribute lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModKind {
    /// Namespaced attribute, e.g. `[use|size]`.
    Mod,
    /// Plain attribute, e.g. `[disabled]`.
    Prop,
}

/// Attribute names and values observed for one resolved element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub mods: BTreeMap<String, BTreeSet<String>>,
    pub props: BTreeMap<String, BTreeSet<String>>,
}

impl Element {
    /// Adds `value` to the set kept for `name`. Sets only ever grow.
    pub fn record(&mut self, kind: ModKind, name: &str, value: &str) {
        let bucket = match kind {
            ModKind::Mod => &mut self.mods,
            ModKind::Prop => &mut self.props,
        };
        let _ = bucket
            .entry(name.to_string())
            .or_default()
            .insert(value.to_string());
    }
}

/// Maps a resolved tag name to the modifiers and props seen for it.
///
/// Shared across resolver runs through `ScopeResolver::state`, so every rule of
/// one stylesheet contributes to the same registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementRegistry {
    elements: BTreeMap<String, Element>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `tag`, creating an empty one on first sight.
    pub fn add_element(&mut self, tag: &str) -> &mut Element {
        if !self.elements.contains_key(tag) {
            trace!("registering element {tag}");
        }
        self.elements.entry(tag.to_string()).or_default()
    }

    pub fn get(&self, tag: &str) -> Option<&Element> {
        self.elements.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.elements.contains_key(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Element)> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
