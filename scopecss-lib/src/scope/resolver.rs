//! Rewrites attribute and tag selectors into scoped BEM-style classes.
//!
//! For scope `s` in local mode:
//!
//! * `[disabled]` becomes `._disabled`, `[type="submit"]` becomes
//!   `._type._type_submit`;
//! * `[s|size=m]` becomes `._s--size._s--size_m` (a *mod* rather than a *prop*);
//! * `button` becomes `.__button`, `s|button` becomes `.__s--button`;
//! * `:global(...)` escapes its content from scoping.
//!
//! In global mode nothing is rewritten except what sits inside `:local(...)`.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::ast::selector_tree::{Namespace, NodeId, NodeKind, SelectorTree};
use crate::error::Result;
use crate::parser::selector_parser::parse_selector_list;
use crate::scope::registry::{ElementRegistry, ModKind, COMMON_ELEMENT};

const LOCAL_PSEUDO: &str = ":local";
const GLOBAL_PSEUDO: &str = ":global";
const MOD_PREFIX: &str = "_";
const ELEM_PREFIX: &str = "__";

/// Whether selectors are scoped unless escaped, or unscoped unless opted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScopeBehaviour {
    #[default]
    Local,
    Global,
}

impl FromStr for ScopeBehaviour {
    type Err = std::convert::Infallible;

    /// `"global"` selects global mode; any other value means local.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(if s == "global" {
            ScopeBehaviour::Global
        } else {
            ScopeBehaviour::Local
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeConfig {
    pub scope: String,
    pub behaviour: ScopeBehaviour,
}

impl ScopeConfig {
    pub fn local(scope: impl Into<String>) -> Self {
        ScopeConfig {
            scope: scope.into(),
            behaviour: ScopeBehaviour::Local,
        }
    }

    pub fn global(scope: impl Into<String>) -> Self {
        ScopeConfig {
            scope: scope.into(),
            behaviour: ScopeBehaviour::Global,
        }
    }

    fn is_global(&self) -> bool {
        self.behaviour == ScopeBehaviour::Global
    }
}

/// Accumulated knowledge carried from one resolver to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverState {
    pub elements: ElementRegistry,
}

/// Resolves one stylesheet's selectors against a scope.
///
/// The element registry grows across [`run`](ScopeResolver::run) calls. Use one
/// resolver per stylesheet, or hand the registry over with
/// [`state`](ScopeResolver::state) / [`set_state`](ScopeResolver::set_state).
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    config: ScopeConfig,
    elements: ElementRegistry,
    hashes: BTreeSet<String>,
    /// Scope decisions for nodes lifted out of `:global` / `:local` during this run.
    lifted: HashMap<NodeId, bool>,
}

impl ScopeResolver {
    pub fn new(config: ScopeConfig) -> Self {
        ScopeResolver {
            config,
            elements: ElementRegistry::new(),
            hashes: BTreeSet::new(),
            lifted: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    pub fn state(&self) -> ResolverState {
        ResolverState {
            elements: self.elements.clone(),
        }
    }

    pub fn set_state(&mut self, state: ResolverState) {
        self.elements = state.elements;
    }

    pub fn elements(&self) -> &ElementRegistry {
        &self.elements
    }

    /// `namespace + attribute + value` for every attribute rewritten by the last run.
    ///
    /// Nothing in this crate reads it; it is kept for consumers of the resolver.
    pub fn attribute_hashes(&self) -> &BTreeSet<String> {
        &self.hashes
    }

    /// Parses `rule`, rewrites it and prints the result.
    pub fn run(&mut self, rule: &str) -> Result<String> {
        let mut tree = parse_selector_list(rule)?;
        self.transform(&mut tree);
        Ok(tree.to_string())
    }

    /// Rewrites `tree` in place.
    ///
    /// All attributes are rewritten before any tag is visited: modifiers look
    /// backwards for their owning tag and must see it unrewritten.
    pub fn transform(&mut self, tree: &mut SelectorTree) {
        self.hashes.clear();
        self.lifted.clear();

        let attributes = tree.collect(|node| node.is_attribute());
        let mut rewritten_attributes = 0;
        for id in attributes {
            if !tree.is_attached(id) || !self.process_namespace(tree, id) {
                continue;
            }
            let node = &tree[id];
            let raw_value = match &node.kind {
                NodeKind::Attribute(matcher) => matcher.value.clone().unwrap_or_default(),
                _ => String::new(),
            };
            let namespace = node.namespace.as_ref().map_or("", Namespace::hash_fragment);
            let _ = self
                .hashes
                .insert(format!("{namespace}{}{raw_value}", node.value));

            let class_names = self.add_mod(tree, id, &raw_value);
            let replacement = tree.create(NodeKind::Class, class_names.join("."));
            tree.replace_with(id, replacement);
            rewritten_attributes += 1;
        }

        let tags = tree.collect(|node| node.is_tag());
        let mut rewritten_tags = 0;
        for id in tags {
            if !tree.is_attached(id) {
                continue;
            }
            // Nested namespaced elements arrive as `|tag`.
            if let Some(prev) = tree.prev(id) {
                if tree[prev].is_combinator() && tree[prev].value == "|" {
                    tree[prev].value.clear();
                    tree[id].namespace = Some(Namespace::Wildcard);
                }
            }

            if !self.process_namespace(tree, id) {
                continue;
            }

            let name = self.resolve_name(&tree[id].namespace, &tree[id].value);
            let _ = self.elements.add_element(&name);
            let replacement = tree.create(NodeKind::Class, format!("{ELEM_PREFIX}{name}"));
            tree.replace_with(id, replacement);
            rewritten_tags += 1;
        }

        self.unwrap_escapes(tree);

        debug!(
            "scope {}: rewrote {} attribute(s), {} tag(s)",
            self.config.scope, rewritten_attributes, rewritten_tags
        );
    }

    /// Decides whether the attribute or tag `id` gets scoped.
    ///
    /// Only the pseudo directly wrapping the node's selector is consulted.
    fn process_namespace(&mut self, tree: &mut SelectorTree, id: NodeId) -> bool {
        if let Some(&decision) = self.lifted.get(&id) {
            return decision;
        }

        let global_mode = self.config.is_global();
        if let Some(parent) = tree.parent(id) {
            if let Some(pseudo) = tree.parent(parent).filter(|&p| tree[p].is_pseudo()) {
                let pseudo_name = tree[pseudo].value.clone();
                if !global_mode && pseudo_name == GLOBAL_PSEUDO {
                    self.lift(tree, pseudo, parent, false);
                    return false;
                }
                if global_mode && pseudo_name == LOCAL_PSEUDO {
                    self.lift(tree, pseudo, parent, true);
                    return true;
                }
                if is_skipped_pseudo(&pseudo_name) {
                    return false;
                }
            }
        }

        if global_mode {
            return false;
        }

        match &tree[id].namespace {
            None => true,
            Some(Namespace::Wildcard) => true,
            Some(Namespace::Named(namespace)) => {
                namespace.is_empty() || *namespace == self.config.scope
            }
        }
    }

    /// Replaces `pseudo` with the content of its argument `selector` and
    /// remembers `decision` for every lifted node.
    ///
    /// A pseudo with several argument selectors stays as written; its nodes
    /// reach the same decision through `process_namespace` one by one.
    fn lift(&mut self, tree: &mut SelectorTree, pseudo: NodeId, selector: NodeId, decision: bool) {
        if tree.children(pseudo).len() != 1 {
            return;
        }
        for moved in tree.replace_with_children(pseudo, selector) {
            let _ = self.lifted.insert(moved, decision);
        }
    }

    /// Records the modifier for attribute `id` and returns its class names.
    fn add_mod(&mut self, tree: &SelectorTree, id: NodeId, raw_value: &str) -> Vec<String> {
        let mut prev = tree.prev(id);
        while let Some(current) = prev {
            let node = &tree[current];
            if matches!(node.kind, NodeKind::Tag | NodeKind::Id) || node.is_combinator() {
                break;
            }
            prev = tree.prev(current);
        }
        let tag = prev
            .map(|p| &tree[p])
            .filter(|node| matches!(node.kind, NodeKind::Tag | NodeKind::Id))
            .map_or(COMMON_ELEMENT, |node| node.value.as_str());

        let value = strip_quotes(raw_value);
        let node = &tree[id];
        let (kind, name) = match &node.namespace {
            Some(namespace) if namespace.is_set() => {
                (ModKind::Mod, format!("{}--{}", self.config.scope, node.value))
            }
            _ => (ModKind::Prop, node.value.clone()),
        };

        self.elements.add_element(tag).record(kind, &name, value);

        let mod_name = format!("{MOD_PREFIX}{name}");
        let mut class_names = vec![mod_name.clone()];
        if !value.is_empty() {
            class_names.push(format!("{mod_name}_{value}"));
        }
        class_names
    }

    fn resolve_name(&self, namespace: &Option<Namespace>, value: &str) -> String {
        match namespace {
            Some(namespace) if namespace.is_set() => format!("{}--{}", self.config.scope, value),
            _ => value.to_string(),
        }
    }

    /// Unwraps escape pseudos that hold no attributes or tags, e.g. `:global(.link)`.
    fn unwrap_escapes(&mut self, tree: &mut SelectorTree) {
        let escape = if self.config.is_global() {
            LOCAL_PSEUDO
        } else {
            GLOBAL_PSEUDO
        };
        let pseudos = tree.collect(|node| node.is_pseudo() && node.value == escape);
        for pseudo in pseudos {
            if !tree.is_attached(pseudo) {
                continue;
            }
            // Multi-selector escapes have no single inline form; leave them as written.
            if let [selector] = tree.children(pseudo)[..] {
                let _ = tree.replace_with_children(pseudo, selector);
            }
        }
    }
}

fn is_skipped_pseudo(name: &str) -> bool {
    name == ":dir" || name.starts_with(":nth-")
}

/// Drops one leading and one trailing quote character.
fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix(['"', '\'']).unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}
