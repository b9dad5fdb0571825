use std::fmt;
use std::ops::{Index, IndexMut};

pub mod selector_tree {
    use super::*;

    /// Stable index of a node inside one [`SelectorTree`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct NodeId(usize);

    /// Namespace prefix of a tag or attribute selector.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Namespace {
        /// `ns|name`, including `*|name` (stored as `"*"`) and `|name` (stored as `""`).
        Named(String),
        /// Marker set on tags that followed a bare `|` combinator. Prints as `|`.
        Wildcard,
    }

    impl Namespace {
        /// Whether the namespace counts as present. An empty named prefix does not.
        pub fn is_set(&self) -> bool {
            match self {
                Namespace::Named(name) => !name.is_empty(),
                Namespace::Wildcard => true,
            }
        }

        /// Text contributed to the per-run attribute hash.
        pub fn hash_fragment(&self) -> &str {
            match self {
                Namespace::Named(name) => name,
                Namespace::Wildcard => "true",
            }
        }
    }

    /// Matching part of an attribute selector, e.g. `="bar" i`.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct AttributeMatch {
        /// One of `=`, `~=`, `|=`, `^=`, `$=`, `*=`.
        pub operator: Option<String>,
        /// Raw value, quotes included.
        pub value: Option<String>,
        /// Case flag (`i` / `s`).
        pub flag: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum NodeKind {
        Root,
        Selector,
        Tag,
        Class,
        Id,
        /// Attribute name lives in the node value.
        Attribute(AttributeMatch),
        /// `arguments` is true when the pseudo was written with parentheses.
        Pseudo { arguments: bool },
        Combinator,
        Universal,
        Nesting,
        /// Quoted string inside pseudo arguments, kept verbatim.
        Str,
    }

    #[derive(Debug, Clone)]
    pub struct Node {
        pub kind: NodeKind,
        pub value: String,
        pub namespace: Option<Namespace>,
        pub parent: Option<NodeId>,
        pub prev: Option<NodeId>,
        pub next: Option<NodeId>,
        pub first_child: Option<NodeId>,
        pub last_child: Option<NodeId>,
    }

    impl Node {
        pub fn is_tag(&self) -> bool {
            matches!(self.kind, NodeKind::Tag)
        }

        pub fn is_attribute(&self) -> bool {
            matches!(self.kind, NodeKind::Attribute(_))
        }

        pub fn is_pseudo(&self) -> bool {
            matches!(self.kind, NodeKind::Pseudo { .. })
        }

        pub fn is_combinator(&self) -> bool {
            matches!(self.kind, NodeKind::Combinator)
        }
    }

    /// Arena-backed selector list. Every node is owned by the tree and
    /// addressed by [`NodeId`]; links are kept consistent by the mutation methods.
    #[derive(Debug, Clone)]
    pub struct SelectorTree {
        nodes: Vec<Node>,
        root: NodeId,
    }

    impl Default for SelectorTree {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SelectorTree {
        pub fn new() -> Self {
            let mut tree = SelectorTree {
                nodes: Vec::new(),
                root: NodeId(0),
            };
            tree.root = tree.create(NodeKind::Root, "");
            tree
        }

        pub fn root(&self) -> NodeId {
            self.root
        }

        /// Allocates a detached node.
        pub fn create(&mut self, kind: NodeKind, value: impl Into<String>) -> NodeId {
            let id = NodeId(self.nodes.len());
            self.nodes.push(Node {
                kind,
                value: value.into(),
                namespace: None,
                parent: None,
                prev: None,
                next: None,
                first_child: None,
                last_child: None,
            });
            id
        }

        pub fn parent(&self, id: NodeId) -> Option<NodeId> {
            self[id].parent
        }

        pub fn prev(&self, id: NodeId) -> Option<NodeId> {
            self[id].prev
        }

        pub fn next(&self, id: NodeId) -> Option<NodeId> {
            self[id].next
        }

        /// Children of `id` in order.
        pub fn children(&self, id: NodeId) -> Vec<NodeId> {
            let mut out = Vec::new();
            let mut current = self[id].first_child;
            while let Some(child) = current {
                out.push(child);
                current = self[child].next;
            }
            out
        }

        /// True if `id` is still reachable from the root.
        pub fn is_attached(&self, id: NodeId) -> bool {
            let mut current = id;
            loop {
                if current == self.root {
                    return true;
                }
                match self[current].parent {
                    Some(parent) => current = parent,
                    None => return false,
                }
            }
        }

        pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
            self.detach(child);
            let last = self[parent].last_child;
            self[child].parent = Some(parent);
            self[child].prev = last;
            match last {
                Some(last) => self[last].next = Some(child),
                None => self[parent].first_child = Some(child),
            }
            self[parent].last_child = Some(child);
        }

        /// Inserts `child` directly before `reference` under the same parent.
        pub fn insert_before(&mut self, reference: NodeId, child: NodeId) {
            self.detach(child);
            let parent = self[reference].parent;
            let prev = self[reference].prev;
            self[child].parent = parent;
            self[child].prev = prev;
            self[child].next = Some(reference);
            self[reference].prev = Some(child);
            match prev {
                Some(prev) => self[prev].next = Some(child),
                None => {
                    if let Some(parent) = parent {
                        self[parent].first_child = Some(child);
                    }
                }
            }
        }

        /// Unlinks `id` from its parent and siblings. Its own subtree stays intact.
        pub fn detach(&mut self, id: NodeId) {
            let (parent, prev, next) = {
                let node = &self[id];
                (node.parent, node.prev, node.next)
            };
            match prev {
                Some(prev) => self[prev].next = next,
                None => {
                    if let Some(parent) = parent {
                        self[parent].first_child = next;
                    }
                }
            }
            match next {
                Some(next) => self[next].prev = prev,
                None => {
                    if let Some(parent) = parent {
                        self[parent].last_child = prev;
                    }
                }
            }
            let node = &mut self[id];
            node.parent = None;
            node.prev = None;
            node.next = None;
        }

        /// Puts `replacement` where `old` was and detaches `old`.
        pub fn replace_with(&mut self, old: NodeId, replacement: NodeId) {
            if old == replacement {
                return;
            }
            self.insert_before(old, replacement);
            self.detach(old);
        }

        /// Moves the children of `container` into the position of `old`, then
        /// detaches `old`. Returns the moved nodes in order.
        pub fn replace_with_children(&mut self, old: NodeId, container: NodeId) -> Vec<NodeId> {
            let moved = self.children(container);
            for &child in &moved {
                self.insert_before(old, child);
            }
            self.detach(old);
            moved
        }

        /// Pre-order walk of the subtree under `id`, `id` excluded.
        pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
            let mut out = Vec::new();
            let mut stack: Vec<NodeId> = self.children(id).into_iter().rev().collect();
            while let Some(current) = stack.pop() {
                out.push(current);
                stack.extend(self.children(current).into_iter().rev());
            }
            out
        }

        /// All attached nodes matching `predicate`, in document order.
        pub fn collect(&self, predicate: impl Fn(&Node) -> bool) -> Vec<NodeId> {
            self.descendants(self.root)
                .into_iter()
                .filter(|&id| predicate(&self[id]))
                .collect()
        }

        fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
            let node = &self[id];
            match &node.kind {
                NodeKind::Root => self.write_list(f, id),
                NodeKind::Selector => {
                    for child in self.children(id) {
                        self.write_node(f, child)?;
                    }
                    Ok(())
                }
                NodeKind::Tag => {
                    write_namespace(f, node.namespace.as_ref())?;
                    f.write_str(&node.value)
                }
                NodeKind::Universal => {
                    write_namespace(f, node.namespace.as_ref())?;
                    f.write_str("*")
                }
                NodeKind::Class => write!(f, ".{}", node.value),
                NodeKind::Id => write!(f, "#{}", node.value),
                NodeKind::Attribute(matcher) => {
                    f.write_str("[")?;
                    write_namespace(f, node.namespace.as_ref())?;
                    f.write_str(&node.value)?;
                    if let (Some(operator), Some(value)) = (&matcher.operator, &matcher.value) {
                        write!(f, "{operator}{value}")?;
                    }
                    if let Some(flag) = &matcher.flag {
                        write!(f, " {flag}")?;
                    }
                    f.write_str("]")
                }
                NodeKind::Pseudo { arguments } => {
                    f.write_str(&node.value)?;
                    if *arguments {
                        f.write_str("(")?;
                        self.write_list(f, id)?;
                        f.write_str(")")?;
                    }
                    Ok(())
                }
                NodeKind::Combinator => f.write_str(&node.value),
                NodeKind::Nesting => f.write_str("&"),
                NodeKind::Str => f.write_str(&node.value),
            }
        }

        fn write_list(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
            for (i, child) in self.children(id).into_iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                self.write_node(f, child)?;
            }
            Ok(())
        }
    }

    fn write_namespace(f: &mut fmt::Formatter<'_>, namespace: Option<&Namespace>) -> fmt::Result {
        match namespace {
            None => Ok(()),
            Some(Namespace::Named(name)) => write!(f, "{name}|"),
            // The `|` it came from; `*|` would widen the match to every namespace.
            Some(Namespace::Wildcard) => f.write_str("|"),
        }
    }

    impl Index<NodeId> for SelectorTree {
        type Output = Node;

        fn index(&self, id: NodeId) -> &Node {
            &self.nodes[id.0]
        }
    }

    impl IndexMut<NodeId> for SelectorTree {
        fn index_mut(&mut self, id: NodeId) -> &mut Node {
            &mut self.nodes[id.0]
        }
    }

    impl fmt::Display for SelectorTree {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.write_node(f, self.root)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::selector_tree::*;

    fn simple_tree() -> (SelectorTree, NodeId, NodeId, NodeId) {
        let mut tree = SelectorTree::new();
        let selector = tree.create(NodeKind::Selector, "");
        let root = tree.root();
        tree.append_child(root, selector);
        let tag = tree.create(NodeKind::Tag, "div");
        let class = tree.create(NodeKind::Class, "red");
        tree.append_child(selector, tag);
        tree.append_child(selector, class);
        (tree, selector, tag, class)
    }

    #[test]
    fn test_links_after_append() {
        let (tree, selector, tag, class) = simple_tree();
        assert_eq!(tree.children(selector), vec![tag, class]);
        assert_eq!(tree.prev(class), Some(tag));
        assert_eq!(tree.next(tag), Some(class));
        assert_eq!(tree.parent(tag), Some(selector));
        assert_eq!(tree.to_string(), "div.red");
    }

    #[test]
    fn test_replace_with_keeps_position() {
        let (mut tree, selector, tag, class) = simple_tree();
        let replacement = tree.create(NodeKind::Class, "__div");
        tree.replace_with(tag, replacement);
        assert_eq!(tree.children(selector), vec![replacement, class]);
        assert_eq!(tree.prev(class), Some(replacement));
        assert!(!tree.is_attached(tag));
        assert_eq!(tree.to_string(), ".__div.red");
    }

    #[test]
    fn test_replace_with_children_lifts_content() {
        let mut tree = SelectorTree::new();
        let root = tree.root();
        let outer = tree.create(NodeKind::Selector, "");
        tree.append_child(root, outer);
        let pseudo = tree.create(NodeKind::Pseudo { arguments: true }, ":global");
        tree.append_child(outer, pseudo);
        let inner = tree.create(NodeKind::Selector, "");
        tree.append_child(pseudo, inner);
        let a = tree.create(NodeKind::Class, "a");
        let b = tree.create(NodeKind::Class, "b");
        tree.append_child(inner, a);
        tree.append_child(inner, b);
        assert_eq!(tree.to_string(), ":global(.a.b)");

        let moved = tree.replace_with_children(pseudo, inner);
        assert_eq!(moved, vec![a, b]);
        assert_eq!(tree.children(outer), vec![a, b]);
        assert_eq!(tree.parent(a), Some(outer));
        assert_eq!(tree.to_string(), ".a.b");
    }

    #[test]
    fn test_wildcard_prints_as_bare_bar() {
        let (mut tree, _, tag, _) = simple_tree();
        tree[tag].namespace = Some(Namespace::Wildcard);
        assert_eq!(tree.to_string(), "|div.red");
    }
}
