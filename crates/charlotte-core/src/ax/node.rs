//! Arena-based representation of the accessibility tree.
//!
//! The AX tree is a DAG with upward parent links. Rather than storing strong reference cycles,
//! nodes live in a flat `Vec` (the arena) addressed by integer [`NodeId`]; parent/child edges are
//! ids, not pointers, per the "cyclic parent/child links" design note.

use std::collections::HashMap;

/// Index into an [`Arena`].
pub type NodeId = usize;

/// A checked-state value for checkbox/radio/switch roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckedState {
    /// Checked.
    True,
    /// Unchecked.
    False,
    /// Indeterminate (tri-state checkboxes).
    Mixed,
}

/// A single accessibility-tree node, addressed by [`NodeId`] within its owning [`Arena`].
#[derive(Debug, Clone)]
pub struct AxNode {
    /// This node's id within the arena.
    pub id: NodeId,
    /// The CDP backend reference for the live element, if the underlying library supplied one.
    /// Never exposed outside the engine — see `identity` for why.
    pub backend_ref: Option<String>,
    /// ARIA role, or `"none"` / `"generic"` for un-roled nodes.
    pub role: String,
    /// Accessible name (computed name), if any.
    pub name: Option<String>,
    /// Accessible description, if any.
    pub description: Option<String>,
    /// Current value (e.g., for sliders, text inputs), if any.
    pub value: Option<String>,
    /// Heading/aria-level, for `role == "heading"`.
    pub level: Option<u8>,
    /// `disabled` state.
    pub disabled: bool,
    /// `expanded` state.
    pub expanded: Option<bool>,
    /// `selected` state.
    pub selected: Option<bool>,
    /// `pressed` state (toggle buttons).
    pub pressed: Option<bool>,
    /// `checked` state (checkbox/radio/switch).
    pub checked: Option<CheckedState>,
    /// `required` state.
    pub required: bool,
    /// `invalid` state.
    pub invalid: bool,
    /// Whether this node represents an iframe boundary.
    pub is_frame: bool,
    /// Parent node id, or `None` for a root.
    pub parent: Option<NodeId>,
    /// Child node ids, in document order.
    pub children: Vec<NodeId>,
}

impl AxNode {
    fn leaf(id: NodeId, role: impl Into<String>) -> Self {
        Self {
            id,
            backend_ref: None,
            role: role.into(),
            name: None,
            description: None,
            value: None,
            level: None,
            disabled: false,
            expanded: None,
            selected: None,
            pressed: None,
            checked: None,
            required: false,
            invalid: false,
            is_frame: false,
            parent: None,
            children: Vec::new(),
        }
    }

    /// `true` if this node is a structural wrapper that carries no accessible identity of its
    /// own and should be skipped over when reparenting (roles `"none"`/`"generic"` with no name).
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        (self.role == "none" || self.role == "generic") && self.name.is_none()
    }
}

/// The accessibility-tree arena for a single render.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<AxNode>,
    /// Roots after ignored-node reparenting — may be more than one if ignored nodes existed at
    /// the top of the tree.
    pub roots: Vec<NodeId>,
}

impl Arena {
    /// Allocate a new node and return its id.
    pub fn alloc(&mut self, role: impl Into<String>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(AxNode::leaf(id, role));
        id
    }

    /// Borrow a node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&AxNode> {
        self.nodes.get(id)
    }

    /// Mutably borrow a node.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut AxNode> {
        self.nodes.get_mut(id)
    }

    /// Number of nodes in the arena (including any later filtered as ignored).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach `child` under `parent`, recording both edges.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
    }

    /// Depth-first pre-order iterator over ids starting at `roots`.
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.get(id) {
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Map from backend ref to node id, for the subset of nodes that carry one.
    #[must_use]
    pub fn backend_ref_index(&self) -> HashMap<String, NodeId> {
        self.nodes
            .iter()
            .filter_map(|n| n.backend_ref.as_ref().map(|r| (r.clone(), n.id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preorder_visits_depth_first() {
        let mut arena = Arena::default();
        let root = arena.alloc("document");
        let a = arena.alloc("main");
        let b = arena.alloc("heading");
        arena.attach(root, a);
        arena.attach(root, b);
        let c = arena.alloc("button");
        arena.attach(a, c);
        arena.roots.push(root);

        assert_eq!(arena.preorder(), vec![root, a, c, b]);
    }

    #[test]
    fn ignored_detects_unnamed_generic() {
        let mut arena = Arena::default();
        let g = arena.alloc("generic");
        assert!(arena.get(g).unwrap().is_ignored());
        arena.get_mut(g).unwrap().name = Some("x".into());
        assert!(!arena.get(g).unwrap().is_ignored());
    }
}
