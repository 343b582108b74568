//! DOM-Path Signature (§4.4): a stable ancestor fingerprint used as part of the element-id hash
//! input, so identity survives re-renders without depending on any transient backend id.

use crate::ax::{Arena, NodeId};
use crate::interactive::is_landmark_role;

/// A stable ancestor-based signature for one AX node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Role of the nearest landmark ancestor, if any.
    pub nearest_landmark_role: Option<String>,
    /// Accessible name of the nearest landmark ancestor, if any.
    pub nearest_landmark_label: Option<String>,
    /// Accessible name of the nearest ancestor carrying a non-empty name.
    pub nearest_labelled_container: Option<String>,
    /// Index of this node among its parent's children that share its role.
    pub sibling_index: usize,
}

/// Compute the [`Signature`] for `node_id`, walking ancestors until the nearest landmark.
#[must_use]
pub fn compute(arena: &Arena, node_id: NodeId) -> Signature {
    let mut nearest_landmark_role = None;
    let mut nearest_landmark_label = None;
    let mut nearest_labelled_container = None;

    let mut cursor = arena.get(node_id).and_then(|n| n.parent);
    while let Some(ancestor_id) = cursor {
        let Some(ancestor) = arena.get(ancestor_id) else { break };

        if nearest_labelled_container.is_none() {
            if let Some(name) = &ancestor.name {
                if !name.is_empty() {
                    nearest_labelled_container = Some(name.clone());
                }
            }
        }

        if is_landmark_role(&ancestor.role) {
            nearest_landmark_role = Some(ancestor.role.clone());
            nearest_landmark_label = ancestor.name.clone();
            break;
        }

        cursor = ancestor.parent;
    }

    let sibling_index = sibling_index_same_role(arena, node_id);

    Signature {
        nearest_landmark_role,
        nearest_landmark_label,
        nearest_labelled_container,
        sibling_index,
    }
}

/// Index of `node_id` among its parent's children that share its role; `0` if the parent cannot
/// be found (e.g. a root node).
fn sibling_index_same_role(arena: &Arena, node_id: NodeId) -> usize {
    let Some(node) = arena.get(node_id) else { return 0 };
    let Some(parent_id) = node.parent else { return 0 };
    let Some(parent) = arena.get(parent_id) else { return 0 };

    parent
        .children
        .iter()
        .filter(|&&sibling_id| arena.get(sibling_id).is_some_and(|s| s.role == node.role))
        .position(|&sibling_id| sibling_id == node_id)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nearest_landmark_and_stops() {
        let mut arena = Arena::default();
        let main = arena.alloc("main");
        let nested_region = arena.alloc("region");
        let button = arena.alloc("button");
        arena.attach(main, nested_region);
        arena.attach(nested_region, button);
        arena.roots.push(main);
        arena.get_mut(nested_region).unwrap().name = Some("Sidebar".into());

        let sig = compute(&arena, button);
        // Nearest landmark ancestor of `button` is the `region`, not the outer `main`.
        assert_eq!(sig.nearest_landmark_role.as_deref(), Some("region"));
        assert_eq!(sig.nearest_landmark_label.as_deref(), Some("Sidebar"));
    }

    #[test]
    fn sibling_index_counts_same_role_only() {
        let mut arena = Arena::default();
        let parent = arena.alloc("main");
        let b1 = arena.alloc("button");
        let l1 = arena.alloc("link");
        let b2 = arena.alloc("button");
        arena.attach(parent, b1);
        arena.attach(parent, l1);
        arena.attach(parent, b2);
        arena.roots.push(parent);

        assert_eq!(sibling_index_same_role(&arena, b1), 0);
        assert_eq!(sibling_index_same_role(&arena, l1), 0);
        assert_eq!(sibling_index_same_role(&arena, b2), 1);
    }
}
