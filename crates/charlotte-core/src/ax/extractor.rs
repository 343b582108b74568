//! Accessibility Extractor: turns a live CDP session into an [`Arena`] forest.

use viewpoint_core::Page;
use viewpoint_core::page::locator::aria::{AriaCheckedState, AriaSnapshot};

use super::node::{Arena, CheckedState, NodeId};
use crate::error::{EngineError, Result};

/// Fetch the full AX tree for `page`, drop ignored nodes, and reparent the survivors.
///
/// Returns an empty arena (no roots) rather than an error on an empty/blank page, per §4.2:
/// "Failure: empty tree returned as empty list."
pub async fn extract(page: &Page) -> Result<Arena> {
    let snapshot = match page.aria_snapshot_with_frames().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            let msg = e.to_string();
            if msg.contains("invalid type: null") || msg.contains("expected struct AriaSnapshot") {
                return Ok(Arena::default());
            }
            return Err(EngineError::session_error(format!(
                "failed to capture accessibility tree: {msg}"
            )));
        }
    };

    let mut arena = Arena::default();
    let raw_root = build_raw(&mut arena, &snapshot);
    reparent_dropping_ignored(&mut arena, raw_root, None);
    Ok(arena)
}

/// First pass: materialize every AX node as-is (including ignored ones), building a temporary
/// tree mirroring the source structure.
fn build_raw(arena: &mut Arena, aria: &AriaSnapshot) -> NodeId {
    let role = aria.role.clone().unwrap_or_else(|| "none".to_string());
    let id = arena.alloc(role);

    {
        let node = arena.get_mut(id).expect("just allocated");
        node.name.clone_from(&aria.name);
        node.description.clone_from(&aria.description);
        node.disabled = aria.disabled.unwrap_or(false);
        node.expanded = aria.expanded;
        node.selected = aria.selected;
        node.pressed = aria.pressed;
        node.level = aria.level;
        node.value = aria.value_text.clone().or_else(|| aria.value_now.map(|v| format_value_now(v)));
        node.is_frame = aria.is_frame.unwrap_or(false);
        node.backend_ref.clone_from(&aria.node_ref);
        node.checked = aria.checked.as_ref().map(|c| match c {
            AriaCheckedState::True => CheckedState::True,
            AriaCheckedState::False => CheckedState::False,
            AriaCheckedState::Mixed => CheckedState::Mixed,
        });
    }

    for child in &aria.children {
        let child_id = build_raw(arena, child);
        arena.attach(id, child_id);
    }

    id
}

/// Render a range input's numeric `value_now` the way its accessible text value would read,
/// dropping a trailing `.0` for whole numbers (`"50"`, not `"50.0"`).
fn format_value_now(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Second pass: walk the raw tree, dropping `is_ignored()` nodes and reparenting their children
/// onto the nearest non-ignored ancestor, promoting to a root if there is none, per §4.2.
fn reparent_dropping_ignored(arena: &mut Arena, id: NodeId, effective_parent: Option<NodeId>) {
    let (is_ignored, children) = {
        let node = arena.get(id).expect("valid id");
        (node.is_ignored(), node.children.clone())
    };

    let this_effective_parent = if is_ignored {
        effective_parent
    } else {
        if let Some(parent) = effective_parent {
            arena.get_mut(id).expect("valid id").parent = Some(parent);
            arena.get_mut(parent).expect("valid id").children.push(id);
        } else {
            arena.get_mut(id).expect("valid id").parent = None;
            arena.roots.push(id);
        }
        Some(id)
    };

    // Clear the raw children list before re-populating it via reparenting, so an ignored node's
    // children land directly on the kept ancestor instead of duplicating under both.
    if !is_ignored {
        arena.get_mut(id).expect("valid id").children.clear();
    }

    for child in children {
        reparent_dropping_ignored(arena, child, this_effective_parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(role: &str, name: Option<&str>) -> AriaSnapshot {
        AriaSnapshot {
            role: Some(role.to_string()),
            name: name.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn drops_unnamed_generic_wrappers_and_reparents_children() {
        let mut wrapper = leaf("generic", None);
        wrapper.children.push(leaf("button", Some("Save")));

        let mut root = leaf("document", None);
        root.children.push(wrapper);

        let mut arena = Arena::default();
        let raw_root = build_raw(&mut arena, &root);
        reparent_dropping_ignored(&mut arena, raw_root, None);

        // document is itself an unnamed generic-equivalent ("none"/"document"); "document" role
        // is not in the ignored set so it survives as the sole root.
        assert_eq!(arena.roots.len(), 1);
        let doc = arena.get(arena.roots[0]).unwrap();
        assert_eq!(doc.role, "document");
        assert_eq!(doc.children.len(), 1);
        let button = arena.get(doc.children[0]).unwrap();
        assert_eq!(button.role, "button");
        assert_eq!(button.name.as_deref(), Some("Save"));
    }
}
