//! Layout Extractor: absolute-page bounds per node with a backend reference.

use std::collections::HashMap;

use serde::Serialize;
use viewpoint_core::Page;

use crate::ax::Arena;

/// Absolute-page bounding rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

/// The sentinel bounds used for zero-sized or off-page nodes; callers treat these as not
/// visible.
pub const ZERO_BOUNDS: Bounds = Bounds { x: 0.0, y: 0.0, w: 0.0, h: 0.0 };

impl Bounds {
    /// `true` if this is the zero-sized sentinel, i.e. the node should be treated as invisible.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

/// Collect bounds for every node in `arena` that carries a backend reference, by resolving each
/// through `page.locator_from_ref(..).bounding_box()`.
///
/// Nodes with no backend reference, or whose bounding box query fails/returns nothing, map to
/// [`ZERO_BOUNDS`] rather than aborting the whole pass.
pub async fn extract(page: &Page, arena: &Arena) -> HashMap<String, Bounds> {
    let mut bounds = HashMap::new();

    for id in arena.preorder() {
        let Some(node) = arena.get(id) else { continue };
        let Some(backend_ref) = &node.backend_ref else { continue };
        if bounds.contains_key(backend_ref) {
            continue;
        }

        let locator = page.locator_from_ref(backend_ref);
        let bbox = match locator.bounding_box().await {
            Ok(Some(b)) => Bounds { x: b.x, y: b.y, w: b.width, h: b.height },
            Ok(None) | Err(_) => ZERO_BOUNDS,
        };
        bounds.insert(backend_ref.clone(), bbox);
    }

    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bounds_detected() {
        assert!(ZERO_BOUNDS.is_zero());
        assert!(!Bounds { x: 0.0, y: 0.0, w: 10.0, h: 10.0 }.is_zero());
    }
}
