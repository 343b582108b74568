//! `observe` and `find` tools (§6).
//!
//! `observe` is a thin wrapper over [`Engine::observe_render`]. `find` filters the interactive
//! list of the representation `observe` would produce, by the parameters and matching rules
//! fixed in §6/§9(a): substring match over label/value/placeholder, exact type, a fuzzy role
//! alias table (deliberately imprecise per §9 Open Question (a)), Euclidean center-to-center
//! proximity, or geometric containment.

use crate::error::Result;
use crate::interactive::{ElementType, InteractiveElement};
use crate::layout::Bounds;
use crate::render::{PageRepresentation, RenderOptions};
use crate::Engine;

/// Maximum center-to-center distance, in CSS pixels, for `find(near: ...)` (§6).
const NEAR_RADIUS_PX: f64 = 200.0;

/// Parameters for the `find` tool (§6). All fields are independent filters; every `Some` one
/// supplied must match for an element to be included.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    /// Case-insensitive substring match over label/value/placeholder.
    pub text: Option<String>,
    /// Role alias, matched via the fixed alias table below.
    pub role: Option<String>,
    /// Exact element type.
    pub element_type: Option<ElementType>,
    /// Return only elements within `near_radius_px` of this point, nearest first.
    pub near: Option<(f64, f64)>,
    /// Return only elements whose bounds fall entirely inside this rectangle.
    pub within: Option<Bounds>,
}

impl Engine {
    /// Render the active tab without taking any action (§6 `observe`). `detail` in `options`
    /// defaults to `summary` per [`crate::render::DetailLevelOrDefault`].
    ///
    /// # Errors
    ///
    /// Returns an error if no tab is active or the renderer pipeline fails.
    pub async fn observe(&mut self, options: RenderOptions) -> Result<PageRepresentation> {
        self.observe_render(options).await
    }

    /// Render the active tab, then filter its interactive elements by `query` (§6 `find`).
    ///
    /// Unlike the mutating tools, `find` does not push a snapshot beyond what the underlying
    /// `observe`-style render already does; it is a read of the current interactive list, not a
    /// distinct pipeline stage.
    ///
    /// # Errors
    ///
    /// Returns an error if no tab is active or the renderer pipeline fails.
    pub async fn find(&mut self, options: RenderOptions, query: &FindQuery) -> Result<Vec<InteractiveElement>> {
        let representation = self.observe_render(options).await?;
        let elements = representation.interactive.unwrap_or_default();
        Ok(filter_elements(elements, query))
    }
}

/// Apply every `Some` field of `query` to `elements`, in the fixed order text → type → role →
/// within → near (near sorts by distance last, since it is also a ranking, not just a filter).
fn filter_elements(elements: Vec<InteractiveElement>, query: &FindQuery) -> Vec<InteractiveElement> {
    let mut matches: Vec<InteractiveElement> = elements
        .into_iter()
        .filter(|e| query.text.as_deref().is_none_or(|t| text_matches(e, t)))
        .filter(|e| query.element_type.is_none_or(|t| e.element_type == t))
        .filter(|e| query.role.as_deref().is_none_or(|r| role_matches(e.element_type, r)))
        .filter(|e| query.within.as_ref().is_none_or(|rect| within_matches(e, rect)))
        .collect();

    if let Some((cx, cy)) = query.near {
        matches.retain(|e| center_distance(e, cx, cy).is_some_and(|d| d <= NEAR_RADIUS_PX));
        matches.sort_by(|a, b| {
            let da = center_distance(a, cx, cy).unwrap_or(f64::MAX);
            let db = center_distance(b, cx, cy).unwrap_or(f64::MAX);
            da.total_cmp(&db)
        });
    }

    matches
}

fn text_matches(element: &InteractiveElement, text: &str) -> bool {
    let needle = text.to_lowercase();
    element.label.to_lowercase().contains(&needle)
        || element.value.as_deref().is_some_and(|v| v.to_lowercase().contains(&needle))
        || element.placeholder.as_deref().is_some_and(|p| p.to_lowercase().contains(&needle))
}

/// Deliberately imprecise role-alias matching (§9 Open Question (a)): maps common ARIA/HTML role
/// vocabulary onto the engine's closed [`ElementType`] set. A bit-for-bit compatible
/// reimplementation would need to fix this table exactly.
fn role_matches(element_type: ElementType, role: &str) -> bool {
    let role = role.to_lowercase();
    let aliases: &[&str] = match element_type {
        ElementType::Button => &["button", "btn"],
        ElementType::Link => &["link", "anchor", "a"],
        ElementType::TextInput => &["textbox", "text", "input", "searchbox", "search"],
        ElementType::Textarea => &["textarea", "textbox", "text"],
        ElementType::Select => &["select", "combobox", "listbox", "dropdown"],
        ElementType::Checkbox => &["checkbox", "check"],
        ElementType::Radio => &["radio"],
        ElementType::Toggle => &["switch", "toggle"],
        ElementType::Range => &["slider", "range", "spinbutton"],
    };
    aliases.contains(&role.as_str())
}

fn within_matches(element: &InteractiveElement, rect: &Bounds) -> bool {
    let Some(b) = &element.bounds else { return false };
    b.x >= rect.x && b.y >= rect.y && b.x + b.w <= rect.x + rect.w && b.y + b.h <= rect.y + rect.h
}

fn center_distance(element: &InteractiveElement, cx: f64, cy: f64) -> Option<f64> {
    let b = element.bounds.as_ref()?;
    let ex = b.x + b.w / 2.0;
    let ey = b.y + b.h / 2.0;
    Some(((ex - cx).powi(2) + (ey - cy).powi(2)).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ax::NodeId;
    use crate::interactive::ElementState;

    fn element(id: &str, element_type: ElementType, label: &str, bounds: Option<Bounds>) -> InteractiveElement {
        InteractiveElement {
            id: id.to_string(),
            element_type,
            label: label.to_string(),
            bounds,
            state: ElementState::default(),
            href: None,
            value: None,
            placeholder: None,
            options: None,
            node_id: NodeId::default(),
        }
    }

    #[test]
    fn text_filter_is_case_insensitive_substring() {
        let els = vec![element("btn-1", ElementType::Button, "Save changes", None)];
        let found = filter_elements(els, &FindQuery { text: Some("SAVE".to_string()), ..Default::default() });
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn role_alias_table_matches_button() {
        assert!(role_matches(ElementType::Button, "btn"));
        assert!(!role_matches(ElementType::Button, "link"));
    }

    #[test]
    fn near_filters_and_sorts_by_distance() {
        let far = element("btn-far", ElementType::Button, "far", Some(Bounds { x: 1000.0, y: 1000.0, w: 10.0, h: 10.0 }));
        let near = element("btn-near", ElementType::Button, "near", Some(Bounds { x: 10.0, y: 10.0, w: 10.0, h: 10.0 }));
        let found = filter_elements(vec![far, near], &FindQuery { near: Some((15.0, 15.0)), ..Default::default() });
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "btn-near");
    }

    #[test]
    fn within_requires_full_containment() {
        let inside = element("btn-in", ElementType::Button, "in", Some(Bounds { x: 10.0, y: 10.0, w: 5.0, h: 5.0 }));
        let outside = element("btn-out", ElementType::Button, "out", Some(Bounds { x: 190.0, y: 10.0, w: 20.0, h: 5.0 }));
        let rect = Bounds { x: 0.0, y: 0.0, w: 100.0, h: 100.0 };
        let found = filter_elements(vec![inside, outside], &FindQuery { within: Some(rect), ..Default::default() });
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "btn-in");
    }
}
