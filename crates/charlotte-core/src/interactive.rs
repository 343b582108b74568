//! Interactive Extractor (§4.6): role → element-type mapping, state extraction, form grouping.

use std::collections::HashMap;

use serde::Serialize;

use crate::ax::{Arena, NodeId};
use crate::identity::IdGenerator;
use crate::layout::Bounds;

/// Closed set of landmark roles (§3 `Landmark`).
const LANDMARK_ROLES: &[&str] = &[
    "banner",
    "navigation",
    "main",
    "complementary",
    "contentinfo",
    "form",
    "region",
    "search",
];

/// `true` if `role` is one of the closed landmark roles.
#[must_use]
pub fn is_landmark_role(role: &str) -> bool {
    LANDMARK_ROLES.contains(&role)
}

/// The element `type` enumerated in §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// A clickable button.
    Button,
    /// A hyperlink.
    Link,
    /// A single-line text input.
    TextInput,
    /// A multi-line text input.
    Textarea,
    /// A dropdown/select.
    Select,
    /// A checkbox.
    Checkbox,
    /// A radio button.
    Radio,
    /// A switch/toggle.
    Toggle,
    /// A range/slider input.
    Range,
}

/// Map an AX role to the element `type`, or `None` if the role is not in the closed
/// interactive set.
#[must_use]
pub fn classify_role(role: &str) -> Option<ElementType> {
    match role {
        "button" => Some(ElementType::Button),
        "link" => Some(ElementType::Link),
        "textbox" | "searchbox" => Some(ElementType::TextInput),
        "textarea" => Some(ElementType::Textarea),
        "combobox" | "listbox" | "select" => Some(ElementType::Select),
        "checkbox" => Some(ElementType::Checkbox),
        "radio" => Some(ElementType::Radio),
        "switch" => Some(ElementType::Toggle),
        "slider" | "spinbutton" => Some(ElementType::Range),
        _ => None,
    }
}

impl ElementType {
    /// The element-id prefix for this type (§3).
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Button => "btn",
            Self::Link => "lnk",
            Self::TextInput => "inp",
            Self::Textarea => "inp",
            Self::Select => "sel",
            Self::Checkbox => "chk",
            Self::Radio => "rad",
            Self::Toggle => "tog",
            Self::Range => "rng",
        }
    }
}

/// Non-default boolean state flags carried on an [`InteractiveElement`] (§3 `state`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ElementState {
    /// Omitted (absent) unless `false`: the element is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Omitted unless `false`: the element is not visible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Present and `true` only when focused.
    pub focused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Present when a checkbox/radio/switch deviates from unchecked.
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Present and `true` only when expanded.
    pub expanded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Present and `true` only when selected.
    pub selected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Present and `true` only when required.
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Present and `true` only when invalid.
    pub invalid: Option<bool>,
}

impl ElementState {
    /// `true` if every field is its default (absent), i.e. nothing non-default to report.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.enabled.is_none()
            && self.visible.is_none()
            && self.focused.is_none()
            && self.checked.is_none()
            && self.expanded.is_none()
            && self.selected.is_none()
            && self.required.is_none()
            && self.invalid.is_none()
    }
}

/// A single interactive element (§3 `InteractiveElement`).
#[derive(Debug, Clone, Serialize)]
pub struct InteractiveElement {
    /// Stable engine-assigned element id.
    pub id: String,
    /// Element type.
    #[serde(rename = "type")]
    pub element_type: ElementType,
    /// Accessible label/name.
    pub label: String,
    /// Absolute page bounds, or `None` if not visible.
    pub bounds: Option<Bounds>,
    /// Non-default state flags.
    pub state: ElementState,
    /// Link target, for `type == link`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Current value, for text/range inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Placeholder text, for text inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Option labels, for `type == select`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    /// The AX node this element was built from — used internally for form-field matching and
    /// action dispatch; never serialized.
    #[serde(skip)]
    pub(crate) node_id: NodeId,
}

/// A grouped `<form>` (§3 `FormRepresentation`).
#[derive(Debug, Clone, Serialize)]
pub struct FormRepresentation {
    /// Stable engine-assigned id for the form itself.
    pub id: String,
    /// Ids of interactive descendants.
    pub fields: Vec<String>,
    /// Id of the submit-button descendant, if any.
    pub submit: Option<String>,
}

/// Extract interactive elements and forms from `arena`, assigning/reconciling ids via
/// `id_gen` and attaching bounds from `bounds_map` keyed by backend ref.
pub fn extract(
    arena: &Arena,
    bounds_map: &HashMap<String, Bounds>,
    id_gen: &mut IdGenerator,
) -> (Vec<InteractiveElement>, Vec<FormRepresentation>) {
    let mut elements = Vec::new();
    let mut form_nodes: Vec<NodeId> = Vec::new();
    let mut node_to_element_id: HashMap<NodeId, String> = HashMap::new();

    for node_id in arena.preorder() {
        let Some(node) = arena.get(node_id) else { continue };

        if node.role == "form" {
            form_nodes.push(node_id);
            continue;
        }

        let Some(element_type) = classify_role(&node.role) else { continue };

        let name = node.name.clone().unwrap_or_default();
        let signature = crate::domsig::compute(arena, node_id);
        let id = id_gen.generate_id_bound(
            element_type.id_prefix(),
            &node.role,
            &name,
            &signature,
            node.backend_ref.as_deref(),
            node_id,
        );

        let bounds = node
            .backend_ref
            .as_ref()
            .and_then(|r| bounds_map.get(r))
            .filter(|b| !b.is_zero())
            .copied();

        let mut state = ElementState::default();
        if node.disabled {
            state.enabled = Some(false);
        }
        if bounds.is_none() {
            state.visible = Some(false);
        }
        if let Some(true) = node.expanded {
            state.expanded = Some(true);
        }
        if let Some(true) = node.selected {
            state.selected = Some(true);
        }
        if node.required {
            state.required = Some(true);
        }
        if node.invalid {
            state.invalid = Some(true);
        }
        if let Some(checked) = node.checked {
            state.checked = Some(!matches!(checked, crate::ax::CheckedState::False));
        }

        let options = if matches!(element_type, ElementType::Select) {
            Some(collect_option_labels(arena, node_id))
        } else {
            None
        };

        let href = if matches!(element_type, ElementType::Link) {
            node.value.clone()
        } else {
            None
        };

        let value = if matches!(
            element_type,
            ElementType::TextInput | ElementType::Textarea | ElementType::Range
        ) {
            node.value.clone()
        } else {
            None
        };

        node_to_element_id.insert(node_id, id.clone());

        elements.push(InteractiveElement {
            id,
            element_type,
            label: name,
            bounds,
            state,
            href,
            value,
            placeholder: None,
            options,
            node_id,
        });
    }

    let forms = form_nodes
        .into_iter()
        .map(|form_node_id| build_form(arena, form_node_id, &node_to_element_id, &elements, id_gen))
        .collect();

    (elements, forms)
}

fn collect_option_labels(arena: &Arena, node_id: NodeId) -> Vec<String> {
    let mut labels = Vec::new();
    collect_option_labels_rec(arena, node_id, &mut labels);
    labels
}

fn collect_option_labels_rec(arena: &Arena, node_id: NodeId, out: &mut Vec<String>) {
    let Some(node) = arena.get(node_id) else { return };
    for &child_id in &node.children {
        let Some(child) = arena.get(child_id) else { continue };
        if child.role == "option" || child.role == "listitem" {
            out.push(child.name.clone().unwrap_or_default());
        }
        collect_option_labels_rec(arena, child_id, out);
    }
}

fn build_form(
    arena: &Arena,
    form_node_id: NodeId,
    node_to_element_id: &HashMap<NodeId, String>,
    elements: &[InteractiveElement],
    id_gen: &mut IdGenerator,
) -> FormRepresentation {
    let mut descendants = Vec::new();
    collect_descendant_node_ids(arena, form_node_id, &mut descendants);

    let fields: Vec<String> = descendants
        .iter()
        .filter_map(|n| node_to_element_id.get(n).cloned())
        .collect();

    // §4.6 calls for detecting a submit control either by its accessible name containing
    // "submit" or by its underlying `type == "submit"`. `AriaSnapshot` (the AX source this
    // extractor builds from) carries no raw HTML attribute passthrough, so `type` is not
    // observable here — see DESIGN.md. As a grounded approximation of the second half of that
    // OR-condition, a form with exactly one button descendant and no name-matched submit button
    // treats that sole button as the submit control, since a lone button in a form is the submit
    // control in the overwhelming majority of real forms.
    let buttons: Vec<&InteractiveElement> = descendants
        .iter()
        .filter_map(|n| elements.iter().find(|e| e.node_id == *n))
        .filter(|e| matches!(e.element_type, ElementType::Button))
        .collect();
    let submit = buttons
        .iter()
        .find(|e| e.label.to_lowercase().contains("submit"))
        .or_else(|| if buttons.len() == 1 { buttons.first() } else { None })
        .map(|e| e.id.clone());

    let signature = crate::domsig::compute(arena, form_node_id);
    let name = arena.get(form_node_id).and_then(|n| n.name.clone()).unwrap_or_default();
    let backend_ref = arena.get(form_node_id).and_then(|n| n.backend_ref.as_deref());
    let id = id_gen.generate_id_bound("frm", "form", &name, &signature, backend_ref, form_node_id);

    FormRepresentation { id, fields, submit }
}

fn collect_descendant_node_ids(arena: &Arena, node_id: NodeId, out: &mut Vec<NodeId>) {
    let Some(node) = arena.get(node_id) else { return };
    for &child_id in &node.children {
        out.push(child_id);
        collect_descendant_node_ids(arena, child_id, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_classification_matches_table() {
        assert_eq!(classify_role("textbox"), Some(ElementType::TextInput));
        assert_eq!(classify_role("combobox"), Some(ElementType::Select));
        assert_eq!(classify_role("switch"), Some(ElementType::Toggle));
        assert_eq!(classify_role("slider"), Some(ElementType::Range));
        assert_eq!(classify_role("paragraph"), None);
    }

    #[test]
    fn landmark_roles_closed_set() {
        assert!(is_landmark_role("main"));
        assert!(is_landmark_role("search"));
        assert!(!is_landmark_role("button"));
    }

    #[test]
    fn state_default_detection() {
        let mut state = ElementState::default();
        assert!(state.is_default());
        state.required = Some(true);
        assert!(!state.is_default());
    }
}
