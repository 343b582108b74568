//! Differ (§4.10): structural diff of two [`PageRepresentation`]s.

use std::collections::HashMap;

use serde::Serialize;

use crate::render::{Landmark, PageRepresentation};

/// Which categories of change [`diff`] should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffScope {
    /// Every category.
    All,
    /// Landmarks and headings only.
    Structure,
    /// Interactive elements and forms only.
    Interactive,
    /// `url`/`title`/`content_summary` only.
    Content,
}

/// The kind of change one [`Change`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Present in `to` but not `from`.
    Added,
    /// Present in `from` but not `to`.
    Removed,
    /// Present in both, same id/key, but its bounds moved.
    Moved,
    /// Present in both, same id/key, a named property differs.
    Changed,
}

/// A single reported difference (§3 `SnapshotDiff`).
#[derive(Debug, Clone, Serialize)]
pub struct Change {
    /// The kind of change.
    pub kind: ChangeKind,
    /// The element/landmark/form/heading id or key this change is about, if applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    /// The property name, for `changed` entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// The prior value, serialized as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// The new value, serialized as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl Change {
    fn added(element: String) -> Self {
        Self { kind: ChangeKind::Added, element: Some(element), property: None, from: None, to: None }
    }

    fn removed(element: String) -> Self {
        Self { kind: ChangeKind::Removed, element: Some(element), property: None, from: None, to: None }
    }

    fn moved(element: String) -> Self {
        Self { kind: ChangeKind::Moved, element: Some(element), property: None, from: None, to: None }
    }

    fn changed(element: String, property: &str, from: String, to: String) -> Self {
        Self {
            kind: ChangeKind::Changed,
            element: Some(element),
            property: Some(property.to_string()),
            from: Some(from),
            to: Some(to),
        }
    }
}

/// The result of [`diff`] (§3 `SnapshotDiff`).
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDiff {
    /// Snapshot id the comparison started from.
    pub from_snapshot: u64,
    /// Snapshot id the comparison ended at.
    pub to_snapshot: u64,
    /// Every detected change.
    pub changes: Vec<Change>,
    /// A terse human-readable summary, e.g. `"3 changes: 1 added, 0 removed, 1 moved, 1 changed."`
    pub summary: String,
}

/// Compare two representations and report structural differences, gated by `scope`.
#[must_use]
pub fn diff(
    from_id: u64,
    to_id: u64,
    a: &PageRepresentation,
    b: &PageRepresentation,
    scope: DiffScope,
) -> SnapshotDiff {
    let mut changes = Vec::new();

    if matches!(scope, DiffScope::All | DiffScope::Structure) {
        diff_landmarks(&a.structure.landmarks, &b.structure.landmarks, &mut changes);
        diff_headings(a, b, &mut changes);
    }

    if matches!(scope, DiffScope::All | DiffScope::Interactive) {
        diff_interactive(a, b, &mut changes);
        diff_forms(a, b, &mut changes);
    }

    if matches!(scope, DiffScope::All | DiffScope::Content) {
        diff_content(a, b, &mut changes);
    }

    let summary = summarize(&changes);
    SnapshotDiff { from_snapshot: from_id, to_snapshot: to_id, changes, summary }
}

fn landmark_key(l: &Landmark) -> String {
    format!("{}:{}", l.role, l.label.as_deref().unwrap_or(""))
}

fn diff_landmarks(a: &[Landmark], b: &[Landmark], changes: &mut Vec<Change>) {
    let by_key_a: HashMap<String, &Landmark> = a.iter().map(|l| (landmark_key(l), l)).collect();
    let by_key_b: HashMap<String, &Landmark> = b.iter().map(|l| (landmark_key(l), l)).collect();

    for (key, landmark) in &by_key_a {
        if !by_key_b.contains_key(key) {
            changes.push(Change::removed(key.clone()));
        } else if let Some(other) = by_key_b.get(key) {
            if landmark.bounds != other.bounds {
                changes.push(Change::moved(key.clone()));
            }
        }
    }
    for key in by_key_b.keys() {
        if !by_key_a.contains_key(key) {
            changes.push(Change::added(key.clone()));
        }
    }
}

fn diff_headings(a: &PageRepresentation, b: &PageRepresentation, changes: &mut Vec<Change>) {
    let by_id_a: HashMap<&str, &str> = a.structure.headings.iter().map(|h| (h.id.as_str(), h.text.as_str())).collect();
    let by_id_b: HashMap<&str, &str> = b.structure.headings.iter().map(|h| (h.id.as_str(), h.text.as_str())).collect();

    for (id, text) in &by_id_a {
        match by_id_b.get(id) {
            None => changes.push(Change::removed((*id).to_string())),
            Some(other) if other != text => {
                changes.push(Change::changed((*id).to_string(), "text", (*text).to_string(), (*other).to_string()));
            }
            Some(_) => {}
        }
    }
    for id in by_id_b.keys() {
        if !by_id_a.contains_key(id) {
            changes.push(Change::added((*id).to_string()));
        }
    }
}

fn diff_interactive(a: &PageRepresentation, b: &PageRepresentation, changes: &mut Vec<Change>) {
    let empty = Vec::new();
    let elements_a = a.interactive.as_ref().unwrap_or(&empty);
    let elements_b = b.interactive.as_ref().unwrap_or(&empty);

    let by_id_a: HashMap<&str, _> = elements_a.iter().map(|e| (e.id.as_str(), e)).collect();
    let by_id_b: HashMap<&str, _> = elements_b.iter().map(|e| (e.id.as_str(), e)).collect();

    for (id, elem) in &by_id_a {
        let Some(other) = by_id_b.get(id) else {
            changes.push(Change::removed((*id).to_string()));
            continue;
        };

        if let (Some(b1), Some(b2)) = (elem.bounds, other.bounds) {
            if b1 != b2 {
                changes.push(Change::moved((*id).to_string()));
            }
        }

        diff_state_field((*id), "enabled", elem.state.enabled, other.state.enabled, changes);
        diff_state_field((*id), "visible", elem.state.visible, other.state.visible, changes);
        diff_state_field((*id), "focused", elem.state.focused, other.state.focused, changes);
        diff_state_field((*id), "checked", elem.state.checked, other.state.checked, changes);
        diff_state_field((*id), "expanded", elem.state.expanded, other.state.expanded, changes);
        diff_state_field((*id), "selected", elem.state.selected, other.state.selected, changes);
        diff_state_field((*id), "required", elem.state.required, other.state.required, changes);
        diff_state_field((*id), "invalid", elem.state.invalid, other.state.invalid, changes);

        if elem.value != other.value {
            changes.push(Change::changed(
                (*id).to_string(),
                "value",
                elem.value.clone().unwrap_or_default(),
                other.value.clone().unwrap_or_default(),
            ));
        }
        if elem.label != other.label {
            changes.push(Change::changed((*id).to_string(), "label", elem.label.clone(), other.label.clone()));
        }
    }
    for id in by_id_b.keys() {
        if !by_id_a.contains_key(id) {
            changes.push(Change::added((*id).to_string()));
        }
    }
}

fn diff_state_field(id: &str, name: &str, a: Option<bool>, b: Option<bool>, changes: &mut Vec<Change>) {
    if a != b {
        changes.push(Change::changed(
            id.to_string(),
            &format!("state.{name}"),
            a.map_or_else(String::new, |v| v.to_string()),
            b.map_or_else(String::new, |v| v.to_string()),
        ));
    }
}

fn diff_forms(a: &PageRepresentation, b: &PageRepresentation, changes: &mut Vec<Change>) {
    let by_id_a: HashMap<&str, _> = a.forms.iter().map(|f| (f.id.as_str(), f)).collect();
    let by_id_b: HashMap<&str, _> = b.forms.iter().map(|f| (f.id.as_str(), f)).collect();

    for (id, form) in &by_id_a {
        match by_id_b.get(id) {
            None => changes.push(Change::removed((*id).to_string())),
            Some(other) if other.fields != form.fields => {
                changes.push(Change::changed((*id).to_string(), "fields", form.fields.join(","), other.fields.join(",")));
            }
            Some(_) => {}
        }
    }
    for id in by_id_b.keys() {
        if !by_id_a.contains_key(id) {
            changes.push(Change::added((*id).to_string()));
        }
    }
}

/// `url`, `title`, and per-landmark `content_summary` (§4.10: "Content scope reports `url`,
/// `title`, `content_summary`"), the latter keyed the same way [`diff_landmarks`] keys landmarks
/// so a changed summary is attributed to the landmark it belongs to.
fn diff_content(a: &PageRepresentation, b: &PageRepresentation, changes: &mut Vec<Change>) {
    if a.url != b.url {
        changes.push(Change::changed("page".to_string(), "url", a.url.clone(), b.url.clone()));
    }
    if a.title != b.title {
        changes.push(Change::changed("page".to_string(), "title", a.title.clone(), b.title.clone()));
    }

    let by_key_a: HashMap<String, &str> = a
        .structure
        .landmarks
        .iter()
        .filter_map(|l| l.content_summary.as_deref().map(|s| (landmark_key(l), s)))
        .collect();
    let by_key_b: HashMap<String, &str> = b
        .structure
        .landmarks
        .iter()
        .filter_map(|l| l.content_summary.as_deref().map(|s| (landmark_key(l), s)))
        .collect();

    for (key, summary) in &by_key_a {
        if let Some(other) = by_key_b.get(key) {
            if other != summary {
                changes.push(Change::changed(key.clone(), "content_summary", (*summary).to_string(), (*other).to_string()));
            }
        }
    }
}

fn summarize(changes: &[Change]) -> String {
    if changes.is_empty() {
        return "No changes detected.".to_string();
    }
    let added = changes.iter().filter(|c| c.kind == ChangeKind::Added).count();
    let removed = changes.iter().filter(|c| c.kind == ChangeKind::Removed).count();
    let moved = changes.iter().filter(|c| c.kind == ChangeKind::Moved).count();
    let changed = changes.iter().filter(|c| c.kind == ChangeKind::Changed).count();
    format!("{} changes: {added} added, {removed} removed, {moved} moved, {changed} changed.", changes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Bounds2d, PageErrors, Structure};

    fn blank(url: &str) -> PageRepresentation {
        PageRepresentation {
            url: url.to_string(),
            title: "t".to_string(),
            viewport: Bounds2d { width: 0, height: 0 },
            snapshot_id: None,
            timestamp: None,
            structure: Structure::default(),
            interactive: Some(Vec::new()),
            interactive_summary: None,
            forms: Vec::new(),
            errors: PageErrors::default(),
            pending_dialog: None,
            reload_event: None,
            delta: None,
        }
    }

    #[test]
    fn url_change_reported_under_content_scope() {
        let a = blank("https://a.example");
        let b = blank("https://b.example");
        let result = diff(1, 2, &a, &b, DiffScope::Content);
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].property.as_deref(), Some("url"));
    }

    #[test]
    fn no_changes_yields_the_exact_no_changes_summary() {
        let a = blank("https://a.example");
        let b = blank("https://a.example");
        let result = diff(1, 2, &a, &b, DiffScope::All);
        assert!(result.changes.is_empty());
        assert_eq!(result.summary, "No changes detected.");
    }

    #[test]
    fn identical_representation_diffed_against_itself_has_no_changes() {
        let a = blank("https://a.example");
        let result = diff(1, 1, &a, &a, DiffScope::All);
        assert!(result.changes.is_empty());
        assert_eq!(result.summary, "No changes detected.");
    }

    #[test]
    fn landmark_content_summary_change_reported_under_content_scope() {
        let mut a = blank("https://a.example");
        let mut b = blank("https://a.example");
        a.structure.landmarks.push(Landmark {
            role: "main".to_string(),
            label: None,
            bounds: None,
            content_summary: Some("main: 1 headings, 0 links, 0 form".to_string()),
            node_id: 0,
        });
        b.structure.landmarks.push(Landmark {
            role: "main".to_string(),
            label: None,
            bounds: None,
            content_summary: Some("main: 2 headings, 0 links, 0 form".to_string()),
            node_id: 0,
        });

        let result = diff(1, 2, &a, &b, DiffScope::Content);
        assert!(result.changes.iter().any(|c| c.property.as_deref() == Some("content_summary")));
    }
}
