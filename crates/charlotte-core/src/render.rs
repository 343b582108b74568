//! Renderer Pipeline (§4.7): turns a live CDP session into a [`PageRepresentation`].

use std::collections::HashMap;

use serde::Serialize;
use viewpoint_core::Page;

use crate::ax::{self, Arena, NodeId};
use crate::domsig;
use crate::identity::IdGenerator;
use crate::interactive::{self, FormRepresentation, InteractiveElement};
use crate::layout::{self, Bounds};
use crate::page::PendingDialog;
use crate::session::{Domain, SessionManager};
use crate::snapshot::SnapshotDiff;

/// Detail level requested of [`render`] (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    /// `interactive_summary` only, no per-element array, no content summaries.
    Minimal,
    /// Full `interactive` array, per-landmark `content_summary`.
    Summary,
    /// As `Summary`, plus `full_content` (deduplicated visible text).
    Full,
}

/// A labelled, navigable page region (§3 `Landmark`).
#[derive(Debug, Clone, Serialize)]
pub struct Landmark {
    /// Landmark role.
    pub role: String,
    /// Accessible label, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Absolute page bounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    /// Per-landmark synthesized summary, at `detail >= summary`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_summary: Option<String>,
    /// The AX node this landmark was built from — used internally to scope `content_summary` to
    /// this landmark's own subtree; never serialized.
    #[serde(skip)]
    pub(crate) node_id: NodeId,
}

/// A page heading (§3 `Heading`).
#[derive(Debug, Clone, Serialize)]
pub struct Heading {
    /// Heading level, 1-6.
    pub level: u8,
    /// Heading text.
    pub text: String,
    /// Stable element id.
    pub id: String,
    /// The AX node this heading was built from — used internally for landmark scoping; never
    /// serialized.
    #[serde(skip)]
    pub(crate) node_id: NodeId,
}

/// The structural portion of a [`PageRepresentation`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Structure {
    /// Page landmarks.
    pub landmarks: Vec<Landmark>,
    /// Page headings.
    pub headings: Vec<Heading>,
    /// Deduplicated visible text, at `detail == full` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
}

/// Per-landmark interactive-element counts at `detail == minimal` (§4.7 step 7).
#[derive(Debug, Clone, Default, Serialize)]
pub struct InteractiveSummary {
    /// Total interactive elements on the page.
    pub total: usize,
    /// `landmark role (or "root")` → `element type` → count.
    pub by_landmark: HashMap<String, HashMap<String, usize>>,
}

/// Captured console/network errors attached to a representation (§4.8 legacy views).
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageErrors {
    /// Console messages at `warning` or `error` level.
    pub console: Vec<crate::page::ConsoleMessage>,
    /// Network responses with `status_code >= 400`, or requests that failed outright.
    pub network: Vec<crate::page::NetworkRequest>,
}

/// The wire-stable engine output (§3 `PageRepresentation`).
#[derive(Debug, Clone, Serialize)]
pub struct PageRepresentation {
    /// Current page URL.
    pub url: String,
    /// Current page title.
    pub title: String,
    /// Viewport dimensions in CSS pixels.
    pub viewport: Bounds2d,
    /// Snapshot id this representation was stamped with, once pushed to the Snapshot Store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<u64>,
    /// ISO-8601 capture timestamp, stamped by the Snapshot Store on push.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Structural content (landmarks, headings, optional full content).
    pub structure: Structure,
    /// Interactive elements, at `detail >= summary`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<Vec<InteractiveElement>>,
    /// Interactive-element counts, at `detail == minimal`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive_summary: Option<InteractiveSummary>,
    /// Grouped forms.
    pub forms: Vec<FormRepresentation>,
    /// Captured console/network errors.
    pub errors: PageErrors,
    /// The dialog blocking this tab, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_dialog: Option<PendingDialog>,
    /// A pending dev-mode reload event, consumed on read (§4.16).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reload_event: Option<crate::devmode::ReloadEvent>,
    /// Diff against the pre-action snapshot, attached by the post-action render helper (§4.12).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<SnapshotDiff>,
}

/// A width/height pair (distinct from [`Bounds`], which also carries an origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds2d {
    /// Viewport width in CSS pixels.
    pub width: u32,
    /// Viewport height in CSS pixels.
    pub height: u32,
}

/// Render options (§4.7).
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Requested detail level.
    pub detail: DetailLevelOrDefault,
    /// Scope the representation to the subtree under this DOM-path signature prefix.
    pub selector: Option<String>,
}

/// [`DetailLevel`] with a `Default` impl (`Summary`), so callers can use `RenderOptions::default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailLevelOrDefault(pub DetailLevel);

impl Default for DetailLevelOrDefault {
    fn default() -> Self {
        Self(DetailLevel::Summary)
    }
}

/// Render `page` into a [`PageRepresentation`] (§4.7). `dialog`/`errors` come from the Page
/// Manager; `id_gen` is reconciled across calls so unchanged elements keep their id. `sessions`
/// records, per `target_id`, which CDP domains this render touched (§4.1 CDP Session Manager) —
/// a failed first touch is logged and does not abort the render.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::SessionError`] if a CDP round-trip fails outright (as
/// opposed to an individual node's bounds query, which degrades to [`layout::ZERO_BOUNDS`]).
pub async fn render(
    page: &Page,
    target_id: &str,
    sessions: &SessionManager,
    id_gen: &mut IdGenerator,
    dialog: Option<PendingDialog>,
    errors: PageErrors,
    reload_event: Option<crate::devmode::ReloadEvent>,
    options: &RenderOptions,
) -> crate::error::Result<PageRepresentation> {
    if let Some(dialog) = dialog {
        return Ok(stub_for_dialog(page, dialog, reload_event).await);
    }

    let url = page.url().await.unwrap_or_default();
    let title = page.title().await.unwrap_or_default();
    let viewport = fetch_viewport(page, target_id, sessions).await;
    sessions.note_touch(target_id, Domain::Page).await;

    let arena = match ax::extract(page).await {
        Ok(arena) => {
            sessions.note_touch(target_id, Domain::Accessibility).await;
            arena
        }
        Err(e) => {
            sessions.note_enable_failure(target_id, Domain::Accessibility, &e.to_string());
            return Err(e);
        }
    };
    let bounds_map = layout::extract(page, &arena).await;
    sessions.note_touch(target_id, Domain::Dom).await;
    sessions.note_touch(target_id, Domain::Css).await;

    id_gen.begin_render();

    let mut landmarks = landmarks_from(&arena, &bounds_map);
    let mut headings = headings_from(&arena, id_gen);
    let (mut elements, forms) = interactive::extract(&arena, &bounds_map, id_gen);

    if let Some(selector) = &options.selector {
        let allowed = scoped_node_ids(&arena, selector);
        landmarks.retain(|l| allowed.roles.contains(&l.role));
        headings.retain(|h| id_gen.resolve_node(&h.id).is_some_and(|n| allowed.nodes.contains(&n)));
        elements.retain(|e| allowed.nodes.contains(&e.node_id));
    }

    if matches!(options.detail.0, DetailLevel::Summary | DetailLevel::Full) {
        let element_id_to_node: HashMap<&str, NodeId> = elements.iter().map(|e| (e.id.as_str(), e.node_id)).collect();
        for landmark in &mut landmarks {
            let mut subtree = std::collections::HashSet::new();
            collect_subtree(&arena, landmark.node_id, &mut subtree);
            landmark.content_summary =
                Some(summarize_landmark(landmark, &elements, &headings, &forms, &subtree, &element_id_to_node));
        }
    }

    let full_content =
        if matches!(options.detail.0, DetailLevel::Full) { Some(synthesize_full_content(&arena)) } else { None };

    let (interactive, interactive_summary) = if matches!(options.detail.0, DetailLevel::Minimal) {
        (None, Some(summarize_interactive(&arena, &elements, &landmarks)))
    } else {
        (Some(elements), None)
    };

    Ok(PageRepresentation {
        url,
        title,
        viewport,
        snapshot_id: None,
        timestamp: None,
        structure: Structure { landmarks, headings, full_content },
        interactive,
        interactive_summary,
        forms,
        errors,
        pending_dialog: None,
        reload_event,
        delta: None,
    })
}

/// Read `window.innerWidth`/`innerHeight` via JS evaluation, mirroring the teacher's
/// evaluate-to-read-browser-state style used for e.g. network timing entries.
async fn fetch_viewport(page: &Page, target_id: &str, sessions: &SessionManager) -> Bounds2d {
    let value = match page.evaluate("({width: window.innerWidth, height: window.innerHeight})").await {
        Ok(value) => value,
        Err(e) => {
            sessions.note_enable_failure(target_id, Domain::Page, &e.to_string());
            return Bounds2d { width: 0, height: 0 };
        }
    };
    let width = value.get("width").and_then(serde_json::Value::as_u64).unwrap_or(0) as u32;
    let height = value.get("height").and_then(serde_json::Value::as_u64).unwrap_or(0) as u32;
    Bounds2d { width, height }
}

async fn stub_for_dialog(
    page: &Page,
    dialog: PendingDialog,
    reload_event: Option<crate::devmode::ReloadEvent>,
) -> PageRepresentation {
    let url = page.url().await.unwrap_or_default();
    PageRepresentation {
        url,
        title: "(dialog blocking)".to_string(),
        viewport: Bounds2d { width: 0, height: 0 },
        snapshot_id: None,
        timestamp: None,
        structure: Structure::default(),
        interactive: Some(Vec::new()),
        interactive_summary: None,
        forms: Vec::new(),
        errors: PageErrors::default(),
        pending_dialog: Some(dialog),
        reload_event,
        delta: None,
    }
}

fn landmarks_from(arena: &Arena, bounds_map: &HashMap<String, Bounds>) -> Vec<Landmark> {
    arena
        .preorder()
        .into_iter()
        .filter_map(|id| arena.get(id))
        .filter(|node| interactive::is_landmark_role(&node.role))
        .map(|node| {
            let bounds = node.backend_ref.as_ref().and_then(|r| bounds_map.get(r)).filter(|b| !b.is_zero()).copied();
            Landmark { role: node.role.clone(), label: node.name.clone(), bounds, content_summary: None, node_id: node.id }
        })
        .collect()
}

fn headings_from(arena: &Arena, id_gen: &mut IdGenerator) -> Vec<Heading> {
    arena
        .preorder()
        .into_iter()
        .filter_map(|id| arena.get(id).map(|n| (id, n)))
        .filter(|(_, node)| node.role == "heading")
        .map(|(node_id, node)| {
            let name = node.name.clone().unwrap_or_default();
            let signature = domsig::compute(arena, node_id);
            let id = id_gen.generate_id_bound("h", &node.role, &name, &signature, node.backend_ref.as_deref(), node_id);
            Heading { level: node.level.unwrap_or(1), text: name, id, node_id }
        })
        .collect()
}

struct ScopedNodes {
    nodes: std::collections::HashSet<NodeId>,
    roles: std::collections::HashSet<String>,
}

/// Nodes whose computed signature's nearest-landmark-label or -role matches `selector`, plus
/// their full subtree (§4.7 step 9: "scope ... by matching the DOM-path signature's ancestors").
fn scoped_node_ids(arena: &Arena, selector: &str) -> ScopedNodes {
    let mut nodes = std::collections::HashSet::new();
    let mut roles = std::collections::HashSet::new();

    for id in arena.preorder() {
        let Some(node) = arena.get(id) else { continue };
        let signature = domsig::compute(arena, id);
        let matches = signature.nearest_landmark_label.as_deref() == Some(selector)
            || signature.nearest_landmark_role.as_deref() == Some(selector)
            || node.role == selector;
        if matches {
            roles.insert(node.role.clone());
            collect_subtree(arena, id, &mut nodes);
        }
    }
    ScopedNodes { nodes, roles }
}

fn collect_subtree(arena: &Arena, node_id: NodeId, out: &mut std::collections::HashSet<NodeId>) {
    out.insert(node_id);
    if let Some(node) = arena.get(node_id) {
        for &child in &node.children {
            collect_subtree(arena, child, out);
        }
    }
}

/// Per-landmark `content_summary` (§4.7 step 6), scoped to `landmark`'s own subtree: only
/// headings/elements whose node falls in `subtree` are counted, and only forms with at least one
/// field resolving (via `element_id_to_node`) to a node inside `subtree`.
fn summarize_landmark(
    landmark: &Landmark,
    elements: &[InteractiveElement],
    headings: &[Heading],
    forms: &[FormRepresentation],
    subtree: &std::collections::HashSet<NodeId>,
    element_id_to_node: &HashMap<&str, NodeId>,
) -> String {
    let local_headings = headings.iter().filter(|h| subtree.contains(&h.node_id)).count();
    let links = elements
        .iter()
        .filter(|e| subtree.contains(&e.node_id) && matches!(e.element_type, interactive::ElementType::Link))
        .count();
    let local_forms = forms
        .iter()
        .filter(|f| {
            f.fields
                .iter()
                .any(|field_id| element_id_to_node.get(field_id.as_str()).is_some_and(|n| subtree.contains(n)))
        })
        .count();

    format!("{}: {} headings, {} links, {} form", landmark.role, local_headings, links, local_forms)
}

/// Bucket each element under the landmark role its signature nearest-ancestor resolves to, or
/// `"root"` if it sits outside any landmark (§4.7 step 7).
fn summarize_interactive(arena: &Arena, elements: &[InteractiveElement], landmarks: &[Landmark]) -> InteractiveSummary {
    let mut by_landmark: HashMap<String, HashMap<String, usize>> = HashMap::new();
    for landmark in landmarks {
        by_landmark.entry(landmark.role.clone()).or_default();
    }
    by_landmark.entry("root".to_string()).or_default();

    for element in elements {
        let type_name = type_name(element.element_type);
        let landmark_role = domsig::compute(arena, element.node_id)
            .nearest_landmark_role
            .unwrap_or_else(|| "root".to_string());
        let bucket = by_landmark.entry(landmark_role).or_default();
        *bucket.entry(type_name.to_string()).or_insert(0) += 1;
    }

    InteractiveSummary { total: elements.len(), by_landmark }
}

fn type_name(t: interactive::ElementType) -> &'static str {
    use interactive::ElementType as E;
    match t {
        E::Button => "button",
        E::Link => "link",
        E::TextInput => "text_input",
        E::Textarea => "textarea",
        E::Select => "select",
        E::Checkbox => "checkbox",
        E::Radio => "radio",
        E::Toggle => "toggle",
        E::Range => "range",
    }
}

/// Visible text, each semantic block (heading/paragraph/listitem) emitted once in document
/// order (§9: dedup by block, not by raw text run).
fn synthesize_full_content(arena: &Arena) -> String {
    const BLOCK_ROLES: &[&str] = &["heading", "paragraph", "listitem", "blockquote", "cell"];
    let mut lines = Vec::new();
    for id in arena.preorder() {
        let Some(node) = arena.get(id) else { continue };
        if BLOCK_ROLES.contains(&node.role.as_str()) {
            if let Some(name) = &node.name {
                if !name.is_empty() {
                    lines.push(name.clone());
                }
            }
        }
    }
    lines.join("\n")
}
