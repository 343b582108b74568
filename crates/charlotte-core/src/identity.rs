//! Element ID Generator (§4.5): deterministic, backend-id-independent stable identifiers.
//!
//! The browser re-serializes the AX tree on every request and invalidates backend-node-ids on
//! DOM mutation. Per the "element identity without pointers" design note, the only correct
//! abstraction is a deterministic hash over a role/name/ancestor signature, paired with a
//! per-render map — this generator never accepts or returns a backend reference as the element
//! id itself; `resolve_id`/`find_similar` are the only sanctioned way back to one.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::ax::NodeId;
use crate::domsig::Signature;

/// A live element id, keyed by type prefix plus 6 hex characters (§3).
pub type ElementId = String;

/// The generator's hash key: everything the id must be a deterministic function of.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HashKey {
    prefix: String,
    role: String,
    name: String,
    signature: Signature,
    disambiguator: u32,
}

/// Tracks id ↔ backend-reference bindings for the current render, plus enough history to
/// reconcile ids across consecutive renders so unchanged elements keep their id.
#[derive(Debug, Default)]
pub struct IdGenerator {
    /// `elementId → backendRef`, valid for the current render.
    id_to_backend: HashMap<ElementId, String>,
    /// `elementId → NodeId`, valid for the current render (for the in-process resolution path
    /// when no live CDP round-trip is needed, e.g. signature recomputation in `find_similar`).
    id_to_node: HashMap<ElementId, NodeId>,
    /// The hash key that produced each id, from the *previous* completed render — used to decide
    /// whether a newly computed key should reuse a prior id.
    previous_keys: HashMap<HashKey, ElementId>,
    /// The hash key that produced each id in the render currently being built.
    pending_keys: HashMap<HashKey, ElementId>,
    /// Ids already handed out in the render currently being built, for collision detection.
    pending_ids: std::collections::HashSet<ElementId>,
}

impl IdGenerator {
    /// Construct an empty generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new render: move the previous render's keys into history and clear per-render
    /// scratch state, so [`Self::generate_id`] can reconcile against them.
    pub fn begin_render(&mut self) {
        self.previous_keys = std::mem::take(&mut self.pending_keys);
        self.pending_ids.clear();
        self.id_to_backend.clear();
        self.id_to_node.clear();
    }

    /// Generate (or reconcile) the id for one element, recording the backend ref and node id for
    /// later resolution.
    pub fn generate_id(&mut self, prefix: &str, role: &str, name: &str, signature: &Signature) -> ElementId {
        self.generate_id_for(prefix, role, name, signature, None, None)
    }

    /// As [`Self::generate_id`], additionally binding the id to a backend ref / node id for
    /// resolution. Interactive elements call this variant; synthetic ids (e.g. forms, when no
    /// single backend node applies) use [`Self::generate_id`].
    pub fn generate_id_bound(
        &mut self,
        prefix: &str,
        role: &str,
        name: &str,
        signature: &Signature,
        backend_ref: Option<&str>,
        node_id: NodeId,
    ) -> ElementId {
        self.generate_id_for(prefix, role, name, signature, backend_ref, Some(node_id))
    }

    fn generate_id_for(
        &mut self,
        prefix: &str,
        role: &str,
        name: &str,
        signature: &Signature,
        backend_ref: Option<&str>,
        node_id: Option<NodeId>,
    ) -> ElementId {
        let mut disambiguator = 0u32;
        let id = loop {
            let key = HashKey {
                prefix: prefix.to_string(),
                role: role.to_string(),
                name: name.to_string(),
                signature: signature.clone(),
                disambiguator,
            };

            // Reconciliation: if this exact key produced an id last render, keep it.
            if let Some(existing) = self.previous_keys.get(&key) {
                if !self.pending_ids.contains(existing) {
                    self.pending_keys.insert(key, existing.clone());
                    self.pending_ids.insert(existing.clone());
                    break existing.clone();
                }
            }

            let candidate = format!("{prefix}-{}", format_hash(&key));

            if self.pending_ids.contains(&candidate) {
                // Collision within this render: bump the disambiguator and rehash.
                disambiguator += 1;
                continue;
            }

            self.pending_keys.insert(key, candidate.clone());
            self.pending_ids.insert(candidate.clone());
            break candidate;
        };

        if let Some(backend_ref) = backend_ref {
            self.id_to_backend.insert(id.clone(), backend_ref.to_string());
        }
        if let Some(node_id) = node_id {
            self.id_to_node.insert(id.clone(), node_id);
        }

        id
    }

    /// Resolve a live element id to its current backend reference, if bound this render.
    #[must_use]
    pub fn resolve_id(&self, element_id: &str) -> Option<&str> {
        self.id_to_backend.get(element_id).map(String::as_str)
    }

    /// Resolve a live element id to its arena node, if bound this render.
    #[must_use]
    pub fn resolve_node(&self, element_id: &str) -> Option<NodeId> {
        self.id_to_node.get(element_id).copied()
    }

    /// Find the closest match to a now-missing `element_id` among `candidates` using a small
    /// edit-distance-like score on `(type prefix, label)`. Returns the best candidate id if its
    /// score clears a minimal similarity bar, else `None`.
    #[must_use]
    pub fn find_similar<'a>(
        &self,
        missing_prefix: &str,
        missing_label: &str,
        candidates: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Option<String> {
        candidates
            .into_iter()
            .filter(|(id, _)| id.starts_with(missing_prefix))
            .map(|(id, label)| (id, similarity(missing_label, label)))
            .filter(|(_, score)| *score >= 0.4)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id.to_string())
    }
}

fn format_hash(key: &HashKey) -> String {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let full = hasher.finish();
    // Lower 24 bits -> 6 hex chars, matching the spec's `<prefix>-<6hex>` format.
    format!("{:06x}", full & 0x00FF_FFFF)
}

/// Normalized Levenshtein similarity in `[0, 1]`, 1.0 meaning identical (case-insensitive).
fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let dist = levenshtein(&a, &b) as f64;
    let max_len = a.chars().count().max(b.chars().count()) as f64;
    if max_len == 0.0 {
        1.0
    } else {
        1.0 - (dist / max_len)
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig() -> Signature {
        Signature {
            nearest_landmark_role: Some("main".into()),
            nearest_landmark_label: None,
            nearest_labelled_container: None,
            sibling_index: 0,
        }
    }

    #[test]
    fn same_signature_across_renders_keeps_id() {
        let mut gen = IdGenerator::new();
        gen.begin_render();
        let id1 = gen.generate_id("btn", "button", "Save", &sig());

        gen.begin_render();
        let id2 = gen.generate_id("btn", "button", "Save", &sig());

        assert_eq!(id1, id2);
    }

    #[test]
    fn different_signature_changes_id() {
        let mut gen = IdGenerator::new();
        gen.begin_render();
        let id1 = gen.generate_id("btn", "button", "Save", &sig());

        let mut other = sig();
        other.sibling_index = 1;
        let id2 = gen.generate_id("btn", "button", "Save", &other);

        assert_ne!(id1, id2);
    }

    #[test]
    fn collision_within_render_gets_disambiguated() {
        let mut gen = IdGenerator::new();
        gen.begin_render();
        // Two calls in the same render with an identical (prefix, role, name, signature) key
        // are, by how this generator is actually driven (once per distinct AX node per render),
        // two genuinely distinct elements whose signature happened to collide — not the same
        // element queried twice. Reconciliation only ever looks at the *previous* render's keys
        // (`same_signature_across_renders_keeps_id` covers that path), so within one render a
        // repeated key must bump the disambiguator and come out with a different id, never the
        // same one.
        let a = gen.generate_id("btn", "button", "Save", &sig());
        let b = gen.generate_id("btn", "button", "Save", &sig());
        assert_ne!(a, b);
    }

    #[test]
    fn find_similar_prefers_closer_label() {
        let gen = IdGenerator::new();
        let candidates = vec![("btn-aaaaaa", "Save Draft"), ("btn-bbbbbb", "Cancel")];
        let best = gen.find_similar("btn", "Save", candidates);
        assert_eq!(best.as_deref(), Some("btn-aaaaaa"));
    }

    #[test]
    fn find_similar_returns_none_below_bar() {
        let gen = IdGenerator::new();
        let candidates = vec![("btn-aaaaaa", "Completely Unrelated Thing")];
        assert!(gen.find_similar("btn", "Save", candidates).is_none());
    }
}
