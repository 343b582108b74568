//! Element resolution helper (§4.11): `element_id` → live backend reference, with a
//! re-render-and-retry cascade before giving up.

use viewpoint_core::Page;

use crate::error::{EngineError, Result};
use crate::identity::IdGenerator;
use crate::render::{render, DetailLevel, DetailLevelOrDefault, PageErrors, RenderOptions};
use crate::session::SessionManager;

/// Resolve `element_id` against `id_gen`'s current binding, forcing one minimal re-render on a
/// miss before raising [`EngineError::ElementNotFound`] with a `find_similar` suggestion drawn
/// from the elements that re-render actually found.
///
/// The forced re-render never pushes to the Snapshot Store (§4.11: "re-renders invoked by
/// resolution MUST NOT push a snapshot") — that is the caller's responsibility via the Snapshot
/// Store, not this helper's.
///
/// # Errors
///
/// Returns [`EngineError::ElementNotFound`] if the id cannot be resolved even after a retry.
pub async fn resolve_element(
    page: &Page,
    target_id: &str,
    sessions: &SessionManager,
    id_gen: &mut IdGenerator,
    element_id: &str,
) -> Result<String> {
    if let Some(backend_ref) = id_gen.resolve_id(element_id) {
        return Ok(backend_ref.to_string());
    }

    tracing::debug!(element_id, "element id miss, forcing minimal re-render to retry");
    let options = RenderOptions { detail: DetailLevelOrDefault(DetailLevel::Summary), selector: None };
    let retry = render(page, target_id, sessions, id_gen, None, PageErrors::default(), None, &options).await?;

    if let Some(backend_ref) = id_gen.resolve_id(element_id) {
        return Ok(backend_ref.to_string());
    }

    let recommendation = id_prefix(element_id).and_then(|prefix| {
        let candidates = retry
            .interactive
            .iter()
            .flatten()
            .map(|e| (e.id.as_str(), e.label.as_str()));
        id_gen.find_similar(prefix, element_id, candidates).map(|suggestion| format!("did you mean {suggestion}?"))
    });

    Err(EngineError::element_not_found(format!("no element with id {element_id}"), recommendation))
}

/// The type-prefix portion of a live element id (the part before the first `-`).
fn id_prefix(element_id: &str) -> Option<&str> {
    element_id.split_once('-').map(|(prefix, _)| prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_prefix_extracts_type_tag() {
        assert_eq!(id_prefix("btn-a1b2c3"), Some("btn"));
        assert_eq!(id_prefix("noprefix"), None);
    }
}
