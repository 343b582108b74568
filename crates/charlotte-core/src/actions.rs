//! Post-action render helper (§4.12), navigation/dialog race helper (§4.13), and the `wait_for`
//! poller (§4.14) — the three pieces of glue between a single tool call and the Renderer
//! Pipeline.

use std::time::Duration;

use tokio::time::Instant;
use viewpoint_core::Page;

use crate::error::{EngineError, Result};
use crate::identity::IdGenerator;
use crate::page::{PageManager, PendingDialog};
use crate::render::{render, DetailLevel, DetailLevelOrDefault, PageErrors, PageRepresentation, RenderOptions};
use crate::session::SessionManager;
use crate::snapshot::{diff, DiffScope, SnapshotStore};

const NAV_DETECTION_WINDOW: Duration = Duration::from_millis(500);
const NAV_LOAD_TIMEOUT: Duration = Duration::from_secs(10);
const SETTLE_DELAY: Duration = Duration::from_millis(50);
const WAIT_FOR_POLL_INTERVAL: Duration = Duration::from_millis(100);
const WAIT_FOR_DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Render after a mutating action, attaching a [`crate::snapshot::SnapshotDiff`] against the
/// last snapshot as `delta` (§4.12). `store` supplies the pre-state; the post-state render is
/// pushed onto it only if `push` is `true` (the caller applies the `auto_snapshot` policy).
///
/// # Errors
///
/// Returns an error if the renderer pipeline itself fails.
pub async fn render_after_action(
    page: &Page,
    target_id: &str,
    sessions: &SessionManager,
    id_gen: &mut IdGenerator,
    store: &mut SnapshotStore,
    dialog: Option<PendingDialog>,
    errors: PageErrors,
    reload_event: Option<crate::devmode::ReloadEvent>,
    options: &RenderOptions,
    push: bool,
    timestamp: impl Fn() -> String,
) -> Result<PageRepresentation> {
    let pre = store.latest().map(|s| (s.id, s.representation.clone()));

    let mut post = render(page, target_id, sessions, id_gen, dialog, errors, reload_event, options).await?;

    if let Some((pre_id, pre_representation)) = pre {
        let to_id = if push { store.push(post.clone(), timestamp()) } else { pre_id + 1 };
        post.delta = Some(diff(pre_id, to_id, &pre_representation, &post, DiffScope::All));
        if push {
            post.snapshot_id = Some(to_id);
        }
    } else if push {
        store.push(post.clone(), timestamp());
    }

    Ok(post)
}

/// Outcome of racing an action against dialog appearance and navigation (§4.13).
#[derive(Debug)]
pub enum RaceOutcome<T> {
    /// The action resolved first, cleanly.
    Resolved(T),
    /// A dialog appeared before the action resolved; the action's future was detached.
    DialogBlocked,
}

/// Run `action` for tab `target_id`, racing it against dialog appearance within
/// `NAV_DETECTION_WINDOW`. If a dialog wins the race, `action`'s future is dropped (its eventual
/// rejection, if any, is simply never observed) and [`RaceOutcome::DialogBlocked`] is returned
/// immediately so the caller can surface `pending_dialog`. Otherwise, once `action` resolves, this
/// waits for the URL to settle if it changed (main-frame navigation), or pauses briefly to let
/// in-page DOM updates apply.
///
/// # Errors
///
/// Propagates `action`'s own error if it resolves to one without a dialog winning the race.
pub async fn race_action_against_dialog<F, T>(
    page: &Page,
    pages: &PageManager,
    target_id: &str,
    action: F,
) -> Result<RaceOutcome<T>>
where
    F: std::future::Future<Output = Result<T>>,
{
    let url_before = page.url().await.unwrap_or_default();
    tokio::pin!(action);

    let value = tokio::select! {
        biased;

        dialog_appeared = poll_for_dialog(pages, target_id) => {
            if dialog_appeared {
                tracing::debug!(target_id, "dialog appeared before action resolved, detaching action");
                return Ok(RaceOutcome::DialogBlocked);
            }
            // The detection window elapsed with no dialog; fall back to awaiting the action to
            // completion directly, with no further race.
            action.await?
        }

        result = &mut action => result?,
    };

    settle_after_action(page, &url_before).await;
    Ok(RaceOutcome::Resolved(value))
}

/// Poll the Page Manager's dialog state for `target_id` until one appears or
/// [`NAV_DETECTION_WINDOW`] elapses, returning `true` only in the former case.
async fn poll_for_dialog(pages: &PageManager, target_id: &str) -> bool {
    let deadline = Instant::now() + NAV_DETECTION_WINDOW;
    loop {
        if pages.pending_dialog(target_id).await.is_some() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// After an action resolves cleanly: if the URL changed, wait (up to [`NAV_LOAD_TIMEOUT`]) for it
/// to stop changing (a crude proxy for "wait for load" absent a confirmed one-shot navigation
/// event in this engine's CDP surface); otherwise pause [`SETTLE_DELAY`] for in-page DOM updates.
async fn settle_after_action(page: &Page, url_before: &str) {
    let url_after = page.url().await.unwrap_or_default();
    if url_after == url_before {
        tokio::time::sleep(SETTLE_DELAY).await;
        return;
    }

    let deadline = Instant::now() + NAV_LOAD_TIMEOUT;
    let mut last_seen = url_after;
    loop {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let current = page.url().await.unwrap_or_default();
        if current == last_seen || Instant::now() >= deadline {
            return;
        }
        last_seen = current;
    }
}

/// A single `wait_for` target predicate (§4.14), several may be supplied together and all must
/// hold before the poller returns.
#[derive(Debug, Clone, Default)]
pub struct WaitForPredicates {
    /// Wait on a specific element reaching `state`.
    pub element: Option<(String, ElementWaitState)>,
    /// Wait for `text` to be present in the page's deduplicated visible text.
    pub text: Option<String>,
    /// Wait for an element matching this selector (DOM-path signature scope, per
    /// [`crate::render::RenderOptions::selector`]) to exist.
    pub selector: Option<String>,
    /// Wait for this JS expression to evaluate truthy.
    pub js: Option<String>,
    /// Poll timeout; defaults to 30s.
    pub timeout: Option<Duration>,
}

/// The element state a `wait_for` element predicate polls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementWaitState {
    /// The element id resolves to a live node.
    Exists,
    /// The element id no longer resolves.
    Removed,
    /// The element is visible (non-zero bounds).
    Visible,
    /// The element is not visible.
    Hidden,
    /// The element is enabled.
    Enabled,
    /// The element is disabled.
    Disabled,
}

/// Outcome of [`wait_for`]: either the predicates were satisfied, or the timeout elapsed — in
/// which case the last-observed representation is still returned alongside the error, per §4.14
/// ("on timeout, return the current representation and a TIMEOUT error").
#[derive(Debug)]
pub enum WaitOutcome {
    /// All predicates held.
    Ready(PageRepresentation),
    /// The timeout elapsed; carries the last render taken before giving up.
    TimedOut {
        /// The most recent representation observed while polling.
        representation: PageRepresentation,
        /// The timeout error describing how long was waited.
        error: EngineError,
    },
}

/// Poll at 100ms until every predicate in `predicates` holds or its timeout expires (§4.14).
/// Predicates that depend on element identity force a minimal re-render each iteration to refresh
/// the id map. A `text` predicate needs `full_content` populated, so it forces `DetailLevel::Full`
/// rather than the usual `Summary` (`full_content` is only synthesized at `Full`, per §4.7).
///
/// # Errors
///
/// Returns an error only if the renderer pipeline itself fails; a predicate timeout is reported
/// via [`WaitOutcome::TimedOut`], not an `Err`.
pub async fn wait_for(
    page: &Page,
    target_id: &str,
    sessions: &SessionManager,
    id_gen: &mut IdGenerator,
    predicates: &WaitForPredicates,
) -> Result<WaitOutcome> {
    let timeout = predicates.timeout.unwrap_or(WAIT_FOR_DEFAULT_TIMEOUT);
    let deadline = Instant::now() + timeout;
    let detail = if predicates.text.is_some() { DetailLevel::Full } else { DetailLevel::Summary };
    let options = RenderOptions { detail: DetailLevelOrDefault(detail), selector: predicates.selector.clone() };

    loop {
        let representation = render(page, target_id, sessions, id_gen, None, PageErrors::default(), None, &options).await?;

        if predicates_hold(page, id_gen, &representation, predicates).await {
            return Ok(WaitOutcome::Ready(representation));
        }

        if Instant::now() >= deadline {
            let error = EngineError::timeout(format!(
                "wait_for: predicates not satisfied within {:.1}s",
                timeout.as_secs_f64()
            ));
            return Ok(WaitOutcome::TimedOut { representation, error });
        }

        tokio::time::sleep(WAIT_FOR_POLL_INTERVAL).await;
    }
}

async fn predicates_hold(
    page: &Page,
    id_gen: &IdGenerator,
    representation: &PageRepresentation,
    predicates: &WaitForPredicates,
) -> bool {
    if let Some((element_id, state)) = &predicates.element {
        if !element_predicate_holds(id_gen, representation, element_id, *state) {
            return false;
        }
    }

    if let Some(js) = &predicates.js {
        match page.evaluate(js).await {
            Ok(value) => {
                if !value.as_bool().unwrap_or(false) {
                    return false;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "wait_for js predicate failed to evaluate");
                return false;
            }
        }
    }

    if let Some(text) = &predicates.text {
        let found = representation
            .structure
            .full_content
            .as_deref()
            .map(|content| content.contains(text.as_str()))
            .unwrap_or_else(|| {
                representation
                    .structure
                    .landmarks
                    .iter()
                    .any(|l| l.content_summary.as_deref().is_some_and(|s| s.contains(text.as_str())))
            });
        if !found {
            return false;
        }
    }

    if predicates.selector.is_some()
        && representation.structure.landmarks.is_empty()
        && representation.interactive.as_ref().is_none_or(Vec::is_empty)
    {
        return false;
    }

    true
}

fn element_predicate_holds(
    id_gen: &IdGenerator,
    representation: &PageRepresentation,
    element_id: &str,
    state: ElementWaitState,
) -> bool {
    let resolved = id_gen.resolve_id(element_id);
    match state {
        ElementWaitState::Exists => resolved.is_some(),
        ElementWaitState::Removed => resolved.is_none(),
        ElementWaitState::Visible | ElementWaitState::Hidden | ElementWaitState::Enabled | ElementWaitState::Disabled => {
            let Some(element) = representation.interactive.as_ref().and_then(|els| els.iter().find(|e| e.id == element_id))
            else {
                return false;
            };
            match state {
                ElementWaitState::Visible => element.state.visible != Some(false),
                ElementWaitState::Hidden => element.state.visible == Some(false),
                ElementWaitState::Enabled => element.state.enabled != Some(false),
                ElementWaitState::Disabled => element.state.enabled == Some(false),
                ElementWaitState::Exists | ElementWaitState::Removed => unreachable!(),
            }
        }
    }
}
