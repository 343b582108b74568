//! `wait_for` tool (§6, §4.14): a thin wrapper over [`crate::actions::wait_for`].

use crate::actions::{wait_for, WaitForPredicates, WaitOutcome};
use crate::error::Result;
use crate::Engine;

impl Engine {
    /// Poll the active tab until every predicate in `predicates` holds, or its timeout elapses
    /// (§6 `wait_for`). On timeout returns [`WaitOutcome::TimedOut`], carrying both the TIMEOUT
    /// error and the last-observed representation, per §7's "timeout responses additionally
    /// include the current page representation".
    ///
    /// # Errors
    ///
    /// Returns an error only if the renderer pipeline itself fails; a predicate timeout is
    /// reported via the returned [`WaitOutcome`], not an `Err`.
    pub async fn wait_for(&mut self, predicates: &WaitForPredicates) -> Result<WaitOutcome> {
        let (page, target_id) = self.active_page().await?;
        wait_for(&page, &target_id, &self.sessions, &mut self.id_gen, predicates).await
    }
}
