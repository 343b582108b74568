//! `network` tool (§6): throttle presets and URL block patterns.
//!
//! No CDP `Network.emulateNetworkConditions`/`Network.setBlockedURLs` call site is confirmed
//! anywhere in this crate's underlying browser layer — every network-facing operation elsewhere
//! in this codebase (`PageManager::refresh_network`) goes through `page.evaluate`, not a raw CDP
//! session. `block` is implemented the same way, patching `window.fetch`/`XMLHttpRequest.prototype.open`
//! in page context so blocked URL substrings reject/abort; this only covers `fetch`/XHR traffic
//! issued after the call on the current document, not `<img>`/`<script>`/css resource loads, and
//! is cleared by the next navigation. `throttle` has no page-context equivalent (JS cannot shape
//! transport-level bandwidth or latency), so it is recorded for the caller without being applied —
//! the same documented-no-op treatment already given to `reload`'s `hard` flag and `evaluate`'s
//! `await_promise`.

use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::Engine;

/// A throttle preset for `network` (§6 `throttle`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottlePreset {
    /// Slow 3G-like conditions.
    Slow3g,
    /// Typical 4G-like conditions.
    Fast4g,
    /// Fully offline.
    Offline,
    /// No throttling (the default).
    None,
}

/// Result of a `network` tool call: what was requested and whether it could actually be applied.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkPolicyResult {
    /// The throttle preset requested, echoed back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle: Option<ThrottlePreset>,
    /// `true` only for `throttle == offline`, which is approximated via the same fetch/XHR block
    /// used for `block` patterns; every other preset is accepted but not applied.
    pub throttle_applied: bool,
    /// URL substrings blocked, echoed back.
    pub blocked: Vec<String>,
}

impl Engine {
    /// Apply a throttle preset and/or a set of URL block patterns to the active tab (§6
    /// `network`).
    ///
    /// # Errors
    ///
    /// Returns a session error if the patching script fails to install.
    pub async fn network(&mut self, throttle: Option<ThrottlePreset>, block: &[String]) -> Result<NetworkPolicyResult> {
        let (page, _target_id) = self.active_page().await?;

        let mut patterns: Vec<String> = block.to_vec();
        let throttle_applied = matches!(throttle, Some(ThrottlePreset::Offline));
        if throttle_applied {
            patterns.push(String::new());
        }

        if !patterns.is_empty() {
            let needles = serde_json::to_string(&patterns).map_err(|e| EngineError::session_error(e.to_string()))?;
            let js = format!(
                "(() => {{
                    const needles = {needles};
                    const blocked = (url) => needles.some((n) => n === '' || String(url).includes(n));
                    const realFetch = window.fetch.bind(window);
                    window.fetch = (input, init) => {{
                        const url = typeof input === 'string' ? input : input.url;
                        if (blocked(url)) return Promise.reject(new TypeError('blocked by network policy'));
                        return realFetch(input, init);
                    }};
                    const realOpen = XMLHttpRequest.prototype.open;
                    XMLHttpRequest.prototype.open = function (method, url, ...rest) {{
                        if (blocked(url)) throw new DOMException('blocked by network policy', 'AbortError');
                        return realOpen.call(this, method, url, ...rest);
                    }};
                }})()"
            );
            page.evaluate(&js).await.map_err(|e| EngineError::session_error(format!("install network policy: {e}")))?;
        }

        Ok(NetworkPolicyResult { throttle, throttle_applied, blocked: block.to_vec() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_offline_reports_as_applied() {
        assert!(!matches!(Some(ThrottlePreset::Slow3g), Some(ThrottlePreset::Offline)));
        assert!(matches!(Some(ThrottlePreset::Offline), Some(ThrottlePreset::Offline)));
    }
}
