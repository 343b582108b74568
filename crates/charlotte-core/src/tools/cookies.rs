//! `set_cookies`/`get_cookies`/`clear_cookies`/`set_headers` tools (§6).
//!
//! The teacher confirms cookie access only at the browser-context level, via
//! `BrowserContext::storage_state()` (`tools/browser_context_save_storage.rs`) — no fine-grained
//! per-cookie get/set/clear call, and no request-header-injection API, is confirmed anywhere in
//! the teacher or the underlying crate's call sites. Rather than fabricate a CDP `Network.set*`
//! binding that isn't grounded, these handlers drive the same confirmed `page.evaluate` surface
//! every other JS-touching tool in this module uses: `document.cookie` for cookie read/write, and
//! a `fetch`/`XMLHttpRequest` patch (the same technique `tools/network.rs` uses for URL blocking)
//! for header injection. Both are page-context operations: they affect script-initiated requests
//! on the current document, not the top-level navigation request itself, and `set_cookies`/
//! `set_headers` do not survive a navigation.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::Engine;

/// One cookie, as read back by `get_cookies` or written by `set_cookies` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Cookie path, defaulting to `/` when writing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Engine {
    /// Read every cookie visible to `document.cookie` on the active tab (§6 `get_cookies`).
    ///
    /// # Errors
    ///
    /// Returns a session error if the active tab cannot be evaluated.
    pub async fn get_cookies(&mut self) -> Result<Vec<Cookie>> {
        let (page, _target_id) = self.active_page().await?;
        let raw = page
            .evaluate("document.cookie")
            .await
            .map_err(|e| EngineError::session_error(format!("read document.cookie: {e}")))?;

        let raw = raw.as_str().unwrap_or_default();
        Ok(raw
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .map(|(name, value)| Cookie { name: name.to_string(), value: value.to_string(), path: None })
            .collect())
    }

    /// Write `cookies` via `document.cookie` on the active tab (§6 `set_cookies`).
    ///
    /// # Errors
    ///
    /// Returns a session error if any cookie assignment fails to evaluate.
    pub async fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<()> {
        let (page, _target_id) = self.active_page().await?;
        for cookie in cookies {
            let path = cookie.path.as_deref().unwrap_or("/");
            let js = format!(
                "document.cookie = {:?}",
                format!("{}={}; path={}", cookie.name, cookie.value, path)
            );
            page.evaluate(&js)
                .await
                .map_err(|e| EngineError::session_error(format!("set cookie {}: {e}", cookie.name)))?;
        }
        Ok(())
    }

    /// Expire every cookie visible to `document.cookie` on the active tab (§6 `clear_cookies`).
    ///
    /// # Errors
    ///
    /// Returns a session error if the clearing script fails.
    pub async fn clear_cookies(&mut self) -> Result<()> {
        let (page, _target_id) = self.active_page().await?;
        let js = "document.cookie.split(';').forEach((c) => {
            const name = c.split('=')[0].trim();
            if (name) document.cookie = name + '=; path=/; expires=Thu, 01 Jan 1970 00:00:00 GMT';
        })";
        page.evaluate(js).await.map_err(|e| EngineError::session_error(format!("clear cookies: {e}")))?;
        Ok(())
    }

    /// Inject `headers` onto every `fetch`/`XMLHttpRequest` the active tab's page script issues
    /// from now on, until the next navigation (§6 `set_headers`).
    ///
    /// # Errors
    ///
    /// Returns a session error if the patching script fails to install.
    pub async fn set_headers(&mut self, headers: &[(String, String)]) -> Result<()> {
        let (page, _target_id) = self.active_page().await?;
        let pairs = serde_json::to_string(headers).map_err(|e| EngineError::session_error(e.to_string()))?;
        let js = format!(
            "(() => {{
                const extra = {pairs};
                const realFetch = window.fetch.bind(window);
                window.fetch = (input, init) => {{
                    const merged = Object.assign({{}}, init);
                    const h = new Headers(merged.headers || (typeof input !== 'string' ? input.headers : undefined));
                    extra.forEach(([k, v]) => h.set(k, v));
                    merged.headers = h;
                    return realFetch(input, merged);
                }};
                const realOpen = XMLHttpRequest.prototype.open;
                const realSend = XMLHttpRequest.prototype.send;
                XMLHttpRequest.prototype.open = function (...args) {{
                    this.__pendingHeaders = extra;
                    return realOpen.apply(this, args);
                }};
                XMLHttpRequest.prototype.send = function (...args) {{
                    (this.__pendingHeaders || []).forEach(([k, v]) => this.setRequestHeader(k, v));
                    return realSend.apply(this, args);
                }};
            }})()"
        );
        page.evaluate(&js).await.map_err(|e| EngineError::session_error(format!("install headers: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_round_trips_name_value() {
        let raw = "a=1; b=2";
        let cookies: Vec<Cookie> = raw
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .map(|(name, value)| Cookie { name: name.to_string(), value: value.to_string(), path: None })
            .collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name, "a");
        assert_eq!(cookies[1].value, "2");
    }
}
