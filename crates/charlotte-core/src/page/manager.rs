//! Page Manager (§4.8): tabs, dialog state, and console/network capture, keyed by CDP target id.
//!
//! Mirrors the teacher's `ContextState`/`on_page` subscription pattern: a new tab's console
//! handler and dialog handler are wired up the moment the page appears, so nothing opened
//! outside our own `open_tab` call (a target-blank link, a popup) goes uncaptured.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use viewpoint_core::{BrowserContext, Dialog, HandlerId, Page};

use crate::config::DialogAutoDismiss;
use crate::error::{EngineError, Result};
use crate::page::console::{ConsoleBuffer, ConsoleLevel, ConsoleMessage};
use crate::page::dialog::{DialogState, DialogType, PendingDialog};
use crate::page::network::NetworkBuffer;

/// Engine-side state attached to one open tab.
struct Tab {
    console: Arc<RwLock<ConsoleBuffer>>,
    network: Arc<RwLock<NetworkBuffer>>,
    dialog: Arc<RwLock<DialogState>>,
    /// The live CDP dialog handle backing `dialog`, held only while `dialog` is `Blocked`.
    /// `DialogState` carries just the serializable metadata; the handle itself is kept here so a
    /// later `accept`/`dismiss` call can still resolve the dialog that raised it.
    dialog_handle: Arc<RwLock<Option<Dialog>>>,
}

impl Tab {
    fn new() -> Self {
        Self {
            console: Arc::new(RwLock::new(ConsoleBuffer::new())),
            network: Arc::new(RwLock::new(NetworkBuffer::new())),
            dialog: Arc::new(RwLock::new(DialogState::default())),
            dialog_handle: Arc::new(RwLock::new(None)),
        }
    }
}

/// Owns every open tab in one browser context and the per-tab state attached to it.
pub struct PageManager {
    context: BrowserContext,
    tabs: Arc<RwLock<HashMap<String, Tab>>>,
    /// Insertion order of target ids, for stable `list_tabs` ordering and index-based lookup.
    order: Arc<RwLock<Vec<String>>>,
    active: Arc<RwLock<Option<String>>>,
    dialog_policy: DialogAutoDismiss,
    _page_handler: HandlerId,
}

impl PageManager {
    /// Wrap `context`, wiring console/dialog capture onto every page it already has or ever
    /// creates.
    ///
    /// # Errors
    ///
    /// Returns an error if the context's existing pages cannot be enumerated.
    pub async fn new(context: BrowserContext, dialog_policy: DialogAutoDismiss) -> Result<Self> {
        let tabs: Arc<RwLock<HashMap<String, Tab>>> = Arc::new(RwLock::new(HashMap::new()));
        let order: Arc<RwLock<Vec<String>>> = Arc::new(RwLock::new(Vec::new()));
        let active: Arc<RwLock<Option<String>>> = Arc::new(RwLock::new(None));

        let tabs_for_handler = tabs.clone();
        let order_for_handler = order.clone();
        let active_for_handler = active.clone();
        let page_handler = context
            .on_page(move |page: Page| {
                let tabs = tabs_for_handler.clone();
                let order = order_for_handler.clone();
                let active = active_for_handler.clone();
                async move {
                    let target_id = page.target_id().to_string();
                    let tab = Tab::new();

                    let console_buffer = tab.console.clone();
                    page.on_console(move |msg| {
                        let buffer = console_buffer.clone();
                        async move {
                            let level = classify_console_type(&msg.type_().to_string());
                            let location = msg.location();
                            buffer.write().await.push(ConsoleMessage {
                                level,
                                text: msg.text(),
                                timestamp: msg.timestamp(),
                                url: location.as_ref().map(|l| l.url.clone()),
                                line_number: location.map(|l| l.line_number),
                            });
                        }
                    })
                    .await;

                    let dialog_state = tab.dialog.clone();
                    let dialog_handle = tab.dialog_handle.clone();
                    page.on_dialog(move |dialog| {
                        let state = dialog_state.clone();
                        let handle = dialog_handle.clone();
                        async move {
                            let dialog_type = classify_dialog_type(&dialog.dialog_type().to_string());
                            // Claim the dialog before any auto-dismiss decision is made, so the
                            // state machine can never observe an event it didn't record.
                            state.write().await.on_dialog_appeared(PendingDialog {
                                dialog_type,
                                message: dialog.message().to_string(),
                                default_value: dialog.default_value(),
                                timestamp: dialog.timestamp_millis(),
                            });

                            match DialogState::auto_dismiss_action(dialog_policy, dialog_type) {
                                Some(true) => {
                                    let _ = dialog.accept(None).await;
                                    state.write().await.resolve();
                                }
                                Some(false) => {
                                    let _ = dialog.dismiss().await;
                                    state.write().await.resolve();
                                }
                                None => {
                                    *handle.write().await = Some(dialog);
                                }
                            }
                        }
                    })
                    .await;

                    tabs.write().await.insert(target_id.clone(), tab);
                    order.write().await.push(target_id.clone());
                    active.write().await.get_or_insert(target_id);
                }
            })
            .await;

        let manager = Self {
            context,
            tabs,
            order,
            active,
            dialog_policy,
            _page_handler: page_handler,
        };

        for page in manager.context.pages().await.map_err(|e| EngineError::session_error(e.to_string()))? {
            let target_id = page.target_id().to_string();
            manager.tabs.write().await.entry(target_id.clone()).or_insert_with(Tab::new);
            let mut order = manager.order.write().await;
            if !order.contains(&target_id) {
                order.push(target_id.clone());
            }
            manager.active.write().await.get_or_insert(target_id);
        }

        Ok(manager)
    }

    /// Open a new tab, making it active, and return its target id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying page cannot be created.
    pub async fn open_tab(&mut self) -> Result<String> {
        let page = self
            .context
            .new_page()
            .await
            .map_err(|e| EngineError::session_error(e.to_string()))?;
        let target_id = page.target_id().to_string();
        *self.active.write().await = Some(target_id.clone());
        Ok(target_id)
    }

    /// Switch the active tab.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ElementNotFound`]-shaped [`EngineError::SessionError`] if
    /// `target_id` names a tab that is not (or no longer) open.
    pub async fn switch_tab(&mut self, target_id: &str) -> Result<()> {
        if !self.tabs.read().await.contains_key(target_id) {
            return Err(EngineError::session_error(format!("no such tab: {target_id}")));
        }
        *self.active.write().await = Some(target_id.to_string());
        Ok(())
    }

    /// Close a tab. Closing the active tab falls back to the next remaining tab in open order,
    /// or to `None` if it was the last one.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying page cannot be closed.
    pub async fn close_tab(&mut self, target_id: &str) -> Result<()> {
        let pages = self.context.pages().await.map_err(|e| EngineError::session_error(e.to_string()))?;
        if let Some(mut page) = pages.into_iter().find(|p| p.target_id() == target_id) {
            page.close().await.map_err(|e| EngineError::session_error(e.to_string()))?;
        }

        self.tabs.write().await.remove(target_id);
        self.order.write().await.retain(|id| id != target_id);

        let mut active = self.active.write().await;
        if active.as_deref() == Some(target_id) {
            *active = self.order.read().await.first().cloned();
        }
        Ok(())
    }

    /// List open tabs as `(target_id, url)` pairs, in open order.
    ///
    /// # Errors
    ///
    /// Returns an error if pages cannot be enumerated.
    pub async fn list_tabs(&self) -> Result<Vec<(String, String)>> {
        let pages = self.context.pages().await.map_err(|e| EngineError::session_error(e.to_string()))?;
        let mut by_target: HashMap<String, String> = HashMap::new();
        for page in pages {
            let url = page.url().await.unwrap_or_default();
            by_target.insert(page.target_id().to_string(), url);
        }

        Ok(self
            .order
            .read()
            .await
            .iter()
            .filter_map(|id| by_target.get(id).map(|url| (id.clone(), url.clone())))
            .collect())
    }

    /// The currently active page, or `None` if every tab has been closed.
    ///
    /// # Errors
    ///
    /// Returns an error if pages cannot be enumerated.
    pub async fn active_page(&self) -> Result<Option<Page>> {
        let Some(target_id) = self.active.read().await.clone() else { return Ok(None) };
        let pages = self.context.pages().await.map_err(|e| EngineError::session_error(e.to_string()))?;
        Ok(pages.into_iter().find(|p| p.target_id() == target_id))
    }

    /// The active tab's target id, if any.
    pub async fn active_target_id(&self) -> Option<String> {
        self.active.read().await.clone()
    }

    /// Buffered console messages for `target_id` at or above `minimum` severity.
    pub async fn console_messages(&self, target_id: &str, minimum: ConsoleLevel) -> Vec<crate::page::console::ConsoleMessage> {
        let tabs = self.tabs.read().await;
        let Some(tab) = tabs.get(target_id) else { return Vec::new() };
        tab.console.read().await.messages(minimum).into_iter().cloned().collect()
    }

    /// Buffered network requests for `target_id`, optionally filtered by URL substring.
    pub async fn network_requests(
        &self,
        target_id: &str,
        url_contains: Option<&str>,
    ) -> Vec<crate::page::network::NetworkRequest> {
        let tabs = self.tabs.read().await;
        let Some(tab) = tabs.get(target_id) else { return Vec::new() };
        tab.network.read().await.requests(url_contains).into_iter().cloned().collect()
    }

    /// Pull fresh entries from the Resource Timing API into `target_id`'s network buffer.
    ///
    /// viewpoint-core exposes no live CDP Network-domain event hook (unlike `on_console`/
    /// `on_dialog`), so capture here is pull-based: the same `performance.getEntriesByType`
    /// technique the teacher's network tool uses, polled on demand rather than pushed. Entries
    /// already recorded (by url+startTime) are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if `target_id` names a closed tab or JS evaluation fails.
    pub async fn refresh_network(&self, target_id: &str, page: &Page) -> Result<()> {
        const POLL_JS: &str = "performance.getEntriesByType('resource').map(e => ({ \
            key: e.name + ':' + e.startTime, url: e.name, status_code: e.responseStatus || null, \
            timestamp: e.startTime }))";

        let tabs = self.tabs.read().await;
        let tab = tabs.get(target_id).ok_or_else(|| EngineError::session_error(format!("no such tab: {target_id}")))?;

        let raw = page.evaluate(POLL_JS).await.map_err(|e| EngineError::evaluation_error(e.to_string()))?;
        let entries: Vec<serde_json::Value> = raw.as_array().cloned().unwrap_or_default();

        let mut buffer = tab.network.write().await;
        let seen: std::collections::HashSet<String> =
            buffer.requests(None).into_iter().map(|r| r.request_id.clone()).collect();

        for entry in entries {
            let Some(key) = entry.get("key").and_then(|v| v.as_str()) else { continue };
            if seen.contains(key) {
                continue;
            }
            let url = entry.get("url").and_then(|v| v.as_str()).unwrap_or_default().to_string();
            let status_code = entry.get("status_code").and_then(serde_json::Value::as_u64).map(|v| v as u16);
            let timestamp = entry.get("timestamp").and_then(serde_json::Value::as_f64).unwrap_or(0.0);

            buffer.push(crate::page::network::NetworkRequest {
                request_id: key.to_string(),
                url,
                method: "GET".to_string(),
                status: if status_code.is_some() {
                    crate::page::network::RequestStatus::Completed
                } else {
                    crate::page::network::RequestStatus::Pending
                },
                status_code,
                mime_type: None,
                error: None,
                timestamp,
            });
        }

        Ok(())
    }

    /// The pending dialog blocking `target_id`, if any.
    pub async fn pending_dialog(&self, target_id: &str) -> Option<PendingDialog> {
        let tabs = self.tabs.read().await;
        let tab = tabs.get(target_id)?;
        tab.dialog.read().await.pending().cloned()
    }

    /// Resolve the dialog blocking `target_id`, if any; `Ok(None)` if the tab wasn't blocked.
    pub async fn take_pending_dialog(&self, target_id: &str) -> Option<PendingDialog> {
        let tabs = self.tabs.read().await;
        let tab = tabs.get(target_id)?;
        tab.dialog.write().await.resolve()
    }

    /// Accept or dismiss the dialog blocking `target_id` (§6 `dialog`), actually resolving it on
    /// the browser side via the [`Dialog`] handle retained since it appeared.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionError`] if `target_id` is not blocked on a dialog, or if the
    /// underlying `accept`/`dismiss` call fails.
    pub async fn resolve_dialog(&self, target_id: &str, accept: bool, prompt_text: Option<String>) -> Result<PendingDialog> {
        let tabs = self.tabs.read().await;
        let tab = tabs.get(target_id).ok_or_else(|| EngineError::session_error(format!("no such tab: {target_id}")))?;

        let handle = tab
            .dialog_handle
            .write()
            .await
            .take()
            .ok_or_else(|| EngineError::session_error("no dialog is blocking this tab"))?;

        if accept {
            handle.accept(prompt_text).await.map_err(|e| EngineError::session_error(format!("accept dialog: {e}")))?;
        } else {
            handle.dismiss().await.map_err(|e| EngineError::session_error(format!("dismiss dialog: {e}")))?;
        }

        tab.dialog
            .write()
            .await
            .resolve()
            .ok_or_else(|| EngineError::session_error("dialog state already cleared"))
    }

    /// The configured auto-dismiss policy, consulted by the dialog tool handler after it has
    /// already claimed the dialog via [`Self::take_pending_dialog`].
    #[must_use]
    pub const fn dialog_policy(&self) -> DialogAutoDismiss {
        self.dialog_policy
    }
}

fn classify_console_type(raw: &str) -> ConsoleLevel {
    match raw {
        "error" | "assert" => ConsoleLevel::Error,
        "warning" => ConsoleLevel::Warning,
        "debug" => ConsoleLevel::Debug,
        _ => ConsoleLevel::Info,
    }
}

fn classify_dialog_type(raw: &str) -> DialogType {
    match raw {
        "confirm" => DialogType::Confirm,
        "prompt" => DialogType::Prompt,
        "beforeunload" => DialogType::Beforeunload,
        _ => DialogType::Alert,
    }
}
