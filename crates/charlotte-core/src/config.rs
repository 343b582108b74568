//! Engine-wide configuration.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Policy for when the engine automatically pushes a render onto the Snapshot Store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoSnapshot {
    /// Push a snapshot for both `observe` and action renders.
    #[default]
    EveryAction,
    /// Push a snapshot only for `observe` renders.
    ObserveOnly,
    /// Never auto-push; callers must pass `force_snapshot`.
    Manual,
}

impl FromStr for AutoSnapshot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "every_action" => Ok(Self::EveryAction),
            "observe_only" => Ok(Self::ObserveOnly),
            "manual" => Ok(Self::Manual),
            other => Err(format!("unknown auto_snapshot policy: {other}")),
        }
    }
}

/// Policy for automatically resolving JS dialogs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogAutoDismiss {
    /// Never auto-resolve; dialogs block until the agent calls `dialog`.
    #[default]
    None,
    /// Auto-accept `alert` dialogs only.
    AcceptAlerts,
    /// Auto-accept all dialog types.
    AcceptAll,
    /// Auto-dismiss all dialog types.
    DismissAll,
}

impl FromStr for DialogAutoDismiss {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "accept_alerts" => Ok(Self::AcceptAlerts),
            "accept_all" => Ok(Self::AcceptAll),
            "dismiss_all" => Ok(Self::DismissAll),
            other => Err(format!("unknown dialog_auto_dismiss policy: {other}")),
        }
    }
}

/// Which browser binary family to launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    /// Bundled/system Chromium.
    #[default]
    Chromium,
    /// System Chrome.
    Chrome,
}

/// A viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ViewportSize {
    /// Construct a viewport directly.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a `WxH` string, e.g. `"1280x720"`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| format!("expected WxH format, got {s:?}"))?;
        let width: u32 = w.trim().parse().map_err(|_| format!("invalid width: {w}"))?;
        let height: u32 = h.trim().parse().map_err(|_| format!("invalid height: {h}"))?;
        Ok(Self { width, height })
    }

    /// The `375x667` mobile device preset.
    #[must_use]
    pub const fn mobile() -> Self {
        Self::new(375, 667)
    }

    /// The `768x1024` tablet device preset.
    #[must_use]
    pub const fn tablet() -> Self {
        Self::new(768, 1024)
    }

    /// The `1280x720` desktop device preset.
    #[must_use]
    pub const fn desktop() -> Self {
        Self::new(1280, 720)
    }
}

/// Minimum snapshot ring buffer depth.
pub const MIN_SNAPSHOT_DEPTH: u32 = 5;
/// Maximum snapshot ring buffer depth.
pub const MAX_SNAPSHOT_DEPTH: u32 = 500;
/// Default snapshot ring buffer depth.
pub const DEFAULT_SNAPSHOT_DEPTH: u32 = 50;

/// Engine-wide configuration, covering both the rendering/interaction policy (§3) and the
/// browser-launch knobs the Browser Manager needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharlotteConfig {
    /// Snapshot ring buffer depth, clamped to `[5, 500]`.
    pub snapshot_depth: u32,
    /// When to auto-push a rendered representation onto the Snapshot Store.
    pub auto_snapshot: AutoSnapshot,
    /// Policy for automatically resolving JS dialogs.
    pub dialog_auto_dismiss: DialogAutoDismiss,
    /// Directory screenshots are persisted under.
    pub screenshot_dir: PathBuf,
    /// Dev-mode static-serving sandbox root.
    pub allowed_workspace_root: PathBuf,
    /// Run the browser headless.
    pub headless: bool,
    /// Which browser binary family to launch.
    pub browser_type: BrowserType,
    /// Initial viewport size, if overridden.
    pub viewport: Option<ViewportSize>,
    /// Connect to an already-running browser via this CDP endpoint instead of launching one.
    pub cdp_endpoint: Option<String>,
    /// Profile directory for browser launch persistence.
    pub user_data_dir: Option<PathBuf>,
}

impl Default for CharlotteConfig {
    fn default() -> Self {
        Self {
            snapshot_depth: DEFAULT_SNAPSHOT_DEPTH,
            auto_snapshot: AutoSnapshot::default(),
            dialog_auto_dismiss: DialogAutoDismiss::default(),
            screenshot_dir: PathBuf::from(".charlotte-screenshots"),
            allowed_workspace_root: PathBuf::from("."),
            headless: true,
            browser_type: BrowserType::default(),
            viewport: None,
            cdp_endpoint: None,
            user_data_dir: None,
        }
    }
}

impl CharlotteConfig {
    /// Clamp a requested snapshot depth into the supported range.
    #[must_use]
    pub const fn clamp_depth(depth: u32) -> u32 {
        if depth < MIN_SNAPSHOT_DEPTH {
            MIN_SNAPSHOT_DEPTH
        } else if depth > MAX_SNAPSHOT_DEPTH {
            MAX_SNAPSHOT_DEPTH
        } else {
            depth
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_parses_wxh() {
        assert_eq!(ViewportSize::parse("1280x720").unwrap(), ViewportSize::new(1280, 720));
        assert!(ViewportSize::parse("nonsense").is_err());
    }

    #[test]
    fn depth_clamped_to_bounds() {
        assert_eq!(CharlotteConfig::clamp_depth(1), MIN_SNAPSHOT_DEPTH);
        assert_eq!(CharlotteConfig::clamp_depth(10_000), MAX_SNAPSHOT_DEPTH);
        assert_eq!(CharlotteConfig::clamp_depth(50), 50);
    }

    #[test]
    fn auto_snapshot_from_str() {
        assert_eq!(AutoSnapshot::from_str("every_action").unwrap(), AutoSnapshot::EveryAction);
        assert!(AutoSnapshot::from_str("bogus").is_err());
    }
}
