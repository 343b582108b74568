//! Charlotte CLI
//!
//! Command-line entry point for the Charlotte page rendering and interaction engine. This
//! binary owns only config loading and process wiring (§1 Non-goals: no JSON-RPC/MCP server
//! lives here); it builds a [`CharlotteConfig`], drives the engine through a single `navigate`,
//! and prints the resulting `PageRepresentation` as JSON so the binary is useful standalone and
//! scriptable while an outer tool server is out of scope.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use charlotte_core::config::{AutoSnapshot, BrowserType, CharlotteConfig, DialogAutoDismiss, ViewportSize};
use charlotte_core::render::{DetailLevelOrDefault, RenderOptions};
use charlotte_core::Engine;
use tracing_subscriber::EnvFilter;

/// Charlotte - page rendering and interaction engine for autonomous browser agents.
#[derive(Parser, Debug)]
#[command(name = "charlotte")]
#[command(version)]
#[command(about = "Render a URL into a structured PageRepresentation")]
struct Args {
    /// URL to navigate to and render.
    url: String,

    /// Run the browser headless.
    #[arg(long, default_value_t = true)]
    headless: bool,

    /// Browser type (chromium or chrome).
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Viewport size (`WxH` format, e.g. "1280x720").
    #[arg(long, value_name = "WxH")]
    viewport_size: Option<String>,

    /// Connect to an already-running browser via this CDP endpoint instead of launching one.
    #[arg(long, value_name = "URL")]
    cdp_endpoint: Option<String>,

    /// Profile directory for browser launch persistence.
    #[arg(long, value_name = "PATH")]
    user_data_dir: Option<PathBuf>,

    /// Snapshot ring buffer depth, clamped to `[5, 500]`.
    #[arg(long, value_name = "N")]
    snapshot_depth: Option<u32>,

    /// When to auto-push a rendered representation onto the Snapshot Store.
    #[arg(long, value_name = "POLICY")]
    auto_snapshot: Option<String>,

    /// Policy for automatically resolving JS dialogs.
    #[arg(long, value_name = "POLICY")]
    dialog_auto_dismiss: Option<String>,

    /// Directory screenshots are persisted under.
    #[arg(long, value_name = "PATH")]
    screenshot_dir: Option<PathBuf>,

    /// Dev-mode static-serving sandbox root.
    #[arg(long, value_name = "PATH")]
    allowed_workspace_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = Args::parse();

    let viewport = args.viewport_size.as_deref().map(|s| {
        ViewportSize::parse(s).unwrap_or_else(|e| {
            eprintln!("Warning: {e}, using default viewport");
            ViewportSize::desktop()
        })
    });

    let browser_type = match args.browser.to_lowercase().as_str() {
        "chrome" => BrowserType::Chrome,
        _ => BrowserType::Chromium,
    };

    let auto_snapshot = args
        .auto_snapshot
        .as_deref()
        .map(|s| {
            s.parse::<AutoSnapshot>().unwrap_or_else(|e| {
                eprintln!("Warning: {e}, using default auto_snapshot policy");
                AutoSnapshot::default()
            })
        })
        .unwrap_or_default();

    let dialog_auto_dismiss = args
        .dialog_auto_dismiss
        .as_deref()
        .map(|s| {
            s.parse::<DialogAutoDismiss>().unwrap_or_else(|e| {
                eprintln!("Warning: {e}, using default dialog_auto_dismiss policy");
                DialogAutoDismiss::default()
            })
        })
        .unwrap_or_default();

    let defaults = CharlotteConfig::default();
    let config = CharlotteConfig {
        snapshot_depth: args.snapshot_depth.map_or(defaults.snapshot_depth, CharlotteConfig::clamp_depth),
        auto_snapshot,
        dialog_auto_dismiss,
        screenshot_dir: args.screenshot_dir.unwrap_or(defaults.screenshot_dir),
        allowed_workspace_root: args.allowed_workspace_root.unwrap_or(defaults.allowed_workspace_root),
        headless: args.headless,
        browser_type,
        viewport,
        cdp_endpoint: args.cdp_endpoint,
        user_data_dir: args.user_data_dir,
    };

    let mut engine = Engine::new(config).await?;

    let options = RenderOptions { detail: DetailLevelOrDefault::default(), selector: None };
    let result = engine.navigate(&args.url, options).await;

    engine.shutdown().await;

    let page = result?;
    println!("{}", serde_json::to_string_pretty(&page)?);

    Ok(())
}
