//! Tool surface (§6): one module per verb family, each a set of `impl Engine` methods.
//!
//! The outer transport (MCP server, CLI REPL, ...) is out of scope for this crate — these are
//! plain async methods, not `#[async_trait] impl Tool` the way the teacher's one-tool-per-file
//! layout wires each verb into an MCP dispatcher.

pub mod configure;
pub mod cookies;
pub mod dev;
pub mod dialog;
pub mod diff;
pub mod evaluate;
pub mod interact;
pub mod navigation;
pub mod network;
pub mod observe;
pub mod pointer;
pub mod screenshot;
pub mod tabs;
pub mod viewport;
pub mod wait;
