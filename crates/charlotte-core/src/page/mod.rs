//! Page Manager component (§4.8): tabs, dialog state, console/network capture.

pub mod console;
pub mod dialog;
pub mod manager;
pub mod network;

pub use console::{ConsoleBuffer, ConsoleLevel, ConsoleMessage};
pub use dialog::{DialogState, DialogType, PendingDialog};
pub use manager::PageManager;
pub use network::{NetworkBuffer, NetworkRequest, RequestStatus};
