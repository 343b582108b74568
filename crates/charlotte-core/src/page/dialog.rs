//! Per-tab dialog state machine (§4.8): `Idle` → `Blocked(dialog)` → `Idle`.

use serde::Serialize;

use crate::config::DialogAutoDismiss;

/// The kind of JS dialog the page raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogType {
    /// `window.alert(...)`.
    Alert,
    /// `window.confirm(...)`.
    Confirm,
    /// `window.prompt(...)`.
    Prompt,
    /// The `beforeunload` dialog.
    Beforeunload,
}

/// A dialog currently blocking the page (§3 `PendingDialog`).
#[derive(Debug, Clone, Serialize)]
pub struct PendingDialog {
    /// Dialog kind.
    #[serde(rename = "type")]
    pub dialog_type: DialogType,
    /// The dialog's message text.
    pub message: String,
    /// The prompt's default value, if `type == prompt`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// When the dialog appeared, as a Unix-epoch millisecond timestamp.
    pub timestamp: i64,
}

/// The dialog state machine for one tab.
#[derive(Debug, Default)]
pub enum DialogState {
    /// No dialog is blocking the page.
    #[default]
    Idle,
    /// A dialog is blocking the page until `accept`/`dismiss` resolves it.
    Blocked(PendingDialog),
}

impl DialogState {
    /// `true` if the page is currently blocked on a dialog.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }

    /// The pending dialog, if blocked.
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingDialog> {
        match self {
            Self::Idle => None,
            Self::Blocked(d) => Some(d),
        }
    }

    /// Transition `Idle -> Blocked(dialog)`. The dialog handle must be claimed by the caller
    /// *before* checking auto-dismiss policy, so a lost-event race cannot leave the engine
    /// thinking it is idle while the browser still waits on the dialog (§5 shared-resource
    /// policy).
    pub fn on_dialog_appeared(&mut self, dialog: PendingDialog) {
        *self = Self::Blocked(dialog);
    }

    /// Transition `Blocked -> Idle`, returning the dialog that was resolved, if any.
    pub fn resolve(&mut self) -> Option<PendingDialog> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Blocked(d) => {
                *self = Self::Idle;
                Some(d)
            }
        }
    }

    /// Whether `policy` says this dialog should be auto-resolved, and if so, whether to accept
    /// (`true`) or dismiss (`false`).
    #[must_use]
    pub fn auto_dismiss_action(policy: DialogAutoDismiss, dialog_type: DialogType) -> Option<bool> {
        match policy {
            DialogAutoDismiss::None => None,
            DialogAutoDismiss::AcceptAlerts => {
                (dialog_type == DialogType::Alert).then_some(true)
            }
            DialogAutoDismiss::AcceptAll => Some(true),
            DialogAutoDismiss::DismissAll => Some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialog() -> PendingDialog {
        PendingDialog {
            dialog_type: DialogType::Alert,
            message: "hi".into(),
            default_value: None,
            timestamp: 0,
        }
    }

    #[test]
    fn transitions_idle_blocked_idle() {
        let mut state = DialogState::default();
        assert!(!state.is_blocked());
        state.on_dialog_appeared(dialog());
        assert!(state.is_blocked());
        let resolved = state.resolve();
        assert!(resolved.is_some());
        assert!(!state.is_blocked());
    }

    #[test]
    fn auto_dismiss_policy_matrix() {
        assert_eq!(
            DialogState::auto_dismiss_action(DialogAutoDismiss::None, DialogType::Alert),
            None
        );
        assert_eq!(
            DialogState::auto_dismiss_action(DialogAutoDismiss::AcceptAlerts, DialogType::Alert),
            Some(true)
        );
        assert_eq!(
            DialogState::auto_dismiss_action(DialogAutoDismiss::AcceptAlerts, DialogType::Confirm),
            None
        );
        assert_eq!(
            DialogState::auto_dismiss_action(DialogAutoDismiss::AcceptAll, DialogType::Confirm),
            Some(true)
        );
        assert_eq!(
            DialogState::auto_dismiss_action(DialogAutoDismiss::DismissAll, DialogType::Prompt),
            Some(false)
        );
    }
}
