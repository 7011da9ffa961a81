//! Screens: one per navigable view.
//!
//! Every screen follows the same shape. Opening it checks the route gate,
//! then fetches through the API client while in [`ViewState::Loading`], and
//! ends in `Loaded` or `Error`. Actions report their result as a [`Notice`]
//! that stays until dismissed or replaced, and never wipe rows already on
//! screen.

mod admin_users;
mod login;
mod register;
mod task_form;
mod task_list;

pub use admin_users::AdminUsersScreen;
pub use login::{LoginForm, LoginScreen};
pub use register::{RegisterForm, RegisterScreen};
pub use task_form::{CreateTaskScreen, EditTaskScreen, TaskForm};
pub use task_list::TaskListScreen;

use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::api::validation::ValidationErrors;
use crate::routes::Screen;

/// Lifecycle of a screen's data
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> ViewState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Inline, dismissible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }

    fn render(&self) -> String {
        let icon = match self.kind {
            NoticeKind::Success => "[OK]",
            NoticeKind::Error => "[!!]",
        };
        format!("{} {}", icon, self.message)
    }
}

/// Result of submitting a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blocked client-side; nothing was sent
    Invalid(ValidationErrors),
    /// Not sent (no session) or sent and refused
    Rejected,
    /// Sent and accepted; optionally move to another screen
    Accepted { navigate: Option<Screen> },
}

/// Result of a list-row action such as delete or block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The user declined the confirmation; nothing was sent
    Declined,
    Failed,
    /// Another mutation of the same resource is still pending
    Busy,
}

/// Asks the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Per-resource guard against overlapping mutations.
///
/// A second mutation of a resource is refused while the first is pending,
/// instead of letting whichever response lands last decide what is shown.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, or `None` if it is already claimed
    pub fn try_begin(&self, key: impl Into<String>) -> Option<InFlightGuard> {
        let key = key.into();
        if self.keys.lock().insert(key.clone()) {
            Some(InFlightGuard {
                keys: self.keys.clone(),
                key,
            })
        } else {
            None
        }
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.keys.lock().contains(key)
    }
}

/// Releases its key on drop
#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys.lock().remove(&self.key);
    }
}

pub const BUSY_MESSAGE: &str = "A request for this item is already in progress.";

/// Title, underline and the current notice, shared by every screen
fn render_header(title: &str, notice: Option<&Notice>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", title);
    if let Some(notice) = notice {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", notice.render());
    }
    let _ = writeln!(out);
    out
}

/// Truncate a string to max chars with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
