use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info};

use super::{render_header, truncate, ActionOutcome, Confirm, Notice, ViewState, BUSY_MESSAGE};
use crate::models::{Id, User};
use crate::routes::Screen;
use crate::AppState;

pub const DELETE_USER_PROMPT: &str = "Are you sure you want to delete this user and their tasks?";
const USER_NOT_FOUND_MESSAGE: &str = "User not found";

pub struct AdminUsersScreen {
    state: Arc<AppState>,
    view: ViewState<Vec<User>>,
    notice: Option<Notice>,
}

impl AdminUsersScreen {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            view: ViewState::Loading,
            notice: None,
        }
    }

    pub fn view(&self) -> &ViewState<Vec<User>> {
        &self.view
    }

    pub fn users(&self) -> &[User] {
        self.view.loaded().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub async fn load(&mut self) {
        if let Some(message) = self.state.gate.check(Screen::AdminUsers).message() {
            self.view = ViewState::Error(message.to_string());
            return;
        }

        self.view = ViewState::Loading;
        self.refetch().await;
    }

    /// Reload the list, keeping the current rows if the reload fails
    async fn refetch(&mut self) {
        match self.state.api.list_users().await {
            Ok(users) => {
                debug!(count = users.len(), "Users loaded");
                self.view = ViewState::Loaded(users);
            }
            Err(e) => {
                let message = e.message_or("Failed to load users");
                if self.view.loaded().is_some() {
                    self.notice = Some(Notice::error(message));
                } else {
                    self.view = ViewState::Error(message);
                }
            }
        }
    }

    /// Flip a user between active and blocked, then reload the list.
    ///
    /// The new state is the negation of the one currently on screen, so the
    /// user must be in the loaded list.
    pub async fn toggle_block(&mut self, id: &Id) -> ActionOutcome {
        if let Some(message) = self.state.gate.check(Screen::AdminUsers).message() {
            self.notice = Some(Notice::error(message));
            return ActionOutcome::Failed;
        }

        let Some(active) = self
            .users()
            .iter()
            .find(|user| &user.id == id)
            .map(|user| user.active)
        else {
            self.notice = Some(Notice::error(USER_NOT_FOUND_MESSAGE));
            return ActionOutcome::Failed;
        };

        let Some(_guard) = self.state.in_flight.try_begin(format!("user:{}", id)) else {
            self.notice = Some(Notice::error(BUSY_MESSAGE));
            return ActionOutcome::Busy;
        };

        match self.state.api.set_user_active(id, !active).await {
            Ok(message) => {
                info!(user_id = %id, active = !active, "User status changed");
                self.notice = Some(Notice::success(message));
                self.refetch().await;
                ActionOutcome::Completed
            }
            Err(e) => {
                self.notice = Some(Notice::error(e.message_or("Failed to update user")));
                ActionOutcome::Failed
            }
        }
    }

    /// Delete a user and their tasks after confirmation, then reload the list
    pub async fn delete_user(&mut self, id: &Id, confirm: &mut dyn Confirm) -> ActionOutcome {
        if let Some(message) = self.state.gate.check(Screen::AdminUsers).message() {
            self.notice = Some(Notice::error(message));
            return ActionOutcome::Failed;
        }

        if !confirm.confirm(DELETE_USER_PROMPT) {
            return ActionOutcome::Declined;
        }

        let Some(_guard) = self.state.in_flight.try_begin(format!("user:{}", id)) else {
            self.notice = Some(Notice::error(BUSY_MESSAGE));
            return ActionOutcome::Busy;
        };

        match self.state.api.delete_user(id).await {
            Ok(message) => {
                info!(user_id = %id, "User deleted");
                self.notice = Some(Notice::success(message));
                self.refetch().await;
                ActionOutcome::Completed
            }
            Err(e) => {
                self.notice = Some(Notice::error(e.message_or("Failed to delete user")));
                ActionOutcome::Failed
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = render_header(Screen::AdminUsers.title(), self.notice.as_ref());

        let users = match &self.view {
            ViewState::Loading => {
                let _ = writeln!(out, "Loading users...");
                return out;
            }
            ViewState::Error(message) => {
                let _ = writeln!(out, "[!!] {}", message);
                return out;
            }
            ViewState::Loaded(users) => users,
        };

        if users.is_empty() {
            let _ = writeln!(out, "No users found.");
            return out;
        }

        let _ = writeln!(
            out,
            "{:<8}  {:<20}  {:<32}  {:<6}  {:<8}",
            "ID", "USERNAME", "EMAIL", "ROLE", "STATUS"
        );
        let _ = writeln!(out, "{}", "-".repeat(82));

        for user in users {
            let _ = writeln!(
                out,
                "{:<8}  {:<20}  {:<32}  {:<6}  {:<8}",
                truncate(user.id.as_str(), 8),
                truncate(&user.username, 20),
                truncate(&user.email, 32),
                user.role,
                user.status_label()
            );
        }

        out
    }
}
