use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

use super::{render_header, truncate, ActionOutcome, Confirm, Notice, ViewState, BUSY_MESSAGE};
use crate::models::{Id, Task};
use crate::routes::Screen;
use crate::AppState;

pub const DELETE_TASK_PROMPT: &str = "Are you sure you want to delete this task?";

pub struct TaskListScreen {
    state: Arc<AppState>,
    view: ViewState<Vec<Task>>,
    notice: Option<Notice>,
}

impl TaskListScreen {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            view: ViewState::Loading,
            notice: None,
        }
    }

    pub fn view(&self) -> &ViewState<Vec<Task>> {
        &self.view
    }

    pub fn tasks(&self) -> &[Task] {
        self.view.loaded().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Fetch the full list. Also used to refresh after a mutation.
    pub async fn load(&mut self) {
        if let Some(message) = self.state.gate.check(Screen::TaskList).message() {
            self.view = ViewState::Error(message.to_string());
            return;
        }

        self.view = ViewState::Loading;
        self.view = match self.state.api.list_tasks().await {
            Ok(tasks) => {
                debug!(count = tasks.len(), "Tasks loaded");
                ViewState::Loaded(tasks)
            }
            Err(e) => ViewState::Error(e.message_or("Failed to fetch tasks.")),
        };
    }

    /// Delete a task after confirmation, then drop its row locally.
    pub async fn delete(&mut self, id: &Id, confirm: &mut dyn Confirm) -> ActionOutcome {
        if let Some(message) = self.state.gate.check(Screen::TaskList).message() {
            self.notice = Some(Notice::error(message));
            return ActionOutcome::Failed;
        }

        if !confirm.confirm(DELETE_TASK_PROMPT) {
            return ActionOutcome::Declined;
        }

        let Some(_guard) = self.state.in_flight.try_begin(format!("task:{}", id)) else {
            self.notice = Some(Notice::error(BUSY_MESSAGE));
            return ActionOutcome::Busy;
        };

        match self.state.api.delete_task(id).await {
            Ok(()) => {
                if let ViewState::Loaded(tasks) = &mut self.view {
                    tasks.retain(|task| &task.id != id);
                }
                self.notice = Some(Notice::success("Task deleted."));
                ActionOutcome::Completed
            }
            Err(e) => {
                self.notice = Some(Notice::error(e.message_or("Failed to delete task.")));
                ActionOutcome::Failed
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = render_header(Screen::TaskList.title(), self.notice.as_ref());

        let tasks = match &self.view {
            ViewState::Loading => {
                let _ = writeln!(out, "Loading tasks...");
                return out;
            }
            ViewState::Error(message) => {
                let _ = writeln!(out, "[!!] {}", message);
                return out;
            }
            ViewState::Loaded(tasks) => tasks,
        };

        if tasks.is_empty() {
            let _ = writeln!(out, "No tasks found.");
            return out;
        }

        let _ = writeln!(
            out,
            "{:<8}  {:<24}  {:<32}  {:<12}  {:<8}  {:<16}",
            "ID", "TITLE", "DESCRIPTION", "STATUS", "URGENCY", "END DATE"
        );
        let _ = writeln!(out, "{}", "-".repeat(110));

        for task in tasks {
            let _ = writeln!(
                out,
                "{:<8}  {:<24}  {:<32}  {:<12}  {:<8}  {:<16}",
                truncate(task.id.as_str(), 8),
                truncate(&task.title, 24),
                truncate(task.description.as_deref().unwrap_or("-"), 32),
                task.status.label(),
                task.urgency,
                task.date_end
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{state, user, Scripted};
    use super::*;
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    fn two_tasks() -> serde_json::Value {
        json!([
            {
                "id": 1, "title": "Buy milk", "description": "2 liters",
                "dateEnd": "2025-05-01T10:00:00", "status": "TO_DO", "urgency": "LOW"
            },
            {
                "id": 2, "title": "Ship release", "description": null,
                "dateEnd": "2025-05-02T18:30:00", "status": "IN_PROGRESS", "urgency": "HIGH"
            }
        ])
    }

    #[tokio::test]
    async fn test_requires_session() {
        let (state, transport) = state(None);
        let mut screen = TaskListScreen::new(state);

        screen.load().await;

        assert_eq!(
            screen.view(),
            &ViewState::Error("You must be logged in to view tasks.".to_string())
        );
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_load_and_render() {
        let (state, transport) = state(user());
        transport.respond_json(StatusCode::OK, two_tasks());

        let mut screen = TaskListScreen::new(state);
        assert!(screen.view().is_loading());
        screen.load().await;

        assert_eq!(screen.tasks().len(), 2);
        let sent = transport.last_request().unwrap();
        assert_eq!(sent.method, Method::GET);
        assert_eq!(sent.url, "http://localhost:8080/api/task");
        assert_eq!(sent.bearer.as_deref(), Some("T"));

        let rendered = screen.render();
        assert!(rendered.contains("Buy milk"));
        assert!(rendered.contains("IN PROGRESS"));
        assert!(rendered.contains("2025-05-02 18:30"));
    }

    #[tokio::test]
    async fn test_unreadable_due_date_shows_dash() {
        let (state, transport) = state(user());
        transport.respond_json(
            StatusCode::OK,
            json!([
                {"id": 1, "title": "Zoned", "dateEnd": "2025-05-01T10:00:00-05:00",
                 "status": "TO_DO", "urgency": "LOW"},
                {"id": 2, "title": "Garbled", "dateEnd": "tomorrow-ish",
                 "status": "TO_DO", "urgency": "LOW"}
            ]),
        );

        let mut screen = TaskListScreen::new(state);
        screen.load().await;

        assert_eq!(screen.tasks().len(), 2);
        let rendered = screen.render();
        assert!(rendered.contains("2025-05-01 10:00"));
        let garbled = rendered.lines().find(|l| l.contains("Garbled")).unwrap();
        assert!(garbled.trim_end().ends_with('-'));
    }

    #[tokio::test]
    async fn test_refetch_without_mutation_is_stable() {
        let (state, transport) = state(user());
        transport.respond_json(StatusCode::OK, two_tasks());
        transport.respond_json(StatusCode::OK, two_tasks());

        let mut screen = TaskListScreen::new(state);
        screen.load().await;
        let first = screen.render();
        screen.load().await;

        assert_eq!(screen.render(), first);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_list() {
        let (state, transport) = state(user());
        transport.respond_json(StatusCode::OK, json!([]));

        let mut screen = TaskListScreen::new(state);
        screen.load().await;

        assert!(screen.render().contains("No tasks found."));
    }

    #[tokio::test]
    async fn test_unauthorized_shows_body_and_keeps_session() {
        let (state, transport) = state(user());
        transport.respond(StatusCode::UNAUTHORIZED, "JWT expired at 2025-01-01");

        let mut screen = TaskListScreen::new(state.clone());
        screen.load().await;

        assert_eq!(screen.view().error(), Some("JWT expired at 2025-01-01"));
        assert!(state.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let (state, transport) = state(user());
        transport.respond_json(StatusCode::OK, two_tasks());

        let mut screen = TaskListScreen::new(state);
        screen.load().await;

        let mut confirm = Scripted::new(false);
        let outcome = screen.delete(&Id::from("1"), &mut confirm).await;

        assert_eq!(outcome, ActionOutcome::Declined);
        assert_eq!(confirm.prompts, vec![DELETE_TASK_PROMPT.to_string()]);
        assert_eq!(transport.request_count(), 1);
        assert_eq!(screen.tasks().len(), 2);
    }

    #[tokio::test]
    async fn test_confirmed_delete_removes_row_without_refetch() {
        let (state, transport) = state(user());
        transport.respond_json(StatusCode::OK, two_tasks());
        transport.respond(StatusCode::OK, "");

        let mut screen = TaskListScreen::new(state);
        screen.load().await;

        let mut confirm = Scripted::new(true);
        let outcome = screen.delete(&Id::from("1"), &mut confirm).await;

        assert_eq!(outcome, ActionOutcome::Completed);
        assert_eq!(transport.request_count(), 2);
        let sent = transport.last_request().unwrap();
        assert_eq!(sent.method, Method::DELETE);
        assert_eq!(sent.url, "http://localhost:8080/api/task/1");

        let remaining: Vec<_> = screen.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(remaining, vec!["2"]);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_rows() {
        let (state, transport) = state(user());
        transport.respond_json(StatusCode::OK, two_tasks());
        transport.respond(StatusCode::FORBIDDEN, "");

        let mut screen = TaskListScreen::new(state);
        screen.load().await;

        let outcome = screen.delete(&Id::from("2"), &mut Scripted::new(true)).await;

        assert_eq!(outcome, ActionOutcome::Failed);
        assert_eq!(screen.tasks().len(), 2);
        assert_eq!(
            screen.notice(),
            Some(&Notice::error("Failed to delete task."))
        );
    }

    #[tokio::test]
    async fn test_delete_while_pending_is_refused() {
        let (state, transport) = state(user());

        let _pending = state.in_flight.try_begin("task:7").unwrap();
        let mut screen = TaskListScreen::new(state.clone());
        let outcome = screen.delete(&Id::from("7"), &mut Scripted::new(true)).await;

        assert_eq!(outcome, ActionOutcome::Busy);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_without_session() {
        let (state, transport) = state(None);
        let mut confirm = Scripted::new(true);

        let mut screen = TaskListScreen::new(state);
        let outcome = screen.delete(&Id::from("1"), &mut confirm).await;

        assert_eq!(outcome, ActionOutcome::Failed);
        assert_eq!(
            screen.notice(),
            Some(&Notice::error("You must be logged in to view tasks."))
        );
        assert!(confirm.prompts.is_empty());
        assert_eq!(transport.request_count(), 0);
    }
}
