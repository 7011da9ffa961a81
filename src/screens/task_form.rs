use std::fmt::Write as _;
use std::sync::Arc;

use super::{render_header, Notice, SubmitOutcome, ViewState, BUSY_MESSAGE};
use crate::api::validation::{
    parse_due_date, validate_required, ValidationErrorBuilder, ValidationErrors,
};
use crate::models::{due_date, Id, Task, TaskPayload, TaskStatus, Urgency};
use crate::routes::Screen;
use crate::AppState;

/// Editable task fields as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    /// Raw date-time input, e.g. `2025-06-01T17:00`
    pub date_end: String,
    pub status: TaskStatus,
    pub urgency: Urgency,
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            // Same precision as a datetime-local input
            date_end: task
                .date_end
                .map(|d| d.format("%Y-%m-%dT%H:%M").to_string())
                .unwrap_or_default(),
            status: task.status,
            urgency: task.urgency,
        }
    }

    /// Build the payload, or every field error if the form is incomplete
    pub fn validate(&self) -> Result<TaskPayload, ValidationErrors> {
        let mut errors = ValidationErrorBuilder::new();
        errors.check("title", validate_required("Title", &self.title));

        let date_end = match parse_due_date(&self.date_end) {
            Ok(date) => Some(date),
            Err(message) => {
                errors.add("dateEnd", message);
                None
            }
        };
        match (errors.finish(), date_end) {
            (Ok(()), Some(date_end)) => Ok(TaskPayload {
                title: self.title.trim().to_string(),
                description: self.description.clone(),
                date_end,
                status: self.status,
                urgency: self.urgency,
                owner_id: None,
            }),
            (result, _) => Err(result.err().unwrap_or_default()),
        }
    }

    fn render_fields(&self, out: &mut String) {
        let _ = writeln!(out, "Title:       {}", self.title);
        let _ = writeln!(
            out,
            "Description: {}",
            if self.description.is_empty() {
                "-"
            } else {
                self.description.as_str()
            }
        );
        let _ = writeln!(
            out,
            "End Date:    {}",
            due_date::parse(&self.date_end)
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| self.date_end.clone())
        );
        let _ = writeln!(out, "Status:      {}", self.status.label());
        let _ = writeln!(out, "Urgency:     {}", self.urgency);
    }
}

pub struct CreateTaskScreen {
    state: Arc<AppState>,
    pub form: TaskForm,
    notice: Option<Notice>,
}

impl CreateTaskScreen {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            form: TaskForm::default(),
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Create the task for the signed-in user. On success the form resets to
    /// its defaults and the task list is shown again.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if let Some(message) = self.state.gate.check(Screen::CreateTask).message() {
            self.notice = Some(Notice::error(message));
            return SubmitOutcome::Rejected;
        }

        let mut payload = match self.form.validate() {
            Ok(payload) => payload,
            Err(errors) => {
                self.notice = Some(Notice::error(errors.to_string()));
                return SubmitOutcome::Invalid(errors);
            }
        };

        // Signed out while the form was being checked
        let Some(session) = self.state.session.current() else {
            self.notice = Some(Notice::error(Screen::CreateTask.login_required_message()));
            return SubmitOutcome::Rejected;
        };
        payload.owner_id = Some(session.user_id);

        match self.state.api.create_task(&payload).await {
            Ok(()) => {
                self.notice = Some(Notice::success("Task created successfully!"));
                self.form = TaskForm::default();
                SubmitOutcome::Accepted {
                    navigate: Some(Screen::TaskList),
                }
            }
            Err(e) => {
                self.notice = Some(Notice::error(e.message_or("Failed to create task")));
                SubmitOutcome::Rejected
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = render_header(Screen::CreateTask.title(), self.notice.as_ref());
        self.form.render_fields(&mut out);
        out
    }
}

pub struct EditTaskScreen {
    state: Arc<AppState>,
    id: Id,
    view: ViewState<Task>,
    pub form: TaskForm,
    notice: Option<Notice>,
}

impl EditTaskScreen {
    pub fn new(state: Arc<AppState>, id: Id) -> Self {
        Self {
            state,
            id,
            view: ViewState::Loading,
            form: TaskForm::default(),
            notice: None,
        }
    }

    pub fn view(&self) -> &ViewState<Task> {
        &self.view
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Fetch the task and fill the form from it
    pub async fn load(&mut self) {
        if let Some(message) = self.state.gate.check(Screen::EditTask).message() {
            self.view = ViewState::Error(message.to_string());
            return;
        }

        self.view = ViewState::Loading;
        self.view = match self.state.api.get_task(&self.id).await {
            Ok(task) => {
                self.form = TaskForm::from_task(&task);
                ViewState::Loaded(task)
            }
            Err(e) => ViewState::Error(e.message_or("Failed to load task")),
        };
    }

    /// Save the form. On success the task list is shown again.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if let Some(message) = self.state.gate.check(Screen::EditTask).message() {
            self.notice = Some(Notice::error(message));
            return SubmitOutcome::Rejected;
        }

        let payload = match self.form.validate() {
            Ok(payload) => payload,
            Err(errors) => {
                self.notice = Some(Notice::error(errors.to_string()));
                return SubmitOutcome::Invalid(errors);
            }
        };

        let Some(_guard) = self.state.in_flight.try_begin(format!("task:{}", self.id)) else {
            self.notice = Some(Notice::error(BUSY_MESSAGE));
            return SubmitOutcome::Rejected;
        };

        match self.state.api.update_task(&self.id, &payload).await {
            Ok(()) => {
                self.notice = Some(Notice::success("Task updated successfully!"));
                SubmitOutcome::Accepted {
                    navigate: Some(Screen::TaskList),
                }
            }
            Err(e) => {
                self.notice = Some(Notice::error(e.message_or("Failed to update task")));
                SubmitOutcome::Rejected
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = render_header(Screen::EditTask.title(), self.notice.as_ref());
        match &self.view {
            ViewState::Loading => {
                let _ = writeln!(out, "Loading task...");
            }
            ViewState::Error(message) => {
                let _ = writeln!(out, "[!!] {}", message);
            }
            ViewState::Loaded(_) => {
                let _ = writeln!(out, "ID:          {}", self.id);
                self.form.render_fields(&mut out);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{state, user};
    use super::*;
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    fn filled() -> TaskForm {
        TaskForm {
            title: "Plan sprint".into(),
            description: "Backlog grooming".into(),
            date_end: "2025-07-01T09:00".into(),
            status: TaskStatus::InProgress,
            urgency: Urgency::Medium,
        }
    }

    #[test]
    fn test_form_validation_collects_all_fields() {
        let errors = TaskForm::default().validate().unwrap_err();
        assert!(errors.field("title").is_some());
        assert!(errors.field("dateEnd").is_some());
    }

    #[tokio::test]
    async fn test_empty_title_is_blocked_before_sending() {
        let (state, transport) = state(user());

        let mut screen = CreateTaskScreen::new(state);
        screen.form = TaskForm {
            title: String::new(),
            ..filled()
        };

        match screen.submit().await {
            SubmitOutcome::Invalid(errors) => {
                assert_eq!(errors.field("title").unwrap()[0], "Title is required");
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_create_sends_owner_and_resets_form() {
        let (state, transport) = state(user());
        transport.respond(StatusCode::OK, "{}");

        let mut screen = CreateTaskScreen::new(state);
        screen.form = filled();

        assert_eq!(
            screen.submit().await,
            SubmitOutcome::Accepted {
                navigate: Some(Screen::TaskList)
            }
        );
        assert_eq!(screen.form, TaskForm::default());
        assert_eq!(
            screen.notice(),
            Some(&Notice::success("Task created successfully!"))
        );

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.url, "http://localhost:8080/api/task");
        assert_eq!(
            sent.body,
            Some(json!({
                "title": "Plan sprint",
                "description": "Backlog grooming",
                "dateEnd": "2025-07-01T09:00:00",
                "status": "IN_PROGRESS",
                "urgency": "MEDIUM",
                "user_id": "1"
            }))
        );
    }

    #[tokio::test]
    async fn test_create_without_session() {
        let (state, transport) = state(None);

        let mut screen = CreateTaskScreen::new(state);
        screen.form = filled();

        assert_eq!(screen.submit().await, SubmitOutcome::Rejected);
        assert_eq!(
            screen.notice(),
            Some(&Notice::error("You must be logged in to create tasks."))
        );
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_anonymous_submit_asks_to_log_in() {
        let (state, transport) = state(None);

        // An empty form would fail validation, but the login check comes first
        let mut screen = CreateTaskScreen::new(state);
        assert_eq!(screen.submit().await, SubmitOutcome::Rejected);
        assert_eq!(
            screen.notice(),
            Some(&Notice::error("You must be logged in to create tasks."))
        );
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_anonymous_edit_submit_asks_to_log_in() {
        let (state, transport) = state(None);

        let mut screen = EditTaskScreen::new(state, Id::from("4"));
        assert_eq!(screen.submit().await, SubmitOutcome::Rejected);
        assert_eq!(
            screen.notice(),
            Some(&Notice::error("Authentication required."))
        );
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_create_failure_keeps_form() {
        let (state, transport) = state(user());
        transport.respond(StatusCode::BAD_REQUEST, "");

        let mut screen = CreateTaskScreen::new(state);
        screen.form = filled();

        assert_eq!(screen.submit().await, SubmitOutcome::Rejected);
        assert_eq!(screen.form, filled());
        assert_eq!(
            screen.notice(),
            Some(&Notice::error("Failed to create task"))
        );
    }

    #[tokio::test]
    async fn test_edit_loads_then_updates() {
        let (state, transport) = state(user());
        transport.respond_json(
            StatusCode::OK,
            json!({
                "id": 4, "title": "Old title", "description": "desc",
                "dateEnd": "2025-08-01T12:15:00", "status": "TO_DO", "urgency": "LOW"
            }),
        );
        transport.respond(StatusCode::OK, "");

        let mut screen = EditTaskScreen::new(state, Id::from("4"));
        screen.load().await;

        assert!(screen.view().loaded().is_some());
        assert_eq!(screen.form.title, "Old title");
        assert_eq!(screen.form.date_end, "2025-08-01T12:15");

        screen.form.title = "New title".into();
        screen.form.status = TaskStatus::Completed;

        assert_eq!(
            screen.submit().await,
            SubmitOutcome::Accepted {
                navigate: Some(Screen::TaskList)
            }
        );

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.method, Method::PUT);
        assert_eq!(sent.url, "http://localhost:8080/api/task/4");
        let body = sent.body.unwrap();
        assert_eq!(body["title"], "New title");
        assert_eq!(body["status"], "COMPLETED");
        assert_eq!(body["dateEnd"], "2025-08-01T12:15:00");
        assert!(body.get("user_id").is_none());
    }

    #[tokio::test]
    async fn test_edit_load_failure_uses_fallback() {
        let (state, transport) = state(user());
        transport.respond(StatusCode::NOT_FOUND, "");

        let mut screen = EditTaskScreen::new(state, Id::from("404"));
        screen.load().await;

        assert_eq!(screen.view().error(), Some("Failed to load task"));
        assert!(screen.render().contains("Failed to load task"));
    }

    #[tokio::test]
    async fn test_edit_requires_session() {
        let (state, transport) = state(None);

        let mut screen = EditTaskScreen::new(state, Id::from("4"));
        screen.load().await;

        assert_eq!(screen.view().error(), Some("Authentication required."));
        assert_eq!(transport.request_count(), 0);
    }
}
