use std::fmt::Write as _;
use std::sync::Arc;
use tracing::warn;

use super::{render_header, Notice, SubmitOutcome};
use crate::api::validation::{
    validate_password, validate_required, ValidationErrorBuilder, ValidationErrors,
};
use crate::models::LoginRequest;
use crate::routes::Screen;
use crate::session::Session;
use crate::AppState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username_or_email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_email: username_or_email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<LoginRequest, ValidationErrors> {
        let mut errors = ValidationErrorBuilder::new();
        errors.check(
            "usernameOrEmail",
            validate_required("Username or email", &self.username_or_email),
        );
        errors.check("password", validate_password(&self.password));
        errors.finish()?;

        Ok(LoginRequest {
            username_or_email: self.username_or_email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

pub struct LoginScreen {
    state: Arc<AppState>,
    pub form: LoginForm,
    notice: Option<Notice>,
}

impl LoginScreen {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            form: LoginForm::default(),
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Authenticate and, on a complete response, establish the session.
    ///
    /// Any outcome other than a 2xx carrying a token, user id and role
    /// leaves the session exactly as it was.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let request = match self.form.validate() {
            Ok(request) => request,
            Err(errors) => {
                self.notice = Some(Notice::error(errors.to_string()));
                return SubmitOutcome::Invalid(errors);
            }
        };

        let response = match self.state.api.login(&request).await {
            Ok(response) => response,
            Err(e) => {
                self.notice = Some(Notice::error(e.message_or("Login failed")));
                return SubmitOutcome::Rejected;
            }
        };

        let session = match (response.token, response.user_id, response.role) {
            (Some(token), Some(user_id), Some(role)) if !token.is_empty() => {
                Session::new(token, user_id, role)
            }
            _ => {
                warn!("Login response did not carry a complete identity");
                self.notice = Some(Notice::error("Login failed"));
                return SubmitOutcome::Rejected;
            }
        };

        if let Err(e) = self.state.session.login(session) {
            self.notice = Some(Notice::error(format!("Could not save session: {}", e)));
            return SubmitOutcome::Rejected;
        }

        self.notice = Some(Notice::success("Login successful!"));
        SubmitOutcome::Accepted {
            navigate: Some(Screen::TaskList),
        }
    }

    pub fn render(&self) -> String {
        let mut out = render_header(Screen::Login.title(), self.notice.as_ref());
        if let Some(session) = self.state.session.current() {
            let _ = writeln!(out, "Signed in as user {} ({})", session.user_id, session.role);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{state, user};
    use super::*;
    use crate::models::{Id, Role};
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_login_success_establishes_session() {
        let (state, transport) = state(None);
        transport.respond_json(
            StatusCode::OK,
            json!({"token": "T", "userId": "1", "role": "USER"}),
        );

        let mut screen = LoginScreen::new(state.clone());
        screen.form = LoginForm::new("a@b.com", "password1");
        let outcome = screen.submit().await;

        assert_eq!(
            outcome,
            SubmitOutcome::Accepted {
                navigate: Some(Screen::TaskList)
            }
        );
        assert_eq!(
            state.session.current(),
            Some(Session::new("T", Id::from("1"), Role::User))
        );
        assert_eq!(screen.notice(), Some(&Notice::success("Login successful!")));

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.url, "http://localhost:8080/api/auth/login");
        assert_eq!(
            sent.body,
            Some(json!({"usernameOrEmail": "a@b.com", "password": "password1"}))
        );
        assert_eq!(sent.bearer, None);
    }

    #[tokio::test]
    async fn test_login_failure_leaves_session_untouched() {
        let (state, transport) = state(None);
        transport.respond(StatusCode::UNAUTHORIZED, "Bad credentials");

        let mut screen = LoginScreen::new(state.clone());
        screen.form = LoginForm::new("a@b.com", "password1");

        assert_eq!(screen.submit().await, SubmitOutcome::Rejected);
        assert!(state.session.current().is_none());
        assert_eq!(screen.notice(), Some(&Notice::error("Bad credentials")));
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let (state, transport) = state(user());
        transport.respond(StatusCode::INTERNAL_SERVER_ERROR, "");

        let mut screen = LoginScreen::new(state.clone());
        screen.form = LoginForm::new("other", "password2");

        assert_eq!(screen.submit().await, SubmitOutcome::Rejected);
        assert_eq!(state.session.current(), user());
        assert_eq!(screen.notice(), Some(&Notice::error("Login failed")));
    }

    #[tokio::test]
    async fn test_ok_without_token_is_not_a_login() {
        let (state, transport) = state(None);
        transport.respond_json(StatusCode::OK, json!({"userId": 1, "role": "USER"}));

        let mut screen = LoginScreen::new(state.clone());
        screen.form = LoginForm::new("a@b.com", "password1");

        assert_eq!(screen.submit().await, SubmitOutcome::Rejected);
        assert!(state.session.current().is_none());
    }

    #[tokio::test]
    async fn test_network_failure() {
        let (state, transport) = state(None);
        transport.fail("connection refused");

        let mut screen = LoginScreen::new(state.clone());
        screen.form = LoginForm::new("a@b.com", "password1");

        assert_eq!(screen.submit().await, SubmitOutcome::Rejected);
        assert_eq!(screen.notice(), Some(&Notice::error("Network error")));
    }

    #[tokio::test]
    async fn test_short_password_is_blocked_before_sending() {
        let (state, transport) = state(None);

        let mut screen = LoginScreen::new(state);
        screen.form = LoginForm::new("a@b.com", "short");

        assert!(matches!(screen.submit().await, SubmitOutcome::Invalid(_)));
        assert_eq!(transport.request_count(), 0);
        assert!(screen.notice().unwrap().is_error());
    }
}
