use std::sync::Arc;

use super::{render_header, Notice, SubmitOutcome};
use crate::api::validation::{
    validate_email, validate_password, validate_required, ValidationErrorBuilder,
    ValidationErrors,
};
use crate::models::RegisterRequest;
use crate::routes::Screen;
use crate::AppState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, ValidationErrors> {
        let mut errors = ValidationErrorBuilder::new();
        errors.check("username", validate_required("Username", &self.username));
        errors.check("email", validate_email(&self.email));
        errors.check("password", validate_password(&self.password));
        errors.finish()?;

        Ok(RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

pub struct RegisterScreen {
    state: Arc<AppState>,
    pub form: RegisterForm,
    notice: Option<Notice>,
}

impl RegisterScreen {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            form: RegisterForm::default(),
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Create the account. The form is cleared on success only.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let request = match self.form.validate() {
            Ok(request) => request,
            Err(errors) => {
                self.notice = Some(Notice::error(errors.to_string()));
                return SubmitOutcome::Invalid(errors);
            }
        };

        match self.state.api.register(&request).await {
            Ok(_) => {
                self.notice = Some(Notice::success("User registered successfully!"));
                self.form = RegisterForm::default();
                SubmitOutcome::Accepted { navigate: None }
            }
            Err(e) => {
                self.notice = Some(Notice::error(e.message_or("Registration failed")));
                SubmitOutcome::Rejected
            }
        }
    }

    pub fn render(&self) -> String {
        render_header(Screen::Register.title(), self.notice.as_ref())
    }
}
