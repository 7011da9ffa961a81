//! CLI module for the TaskBoard command-line client.
//!
//! Each subcommand drives one screen against the configured service:
//! - `register` / `login` / `logout` / `whoami` - Account and session
//! - `tasks list|create|edit|delete` - Task management
//! - `users list|toggle|delete` - User management (administrators)
//! - `config check` - Validate configuration file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::models::{Id, TaskStatus, Urgency};
use crate::routes::{NavItem, Screen};
use crate::screens::{
    ActionOutcome, AdminUsersScreen, Confirm, CreateTaskScreen, EditTaskScreen, LoginForm,
    LoginScreen, Notice, RegisterForm, RegisterScreen, SubmitOutcome, TaskForm, TaskListScreen,
};
use crate::AppState;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, about = "Command-line client for the TaskBoard service", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "taskboard.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Service URL, without the /api suffix (overrides the config file)
    #[arg(long, env = "TASKBOARD_API_URL")]
    pub api_url: Option<String>,

    /// Where the session is kept between runs (overrides the config file)
    #[arg(long, env = "TASKBOARD_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKBOARD_PASSWORD")]
        password: String,
    },

    /// Sign in and show your tasks
    Login {
        /// Username or email
        #[arg(short, long)]
        user: String,
        #[arg(long, env = "TASKBOARD_PASSWORD")]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user and the screens available to them
    Whoami,

    /// Task management commands
    #[command(subcommand)]
    Tasks(TasksCommands),

    /// User management commands (administrators only)
    #[command(subcommand)]
    Users(UsersCommands),

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Tasks subcommands
#[derive(Subcommand, Debug)]
pub enum TasksCommands {
    /// List your tasks
    List,
    /// Create a task
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Due date-time, e.g. 2025-06-01T17:00
        #[arg(long)]
        due: String,
        /// TO_DO, IN_PROGRESS or COMPLETED
        #[arg(long, default_value = "TO_DO")]
        status: TaskStatus,
        /// LOW, MEDIUM or HIGH
        #[arg(long, default_value = "LOW")]
        urgency: Urgency,
    },
    /// Edit a task; fields not given keep their current value
    Edit {
        id: Id,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        urgency: Option<Urgency>,
    },
    /// Delete a task
    Delete {
        id: Id,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Users subcommands
#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// List all users
    List,
    /// Block an active user, or unblock a blocked one
    Toggle { id: Id },
    /// Delete a user and their tasks
    Delete {
        id: Id,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

/// Asks on the terminal, or answers yes for `--yes`
pub struct TerminalConfirm {
    assume_yes: bool,
}

impl TerminalConfirm {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{} [y/N] ", prompt);
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, state: Arc<AppState>) -> Result<()> {
    match &cli.command {
        Commands::Register {
            username,
            email,
            password,
        } => cmd_register(state, username, email, password).await,
        Commands::Login { user, password } => cmd_login(state, user, password).await,
        Commands::Logout => cmd_logout(&state),
        Commands::Whoami => cmd_whoami(&state),
        Commands::Tasks(TasksCommands::List) => cmd_tasks_list(state).await,
        Commands::Tasks(TasksCommands::Create {
            title,
            description,
            due,
            status,
            urgency,
        }) => {
            let form = TaskForm {
                title: title.clone(),
                description: description.clone(),
                date_end: due.clone(),
                status: *status,
                urgency: *urgency,
            };
            cmd_tasks_create(state, form).await
        }
        Commands::Tasks(TasksCommands::Edit {
            id,
            title,
            description,
            due,
            status,
            urgency,
        }) => {
            let changes = TaskChanges {
                title: title.clone(),
                description: description.clone(),
                due: due.clone(),
                status: *status,
                urgency: *urgency,
            };
            cmd_tasks_edit(state, id.clone(), changes).await
        }
        Commands::Tasks(TasksCommands::Delete { id, yes }) => {
            cmd_tasks_delete(state, id.clone(), *yes).await
        }
        Commands::Users(UsersCommands::List) => cmd_users_list(state).await,
        Commands::Users(UsersCommands::Toggle { id }) => {
            cmd_users_toggle(state, id.clone()).await
        }
        Commands::Users(UsersCommands::Delete { id, yes }) => {
            cmd_users_delete(state, id.clone(), *yes).await
        }
        Commands::Config(ConfigCommands::Check) => cmd_config_check(&cli.config),
    }
}

/// Turn a submit result into the command's exit status
fn submit_result(outcome: SubmitOutcome, notice: Option<&Notice>) -> Result<Option<Screen>> {
    match outcome {
        SubmitOutcome::Accepted { navigate } => Ok(navigate),
        SubmitOutcome::Invalid(errors) => {
            anyhow::bail!("{}", errors.lines().join("\n"))
        }
        SubmitOutcome::Rejected => {
            anyhow::bail!(
                "{}",
                notice.map(|n| n.message.as_str()).unwrap_or("Request failed")
            )
        }
    }
}

fn action_result(outcome: ActionOutcome, notice: Option<&Notice>) -> Result<bool> {
    match outcome {
        ActionOutcome::Completed => Ok(true),
        ActionOutcome::Declined => {
            println!("Cancelled.");
            Ok(false)
        }
        ActionOutcome::Failed | ActionOutcome::Busy => {
            anyhow::bail!(
                "{}",
                notice.map(|n| n.message.as_str()).unwrap_or("Request failed")
            )
        }
    }
}

async fn cmd_register(
    state: Arc<AppState>,
    username: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    let mut screen = RegisterScreen::new(state);
    screen.form = RegisterForm {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };

    let outcome = screen.submit().await;
    submit_result(outcome, screen.notice())?;
    print!("{}", screen.render());
    println!("You can now sign in with `taskboard login`.");
    Ok(())
}

async fn cmd_login(state: Arc<AppState>, user: &str, password: &str) -> Result<()> {
    let mut screen = LoginScreen::new(state.clone());
    screen.form = LoginForm::new(user, password);

    let outcome = screen.submit().await;
    let next = submit_result(outcome, screen.notice())?;
    print!("{}", screen.render());

    if next == Some(Screen::TaskList) {
        println!();
        cmd_tasks_list(state).await?;
    }
    Ok(())
}

fn cmd_logout(state: &AppState) -> Result<()> {
    let was_signed_in = state.session.is_authenticated();
    state
        .session
        .logout()
        .context("Failed to remove the stored session")?;

    if was_signed_in {
        println!("Logged out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

fn cmd_whoami(state: &AppState) -> Result<()> {
    match state.session.current() {
        Some(session) => {
            println!("Signed in as user {} ({})", session.user_id, session.role);
        }
        None => println!("Not signed in."),
    }
    println!("Service:  {}", state.api.base_url());
    println!("Menu:     {}", nav_bar(&state.gate.nav_items()));
    Ok(())
}

fn nav_bar(items: &[NavItem]) -> String {
    items
        .iter()
        .map(NavItem::label)
        .collect::<Vec<_>>()
        .join(" | ")
}

async fn cmd_tasks_list(state: Arc<AppState>) -> Result<()> {
    let mut screen = TaskListScreen::new(state);
    screen.load().await;

    if let Some(message) = screen.view().error() {
        anyhow::bail!("{}", message);
    }
    print!("{}", screen.render());
    Ok(())
}

async fn cmd_tasks_create(state: Arc<AppState>, form: TaskForm) -> Result<()> {
    let mut screen = CreateTaskScreen::new(state.clone());
    screen.form = form;

    let outcome = screen.submit().await;
    let next = submit_result(outcome, screen.notice())?;
    print!("{}", render_notice(screen.notice()));

    if next == Some(Screen::TaskList) {
        println!();
        cmd_tasks_list(state).await?;
    }
    Ok(())
}

/// Fields given on the command line for `tasks edit`
#[derive(Debug, Default)]
struct TaskChanges {
    title: Option<String>,
    description: Option<String>,
    due: Option<String>,
    status: Option<TaskStatus>,
    urgency: Option<Urgency>,
}

impl TaskChanges {
    fn apply(self, form: &mut TaskForm) {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(due) = self.due {
            form.date_end = due;
        }
        if let Some(status) = self.status {
            form.status = status;
        }
        if let Some(urgency) = self.urgency {
            form.urgency = urgency;
        }
    }
}

async fn cmd_tasks_edit(state: Arc<AppState>, id: Id, changes: TaskChanges) -> Result<()> {
    let mut screen = EditTaskScreen::new(state.clone(), id);
    screen.load().await;

    if let Some(message) = screen.view().error() {
        anyhow::bail!("{}", message);
    }

    changes.apply(&mut screen.form);

    let outcome = screen.submit().await;
    let next = submit_result(outcome, screen.notice())?;
    print!("{}", render_notice(screen.notice()));

    if next == Some(Screen::TaskList) {
        println!();
        cmd_tasks_list(state).await?;
    }
    Ok(())
}

async fn cmd_tasks_delete(state: Arc<AppState>, id: Id, yes: bool) -> Result<()> {
    let mut screen = TaskListScreen::new(state);
    let outcome = screen.delete(&id, &mut TerminalConfirm::new(yes)).await;

    if action_result(outcome, screen.notice())? {
        print!("{}", render_notice(screen.notice()));
    }
    Ok(())
}

async fn cmd_users_list(state: Arc<AppState>) -> Result<()> {
    let mut screen = AdminUsersScreen::new(state);
    screen.load().await;

    if let Some(message) = screen.view().error() {
        anyhow::bail!("{}", message);
    }
    print!("{}", screen.render());
    Ok(())
}

async fn cmd_users_toggle(state: Arc<AppState>, id: Id) -> Result<()> {
    let mut screen = AdminUsersScreen::new(state);
    // The current status decides whether this blocks or unblocks
    screen.load().await;
    if let Some(message) = screen.view().error() {
        anyhow::bail!("{}", message);
    }

    let outcome = screen.toggle_block(&id).await;
    if action_result(outcome, screen.notice())? {
        print!("{}", screen.render());
    }
    Ok(())
}

async fn cmd_users_delete(state: Arc<AppState>, id: Id, yes: bool) -> Result<()> {
    let mut screen = AdminUsersScreen::new(state);
    let outcome = screen
        .delete_user(&id, &mut TerminalConfirm::new(yes))
        .await;

    if action_result(outcome, screen.notice())? {
        print!("{}", screen.render());
    }
    Ok(())
}

fn render_notice(notice: Option<&Notice>) -> String {
    match notice {
        Some(notice) if notice.is_error() => format!("[!!] {}\n", notice.message),
        Some(notice) => format!("[OK] {}\n", notice.message),
        None => String::new(),
    }
}

/// Validate a configuration file and print what it resolves to
pub fn cmd_config_check(config_path: &Path) -> Result<()> {
    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("The default configuration will be used.");
        println!("To create a custom configuration, copy taskboard.example.toml to taskboard.toml");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("Service:");
            println!("  Base URL:     {}", config.api.base_url);
            println!();
            println!("Session:");
            println!("  File:         {}", config.session.path.display());
            println!();
            println!("Logging:");
            println!("  Level:        {}", config.logging.level);
            println!();

            let warnings = config.warnings();
            if !warnings.is_empty() {
                println!("Warnings:");
                for warning in warnings {
                    println!("  [!] {}", warning);
                }
                println!();
            }

            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            println!();
            println!("Please check the configuration file syntax and try again.");
            anyhow::bail!("Invalid configuration file");
        }
    }
}
