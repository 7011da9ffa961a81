//! Screen access rules.
//!
//! One table decides who may open each screen. The gate is consulted on every
//! navigation against the latest session, so a login or logout takes effect
//! on the next screen opened.
//!
//! Admin gating here only decides what the client offers; the service still
//! rejects admin calls made with a non-admin credential.

use std::fmt;

use crate::session::{Session, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Register,
    Login,
    TaskList,
    CreateTask,
    EditTask,
    AdminUsers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// Open to anyone; a logged-in user is not redirected away
    AnonymousOnly,
    Authenticated,
    AdminOnly,
}

/// screen, rule, path, title, message shown when a session is required
const ROUTES: &[(Screen, AccessRule, &str, &str, &str)] = &[
    (Screen::Register, AccessRule::AnonymousOnly, "/register", "Register", ""),
    (Screen::Login, AccessRule::AnonymousOnly, "/login", "Login", ""),
    (
        Screen::TaskList,
        AccessRule::Authenticated,
        "/tasks",
        "Your Tasks",
        "You must be logged in to view tasks.",
    ),
    (
        Screen::CreateTask,
        AccessRule::Authenticated,
        "/create-task",
        "Create Task",
        "You must be logged in to create tasks.",
    ),
    (
        Screen::EditTask,
        AccessRule::Authenticated,
        "/edit-task",
        "Edit Task",
        "Authentication required.",
    ),
    (
        Screen::AdminUsers,
        AccessRule::AdminOnly,
        "/admin/users",
        "User Management",
        "You must be logged in to manage users.",
    ),
];

pub const ADMIN_REQUIRED_MESSAGE: &str = "Administrator access required.";

impl Screen {
    pub const ALL: [Screen; 6] = [
        Screen::Register,
        Screen::Login,
        Screen::TaskList,
        Screen::CreateTask,
        Screen::EditTask,
        Screen::AdminUsers,
    ];

    fn route(&self) -> &'static (Screen, AccessRule, &'static str, &'static str, &'static str) {
        ROUTES
            .iter()
            .find(|route| route.0 == *self)
            .unwrap_or(&ROUTES[1])
    }

    pub fn access_rule(&self) -> AccessRule {
        self.route().1
    }

    pub fn path(&self) -> &'static str {
        self.route().2
    }

    pub fn title(&self) -> &'static str {
        self.route().3
    }

    pub fn login_required_message(&self) -> &'static str {
        self.route().4
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Result of checking a screen against a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// No session; render the message instead of the screen
    LoginRequired(&'static str),
    /// Session present but its role may not open the screen
    AdminRequired,
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted)
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Access::Granted => None,
            Access::LoginRequired(message) => Some(*message),
            Access::AdminRequired => Some(ADMIN_REQUIRED_MESSAGE),
        }
    }
}

/// Check `screen` against an explicit session value
pub fn evaluate(screen: Screen, session: Option<&Session>) -> Access {
    match (screen.access_rule(), session) {
        (AccessRule::AnonymousOnly, _) => Access::Granted,
        (_, None) => Access::LoginRequired(screen.login_required_message()),
        (AccessRule::Authenticated, Some(_)) => Access::Granted,
        (AccessRule::AdminOnly, Some(s)) if s.is_admin() => Access::Granted,
        (AccessRule::AdminOnly, Some(_)) => Access::AdminRequired,
    }
}

/// Navigation entries offered to a session, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Open(Screen),
    Logout,
}

impl NavItem {
    pub fn label(&self) -> &'static str {
        match self {
            NavItem::Open(Screen::TaskList) => "Tasks",
            NavItem::Open(screen) => screen.title(),
            NavItem::Logout => "Logout",
        }
    }
}

/// Gate bound to the live session store
#[derive(Debug, Clone)]
pub struct RouteGate {
    session: SessionStore,
}

impl RouteGate {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Evaluate against the session as it is right now
    pub fn check(&self, screen: Screen) -> Access {
        let session = self.session.current();
        let access = evaluate(screen, session.as_ref());
        tracing::debug!(screen = ?screen, path = screen.path(), access = ?access, "Navigation checked");
        access
    }

    /// Navigation bar for the current session.
    ///
    /// Anonymous sessions see the anonymous-only screens; authenticated ones
    /// see every screen they may open that is reachable without a parameter,
    /// followed by Logout.
    pub fn nav_items(&self) -> Vec<NavItem> {
        let session = self.session.current();
        match session {
            None => Screen::ALL
                .iter()
                .filter(|s| s.access_rule() == AccessRule::AnonymousOnly)
                .rev()
                .map(|s| NavItem::Open(*s))
                .collect(),
            Some(session) => Screen::ALL
                .iter()
                .filter(|s| s.access_rule() != AccessRule::AnonymousOnly)
                .filter(|s| **s != Screen::EditTask)
                .filter(|s| evaluate(**s, Some(&session)).is_granted())
                .map(|s| NavItem::Open(*s))
                .chain(std::iter::once(NavItem::Logout))
                .collect(),
        }
    }
}
