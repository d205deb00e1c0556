// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client routes, role guards, and the single redirect policy.
//!
//! Guards only *decide*; the session context is the only thing that
//! navigates. Every redirect in the app comes from [`resolve`] or
//! [`landing`].

use crate::models::Role;
use crate::session::state::Session;
use std::fmt;
use tokio::sync::watch;

/// Views the frontend can show.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AppRoute {
    Home,
    Auth,
    StudentProfile,
    StripePayment,
    AddNewCourse,
    TutorProfile,
    MyCourses,
    TutorCalendar,
    /// Any other public path.
    Public(String),
}

impl AppRoute {
    pub fn path(&self) -> &str {
        match self {
            AppRoute::Home => "/",
            AppRoute::Auth => "/auth",
            AppRoute::StudentProfile => "/studentprofile",
            AppRoute::StripePayment => "/stripe-payment",
            AppRoute::AddNewCourse => "/addnewcourse",
            AppRoute::TutorProfile => "/tutorprofile",
            AppRoute::MyCourses => "/mycourses",
            // Spelling matches the deployed frontend route.
            AppRoute::TutorCalendar => "/tutorcalender",
            AppRoute::Public(path) => path,
        }
    }

    /// Parse a browser location. Query strings and fragments are ignored,
    /// and a nested path belongs to its top-level view, so
    /// `/studentprofile/edit?tab=x` is [`AppRoute::StudentProfile`].
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let first = trimmed
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match first.as_str() {
            "" => AppRoute::Home,
            "auth" => AppRoute::Auth,
            "studentprofile" => AppRoute::StudentProfile,
            "stripe-payment" => AppRoute::StripePayment,
            "addnewcourse" => AppRoute::AddNewCourse,
            "tutorprofile" => AppRoute::TutorProfile,
            "mycourses" => AppRoute::MyCourses,
            "tutorcalender" => AppRoute::TutorCalendar,
            _ => AppRoute::Public(trimmed.to_string()),
        }
    }

    /// The guard protecting this route, if any.
    pub fn guard(&self) -> Option<RoleGuard> {
        match self {
            AppRoute::StudentProfile | AppRoute::StripePayment => Some(RoleGuard::STUDENT),
            AppRoute::AddNewCourse
            | AppRoute::TutorProfile
            | AppRoute::MyCourses
            | AppRoute::TutorCalendar => Some(RoleGuard::TUTOR),
            AppRoute::Home | AppRoute::Auth | AppRoute::Public(_) => None,
        }
    }

    /// Where a registered user of `role` lands after sign-in.
    pub fn landing_for(role: Role) -> Self {
        match role {
            Role::Student => AppRoute::StudentProfile,
            Role::Individual | Role::Mass => AppRoute::TutorProfile,
            Role::Admin => AppRoute::Home,
        }
    }
}

impl fmt::Display for AppRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of evaluating a route against the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session is still resolving; show a placeholder, do not redirect.
    Loading,
    Render,
    Redirect(AppRoute),
}

/// Role-gated route guard.
#[derive(Clone, Copy)]
pub struct RoleGuard {
    name: &'static str,
    allows: fn(Role) -> bool,
}

impl RoleGuard {
    pub const STUDENT: RoleGuard = RoleGuard {
        name: "student",
        allows: |role| role.is_student(),
    };

    pub const TUTOR: RoleGuard = RoleGuard {
        name: "tutor",
        allows: |role| role.is_tutor(),
    };

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn evaluate(&self, session: &Session) -> GuardDecision {
        if session.loading {
            return GuardDecision::Loading;
        }
        match session.role() {
            Some(role) if (self.allows)(role) => GuardDecision::Render,
            _ => GuardDecision::Redirect(AppRoute::Auth),
        }
    }
}

impl fmt::Debug for RoleGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleGuard").field("name", &self.name).finish()
    }
}

impl PartialEq for RoleGuard {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Decide what happens when `route` is requested under `session`.
pub fn resolve(route: &AppRoute, session: &Session) -> GuardDecision {
    match route.guard() {
        Some(guard) => guard.evaluate(session),
        None => GuardDecision::Render,
    }
}

/// Where the app goes after a session transition settles.
pub fn landing(session: &Session) -> AppRoute {
    match session.role() {
        Some(role) if session.identity.is_some() => AppRoute::landing_for(role),
        _ => AppRoute::Auth,
    }
}

/// Current-route holder. Written only by the session context.
pub struct Navigator {
    current: watch::Sender<AppRoute>,
}

impl Navigator {
    pub fn new(initial: AppRoute) -> Self {
        let (current, _) = watch::channel(initial);
        Self { current }
    }

    pub fn current(&self) -> AppRoute {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppRoute> {
        self.current.subscribe()
    }

    pub(crate) fn navigate(&self, route: AppRoute) {
        tracing::debug!(route = %route, "Navigating");
        self.current.send_replace(route);
    }
}
