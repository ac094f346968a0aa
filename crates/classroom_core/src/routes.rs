//! crates/classroom_core/src/routes.rs
//!
//! The classroom route table. Role gating lives here once, as data, and every
//! request goes through the same `authorize` call instead of per-route checks.

use crate::domain::{Role, RoleSet, SessionSnapshot};
use crate::guard::{decide, Decision};
use serde::Serialize;
use tracing::debug;

/// What a route shows. Handed to page handlers and echoed as the `page` field
/// of every rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Login,
    Register,
    Home,
    StudentDashboard,
    TeacherDashboard,
    ManageCourses,
    Courses,
    CourseDetail,
    EnrollCourse,
    ContinueLearning,
    Assignments,
    Announcements,
    Discussion,
    LiveQuizzes,
    LiveClasses,
    Profile,
    Settings,
    BackendStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Signed-in users whose role is in the set; the empty set means any role.
    Protected(RoleSet),
}

#[derive(Debug, Clone)]
pub struct Route {
    /// Slash-separated segments; `:name` matches any single segment.
    pub pattern: &'static str,
    pub access: Access,
    pub page: Page,
}

#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: Vec<(&'static str, String)>,
}

impl RouteMatch<'_> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// An ordered route table; the first matching pattern wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn classroom() -> Self {
        let any = Access::Protected(RoleSet::any());
        let student = Access::Protected(RoleSet::only(Role::Student));
        let teacher = Access::Protected(RoleSet::only(Role::Teacher));

        let route = |pattern, access, page| Route {
            pattern,
            access,
            page,
        };

        Self::new(vec![
            route("/login", Access::Public, Page::Login),
            route("/register", Access::Public, Page::Register),
            route("/", any, Page::Home),
            route("/dashboard", student, Page::StudentDashboard),
            route("/teacher-dashboard", teacher, Page::TeacherDashboard),
            route("/teacher-dashboard/courses", teacher, Page::ManageCourses),
            route("/courses", any, Page::Courses),
            route("/courses/:id", any, Page::CourseDetail),
            route("/courses/:id/enroll", student, Page::EnrollCourse),
            route("/course/:id", any, Page::CourseDetail),
            route("/course/:id/continue", any, Page::ContinueLearning),
            route("/assignments", any, Page::Assignments),
            route("/announcements", any, Page::Announcements),
            route("/discussion", any, Page::Discussion),
            route("/live-quizzes", any, Page::LiveQuizzes),
            route("/live-classes", any, Page::LiveClasses),
            route("/profile", any, Page::Profile),
            route("/settings", any, Page::Settings),
            route("/backend/hello", any, Page::BackendStatus),
        ])
    }

    /// Finds the route for `path`, ignoring any query string and trailing slash.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        self.routes.iter().find_map(|route| {
            let pattern: Vec<&'static str> =
                route.pattern.split('/').filter(|s| !s.is_empty()).collect();
            if pattern.len() != segments.len() {
                return None;
            }

            let mut params = Vec::new();
            for (expected, actual) in pattern.iter().copied().zip(segments.iter().copied()) {
                match expected.strip_prefix(':') {
                    Some(name) => params.push((name, actual.to_string())),
                    None if expected == actual => {}
                    None => return None,
                }
            }
            Some(RouteMatch { route, params })
        })
    }

    /// The guard decision for a request to `path`. Unknown paths go to the
    /// login screen without a return path.
    pub fn authorize(&self, session: &SessionSnapshot, path: &str) -> Decision {
        let Some(matched) = self.resolve(path) else {
            debug!(path, "No route matched");
            return Decision::RedirectToLogin { from: None };
        };

        match matched.route.access {
            Access::Public => Decision::Render,
            Access::Protected(allowed) => decide(session, &allowed, path),
        }
    }
}
