//! crates/classroom_core/src/guard.rs
//!
//! The access guard: a pure decision on whether a protected view may render.

use crate::domain::{Role, RoleSet, SessionSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The session is still being restored. Show a placeholder and decide again
    /// once the session store reports ready; never redirect in this state.
    Loading,
    Render,
    /// `from` is the path to return to after signing in, when there is one.
    RedirectToLogin { from: Option<String> },
    RedirectToRoleHome(Role),
}

/// Decides what to do with a request for `requested_path`.
///
/// Checked in order: still loading, not signed in, role not admitted. An empty
/// `allowed` set admits every signed-in role.
pub fn decide(session: &SessionSnapshot, allowed: &RoleSet, requested_path: &str) -> Decision {
    if session.loading {
        return Decision::Loading;
    }

    let Some(user) = session.user.as_ref() else {
        return Decision::RedirectToLogin {
            from: Some(requested_path.to_string()),
        };
    };

    if !allowed.is_empty() && !allowed.contains(user.role) {
        return Decision::RedirectToRoleHome(user.role);
    }

    Decision::Render
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use uuid::Uuid;

    fn signed_in(role: Role) -> SessionSnapshot {
        SessionSnapshot::authenticated(
            User {
                id: Uuid::new_v4(),
                name: "Demo User".to_string(),
                email: "demo@example.com".to_string(),
                role,
            },
            "mock-token".to_string(),
        )
    }

    #[test]
    fn loading_wins_over_everything() {
        let session = SessionSnapshot::restoring();
        assert_eq!(
            decide(&session, &RoleSet::only(Role::Teacher), "/teacher-dashboard"),
            Decision::Loading
        );
    }

    #[test]
    fn anonymous_is_sent_to_login_with_the_requested_path() {
        let anonymous = SessionSnapshot::anonymous();
        for roles in [
            RoleSet::any(),
            RoleSet::only(Role::Student),
            RoleSet::only(Role::Teacher),
        ] {
            assert_eq!(
                decide(&anonymous, &roles, "/assignments"),
                Decision::RedirectToLogin {
                    from: Some("/assignments".to_string())
                }
            );
        }
    }

    #[test]
    fn teacher_on_a_student_route_goes_to_teacher_home() {
        let decision = decide(&signed_in(Role::Teacher), &RoleSet::only(Role::Student), "/dashboard");
        assert_eq!(decision, Decision::RedirectToRoleHome(Role::Teacher));
    }

    #[test]
    fn student_on_a_teacher_route_goes_to_student_home() {
        let decision = decide(
            &signed_in(Role::Student),
            &RoleSet::only(Role::Teacher),
            "/teacher-dashboard",
        );
        assert_eq!(decision, Decision::RedirectToRoleHome(Role::Student));
    }

    #[test]
    fn empty_role_set_admits_any_signed_in_role() {
        assert_eq!(decide(&signed_in(Role::Student), &RoleSet::any(), "/"), Decision::Render);
        assert_eq!(decide(&signed_in(Role::Teacher), &RoleSet::any(), "/"), Decision::Render);
    }

    #[test]
    fn admitted_role_renders() {
        let both: RoleSet = [Role::Student, Role::Teacher].into_iter().collect();
        assert_eq!(decide(&signed_in(Role::Teacher), &both, "/courses"), Decision::Render);
    }
}
