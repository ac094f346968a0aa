//! crates/classroom_core/src/dashboard.rs
//!
//! Summaries, list filters and navigation computed from a `CatalogView`.
//! Everything here is a pure function of its inputs.

use crate::catalog::CatalogView;
use crate::domain::{Assignment, AssignmentStatus, Discussion, Role, User};
use serde::{Deserialize, Serialize};

/// Announcements shown per page.
pub const ANNOUNCEMENTS_PER_PAGE: usize = 5;

//=========================================================================================
// Summaries
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentSummary {
    pub enrolled_courses: usize,
    pub pending_assignments: usize,
    /// Mean progress over enrolled courses, rounded half up; 0 with no enrollments.
    pub average_progress: u8,
}

impl StudentSummary {
    pub fn from_view(view: &CatalogView) -> Self {
        let (count, total) = view
            .enrolled_courses()
            .fold((0usize, 0usize), |(count, total), course| {
                (count + 1, total + usize::from(course.progress.percent()))
            });

        let average_progress = if count == 0 {
            0
        } else {
            ((2 * total + count) / (2 * count)) as u8
        };

        Self {
            enrolled_courses: count,
            pending_assignments: view
                .assignments()
                .iter()
                .filter(|a| a.status == AssignmentStatus::Upcoming)
                .count(),
            average_progress,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherSummary {
    pub total_courses: usize,
    pub enrolled_courses: usize,
    pub live_classes: usize,
    pub live_quizzes: usize,
}

impl TeacherSummary {
    pub fn from_view(view: &CatalogView) -> Self {
        Self {
            total_courses: view.courses().len(),
            enrolled_courses: view.enrolled_courses().count(),
            live_classes: view.live_classes().len(),
            live_quizzes: view.live_quizzes().len(),
        }
    }
}

//=========================================================================================
// List filters
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentTab {
    #[default]
    All,
    Upcoming,
    Submitted,
    /// Graded and late work.
    Completed,
}

impl AssignmentTab {
    fn admits(&self, status: AssignmentStatus) -> bool {
        match self {
            AssignmentTab::All => true,
            AssignmentTab::Upcoming => status == AssignmentStatus::Upcoming,
            AssignmentTab::Submitted => status == AssignmentStatus::Submitted,
            AssignmentTab::Completed => {
                matches!(status, AssignmentStatus::Graded | AssignmentStatus::Late)
            }
        }
    }
}

/// Enrolled assignments on `tab` whose title or course title contains `search`,
/// ignoring case.
pub fn filter_assignments<'a>(
    view: &'a CatalogView,
    tab: AssignmentTab,
    search: &str,
) -> Vec<&'a Assignment> {
    let needle = search.trim().to_lowercase();
    view.assignments()
        .iter()
        .filter(|a| tab.admits(a.status))
        .filter(|a| {
            needle.is_empty()
                || a.title.to_lowercase().contains(&needle)
                || view
                    .course(a.course_id)
                    .is_some_and(|c| c.title.to_lowercase().contains(&needle))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscussionTab {
    #[default]
    All,
    Pinned,
    Bookmarked,
    /// Threads started by the viewer.
    Mine,
}

/// Enrolled discussions on `tab` whose title or content contains `search`,
/// ignoring case. `viewer` decides what counts as `Mine`.
pub fn filter_discussions<'a>(
    view: &'a CatalogView,
    tab: DiscussionTab,
    search: &str,
    viewer: &User,
) -> Vec<&'a Discussion> {
    let needle = search.trim().to_lowercase();
    view.discussions()
        .iter()
        .filter(|d| match tab {
            DiscussionTab::All => true,
            DiscussionTab::Pinned => d.pinned,
            DiscussionTab::Bookmarked => d.bookmarked,
            DiscussionTab::Mine => d.author.id == viewer.id,
        })
        .filter(|d| {
            needle.is_empty()
                || d.title.to_lowercase().contains(&needle)
                || d.content.to_lowercase().contains(&needle)
        })
        .collect()
}

//=========================================================================================
// Pagination
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Slices out 1-based `page`. Page 0 is read as page 1; past the end is empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Paginated<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let start = (page - 1).saturating_mul(per_page);

    let slice = items
        .get(start..)
        .map(|rest| &rest[..rest.len().min(per_page)])
        .unwrap_or_default();

    Paginated {
        items: slice.to_vec(),
        page,
        per_page,
        total: items.len(),
        has_previous: page > 1,
        has_next: start.saturating_add(per_page) < items.len(),
    }
}

//=========================================================================================
// Navigation
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
    pub active: bool,
}

/// The side menu for `role`, with the entry for `current_path` marked active.
pub fn navigation(role: Role, current_path: &str) -> Vec<NavItem> {
    [
        ("Dashboard", role.home_path()),
        ("Courses", "/courses"),
        ("Assignments", "/assignments"),
        ("Discussion", "/discussion"),
        ("Live Quizzes", "/live-quizzes"),
    ]
    .into_iter()
    .map(|(label, path)| NavItem {
        label,
        path,
        active: path == current_path,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogStore;
    use crate::domain::CourseId;
    use crate::seed::SeedData;
    use pretty_assertions::assert_eq;

    fn classroom() -> CatalogStore {
        CatalogStore::new(SeedData::classroom().unwrap())
    }

    #[test]
    fn student_summary_for_the_seeded_classroom() {
        let view = classroom().view();
        assert_eq!(
            StudentSummary::from_view(&view),
            StudentSummary {
                enrolled_courses: 2,
                pending_assignments: 2,
                // (45 + 60) / 2 = 52.5
                average_progress: 53,
            }
        );
    }

    #[test]
    fn student_summary_without_enrollments_is_zero() {
        let store = classroom();
        store.set_courses(Vec::new());
        assert_eq!(
            StudentSummary::from_view(&store.view()),
            StudentSummary {
                enrolled_courses: 0,
                pending_assignments: 0,
                average_progress: 0,
            }
        );
    }

    #[test]
    fn teacher_summary_counts_courses() {
        let store = classroom();
        store.enroll(CourseId(5));
        let summary = TeacherSummary::from_view(&store.view());
        assert_eq!(summary.total_courses, 6);
        assert_eq!(summary.enrolled_courses, 3);
        assert_eq!(summary.live_quizzes, 2);
        assert_eq!(summary.live_classes, 3);
    }

    #[test]
    fn assignment_tabs_and_search() {
        let store = classroom();
        store.enroll(CourseId(5));
        let view = store.view();

        let titles = |tab, search| -> Vec<String> {
            filter_assignments(&view, tab, search)
                .into_iter()
                .map(|a| a.title.clone())
                .collect()
        };

        assert_eq!(
            titles(AssignmentTab::Completed, ""),
            vec!["API Authentication Methods", "Mobile Responsive Design"]
        );
        assert_eq!(titles(AssignmentTab::Submitted, ""), vec!["CSS Grid Layout Project"]);
        assert_eq!(
            titles(AssignmentTab::Upcoming, "DATA science"),
            vec!["Data Science Project Proposal"]
        );
        // Matches through the course title.
        assert_eq!(
            titles(AssignmentTab::All, "java"),
            vec!["Programming Assignment #3", "JavaScript Array Methods", "API Authentication Methods"]
        );
    }

    fn viewer(id: &str) -> User {
        User {
            id: id.parse().unwrap(),
            name: "Jamal Wilson".to_string(),
            email: "jamal@example.com".to_string(),
            role: Role::Student,
        }
    }

    fn discussion_ids(
        view: &CatalogView,
        tab: DiscussionTab,
        search: &str,
        user: &User,
    ) -> Vec<u32> {
        filter_discussions(view, tab, search, user)
            .iter()
            .map(|d| d.id)
            .collect()
    }

    #[test]
    fn discussion_tabs_only_cover_enrolled_courses() {
        let someone = viewer("00000000-0000-4000-8000-000000000000");
        let store = classroom();
        let view = store.view();
        assert_eq!(discussion_ids(&view, DiscussionTab::Pinned, "", &someone), vec![4]);
        assert!(discussion_ids(&view, DiscussionTab::Bookmarked, "", &someone).is_empty());

        store.enroll(CourseId(5));
        let view = store.view();
        assert_eq!(discussion_ids(&view, DiscussionTab::All, "flexbox", &someone), vec![3]);
    }

    #[test]
    fn mine_tab_matches_the_author_id() {
        let jamal = viewer("5f1c2a9e-3b1d-4c6a-9e0f-1a2b3c4d5e03");
        let stranger = viewer("00000000-0000-4000-8000-000000000000");
        let store = classroom();

        // Jamal's thread is on course 5, which is not enrolled yet.
        assert!(discussion_ids(&store.view(), DiscussionTab::Mine, "", &jamal).is_empty());

        store.enroll(CourseId(5));
        let view = store.view();
        assert_eq!(discussion_ids(&view, DiscussionTab::Mine, "", &jamal), vec![3]);
        assert_eq!(discussion_ids(&view, DiscussionTab::Mine, "grid", &jamal), vec![3]);
        assert!(discussion_ids(&view, DiscussionTab::Mine, "hooks", &jamal).is_empty());
        assert!(discussion_ids(&view, DiscussionTab::Mine, "", &stranger).is_empty());
    }

    #[test]
    fn pagination_is_one_based() {
        let items: Vec<u32> = (1..=7).collect();

        let first = paginate(&items, 1, 5);
        assert_eq!(first.items, vec![1, 2, 3, 4, 5]);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let second = paginate(&items, 2, 5);
        assert_eq!(second.items, vec![6, 7]);
        assert!(!second.has_next);

        assert!(paginate(&items, 9, 5).items.is_empty());
        assert_eq!(paginate(&items, 0, 5).page, 1);
    }

    #[test]
    fn navigation_points_dashboard_at_role_home() {
        let menu = navigation(Role::Teacher, "/assignments");
        assert_eq!(menu[0].path, "/teacher-dashboard");
        let active: Vec<&str> = menu.iter().filter(|i| i.active).map(|i| i.label).collect();
        assert_eq!(active, vec!["Assignments"]);
    }
}
