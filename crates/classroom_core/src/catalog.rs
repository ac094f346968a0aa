//! crates/classroom_core/src/catalog.rs
//!
//! The catalog store owns the course list and derives every enrollment-scoped
//! collection from it.
//!
//! Derived collections are never stored next to the course list. They live in a
//! `CatalogView` built from one version of the list and memoized on that version,
//! so a view can never disagree with the courses it was computed from.

use crate::domain::{
    Announcement, Assignment, Course, CourseId, CourseScoped, Discussion, LiveClass, LiveQuiz,
};
use crate::seed::SeedData;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// One published version of the course list.
#[derive(Debug, Clone)]
pub struct CourseList {
    version: u64,
    courses: Arc<[Course]>,
}

impl CourseList {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }
}

/// Seed records for every course-scoped kind. Immutable after construction.
#[derive(Debug, Default)]
struct ScopedRecords {
    assignments: Vec<Assignment>,
    announcements: Vec<Announcement>,
    live_quizzes: Vec<LiveQuiz>,
    live_classes: Vec<LiveClass>,
    discussions: Vec<Discussion>,
}

//=========================================================================================
// CatalogStore
//=========================================================================================

pub struct CatalogStore {
    records: ScopedRecords,
    state: watch::Sender<CourseList>,
    memo: Mutex<Option<Arc<CatalogView>>>,
}

impl CatalogStore {
    pub fn new(seed: SeedData) -> Self {
        let SeedData {
            courses,
            assignments,
            announcements,
            live_quizzes,
            live_classes,
            discussions,
        } = seed;

        let (state, _) = watch::channel(CourseList {
            version: 0,
            courses: dedupe_by_id(courses).into(),
        });

        Self {
            records: ScopedRecords {
                assignments,
                announcements,
                live_quizzes,
                live_classes,
                discussions,
            },
            state,
            memo: Mutex::new(None),
        }
    }

    /// Notified whenever the course list actually changes.
    pub fn subscribe(&self) -> watch::Receiver<CourseList> {
        self.state.subscribe()
    }

    pub fn version(&self) -> u64 {
        self.state.borrow().version
    }

    /// Marks a course as enrolled. Returns `false`, without notifying anyone,
    /// when the course is unknown or already enrolled.
    pub fn enroll(&self, id: CourseId) -> bool {
        let changed = self.state.send_if_modified(|list| {
            let Some(index) = list
                .courses
                .iter()
                .position(|c| c.id == id && !c.enrolled)
            else {
                return false;
            };
            let mut next = list.courses.to_vec();
            next[index].enrolled = true;
            list.courses = next.into();
            list.version += 1;
            true
        });

        if changed {
            info!(course_id = %id, "Enrolled in course");
        } else {
            debug!(course_id = %id, "Enroll ignored: unknown or already enrolled");
        }
        changed
    }

    /// Replaces the whole course list. Later duplicates of an id are dropped.
    pub fn set_courses(&self, courses: Vec<Course>) {
        let courses: Arc<[Course]> = dedupe_by_id(courses).into();
        let count = courses.len();
        self.state.send_modify(|list| {
            list.courses = courses;
            list.version += 1;
        });
        info!(count, "Course list replaced");
    }

    /// The derived view for the current course list, rebuilt only after a change.
    pub fn view(&self) -> Arc<CatalogView> {
        let list = self.state.borrow().clone();
        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(view) = memo.as_ref().filter(|v| v.version == list.version) {
            return Arc::clone(view);
        }

        let view = Arc::new(CatalogView::build(list, &self.records));
        *memo = Some(Arc::clone(&view));
        view
    }
}

fn dedupe_by_id(courses: Vec<Course>) -> Vec<Course> {
    let mut seen = HashSet::with_capacity(courses.len());
    courses
        .into_iter()
        .filter(|c| {
            let first = seen.insert(c.id);
            if !first {
                warn!(course_id = %c.id, "Dropping duplicate course id");
            }
            first
        })
        .collect()
}

/// Keeps the records whose course is in `enrolled`, in their original order.
pub fn scoped_to_enrollment<T>(records: &[T], enrolled: &HashSet<CourseId>) -> Vec<T>
where
    T: CourseScoped + Clone,
{
    records
        .iter()
        .filter(|r| enrolled.contains(&r.course_id()))
        .cloned()
        .collect()
}

//=========================================================================================
// CatalogView
//=========================================================================================

/// Every collection the pages read, computed from a single course-list version.
#[derive(Debug)]
pub struct CatalogView {
    version: u64,
    courses: Arc<[Course]>,
    enrolled: HashSet<CourseId>,
    assignments: Vec<Assignment>,
    announcements: Vec<Announcement>,
    live_quizzes: Vec<LiveQuiz>,
    live_classes: Vec<LiveClass>,
    discussions: Vec<Discussion>,
}

impl CatalogView {
    fn build(list: CourseList, records: &ScopedRecords) -> Self {
        let enrolled: HashSet<CourseId> = list
            .courses
            .iter()
            .filter(|c| c.enrolled)
            .map(|c| c.id)
            .collect();

        Self {
            assignments: scoped_to_enrollment(&records.assignments, &enrolled),
            announcements: scoped_to_enrollment(&records.announcements, &enrolled),
            live_quizzes: scoped_to_enrollment(&records.live_quizzes, &enrolled),
            live_classes: scoped_to_enrollment(&records.live_classes, &enrolled),
            discussions: scoped_to_enrollment(&records.discussions, &enrolled),
            version: list.version,
            courses: list.courses,
            enrolled,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn is_enrolled(&self, id: CourseId) -> bool {
        self.enrolled.contains(&id)
    }

    /// Enrolled courses in course-list order.
    pub fn enrolled_courses(&self) -> impl Iterator<Item = &Course> + '_ {
        self.courses.iter().filter(|c| c.enrolled)
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn announcements(&self) -> &[Announcement] {
        &self.announcements
    }

    pub fn live_quizzes(&self) -> &[LiveQuiz] {
        &self.live_quizzes
    }

    pub fn live_classes(&self) -> &[LiveClass] {
        &self.live_classes
    }

    pub fn discussions(&self) -> &[Discussion] {
        &self.discussions
    }
}
