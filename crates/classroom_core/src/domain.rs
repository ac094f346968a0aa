//! crates/classroom_core/src/domain.rs
//!
//! Defines the pure, core data structures for the classroom client.
//! These structs are independent of any storage backend or transport.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Path of the sign-in screen; every unauthenticated redirect lands here.
pub const LOGIN_PATH: &str = "/login";

//=========================================================================================
// Roles
//=========================================================================================

/// The two kinds of account the classroom knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    /// Lowercase string used in persisted records and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    /// The dashboard a user of this role lands on.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Student => "/dashboard",
            Role::Teacher => "/teacher-dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive: older sign-in forms stored `"Teacher"` / `"Student"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The set of roles a route admits. The empty set admits any authenticated role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleSet {
    student: bool,
    teacher: bool,
}

impl RoleSet {
    pub const fn any() -> Self {
        Self {
            student: false,
            teacher: false,
        }
    }

    pub const fn only(role: Role) -> Self {
        match role {
            Role::Student => Self {
                student: true,
                teacher: false,
            },
            Role::Teacher => Self {
                student: false,
                teacher: true,
            },
        }
    }

    pub fn with(mut self, role: Role) -> Self {
        match role {
            Role::Student => self.student = true,
            Role::Teacher => self.teacher = true,
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.student && !self.teacher
    }

    pub fn contains(&self, role: Role) -> bool {
        match role {
            Role::Student => self.student,
            Role::Teacher => self.teacher,
        }
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(RoleSet::any(), RoleSet::with)
    }
}

//=========================================================================================
// Session
//=========================================================================================

/// The signed-in identity, as persisted under the `user` storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// A point-in-time copy of the session held by the `SessionStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub token: Option<String>,
    /// True only until the first restore from storage has finished.
    pub loading: bool,
}

impl SessionSnapshot {
    pub fn restoring() -> Self {
        Self {
            user: None,
            token: None,
            loading: true,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            user: None,
            token: None,
            loading: false,
        }
    }

    pub fn authenticated(user: User, token: String) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

//=========================================================================================
// Courses
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub u32);

impl CourseId {
    /// Parses a path segment. Anything that is not a plain integer matches no course.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok().map(CourseId)
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Completion percentage, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Progress(u8);

impl Progress {
    pub fn new(percent: i64) -> Self {
        Self(percent.clamp(0, 100) as u8)
    }

    pub fn percent(&self) -> u8 {
        self.0
    }
}

impl From<i64> for Progress {
    fn from(value: i64) -> Self {
        Progress::new(value)
    }
}

impl From<Progress> for u8 {
    fn from(value: Progress) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub category: String,
    pub enrolled: bool,
    pub progress: Progress,
}

/// Records that belong to exactly one course and are only shown for enrolled courses.
pub trait CourseScoped {
    fn course_id(&self) -> CourseId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Upcoming,
    Submitted,
    Graded,
    Late,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u32,
    pub course_id: CourseId,
    pub title: String,
    pub due: NaiveDateTime,
    pub status: AssignmentStatus,
    pub points: u32,
    pub score: Option<u32>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: u32,
    pub course_id: CourseId,
    pub title: String,
    pub text: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveQuiz {
    pub id: u32,
    pub course_id: CourseId,
    pub title: String,
    pub starts_at: NaiveDateTime,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveClass {
    pub id: u32,
    pub course_id: CourseId,
    pub title: String,
    pub instructor: String,
    pub date: NaiveDate,
    pub time_slot: String,
    pub meet_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionAuthor {
    /// Matches `User::id` for threads the signed-in user started.
    pub id: Uuid,
    pub name: String,
}

/// A discussion thread on a course board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: u32,
    pub course_id: CourseId,
    pub title: String,
    pub author: DiscussionAuthor,
    pub posted_at: NaiveDateTime,
    pub content: String,
    pub tags: Vec<String>,
    pub pinned: bool,
    pub bookmarked: bool,
    pub replies: u32,
}

impl CourseScoped for Assignment {
    fn course_id(&self) -> CourseId {
        self.course_id
    }
}

impl CourseScoped for Announcement {
    fn course_id(&self) -> CourseId {
        self.course_id
    }
}

impl CourseScoped for LiveQuiz {
    fn course_id(&self) -> CourseId {
        self.course_id
    }
}

impl CourseScoped for LiveClass {
    fn course_id(&self) -> CourseId {
        self.course_id
    }
}

impl CourseScoped for Discussion {
    fn course_id(&self) -> CourseId {
        self.course_id
    }
}
