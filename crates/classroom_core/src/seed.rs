//! crates/classroom_core/src/seed.rs
//!
//! The catalog's seed data: courses plus every course-scoped record kind.

use crate::domain::{Announcement, Assignment, Course, Discussion, LiveClass, LiveQuiz};
use serde::Deserialize;

const CLASSROOM_SEED: &str = include_str!("../seed/classroom.json");

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    pub courses: Vec<Course>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub announcements: Vec<Announcement>,
    #[serde(default)]
    pub live_quizzes: Vec<LiveQuiz>,
    #[serde(default)]
    pub live_classes: Vec<LiveClass>,
    #[serde(default)]
    pub discussions: Vec<Discussion>,
}

impl SeedData {
    /// The demo classroom shipped with the crate.
    pub fn classroom() -> Result<Self, serde_json::Error> {
        Self::from_json(CLASSROOM_SEED)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
