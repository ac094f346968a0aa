pub mod catalog;
pub mod dashboard;
pub mod domain;
pub mod guard;
pub mod ports;
pub mod profile;
pub mod routes;
pub mod seed;
pub mod session;
pub mod settings;

pub use catalog::{CatalogStore, CatalogView, CourseList};
pub use domain::{
    Announcement, Assignment, AssignmentStatus, Course, CourseId, CourseScoped, Discussion,
    DiscussionAuthor, LiveClass, LiveQuiz, Progress, Role, RoleSet, SessionSnapshot, User,
    LOGIN_PATH,
};
pub use guard::{decide, Decision};
pub use ports::{ClassroomBackend, KeyValueStorage, PortError, PortResult};
pub use profile::{FieldErrors, Profile, ProfileUpdate};
pub use routes::{Access, Page, Route, RouteTable};
pub use seed::SeedData;
pub use session::{AuthError, RegistrationRequest, SessionStore};
pub use settings::NotificationSettings;
