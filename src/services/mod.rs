pub mod analytics;
pub mod attempts;
pub mod auth;
pub mod class_students;
pub mod classes;
pub(crate) mod common;
pub mod questions;
pub mod system;
pub mod tests;
pub mod users;

pub use analytics::AnalyticsService;
pub use attempts::AttemptService;
pub use auth::AuthService;
pub use class_students::ClassStudentService;
pub use classes::ClassService;
pub use questions::QuestionService;
pub use system::SystemService;
pub use tests::TestService;
pub use users::UserService;
