pub mod auth;

pub mod users;

pub mod classes;


pub mod attempts;

pub mod students;

pub mod system;

pub use attempts::configure_attempts_routes;
pub use auth::configure_auth_routes;
pub use classes::configure_classes_routes;
pub use students::configure_students_routes;
pub use system::configure_system_routes;
pub use tests::configure_tests_routes;
pub use users::configure_user_routes;
