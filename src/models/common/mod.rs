pub mod pagination;
pub mod patch;
pub mod response;

pub use pagination::{PaginationInfo, PaginationQuery, page_window};
pub use patch::nullable_field;
pub use response::ApiResponse;
