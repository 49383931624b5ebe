//! 数据模型
//!
//! 按资源划分为 entities（业务实体）、requests（请求体/查询参数）、responses（响应体）。

pub mod analytics;
pub mod attempts;
pub mod auth;
pub mod class_students;
pub mod classes;
pub mod common;
pub mod questions;
pub mod system;
pub mod tests;
pub mod users;

pub use common::{ApiResponse, PaginationInfo, PaginationQuery, page_window};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
///
/// 0 表示成功；1xxx 通用，2xxx 认证，3xxx 用户，4xxx 班级，5xxx 测试与题目，6xxx 作答。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    NotFound = 1001,
    InternalServerError = 1002,
    Conflict = 1003,
    Forbidden = 1004,

    // 认证
    Unauthorized = 2000,
    AuthFailed = 2001,
    RegisterFailed = 2002,

    // 用户
    UserNotFound = 3000,
    UserAlreadyExists = 3001,
    UserNameInvalid = 3002,
    UserEmailInvalid = 3003,
    UserPasswordInvalid = 3004,
    UserNameAlreadyExists = 3005,
    UserEmailAlreadyExists = 3006,
    UserCreationFailed = 3007,
    UserUpdateFailed = 3008,
    UserDeleteFailed = 3009,
    CanNotDeleteCurrentUser = 3010,

    // 班级
    ClassNotFound = 4000,
    ClassCreationFailed = 4001,
    ClassUpdateFailed = 4002,
    ClassDeleteFailed = 4003,
    ClassPermissionDenied = 4004,
    ClassInviteCodeInvalid = 4005,
    ClassAlreadyJoined = 4006,
    ClassJoinFailed = 4007,
    ClassHasStudents = 4008,
    ClassStudentNotFound = 4009,
    ClassInactive = 4010,

    // 测试与题目
    TestNotFound = 5000,
    TestCreationFailed = 5001,
    TestUpdateFailed = 5002,
    TestDeleteFailed = 5003,
    TestPermissionDenied = 5004,
    TestHasResults = 5005,
    TestInvalid = 5006,
    TestAlreadyAssigned = 5007,
    TestAssignmentNotFound = 5008,
    TestNotAvailable = 5009,
    TestAttemptsInProgress = 5010,
    QuestionNotFound = 5100,
    QuestionInvalid = 5101,
    QuestionLocked = 5102,

    // 作答
    AttemptNotFound = 6000,
    AttemptLimitReached = 6001,
    AttemptAlreadyCompleted = 6002,
    AttemptTimedOut = 6003,
    AttemptPermissionDenied = 6004,
    AttemptAnswerInvalid = 6005,
    AttemptStartFailed = 6006,
}
