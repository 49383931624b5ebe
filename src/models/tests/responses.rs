use super::entities::{Test, TestAssignment};
use crate::models::common::PaginationInfo;
use crate::models::questions::entities::Question;
use serde::Serialize;
use ts_rs::TS;

// 测试列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/test.ts")]
pub struct TestListResponse {
    pub items: Vec<Test>,
    pub pagination: PaginationInfo,
}

// 测试详情（教师视图，含答案）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/test.ts")]
pub struct TestDetailResponse {
    pub test: Test,
    pub questions: Vec<Question>,
    pub assignments: Vec<TestAssignment>,
    pub total_points: i32,
    pub result_count: i64,
}

// 学生可参加的测试
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/test.ts")]
pub struct AvailableTest {
    pub test: Test,
    pub class_id: i64,
    pub due_at: Option<chrono::DateTime<chrono::Utc>>,
    pub question_count: usize,
    pub attempts_used: i32,
    pub attempts_left: i32,
    pub best_percentage: Option<f64>,
    pub in_progress_result_id: Option<i64>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/test.ts")]
pub struct AvailableTestListResponse {
    pub items: Vec<AvailableTest>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/test.ts")]
pub struct TestAssignmentListResponse {
    pub items: Vec<TestAssignment>,
}
