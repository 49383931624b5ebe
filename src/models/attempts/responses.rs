use super::entities::TestResult;
use crate::models::common::PaginationInfo;
use crate::models::questions::entities::StudentQuestion;
use crate::models::tests::entities::TestType;
use serde::Serialize;
use ts_rs::TS;

// 已保存的答案（不含判分结果）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct SavedAnswer {
    pub question_id: i64,
    pub answer_text: Option<String>,
    pub selected_option_ids: Vec<i64>,
}

// 开始/恢复作答后的会话视图
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct AttemptSessionResponse {
    pub result: TestResult,
    pub test_title: String,
    pub test_type: TestType,
    pub time_limit_minutes: i32,
    pub resumed: bool,
    // None 表示不限时
    pub remaining_seconds: Option<i64>,
    pub questions: Vec<StudentQuestion>,
    pub saved_answers: Vec<SavedAnswer>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct SaveAnswersResponse {
    pub saved: usize,
    pub remaining_seconds: Option<i64>,
}

// 单题复盘
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct AnswerReview {
    pub question_id: i64,
    pub order_index: i32,
    pub prompt: String,
    pub points: i32,
    pub answer_text: Option<String>,
    pub selected_option_ids: Vec<i64>,
    // 作答未完成时不返回
    pub is_correct: Option<bool>,
    pub points_earned: Option<i32>,
    // 仅在允许查看答案时返回
    pub correct_answer: Option<String>,
    pub stress_position: Option<i32>,
    pub correct_option_ids: Option<Vec<i64>>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct AttemptDetailResponse {
    pub result: TestResult,
    pub test_title: String,
    pub test_type: TestType,
    pub answers_revealed: bool,
    pub answers: Vec<AnswerReview>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct AttemptHistoryItem {
    pub result: TestResult,
    pub test_title: String,
    pub test_type: TestType,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct AttemptHistoryResponse {
    pub items: Vec<AttemptHistoryItem>,
    pub pagination: PaginationInfo,
}

// 存储层分页结果
#[derive(Debug)]
pub struct ResultPage {
    pub items: Vec<TestResult>,
    pub pagination: PaginationInfo,
}
