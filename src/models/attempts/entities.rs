use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 一次作答
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct TestResult {
    pub id: i64,
    pub test_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_completed: bool,
    pub timed_out: bool,
    pub score: i32,
    pub max_score: i32,
    pub percentage: f64,
    pub grade: Option<i32>,
}

// 单题答案
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct TestAnswer {
    pub id: i64,
    pub result_id: i64,
    pub question_id: i64,
    pub answer_text: Option<String>,
    pub selected_option_ids: Vec<i64>,
    pub is_correct: bool,
    pub points_earned: i32,
    pub answered_at: chrono::DateTime<chrono::Utc>,
}

// 写入存储层的答案记录（已判分）
#[derive(Debug, Clone)]
pub struct AnswerRecord {
    pub question_id: i64,
    pub answer_text: Option<String>,
    pub selected_option_ids: Vec<i64>,
    pub is_correct: bool,
    pub points_earned: i32,
}

// 完成作答时写入的成绩
#[derive(Debug, Clone, PartialEq)]
pub struct ResultOutcome {
    pub score: i32,
    pub max_score: i32,
    pub percentage: f64,
    pub grade: i32,
    pub timed_out: bool,
    pub completed_at: i64,
}
