//! 统计分析响应
//!
//! 测试统计会整体缓存，因此这里的类型同时实现反序列化。

use crate::models::tests::entities::TestType;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 分数段统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct ScoreRange {
    pub range: String,
    pub count: i64,
}

// 五分制成绩分布
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct GradeCount {
    pub grade: i32,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct StudentTestRow {
    pub student_id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub attempts: i64,
    pub best_percentage: Option<f64>,
    pub last_percentage: Option<f64>,
    pub best_grade: Option<i32>,
    pub last_completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct WrongAnswerCount {
    pub answer: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct QuestionStatRow {
    pub question_id: i64,
    pub order_index: i32,
    pub prompt: String,
    pub answers: i64,
    pub correct: i64,
    pub correct_rate: f64,
    pub common_wrong_answers: Vec<WrongAnswerCount>,
}

// 单个测试的统计
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct TestAnalyticsResponse {
    pub test_id: i64,
    pub title: String,
    pub test_type: TestType,
    pub assigned_students: i64,
    pub started_students: i64,
    pub completed_attempts: i64,
    pub average_percentage: f64,
    pub best_percentage: Option<f64>,
    pub worst_percentage: Option<f64>,
    pub grade_distribution: Vec<GradeCount>,
    pub score_distribution: Vec<ScoreRange>,
    pub students: Vec<StudentTestRow>,
    pub questions: Vec<QuestionStatRow>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct ClassTestRow {
    pub test_id: i64,
    pub title: String,
    pub test_type: TestType,
    pub completed_students: i64,
    pub enrolled_students: i64,
    pub average_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct ClassStudentRow {
    pub student_id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub tests_completed: i64,
    pub average_best_percentage: Option<f64>,
}

// 班级统计
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct ClassAnalyticsResponse {
    pub class_id: i64,
    pub name: String,
    pub enrolled_students: i64,
    pub tests: Vec<ClassTestRow>,
    pub students: Vec<ClassStudentRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct StudentTestSummary {
    pub test_id: i64,
    pub title: String,
    pub test_type: TestType,
    pub attempts: i64,
    pub best_percentage: Option<f64>,
    pub best_grade: Option<i32>,
    pub last_completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

// 学生个人统计
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct StudentAnalyticsResponse {
    pub student_id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub tests: Vec<StudentTestSummary>,
    pub overall_average: Option<f64>,
}
