use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 班级学生关系
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class_student.ts")]
pub struct ClassStudent {
    pub id: i64,
    pub class_id: i64,
    pub student_id: i64,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

// 班级学生列表项（附带学生基本信息）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class_student.ts")]
pub struct ClassStudentDetail {
    pub student_id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub email: String,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}
