use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 选择题选项
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,
    pub order_index: i32,
    pub text: String,
    pub is_correct: bool,
}

// 题目（教师视图，包含正确答案）
//
// 字段含义随测试类型变化：
// - spelling: correct_answer 为正确拼写，alternative_answers 为 `;` 或 `,` 分隔的可接受写法
// - punctuation: correct_answer 为应加标点的位置列表，如 "3, 7"
// - orthoepy: stress_position 为重音所在字母序号（从 1 开始）
// - regular: 使用 options
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct Question {
    pub id: i64,
    pub test_id: i64,
    pub order_index: i32,
    pub prompt: String,
    pub points: i32,
    pub correct_answer: Option<String>,
    pub alternative_answers: Option<String>,
    pub stress_position: Option<i32>,
    pub hint: Option<String>,
    pub options: Vec<QuestionOption>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Question {
    pub fn correct_option_ids(&self) -> Vec<i64> {
        self.options
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| o.id)
            .collect()
    }

    /// 学生作答时看到的题目，不含任何答案信息
    pub fn to_student_view(&self) -> StudentQuestion {
        StudentQuestion {
            id: self.id,
            order_index: self.order_index,
            prompt: self.prompt.clone(),
            points: self.points,
            hint: self.hint.clone(),
            options: self
                .options
                .iter()
                .map(|o| StudentOption {
                    id: o.id,
                    order_index: o.order_index,
                    text: o.text.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct StudentOption {
    pub id: i64,
    pub order_index: i32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct StudentQuestion {
    pub id: i64,
    pub order_index: i32,
    pub prompt: String,
    pub points: i32,
    pub hint: Option<String>,
    pub options: Vec<StudentOption>,
}
