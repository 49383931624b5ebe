use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct OptionInput {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

// 新增题目请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct CreateQuestionRequest {
    pub prompt: String,
    pub points: Option<i32>,
    pub order_index: Option<i32>,
    pub correct_answer: Option<String>,
    pub alternative_answers: Option<String>,
    pub stress_position: Option<i32>,
    pub hint: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionInput>,
}

// 更新题目请求，options 传入时整体替换
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct UpdateQuestionRequest {
    pub prompt: Option<String>,
    pub points: Option<i32>,
    pub order_index: Option<i32>,
    pub correct_answer: Option<String>,
    pub alternative_answers: Option<String>,
    pub stress_position: Option<i32>,
    pub hint: Option<String>,
    pub options: Option<Vec<OptionInput>>,
}
