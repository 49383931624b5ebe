use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct AnswerInput {
    pub question_id: i64,
    pub answer_text: Option<String>,
    #[serde(default)]
    pub selected_option_ids: Vec<i64>,
}

// 保存答案（可一次提交多题，重复提交覆盖）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct SaveAnswersRequest {
    pub answers: Vec<AnswerInput>,
}

// 作答历史查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct AttemptHistoryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub test_id: Option<i64>,
}
