use super::entities::TestType;
use crate::models::common::{PaginationQuery, nullable_field};
use serde::Deserialize;
use ts_rs::TS;

// 创建测试请求
//
// 未填写的时限与次数使用 grading 配置中的默认值。
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/test.ts")]
pub struct CreateTestRequest {
    pub title: String,
    pub description: Option<String>,
    pub test_type: TestType,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
    #[serde(default)]
    pub show_correct_answers: bool,
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
    pub available_until: Option<chrono::DateTime<chrono::Utc>>,
}

// 更新测试请求（测试类型创建后不可修改）
//
// 开放时间字段传 null 表示取消该端限制。
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/test.ts")]
pub struct UpdateTestRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
    pub show_correct_answers: Option<bool>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "nullable_field")]
    pub available_from: Option<Option<chrono::DateTime<chrono::Utc>>>,
    #[serde(default, deserialize_with = "nullable_field")]
    pub available_until: Option<Option<chrono::DateTime<chrono::Utc>>>,
}

// 测试列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/test.ts")]
pub struct TestListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub test_type: Option<TestType>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

// 测试列表查询参数（用于存储层）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/test.ts")]
pub struct TestListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub teacher_id: Option<i64>,
    pub test_type: Option<TestType>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

// 分配测试到班级
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/test.ts")]
pub struct AssignTestRequest {
    pub class_id: i64,
    pub due_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_null_clears_window() {
        let keep: UpdateTestRequest = serde_json::from_str(r#"{"title": "Диктант"}"#).unwrap();
        assert!(keep.available_from.is_none());
        assert!(keep.available_until.is_none());

        let clear: UpdateTestRequest =
            serde_json::from_str(r#"{"available_from": null, "available_until": "2030-01-01T00:00:00Z"}"#)
                .unwrap();
        assert_eq!(clear.available_from, Some(None));
        assert!(matches!(clear.available_until, Some(Some(_))));
    }
}
