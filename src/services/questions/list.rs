use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::QuestionService;
use super::load_editable_test;
use crate::models::{ApiResponse, ErrorCode, questions::responses::QuestionListResponse};
use crate::services::common::{current_user, internal_error};

pub async fn list_questions(
    service: &QuestionService,
    request: &HttpRequest,
    test_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let caller = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    // 含正确答案，仅限测试所有者
    if let Err(resp) = load_editable_test(&storage, &caller, test_id).await {
        return Ok(resp);
    }

    match storage.list_questions(test_id).await {
        Ok(items) => {
            let total_points = items.iter().map(|q| q.points).sum();
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                QuestionListResponse {
                    items,
                    total_points,
                },
                "Questions retrieved successfully",
            )))
        }
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            "Failed to retrieve questions",
            e,
        )),
    }
}
