use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::QuestionService;
use super::{ensure_unlocked, load_editable_test};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::analytics::invalidate_test_analytics;
use crate::services::common::{cache_from, current_user, internal_error};

pub async fn delete_question(
    service: &QuestionService,
    request: &HttpRequest,
    test_id: i64,
    question_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let cache = cache_from(request);
    let caller = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if let Err(resp) = load_editable_test(&storage, &caller, test_id).await {
        return Ok(resp);
    }
    if let Err(resp) = ensure_unlocked(&storage, test_id).await {
        return Ok(resp);
    }

    match storage.get_question_by_id(question_id).await {
        Ok(Some(q)) if q.test_id == test_id => {}
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::QuestionNotFound,
                "Question not found",
            )));
        }
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to get question",
                e,
            ));
        }
    }

    match storage.delete_question(question_id).await {
        Ok(true) => {
            invalidate_test_analytics(cache.as_ref(), [test_id]).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Question deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::QuestionNotFound,
            "Question not found",
        ))),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            "Question deletion failed",
            e,
        )),
    }
}
