use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;

use super::{AttemptService, finalize_attempt, load_own_result};
use crate::grading::is_expired;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{cache_from, current_user, internal_error, load_test};

pub async fn complete_attempt(
    service: &AttemptService,
    request: &HttpRequest,
    result_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let cache = cache_from(request);
    let caller = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let result = match load_own_result(&storage, &caller, result_id).await {
        Ok(result) => result,
        Err(resp) => return Ok(resp),
    };
    if result.is_completed {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::AttemptAlreadyCompleted,
            "Attempt is already completed",
        )));
    }

    let test = match load_test(&storage, result.test_id).await {
        Ok(test) => test,
        Err(resp) => return Ok(resp),
    };

    // 超时后才提交的按超时处理
    let timed_out = is_expired(&result, test.time_limit_minutes, Utc::now());
    match finalize_attempt(&storage, cache.as_ref(), &test, result.id, timed_out).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::AttemptAlreadyCompleted,
                "Attempt is already completed",
            )));
        }
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to complete attempt",
                e,
            ));
        }
    }

    match storage.get_result_by_id(result.id).await {
        Ok(Some(result)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Attempt completed")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AttemptNotFound,
            "Attempt not found",
        ))),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            "Failed to reload attempt",
            e,
        )),
    }
}
