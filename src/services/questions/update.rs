use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::QuestionService;
use super::validate::{QuestionDraft, validate_question};
use super::{ensure_unlocked, load_editable_test};
use crate::models::{
    ApiResponse, ErrorCode,
    questions::requests::{OptionInput, UpdateQuestionRequest},
};
use crate::services::analytics::invalidate_test_analytics;
use crate::services::common::{cache_from, current_user, error_response, internal_error};

pub async fn update_question(
    service: &QuestionService,
    request: &HttpRequest,
    test_id: i64,
    question_id: i64,
    update_data: UpdateQuestionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let cache = cache_from(request);
    let caller = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let test = match load_editable_test(&storage, &caller, test_id).await {
        Ok(test) => test,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_unlocked(&storage, test_id).await {
        return Ok(resp);
    }

    let existing = match storage.get_question_by_id(question_id).await {
        Ok(Some(q)) if q.test_id == test_id => q,
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
    };

    // 合并后整体校验
    let existing_options: Vec<OptionInput> = existing
        .options
        .iter()
        .map(|o| OptionInput {
            text: o.text.clone(),
            is_correct: o.is_correct,
        })
        .collect();
    let draft = QuestionDraft {
        prompt: update_data.prompt.as_deref().unwrap_or(&existing.prompt),
        points: update_data.points.unwrap_or(existing.points),
        correct_answer: update_data
            .correct_answer
            .as_deref()
            .or(existing.correct_answer.as_deref()),
        stress_position: update_data.stress_position.or(existing.stress_position),
        options: update_data.options.as_deref().unwrap_or(&existing_options),
    };
    if let Err(msg) = validate_question(test.test_type, &draft) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::QuestionInvalid, msg)));
    }

    match storage.update_question(question_id, update_data).await {
        Ok(Some(question)) => {
            invalidate_test_analytics(cache.as_ref(), [test_id]).await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success(question, "Question updated successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::QuestionNotFound,
            "Question not found",
        ))),
        Err(e) => Ok(error_response(
            ErrorCode::InternalServerError,
            "Question update failed",
            &e,
        )),
    }
}
