use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::QuestionService;
use super::load_editable_test;
use super::validate::{QuestionDraft, validate_question};
use crate::models::{ApiResponse, ErrorCode, questions::requests::CreateQuestionRequest};
use crate::services::analytics::invalidate_test_analytics;
use crate::services::common::{cache_from, current_user, error_response};

pub async fn create_question(
    service: &QuestionService,
    request: &HttpRequest,
    test_id: i64,
    question_data: CreateQuestionRequest,
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

    let draft = QuestionDraft {
        prompt: &question_data.prompt,
        points: question_data.points.unwrap_or(1),
        correct_answer: question_data.correct_answer.as_deref(),
        stress_position: question_data.stress_position,
        options: &question_data.options,
    };
    if let Err(msg) = validate_question(test.test_type, &draft) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::QuestionInvalid, msg)));
    }

    match storage.create_question(test_id, question_data).await {
        Ok(question) => {
            invalidate_test_analytics(cache.as_ref(), [test_id]).await;
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(question, "Question created successfully")))
        }
        Err(e) => Ok(error_response(
            ErrorCode::InternalServerError,
            "Question creation failed",
            &e,
        )),
    }
}
