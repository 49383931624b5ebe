use std::collections::{HashMap, HashSet};

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;

use super::{AttemptService, finalize_attempt, load_own_result};
use crate::grading::{SubmittedAnswer, grade_answer, is_expired, remaining_seconds};
use crate::models::{
    ApiResponse, ErrorCode,
    attempts::{
        entities::AnswerRecord,
        requests::{AnswerInput, SaveAnswersRequest},
        responses::SaveAnswersResponse,
    },
    questions::entities::Question,
};
use crate::services::common::{cache_from, current_user, internal_error, load_test};

/// 提交的答案必须属于本测试，所选选项必须属于对应题目
pub(crate) fn validate_answers(
    answers: &[AnswerInput],
    questions: &HashMap<i64, &Question>,
) -> Result<(), String> {
    if answers.is_empty() {
        return Err("answers cannot be empty".to_string());
    }
    let mut seen = HashSet::new();
    for input in answers {
        let Some(question) = questions.get(&input.question_id) else {
            return Err(format!(
                "Question {} does not belong to this test",
                input.question_id
            ));
        };
        if !seen.insert(input.question_id) {
            return Err(format!("Question {} is answered twice", input.question_id));
        }
        if let Some(bad) = input
            .selected_option_ids
            .iter()
            .find(|id| !question.options.iter().any(|o| o.id == **id))
        {
            return Err(format!(
                "Option {} does not belong to question {}",
                bad, input.question_id
            ));
        }
    }
    Ok(())
}

pub async fn save_answers(
    service: &AttemptService,
    request: &HttpRequest,
    result_id: i64,
    payload: SaveAnswersRequest,
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

    // 超时后按已保存的答案结束作答
    let now = Utc::now();
    if is_expired(&result, test.time_limit_minutes, now) {
        if let Err(e) = finalize_attempt(&storage, cache.as_ref(), &test, result.id, true).await {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to finalize expired attempt",
                e,
            ));
        }
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::AttemptTimedOut,
            "Time is up, the attempt has been submitted",
        )));
    }

    let questions = match storage.list_questions(test.id).await {
        Ok(questions) => questions,
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to load questions",
                e,
            ));
        }
    };
    let by_id: HashMap<i64, &Question> = questions.iter().map(|q| (q.id, q)).collect();
    if let Err(msg) = validate_answers(&payload.answers, &by_id) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::AttemptAnswerInvalid, msg)));
    }

    let records: Vec<AnswerRecord> = payload
        .answers
        .iter()
        .filter_map(|input| {
            let question = by_id.get(&input.question_id)?;
            let (is_correct, points_earned) =
                grade_answer(test.test_type, question, &SubmittedAnswer::from(input));
            Some(AnswerRecord {
                question_id: input.question_id,
                answer_text: input.answer_text.clone(),
                selected_option_ids: input.selected_option_ids.clone(),
                is_correct,
                points_earned,
            })
        })
        .collect();
    if let Err(e) = storage.upsert_answers(result.id, records).await {
        return Ok(internal_error(
            ErrorCode::InternalServerError,
            "Failed to save answers",
            e,
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SaveAnswersResponse {
            saved: payload.answers.len(),
            remaining_seconds: remaining_seconds(&result, test.time_limit_minutes, now),
        },
        "Answers saved",
    )))
}
