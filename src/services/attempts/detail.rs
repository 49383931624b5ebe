use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;

use super::{AttemptService, finalize_attempt};
use crate::grading::is_expired;
use crate::models::{
    ApiResponse, ErrorCode,
    attempts::{
        entities::TestAnswer,
        responses::{AnswerReview, AttemptDetailResponse},
    },
    questions::entities::Question,
    tests::entities::TestType,
};
use crate::services::common::{cache_from, can_manage, current_user, internal_error, load_test};

/// 逐题复盘。未作答的题目也会列出
///
/// `show_grading` 控制是否给出对错与得分，`reveal` 控制是否给出正确答案。
pub(crate) fn build_reviews(
    test_type: TestType,
    questions: &[Question],
    answers: &[TestAnswer],
    show_grading: bool,
    reveal: bool,
) -> Vec<AnswerReview> {
    let by_question: HashMap<i64, &TestAnswer> =
        answers.iter().map(|a| (a.question_id, a)).collect();

    questions
        .iter()
        .map(|q| {
            let answer = by_question.get(&q.id);
            let (is_correct, points_earned) = if show_grading {
                (
                    Some(answer.is_some_and(|a| a.is_correct)),
                    Some(answer.map_or(0, |a| a.points_earned)),
                )
            } else {
                (None, None)
            };
            AnswerReview {
                question_id: q.id,
                order_index: q.order_index,
                prompt: q.prompt.clone(),
                points: q.points,
                answer_text: answer.and_then(|a| a.answer_text.clone()),
                selected_option_ids: answer
                    .map(|a| a.selected_option_ids.clone())
                    .unwrap_or_default(),
                is_correct,
                points_earned,
                correct_answer: reveal.then(|| q.correct_answer.clone()).flatten(),
                stress_position: reveal.then_some(q.stress_position).flatten(),
                correct_option_ids: (reveal && test_type == TestType::Regular)
                    .then(|| q.correct_option_ids()),
            }
        })
        .collect()
}

pub async fn get_attempt(
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

    let mut result = match storage.get_result_by_id(result_id).await {
        Ok(Some(result)) => result,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AttemptNotFound,
                "Attempt not found",
            )));
        }
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to get attempt",
                e,
            ));
        }
    };
    let test = match load_test(&storage, result.test_id).await {
        Ok(test) => test,
        Err(resp) => return Ok(resp),
    };

    // 作答学生本人、测试所属教师或管理员
    let is_staff_viewer = can_manage(&caller, test.teacher_id);
    if result.student_id != caller.id && !is_staff_viewer {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::AttemptPermissionDenied,
            "You do not have permission to view this attempt",
        )));
    }

    if is_expired(&result, test.time_limit_minutes, Utc::now()) {
        let finalized = finalize_attempt(&storage, cache.as_ref(), &test, result.id, true).await;
        let reloaded = match finalized {
            Ok(_) => storage.get_result_by_id(result.id).await,
            Err(e) => Err(e),
        };
        match reloaded {
            Ok(Some(updated)) => result = updated,
            Ok(None) => {}
            Err(e) => {
                return Ok(internal_error(
                    ErrorCode::InternalServerError,
                    "Failed to finalize expired attempt",
                    e,
                ));
            }
        }
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
    let answers = match storage.list_answers_by_result(result.id).await {
        Ok(answers) => answers,
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to load answers",
                e,
            ));
        }
    };

    // 学生在完成后才能看到判分；正确答案还需测试允许
    let show_grading = result.is_completed || is_staff_viewer;
    let reveal = is_staff_viewer || (result.is_completed && test.show_correct_answers);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AttemptDetailResponse {
            answers: build_reviews(test.test_type, &questions, &answers, show_grading, reveal),
            answers_revealed: reveal,
            test_title: test.title,
            test_type: test.test_type,
            result,
        },
        "Attempt retrieved successfully",
    )))
}
