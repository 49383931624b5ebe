use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::info;

use super::{AttemptService, finalize_attempt};
use crate::errors::TutorSystemError;
use crate::grading::{AttemptDecision, decide_start, remaining_seconds};
use crate::models::{
    ApiResponse, ErrorCode,
    attempts::{
        entities::TestResult,
        responses::{AttemptSessionResponse, SavedAnswer},
    },
    tests::entities::Test,
};
use crate::services::analytics::invalidate_test_analytics;
use crate::services::common::{cache_from, current_user, error_response, internal_error, load_test};
use crate::storage::Storage;

pub async fn start_attempt(
    service: &AttemptService,
    request: &HttpRequest,
    test_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let cache = cache_from(request);
    let caller = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let test = match load_test(&storage, test_id).await {
        Ok(test) => test,
        Err(resp) => return Ok(resp),
    };

    // 测试必须分配到学生所在的班级
    match storage.list_assignments_for_student(caller.id).await {
        Ok(assignments) if assignments.iter().any(|a| a.test_id == test_id) => {}
        Ok(_) => {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::TestNotAvailable,
                "This test is not assigned to any of your classes",
            )));
        }
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::AttemptStartFailed,
                "Failed to load assignments",
                e,
            ));
        }
    }

    let attempts = match storage
        .list_results_for_student_test(test_id, caller.id)
        .await
    {
        Ok(attempts) => attempts,
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::AttemptStartFailed,
                "Failed to load attempts",
                e,
            ));
        }
    };

    let now = Utc::now();
    let decision = decide_start(&attempts, test.max_attempts, test.time_limit_minutes, now);

    let attempt_number = match decision {
        AttemptDecision::Resume(result_id) => {
            let Some(current) = attempts.into_iter().find(|r| r.id == result_id) else {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::AttemptNotFound,
                    "Attempt not found",
                )));
            };
            info!(
                "Student {} resumed attempt {} of test {}",
                caller.id, current.id, test.id
            );
            return Ok(session_response(&storage, &test, current, true).await);
        }
        AttemptDecision::FinalizeThenStart {
            expired_id,
            attempt_number,
        } => {
            if let Err(e) =
                finalize_attempt(&storage, cache.as_ref(), &test, expired_id, true).await
            {
                return Ok(internal_error(
                    ErrorCode::AttemptStartFailed,
                    "Failed to finalize expired attempt",
                    e,
                ));
            }
            attempt_number
        }
        AttemptDecision::FinalizeThenDeny { expired_id } => {
            if let Err(e) =
                finalize_attempt(&storage, cache.as_ref(), &test, expired_id, true).await
            {
                return Ok(internal_error(
                    ErrorCode::AttemptStartFailed,
                    "Failed to finalize expired attempt",
                    e,
                ));
            }
            return Ok(attempt_limit_reached(test.max_attempts));
        }
        AttemptDecision::Start { attempt_number } => attempt_number,
        AttemptDecision::Deny => return Ok(attempt_limit_reached(test.max_attempts)),
    };

    // 新作答需要测试处于开放状态且有题目
    if !test.is_open_at(now) {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::TestNotAvailable,
            "Test is not open for attempts",
        )));
    }
    match storage.list_questions(test.id).await {
        Ok(questions) if !questions.is_empty() => {}
        Ok(_) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::TestNotAvailable,
                "Test has no questions yet",
            )));
        }
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::AttemptStartFailed,
                "Failed to load questions",
                e,
            ));
        }
    }

    let result = match storage
        .create_result(test.id, caller.id, attempt_number)
        .await
    {
        Ok(result) => result,
        // 并发开始时 attempt_number 冲突
        Err(e @ TutorSystemError::Conflict(_)) => {
            return Ok(error_response(
                ErrorCode::AttemptStartFailed,
                "Attempt already started",
                &e,
            ));
        }
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::AttemptStartFailed,
                "Failed to start attempt",
                e,
            ));
        }
    };
    invalidate_test_analytics(cache.as_ref(), [test.id]).await;

    info!(
        "Student {} started attempt {} (#{}) of test {}",
        caller.id, result.id, result.attempt_number, test.id
    );
    Ok(session_response(&storage, &test, result, false).await)
}

fn attempt_limit_reached(max_attempts: i32) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(
        ErrorCode::AttemptLimitReached,
        format!("All {max_attempts} attempts have been used"),
    ))
}

/// 作答视图：题目不含答案，附已保存的答案与剩余时间
async fn session_response(
    storage: &Arc<dyn Storage>,
    test: &Test,
    result: TestResult,
    resumed: bool,
) -> HttpResponse {
    let questions = match storage.list_questions(test.id).await {
        Ok(questions) => questions,
        Err(e) => {
            return internal_error(ErrorCode::InternalServerError, "Failed to load questions", e);
        }
    };
    let saved_answers = match storage.list_answers_by_result(result.id).await {
        Ok(answers) => answers
            .into_iter()
            .map(|a| SavedAnswer {
                question_id: a.question_id,
                answer_text: a.answer_text,
                selected_option_ids: a.selected_option_ids,
            })
            .collect(),
        Err(e) => {
            return internal_error(ErrorCode::InternalServerError, "Failed to load answers", e);
        }
    };

    let remaining = remaining_seconds(&result, test.time_limit_minutes, Utc::now());
    let response = AttemptSessionResponse {
        test_title: test.title.clone(),
        test_type: test.test_type,
        time_limit_minutes: test.time_limit_minutes,
        resumed,
        remaining_seconds: remaining,
        questions: questions.iter().map(|q| q.to_student_view()).collect(),
        saved_answers,
        result,
    };

    let message = if resumed {
        "Attempt resumed"
    } else {
        "Attempt started"
    };
    if resumed {
        HttpResponse::Ok().json(ApiResponse::success(response, message))
    } else {
        HttpResponse::Created().json(ApiResponse::success(response, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    use crate::cache::ObjectCache;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::models::classes::requests::CreateClassRequest;
    use crate::models::questions::requests::CreateQuestionRequest;
    use crate::models::tests::{entities::TestType, requests::UpdateTestRequest};
    use crate::models::users::entities::{User, UserRole};
    use crate::services::analytics::test_analytics_key;
    use crate::services::common::test_support::{body_json, request_as};
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::tests::test_support::make_test;
    use crate::storage::sea_orm_storage::users::test_support::make_user;

    struct Fixture {
        storage: Arc<dyn Storage>,
        student: User,
        test: Test,
        class_id: i64,
    }

    async fn fixture() -> Fixture {
        let db = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&db, "teacher", UserRole::Teacher).await;
        let student = make_user(&db, "student", UserRole::Student).await;
        let test = make_test(&db, teacher.id, TestType::Spelling, 0, 2).await;
        let storage: Arc<dyn Storage> = Arc::new(db);
        let class = storage
            .create_class(
                teacher.id,
                CreateClassRequest {
                    teacher_id: None,
                    name: "5Б".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        Fixture {
            storage,
            student,
            test,
            class_id: class.id,
        }
    }

    async fn add_question(storage: &Arc<dyn Storage>, test_id: i64) {
        storage
            .create_question(
                test_id,
                CreateQuestionRequest {
                    prompt: "с..бака".to_string(),
                    points: Some(1),
                    order_index: None,
                    correct_answer: Some("собака".to_string()),
                    alternative_answers: None,
                    stress_position: None,
                    hint: None,
                    options: vec![],
                },
            )
            .await
            .unwrap();
    }

    async fn enroll_and_assign(f: &Fixture) {
        f.storage.add_student_to_class(f.class_id, f.student.id).await.unwrap();
        f.storage.assign_test(f.test.id, f.class_id, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_start_requires_assignment() {
        let f = fixture().await;
        add_question(&f.storage, f.test.id).await;
        // 在班但测试未分配
        f.storage.add_student_to_class(f.class_id, f.student.id).await.unwrap();

        let req = request_as(&f.storage, None, &f.student);
        let resp = AttemptService::new_lazy().start_attempt(&req, f.test.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(resp).await["code"], ErrorCode::TestNotAvailable as i32);
    }

    #[tokio::test]
    async fn test_start_refuses_empty_or_closed_test() {
        let f = fixture().await;
        enroll_and_assign(&f).await;
        let service = AttemptService::new_lazy();
        let req = request_as(&f.storage, None, &f.student);

        let empty = service.start_attempt(&req, f.test.id).await.unwrap();
        assert_eq!(empty.status(), StatusCode::CONFLICT);

        add_question(&f.storage, f.test.id).await;
        let past = Utc::now() - chrono::Duration::hours(1);
        f.storage
            .update_test(
                f.test.id,
                UpdateTestRequest {
                    available_until: Some(Some(past)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let closed = service.start_attempt(&req, f.test.id).await.unwrap();
        assert_eq!(closed.status(), StatusCode::CONFLICT);

        assert_eq!(f.storage.count_results_by_test(f.test.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_start_resumes_open_attempt() {
        let f = fixture().await;
        enroll_and_assign(&f).await;
        add_question(&f.storage, f.test.id).await;
        let service = AttemptService::new_lazy();
        let req = request_as(&f.storage, None, &f.student);

        let first = service.start_attempt(&req, f.test.id).await.unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        let first = body_json(first).await;
        assert_eq!(first["data"]["resumed"], false);

        let second = service.start_attempt(&req, f.test.id).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        let second = body_json(second).await;
        assert_eq!(second["data"]["resumed"], true);
        assert_eq!(second["data"]["result"]["id"], first["data"]["result"]["id"]);
        assert!(second["data"]["questions"][0].get("correct_answer").is_none());

        assert_eq!(f.storage.count_results_by_test(f.test.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_start_clears_analytics_snapshot() {
        let f = fixture().await;
        enroll_and_assign(&f).await;
        add_question(&f.storage, f.test.id).await;
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));
        let key = test_analytics_key(f.test.id);
        cache.insert_raw(key.clone(), "{}".to_string(), 0).await;

        let req = request_as(&f.storage, Some(&cache), &f.student);
        let resp = AttemptService::new_lazy().start_attempt(&req, f.test.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert!(cache.get_json::<serde_json::Value>(&key).await.is_none());
    }
}
