use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TestService;
use super::create::validate_test_settings;
use crate::models::{ApiResponse, ErrorCode, tests::requests::UpdateTestRequest};
use crate::services::analytics::invalidate_test_analytics;
use crate::services::attempts::settle_expired_for_test;
use crate::services::common::{
    cache_from, can_manage, current_user, error_response, internal_error, load_test,
};
use crate::utils::validate::validate_required_text;

pub async fn update_test(
    service: &TestService,
    request: &HttpRequest,
    test_id: i64,
    mut update_data: UpdateTestRequest,
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
    if !can_manage(&caller, test.teacher_id) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::TestPermissionDenied,
            "You do not have permission to update this test",
        )));
    }

    if let Some(title) = update_data.title.as_mut() {
        *title = title.trim().to_string();
        if let Err(msg) = validate_required_text("title", title, 200) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::TestInvalid, msg)));
        }
    }

    // 按合并后的设置校验
    if let Err(msg) = validate_test_settings(
        update_data
            .time_limit_minutes
            .unwrap_or(test.time_limit_minutes),
        update_data.max_attempts.unwrap_or(test.max_attempts),
        update_data.available_from.unwrap_or(test.available_from),
        update_data.available_until.unwrap_or(test.available_until),
    ) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::TestInvalid, msg)));
    }

    // 进行中的作答按开始时的时限计时，期间不能改时限
    if update_data
        .time_limit_minutes
        .is_some_and(|limit| limit != test.time_limit_minutes)
    {
        if let Err(e) = settle_expired_for_test(&storage, cache.as_ref(), &test).await {
            return Ok(internal_error(
                ErrorCode::TestUpdateFailed,
                "Failed to settle expired attempts",
                e,
            ));
        }
        match storage.list_results_by_tests(&[test.id]).await {
            Ok(results) if results.iter().any(|r| !r.is_completed) => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::TestAttemptsInProgress,
                    "Time limit cannot change while attempts are in progress",
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Ok(internal_error(
                    ErrorCode::TestUpdateFailed,
                    "Failed to load attempts",
                    e,
                ));
            }
        }
    }

    match storage.update_test(test_id, update_data).await {
        Ok(Some(test)) => {
            invalidate_test_analytics(cache.as_ref(), [test.id]).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(test, "Test updated successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TestNotFound,
            "Test not found",
        ))),
        Err(e) => Ok(error_response(
            ErrorCode::TestUpdateFailed,
            "Test update failed",
            &e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use std::sync::Arc;

    use crate::models::attempts::entities::ResultOutcome;
    use crate::models::tests::entities::TestType;
    use crate::models::users::entities::UserRole;
    use crate::services::common::test_support::{body_json, request_as};
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::results::test_support::backdate_result;
    use crate::storage::sea_orm_storage::tests::test_support::make_test;
    use crate::storage::sea_orm_storage::users::test_support::make_user;

    fn new_limit(minutes: i32) -> UpdateTestRequest {
        UpdateTestRequest {
            time_limit_minutes: Some(minutes),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_time_limit_locked_while_attempt_runs() {
        let db = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&db, "teacher", UserRole::Teacher).await;
        let student = make_user(&db, "student", UserRole::Student).await;
        let test = make_test(&db, teacher.id, TestType::Spelling, 20, 2).await;
        let storage: Arc<dyn Storage> = Arc::new(db);
        let running = storage.create_result(test.id, student.id, 1).await.unwrap();

        let service = TestService::new_lazy();
        let req = request_as(&storage, None, &teacher);

        let resp = service.update_test(&req, test.id, new_limit(5)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["code"], ErrorCode::TestAttemptsInProgress as i32);

        // 时限不变的其他修改照常生效
        let same = service.update_test(&req, test.id, new_limit(20)).await.unwrap();
        assert_eq!(same.status(), StatusCode::OK);

        storage
            .complete_result(
                running.id,
                ResultOutcome {
                    score: 0,
                    max_score: 0,
                    percentage: 0.0,
                    grade: 2,
                    timed_out: false,
                    completed_at: chrono::Utc::now().timestamp(),
                },
            )
            .await
            .unwrap();
        let resp = service.update_test(&req, test.id, new_limit(5)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["time_limit_minutes"], 5);
    }

    #[tokio::test]
    async fn test_time_limit_change_settles_expired_attempt() {
        let db = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&db, "teacher", UserRole::Teacher).await;
        let student = make_user(&db, "student", UserRole::Student).await;
        let test = make_test(&db, teacher.id, TestType::Spelling, 10, 1).await;
        let stale = db.create_result_impl(test.id, student.id, 1).await.unwrap();
        backdate_result(&db, stale.id, 60).await;
        let storage: Arc<dyn Storage> = Arc::new(db);

        let req = request_as(&storage, None, &teacher);
        let resp = TestService::new_lazy()
            .update_test(&req, test.id, new_limit(30))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let settled = storage.get_result_by_id(stale.id).await.unwrap().unwrap();
        assert!(settled.is_completed);
        assert!(settled.timed_out);
    }

    #[tokio::test]
    async fn test_window_validated_against_merged_values() {
        let db = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&db, "teacher", UserRole::Teacher).await;
        let test = make_test(&db, teacher.id, TestType::Regular, 0, 1).await;
        let storage: Arc<dyn Storage> = Arc::new(db);
        let service = TestService::new_lazy();
        let req = request_as(&storage, None, &teacher);

        let now = chrono::Utc::now();
        let from = UpdateTestRequest {
            available_from: Some(Some(now + chrono::Duration::days(2))),
            ..Default::default()
        };
        assert_eq!(service.update_test(&req, test.id, from).await.unwrap().status(), StatusCode::OK);

        // 截止早于已保存的开始时间
        let until = UpdateTestRequest {
            available_until: Some(Some(now + chrono::Duration::days(1))),
            ..Default::default()
        };
        let resp = service.update_test(&req, test.id, until).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // 同时清除开始时间后可以设置
        let both = UpdateTestRequest {
            available_from: Some(None),
            available_until: Some(Some(now + chrono::Duration::days(1))),
            ..Default::default()
        };
        let resp = service.update_test(&req, test.id, both).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert!(body["data"]["available_from"].is_null());
        assert!(!body["data"]["available_until"].is_null());
    }
}
