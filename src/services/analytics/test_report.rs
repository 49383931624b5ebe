use std::collections::BTreeSet;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::debug;

use super::aggregate::{
    average, best, grade_distribution, question_rows, score_distribution, student_rows, worst,
};
use super::{AnalyticsService, test_analytics_key};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode,
    analytics::responses::TestAnalyticsResponse,
    attempts::entities::TestResult,
    tests::entities::Test,
};
use crate::services::attempts::settle_expired_for_test;
use crate::services::common::{cache_from, can_manage, current_user, internal_error, load_test};
use crate::storage::Storage;

pub async fn test_analytics(
    service: &AnalyticsService,
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
    if !can_manage(&caller, test.teacher_id) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::TestPermissionDenied,
            "You do not have permission to view analytics of this test",
        )));
    }

    // 结算会清除快照，需在读缓存之前
    if let Err(e) = settle_expired_for_test(&storage, cache.as_ref(), &test).await {
        return Ok(internal_error(
            ErrorCode::InternalServerError,
            "Failed to settle expired attempts",
            e,
        ));
    }

    let key = test_analytics_key(test_id);
    if let Some(cache) = cache.as_ref()
        && let Some(snapshot) = cache.get_json::<TestAnalyticsResponse>(&key).await
    {
        debug!("Test analytics cache hit for {}", key);
        return Ok(HttpResponse::Ok().json(ApiResponse::success(
            snapshot,
            "Test analytics retrieved successfully",
        )));
    }

    let snapshot = match build_test_analytics(&storage, test).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to build test analytics",
                e,
            ));
        }
    };

    if let Some(cache) = cache.as_ref() {
        cache
            .insert_json(key, &snapshot, AppConfig::get().grading.analytics_ttl)
            .await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        snapshot,
        "Test analytics retrieved successfully",
    )))
}

pub(crate) async fn build_test_analytics(
    storage: &Arc<dyn Storage>,
    test: Test,
) -> Result<TestAnalyticsResponse> {
    // 分配到的各班级学生去重
    let mut assigned: BTreeSet<i64> = BTreeSet::new();
    for assignment in storage.list_test_assignments(test.id).await? {
        assigned.extend(storage.list_class_student_ids(assignment.class_id).await?);
    }

    let results = storage.list_results_by_tests(&[test.id]).await?;
    let started: BTreeSet<i64> = results.iter().map(|r| r.student_id).collect();

    let completed: Vec<&TestResult> = results.iter().filter(|r| r.is_completed).collect();
    let percentages: Vec<f64> = completed.iter().map(|r| r.percentage).collect();

    let student_ids: Vec<i64> = assigned.union(&started).copied().collect();
    let students = storage.get_users_by_ids(&student_ids).await?;

    let questions = storage.list_questions(test.id).await?;
    let completed_ids: Vec<i64> = completed.iter().map(|r| r.id).collect();
    let answers = storage.list_answers_by_results(&completed_ids).await?;

    Ok(TestAnalyticsResponse {
        test_id: test.id,
        title: test.title,
        test_type: test.test_type,
        assigned_students: assigned.len() as i64,
        started_students: started.len() as i64,
        completed_attempts: completed.len() as i64,
        average_percentage: average(&percentages),
        best_percentage: best(&percentages),
        worst_percentage: worst(&percentages),
        grade_distribution: grade_distribution(&completed),
        score_distribution: score_distribution(&percentages),
        students: student_rows(&results, &students),
        questions: question_rows(&questions, &answers),
        generated_at: Utc::now(),
    })
}
