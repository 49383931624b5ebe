use std::collections::HashSet;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AnalyticsService;
use super::aggregate::{average, best_attempts};
use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode,
    analytics::responses::{ClassAnalyticsResponse, ClassStudentRow, ClassTestRow},
    classes::entities::Class,
};
use crate::cache::ObjectCache;
use crate::services::attempts::settle_expired_results;
use crate::services::common::{cache_from, can_manage, current_user, internal_error, load_class};
use crate::storage::Storage;

pub async fn class_analytics(
    service: &AnalyticsService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let cache = cache_from(request);
    let caller = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let class = match load_class(&storage, class_id).await {
        Ok(class) => class,
        Err(resp) => return Ok(resp),
    };
    if !can_manage(&caller, class.teacher_id) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ClassPermissionDenied,
            "You do not have permission to view analytics of this class",
        )));
    }

    match build_class_analytics(&storage, cache.as_ref(), class).await {
        Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            report,
            "Class analytics retrieved successfully",
        ))),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            "Failed to build class analytics",
            e,
        )),
    }
}

pub(crate) async fn build_class_analytics(
    storage: &Arc<dyn Storage>,
    cache: Option<&Arc<dyn ObjectCache>>,
    class: Class,
) -> Result<ClassAnalyticsResponse> {
    let student_ids = storage.list_class_student_ids(class.id).await?;
    let students = storage.get_users_by_ids(&student_ids).await?;
    let assignments = storage.list_class_assignments(class.id).await?;
    let test_ids: Vec<i64> = assignments.iter().map(|a| a.test_id).collect();
    let mut tests = storage.get_tests_by_ids(&test_ids).await?;
    tests.sort_by_key(|t| t.created_at);

    // 只统计当前在班学生
    let enrolled: HashSet<i64> = student_ids.iter().copied().collect();
    let mut results: Vec<_> = storage
        .list_results_by_tests(&test_ids)
        .await?
        .into_iter()
        .filter(|r| enrolled.contains(&r.student_id))
        .collect();
    settle_expired_results(storage, cache, &tests, &mut results).await?;
    let best = best_attempts(&results);

    let test_rows = tests
        .iter()
        .map(|test| {
            let percentages: Vec<f64> = best
                .iter()
                .filter(|((_, test_id), _)| *test_id == test.id)
                .map(|(_, r)| r.percentage)
                .collect();
            ClassTestRow {
                test_id: test.id,
                title: test.title.clone(),
                test_type: test.test_type,
                completed_students: percentages.len() as i64,
                enrolled_students: student_ids.len() as i64,
                average_percentage: average(&percentages),
            }
        })
        .collect();

    let mut student_rows: Vec<ClassStudentRow> = students
        .iter()
        .map(|student| {
            let percentages: Vec<f64> = best
                .iter()
                .filter(|((student_id, _), _)| *student_id == student.id)
                .map(|(_, r)| r.percentage)
                .collect();
            ClassStudentRow {
                student_id: student.id,
                username: student.username.clone(),
                display_name: student.display_name.clone(),
                tests_completed: percentages.len() as i64,
                average_best_percentage: (!percentages.is_empty()).then(|| average(&percentages)),
            }
        })
        .collect();
    student_rows.sort_by(|a, b| a.username.cmp(&b.username));

    Ok(ClassAnalyticsResponse {
        class_id: class.id,
        name: class.name,
        enrolled_students: student_ids.len() as i64,
        tests: test_rows,
        students: student_rows,
    })
}
