use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AnalyticsService;
use super::aggregate::average;
use crate::models::{
    ApiResponse, ErrorCode,
    analytics::responses::{StudentAnalyticsResponse, StudentTestSummary},
    attempts::entities::TestResult,
    tests::entities::Test,
    users::entities::UserRole,
};
use crate::services::attempts::settle_expired_results;
use crate::services::common::{cache_from, current_user, internal_error};

/// 每个测试一行：作答次数、最好成绩与最近完成时间
pub(crate) fn summarize_tests(tests: &[Test], results: &[TestResult]) -> Vec<StudentTestSummary> {
    let mut by_test: HashMap<i64, Vec<&TestResult>> = HashMap::new();
    for result in results {
        by_test.entry(result.test_id).or_default().push(result);
    }

    tests
        .iter()
        .filter_map(|test| {
            let attempts = by_test.get(&test.id)?;
            let completed: Vec<&TestResult> =
                attempts.iter().copied().filter(|r| r.is_completed).collect();
            let best = completed
                .iter()
                .copied()
                .max_by(|a, b| a.percentage.total_cmp(&b.percentage));
            Some(StudentTestSummary {
                test_id: test.id,
                title: test.title.clone(),
                test_type: test.test_type,
                attempts: attempts.len() as i64,
                best_percentage: best.map(|r| r.percentage),
                best_grade: completed.iter().filter_map(|r| r.grade).max(),
                last_completed_at: completed.iter().filter_map(|r| r.completed_at).max(),
            })
        })
        .collect()
}

pub async fn student_analytics(
    service: &AnalyticsService,
    request: &HttpRequest,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let cache = cache_from(request);
    let caller = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let student = match storage.get_user_by_id(student_id).await {
        Ok(Some(user)) if user.role == UserRole::Student => user,
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "Student not found",
            )));
        }
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to get student",
                e,
            ));
        }
    };

    // 学生本人、管理员，或任一所在班级的教师
    let teacher_view = match caller.role {
        UserRole::Admin => false,
        _ if caller.id == student_id => false,
        UserRole::Teacher => match storage.list_classes_for_student(student_id).await {
            Ok(classes) if classes.iter().any(|c| c.teacher_id == caller.id) => true,
            Ok(_) => return Ok(forbidden()),
            Err(e) => {
                return Ok(internal_error(
                    ErrorCode::InternalServerError,
                    "Failed to load student classes",
                    e,
                ));
            }
        },
        UserRole::Student => return Ok(forbidden()),
    };

    let mut results = match storage.list_results_by_student(student_id).await {
        Ok(results) => results,
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to load results",
                e,
            ));
        }
    };
    let mut test_ids: Vec<i64> = results.iter().map(|r| r.test_id).collect();
    test_ids.sort_unstable();
    test_ids.dedup();
    let mut tests = match storage.get_tests_by_ids(&test_ids).await {
        Ok(tests) => tests,
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to load tests",
                e,
            ));
        }
    };
    if let Err(e) = settle_expired_results(&storage, cache.as_ref(), &tests, &mut results).await {
        return Ok(internal_error(
            ErrorCode::InternalServerError,
            "Failed to settle expired attempts",
            e,
        ));
    }
    // 教师只看到自己出的测试
    if teacher_view {
        tests.retain(|t| t.teacher_id == caller.id);
    }
    tests.sort_by_key(|t| t.created_at);

    let summaries = summarize_tests(&tests, &results);
    let bests: Vec<f64> = summaries.iter().filter_map(|s| s.best_percentage).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentAnalyticsResponse {
            student_id: student.id,
            username: student.username,
            display_name: student.display_name,
            tests: summaries,
            overall_average: (!bests.is_empty()).then(|| average(&bests)),
        },
        "Student analytics retrieved successfully",
    )))
}

fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(
        ErrorCode::Forbidden,
        "You do not have permission to view this student's analytics",
    ))
}
