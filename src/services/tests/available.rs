use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};

use super::TestService;
use crate::models::{
    ApiResponse, ErrorCode,
    attempts::entities::TestResult,
    tests::{
        entities::{Test, TestAssignment},
        responses::{AvailableTest, AvailableTestListResponse},
    },
};
use crate::services::attempts::settle_expired_results;
use crate::services::common::{cache_from, current_user, internal_error};

/// 同一测试分配到多个班级时，取截止时间最早的一条
fn earliest_assignments(assignments: Vec<TestAssignment>) -> HashMap<i64, TestAssignment> {
    let mut by_test: HashMap<i64, TestAssignment> = HashMap::new();
    for assignment in assignments {
        match by_test.get(&assignment.test_id) {
            Some(current) if !due_earlier(&assignment, current) => {}
            _ => {
                by_test.insert(assignment.test_id, assignment);
            }
        }
    }
    by_test
}

// 没有截止时间的排在最后
fn due_earlier(a: &TestAssignment, b: &TestAssignment) -> bool {
    match (a.due_at, b.due_at) {
        (Some(x), Some(y)) => x < y,
        (Some(_), None) => true,
        _ => false,
    }
}

pub(crate) fn build_available(
    test: Test,
    assignment: &TestAssignment,
    question_count: usize,
    attempts: &[&TestResult],
) -> AvailableTest {
    let completed: Vec<&&TestResult> = attempts.iter().filter(|r| r.is_completed).collect();
    let best_percentage = completed
        .iter()
        .map(|r| r.percentage)
        .fold(None, |best: Option<f64>, p| Some(best.map_or(p, |b| b.max(p))));
    let in_progress_result_id = attempts
        .iter()
        .filter(|r| !r.is_completed)
        .max_by_key(|r| r.id)
        .map(|r| r.id);
    let attempts_left = (test.max_attempts - completed.len() as i32).max(0);

    AvailableTest {
        class_id: assignment.class_id,
        due_at: assignment.due_at,
        question_count,
        attempts_used: attempts.len() as i32,
        attempts_left,
        best_percentage,
        in_progress_result_id,
        test,
    }
}

/// 开放中的测试照常列出；窗口关闭后仍有进行中作答的也保留，以便继续
fn is_listed(item: &AvailableTest, now: DateTime<Utc>) -> bool {
    item.test.is_open_at(now) || item.in_progress_result_id.is_some()
}

pub async fn list_available_tests(
    service: &TestService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let cache = cache_from(request);
    let caller = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let assignments = match storage.list_assignments_for_student(caller.id).await {
        Ok(list) => earliest_assignments(list),
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to load assignments",
                e,
            ));
        }
    };
    if assignments.is_empty() {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(
            AvailableTestListResponse { items: vec![] },
            "Available tests retrieved successfully",
        )));
    }

    let test_ids: Vec<i64> = assignments.keys().copied().collect();
    let tests = match storage.get_tests_by_ids(&test_ids).await {
        Ok(tests) => tests,
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to load tests",
                e,
            ));
        }
    };
    let mut results = match storage.list_results_by_student(caller.id).await {
        Ok(results) => results,
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to load attempts",
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

    let now = Utc::now();
    let mut items = Vec::new();
    for test in tests {
        let Some(assignment) = assignments.get(&test.id) else {
            continue;
        };
        let question_count = match storage.list_questions(test.id).await {
            Ok(questions) => questions.len(),
            Err(e) => {
                return Ok(internal_error(
                    ErrorCode::InternalServerError,
                    "Failed to load questions",
                    e,
                ));
            }
        };
        let attempts: Vec<&TestResult> = results.iter().filter(|r| r.test_id == test.id).collect();
        let item = build_available(test, assignment, question_count, &attempts);
        if is_listed(&item, now) {
            items.push(item);
        }
    }

    // 截止时间近的在前
    items.sort_by(|a, b| match (a.due_at, b.due_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => b.test.created_at.cmp(&a.test.created_at),
    });

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AvailableTestListResponse { items },
        "Available tests retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::entities::TestType;
    use chrono::Duration;

    fn assignment(id: i64, test_id: i64, due_in_hours: Option<i64>) -> TestAssignment {
        let now = Utc::now();
        TestAssignment {
            id,
            test_id,
            class_id: id * 10,
            assigned_at: now,
            due_at: due_in_hours.map(|h| now + Duration::hours(h)),
        }
    }

    fn result(id: i64, completed: bool, percentage: f64) -> TestResult {
        TestResult {
            id,
            test_id: 1,
            student_id: 5,
            attempt_number: id as i32,
            started_at: Utc::now(),
            completed_at: None,
            is_completed: completed,
            timed_out: false,
            score: 0,
            max_score: 0,
            percentage,
            grade: None,
        }
    }

    fn sample_test(max_attempts: i32) -> Test {
        let now = Utc::now();
        Test {
            id: 1,
            teacher_id: 2,
            title: "Диктант".to_string(),
            description: None,
            test_type: TestType::Spelling,
            time_limit_minutes: 0,
            max_attempts,
            show_correct_answers: false,
            is_active: true,
            available_from: None,
            available_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_earliest_assignment_wins() {
        let picked = earliest_assignments(vec![
            assignment(1, 7, None),
            assignment(2, 7, Some(48)),
            assignment(3, 7, Some(24)),
            assignment(4, 8, None),
        ]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[&7].id, 3);
        assert_eq!(picked[&8].id, 4);
    }

    #[test]
    fn test_attempt_counters() {
        let a = assignment(1, 1, None);
        let results = [result(1, true, 40.0), result(2, true, 75.5), result(3, false, 0.0)];
        let refs: Vec<&TestResult> = results.iter().collect();

        let item = build_available(sample_test(3), &a, 12, &refs);
        assert_eq!(item.attempts_used, 3);
        assert_eq!(item.attempts_left, 1);
        assert_eq!(item.best_percentage, Some(75.5));
        assert_eq!(item.in_progress_result_id, Some(3));
        assert_eq!(item.question_count, 12);

        let none: Vec<&TestResult> = vec![];
        let fresh = build_available(sample_test(1), &a, 0, &none);
        assert_eq!(fresh.attempts_left, 1);
        assert_eq!(fresh.best_percentage, None);
        assert_eq!(fresh.in_progress_result_id, None);
    }

    #[test]
    fn test_closed_window_keeps_running_attempt() {
        let now = Utc::now();
        let a = assignment(1, 1, None);
        let mut closed = sample_test(2);
        closed.available_until = Some(now - Duration::minutes(5));

        let done = [result(1, true, 80.0)];
        let done_refs: Vec<&TestResult> = done.iter().collect();
        let finished = build_available(closed.clone(), &a, 3, &done_refs);
        assert!(!is_listed(&finished, now));

        let running = [result(1, true, 80.0), result(2, false, 0.0)];
        let running_refs: Vec<&TestResult> = running.iter().collect();
        let resumable = build_available(closed, &a, 3, &running_refs);
        assert!(is_listed(&resumable, now));

        let open = build_available(sample_test(2), &a, 3, &done_refs);
        assert!(is_listed(&open, now));
    }
}
