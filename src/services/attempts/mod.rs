pub mod answer;
pub mod complete;
pub mod detail;
pub mod history;
pub mod start;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::grading::{GradeScale, is_expired, summarize};
use crate::models::attempts::entities::{ResultOutcome, TestResult};
use crate::models::attempts::requests::{AttemptHistoryParams, SaveAnswersRequest};
use crate::models::tests::entities::Test;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::analytics::invalidate_test_analytics;
use crate::services::common::{internal_error, storage_from};
use crate::storage::Storage;

pub struct AttemptService {
    storage: Option<Arc<dyn Storage>>,
}

impl AttemptService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => storage_from(request),
        }
    }

    // 开始或继续作答
    pub async fn start_attempt(
        &self,
        request: &HttpRequest,
        test_id: i64,
    ) -> ActixResult<HttpResponse> {
        start::start_attempt(self, request, test_id).await
    }

    pub async fn save_answers(
        &self,
        request: &HttpRequest,
        result_id: i64,
        answers: SaveAnswersRequest,
    ) -> ActixResult<HttpResponse> {
        answer::save_answers(self, request, result_id, answers).await
    }

    pub async fn complete_attempt(
        &self,
        request: &HttpRequest,
        result_id: i64,
    ) -> ActixResult<HttpResponse> {
        complete::complete_attempt(self, request, result_id).await
    }

    pub async fn get_attempt(
        &self,
        request: &HttpRequest,
        result_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_attempt(self, request, result_id).await
    }

    // 当前学生的作答历史
    pub async fn list_my_attempts(
        &self,
        request: &HttpRequest,
        query: AttemptHistoryParams,
    ) -> ActixResult<HttpResponse> {
        history::list_my_attempts(self, request, query).await
    }
}

/// 结束一次作答：按已保存的答案计分并写入成绩
///
/// 只对未完成的作答生效，返回是否由本次调用完成。
/// 完成后清除该测试的统计快照。
pub(crate) async fn finalize_attempt(
    storage: &Arc<dyn Storage>,
    cache: Option<&Arc<dyn ObjectCache>>,
    test: &Test,
    result_id: i64,
    timed_out: bool,
) -> Result<bool> {
    let questions = storage.list_questions(test.id).await?;
    let answers = storage.list_answers_by_result(result_id).await?;

    let scale = GradeScale::from(&AppConfig::get().grading);
    let summary = summarize(
        answers.iter().map(|a| a.points_earned),
        questions.iter().map(|q| q.points),
        &scale,
    );

    let outcome = ResultOutcome {
        score: summary.score,
        max_score: summary.max_score,
        percentage: summary.percentage,
        grade: summary.grade,
        timed_out,
        completed_at: chrono::Utc::now().timestamp(),
    };
    let applied = storage.complete_result(result_id, outcome).await?;

    if applied {
        invalidate_test_analytics(cache, [test.id]).await;
        if timed_out {
            info!(
                "Attempt {} of test {} timed out: {}/{} ({}%), grade {}",
                result_id, test.id, summary.score, summary.max_score, summary.percentage, summary.grade
            );
        } else {
            info!(
                "Attempt {} of test {} completed: {}/{} ({}%), grade {}",
                result_id, test.id, summary.score, summary.max_score, summary.percentage, summary.grade
            );
        }
    }
    Ok(applied)
}

/// 结算已超时却无人回来结束的作答
///
/// 统计和列表读取作答前调用，`results` 中被结算的记录原地替换为最新状态。
/// 返回结算的数量。
pub(crate) async fn settle_expired_results(
    storage: &Arc<dyn Storage>,
    cache: Option<&Arc<dyn ObjectCache>>,
    tests: &[Test],
    results: &mut [TestResult],
) -> Result<usize> {
    let now = chrono::Utc::now();
    let mut settled = 0;

    for result in results.iter_mut().filter(|r| !r.is_completed) {
        let Some(test) = tests.iter().find(|t| t.id == result.test_id) else {
            continue;
        };
        if !is_expired(result, test.time_limit_minutes, now) {
            continue;
        }
        finalize_attempt(storage, cache, test, result.id, true).await?;
        if let Some(fresh) = storage.get_result_by_id(result.id).await? {
            *result = fresh;
            settled += 1;
        }
    }
    Ok(settled)
}

/// 结算单个测试下全部超时作答
pub(crate) async fn settle_expired_for_test(
    storage: &Arc<dyn Storage>,
    cache: Option<&Arc<dyn ObjectCache>>,
    test: &Test,
) -> Result<usize> {
    if test.time_limit_minutes <= 0 {
        return Ok(0);
    }
    let mut results = storage.list_results_by_tests(&[test.id]).await?;
    settle_expired_results(storage, cache, std::slice::from_ref(test), &mut results).await
}

/// 加载作答并校验归属，只有作答的学生本人可以操作
pub(crate) async fn load_own_result(
    storage: &Arc<dyn Storage>,
    caller: &User,
    result_id: i64,
) -> std::result::Result<TestResult, HttpResponse> {
    match storage.get_result_by_id(result_id).await {
        Ok(Some(result)) if result.student_id == caller.id => Ok(result),
        Ok(Some(_)) => Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::AttemptPermissionDenied,
            "This attempt belongs to another student",
        ))),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AttemptNotFound,
            "Attempt not found",
        ))),
        Err(e) => Err(internal_error(
            ErrorCode::InternalServerError,
            "Failed to get attempt",
            e,
        )),
    }
}
