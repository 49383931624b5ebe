use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AttemptService, settle_expired_results};
use crate::models::{
    ApiResponse, ErrorCode,
    attempts::{
        requests::AttemptHistoryParams,
        responses::{AttemptHistoryItem, AttemptHistoryResponse},
    },
    tests::entities::Test,
};
use crate::services::common::{cache_from, current_user, internal_error};

pub async fn list_my_attempts(
    service: &AttemptService,
    request: &HttpRequest,
    query: AttemptHistoryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let cache = cache_from(request);
    let caller = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let mut page = match storage
        .list_student_results_with_pagination(
            caller.id,
            query.test_id,
            query.pagination.page,
            query.pagination.size,
        )
        .await
    {
        Ok(page) => page,
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                "Failed to retrieve attempt history",
                e,
            ));
        }
    };

    let mut test_ids: Vec<i64> = page.items.iter().map(|r| r.test_id).collect();
    test_ids.sort_unstable();
    test_ids.dedup();
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
    if let Err(e) = settle_expired_results(&storage, cache.as_ref(), &tests, &mut page.items).await
    {
        return Ok(internal_error(
            ErrorCode::InternalServerError,
            "Failed to settle expired attempts",
            e,
        ));
    }
    let tests: HashMap<i64, Test> = tests.into_iter().map(|t| (t.id, t)).collect();

    let items = page
        .items
        .into_iter()
        .filter_map(|result| {
            let test = tests.get(&result.test_id)?;
            Some(AttemptHistoryItem {
                test_title: test.title.clone(),
                test_type: test.test_type,
                result,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AttemptHistoryResponse {
            items,
            pagination: page.pagination,
        },
        "Attempt history retrieved successfully",
    )))
}
