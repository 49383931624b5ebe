pub mod available;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::tests::requests::{
    AssignTestRequest, CreateTestRequest, TestListParams, UpdateTestRequest,
};
use crate::services::common::storage_from;
use crate::storage::Storage;

pub struct TestService {
    storage: Option<Arc<dyn Storage>>,
}

impl TestService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => storage_from(request),
        }
    }

    pub async fn create_test(
        &self,
        request: &HttpRequest,
        test_data: CreateTestRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_test(self, request, test_data).await
    }

    pub async fn list_tests(
        &self,
        request: &HttpRequest,
        query: TestListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_tests(self, request, query).await
    }

    // 教师视图，包含题目与答案
    pub async fn get_test_detail(
        &self,
        request: &HttpRequest,
        test_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_test_detail(self, request, test_id).await
    }

    pub async fn update_test(
        &self,
        request: &HttpRequest,
        test_id: i64,
        update_data: UpdateTestRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_test(self, request, test_id, update_data).await
    }

    pub async fn delete_test(
        &self,
        request: &HttpRequest,
        test_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_test(self, request, test_id).await
    }

    pub async fn assign_test(
        &self,
        request: &HttpRequest,
        test_id: i64,
        assign_data: AssignTestRequest,
    ) -> ActixResult<HttpResponse> {
        assign::assign_test(self, request, test_id, assign_data).await
    }

    pub async fn unassign_test(
        &self,
        request: &HttpRequest,
        test_id: i64,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        assign::unassign_test(self, request, test_id, class_id).await
    }

    pub async fn list_assignments(
        &self,
        request: &HttpRequest,
        test_id: i64,
    ) -> ActixResult<HttpResponse> {
        assign::list_assignments(self, request, test_id).await
    }

    // 学生可参加的测试
    pub async fn list_available_tests(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        available::list_available_tests(self, request).await
    }
}
