pub mod join;
pub mod list;
pub mod remove;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::class_students::requests::{ClassStudentListParams, JoinClassRequest};
use crate::services::common::storage_from;
use crate::storage::Storage;

pub struct ClassStudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl ClassStudentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => storage_from(request),
        }
    }

    // 通过邀请码加入班级
    pub async fn join_class(
        &self,
        request: &HttpRequest,
        join_data: JoinClassRequest,
    ) -> ActixResult<HttpResponse> {
        join::join_class(self, request, join_data).await
    }

    pub async fn list_class_students(
        &self,
        request: &HttpRequest,
        class_id: i64,
        query: ClassStudentListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_class_students(self, request, class_id, query).await
    }

    // 移出学生或学生退出班级
    pub async fn remove_student(
        &self,
        request: &HttpRequest,
        class_id: i64,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        remove::remove_student(self, request, class_id, student_id).await
    }
}
