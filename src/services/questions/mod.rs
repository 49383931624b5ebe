pub mod create;
pub mod delete;
pub mod list;
pub mod update;
pub mod validate;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::questions::requests::{CreateQuestionRequest, UpdateQuestionRequest};
use crate::models::tests::entities::Test;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{can_manage, internal_error, load_test, storage_from};
use crate::storage::Storage;

pub struct QuestionService {
    storage: Option<Arc<dyn Storage>>,
}

impl QuestionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => storage_from(request),
        }
    }

    pub async fn list_questions(
        &self,
        request: &HttpRequest,
        test_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_questions(self, request, test_id).await
    }

    pub async fn create_question(
        &self,
        request: &HttpRequest,
        test_id: i64,
        question_data: CreateQuestionRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_question(self, request, test_id, question_data).await
    }

    pub async fn update_question(
        &self,
        request: &HttpRequest,
        test_id: i64,
        question_id: i64,
        update_data: UpdateQuestionRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_question(self, request, test_id, question_id, update_data).await
    }

    pub async fn delete_question(
        &self,
        request: &HttpRequest,
        test_id: i64,
        question_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_question(self, request, test_id, question_id).await
    }
}

/// 加载测试并校验编辑权限
pub(crate) async fn load_editable_test(
    storage: &Arc<dyn Storage>,
    caller: &User,
    test_id: i64,
) -> Result<Test, HttpResponse> {
    let test = load_test(storage, test_id).await?;
    if !can_manage(caller, test.teacher_id) {
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::TestPermissionDenied,
            "You do not have permission to edit questions of this test",
        )));
    }
    Ok(test)
}

/// 已有作答记录时题目不可修改或删除
pub(crate) async fn ensure_unlocked(storage: &Arc<dyn Storage>, test_id: i64) -> Result<(), HttpResponse> {
    match storage.count_results_by_test(test_id).await {
        Ok(0) => Ok(()),
        Ok(_) => Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::QuestionLocked,
            "Questions cannot be changed after students have attempted the test",
        ))),
        Err(e) => Err(internal_error(
            ErrorCode::InternalServerError,
            "Failed to count results",
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    use crate::cache::ObjectCache;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::models::tests::entities::TestType;
    use crate::models::users::entities::UserRole;
    use crate::services::analytics::test_analytics_key;
    use crate::services::common::test_support::{body_json, request_as};
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::tests::test_support::make_test;
    use crate::storage::sea_orm_storage::users::test_support::make_user;

    fn orthoepy(word: &str, stress: i32) -> CreateQuestionRequest {
        CreateQuestionRequest {
            prompt: word.to_string(),
            points: Some(1),
            order_index: None,
            correct_answer: None,
            alternative_answers: None,
            stress_position: Some(stress),
            hint: None,
            options: vec![],
        }
    }

    fn rename(prompt: &str) -> UpdateQuestionRequest {
        UpdateQuestionRequest {
            prompt: Some(prompt.to_string()),
            points: None,
            order_index: None,
            correct_answer: None,
            alternative_answers: None,
            stress_position: None,
            hint: None,
            options: None,
        }
    }

    #[tokio::test]
    async fn test_questions_locked_after_first_attempt() {
        let db = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&db, "teacher", UserRole::Teacher).await;
        let student = make_user(&db, "student", UserRole::Student).await;
        let test = make_test(&db, teacher.id, TestType::Orthoepy, 0, 1).await;
        let storage: Arc<dyn Storage> = Arc::new(db);
        let service = QuestionService::new_lazy();
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));
        let req = request_as(&storage, Some(&cache), &teacher);

        let created = service
            .create_question(&req, test.id, orthoepy("звонит", 5))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let question_id = body_json(created).await["data"]["id"].as_i64().unwrap();

        // 尚无作答时可以修改，修改后的重音位置仍要落在词内
        let key = test_analytics_key(test.id);
        cache.insert_raw(key.clone(), "{}".to_string(), 0).await;
        let edited = service
            .update_question(&req, test.id, question_id, rename("кит"))
            .await
            .unwrap();
        assert_eq!(edited.status(), StatusCode::BAD_REQUEST);
        let edited = service
            .update_question(&req, test.id, question_id, rename("звонят"))
            .await
            .unwrap();
        assert_eq!(edited.status(), StatusCode::OK);
        assert!(cache.get_json::<serde_json::Value>(&key).await.is_none());

        storage.create_result(test.id, student.id, 1).await.unwrap();

        let update = service
            .update_question(&req, test.id, question_id, rename("звонила"))
            .await
            .unwrap();
        assert_eq!(update.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(update).await["code"], ErrorCode::QuestionLocked as i32);

        let delete = service
            .delete_question(&req, test.id, question_id)
            .await
            .unwrap();
        assert_eq!(delete.status(), StatusCode::CONFLICT);
        assert_eq!(storage.list_questions(test.id).await.unwrap().len(), 1);
    }
}
