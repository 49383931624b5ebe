use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{can_manage, current_user, error_response, internal_error, load_class};

pub async fn delete_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
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
            "You do not have permission to delete another teacher's class",
        )));
    }

    // 仍有学生的班级不能删除
    match storage.count_class_students(class_id).await {
        Ok(0) => {}
        Ok(count) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::ClassHasStudents,
                format!("Class still has {count} enrolled students"),
            )));
        }
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::ClassDeleteFailed,
                "Failed to count class students",
                e,
            ));
        }
    }

    match storage.delete_class(class_id).await {
        Ok(true) => {
            info!("Class {} deleted by user {}", class_id, caller.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Class deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassNotFound,
            "Class not found",
        ))),
        Err(e) => Ok(error_response(
            ErrorCode::ClassDeleteFailed,
            "Class deletion failed",
            &e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use std::sync::Arc;

    use crate::models::classes::requests::CreateClassRequest;
    use crate::models::users::entities::UserRole;
    use crate::services::common::test_support::{body_json, request_as};
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::users::test_support::make_user;

    #[tokio::test]
    async fn test_delete_class_with_students_conflicts() {
        let db = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&db, "teacher", UserRole::Teacher).await;
        let student = make_user(&db, "student", UserRole::Student).await;
        let storage: Arc<dyn Storage> = Arc::new(db);
        let class = storage
            .create_class(
                teacher.id,
                CreateClassRequest {
                    teacher_id: None,
                    name: "8В".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        storage.add_student_to_class(class.id, student.id).await.unwrap();

        let service = ClassService::new_lazy();
        let req = request_as(&storage, None, &teacher);
        let resp = service.delete_class(&req, class.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["code"], ErrorCode::ClassHasStudents as i32);
        assert!(storage.get_class_by_id(class.id).await.unwrap().is_some());

        storage.remove_student_from_class(class.id, student.id).await.unwrap();
        let resp = service.delete_class(&req, class.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(storage.get_class_by_id(class.id).await.unwrap().is_none());
    }
}
