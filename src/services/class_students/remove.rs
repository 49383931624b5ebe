use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassStudentService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::analytics::invalidate_class_analytics;
use crate::services::common::{cache_from, can_manage, current_user, internal_error, load_class};

pub async fn remove_student(
    service: &ClassStudentService,
    request: &HttpRequest,
    class_id: i64,
    student_id: i64,
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

    // 班级教师、管理员或学生本人
    if caller.id != student_id && !can_manage(&caller, class.teacher_id) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ClassPermissionDenied,
            "You do not have permission to remove this student",
        )));
    }

    match storage.remove_student_from_class(class_id, student_id).await {
        Ok(true) => {
            invalidate_class_analytics(&storage, cache.as_ref(), class_id).await;
            info!(
                "Student {} removed from class {} by user {}",
                student_id, class_id, caller.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Student removed from class successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassStudentNotFound,
            "Student is not a member of this class",
        ))),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            "Failed to remove student from class",
            e,
        )),
    }
}
