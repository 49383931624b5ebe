use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::{
    ApiResponse, ErrorCode, classes::responses::ClassDetailResponse, users::entities::UserRole,
};
use crate::services::common::{can_manage, current_user, internal_error, load_class};

pub async fn get_class(
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

    // 学生只能查看已加入的班级
    let allowed = if caller.role == UserRole::Student {
        match storage.get_class_student(class_id, caller.id).await {
            Ok(record) => record.is_some(),
            Err(e) => {
                return Ok(internal_error(
                    ErrorCode::InternalServerError,
                    "Failed to check class membership",
                    e,
                ));
            }
        }
    } else {
        can_manage(&caller, class.teacher_id)
    };
    if !allowed {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ClassPermissionDenied,
            "You do not have permission to view this class",
        )));
    }

    match storage.count_class_students(class_id).await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ClassDetailResponse {
                class,
                student_count: count as i64,
            },
            "Class information retrieved successfully",
        ))),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            "Failed to count class students",
            e,
        )),
    }
}
