use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassStudentService;
use crate::models::{
    ApiResponse, ErrorCode, class_students::requests::JoinClassRequest, users::entities::UserRole,
};
use crate::services::analytics::invalidate_class_analytics;
use crate::services::common::{cache_from, current_user, error_response, internal_error};

pub async fn join_class(
    service: &ClassStudentService,
    request: &HttpRequest,
    join_data: JoinClassRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let cache = cache_from(request);
    let caller = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if caller.role != UserRole::Student {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ClassPermissionDenied,
            "Only students can join classes",
        )));
    }

    // 邀请码不区分大小写
    let invite_code = join_data.invite_code.trim().to_uppercase();
    let class = match storage.get_class_by_code(&invite_code).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassInviteCodeInvalid,
                "Class not found or invite code is invalid",
            )));
        }
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::ClassJoinFailed,
                "Failed to get class by invite code",
                e,
            ));
        }
    };

    if !class.is_active {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::ClassInactive,
            "Class is not accepting students",
        )));
    }

    match storage.get_class_student(class.id, caller.id).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error(
                ErrorCode::ClassAlreadyJoined,
                class,
                "User has already joined the class",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::ClassJoinFailed,
                "Failed to check class membership",
                e,
            ));
        }
    }

    match storage.add_student_to_class(class.id, caller.id).await {
        Ok(record) => {
            invalidate_class_analytics(&storage, cache.as_ref(), class.id).await;
            info!("Student {} joined class {}", caller.id, class.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(record, "Class joined successfully")))
        }
        // 并发加入时唯一约束冲突
        Err(e) => Ok(error_response(ErrorCode::ClassAlreadyJoined, "Failed to join class", &e)),
    }
}
