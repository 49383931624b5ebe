use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::models::classes::requests::CreateClassRequest;
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{current_user, error_response, internal_error};
use crate::storage::Storage;
use crate::utils::validate::validate_required_text;

pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    mut class_data: CreateClassRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let caller = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    class_data.name = class_data.name.trim().to_string();
    if let Err(msg) = validate_required_text("name", &class_data.name, 100) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ClassCreationFailed, msg)));
    }

    // 权限校验并确定班级所属教师
    let teacher_id = match resolve_teacher(&caller, &class_data, &storage).await {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    match storage.create_class(teacher_id, class_data).await {
        Ok(class) => {
            info!(
                "Class {} ({}) created by user {} for teacher {}",
                class.id, class.name, caller.id, teacher_id
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(class, "Class created successfully")))
        }
        Err(e) => Ok(error_response(
            ErrorCode::ClassCreationFailed,
            "Class creation failed",
            &e,
        )),
    }
}

/// 教师只能为自己创建班级；管理员必须指定一名教师
async fn resolve_teacher(
    caller: &User,
    class_data: &CreateClassRequest,
    storage: &Arc<dyn Storage>,
) -> Result<i64, HttpResponse> {
    match caller.role {
        UserRole::Teacher => match class_data.teacher_id {
            Some(id) if id != caller.id => Err(HttpResponse::Forbidden().json(
                ApiResponse::error_empty(
                    ErrorCode::ClassPermissionDenied,
                    "You do not have permission to create a class for another teacher",
                ),
            )),
            _ => Ok(caller.id),
        },
        UserRole::Admin => {
            let Some(teacher_id) = class_data.teacher_id else {
                return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::ClassCreationFailed,
                    "teacher_id is required when an admin creates a class",
                )));
            };
            match storage.get_user_by_id(teacher_id).await {
                Ok(Some(user)) if user.role == UserRole::Teacher => Ok(user.id),
                Ok(Some(_)) => Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::ClassPermissionDenied,
                    "Admin can only create classes for teachers",
                ))),
                Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::UserNotFound,
                    "Teacher not found",
                ))),
                Err(e) => Err(internal_error(
                    ErrorCode::InternalServerError,
                    "Failed to get teacher",
                    e,
                )),
            }
        }
        UserRole::Student => Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ClassPermissionDenied,
            "You do not have permission to create a class",
        ))),
    }
}
