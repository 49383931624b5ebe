use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{entities::UserRole, responses::UserResponse},
};
use crate::services::common::{current_user, internal_error};

pub async fn get_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let caller = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    match storage.get_user_by_id(user_id).await {
        // 教师只能查看学生资料
        Ok(Some(user))
            if caller.role == UserRole::Admin
                || caller.id == user.id
                || user.role == UserRole::Student =>
        {
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user },
                "User retrieved successfully",
            )))
        }
        Ok(Some(_)) => Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You do not have permission to view this user",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            "Failed to retrieve user",
            e,
        )),
    }
}
