//! 各服务共用的请求上下文与错误响应辅助函数

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;
use tracing::error;

use crate::cache::ObjectCache;
use crate::errors::TutorSystemError;
use crate::middlewares::RequireJWT;
use crate::models::classes::entities::Class;
use crate::models::tests::entities::Test;
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub(crate) fn storage_from(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("Storage not found in app data");
            actix_web::error::ErrorInternalServerError("storage unavailable")
        })
}

pub(crate) fn cache_from(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
}

/// 当前登录用户，缺失时返回 401
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user",
        ))
    })
}

/// 管理员或资源所有者
pub(crate) fn can_manage(caller: &User, owner_id: i64) -> bool {
    caller.role == UserRole::Admin || caller.id == owner_id
}

pub(crate) async fn load_class(storage: &Arc<dyn Storage>, class_id: i64) -> Result<Class, HttpResponse> {
    match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) => Ok(class),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassNotFound,
            "Class not found",
        ))),
        Err(e) => Err(internal_error(
            ErrorCode::InternalServerError,
            "Failed to get class information",
            e,
        )),
    }
}

pub(crate) async fn load_test(storage: &Arc<dyn Storage>, test_id: i64) -> Result<Test, HttpResponse> {
    match storage.get_test_by_id(test_id).await {
        Ok(Some(test)) => Ok(test),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TestNotFound,
            "Test not found",
        ))),
        Err(e) => Err(internal_error(
            ErrorCode::InternalServerError,
            "Failed to get test information",
            e,
        )),
    }
}

/// 未预期的存储错误：记录日志并返回 500
pub(crate) fn internal_error(code: ErrorCode, context: &str, err: impl std::fmt::Display) -> HttpResponse {
    error!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        code,
        format!("{context}: {err}"),
    ))
}

/// 按错误类别映射 HTTP 状态码
pub(crate) fn error_response(code: ErrorCode, context: &str, err: &TutorSystemError) -> HttpResponse {
    match err {
        TutorSystemError::Validation(msg) => HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg.clone())),
        TutorSystemError::NotFound(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::NotFound, msg.clone()))
        }
        TutorSystemError::Authorization(msg) => HttpResponse::Forbidden()
            .json(ApiResponse::error_empty(ErrorCode::Forbidden, msg.clone())),
        TutorSystemError::Authentication(msg) => HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, msg.clone())),
        TutorSystemError::Conflict(msg) => {
            HttpResponse::Conflict().json(ApiResponse::error_empty(code, msg.clone()))
        }
        other => internal_error(code, context, other),
    }
}
