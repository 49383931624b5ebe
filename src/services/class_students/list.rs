use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassStudentService;
use crate::models::{
    ApiResponse, ErrorCode,
    class_students::requests::{ClassStudentListParams, ClassStudentQuery},
};
use crate::services::common::{can_manage, current_user, internal_error, load_class};

pub async fn list_class_students(
    service: &ClassStudentService,
    request: &HttpRequest,
    class_id: i64,
    query: ClassStudentListParams,
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
            "You do not have permission to view students of this class",
        )));
    }

    let list_query = ClassStudentQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        search: query.search,
    };

    match storage
        .list_class_students_with_pagination(class_id, list_query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Class students retrieved successfully",
        ))),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            "Failed to retrieve class students",
            e,
        )),
    }
}
