use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::{
    ApiResponse, ErrorCode,
    classes::requests::{ClassListQuery, ClassQueryParams},
    users::entities::UserRole,
};
use crate::services::common::{current_user, internal_error};

pub async fn list_classes(
    service: &ClassService,
    request: &HttpRequest,
    query: ClassQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let caller = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let mut list_query = ClassListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        teacher_id: None,
        search: query.search,
    };

    let result = match caller.role {
        // 管理员可查全部班级
        UserRole::Admin => storage.list_classes_with_pagination(list_query).await,
        // 教师只能查询自己的班级
        UserRole::Teacher => {
            list_query.teacher_id = Some(caller.id);
            storage.list_classes_with_pagination(list_query).await
        }
        // 学生查询已加入的班级
        UserRole::Student => {
            storage
                .list_student_classes_with_pagination(caller.id, list_query)
                .await
        }
    };

    match result {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Class list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            "Failed to retrieve class list",
            e,
        )),
    }
}
