use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::attempts::requests::{AttemptHistoryParams, SaveAnswersRequest};
use crate::models::users::entities::UserRole;
use crate::services::AttemptService;
use crate::utils::SafeResultIdI64;

// 懒加载的全局 AttemptService 实例
static ATTEMPT_SERVICE: Lazy<AttemptService> = Lazy::new(AttemptService::new_lazy);

pub async fn list_my_attempts(
    req: HttpRequest,
    query: web::Query<AttemptHistoryParams>,
) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE
        .list_my_attempts(&req, query.into_inner())
        .await
}

pub async fn get_attempt(
    req: HttpRequest,
    result_id: SafeResultIdI64,
) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE.get_attempt(&req, result_id.0).await
}

pub async fn save_answers(
    req: HttpRequest,
    result_id: SafeResultIdI64,
    answers: web::Json<SaveAnswersRequest>,
) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE
        .save_answers(&req, result_id.0, answers.into_inner())
        .await
}

pub async fn complete_attempt(
    req: HttpRequest,
    result_id: SafeResultIdI64,
) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE.complete_attempt(&req, result_id.0).await
}

// 配置路由
pub fn configure_attempts_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/attempts")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/my").route(
                    web::get()
                        .to(list_my_attempts)
                        .wrap(middlewares::RequireRole::new(&UserRole::Student)),
                ),
            )
            // 作答详情对学生本人与出题教师开放，权限在服务层校验
            .service(web::resource("/{result_id}").route(web::get().to(get_attempt)))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new(&UserRole::Student))
                    .route("/{result_id}/answers", web::put().to(save_answers))
                    .route("/{result_id}/complete", web::post().to(complete_attempt)),
            ),
    );
}
