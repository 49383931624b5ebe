use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::AnalyticsService;
use crate::utils::SafeStudentIdI64;

static ANALYTICS_SERVICE: Lazy<AnalyticsService> = Lazy::new(AnalyticsService::new_lazy);

pub async fn student_analytics(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    ANALYTICS_SERVICE.student_analytics(&req, student_id.0).await
}

// 学生本人、管理员以及任课教师可查看，权限在服务层校验
pub fn configure_students_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/students")
            .wrap(middlewares::RequireJWT)
            .route("/{student_id}/analytics", web::get().to(student_analytics)),
    );
}
