use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SystemService;
use crate::models::{ApiResponse, system::responses::HealthResponse};

pub async fn health(_service: &SystemService, _request: &HttpRequest) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        HealthResponse {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now(),
        },
        "Service is healthy",
    )))
}
