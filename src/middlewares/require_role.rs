/*!
 * 基于角色的访问控制中间件
 *
 * 必须挂在 `RequireJWT` 之内（actix 中后注册的中间件先执行，
 * 因此 `RequireJWT` 要包在外层 scope 上，或在同一 scope 上最后 `.wrap`）。
 *
 * ```rust,ignore
 * web::scope("/api/v1/tests")
 *     .wrap(RequireJWT)
 *     .service(
 *         web::resource("/available")
 *             .route(web::get().to(list_available).wrap(RequireRole::new(&UserRole::Student))),
 *     )
 *     .service(
 *         web::scope("")
 *             .wrap(RequireRole::new_any(UserRole::teacher_roles()))
 *             .route("", web::post().to(create_test)),
 *     )
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{info, warn};

use super::create_error_response;
use crate::models::{
    ErrorCode,
    users::entities::{User, UserRole},
};

/// 放行的角色集合，命中任一即可
#[derive(Clone)]
pub struct RequireRole {
    allowed: Rc<[UserRole]>,
}

impl RequireRole {
    /// 仅允许单一角色
    pub fn new(role: &UserRole) -> Self {
        Self {
            allowed: Rc::from(vec![role.clone()]),
        }
    }

    /// 允许任一角色，配合 `UserRole::teacher_roles()` 等分组使用
    pub fn new_any(roles: &[&UserRole]) -> Self {
        Self {
            allowed: roles.iter().map(|r| (*r).clone()).collect(),
        }
    }

    fn permits(&self, role: &UserRole) -> bool {
        self.allowed.contains(role)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            gate: self.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    gate: RequireRole,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let gate = self.gate.clone();

        Box::pin(async move {
            let caller = req
                .extensions()
                .get::<User>()
                .map(|user| (user.id, user.role.clone()));

            let Some((user_id, role)) = caller else {
                warn!("Role check reached without an authenticated user on {}", req.path());
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Authentication required",
                    )
                    .map_into_right_body(),
                ));
            };

            if gate.permits(&role) {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            info!(
                "User {} with role {} denied on {} (allowed: {:?})",
                user_id,
                role,
                req.path(),
                gate.allowed
            );
            Ok(req.into_response(
                create_error_response(StatusCode::FORBIDDEN, ErrorCode::Forbidden, "Access denied")
                    .map_into_right_body(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_gate() {
        let gate = RequireRole::new_any(UserRole::teacher_roles());
        assert!(gate.permits(&UserRole::Teacher));
        assert!(gate.permits(&UserRole::Admin));
        assert!(!gate.permits(&UserRole::Student));
    }

    #[test]
    fn test_single_role_gate() {
        let gate = RequireRole::new(&UserRole::Student);
        assert!(gate.permits(&UserRole::Student));
        assert!(!gate.permits(&UserRole::Admin));
    }
}
