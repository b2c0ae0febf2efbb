use actix_session::SessionExt;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorForbidden,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::Instrument;

use crate::models::UserRole;
use crate::session_state::TypedSession;

// Guards employee-only scopes (check-in, warehouse admin, request approval)
pub struct EmployeeMiddlewareFactory;

impl<S> Transform<S, ServiceRequest> for EmployeeMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = actix_web::Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = EmployeeMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(EmployeeMiddleware { service }))
    }
}

pub struct EmployeeMiddleware<S> {
    service: S,
}

impl<S> Service<ServiceRequest> for EmployeeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = actix_web::Error>,
    S::Future: 'static,
{
    type Response = S::Response;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    #[tracing::instrument("Checking if user is an employee", skip(self, req))]
    fn call(&self, req: ServiceRequest) -> Self::Future {
        let session = TypedSession(req.get_session());
        let role_option = session.get("role").unwrap_or(None);

        let current_span = tracing::Span::current();

        let is_employee = role_option
            .as_deref()
            .map(|role| UserRole::parse(role) == Ok(UserRole::Employee))
            .unwrap_or(false);

        if !is_employee {
            return Box::pin(ready(Err(ErrorForbidden("Not authorized"))).instrument(current_span));
        }

        let fut = self.service.call(req);

        Box::pin(
            async move {
                let res = fut.await?;
                Ok(res)
            }
            .instrument(current_span),
        )
    }
}
