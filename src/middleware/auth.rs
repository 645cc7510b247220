use std::rc::Rc;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::utils::auth::decode_jwt;
pub use crate::utils::auth::Claims;
use crate::utils::config::Config;
use crate::utils::errors::ApiError;

/// Bearer-token guard for protected scopes. On success the decoded claims
/// are inserted into the request extensions, where handlers pick them up
/// via `web::ReqData<Claims>`.
pub struct JwtMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let secret = req
                .app_data::<web::Data<Config>>()
                .map(|config| config.jwt_secret.clone())
                .ok_or_else(|| {
                    Error::from(ApiError::Internal("Server configuration missing".to_string()))
                })?;

            let token = req
                .headers()
                .get("Authorization")
                .and_then(|header| header.to_str().ok())
                .and_then(|header| header.strip_prefix("Bearer "))
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::from(ApiError::Unauthorized(
                        "Missing or malformed authorization header".to_string(),
                    ))
                })?;

            let claims = decode_jwt(&token, &secret).map_err(|_| {
                Error::from(ApiError::Unauthorized("Invalid or expired token".to_string()))
            })?;

            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}
