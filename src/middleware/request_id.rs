use std::future::{Ready, ready};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::HeaderValue,
};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Correlation id carried in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

/// Propagates the caller's `X-Correlation-ID`, or assigns a fresh uuid, and
/// echoes it on the response.
pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestIdMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdMiddlewareService { service }))
    }
}

pub struct RequestIdMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let final_correlation_id = req
            .headers()
            .get(CORRELATION_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        req.extensions_mut()
            .insert(CorrelationId(final_correlation_id.clone()));

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;

            if let Ok(value) = HeaderValue::from_str(&final_correlation_id) {
                res.headers_mut().insert(
                    actix_web::http::header::HeaderName::from_static(CORRELATION_HEADER),
                    value,
                );
            }

            Ok(res)
        })
    }
}

pub trait RequestIdExt {
    /// The id assigned by `RequestIdMiddleware`, `-` on requests it did not see.
    fn correlation_id(&self) -> String;
}

impl RequestIdExt for actix_web::HttpRequest {
    fn correlation_id(&self) -> String {
        self.extensions()
            .get::<CorrelationId>()
            .map(|id| id.0.clone())
            .unwrap_or_else(|| "-".to_string())
    }
}
