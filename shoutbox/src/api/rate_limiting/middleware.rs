//! Logs requests rejected by the rate limiter.

use axum::http::{Request, Response, StatusCode};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::warn;

#[derive(Clone)]
pub struct RateLimitLoggingLayer {
    tier_name: &'static str,
}

impl RateLimitLoggingLayer {
    pub fn new(tier_name: &'static str) -> Self {
        Self { tier_name }
    }
}

impl<S> Layer<S> for RateLimitLoggingLayer {
    type Service = RateLimitLoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitLoggingService {
            inner,
            tier_name: self.tier_name,
        }
    }
}

#[derive(Clone)]
pub struct RateLimitLoggingService<S> {
    inner: S,
    tier_name: &'static str,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RateLimitLoggingService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let mut inner = self.inner.clone();
        let tier_name = self.tier_name;
        let method = req.method().clone();
        let uri = req.uri().clone();

        Box::pin(async move {
            let response = inner.call(req).await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                warn!("Rate limit hit on tier {}: {} {}", tier_name, method, uri);
            }

            Ok(response)
        })
    }
}
