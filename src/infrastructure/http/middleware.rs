//! HTTP Middleware
//!
//! 请求结果日志：错误状态码告警，合成响应附带缓存结果

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// 合成响应上的缓存状态头
const CACHE_HEADER: &str = "x-cache";

/// 请求结果日志中间件
///
/// 4xx 记 warn，5xx 记 error，错误原因由 ApiError::into_response() 记录；
/// 带 X-Cache 的成功响应记 debug，便于观察命中率
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match status {
        500..=599 => tracing::error!(%method, %path, status, elapsed_ms, "Request failed"),
        400..=499 => tracing::warn!(%method, %path, status, elapsed_ms, "Request rejected"),
        _ => {
            if let Some(cache) = response
                .headers()
                .get(CACHE_HEADER)
                .and_then(|v| v.to_str().ok())
            {
                tracing::debug!(%method, %path, cache, elapsed_ms, "Audio served");
            }
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        response::IntoResponse,
        routing::get,
        Router,
    };
    use tower::util::ServiceExt;

    fn router() -> Router {
        Router::new()
            .route("/audio", get(|| async { ([(CACHE_HEADER, "HIT")], "RIFF").into_response() }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/upstream", get(|| async { StatusCode::BAD_GATEWAY }))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    async fn status_of(uri: &str) -> StatusCode {
        let request = HttpRequest::builder().uri(uri).body(Body::empty()).unwrap();
        router().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_status_passes_through() {
        assert_eq!(status_of("/audio").await, StatusCode::OK);
        assert_eq!(status_of("/missing").await, StatusCode::NOT_FOUND);
        assert_eq!(status_of("/broken").await, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of("/upstream?trace=1").await, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_headers_untouched() {
        let request = HttpRequest::builder().uri("/audio").body(Body::empty()).unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()[CACHE_HEADER], "HIT");
    }
}
