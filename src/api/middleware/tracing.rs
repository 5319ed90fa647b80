//! HTTP request/response tracing middleware.

use axum::http::Request;
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

/// Request span without the query string, which may carry `p=` passwords
/// or `api_key=` credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathSpan;

impl<B> MakeSpan<B> for PathSpan {
    fn make_span(&mut self, req: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            version = ?req.version(),
        )
    }
}

pub type HttpTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    PathSpan,
    DefaultOnRequest,
    DefaultOnResponse,
>;

/// Creates the request tracing layer shared by both servers.
///
/// # Example Logs
///
/// ```text
/// INFO request{method=GET path=/promo version=HTTP/1.1}: finished processing request latency=3 ms status=302
/// ```
pub fn layer() -> HttpTraceLayer {
    TraceLayer::new_for_http().make_span_with(PathSpan).on_response(
        DefaultOnResponse::new()
            .level(Level::INFO)
            .latency_unit(LatencyUnit::Millis),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_builds_for_query_uri() {
        let req = Request::builder()
            .uri("/promo?p=secret")
            .body(())
            .unwrap();
        let _span = PathSpan.make_span(&req);
    }
}
