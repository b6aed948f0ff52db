use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID extension type
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// An incoming id is reused only if it is short and plain ASCII
fn accept_incoming(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Request ID middleware
///
/// Reuses a well-formed incoming `X-Request-ID` or generates one, stores it in
/// the request extensions and echoes it on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|s| accept_incoming(s))
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::debug_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Extension, Router};
    use axum_test::TestServer;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route("/whoami", get(|Extension(id): Extension<RequestId>| async move { id.0 }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn handlers_see_the_echoed_id() {
        let server = TestServer::new(app()).unwrap();
        let response = server
            .get("/whoami")
            .add_header(REQUEST_ID_HEADER, "job-42")
            .await;
        assert_eq!(response.text(), "job-42");
        assert_eq!(response.header(REQUEST_ID_HEADER), "job-42");
    }

    #[tokio::test]
    async fn generates_request_id() {
        let server = TestServer::new(app()).unwrap();
        let response = server.get("/").await;
        let id = response.header(REQUEST_ID_HEADER);
        assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn echoes_valid_incoming_id_and_replaces_junk() {
        let server = TestServer::new(app()).unwrap();

        let response = server
            .get("/")
            .add_header(REQUEST_ID_HEADER, "trace-abc.123")
            .await;
        assert_eq!(response.header(REQUEST_ID_HEADER), "trace-abc.123");

        let response = server
            .get("/")
            .add_header(REQUEST_ID_HEADER, "has spaces<script>")
            .await;
        assert_ne!(response.header(REQUEST_ID_HEADER), "has spaces<script>");
    }
}
