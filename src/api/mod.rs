use axum::response::IntoResponse;
use http::StatusCode;

const API_BODY: &str = "X";
const NOT_FOUND_BODY: &str = "404 page not found\n";

/// Stateless request handler. Method, query and body are ignored.
pub async fn handle() -> &'static str {
    API_BODY
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}
