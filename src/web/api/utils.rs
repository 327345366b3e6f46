use tide::http::StatusCode;
use tide::Response;

/// A JSON `{"reason": ...}` response with the given status.
pub fn rejection(status: StatusCode, reason: &str) -> Response {
    Response::builder(status)
        .body(tide::convert::json!({ "reason": reason }))
        .build()
}
