use axum::Json;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::header::HeaderName;
use narrator_core::ErrorBody;

/// CSRF protection middleware
///
/// Requests other than GET, HEAD and OPTIONS must carry `header_name`. Its
/// value is ignored; a plain form submit cannot set custom headers.
pub async fn csrf_middleware(header_name: HeaderName, request: Request, next: Next) -> Response {
    let method = request.method();

    if method == http::Method::GET || method == http::Method::HEAD || method == http::Method::OPTIONS {
        return next.run(request).await;
    }

    if request.headers().contains_key(&header_name) {
        next.run(request).await
    } else {
        (
            StatusCode::FORBIDDEN,
            Json(ErrorBody::new(format!("missing CSRF header: {header_name}"))),
        )
            .into_response()
    }
}
