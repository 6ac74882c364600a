//! Error translation for HTTP responses
//!
//! Handler failures become `500 text/plain` with an `Error: ...` body.
//! Every other error status gets the small HTML error page.

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Marks a response produced by [`AppError`] so the page renderer skips it
#[derive(Debug, Clone, Copy)]
struct HandlerFailure;

/// A failed dictionary handler
#[derive(Debug)]
pub struct AppError(pub crate::Error);

impl From<crate::Error> for AppError {
    fn from(err: crate::Error) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {}", self.0);

        let mut response = (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Error: {}", self.0),
        )
            .into_response();
        response.extensions_mut().insert(HandlerFailure);
        response
    }
}

pub fn error_page(status: StatusCode) -> String {
    format!(
        "<p>Error Status: <span style='color:red;'>{}</span></p>",
        status.as_u16()
    )
}

/// Replace the body of any 4xx/5xx response with [`error_page`]
pub async fn render_error_page(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    let is_error = status.is_client_error() || status.is_server_error();
    if !is_error || response.extensions().get::<HandlerFailure>().is_some() {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    Response::from_parts(parts, Body::from(error_page(status)))
}
