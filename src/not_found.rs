//! The page shown for routes the server does not know.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// The fallback handler for unknown routes.
pub async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(
            error_view(
                "Not Found",
                "404",
                "Page Not Found",
                "The page you are looking for does not exist. Check the address or head back to the dashboard.",
            )
            .into_string(),
        ),
    )
        .into_response()
}
