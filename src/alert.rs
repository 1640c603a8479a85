//! Alert notices for displaying success and error messages to users.
//!
//! Alerts are rendered into the page's `#alert-container`, either directly as
//! the target of the refresh button or through `hx-target-error` when a region
//! request fails. They are dismissable and never block the page.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_htmx::{HxReswap, SwapOption};
use maud::{Markup, html};

/// A notice shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The requested action completed.
    Success { message: String, details: String },
    /// The requested action failed.
    Error { message: String, details: String },
}

impl Alert {
    /// A success notice with the standard "Success!" heading.
    pub fn success(details: impl Into<String>) -> Self {
        Self::Success {
            message: "Success!".to_owned(),
            details: details.into(),
        }
    }

    /// An error notice with the standard "Error!" heading.
    pub fn error(details: impl Into<String>) -> Self {
        Self::Error {
            message: "Error!".to_owned(),
            details: details.into(),
        }
    }

    pub fn into_html(self) -> Markup {
        let (style, icon, message, details) = match self {
            Alert::Success { message, details } => (
                "text-green-800 border-green-300 bg-green-50 dark:bg-gray-800 \
                dark:text-green-400 dark:border-green-800",
                "✓",
                message,
                details,
            ),
            Alert::Error { message, details } => (
                "text-red-800 border-red-300 bg-red-50 dark:bg-gray-800 \
                dark:text-red-400 dark:border-red-800",
                "!",
                message,
                details,
            ),
        };

        html! {
            div
                class={"alert flex items-start p-4 mb-4 border rounded-lg shadow " (style)}
                role="alert"
            {
                span class="me-3 font-bold" aria-hidden="true" { (icon) }

                div class="flex-1 text-sm"
                {
                    p class="font-semibold" { (message) }

                    @if !details.is_empty() {
                        p class="alert-details" { (details) }
                    }
                }

                button
                    type="button"
                    class="ms-3 text-sm font-medium"
                    aria-label="Close"
                    onclick="this.closest('.alert').remove()"
                {
                    "×"
                }
            }
        }
    }
}

impl Alert {
    /// Respond with this alert and an error `status_code`.
    ///
    /// The alert is swapped into `#alert-container` as its content. Regions
    /// swap themselves with `outerHTML`, and the error target would otherwise
    /// inherit that swap and replace the container.
    pub fn into_error_response(self, status_code: StatusCode) -> Response {
        (status_code, HxReswap(SwapOption::InnerHtml), self).into_response()
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}
