//! The 500 page shown when an unexpected error occurs.

use axum::{http::StatusCode, response::Response};

use crate::{html::error_view, shared_templates::render};

/// The text shown on the internal server error page.
pub struct InternalServerErrorPageTemplate<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerErrorPageTemplate<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

pub async fn get_internal_server_error_page() -> Response {
    render_internal_server_error(Default::default())
}

pub fn render_internal_server_error(template: InternalServerErrorPageTemplate) -> Response {
    render(
        StatusCode::INTERNAL_SERVER_ERROR,
        error_view("Error", "500", template.description, template.fix),
    )
}
