/*! Shared conversion from maud templates to HTTP responses. */

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::Render;

/// Render a maud template into an HTML response with `status_code`.
#[inline]
pub fn render(status_code: StatusCode, template: impl Render) -> Response {
    (status_code, Html(template.render().into_string())).into_response()
}

#[cfg(test)]
mod render_tests {
    use axum::http::StatusCode;
    use maud::html;

    use crate::test_utils::get_header;

    use super::render;

    #[test]
    fn sets_status_and_content_type() {
        let response = render(StatusCode::NOT_FOUND, html! { p { "gone" } });

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_header(&response, "content-type"),
            "text/html; charset=utf-8"
        );
    }
}
