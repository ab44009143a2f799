//! Full-document layout and the error view.

use askama::Template;
use askama_web::WebTemplate;

use super::Endpoints;
use crate::router::BasePath;

/// Full HTML document, served on first load and history restores.
///
/// Later navigations only replace `#root`.
#[derive(Template, WebTemplate)]
#[template(path = "layout.html")]
pub struct Document {
    pub title: String,
    pub endpoints: Endpoints,
    /// Markup of the root container.
    pub body: String,
    pub cart_badge: String,
    pub cart_modal: String,
    pub toasts: String,
}

impl Document {
    #[must_use]
    pub fn new(title: impl Into<String>, base: &BasePath, body: String) -> Self {
        Self {
            title: title.into(),
            endpoints: Endpoints::new(base),
            body,
            cart_badge: String::new(),
            cart_modal: String::new(),
            toasts: String::new(),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/error.html")]
struct ErrorTemplate<'a> {
    message: &'a str,
    retry_href: &'a str,
}

/// Error view with a retry link.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn error_view(message: &str, retry_href: &str) -> askama::Result<String> {
    ErrorTemplate {
        message,
        retry_href,
    }
    .render()
}
