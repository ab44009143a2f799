//! Toast container markup.

use askama::Template;

use crate::router::BasePath;
use crate::toast::{ToastBoard, ToastPhase};

struct ToastRow {
    message: String,
    kind: &'static str,
    phase_class: &'static str,
    dismiss_href: String,
}

#[derive(Template)]
#[template(path = "partials/toasts.html")]
struct ToastsTemplate {
    mounted: bool,
    toasts: Vec<ToastRow>,
}

/// The toast container, or nothing when it is unmounted.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn toasts(board: &ToastBoard, base: &BasePath) -> askama::Result<String> {
    ToastsTemplate {
        mounted: board.mounted,
        toasts: board
            .toasts
            .iter()
            .map(|toast| ToastRow {
                message: toast.message.clone(),
                kind: toast.kind.as_str(),
                phase_class: match toast.phase {
                    ToastPhase::Entering => "toast-entering",
                    ToastPhase::Visible => "toast-visible",
                    ToastPhase::Leaving => "toast-leaving",
                },
                dismiss_href: base.join(&format!("/toasts/{}/dismiss", toast.id)),
            })
            .collect(),
    }
    .render()
}
