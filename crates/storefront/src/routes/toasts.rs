//! Toast route handlers.

use axum::{extract::Path, http::StatusCode};
use tracing::instrument;

use crate::middleware::CurrentShopper;
use crate::toast::ToastId;

/// Dismiss a toast before its timer does. Unknown or already-leaving toasts
/// are ignored.
#[instrument(skip_all, fields(shopper_id = %shopper.id(), toast_id = id))]
pub async fn dismiss(CurrentShopper(shopper): CurrentShopper, Path(id): Path<u64>) -> StatusCode {
    shopper.toaster().dismiss(ToastId::new(id));
    StatusCode::NO_CONTENT
}
