//! Shopper extractor.
//!
//! Resolves the [`Shopper`] for the current browser session, minting a new
//! [`ShopperId`] into the session on first visit.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use pocket_mall_core::ShopperId;

use crate::error::set_sentry_user;
use crate::shopper::Shopper;
use crate::state::AppState;

/// Session key holding the shopper ID.
pub const SHOPPER_ID_KEY: &str = "shopper_id";

/// The shopper behind the current request.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentShopper(shopper): CurrentShopper) -> impl IntoResponse {
///     format!("{} items", shopper.cart().snapshot().summary.total_count)
/// }
/// ```
pub struct CurrentShopper(pub Arc<Shopper>);

/// Error returned when the session layer is missing or the session store fails.
#[derive(Debug)]
pub struct SessionRejection;

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable").into_response()
    }
}

impl FromRequestParts<AppState> for CurrentShopper {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(SessionRejection)?;

        let id = shopper_id(session).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read shopper session");
            SessionRejection
        })?;

        set_sentry_user(&id);
        tracing::Span::current().record("shopper_id", tracing::field::display(id));

        Ok(Self(state.shoppers().get_or_create(id).await))
    }
}

/// The session's shopper ID, created on first use.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn shopper_id(session: &Session) -> Result<ShopperId, tower_sessions::session::Error> {
    if let Some(id) = session.get::<ShopperId>(SHOPPER_ID_KEY).await? {
        return Ok(id);
    }
    let id = ShopperId::new_random();
    session.insert(SHOPPER_ID_KEY, id).await?;
    tracing::debug!(shopper_id = %id, "New shopper session");
    Ok(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_shopper_id_is_stable_within_a_session() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        let first = shopper_id(&session).await.unwrap();
        let second = shopper_id(&session).await.unwrap();
        assert_eq!(first, second);

        let other = Session::new(None, Arc::new(MemoryStore::default()), None);
        assert_ne!(shopper_id(&other).await.unwrap(), first);
    }
}
