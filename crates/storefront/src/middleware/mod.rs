//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with an in-memory store)
//!
//! The [`CurrentShopper`] extractor then resolves the session's shopper.

pub mod request_id;
pub mod session;
pub mod shopper;

pub use request_id::request_id_middleware;
pub use session::create_session_layer;
pub use shopper::{CurrentShopper, SHOPPER_ID_KEY};
