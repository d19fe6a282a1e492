//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Path normalization (trailing slashes)
//! 2. Sentry layers (capture errors, transactions)
//! 3. `TraceLayer` (request span)
//! 4. Request ID (recorded on the span)
//! 5. Security headers
//! 6. Session layer (tower-sessions)
//!
//! `/api/signup` and `/api/login` additionally sit behind [`auth_rate_limiter`].
//!
//! The API token check is an extractor ([`ApiUser`]) rather than a layer so
//! public and authenticated endpoints can share a router.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::ApiUser;
pub use rate_limit::{auth_rate_limiter, rate_limited_as_json};
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{SessionError, SessionState, create_session_layer};
