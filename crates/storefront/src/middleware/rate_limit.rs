//! Rate limiting for the password endpoints, using governor and `tower_governor`.
//!
//! `/api/signup` and `/api/login` each run an Argon2 hash, so they are held to
//! a strict per-client budget (~10/min). Rejections are rewritten into the
//! API's `{"error": ...}` shape by [`rate_limited_as_json`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::ConnectInfo,
    http::{HeaderName, Request, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::routes::api::ApiError;

/// Header governor uses to report the wait in seconds.
const RATE_LIMIT_AFTER: HeaderName = HeaderName::from_static("x-ratelimit-after");

/// Key extractor: first proxy-reported client address, then the peer address.
///
/// Requests with neither (in-process callers) share one bucket.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // X-Forwarded-For: first address in the chain
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        Ok(req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |info| info.0.ip()))
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Rate limiter for the password endpoints: ~10 requests per minute per client.
///
/// Replenishes one request every 6 seconds with a burst of 5. Returns `None`
/// only if governor rejects the quota.
#[must_use]
pub fn auth_rate_limiter() -> Option<RateLimiterLayer> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()?;
    Some(GovernorLayer::new(Arc::new(config)))
}

/// Replace governor's plain-text 429 with the API error body, keeping the
/// retry headers.
pub async fn rate_limited_as_json(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let mut json = ApiError::too_many_requests().into_response();
    for name in [RETRY_AFTER, RATE_LIMIT_AFTER] {
        if let Some(value) = response.headers().get(&name) {
            json.headers_mut().insert(name, value.clone());
        }
    }
    json
}
