//! Rate limiting for the public catalog using governor.
//!
//! The menu-item listing is the one endpoint open to the world, and it gets
//! distinct ceilings for anonymous and authenticated callers: anonymous
//! traffic is keyed by client IP (taken from proxy headers), authenticated
//! traffic by user id.

use std::num::NonZeroU32;

use axum::http::HeaderMap;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use bistro_core::UserId;

use crate::error::AppError;

/// Anonymous ceiling: requests per minute per client IP.
const ANONYMOUS_PER_MINUTE: u32 = 60;

/// Authenticated ceiling: requests per minute per user.
const AUTHENTICATED_PER_MINUTE: u32 = 300;

/// Keyed throttles for the menu-item listing.
pub struct MenuListingThrottle {
    anonymous: DefaultKeyedRateLimiter<String>,
    authenticated: DefaultKeyedRateLimiter<i32>,
}

impl MenuListingThrottle {
    /// Create a throttle with explicit per-minute ceilings.
    ///
    /// # Panics
    ///
    /// Panics if either ceiling is zero; both call sites pass nonzero
    /// constants.
    #[must_use]
    pub fn new(anonymous_per_minute: u32, authenticated_per_minute: u32) -> Self {
        let anonymous_quota = Quota::per_minute(
            NonZeroU32::new(anonymous_per_minute).expect("anonymous ceiling must be nonzero"),
        );
        let authenticated_quota = Quota::per_minute(
            NonZeroU32::new(authenticated_per_minute)
                .expect("authenticated ceiling must be nonzero"),
        );
        Self {
            anonymous: RateLimiter::keyed(anonymous_quota),
            authenticated: RateLimiter::keyed(authenticated_quota),
        }
    }

    /// Check an anonymous caller against the per-IP ceiling.
    ///
    /// # Errors
    ///
    /// Returns `AppError::RateLimited` when the ceiling is exceeded.
    pub fn check_anonymous(&self, client_ip: &str) -> Result<(), AppError> {
        self.anonymous
            .check_key(&client_ip.to_owned())
            .map_err(|_| AppError::RateLimited)
    }

    /// Check an authenticated caller against the per-user ceiling.
    ///
    /// # Errors
    ///
    /// Returns `AppError::RateLimited` when the ceiling is exceeded.
    pub fn check_user(&self, user_id: UserId) -> Result<(), AppError> {
        self.authenticated
            .check_key(&user_id.as_i32())
            .map_err(|_| AppError::RateLimited)
    }

    /// Drop bucket state for keys that have gone quiet.
    ///
    /// The keyed stores grow by one entry per distinct IP/user; the binary
    /// calls this on an interval so idle keys don't accumulate forever.
    pub fn prune(&self) {
        self.anonymous.retain_recent();
        self.authenticated.retain_recent();
    }
}

impl Default for MenuListingThrottle {
    fn default() -> Self {
        Self::new(ANONYMOUS_PER_MINUTE, AUTHENTICATED_PER_MINUTE)
    }
}

/// Best-effort client IP from proxy headers.
///
/// Checks `X-Forwarded-For` (first hop) then `X-Real-IP`; callers behind no
/// proxy share the fallback bucket.
#[must_use]
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return ip.to_owned();
    }

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return ip.to_owned();
    }

    "unknown".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_ceiling_enforced() {
        let throttle = MenuListingThrottle::new(2, 2);

        assert!(throttle.check_anonymous("10.0.0.1").is_ok());
        assert!(throttle.check_anonymous("10.0.0.1").is_ok());
        assert!(matches!(
            throttle.check_anonymous("10.0.0.1"),
            Err(AppError::RateLimited)
        ));

        // A different IP has its own bucket.
        assert!(throttle.check_anonymous("10.0.0.2").is_ok());
    }

    #[test]
    fn test_user_ceiling_independent_of_anonymous() {
        let throttle = MenuListingThrottle::new(1, 2);
        let user = UserId::new(1);

        assert!(throttle.check_anonymous("10.0.0.1").is_ok());
        assert!(throttle.check_user(user).is_ok());
        assert!(throttle.check_user(user).is_ok());
        assert!(matches!(
            throttle.check_user(user),
            Err(AppError::RateLimited)
        ));
    }

    #[test]
    fn test_prune_keeps_active_buckets() {
        let throttle = MenuListingThrottle::new(2, 2);

        assert!(throttle.check_anonymous("10.0.0.1").is_ok());
        assert!(throttle.check_anonymous("10.0.0.1").is_ok());
        throttle.prune();

        // A bucket still inside its quota window survives pruning.
        assert!(matches!(
            throttle.check_anonymous("10.0.0.1"),
            Err(AppError::RateLimited)
        ));
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "1.2.3.4, 5.6.7.8".parse().expect("header"));
        headers.insert("x-real-ip", "9.9.9.9".parse().expect("header"));
        assert_eq!(client_ip(&headers), "1.2.3.4");
    }

    #[test]
    fn test_client_ip_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "9.9.9.9".parse().expect("header"));
        assert_eq!(client_ip(&headers), "9.9.9.9");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
