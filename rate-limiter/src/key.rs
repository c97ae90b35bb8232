//! Client identity extraction for rate-limit keying

/// Stable fallback identity used when no client address is available
pub const FALLBACK_CLIENT_KEY: &str = "unknown";

/// Derive the rate-limit key from a forwarded-for address chain.
///
/// Takes the first (client-most) entry of the chain. Multiple clients
/// behind the same proxy or NAT share a bucket; requests with no chain at
/// all share the fallback bucket.
pub fn client_key(forwarded_for: Option<&str>) -> String {
    forwarded_for
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_CLIENT_KEY.to_string())
}
