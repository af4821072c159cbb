use axum::http::{HeaderMap, Request};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_governor::{key_extractor::KeyExtractor, GovernorError};

/// Client IP key for rate limiting.
///
/// Proxy headers are consulted first (`X-Forwarded-For`, then
/// `X-Real-IP`), then the socket peer address. Requests with no
/// identifiable client share the localhost bucket, which keeps limiting
/// active behind container networking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        let proxied = first_header_ip(headers, "x-forwarded-for")
            .or_else(|| first_header_ip(headers, "x-real-ip"));
        if let Some(ip) = proxied {
            return Ok(ip);
        }

        Ok(req
            .extensions()
            .get::<axum::extract::ConnectInfo<SocketAddr>>()
            .map_or(IpAddr::V4(Ipv4Addr::LOCALHOST), |info| info.0.ip()))
    }
}

/// First address of a comma-separated header chain.
fn first_header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}
