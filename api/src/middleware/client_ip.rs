//! Client address resolution.
//!
//! The first `X-Forwarded-For` entry wins, then `X-Real-IP`, then the socket
//! peer address. The result is normalized so IPv4-mapped IPv6 addresses compare
//! equal to their IPv4 form.

use actix_web::http::header::HeaderMap;
use actix_web::HttpRequest;
use std::net::SocketAddr;

use tg_shared::ip;

pub const X_FORWARDED_FOR: &str = "X-Forwarded-For";
pub const X_REAL_IP: &str = "X-Real-IP";

/// Address reported when neither headers nor the socket identify the client
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolve the client address of a request
pub fn client_ip(req: &HttpRequest) -> String {
    resolve(req.headers(), req.peer_addr())
}

/// Resolve a client address from headers, falling back to the peer address
pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = header_str(headers, X_FORWARDED_FOR) {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return ip::normalize(first);
        }
    }

    if let Some(real_ip) = header_str(headers, X_REAL_IP) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return ip::normalize(real_ip);
        }
    }

    match peer {
        Some(addr) => ip::normalize(&addr.ip().to_string()),
        None => UNKNOWN_CLIENT.to_string(),
    }
}

/// Raw header value, if present and valid ASCII
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
