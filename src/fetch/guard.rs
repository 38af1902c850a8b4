//! Lexical SSRF filter for outbound fetches.
//!
//! Only the URL text is inspected; no DNS resolution happens here. Hostnames
//! that resolve to private addresses, or private addresses written in
//! unusual notations, are not caught.

use thiserror::Error;
use url::{Host, Url};

/// Hostnames refused outright (compared case-insensitively).
const BLOCKED_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0", "::1"];

/// Suffix reserved for link-local multicast DNS names.
const LOCAL_SUFFIX: &str = ".local";

/// Which rule refused a URL. Logged, never shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Scheme,
    Credentials,
    MissingHost,
    LoopbackHost,
    LocalSuffix,
    PrivateNetwork,
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            BlockReason::Scheme => "scheme is not http or https",
            BlockReason::Credentials => "credentials embedded in URL",
            BlockReason::MissingHost => "URL has no host",
            BlockReason::LoopbackHost => "loopback or unspecified host",
            BlockReason::LocalSuffix => "host under .local",
            BlockReason::PrivateNetwork => "private network address",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("URL not allowed")]
pub struct Blocked(pub BlockReason);

/// Decide whether `url` may be fetched.
pub fn check(url: &Url) -> Result<(), Blocked> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Blocked(BlockReason::Scheme));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(Blocked(BlockReason::Credentials));
    }

    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_lowercase(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        // Without the brackets `host_str` would carry.
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => return Err(Blocked(BlockReason::MissingHost)),
    };

    if BLOCKED_HOSTS.contains(&host.as_str()) {
        return Err(Blocked(BlockReason::LoopbackHost));
    }
    if host.ends_with(LOCAL_SUFFIX) {
        return Err(Blocked(BlockReason::LocalSuffix));
    }
    if is_private_prefix(&host) {
        return Err(Blocked(BlockReason::PrivateNetwork));
    }
    Ok(())
}

/// Textual prefix match for 10/8, 192.168/16 and 172.16/12.
fn is_private_prefix(host: &str) -> bool {
    if host.starts_with("10.") || host.starts_with("192.168.") {
        return true;
    }
    let Some(rest) = host.strip_prefix("172.") else {
        return false;
    };
    let Some((second, _)) = rest.split_once('.') else {
        return false;
    };
    matches!(second.parse::<u8>(), Ok(16..=31)) && second.len() == 2
}
