//! Regex utilities for secsy
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::Regex;

/// Domain name patterns
pub mod domain {
    use super::*;

    /// At least two labels, alphabetic TLD, no trailing dot
    pub static DOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?i)(?:[a-z0-9_](?:[a-z0-9_-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$")
            .expect("Invalid regex pattern")
    });

    pub fn is_domain(text: &str) -> bool {
        text.len() <= 253 && DOMAIN_PATTERN.is_match(text)
    }
}

/// IPv4 address and CIDR patterns
pub mod ipv4 {
    use super::*;

    pub static IPV4_PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)$")
            .expect("Invalid regex pattern")
    });

    pub static CIDR_PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?P<addr>[0-9.]+)/(?P<prefix>3[0-2]|[12]?\d)$")
            .expect("Invalid regex pattern")
    });

    pub fn is_ipv4(text: &str) -> bool {
        IPV4_PATTERN.is_match(text)
    }

    pub fn is_cidr(text: &str) -> bool {
        CIDR_PATTERN
            .captures(text)
            .and_then(|caps| caps.name("addr"))
            .is_some_and(|addr| is_ipv4(addr.as_str()))
    }
}

/// URL patterns
pub mod url {
    use super::*;

    pub static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?i)https?://[^/:?#\s]+(?::\d{1,5})?(?:[/?#]\S*)?$")
            .expect("Invalid regex pattern")
    });

    pub fn is_url(text: &str) -> bool {
        URL_PATTERN.is_match(text)
    }
}

/// Target classification
pub mod target {
    use super::*;

    /// Kind of a scan target, most specific match first
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Kind {
        Ipv4,
        Cidr,
        Url,
        Domain,
    }

    pub fn classify(text: &str) -> Option<Kind> {
        let text = text.trim();
        if ipv4::is_ipv4(text) {
            Some(Kind::Ipv4)
        } else if ipv4::is_cidr(text) {
            Some(Kind::Cidr)
        } else if url::is_url(text) {
            Some(Kind::Url)
        } else if domain::is_domain(text) {
            Some(Kind::Domain)
        } else {
            None
        }
    }
}
