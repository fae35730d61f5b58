//! Shared option and field names

pub const DEFAULT_DNS_WORDLIST: &str =
    "/usr/share/seclists/Discovery/DNS/subdomains-top1million-5000.txt";

// Task options
pub const WORDLIST: &str = "wordlist";
pub const PORTS: &str = "ports";
pub const TOP_PORTS: &str = "top_ports";

// Output fields
pub const HOST: &str = "host";
pub const DOMAIN: &str = "domain";
pub const SOURCES: &str = "sources";
