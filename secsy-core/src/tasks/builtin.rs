//! Built-in task descriptors

use crate::definitions::{DEFAULT_DNS_WORDLIST, DOMAIN, HOST, PORTS, SOURCES, TOP_PORTS, WORDLIST};
use crate::output_types::OutputType;
use crate::tasks::descriptor::{Category, OptKeyMap, OptionKind, OptionSpec, TaskDescriptor};
use crate::tasks::output_map::{Derivation, OutputMap};

/// Internal tasks in registration order
pub fn all() -> Vec<TaskDescriptor> {
    vec![dnsxbrute(), subfinder(), naabu()]
}

/// dnsx is a fast and multi-purpose DNS toolkit running various lookups
/// through the retryabledns library.
pub fn dnsxbrute() -> TaskDescriptor {
    TaskDescriptor {
        name: "dnsxbrute".to_string(),
        description: "Brute-force subdomains with dnsx".to_string(),
        category: Category::ReconDns,
        cmd: "dnsx".to_string(),
        json_flag: Some("-json".to_string()),
        input_flag: Some("-domain".to_string()),
        file_flag: Some("-domain".to_string()),
        opt_prefix: "-".to_string(),
        opt_key_map: OptKeyMap {
            rate_limit: Some("rate-limit".to_string()),
            retries: Some("retry".to_string()),
            threads: Some("threads".to_string()),
        },
        opts: vec![
            OptionSpec::new(WORDLIST, OptionKind::Str, "Wordlist")
                .with_short('w')
                .with_default(DEFAULT_DNS_WORDLIST),
        ],
        output_map: OutputMap::new(OutputType::Subdomain)
            .copy(HOST, "host")
            .derive(DOMAIN, Derivation::ParentDomain, "host"),
        install_cmd: Some("go install -v github.com/projectdiscovery/dnsx/cmd/dnsx@latest".to_string()),
    }
}

/// Passive subdomain enumeration from public sources
pub fn subfinder() -> TaskDescriptor {
    TaskDescriptor {
        name: "subfinder".to_string(),
        description: "Enumerate subdomains from passive sources".to_string(),
        category: Category::ReconDns,
        cmd: "subfinder".to_string(),
        json_flag: Some("-json".to_string()),
        input_flag: Some("-d".to_string()),
        file_flag: Some("-dL".to_string()),
        opt_prefix: "-".to_string(),
        opt_key_map: OptKeyMap {
            rate_limit: Some("rl".to_string()),
            retries: None,
            threads: Some("t".to_string()),
        },
        opts: vec![
            OptionSpec::new("all", OptionKind::Flag, "Use every source (slow)"),
            OptionSpec::new("max_time", OptionKind::Int, "Minutes to wait for results")
                .with_flag("max-time"),
        ],
        output_map: OutputMap::new(OutputType::Subdomain)
            .copy(HOST, "host")
            .copy(DOMAIN, "input")
            .list_of(SOURCES, "source"),
        install_cmd: Some(
            "go install -v github.com/projectdiscovery/subfinder/v2/cmd/subfinder@latest".to_string(),
        ),
    }
}

/// Fast port scanner
pub fn naabu() -> TaskDescriptor {
    TaskDescriptor {
        name: "naabu".to_string(),
        description: "Scan hosts for open ports".to_string(),
        category: Category::ReconPort,
        cmd: "naabu".to_string(),
        json_flag: Some("-json".to_string()),
        input_flag: Some("-host".to_string()),
        file_flag: Some("-list".to_string()),
        opt_prefix: "-".to_string(),
        opt_key_map: OptKeyMap {
            rate_limit: Some("rate".to_string()),
            retries: Some("retries".to_string()),
            threads: Some("c".to_string()),
        },
        opts: vec![
            OptionSpec::new(PORTS, OptionKind::Str, "Ports to scan (80,443,100-200)")
                .with_flag("p")
                .with_short('p'),
            OptionSpec::new(TOP_PORTS, OptionKind::Str, "Top ports to scan (100, 1000, full)"),
        ],
        output_map: OutputMap::new(OutputType::Port),
        install_cmd: Some(
            "sudo apt install -y libpcap-dev && go install -v github.com/projectdiscovery/naabu/v2/cmd/naabu@latest"
                .to_string(),
        ),
    }
}
