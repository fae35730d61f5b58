//! Target-scoped scan presets

use super::WorkflowRegistry;
use crate::error::{Result, SecsyError};
use regex_utils::target::{self, Kind};
use std::fmt;

/// Kind of target a scan accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Domain,
    /// Domain or IPv4 address
    Host,
    Any,
}

impl TargetKind {
    pub fn accepts(self, value: &str) -> bool {
        let kind = target::classify(value);
        match self {
            TargetKind::Domain => kind == Some(Kind::Domain),
            TargetKind::Host => matches!(kind, Some(Kind::Domain | Kind::Ipv4)),
            TargetKind::Any => !value.trim().is_empty(),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TargetKind::Domain => "a domain name",
            TargetKind::Host => "a domain name or IPv4 address",
            TargetKind::Any => "a non-empty target",
        })
    }
}

/// A named preset of workflows for one target
#[derive(Debug, Clone)]
pub struct Scan {
    pub name: String,
    pub description: String,
    pub target_kind: TargetKind,
    pub workflows: Vec<String>,
}

impl Scan {
    pub fn new(name: &str, description: &str, target_kind: TargetKind, workflows: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            target_kind,
            workflows: workflows.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn check_target(&self, value: &str) -> Result<()> {
        if self.target_kind.accepts(value) {
            Ok(())
        } else {
            Err(SecsyError::InvalidTarget {
                target: value.to_string(),
                expected: self.target_kind.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanRegistry {
    scans: Vec<Scan>,
}

impl ScanRegistry {
    pub fn builtin() -> Self {
        Self {
            scans: vec![
                Scan::new(
                    "domain",
                    "Subdomains of a domain, then its open ports",
                    TargetKind::Domain,
                    &["subdomain_recon", "port_discovery"],
                ),
                Scan::new("host", "Open ports of a single host", TargetKind::Host, &["port_discovery"]),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<&Scan> {
        self.scans.iter().find(|s| s.name == name)
    }

    pub fn resolve(&self, name: &str) -> Result<&Scan> {
        self.get(name).ok_or_else(|| SecsyError::UnknownScan { name: name.to_string() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scan> {
        self.scans.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.scans.iter().map(|s| s.name.as_str()).collect()
    }

    /// Every scan must name registered workflows
    pub fn check_workflows(&self, workflows: &WorkflowRegistry) -> Result<()> {
        for scan in &self.scans {
            for name in &scan.workflows {
                workflows.resolve(name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_kinds() {
        assert!(TargetKind::Domain.accepts("example.com"));
        assert!(!TargetKind::Domain.accepts("10.0.0.1"));
        assert!(TargetKind::Host.accepts("10.0.0.1"));
        assert!(TargetKind::Host.accepts("www.example.com"));
        assert!(!TargetKind::Host.accepts("10.0.0.0/24"));
        assert!(!TargetKind::Host.accepts("https://example.com"));
        assert!(TargetKind::Any.accepts("10.0.0.0/24"));
        assert!(!TargetKind::Any.accepts("  "));
    }

    #[test]
    fn test_check_target() {
        let scans = ScanRegistry::builtin();
        let domain = scans.resolve("domain").unwrap();
        assert!(domain.check_target("example.com").is_ok());

        let err = domain.check_target("192.168.0.1").unwrap_err();
        assert_eq!(err.to_string(), "Invalid target '192.168.0.1': expected a domain name");
    }

    #[test]
    fn test_builtin_scans_reference_known_workflows() {
        let scans = ScanRegistry::builtin();
        assert_eq!(scans.names(), vec!["domain", "host"]);
        assert!(scans.check_workflows(&WorkflowRegistry::builtin()).is_ok());
        assert!(scans.check_workflows(&WorkflowRegistry::default()).is_err());
        assert!(matches!(scans.resolve("web"), Err(SecsyError::UnknownScan { .. })));
    }
}
