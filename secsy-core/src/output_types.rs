//! Typed records produced by output mapping

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which record a task's output map produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    Subdomain,
    Port,
}

/// A subdomain found for a parent domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subdomain {
    pub host: String,
    pub domain: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// An open port on a host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Port {
    pub ip: String,
    pub port: u16,
    #[serde(default)]
    pub host: Option<String>,
}

/// A normalized output record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "snake_case")]
pub enum Finding {
    Subdomain(Subdomain),
    Port(Port),
}

impl Finding {
    /// Deserialize a mapped JSON object into the record for `output_type`
    pub fn from_value(
        output_type: OutputType,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match output_type {
            OutputType::Subdomain => Finding::Subdomain(serde_json::from_value(value)?),
            OutputType::Port => Finding::Port(serde_json::from_value(value)?),
        })
    }

    pub fn output_type(&self) -> OutputType {
        match self {
            Finding::Subdomain(_) => OutputType::Subdomain,
            Finding::Port(_) => OutputType::Port,
        }
    }

    /// Host this finding points at, usable as input to a later task
    pub fn target(&self) -> Option<&str> {
        match self {
            Finding::Subdomain(s) => Some(s.host.as_str()),
            Finding::Port(p) => p.host.as_deref().or(Some(p.ip.as_str())),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::Subdomain(s) => {
                write!(f, "[subdomain] {} ({})", s.host, s.domain)?;
                if !s.sources.is_empty() {
                    write!(f, " [{}]", s.sources.join(", "))?;
                }
                Ok(())
            }
            Finding::Port(p) => match &p.host {
                Some(host) => write!(f, "[port] {}:{} ({})", host, p.port, p.ip),
                None => write!(f, "[port] {}:{}", p.ip, p.port),
            },
        }
    }
}
