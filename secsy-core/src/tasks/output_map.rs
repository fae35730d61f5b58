//! Output mapping: raw tool JSON to typed findings
//!
//! Computed fields go through [`Derivation`], a closed set of named pure
//! functions, so descriptors (including ones read from TOML) never carry code.

use crate::output_types::{Finding, OutputType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Named pure functions usable from an output map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Derivation {
    /// Drop the leftmost dot-separated label
    ParentDomain,
    Lowercase,
}

impl Derivation {
    pub const ALL: [Derivation; 2] = [Derivation::ParentDomain, Derivation::Lowercase];

    pub fn name(self) -> &'static str {
        match self {
            Derivation::ParentDomain => "parent_domain",
            Derivation::Lowercase => "lowercase",
        }
    }

    pub fn apply(self, input: &str) -> String {
        match self {
            Derivation::ParentDomain => parent_domain(input),
            Derivation::Lowercase => input.to_lowercase(),
        }
    }
}

impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Derivation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| format!("unknown derivation '{}'", s))
    }
}

/// `"www.example.com"` gives `"example.com"`, `"example.com"` gives `"com"`
/// and a single label gives an empty string.
pub fn parent_domain(host: &str) -> String {
    host.split('.').skip(1).collect::<Vec<_>>().join(".")
}

/// How one output field is filled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRule {
    /// Copy a raw field verbatim
    Copy(String),
    /// Apply a derivation to a raw string field
    Derive { function: Derivation, from: String },
    /// Wrap a raw field in a one-element list
    ListOf(String),
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("output line is not a JSON object")]
    NotAnObject,

    #[error("mapped item does not fit {output_type:?}: {source}")]
    Invalid {
        output_type: OutputType,
        #[source]
        source: serde_json::Error,
    },
}

/// Rule set translating a raw output item into a [`Finding`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMap {
    #[serde(rename = "type")]
    pub output_type: OutputType,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldRule>,
}

impl OutputMap {
    pub fn new(output_type: OutputType) -> Self {
        Self { output_type, fields: BTreeMap::new() }
    }

    pub fn copy(mut self, field: &str, source: &str) -> Self {
        self.fields.insert(field.to_string(), FieldRule::Copy(source.to_string()));
        self
    }

    pub fn derive(mut self, field: &str, function: Derivation, source: &str) -> Self {
        self.fields.insert(
            field.to_string(),
            FieldRule::Derive { function, from: source.to_string() },
        );
        self
    }

    pub fn list_of(mut self, field: &str, source: &str) -> Self {
        self.fields.insert(field.to_string(), FieldRule::ListOf(source.to_string()));
        self
    }

    /// Map one raw item. Unmapped raw fields pass through; a rule whose
    /// source is missing leaves its field unset.
    pub fn apply(&self, raw: &Value) -> Result<Finding, MappingError> {
        let item = raw.as_object().ok_or(MappingError::NotAnObject)?;
        let mut mapped: Map<String, Value> = item.clone();

        for (field, rule) in &self.fields {
            let value = match rule {
                FieldRule::Copy(source) => item.get(source).cloned(),
                FieldRule::Derive { function, from } => item
                    .get(from)
                    .and_then(Value::as_str)
                    .map(|s| Value::String(function.apply(s))),
                FieldRule::ListOf(source) => {
                    item.get(source).map(|v| Value::Array(vec![v.clone()]))
                }
            };
            match value {
                Some(value) => {
                    mapped.insert(field.clone(), value);
                }
                None => {
                    mapped.remove(field);
                }
            }
        }

        Finding::from_value(self.output_type, Value::Object(mapped))
            .map_err(|source| MappingError::Invalid { output_type: self.output_type, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output_types::Subdomain;
    use serde_json::json;

    #[test]
    fn test_parent_domain() {
        assert_eq!(parent_domain("www.example.com"), "example.com");
        assert_eq!(parent_domain("a.b.example.co.uk"), "b.example.co.uk");
        // Only the first label is dropped, even for a bare domain
        assert_eq!(parent_domain("example.com"), "com");
        assert_eq!(parent_domain("localhost"), "");
    }

    #[test]
    fn test_derivation_names_round_trip() {
        for derivation in Derivation::ALL {
            assert_eq!(derivation.name().parse::<Derivation>().unwrap(), derivation);
        }
        assert!("eval".parse::<Derivation>().is_err());
    }

    #[test]
    fn test_apply_copy_and_derive() {
        let map = OutputMap::new(OutputType::Subdomain)
            .copy("host", "host")
            .derive("domain", Derivation::ParentDomain, "host");

        let finding = map.apply(&json!({"host": "www.example.com", "a": ["1.2.3.4"]})).unwrap();
        assert_eq!(
            finding,
            Finding::Subdomain(Subdomain {
                host: "www.example.com".to_string(),
                domain: "example.com".to_string(),
                sources: vec![],
            })
        );
    }

    #[test]
    fn test_rule_overrides_passthrough_field() {
        let map = OutputMap::new(OutputType::Subdomain)
            .copy("domain", "input")
            .list_of("sources", "source");

        let finding = map
            .apply(&json!({"host": "api.example.com", "input": "example.com", "source": "crtsh"}))
            .unwrap();
        match finding {
            Finding::Subdomain(s) => {
                assert_eq!(s.domain, "example.com");
                assert_eq!(s.sources, vec!["crtsh".to_string()]);
            }
            other => panic!("unexpected finding {:?}", other),
        }
    }

    #[test]
    fn test_apply_rejects_bad_items() {
        let map = OutputMap::new(OutputType::Subdomain)
            .copy("host", "host")
            .derive("domain", Derivation::ParentDomain, "host");

        assert!(matches!(map.apply(&json!("www.example.com")), Err(MappingError::NotAnObject)));
        assert!(matches!(map.apply(&json!({"ip": "1.1.1.1"})), Err(MappingError::Invalid { .. })));
        // A non-string source leaves the derived field unset
        assert!(map.apply(&json!({"host": 42})).is_err());
    }

    #[test]
    fn test_output_map_from_toml() {
        let map: OutputMap = toml::from_str(
            r#"
            type = "subdomain"
            [fields]
            host = { copy = "name" }
            domain = { derive = { function = "parent_domain", from = "name" } }
            "#,
        )
        .unwrap();
        assert_eq!(
            map,
            OutputMap::new(OutputType::Subdomain)
                .copy("host", "name")
                .derive("domain", Derivation::ParentDomain, "name")
        );
    }
}
