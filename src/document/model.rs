//! Document model types.
//!
//! These structs describe one application deployed across several named
//! environments. They map one-to-one onto the `envforge.yaml` document file
//! and are the single input of the markup emitter.
//!
//! Optional scalars are plain strings where the empty string means "absent",
//! so that half-filled entries stay representable while an operator edits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EditorError;

/// Name of the environment every new document starts with.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// The full multi-environment configuration tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Application identity.
    #[serde(default)]
    pub application: Application,
    /// Environments in insertion order.
    #[serde(default)]
    pub environments: Vec<Environment>,
}

/// Top-level application identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Application {
    /// Application name.
    #[serde(default)]
    pub name: String,
    /// Application version.
    #[serde(default)]
    pub version: String,
    /// Free-form description (empty when absent).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// A named deployment context such as dev, staging or prod.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Environment {
    /// Environment name.
    #[serde(default)]
    pub name: String,
    /// Services deployed in this environment.
    #[serde(default)]
    pub services: Vec<Service>,
    /// Environment-scoped variables.
    #[serde(default)]
    pub variables: Vec<Variable>,
}

/// One deployable unit within an environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    /// Service name.
    #[serde(default)]
    pub name: String,
    /// Container image.
    #[serde(default)]
    pub image: String,
    /// Image tag (empty when absent).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    /// Published ports.
    #[serde(default)]
    pub ports: Vec<Port>,
    /// Service-scoped variables.
    #[serde(default)]
    pub environment: Vec<Variable>,
    /// Volume declarations, carried as-is.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    /// Names of services this one depends on, carried as-is.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Command override (empty when absent).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command: String,
    /// Working directory (empty when absent).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub working_dir: String,
    /// Replica count as entered (empty when absent).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub replicas: String,
}

/// A host-to-container port mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Port {
    /// Host port as entered.
    #[serde(default)]
    pub host: String,
    /// Container port as entered.
    #[serde(default)]
    pub container: String,
    /// Transport protocol.
    #[serde(default)]
    pub protocol: Protocol,
}

/// Port protocol.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// TCP, the default.
    #[default]
    Tcp,
    /// UDP.
    Udp,
}

/// A name/value pair. Names are not deduplicated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variable {
    /// Variable name.
    #[serde(default)]
    pub name: String,
    /// Variable value.
    #[serde(default)]
    pub value: String,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a new document seeded with a single `dev` environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            application: Application::default(),
            environments: vec![Environment::named(DEFAULT_ENVIRONMENT)],
        }
    }

    /// Returns environment names in document order.
    #[must_use]
    pub fn environment_names(&self) -> Vec<&str> {
        self.environments.iter().map(|e| e.name.as_str()).collect()
    }

    /// Returns the total number of services across all environments.
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.environments.iter().map(|e| e.services.len()).sum()
    }
}

impl Environment {
    /// Creates an environment with no services and no variables.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            services: Vec::new(),
            variables: Vec::new(),
        }
    }
}

impl Port {
    /// Returns true if both endpoints are filled in.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.host.is_empty() && !self.container.is_empty()
    }
}

impl Variable {
    /// Creates a variable.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns true if both name and value are filled in.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.value.is_empty()
    }
}

impl Protocol {
    /// Returns the lowercase protocol name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            _ => Err(EditorError::InvalidProtocol {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_seeds_dev() {
        let doc = Document::new();
        assert_eq!(doc.environment_names(), vec!["dev"]);
        assert!(doc.environments[0].services.is_empty());
        assert!(doc.environments[0].variables.is_empty());
        assert!(doc.application.name.is_empty());
    }

    #[test]
    fn test_protocol_parse() {
        assert_eq!("tcp".parse::<Protocol>().ok(), Some(Protocol::Tcp));
        assert_eq!("UDP".parse::<Protocol>().ok(), Some(Protocol::Udp));
        assert!("sctp".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_completeness() {
        let port = Port {
            host: String::from("8080"),
            ..Port::default()
        };
        assert!(!port.is_complete());
        assert!(!Variable::new("KEY", "").is_complete());
        assert!(Variable::new("KEY", "v").is_complete());
    }

    #[test]
    fn test_yaml_defaults_fill_missing_fields() {
        let yaml = r"
application:
  name: my-app
environments:
  - name: prod
    services:
      - name: web
        image: nginx
        ports:
          - host: '8080'
            container: '80'
";
        let doc: Document = serde_yaml::from_str(yaml).expect("valid yaml");
        let service = &doc.environments[0].services[0];
        assert_eq!(service.ports[0].protocol, Protocol::Tcp);
        assert!(service.tag.is_empty());
        assert!(service.environment.is_empty());
        assert!(doc.application.version.is_empty());
    }
}
