//! Local consistency checks for documents.
//!
//! The editor accepts half-filled entries, so nothing here runs on mutation.
//! The checker is a separate pass that reports problems without touching the
//! document; the configuration service remains the authority on schema
//! validity.

use std::collections::HashSet;
use tracing::debug;

use super::model::{Document, Environment, Port, Service, Variable};

/// Result of a local check: errors and non-fatal warnings.
#[derive(Debug, Default, serde::Serialize)]
pub struct CheckReport {
    /// Problems that will make the document unusable downstream.
    pub errors: Vec<CheckIssue>,
    /// Problems worth a look that do not block anything.
    pub warnings: Vec<CheckIssue>,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CheckIssue {
    /// Path of the offending field, e.g. `environments[0].services[1].image`.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

/// Pure validation pass over a document.
#[derive(Debug, Default)]
pub struct DocumentChecker;

impl DocumentChecker {
    /// Creates a new checker.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Checks a document and returns every finding.
    #[must_use]
    pub fn check(&self, document: &Document) -> CheckReport {
        let mut report = CheckReport::default();

        if document.application.name.is_empty() {
            report.error("application.name", "Application name cannot be empty");
        }
        if document.application.version.is_empty() {
            report.warn(
                "application.version",
                "Application version is empty; a placeholder will be emitted",
            );
        }

        if document.environments.is_empty() {
            report.error("environments", "At least one environment is required");
        }

        let mut seen_envs = HashSet::new();
        for (i, env) in document.environments.iter().enumerate() {
            let prefix = format!("environments[{i}]");

            if env.name.is_empty() {
                report.error(format!("{prefix}.name"), "Environment name cannot be empty");
            } else if !seen_envs.insert(env.name.as_str()) {
                report.error(
                    format!("{prefix}.name"),
                    format!("Duplicate environment name: {}", env.name),
                );
            }

            Self::check_environment(env, &prefix, &mut report);
        }

        debug!(
            "Local check finished: {} error(s), {} warning(s)",
            report.errors.len(),
            report.warnings.len()
        );
        report
    }

    fn check_environment(env: &Environment, prefix: &str, report: &mut CheckReport) {
        let service_names: HashSet<&str> = env.services.iter().map(|s| s.name.as_str()).collect();
        let mut seen = HashSet::new();

        for (i, service) in env.services.iter().enumerate() {
            let service_prefix = format!("{prefix}.services[{i}]");

            if service.name.is_empty() {
                report.error(format!("{service_prefix}.name"), "Service name cannot be empty");
            } else if !seen.insert(service.name.as_str()) {
                report.error(
                    format!("{service_prefix}.name"),
                    format!("Duplicate service name: {}", service.name),
                );
            }

            Self::check_service(service, &service_prefix, &service_names, report);
        }

        Self::check_variables(&env.variables, &format!("{prefix}.variables"), report);
    }

    fn check_service(
        service: &Service,
        prefix: &str,
        siblings: &HashSet<&str>,
        report: &mut CheckReport,
    ) {
        if service.image.is_empty() {
            report.error(format!("{prefix}.image"), "Container image cannot be empty");
        }

        if !service.replicas.is_empty() && service.replicas.parse::<u32>().is_err() {
            report.error(
                format!("{prefix}.replicas"),
                format!("Replicas must be a non-negative integer, got '{}'", service.replicas),
            );
        }

        for (i, port) in service.ports.iter().enumerate() {
            Self::check_port(port, &format!("{prefix}.ports[{i}]"), report);
        }

        Self::check_variables(&service.environment, &format!("{prefix}.environment"), report);

        for dependency in &service.depends_on {
            if !siblings.contains(dependency.as_str()) {
                report.warn(
                    format!("{prefix}.depends_on"),
                    format!("Dependency '{dependency}' is not a service of this environment"),
                );
            }
        }
    }

    fn check_port(port: &Port, prefix: &str, report: &mut CheckReport) {
        for (label, value) in [("host", &port.host), ("container", &port.container)] {
            if !value.is_empty() && !is_valid_port(value) {
                report.error(
                    format!("{prefix}.{label}"),
                    format!("Port must be a number between 1 and 65535, got '{value}'"),
                );
            }
        }

        if !port.is_complete() {
            report.warn(
                prefix.to_string(),
                "Port is missing an endpoint and will not be emitted",
            );
        }
    }

    fn check_variables(variables: &[Variable], prefix: &str, report: &mut CheckReport) {
        let mut seen = HashSet::new();

        for (i, variable) in variables.iter().enumerate() {
            let field = format!("{prefix}[{i}]");

            if !variable.is_complete() {
                report.warn(
                    field.clone(),
                    "Variable is missing a name or value and will not be emitted",
                );
            }

            if !variable.name.is_empty() && !seen.insert(variable.name.as_str()) {
                report.warn(field, format!("Duplicate variable name: {}", variable.name));
            }
        }
    }
}

fn is_valid_port(value: &str) -> bool {
    value.parse::<u16>().is_ok_and(|p| p > 0)
}

impl CheckReport {
    /// Returns true if no errors were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(CheckIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(CheckIssue {
            field: field.into(),
            message: message.into(),
        });
    }
}

impl std::fmt::Display for CheckIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.application.name = String::from("my-app");
        doc.application.version = String::from("1.0.0");
        doc.environments[0].services.push(Service {
            name: String::from("web"),
            image: String::from("nginx"),
            ports: vec![Port {
                host: String::from("8080"),
                container: String::from("80"),
                ..Port::default()
            }],
            ..Service::default()
        });
        doc
    }

    #[test]
    fn test_clean_document() {
        let report = DocumentChecker::new().check(&sample());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_environment_names() {
        let mut doc = sample();
        doc.environments.push(Environment::named("dev"));
        let report = DocumentChecker::new().check(&doc);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "environments[1].name");
    }

    #[test]
    fn test_bad_port_and_replicas() {
        let mut doc = sample();
        let service = &mut doc.environments[0].services[0];
        service.ports[0].host = String::from("99999");
        service.replicas = String::from("three");

        let report = DocumentChecker::new().check(&doc);
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"environments[0].services[0].ports[0].host"));
        assert!(fields.contains(&"environments[0].services[0].replicas"));
    }

    #[test]
    fn test_partial_entries_are_warnings() {
        let mut doc = sample();
        doc.environments[0].variables.push(Variable::new("DOMAIN", ""));
        doc.environments[0].services[0].ports.push(Port::default());

        let report = DocumentChecker::new().check(&doc);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_unknown_dependency_warns() {
        let mut doc = sample();
        doc.environments[0].services[0].depends_on = vec![String::from("db")];

        let report = DocumentChecker::new().check(&doc);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("db"));
    }

    #[test]
    fn test_check_does_not_mutate() {
        let doc = sample();
        let before = doc.clone();
        let _ = DocumentChecker::new().check(&doc);
        assert_eq!(doc, before);
    }
}
