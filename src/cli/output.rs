//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::document::{CheckReport, Document, Service};
use crate::markup::short;
use crate::service::{Artifact, Comparison, HealthStatus, ValidationReport};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Service row for table display.
#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Image")]
    image: String,
    #[tabled(rename = "Ports")]
    ports: String,
    #[tabled(rename = "Vars")]
    variables: String,
    #[tabled(rename = "Replicas")]
    replicas: String,
}

/// Comparison difference row for table display.
#[derive(Tabled)]
struct DifferenceRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Left")]
    left: String,
    #[tabled(rename = "Right")]
    right: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a document with the indices edit commands expect.
    #[must_use]
    pub fn format_document(&self, document: &Document) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(document).unwrap_or_default(),
            OutputFormat::Text => Self::format_document_text(document),
        }
    }

    fn format_document_text(document: &Document) -> String {
        let app = &document.application;
        let mut output = String::new();

        let _ = writeln!(
            output,
            "\n📦 Application: {} {}",
            Self::or_unset(&app.name).bold(),
            Self::or_unset(&app.version)
        );
        if !app.description.is_empty() {
            let _ = writeln!(output, "   {}", app.description.dimmed());
        }
        let _ = writeln!(
            output,
            "   {} environment(s), {} service(s)",
            document.environments.len(),
            document.service_count()
        );

        for (e, env) in document.environments.iter().enumerate() {
            let _ = write!(output, "\n[{e}] {}\n", Self::or_unset(&env.name).cyan());

            if env.services.is_empty() {
                output.push_str("   No services.\n");
            } else {
                let rows: Vec<ServiceRow> = env
                    .services
                    .iter()
                    .enumerate()
                    .map(|(i, s)| ServiceRow {
                        index: i,
                        name: Self::or_unset(&s.name),
                        image: Self::image_ref(s),
                        ports: Self::format_ports(s),
                        variables: Self::format_variables(&s.environment),
                        replicas: s.replicas.clone(),
                    })
                    .collect();
                output.push_str(&Table::new(rows).to_string());
                output.push('\n');
            }

            if !env.variables.is_empty() {
                let _ = writeln!(output, "   Variables: {}", Self::format_variables(&env.variables));
            }
        }

        output
    }

    /// Formats a local check report.
    #[must_use]
    pub fn format_check(&self, report: &CheckReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = if report.is_valid() {
                    format!("{} Document is well-formed.\n", "✓".green())
                } else {
                    format!("{} Document has {} error(s):\n", "✗".red(), report.errors.len())
                };

                for issue in &report.errors {
                    let _ = writeln!(output, "   - {issue}");
                }

                if !report.warnings.is_empty() {
                    let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
                    for issue in &report.warnings {
                        let _ = writeln!(output, "   - {issue}");
                    }
                }

                output
            }
        }
    }

    /// Formats a service validation report.
    #[must_use]
    pub fn format_validation(&self, report: &ValidationReport, fingerprint: &str) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&ValidationJson {
                fingerprint,
                report,
            })
            .unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = if report.valid {
                    format!("{} {}", "✓".green(), Self::or_default(&report.message, "Markup is valid"))
                } else {
                    format!(
                        "{} {}",
                        "✗".red(),
                        Self::or_default(&report.message, "Markup is invalid")
                    )
                };
                let _ = writeln!(output, " ({})", short(fingerprint).dimmed());

                for issue in &report.errors {
                    let _ = writeln!(output, "   - {issue}");
                }

                output
            }
        }
    }

    /// Formats the discovered environments, marking the active one.
    #[must_use]
    pub fn format_environments(&self, names: &[String], active: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({ "environments": names, "active": active });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => {
                if names.is_empty() {
                    return String::from("No environments reported.\n");
                }
                let mut output = String::new();
                for name in names {
                    if name == active {
                        let _ = writeln!(output, " * {}", name.green());
                    } else {
                        let _ = writeln!(output, "   {name}");
                    }
                }
                output
            }
        }
    }

    /// Formats a generated artifact for preview.
    #[must_use]
    pub fn format_artifact(&self, artifact: &Artifact) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(artifact).unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = format!(
                    "\n📄 {} for {} ({})\n\n",
                    artifact.kind.label(),
                    artifact.environment.cyan(),
                    artifact.generated_at.format("%Y-%m-%d %H:%M:%S")
                );
                output.push_str(&artifact.content);
                if !artifact.content.ends_with('\n') {
                    output.push('\n');
                }
                output
            }
        }
    }

    /// Formats an environment comparison.
    #[must_use]
    pub fn format_comparison(&self, comparison: &Comparison, left: &str, right: &str) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(comparison).unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = format!("\n🔍 {} vs {}\n\n", left.cyan(), right.cyan());

                let _ = writeln!(output, "   Common: {}", Self::join_or_none(&comparison.common));
                let _ = writeln!(
                    output,
                    "   Only in {left}: {}",
                    Self::join_or_none(&comparison.only_in_env1)
                );
                let _ = writeln!(
                    output,
                    "   Only in {right}: {}",
                    Self::join_or_none(&comparison.only_in_env2)
                );

                if comparison.differences.is_empty() {
                    let _ = write!(output, "\n{} No field differences.\n", "✓".green());
                } else {
                    let rows: Vec<DifferenceRow> = comparison
                        .differences
                        .iter()
                        .map(|d| DifferenceRow {
                            service: d.service.clone(),
                            field: d.field.clone(),
                            left: Self::truncate(&d.env1_value, 30),
                            right: Self::truncate(&d.env2_value, 30),
                        })
                        .collect();
                    output.push('\n');
                    output.push_str(&Table::new(rows).to_string());
                    output.push('\n');
                }

                output
            }
        }
    }

    /// Formats a health check answer.
    #[must_use]
    pub fn format_health(&self, health: &HealthStatus, api_url: &str) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(health).unwrap_or_default(),
            OutputFormat::Text => {
                let marker = if health.is_ok() { "✓".green() } else { "✗".red() };
                format!("{marker} {api_url}: {} {}\n", health.status, health.message.dimmed())
            }
        }
    }

    /// Formats the confirmation for a saved document or file.
    #[must_use]
    pub fn format_saved(&self, what: &str, path: &std::path::Path) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({ "status": "success", "message": what, "path": path });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => format!("{} {what}: {}\n", "✓".green(), path.display()),
        }
    }

    fn image_ref(service: &Service) -> String {
        match (service.image.as_str(), service.tag.as_str()) {
            ("", _) => String::from("-"),
            (image, "") => image.to_string(),
            (image, tag) => format!("{image}:{tag}"),
        }
    }

    fn format_ports(service: &Service) -> String {
        service
            .ports
            .iter()
            .map(|p| format!("{}->{}/{}", Self::or_unset(&p.host), Self::or_unset(&p.container), p.protocol))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn format_variables(variables: &[crate::document::Variable]) -> String {
        variables
            .iter()
            .map(|v| format!("{}={}", Self::or_unset(&v.name), Self::truncate(&v.value, 20)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn or_unset(value: &str) -> String {
        Self::or_default(value, "?")
    }

    fn or_default(value: &str, fallback: &str) -> String {
        if value.is_empty() {
            fallback.to_string()
        } else {
            value.to_string()
        }
    }

    fn join_or_none(names: &[String]) -> String {
        if names.is_empty() {
            String::from("-")
        } else {
            names.join(", ")
        }
    }

    /// Truncates a string to a maximum number of characters.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{kept}...")
        }
    }
}

// JSON serialization helpers

#[derive(serde::Serialize)]
struct ValidationJson<'a> {
    fingerprint: &'a str,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Port, Variable};
    use crate::service::{ArtifactKind, ServiceDifference, ValidationIssue};

    fn text() -> OutputFormatter {
        colored::control::set_override(false);
        OutputFormatter::new(OutputFormat::Text)
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(OutputFormatter::truncate("short", 10), "short");
        assert_eq!(OutputFormatter::truncate("ééééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_document_text_shows_indices() {
        let mut document = Document::new();
        document.environments[0].services.push(Service {
            name: String::from("web"),
            image: String::from("nginx"),
            tag: String::from("alpine"),
            ports: vec![Port {
                host: String::from("8080"),
                container: String::from("80"),
                ..Port::default()
            }],
            environment: vec![Variable::new("LOG_LEVEL", "debug")],
            ..Service::default()
        });

        let output = text().format_document(&document);
        assert!(output.contains("1 environment(s), 1 service(s)"));
        assert!(output.contains("[0] dev"));
        assert!(output.contains("nginx:alpine"));
        assert!(output.contains("8080->80/tcp"));
        assert!(output.contains("LOG_LEVEL=debug"));
    }

    #[test]
    fn test_validation_text_lists_lines() {
        let report = ValidationReport {
            valid: false,
            message: String::from("Le fichier XML contient des erreurs"),
            errors: vec![ValidationIssue {
                line: Some(12),
                message: String::from("Element 'port': missing child 'container'"),
                ..ValidationIssue::default()
            }],
        };
        let output = text().format_validation(&report, "0123456789abcdef");
        assert!(output.contains("01234567"));
        assert!(output.contains("line 12: Element 'port'"));
    }

    #[test]
    fn test_validation_json_flattens_report() {
        let report = ValidationReport {
            valid: true,
            ..ValidationReport::default()
        };
        let output = OutputFormatter::new(OutputFormat::Json).format_validation(&report, "abc");
        let value: serde_json::Value = serde_json::from_str(&output).expect("json");
        assert_eq!(value["valid"], serde_json::json!(true));
        assert_eq!(value["fingerprint"], serde_json::json!("abc"));
    }

    #[test]
    fn test_comparison_text() {
        let comparison = Comparison {
            only_in_env1: vec![String::from("debug-proxy")],
            common: vec![String::from("web")],
            differences: vec![ServiceDifference {
                service: String::from("web"),
                field: String::from("replicas"),
                env1_value: String::from("1"),
                env2_value: String::from("3"),
            }],
            ..Comparison::default()
        };
        let output = text().format_comparison(&comparison, "dev", "prod");
        assert!(output.contains("Only in dev: debug-proxy"));
        assert!(output.contains("Only in prod: -"));
        assert!(output.contains("replicas"));
    }

    #[test]
    fn test_environments_marks_active() {
        let names = vec![String::from("dev"), String::from("prod")];
        let output = text().format_environments(&names, "prod");
        assert!(output.contains("   dev"));
        assert!(output.contains(" * prod"));
    }

    #[test]
    fn test_artifact_text_ends_with_newline() {
        let artifact = Artifact::new(ArtifactKind::Jenkins, "dev", "pipeline {}");
        let output = text().format_artifact(&artifact);
        assert!(output.contains("Jenkins pipeline for dev"));
        assert!(output.ends_with("pipeline {}\n"));
    }
}
