//! Configuration service request and response types.
//!
//! The service owns these shapes; fields it may omit default to empty so a
//! sparse answer still deserializes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EnvforgeError, Result, ServiceError};

/// Artifact formats the service can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Docker Compose file.
    DockerCompose,
    /// Kubernetes manifests.
    Kubernetes,
    /// Helm chart values.
    Helm,
    /// GitHub Actions workflow.
    GithubActions,
    /// Jenkins pipeline.
    Jenkins,
}

/// Every artifact kind, in menu order.
pub const ARTIFACT_KINDS: [ArtifactKind; 5] = [
    ArtifactKind::DockerCompose,
    ArtifactKind::Kubernetes,
    ArtifactKind::Helm,
    ArtifactKind::GithubActions,
    ArtifactKind::Jenkins,
];

impl ArtifactKind {
    /// Returns the path segment used by the service.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DockerCompose => "docker-compose",
            Self::Kubernetes => "kubernetes",
            Self::Helm => "helm",
            Self::GithubActions => "github-actions",
            Self::Jenkins => "jenkins",
        }
    }

    /// Returns a human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DockerCompose => "Docker Compose file",
            Self::Kubernetes => "Kubernetes manifest",
            Self::Helm => "Helm chart",
            Self::GithubActions => "GitHub Actions workflow",
            Self::Jenkins => "Jenkins pipeline",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = EnvforgeError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        ARTIFACT_KINDS
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = ARTIFACT_KINDS.iter().map(|k| k.as_str()).collect();
                ServiceError::UnknownArtifactKind {
                    kind: s.to_string(),
                    expected: known.join(", "),
                }
                .into()
            })
    }
}

/// Result of a validation round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the markup is valid.
    pub valid: bool,
    /// Summary message.
    #[serde(default)]
    pub message: String,
    /// Individual problems.
    #[serde(default)]
    pub errors: Vec<ValidationIssue>,
}

/// One validation problem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Line number in the markup, when known.
    #[serde(default)]
    pub line: Option<u32>,
    /// Column number, when known.
    #[serde(default)]
    pub column: Option<u32>,
    /// Severity reported by the schema validator.
    #[serde(default)]
    pub level: Option<String>,
    /// Problem description.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Services present in one or both compared environments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    /// Services only in the first environment.
    #[serde(default)]
    pub only_in_env1: Vec<String>,
    /// Services only in the second environment.
    #[serde(default)]
    pub only_in_env2: Vec<String>,
    /// Services in both.
    #[serde(default)]
    pub common: Vec<String>,
    /// Field differences among common services.
    #[serde(default)]
    pub differences: Vec<ServiceDifference>,
}

/// A field that differs between two environments for one service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDifference {
    /// Service name.
    pub service: String,
    /// Differing field.
    pub field: String,
    /// Value in the first environment.
    #[serde(default)]
    pub env1_value: String,
    /// Value in the second environment.
    #[serde(default)]
    pub env2_value: String,
}

/// Health endpoint answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status keyword, `ok` when healthy.
    #[serde(default)]
    pub status: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

impl HealthStatus {
    /// Returns true if the service reports itself healthy.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// A generated artifact kept for preview and download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Artifact format.
    pub kind: ArtifactKind,
    /// Environment the artifact was generated for.
    pub environment: String,
    /// Generated text.
    pub content: String,
    /// When the artifact was generated.
    pub generated_at: DateTime<Utc>,
}

impl Artifact {
    /// Creates an artifact stamped with the current time.
    #[must_use]
    pub fn new(kind: ArtifactKind, environment: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            environment: environment.into(),
            content: content.into(),
            generated_at: Utc::now(),
        }
    }

    /// Base file name sent to the download endpoint.
    #[must_use]
    pub fn request_filename(&self) -> String {
        format!("config-{}", self.environment)
    }

    /// File name the downloaded payload is saved under.
    #[must_use]
    pub fn download_filename(&self) -> String {
        format!("config-{}.yaml", self.environment)
    }
}

// Wire bodies

#[derive(Debug, Serialize)]
pub(super) struct MarkupRequest<'a> {
    pub xml: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct GenerateRequest<'a> {
    pub xml: &'a str,
    pub environment: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct CompareRequest<'a> {
    pub xml: &'a str,
    pub environment1: &'a str,
    pub environment2: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct DownloadRequest<'a> {
    pub content: &'a str,
    pub environment: &'a str,
    pub filename: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct EnvironmentsResponse {
    #[serde(default)]
    pub environments: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompareResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub comparison: Option<Comparison>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body shape shared by the service's failure responses.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(super) fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.is_empty())
    }
}
