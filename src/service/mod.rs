//! Configuration service integration module.
//!
//! The external service validates markup against its schema, reports the
//! environments it contains, and turns it into deployment artifacts. This
//! module holds the wire types, the HTTP client, and the [`ConfigService`]
//! trait the orchestrator is written against.

mod client;
mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use client::{ConfigServiceClient, DEFAULT_API_URL};
pub use types::{
    ARTIFACT_KINDS, Artifact, ArtifactKind, Comparison, HealthStatus, ServiceDifference,
    ValidationIssue, ValidationReport,
};

/// Operations offered by the configuration service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Validates markup against the service's schema.
    async fn validate(&self, markup: &str) -> Result<ValidationReport>;

    /// Lists the environment names found in markup.
    async fn environments(&self, markup: &str) -> Result<Vec<String>>;

    /// Generates an artifact of `kind` for one environment.
    async fn generate(&self, kind: ArtifactKind, markup: &str, environment: &str) -> Result<String>;

    /// Compares the services of two environments.
    async fn compare(&self, markup: &str, environment1: &str, environment2: &str) -> Result<Comparison>;

    /// Asks the service to package a generated artifact as a file payload.
    async fn download(&self, artifact: &Artifact) -> Result<Vec<u8>>;

    /// Checks that the service is reachable.
    async fn health(&self) -> Result<HealthStatus>;
}
