//! Configuration service HTTP client.
//!
//! Every call is attempt-once: failures are reported to the caller, who
//! decides whether to try again.

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::{Result, ServiceError};

use super::ConfigService;
use super::types::{
    Artifact, ArtifactKind, CompareRequest, CompareResponse, Comparison, DownloadRequest,
    EnvironmentsResponse, ErrorBody, GenerateRequest, GenerateResponse, HealthStatus, MarkupRequest,
    ValidationReport,
};

/// Default service base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// HTTP client for the configuration service.
#[derive(Debug, Clone)]
pub struct ConfigServiceClient {
    /// HTTP client.
    client: Client,
    /// Base URL without trailing slash.
    base_url: String,
}

impl ConfigServiceClient {
    /// Creates a client with the transport's default timeout behaviour.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::build(base_url, None)
    }

    /// Creates a client with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self> {
        Self::build(base_url, Some(Duration::from_secs(timeout_secs)))
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("envforge/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ServiceError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Posts a JSON body and returns the response if its status is a success.
    async fn post<B: Serialize + Sync + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.url(path);
        trace!("POST {url}");

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::network(format!("Request failed: {e}")))?;

        Self::check_status(response).await
    }

    /// Maps a non-success status to an error carrying the server's message.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message);
        debug!("Service answered {status}: {body}");

        Err(ServiceError::api_error(status.as_u16(), message).into())
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        response.json().await.map_err(|e| {
            ServiceError::InvalidResponse {
                message: format!("Failed to parse response: {e}"),
            }
            .into()
        })
    }
}

#[async_trait]
impl ConfigService for ConfigServiceClient {
    async fn validate(&self, markup: &str) -> Result<ValidationReport> {
        let response = self.post("validate", &MarkupRequest { xml: markup }).await?;
        Self::read_json(response).await
    }

    async fn environments(&self, markup: &str) -> Result<Vec<String>> {
        let response = self.post("environments", &MarkupRequest { xml: markup }).await?;
        let body: EnvironmentsResponse = Self::read_json(response).await?;

        match body.error {
            Some(error) if body.environments.is_empty() => {
                Err(ServiceError::unsuccessful(Some(error)).into())
            }
            _ => Ok(body.environments),
        }
    }

    async fn generate(&self, kind: ArtifactKind, markup: &str, environment: &str) -> Result<String> {
        let path = format!("transform/{kind}");
        let response = self
            .post(&path, &GenerateRequest { xml: markup, environment })
            .await?;
        let body: GenerateResponse = Self::read_json(response).await?;

        if !body.success {
            return Err(ServiceError::unsuccessful(body.message).into());
        }

        body.content.ok_or_else(|| {
            ServiceError::InvalidResponse {
                message: String::from("No content in response"),
            }
            .into()
        })
    }

    async fn compare(&self, markup: &str, environment1: &str, environment2: &str) -> Result<Comparison> {
        let request = CompareRequest {
            xml: markup,
            environment1,
            environment2,
        };
        let response = self.post("compare", &request).await?;
        let body: CompareResponse = Self::read_json(response).await?;

        if !body.success {
            return Err(ServiceError::unsuccessful(body.message).into());
        }

        body.comparison.ok_or_else(|| {
            ServiceError::InvalidResponse {
                message: String::from("No comparison in response"),
            }
            .into()
        })
    }

    async fn download(&self, artifact: &Artifact) -> Result<Vec<u8>> {
        let filename = artifact.request_filename();
        let request = DownloadRequest {
            content: &artifact.content,
            environment: &artifact.environment,
            filename: &filename,
        };
        let response = self.post(&format!("download/{}", artifact.kind), &request).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to read download: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn health(&self) -> Result<HealthStatus> {
        let url = self.url("health");
        trace!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::network(format!("Request failed: {e}")))?;
        let response = Self::check_status(response).await?;
        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EnvforgeError, GENERIC_SERVICE_ERROR};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ConfigServiceClient {
        ConfigServiceClient::new(&format!("{}/api/", server.uri())).expect("client")
    }

    #[tokio::test]
    async fn test_validate_sends_xml_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/validate"))
            .and(body_json(json!({ "xml": "<devops-config/>" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "valid": false,
                "message": "Le fichier XML contient des erreurs",
                "errors": [{ "line": 3, "message": "Missing child element(s)." }]
            })))
            .mount(&server)
            .await;

        let report = client_for(&server)
            .await
            .validate("<devops-config/>")
            .await
            .expect("validate");
        assert!(!report.valid);
        assert_eq!(report.errors[0].line, Some(3));
    }

    #[tokio::test]
    async fn test_error_status_uses_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/validate"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "valid": false, "message": "Aucun contenu XML fourni" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).await.validate("").await;
        match err {
            Err(EnvforgeError::Service(ServiceError::ApiRequestFailed { status, message })) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Aucun contenu XML fourni");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status_without_body_uses_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/compare"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.compare("<x/>", "dev", "prod").await;
        match err {
            Err(EnvforgeError::Service(ServiceError::ApiRequestFailed { message, .. })) => {
                assert_eq!(message, GENERIC_SERVICE_ERROR);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_environments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/environments"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "environments": ["dev", "prod"] })),
            )
            .mount(&server)
            .await;

        let names = client_for(&server).await.environments("<x/>").await.expect("environments");
        assert_eq!(names, vec!["dev", "prod"]);
    }

    #[tokio::test]
    async fn test_generate_success_and_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/transform/docker-compose"))
            .and(body_json(json!({ "xml": "<x/>", "environment": "dev" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "content": "services:\n  web:\n",
                "message": "Transformation réussie"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/transform/jenkins"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "content": null,
                "message": "Erreur lors de la transformation"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let content = client
            .generate(ArtifactKind::DockerCompose, "<x/>", "dev")
            .await
            .expect("generate");
        assert!(content.contains("web:"));

        let err = client.generate(ArtifactKind::Jenkins, "<x/>", "dev").await;
        assert!(matches!(
            err,
            Err(EnvforgeError::Service(ServiceError::Unsuccessful { ref message }))
                if message == "Erreur lors de la transformation"
        ));
    }

    #[tokio::test]
    async fn test_compare() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/compare"))
            .and(body_json(json!({ "xml": "<x/>", "environment1": "dev", "environment2": "dev" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "comparison": {
                    "only_in_env1": [],
                    "only_in_env2": [],
                    "common": ["web"],
                    "differences": []
                }
            })))
            .mount(&server)
            .await;

        let comparison = client_for(&server)
            .await
            .compare("<x/>", "dev", "dev")
            .await
            .expect("compare");
        assert_eq!(comparison.common, vec!["web"]);
    }

    #[tokio::test]
    async fn test_compare_unsuccessful() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/compare"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "comparison": null,
                "message": "Environnement introuvable: qa"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.compare("<x/>", "dev", "qa").await;
        assert!(matches!(
            err,
            Err(EnvforgeError::Service(ServiceError::Unsuccessful { ref message }))
                if message == "Environnement introuvable: qa"
        ));
    }

    #[tokio::test]
    async fn test_download_returns_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/download/helm"))
            .and(body_json(json!({
                "content": "replicaCount: 1",
                "environment": "prod",
                "filename": "config-prod"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"replicaCount: 1".to_vec()))
            .mount(&server)
            .await;

        let artifact = Artifact::new(ArtifactKind::Helm, "prod", "replicaCount: 1");
        let bytes = client_for(&server)
            .await
            .download(&artifact)
            .await
            .expect("download");
        assert_eq!(bytes, b"replicaCount: 1");
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "ok", "message": "API fonctionnelle" })),
            )
            .mount(&server)
            .await;

        let health = client_for(&server).await.health().await.expect("health");
        assert!(health.is_ok());
    }

    #[tokio::test]
    async fn test_network_error() {
        let client = ConfigServiceClient::new("http://127.0.0.1:9/api").expect("client");
        let err = client.health().await;
        assert!(matches!(
            err,
            Err(EnvforgeError::Service(ServiceError::NetworkError { .. }))
        ));
    }
}
