//! Orchestration of configuration service round-trips.
//!
//! The orchestrator sequences validate, discover, generate, preview and
//! download against a [`ConfigService`], keeping the outcome of each step in
//! a [`SessionContext`]. Markup is always emitted from the document snapshot
//! at call time.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::document::Document;
use crate::error::{Result, ServiceError};
use crate::markup::{emit, fingerprint, short};
use crate::service::{Artifact, ArtifactKind, Comparison, ConfigService, HealthStatus, ValidationReport};
use crate::session::{SessionContext, ValidationStamp};

/// Kinds of service request. At most one request of each kind runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    /// Schema validation.
    Validate,
    /// Environment discovery.
    Discover,
    /// Artifact generation.
    Generate,
    /// Environment comparison.
    Compare,
    /// Artifact download.
    Download,
    /// Service health check.
    Health,
}

impl RequestClass {
    /// Returns the class name used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Discover => "discover",
            Self::Generate => "generate",
            Self::Compare => "compare",
            Self::Download => "download",
            Self::Health => "health",
        }
    }
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Markup emitted from a document, with its fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSnapshot {
    /// Markup text.
    pub markup: String,
    /// SHA-256 fingerprint of `markup`.
    pub fingerprint: String,
}

impl MarkupSnapshot {
    /// Emits markup from the current document value.
    #[must_use]
    pub fn of(document: &Document) -> Self {
        Self::from_markup(emit(document))
    }

    /// Wraps markup obtained elsewhere, such as a file on disk.
    #[must_use]
    pub fn from_markup(markup: String) -> Self {
        let fingerprint = fingerprint(&markup);
        Self { markup, fingerprint }
    }

    fn ensure_content(&self) -> Result<()> {
        if self.markup.trim().is_empty() {
            return Err(ServiceError::EmptyMarkup.into());
        }
        Ok(())
    }
}

/// Set of request classes currently running.
#[derive(Debug, Default)]
struct InFlight {
    classes: Mutex<HashSet<RequestClass>>,
}

impl InFlight {
    fn lock(&self) -> MutexGuard<'_, HashSet<RequestClass>> {
        self.classes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks `class` as running until the returned guard is dropped.
    fn begin(&self, class: RequestClass) -> Result<FlightGuard<'_>> {
        if !self.lock().insert(class) {
            return Err(ServiceError::RequestInFlight {
                class: class.to_string(),
            }
            .into());
        }
        Ok(FlightGuard { owner: self, class })
    }

    fn is_running(&self, class: RequestClass) -> bool {
        self.lock().contains(&class)
    }
}

/// Clears its request class when dropped.
struct FlightGuard<'a> {
    owner: &'a InFlight,
    class: RequestClass,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.owner.lock().remove(&self.class);
    }
}

/// Drives the service workflow for one session.
pub struct Orchestrator<S: ConfigService> {
    /// Configuration service.
    service: S,
    /// Session state.
    session: Mutex<SessionContext>,
    /// Running request classes.
    in_flight: InFlight,
}

impl<S: ConfigService> Orchestrator<S> {
    /// Creates an orchestrator with a fresh session.
    #[must_use]
    pub fn new(service: S) -> Self {
        Self::with_session(service, SessionContext::new())
    }

    /// Creates an orchestrator resuming an existing session.
    #[must_use]
    pub fn with_session(service: S, session: SessionContext) -> Self {
        Self {
            service,
            session: Mutex::new(session),
            in_flight: InFlight::default(),
        }
    }

    fn session_mut(&self) -> MutexGuard<'_, SessionContext> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the session state.
    #[must_use]
    pub fn session(&self) -> SessionContext {
        self.session_mut().clone()
    }

    /// Returns true if a request of `class` is running.
    #[must_use]
    pub fn is_in_flight(&self, class: RequestClass) -> bool {
        self.in_flight.is_running(class)
    }

    /// Switches the active environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not among the discovered environments.
    pub fn select_environment(&self, name: &str) -> Result<()> {
        self.session_mut().selector.select(name)
    }

    /// Chooses the environment the active one is compared with.
    pub fn compare_with(&self, name: impl Into<String>) {
        self.session_mut().selector.compare_with(name);
    }

    /// Validates markup and, when valid, discovers its environments.
    ///
    /// An invalid verdict is returned as a report, not an error. A failed
    /// discovery after a valid verdict is logged and leaves the selection
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup is empty, a validation is already
    /// running, or the service cannot be reached.
    pub async fn validate(&self, snapshot: &MarkupSnapshot) -> Result<ValidationReport> {
        snapshot.ensure_content()?;

        let report = {
            let _guard = self.in_flight.begin(RequestClass::Validate)?;
            info!("Validating markup {}", short(&snapshot.fingerprint));
            self.service.validate(&snapshot.markup).await?
        };

        self.session_mut().validation = Some(ValidationStamp {
            fingerprint: snapshot.fingerprint.clone(),
            report: report.clone(),
        });

        if report.valid {
            if let Err(e) = self.discover(snapshot).await {
                warn!("Environment discovery failed: {e}");
            }
        } else {
            debug!("Validation reported {} problem(s)", report.errors.len());
        }

        Ok(report)
    }

    /// Asks the service which environments the markup contains and seeds the
    /// selector with them.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup is empty, a discovery is already
    /// running, or the service request fails.
    pub async fn discover(&self, snapshot: &MarkupSnapshot) -> Result<Vec<String>> {
        snapshot.ensure_content()?;

        let names = {
            let _guard = self.in_flight.begin(RequestClass::Discover)?;
            self.service.environments(&snapshot.markup).await?
        };

        debug!("Service reported environments: {}", names.join(", "));
        self.session_mut().selector.seed(names.clone());
        Ok(names)
    }

    /// Generates an artifact for the active environment and keeps it as the
    /// preview.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup has not passed validation in its
    /// current form, a generation is already running, or the service fails.
    pub async fn generate(&self, kind: ArtifactKind, snapshot: &MarkupSnapshot) -> Result<Artifact> {
        snapshot.ensure_content()?;

        let environment = {
            let session = self.session_mut();
            if !session.is_validated(&snapshot.fingerprint) {
                return Err(ServiceError::NotValidated.into());
            }
            session.selector.active().to_string()
        };

        let content = {
            let _guard = self.in_flight.begin(RequestClass::Generate)?;
            info!("Generating {} for '{environment}'", kind.label());
            self.service.generate(kind, &snapshot.markup, &environment).await?
        };

        let artifact = Artifact::new(kind, environment, content);
        self.session_mut().preview = Some(artifact.clone());
        Ok(artifact)
    }

    /// Compares the active environment with the comparison environment.
    ///
    /// Without an explicit comparison environment the active one is compared
    /// with itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup is empty, a comparison is already
    /// running, or the service request fails.
    pub async fn compare(&self, snapshot: &MarkupSnapshot) -> Result<Comparison> {
        snapshot.ensure_content()?;

        let (first, second) = {
            let session = self.session_mut();
            let active = session.selector.active().to_string();
            let other = session
                .selector
                .comparison()
                .map_or_else(|| active.clone(), ToString::to_string);
            (active, other)
        };

        let _guard = self.in_flight.begin(RequestClass::Compare)?;
        info!("Comparing '{first}' with '{second}'");
        self.service.compare(&snapshot.markup, &first, &second).await
    }

    /// Downloads the previewed artifact into `dir` as `config-{env}.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing has been generated, a download is already
    /// running, the service fails, or the file cannot be written.
    pub async fn download(&self, dir: &Path) -> Result<PathBuf> {
        let artifact = self
            .session_mut()
            .preview
            .clone()
            .ok_or(ServiceError::NoContent)?;

        let bytes = {
            let _guard = self.in_flight.begin(RequestClass::Download)?;
            self.service.download(&artifact).await?
        };

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(artifact.download_filename());
        tokio::fs::write(&path, &bytes).await?;
        info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Checks the service health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if a health check is already running or the service
    /// cannot be reached.
    pub async fn health(&self) -> Result<HealthStatus> {
        let _guard = self.in_flight.begin(RequestClass::Health)?;
        self.service.health().await
    }
}
