//! Session state kept alongside the document.
//!
//! The active environment is not part of the document: it is reported by
//! the configuration service after validation and travels next to the
//! document in a [`SessionContext`].

use tracing::debug;

use crate::document::DEFAULT_ENVIRONMENT;
use crate::error::{Result, SessionError};
use crate::service::{Artifact, ValidationReport};

/// Tracks which environment is active and which one it is compared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSelector {
    active: String,
    comparison: Option<String>,
    known: Vec<String>,
}

impl Default for EnvironmentSelector {
    fn default() -> Self {
        Self {
            active: String::from(DEFAULT_ENVIRONMENT),
            comparison: None,
            known: Vec::new(),
        }
    }
}

impl EnvironmentSelector {
    /// Creates a selector with `dev` active and no known environments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active environment name.
    #[must_use]
    pub fn active(&self) -> &str {
        &self.active
    }

    /// Returns the comparison environment, if one was chosen.
    #[must_use]
    pub fn comparison(&self) -> Option<&str> {
        self.comparison.as_deref()
    }

    /// Returns the environment names last reported by the service.
    #[must_use]
    pub fn known(&self) -> &[String] {
        &self.known
    }

    /// Replaces the known environments with a fresh report.
    ///
    /// The first reported name becomes active. An empty report changes nothing.
    pub fn seed(&mut self, names: Vec<String>) {
        let Some(first) = names.first() else {
            debug!("Service reported no environments; keeping '{}'", self.active);
            return;
        };
        self.active.clone_from(first);
        self.known = names;
        debug!("Active environment seeded to '{}'", self.active);
    }

    /// Switches the active environment.
    ///
    /// # Errors
    ///
    /// Returns an error if environments are known and `name` is not one of them.
    pub fn select(&mut self, name: &str) -> Result<()> {
        if !self.known.is_empty() && !self.known.iter().any(|k| k == name) {
            return Err(SessionError::UnknownEnvironment {
                name: name.to_string(),
                known: self.known.join(", "),
            }
            .into());
        }
        self.active = name.to_string();
        Ok(())
    }

    /// Chooses the environment to compare against. Any name is accepted,
    /// including the active one.
    pub fn compare_with(&mut self, name: impl Into<String>) {
        self.comparison = Some(name.into());
    }
}

/// Outcome of the last validation round-trip and the markup it covered.
#[derive(Debug, Clone)]
pub struct ValidationStamp {
    /// Fingerprint of the validated markup.
    pub fingerprint: String,
    /// Report returned by the service.
    pub report: ValidationReport,
}

/// Everything a session tracks besides the document itself.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Environment selection.
    pub selector: EnvironmentSelector,
    /// Last validation result.
    pub validation: Option<ValidationStamp>,
    /// Last generated artifact, kept for preview and download.
    pub preview: Option<Artifact>,
}

impl SessionContext {
    /// Creates an empty session context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `fingerprint` matches markup that passed validation.
    #[must_use]
    pub fn is_validated(&self, fingerprint: &str) -> bool {
        self.validation
            .as_ref()
            .is_some_and(|v| v.report.valid && v.fingerprint == fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnvforgeError;

    #[test]
    fn test_default_is_dev() {
        let selector = EnvironmentSelector::new();
        assert_eq!(selector.active(), "dev");
        assert!(selector.comparison().is_none());
    }

    #[test]
    fn test_seed_activates_first() {
        let mut selector = EnvironmentSelector::new();
        selector.seed(vec![String::from("staging"), String::from("prod")]);
        assert_eq!(selector.active(), "staging");
        assert_eq!(selector.known().len(), 2);
    }

    #[test]
    fn test_empty_seed_keeps_selection() {
        let mut selector = EnvironmentSelector::new();
        selector.seed(vec![String::from("prod")]);
        selector.seed(Vec::new());
        assert_eq!(selector.active(), "prod");
        assert_eq!(selector.known(), ["prod"]);
    }

    #[test]
    fn test_select_checks_known() {
        let mut selector = EnvironmentSelector::new();
        selector.select("anything").expect("nothing known yet");
        assert_eq!(selector.active(), "anything");

        selector.seed(vec![String::from("dev"), String::from("prod")]);
        selector.select("prod").expect("known environment");
        assert_eq!(selector.active(), "prod");

        let err = selector.select("qa");
        assert!(matches!(
            err,
            Err(EnvforgeError::Session(SessionError::UnknownEnvironment { .. }))
        ));
        assert_eq!(selector.active(), "prod");
    }

    #[test]
    fn test_compare_with_self_allowed() {
        let mut selector = EnvironmentSelector::new();
        selector.compare_with("dev");
        assert_eq!(selector.comparison(), Some(selector.active()));
    }

    #[test]
    fn test_is_validated_requires_valid_and_matching() {
        let mut session = SessionContext::new();
        assert!(!session.is_validated("abc"));

        session.validation = Some(ValidationStamp {
            fingerprint: String::from("abc"),
            report: ValidationReport {
                valid: true,
                message: String::new(),
                errors: Vec::new(),
            },
        });
        assert!(session.is_validated("abc"));
        assert!(!session.is_validated("def"));
    }
}
