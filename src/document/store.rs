//! Document file loading and saving.
//!
//! The structured form of a document lives in a YAML file next to the
//! project. Every edit replaces the file wholesale with the new document
//! value.

use crate::error::{DocumentError, EnvforgeError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::model::Document;

/// Default document file names to search for.
pub const DEFAULT_DOCUMENT_FILES: &[&str] = &["envforge.yaml", "envforge.yml"];

/// Starter document written by `envforge init`.
const STARTER_TEMPLATE: &str = include_str!("../../templates/envforge.yaml");

/// Reads and writes document files.
#[derive(Debug, Default)]
pub struct DocumentStore;

impl DocumentStore {
    /// Creates a new document store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Loads a document from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();
        debug!("Loading document from: {}", path.display());

        if !path.exists() {
            return Err(EnvforgeError::Document(DocumentError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            EnvforgeError::Document(DocumentError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses a document from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<Document> {
        let document: Document = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            EnvforgeError::Document(DocumentError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!(
            "Parsed document for application '{}' with {} environment(s)",
            document.application.name,
            document.environments.len()
        );
        Ok(document)
    }

    /// Writes a document to a YAML file, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written.
    pub fn save(&self, path: impl AsRef<Path>, document: &Document) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(document).map_err(|e| {
            EnvforgeError::Document(DocumentError::SerializeError {
                message: e.to_string(),
            })
        })?;

        std::fs::write(path, content)?;
        debug!("Saved document to: {}", path.display());
        Ok(())
    }

    /// Writes the starter document into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists and `force` is false, or on IO failure.
    pub fn init(&self, dir: impl AsRef<Path>, force: bool) -> Result<PathBuf> {
        let dir = dir.as_ref();
        let path = dir.join(DEFAULT_DOCUMENT_FILES[0]);

        if !force && path.exists() {
            return Err(EnvforgeError::Document(DocumentError::AlreadyExists { path }));
        }

        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }

        std::fs::write(&path, STARTER_TEMPLATE)?;
        info!("Created document: {}", path.display());
        Ok(path)
    }
}

/// Finds the document file in the given directory or its parents.
///
/// # Errors
///
/// Returns an error if no document file is found.
pub fn find_document_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_DOCUMENT_FILES {
            let candidate = current.join(filename);
            if candidate.exists() {
                debug!("Found document file: {}", candidate.display());
                return Ok(candidate);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(EnvforgeError::Document(DocumentError::FileNotFound {
        path: start.join(DEFAULT_DOCUMENT_FILES[0]),
    }))
}
