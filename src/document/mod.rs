//! Document module for envforge.
//!
//! This module holds the multi-environment configuration model:
//! - The model types (application, environments, services, ports, variables)
//! - Loading and saving the YAML document file
//! - A local consistency check that never mutates the document

mod checker;
mod model;
mod store;

pub use checker::{CheckIssue, CheckReport, DocumentChecker};
pub use model::{
    Application, DEFAULT_ENVIRONMENT, Document, Environment, Port, Protocol, Service, Variable,
};
pub use store::{DEFAULT_DOCUMENT_FILES, DocumentStore, find_document_file};
