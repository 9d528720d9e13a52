// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Envforge
//!
//! A multi-environment deployment configuration editor.
//!
//! ## Overview
//!
//! Envforge keeps one application's deployment topology, across named
//! environments such as dev, staging and prod, in a single document, and
//! derives environment-specific deployment artifacts from it:
//!
//! - Edit the document through a fixed set of structural operations
//! - Emit it as deterministic XML markup
//! - Validate the markup and generate Docker Compose, Kubernetes, Helm,
//!   GitHub Actions or Jenkins artifacts through the configuration service
//!
//! ## Architecture
//!
//! 1. **Document**: the in-memory model, stored as `envforge.yaml`
//! 2. **Editor**: copy-on-write structural edits on the document
//! 3. **Markup**: one-way XML emission and content fingerprints
//! 4. **Orchestrator**: validate, discover, generate and download against the
//!    configuration service, with the selected environment kept in a
//!    session beside the document
//!
//! ## Modules
//!
//! - [`document`]: Document model, file store and local checks
//! - [`editor`]: Structural edit operations
//! - [`markup`]: XML emission and fingerprinting
//! - [`session`]: Environment selection and session state
//! - [`service`]: Configuration service client
//! - [`orchestrator`]: Service workflow sequencing
//! - [`settings`]: Tool settings
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! application:
//!   name: shop
//!   version: 2.1.0
//!
//! environments:
//!   - name: dev
//!     services:
//!       - name: web
//!         image: nginx
//!         tag: alpine
//!         ports:
//!           - host: "8080"
//!             container: "80"
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod document;
pub mod editor;
pub mod error;
pub mod markup;
pub mod orchestrator;
pub mod service;
pub mod session;
pub mod settings;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use document::{CheckReport, Document, DocumentChecker, DocumentStore};
pub use editor::{Edit, FormEditor};
pub use error::{EnvforgeError, Result};
pub use markup::{emit, fingerprint};
pub use orchestrator::{MarkupSnapshot, Orchestrator, RequestClass};
pub use service::{ArtifactKind, ConfigService, ConfigServiceClient};
pub use session::{EnvironmentSelector, SessionContext};
pub use settings::Settings;
