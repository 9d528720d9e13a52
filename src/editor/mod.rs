//! Form editor module.
//!
//! Structural operations over the document model. The editor only appends
//! and updates; it never deletes or reorders entities.

mod edit;
mod form;

pub use edit::{ApplicationField, Edit, PortField, ServiceField, VariableField};
pub use form::FormEditor;
