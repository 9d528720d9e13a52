//! Markup module.
//!
//! One-way serialization of documents to the XML consumed by the
//! configuration service, plus fingerprints of emitted text. There is no
//! local parser: the service is the only consumer of markup.

mod emitter;
mod fingerprint;

pub use emitter::{
    PLACEHOLDER_NAME, PLACEHOLDER_VERSION, ROOT_ELEMENT, SCHEMA_VERSION, XML_HEADER, emit,
};
pub use fingerprint::{fingerprint, short};
