//! Structural edit operations.
//!
//! Every form interaction is one [`Edit`] value. Entities are addressed by
//! their position in the owning sequence of the current document snapshot.

use std::fmt;
use std::str::FromStr;

use crate::error::EditorError;

/// A single structural operation on a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Replace one application field.
    UpdateApplication {
        /// Field to replace.
        field: ApplicationField,
        /// New value.
        value: String,
    },
    /// Append an environment. An empty name leaves the document unchanged.
    AddEnvironment {
        /// Name of the new environment.
        name: String,
    },
    /// Append an empty service to an environment.
    AddService {
        /// Environment index.
        env: usize,
    },
    /// Replace one scalar field of a service.
    UpdateService {
        /// Environment index.
        env: usize,
        /// Service index.
        service: usize,
        /// Field to replace.
        field: ServiceField,
        /// New value.
        value: String,
    },
    /// Append an empty tcp port to a service.
    AddPort {
        /// Environment index.
        env: usize,
        /// Service index.
        service: usize,
    },
    /// Replace one field of a port.
    UpdatePort {
        /// Environment index.
        env: usize,
        /// Service index.
        service: usize,
        /// Port index.
        port: usize,
        /// Field to replace.
        field: PortField,
        /// New value. For the protocol field this must be `tcp` or `udp`.
        value: String,
    },
    /// Append an empty variable to a service.
    AddServiceVariable {
        /// Environment index.
        env: usize,
        /// Service index.
        service: usize,
    },
    /// Append an empty environment-scoped variable.
    AddEnvironmentVariable {
        /// Environment index.
        env: usize,
    },
    /// Replace one field of a service variable.
    UpdateServiceVariable {
        /// Environment index.
        env: usize,
        /// Service index.
        service: usize,
        /// Variable index.
        variable: usize,
        /// Field to replace.
        field: VariableField,
        /// New value.
        value: String,
    },
    /// Replace one field of an environment-scoped variable.
    UpdateEnvironmentVariable {
        /// Environment index.
        env: usize,
        /// Variable index.
        variable: usize,
        /// Field to replace.
        field: VariableField,
        /// New value.
        value: String,
    },
}

/// Editable application fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationField {
    /// Application name.
    Name,
    /// Application version.
    Version,
    /// Application description.
    Description,
}

/// Editable scalar fields of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceField {
    /// Service name.
    Name,
    /// Container image.
    Image,
    /// Image tag.
    Tag,
    /// Command override.
    Command,
    /// Working directory.
    WorkingDir,
    /// Replica count.
    Replicas,
}

/// Editable port fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortField {
    /// Host port.
    Host,
    /// Container port.
    Container,
    /// Protocol.
    Protocol,
}

/// Editable variable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableField {
    /// Variable name.
    Name,
    /// Variable value.
    Value,
}

impl Edit {
    /// Returns a short operation name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UpdateApplication { .. } => "update-application",
            Self::AddEnvironment { .. } => "add-environment",
            Self::AddService { .. } => "add-service",
            Self::UpdateService { .. } => "update-service",
            Self::AddPort { .. } => "add-port",
            Self::UpdatePort { .. } => "update-port",
            Self::AddServiceVariable { .. } => "add-service-variable",
            Self::AddEnvironmentVariable { .. } => "add-environment-variable",
            Self::UpdateServiceVariable { .. } => "update-service-variable",
            Self::UpdateEnvironmentVariable { .. } => "update-environment-variable",
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

macro_rules! field_names {
    ($ty:ident, $entity:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Returns the field name as written in the document.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = EditorError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().replace('-', "_").as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(EditorError::UnknownField {
                        entity: $entity,
                        field: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

field_names!(ApplicationField, "application", {
    Name => "name",
    Version => "version",
    Description => "description",
});

field_names!(ServiceField, "service", {
    Name => "name",
    Image => "image",
    Tag => "tag",
    Command => "command",
    WorkingDir => "working_dir",
    Replicas => "replicas",
});

field_names!(PortField, "port", {
    Host => "host",
    Container => "container",
    Protocol => "protocol",
});

field_names!(VariableField, "variable", {
    Name => "name",
    Value => "value",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_parse() {
        assert_eq!("working-dir".parse::<ServiceField>().ok(), Some(ServiceField::WorkingDir));
        assert_eq!("Protocol".parse::<PortField>().ok(), Some(PortField::Protocol));
        assert_eq!("value".parse::<VariableField>().ok(), Some(VariableField::Value));
    }

    #[test]
    fn test_field_parse_rejects_unknown() {
        let err = "volumes".parse::<ServiceField>();
        assert!(matches!(
            err,
            Err(EditorError::UnknownField { entity: "service", .. })
        ));
        assert!("protocol".parse::<VariableField>().is_err());
    }

    #[test]
    fn test_field_display_round_trips() {
        for field in [ServiceField::Name, ServiceField::WorkingDir, ServiceField::Replicas] {
            assert_eq!(field.to_string().parse::<ServiceField>().ok(), Some(field));
        }
    }
}
