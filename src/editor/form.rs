//! Form editor applying structural edits to documents.
//!
//! Edits are copy-on-write: the current document is borrowed, a modified
//! copy is returned, and the caller replaces its snapshot with it. A failed
//! edit returns an error and no document, so partial mutation is impossible.

use tracing::debug;

use crate::document::{Document, Environment, Port, Service, Variable};
use crate::error::{EditorError, Result};

use super::edit::{ApplicationField, Edit, PortField, ServiceField, VariableField};

/// Applies [`Edit`] values to documents.
#[derive(Debug, Default)]
pub struct FormEditor;

impl FormEditor {
    /// Creates a new form editor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies one edit and returns the resulting document.
    ///
    /// # Errors
    ///
    /// Returns an error if an index does not address an existing entity or
    /// a protocol value is not `tcp`/`udp`.
    pub fn apply(&self, document: &Document, edit: Edit) -> Result<Document> {
        debug!("Applying edit: {edit}");
        let mut next = document.clone();

        match edit {
            Edit::UpdateApplication { field, value } => {
                let application = &mut next.application;
                match field {
                    ApplicationField::Name => application.name = value,
                    ApplicationField::Version => application.version = value,
                    ApplicationField::Description => application.description = value,
                }
            }
            Edit::AddEnvironment { name } => {
                if name.is_empty() {
                    debug!("Environment name is empty; nothing added");
                    return Ok(next);
                }
                next.environments.push(Environment::named(name));
            }
            Edit::AddService { env } => {
                environment_mut(&mut next, env)?.services.push(Service::default());
            }
            Edit::UpdateService { env, service, field, value } => {
                let service = service_mut(&mut next, env, service)?;
                *service_field_mut(service, field) = value;
            }
            Edit::AddPort { env, service } => {
                service_mut(&mut next, env, service)?.ports.push(Port::default());
            }
            Edit::UpdatePort { env, service, port, field, value } => {
                let ports = &mut service_mut(&mut next, env, service)?.ports;
                let len = ports.len();
                let port = ports
                    .get_mut(port)
                    .ok_or(EditorError::out_of_range("port", port, len))?;
                match field {
                    PortField::Host => port.host = value,
                    PortField::Container => port.container = value,
                    PortField::Protocol => port.protocol = value.parse()?,
                }
            }
            Edit::AddServiceVariable { env, service } => {
                service_mut(&mut next, env, service)?
                    .environment
                    .push(Variable::default());
            }
            Edit::AddEnvironmentVariable { env } => {
                environment_mut(&mut next, env)?.variables.push(Variable::default());
            }
            Edit::UpdateServiceVariable { env, service, variable, field, value } => {
                let variables = &mut service_mut(&mut next, env, service)?.environment;
                set_variable_field(variables, variable, field, value)?;
            }
            Edit::UpdateEnvironmentVariable { env, variable, field, value } => {
                let variables = &mut environment_mut(&mut next, env)?.variables;
                set_variable_field(variables, variable, field, value)?;
            }
        }

        Ok(next)
    }

    /// Adds an environment whose name comes from an interactive prompt.
    ///
    /// `None` means the prompt was cancelled; the document comes back unchanged.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches [`FormEditor::apply`].
    pub fn add_environment_prompted(
        &self,
        document: &Document,
        prompt: impl FnOnce() -> Option<String>,
    ) -> Result<Document> {
        match prompt() {
            Some(name) => self.apply(document, Edit::AddEnvironment { name }),
            None => {
                debug!("Environment prompt cancelled");
                Ok(document.clone())
            }
        }
    }
}

fn environment_mut(document: &mut Document, env: usize) -> Result<&mut Environment> {
    let len = document.environments.len();
    document
        .environments
        .get_mut(env)
        .ok_or_else(|| EditorError::out_of_range("environment", env, len).into())
}

fn service_mut(document: &mut Document, env: usize, service: usize) -> Result<&mut Service> {
    let services = &mut environment_mut(document, env)?.services;
    let len = services.len();
    services
        .get_mut(service)
        .ok_or_else(|| EditorError::out_of_range("service", service, len).into())
}

fn service_field_mut(service: &mut Service, field: ServiceField) -> &mut String {
    match field {
        ServiceField::Name => &mut service.name,
        ServiceField::Image => &mut service.image,
        ServiceField::Tag => &mut service.tag,
        ServiceField::Command => &mut service.command,
        ServiceField::WorkingDir => &mut service.working_dir,
        ServiceField::Replicas => &mut service.replicas,
    }
}

fn set_variable_field(
    variables: &mut [Variable],
    index: usize,
    field: VariableField,
    value: String,
) -> Result<()> {
    let len = variables.len();
    let variable = variables
        .get_mut(index)
        .ok_or(EditorError::out_of_range("variable", index, len))?;
    match field {
        VariableField::Name => variable.name = value,
        VariableField::Value => variable.value = value,
    }
    Ok(())
}
