//! CLI module for the envforge configuration tool.
//!
//! This module provides the command-line interface for editing a
//! deployment document and driving the configuration service.

mod commands;
mod output;

pub use commands::{
    AppCommands, Cli, Commands, EnvCommands, OutputFormat, PortCommands, ServiceCommands, VarCommands,
};
pub use output::OutputFormatter;
