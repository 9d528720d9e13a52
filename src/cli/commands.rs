//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::editor::{ApplicationField, PortField, ServiceField, VariableField};
use crate::service::ArtifactKind;

/// Envforge - Multi-environment deployment configuration editor.
#[derive(Parser, Debug)]
#[command(name = "envforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the document file.
    #[arg(short, long, global = true, env = "ENVFORGE_DOCUMENT")]
    pub document: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Configuration service base URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Send this markup file to the service instead of the emitted document.
    #[arg(long, global = true)]
    pub markup: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a starter document.
    Init {
        /// Directory to initialize (defaults to current directory).
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Force overwrite an existing document.
        #[arg(short, long)]
        force: bool,
    },

    /// Show the document with the indices used by edit commands.
    Show,

    /// Check the document locally without contacting the service.
    Check,

    /// Print the markup emitted from the document.
    Emit {
        /// Write the markup to a file instead of stdout.
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,
    },

    /// Edit application fields.
    App {
        /// Application subcommand.
        #[command(subcommand)]
        command: AppCommands,
    },

    /// Edit environments.
    Env {
        /// Environment subcommand.
        #[command(subcommand)]
        command: EnvCommands,
    },

    /// Edit services.
    Service {
        /// Service subcommand.
        #[command(subcommand)]
        command: ServiceCommands,
    },

    /// Edit service ports.
    Port {
        /// Port subcommand.
        #[command(subcommand)]
        command: PortCommands,
    },

    /// Edit service or environment variables.
    Var {
        /// Variable subcommand.
        #[command(subcommand)]
        command: VarCommands,
    },

    /// Validate the markup with the configuration service.
    Validate,

    /// List the environments the service finds in the markup.
    Envs,

    /// Validate, then generate an artifact for one environment.
    Generate {
        /// Artifact kind (docker-compose, kubernetes, helm, github-actions, jenkins).
        kind: ArtifactKind,

        /// Environment to generate for (defaults to the first discovered).
        #[arg(short, long)]
        env: Option<String>,

        /// Also download the artifact file.
        #[arg(long)]
        download: bool,

        /// Directory for downloaded files.
        #[arg(long, env = "ENVFORGE_OUTPUT_DIR")]
        out_dir: Option<PathBuf>,
    },

    /// Compare the services of two environments.
    Compare {
        /// Environment to compare against.
        against: String,

        /// Base environment (defaults to the first discovered).
        #[arg(short, long)]
        env: Option<String>,
    },

    /// Check that the configuration service is reachable.
    Ping,
}

/// Application subcommands.
#[derive(Subcommand, Debug)]
pub enum AppCommands {
    /// Set an application field.
    Set {
        /// Field (name, version, description).
        field: ApplicationField,
        /// New value.
        value: String,
    },
}

/// Environment subcommands.
#[derive(Subcommand, Debug)]
pub enum EnvCommands {
    /// Append an environment. Prompts for the name when omitted.
    Add {
        /// Environment name.
        name: Option<String>,
    },
}

/// Service subcommands.
#[derive(Subcommand, Debug)]
pub enum ServiceCommands {
    /// Append an empty service.
    Add {
        /// Environment index.
        env: usize,
    },

    /// Set a service field.
    Set {
        /// Environment index.
        env: usize,
        /// Service index.
        service: usize,
        /// Field (name, image, tag, command, working_dir, replicas).
        field: ServiceField,
        /// New value.
        value: String,
    },
}

/// Port subcommands.
#[derive(Subcommand, Debug)]
pub enum PortCommands {
    /// Append an empty tcp port.
    Add {
        /// Environment index.
        env: usize,
        /// Service index.
        service: usize,
    },

    /// Set a port field.
    Set {
        /// Environment index.
        env: usize,
        /// Service index.
        service: usize,
        /// Port index.
        port: usize,
        /// Field (host, container, protocol).
        field: PortField,
        /// New value.
        value: String,
    },
}

/// Variable subcommands.
#[derive(Subcommand, Debug)]
pub enum VarCommands {
    /// Append an empty variable.
    Add {
        /// Environment index.
        env: usize,
        /// Service index. Without it the variable is environment-scoped.
        #[arg(short, long)]
        service: Option<usize>,
    },

    /// Set a variable field.
    Set {
        /// Environment index.
        env: usize,
        /// Variable index.
        variable: usize,
        /// Field (name, value).
        field: VariableField,
        /// New value.
        value: String,
        /// Service index. Without it the variable is environment-scoped.
        #[arg(short, long)]
        service: Option<usize>,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_port_set() {
        let cli = Cli::try_parse_from(["envforge", "port", "set", "0", "1", "2", "protocol", "udp"])
            .expect("parse");
        match cli.command {
            Commands::Port {
                command:
                    PortCommands::Set {
                        env,
                        service,
                        port,
                        field,
                        value,
                    },
            } => {
                assert_eq!((env, service, port), (0, 1, 2));
                assert_eq!(field, PortField::Protocol);
                assert_eq!(value, "udp");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "envforge",
            "--api-url",
            "http://localhost:9000/api",
            "generate",
            "github-actions",
            "--env",
            "prod",
        ])
        .expect("parse");
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9000/api"));
        assert!(matches!(
            cli.command,
            Commands::Generate {
                kind: ArtifactKind::GithubActions,
                download: false,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = Cli::try_parse_from(["envforge", "service", "set", "0", "0", "volumes", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_env_add_without_name() {
        let cli = Cli::try_parse_from(["envforge", "env", "add"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Env {
                command: EnvCommands::Add { name: None }
            }
        ));
    }
}
