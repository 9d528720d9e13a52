//! Envforge CLI entrypoint.
//!
//! This is the main entrypoint for the envforge command-line tool.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use envforge::cli::{
    AppCommands, Cli, Commands, EnvCommands, OutputFormatter, PortCommands, ServiceCommands,
    VarCommands,
};
use envforge::document::{Document, DocumentChecker, DocumentStore, find_document_file};
use envforge::editor::{Edit, FormEditor};
use envforge::error::{ErrorCategory, Result};
use envforge::markup::emit;
use envforge::orchestrator::{MarkupSnapshot, Orchestrator};
use envforge::service::ArtifactKind;
use envforge::settings::Settings;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            match e.category() {
                ErrorCategory::UserInput => ExitCode::from(2),
                ErrorCategory::Transport | ErrorCategory::Internal => ExitCode::FAILURE,
            }
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<ExitCode> {
    let formatter = OutputFormatter::new(cli.output);
    let document = cli.document.as_ref();

    match cli.command {
        Commands::Init { path, force } => cmd_init(&path, force, &formatter).map(|()| ExitCode::SUCCESS),
        Commands::Show => cmd_show(document, &formatter).map(|()| ExitCode::SUCCESS),
        Commands::Check => cmd_check(document, &formatter),
        Commands::Emit { out } => cmd_emit(document, out.as_deref(), &formatter).map(|()| ExitCode::SUCCESS),
        Commands::App { command } => cmd_app(document, command, &formatter).map(|()| ExitCode::SUCCESS),
        Commands::Env { command } => cmd_env(document, command, &formatter).map(|()| ExitCode::SUCCESS),
        Commands::Service { command } => cmd_service(document, command, &formatter).map(|()| ExitCode::SUCCESS),
        Commands::Port { command } => cmd_port(document, command, &formatter).map(|()| ExitCode::SUCCESS),
        Commands::Var { command } => cmd_var(document, command, &formatter).map(|()| ExitCode::SUCCESS),
        Commands::Validate => {
            let (settings, snapshot) = prepare(document, cli.markup.as_deref(), cli.api_url)?;
            cmd_validate(&settings, &snapshot, &formatter).await
        }
        Commands::Envs => {
            let (settings, snapshot) = prepare(document, cli.markup.as_deref(), cli.api_url)?;
            cmd_envs(&settings, &snapshot, &formatter).await.map(|()| ExitCode::SUCCESS)
        }
        Commands::Generate {
            kind,
            env,
            download,
            out_dir,
        } => {
            let (settings, snapshot) = prepare(document, cli.markup.as_deref(), cli.api_url)?;
            let settings = settings.with_output_dir(out_dir);
            cmd_generate(&settings, &snapshot, kind, env.as_deref(), download, &formatter).await
        }
        Commands::Compare { against, env } => {
            let (settings, snapshot) = prepare(document, cli.markup.as_deref(), cli.api_url)?;
            cmd_compare(&settings, &snapshot, &against, env.as_deref(), &formatter)
                .await
                .map(|()| ExitCode::SUCCESS)
        }
        Commands::Ping => {
            let settings = Settings::load(None)?.with_api_url(cli.api_url);
            cmd_ping(&settings, &formatter).await.map(|()| ExitCode::SUCCESS)
        }
    }
}

/// Create a starter document.
fn cmd_init(path: &Path, force: bool, formatter: &OutputFormatter) -> Result<()> {
    info!("Initializing envforge document in: {}", path.display());

    let created = DocumentStore::new().init(path, force)?;
    print!("{}", formatter.format_saved("Created document", &created));

    eprintln!("\nNext steps:");
    eprintln!("  1. Run 'envforge show' to see the document and its indices");
    eprintln!("  2. Edit it with 'envforge service set', 'envforge port add', ...");
    eprintln!("  3. Run 'envforge check' for local checks");
    eprintln!("  4. Run 'envforge generate docker-compose' to produce an artifact");

    Ok(())
}

/// Show the document.
fn cmd_show(document_path: Option<&PathBuf>, formatter: &OutputFormatter) -> Result<()> {
    let (_, document) = load_document(document_path)?;
    print!("{}", formatter.format_document(&document));
    Ok(())
}

/// Run local checks.
fn cmd_check(document_path: Option<&PathBuf>, formatter: &OutputFormatter) -> Result<ExitCode> {
    let (_, document) = load_document(document_path)?;
    let report = DocumentChecker::new().check(&document);
    print!("{}", formatter.format_check(&report));

    Ok(if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Emit markup to stdout or a file.
fn cmd_emit(
    document_path: Option<&PathBuf>,
    out: Option<&Path>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (_, document) = load_document(document_path)?;
    let markup = emit(&document);

    match out {
        Some(path) => {
            std::fs::write(path, &markup)?;
            print!("{}", formatter.format_saved("Wrote markup", path));
        }
        None => println!("{markup}"),
    }

    Ok(())
}

/// Application edits.
fn cmd_app(
    document_path: Option<&PathBuf>,
    command: AppCommands,
    formatter: &OutputFormatter,
) -> Result<()> {
    let edit = match command {
        AppCommands::Set { field, value } => Edit::UpdateApplication { field, value },
    };
    apply_edit(document_path, edit, formatter)
}

/// Environment edits.
fn cmd_env(
    document_path: Option<&PathBuf>,
    command: EnvCommands,
    formatter: &OutputFormatter,
) -> Result<()> {
    let EnvCommands::Add { name } = command;
    let (path, document) = load_document(document_path)?;
    let editor = FormEditor::new();

    let updated = match name {
        Some(name) => editor.apply(&document, Edit::AddEnvironment { name })?,
        None => editor.add_environment_prompted(&document, prompt_environment_name)?,
    };

    if updated == document {
        eprintln!("No environment added.");
        return Ok(());
    }
    save_document(&path, &updated, formatter)
}

/// Service edits.
fn cmd_service(
    document_path: Option<&PathBuf>,
    command: ServiceCommands,
    formatter: &OutputFormatter,
) -> Result<()> {
    let edit = match command {
        ServiceCommands::Add { env } => Edit::AddService { env },
        ServiceCommands::Set {
            env,
            service,
            field,
            value,
        } => Edit::UpdateService {
            env,
            service,
            field,
            value,
        },
    };
    apply_edit(document_path, edit, formatter)
}

/// Port edits.
fn cmd_port(
    document_path: Option<&PathBuf>,
    command: PortCommands,
    formatter: &OutputFormatter,
) -> Result<()> {
    let edit = match command {
        PortCommands::Add { env, service } => Edit::AddPort { env, service },
        PortCommands::Set {
            env,
            service,
            port,
            field,
            value,
        } => Edit::UpdatePort {
            env,
            service,
            port,
            field,
            value,
        },
    };
    apply_edit(document_path, edit, formatter)
}

/// Variable edits, routed to the service or environment scope.
fn cmd_var(
    document_path: Option<&PathBuf>,
    command: VarCommands,
    formatter: &OutputFormatter,
) -> Result<()> {
    let edit = match command {
        VarCommands::Add {
            env,
            service: Some(service),
        } => Edit::AddServiceVariable { env, service },
        VarCommands::Add { env, service: None } => Edit::AddEnvironmentVariable { env },
        VarCommands::Set {
            env,
            variable,
            field,
            value,
            service: Some(service),
        } => Edit::UpdateServiceVariable {
            env,
            service,
            variable,
            field,
            value,
        },
        VarCommands::Set {
            env,
            variable,
            field,
            value,
            service: None,
        } => Edit::UpdateEnvironmentVariable {
            env,
            variable,
            field,
            value,
        },
    };
    apply_edit(document_path, edit, formatter)
}

/// Validate markup with the service.
async fn cmd_validate(
    settings: &Settings,
    snapshot: &MarkupSnapshot,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let orchestrator = Orchestrator::new(settings.client()?);
    let report = orchestrator.validate(snapshot).await?;
    print!("{}", formatter.format_validation(&report, &snapshot.fingerprint));

    if report.valid {
        let session = orchestrator.session();
        let known = session.selector.known();
        if known.is_empty() {
            eprintln!("Active environment: {}", session.selector.active());
        } else {
            eprintln!(
                "Environments: {} (active: {})",
                known.join(", "),
                session.selector.active()
            );
        }
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// List environments reported by the service.
async fn cmd_envs(
    settings: &Settings,
    snapshot: &MarkupSnapshot,
    formatter: &OutputFormatter,
) -> Result<()> {
    let orchestrator = Orchestrator::new(settings.client()?);
    let names = orchestrator.discover(snapshot).await?;
    let session = orchestrator.session();
    print!("{}", formatter.format_environments(&names, session.selector.active()));
    Ok(())
}

/// Validate, select, generate and optionally download.
async fn cmd_generate(
    settings: &Settings,
    snapshot: &MarkupSnapshot,
    kind: ArtifactKind,
    environment: Option<&str>,
    download: bool,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let orchestrator = Orchestrator::new(settings.client()?);

    let report = orchestrator.validate(snapshot).await?;
    if !report.valid {
        eprint!("{}", formatter.format_validation(&report, &snapshot.fingerprint));
        eprintln!("Generation skipped: markup is invalid.");
        return Ok(ExitCode::FAILURE);
    }

    if let Some(name) = environment {
        orchestrator.select_environment(name)?;
    }

    let artifact = orchestrator.generate(kind, snapshot).await?;
    print!("{}", formatter.format_artifact(&artifact));

    if download {
        let path = orchestrator.download(&settings.output_dir).await?;
        eprint!("{}", formatter.format_saved("Downloaded", &path));
    }

    Ok(ExitCode::SUCCESS)
}

/// Compare two environments.
async fn cmd_compare(
    settings: &Settings,
    snapshot: &MarkupSnapshot,
    against: &str,
    environment: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let orchestrator = Orchestrator::new(settings.client()?);

    match environment {
        Some(name) => orchestrator.select_environment(name)?,
        None => {
            orchestrator.discover(snapshot).await?;
        }
    }
    orchestrator.compare_with(against);

    let comparison = orchestrator.compare(snapshot).await?;
    let session = orchestrator.session();
    print!(
        "{}",
        formatter.format_comparison(&comparison, session.selector.active(), against)
    );
    Ok(())
}

/// Check service health.
async fn cmd_ping(settings: &Settings, formatter: &OutputFormatter) -> Result<()> {
    let client = settings.client()?;
    let api_url = client.base_url().to_string();
    let health = Orchestrator::new(client).health().await?;
    print!("{}", formatter.format_health(&health, &api_url));
    Ok(())
}

/// Resolves the document path, defaulting to a search from the working directory.
fn resolve_document_path(document_path: Option<&PathBuf>) -> Result<PathBuf> {
    document_path.map_or_else(|| find_document_file("."), |p| Ok(p.clone()))
}

fn load_document(document_path: Option<&PathBuf>) -> Result<(PathBuf, Document)> {
    let path = resolve_document_path(document_path)?;
    debug!("Loading document: {}", path.display());
    let document = DocumentStore::new().load(&path)?;
    Ok((path, document))
}

fn save_document(path: &Path, document: &Document, formatter: &OutputFormatter) -> Result<()> {
    DocumentStore::new().save(path, document)?;
    print!("{}", formatter.format_saved("Saved document", path));
    Ok(())
}

/// Loads the document, applies one edit and writes the new value back.
fn apply_edit(document_path: Option<&PathBuf>, edit: Edit, formatter: &OutputFormatter) -> Result<()> {
    let (path, document) = load_document(document_path)?;
    info!("Applying {edit}");
    let updated = FormEditor::new().apply(&document, edit)?;
    save_document(&path, &updated, formatter)
}

/// Loads settings and the markup the service commands send.
fn prepare(
    document_path: Option<&PathBuf>,
    markup_path: Option<&Path>,
    api_url: Option<String>,
) -> Result<(Settings, MarkupSnapshot)> {
    match markup_path {
        Some(path) => {
            debug!("Reading markup from {}", path.display());
            let snapshot = MarkupSnapshot::from_markup(std::fs::read_to_string(path)?);
            let settings = Settings::load(None)?.with_api_url(api_url);
            Ok((settings, snapshot))
        }
        None => {
            let (path, document) = load_document(document_path)?;
            let base = path.parent().filter(|p| !p.as_os_str().is_empty());
            let settings = Settings::load(base)?.with_api_url(api_url);
            Ok((settings, MarkupSnapshot::of(&document)))
        }
    }
}

/// Reads an environment name from the terminal. Empty input cancels.
fn prompt_environment_name() -> Option<String> {
    eprint!("New environment name: ");
    let _ = std::io::stderr().flush();

    let mut input = String::new();
    match std::io::stdin().lock().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()).filter(|name| !name.is_empty()),
    }
}
