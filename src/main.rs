use artifact_pipeline::domain::{Artifact, ArtifactStatus, ArtifactType, PipelineProgress, PipelineResult};
use artifact_pipeline::pipeline::{Orchestrator, StepTable};
use artifact_pipeline::storage::{Filter, JsonlArtifactStore};
use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging(config: &Config) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("artifact-pipeline")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("artifact-pipeline.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let mut builder = env_logger::Builder::from_default_env();
    let rust_log = std::env::var("RUST_LOG").ok();
    if let Some(filter) = config.log_filter(rust_log.as_deref()) {
        builder.parse_filters(&filter);
    }
    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let store = Arc::new(JsonlArtifactStore::new(&config.storage.dir).context("Failed to open artifact store")?);

    match &cli.command {
        Commands::Create {
            title,
            artifact_type,
            tone,
            content,
        } => handle_create_command(&store, title, artifact_type, tone.as_deref(), content.as_deref()),
        Commands::List { status, title, pending } => {
            handle_list_command(&store, status.as_deref(), title.as_deref(), *pending)
        }
        Commands::Status { id } => handle_status_command(&store, id),
        Commands::Steps => handle_steps_command(),
        Commands::Run { id } => {
            let orchestrator = build_orchestrator(config, store.clone())?;
            let result = orchestrator.execute(id).await;
            report(&result)
        }
        Commands::Resume { id } => {
            let orchestrator = build_orchestrator(config, store.clone())?;
            let result = orchestrator.resume_from_approval(id).await;
            report(&result)
        }
        Commands::Tool { name, id } => {
            let orchestrator = build_orchestrator(config, store.clone())?;
            let result = orchestrator.execute_single_tool(name, id).await;
            report(&result)
        }
    }
}

fn build_orchestrator(config: &Config, store: Arc<JsonlArtifactStore>) -> Result<Orchestrator> {
    let registry = config.build_registry()?;
    let orchestrator = Orchestrator::new(StepTable::content_pipeline(), registry, store)
        .context("Every pipeline tool needs a command under `tools:` in the config")?
        .with_config(config.orchestrator_config());

    if !config.pipeline.show_progress {
        return Ok(orchestrator);
    }
    Ok(orchestrator.with_progress(Arc::new(|p: &PipelineProgress| {
        println!(
            "{} [{}/{}] {:>3.0}% {}",
            "→".cyan(),
            p.current_step + 1,
            p.total_steps,
            p.fraction() * 100.0,
            p.current_tool.bold()
        );
    })))
}

fn handle_create_command(
    store: &JsonlArtifactStore,
    title: &str,
    artifact_type: &str,
    tone: Option<&str>,
    content: Option<&str>,
) -> Result<()> {
    let artifact_type: ArtifactType = artifact_type.parse()?;
    let mut artifact = Artifact::new(title, artifact_type);
    if let Some(tone) = tone {
        artifact = artifact.with_tone(tone);
    }
    if let Some(content) = content {
        artifact = artifact.with_content(content);
    }

    store.create(&artifact).context("Failed to create artifact")?;
    info!("Created artifact {}", artifact.id);
    println!("{} {}", "Created:".green(), artifact.id);
    Ok(())
}

fn handle_list_command(
    store: &JsonlArtifactStore,
    status: Option<&str>,
    title: Option<&str>,
    pending: bool,
) -> Result<()> {
    let mut filters = Vec::new();
    if let Some(status) = status {
        let status: ArtifactStatus = status.parse()?;
        filters.push(Filter::eq("status", status));
    }
    if let Some(title) = title {
        filters.push(Filter::contains("title", title));
    }
    if pending {
        filters.push(Filter::ne("status", ArtifactStatus::Ready));
    }

    let artifacts = store.list(&filters)?;
    if artifacts.is_empty() {
        println!("{}", "No artifacts".dimmed());
        return Ok(());
    }
    for artifact in artifacts {
        println!(
            "{}  {:<20} {:<12} {}",
            artifact.id,
            colored_status(artifact.status),
            artifact.artifact_type,
            artifact.title
        );
    }
    Ok(())
}

fn handle_status_command(store: &JsonlArtifactStore, id: &str) -> Result<()> {
    let artifact = store.find(id)?.ok_or_else(|| eyre!("Artifact not found: {}", id))?;

    println!("{} {}", "Artifact:".green(), artifact.id);
    println!("  Title:  {}", artifact.title);
    println!("  Type:   {}", artifact.artifact_type);
    println!("  Status: {}", colored_status(artifact.status));
    if let Some(tone) = &artifact.tone {
        println!("  Tone:   {}", tone);
    }
    if artifact.status.is_approval_eligible() {
        println!("  {}", format!("Awaiting approval, continue with: resume {}", artifact.id).yellow());
    }
    Ok(())
}

fn handle_steps_command() -> Result<()> {
    let table = StepTable::content_pipeline();
    for (index, step) in table.steps().iter().enumerate() {
        let mut flags = Vec::new();
        if !step.required {
            flags.push("optional".dimmed().to_string());
        }
        if step.pause_for_approval {
            flags.push("pause".yellow().to_string());
        }
        println!(
            "{:>2}. {:<24} {} → {} {}",
            index,
            step.name(),
            step.status_before,
            step.committed_status(),
            flags.join(" ")
        );
    }
    Ok(())
}

fn colored_status(status: ArtifactStatus) -> ColoredString {
    match status {
        s if s.is_terminal() => s.as_str().green(),
        s if s.is_approval_eligible() => s.as_str().yellow(),
        s => s.as_str().cyan(),
    }
}

fn report(result: &PipelineResult) -> Result<()> {
    for step in &result.tool_results {
        let mark = if step.outcome.success { "✓".green() } else { "✗".red() };
        println!("  {} {} ({}ms)", mark, step.step, step.outcome.duration_ms);
    }

    if result.paused_for_approval {
        println!(
            "{} paused after {} for approval, continue with: resume {}",
            "Paused:".yellow(),
            result.paused_at_step.as_deref().unwrap_or("-"),
            result.artifact_id
        );
        return Ok(());
    }

    if result.success {
        println!(
            "{} {}/{} steps in {}ms (trace {})",
            "Completed:".green(),
            result.steps_completed,
            result.total_steps,
            result.duration_ms,
            result.trace_id
        );
        return Ok(());
    }

    let error = result.error.as_ref();
    let message = error.map(|e| e.message.as_str()).unwrap_or("unknown failure");
    let category = error.map(|e| e.category.to_string()).unwrap_or_default();
    println!(
        "{} {} [{}] (trace {})",
        "Failed:".red(),
        message,
        category,
        result.trace_id
    );
    Err(eyre!("Pipeline failed for {}", result.artifact_id))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration; it carries the log level
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
