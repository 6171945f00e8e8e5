//! CLI entrypoint for consilium
//!
//! Wires the layers together with dependency injection: configuration and
//! HTTP adapters from infrastructure, the engine from the application
//! layer, console rendering from presentation.

use anyhow::{Context, Result, bail};
use clap::Parser;
use consilium_application::{ConsultationEngine, ModelCatalog, SnapshotStore};
use consilium_domain::{PatientCase, ProviderKind};
use consilium_infrastructure::{
    ConfigLoader, HttpProviderGateway, JsonSnapshotStore, render_markdown,
};
use consilium_presentation::{Cli, ConsolePresenter};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let gateway = Arc::new(HttpProviderGateway::new());

    // Model listing mode
    if let Some(provider) = &cli.list_models {
        let provider: ProviderKind = provider.parse()?;
        let models = gateway
            .list_models(provider, &cli.api_key, &cli.base_url)
            .await?;
        for model in models {
            println!("{}", model.label());
        }
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    let doctors = config.roster()?;
    let settings = config.consultation.to_settings();
    let reveal_delay = Duration::from_millis(config.consultation.reveal_delay_ms);
    let case = load_case(&cli)?;

    info!(doctors = doctors.len(), "Configuration loaded");

    // === Dependency Injection ===
    let presenter = Arc::new(ConsolePresenter::new());
    let mut engine = ConsultationEngine::new(settings, doctors, Arc::clone(&gateway))
        .with_observer(presenter)
        .with_reveal_delay(reveal_delay);

    engine.start(case).await?;

    let snapshot = engine.snapshot();

    if let Some(path) = &cli.report {
        let title = cli
            .save_as
            .clone()
            .unwrap_or_else(|| snapshot.patient_case.name.clone());
        let report = render_markdown(&title, &chrono::Utc::now().to_rfc3339(), &snapshot);
        std::fs::write(path, report)
            .with_context(|| format!("writing report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    if let Some(name) = &cli.save_as {
        let store = JsonSnapshotStore::at_default_location()?;
        let meta = store.create(name)?;
        store.save(&meta.id, snapshot.workflow.phase.status_text(), &snapshot)?;
        println!("Session saved as {}", meta.id);
    }

    Ok(())
}

/// Case from a TOML file, or assembled from the inline flags
fn load_case(cli: &Cli) -> Result<PatientCase> {
    if let Some(path) = &cli.case {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading case file {}", path.display()))?;
        return toml::from_str(&raw).context("parsing case file");
    }
    if let (Some(patient), Some(problem)) = (&cli.patient, &cli.problem) {
        return Ok(PatientCase {
            name: patient.clone(),
            current_problem: problem.clone(),
            ..Default::default()
        });
    }
    bail!("Provide a case: --case <file.toml>, or --patient <name> --problem <complaint>");
}
