//! Prime Lock Lab - Unified CLI
//!
//! Terminal game, HTTP API and one-shot teacher queries.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use prime_lock::{
    ExplanationClient, LabConfig, LabSession, LockGenerator, LockMode, TeacherClient, run_tui, serve,
};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { mode, log_file } => run_play(&cli.config, mode, &log_file).await,
        Command::Serve { port, host } => run_server(&cli.config, host, port).await,
        Command::Generate { mode, seed } => run_generate(mode, seed),
        Command::Explain { topic, context } => run_explain(&cli.config, topic, context).await,
    }
}

/// Run the terminal game
async fn run_play(config_path: &Path, mode: LockMode, log_file: &Path) -> Result<()> {
    let config = LabConfig::load_or_default(config_path)?;
    let teacher = Arc::new(TeacherClient::from_config(&config));
    let session = LabSession::with_generator(teacher, LockGenerator::new(), config.scan_delay(), mode);
    run_tui(session, log_file).await
}

/// Run the HTTP API server
#[instrument(skip(config_path))]
async fn run_server(config_path: &Path, host: String, port: u16) -> Result<()> {
    initialize_tracing();

    info!("Starting Prime Lock Lab HTTP server");
    let config = LabConfig::load_or_default(config_path)?;
    let teacher = Arc::new(TeacherClient::from_config(&config));
    info!(online = teacher.is_online(), "Teacher configured");

    let session = LabSession::new(teacher, &config);
    serve(session, &host, port).await
}

/// Print one generated round as JSON
fn run_generate(mode: LockMode, seed: Option<u64>) -> Result<()> {
    let mut generator = match seed {
        Some(seed) => LockGenerator::seeded(seed),
        None => LockGenerator::new(),
    };
    let round = generator.generate(mode);

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &round)?;
    writeln!(stdout)?;
    Ok(())
}

/// Ask the teacher one question and print the reply
#[instrument(skip(config_path, context))]
async fn run_explain(config_path: &Path, topic: String, context: String) -> Result<()> {
    initialize_tracing();

    let config = LabConfig::load_or_default(config_path)?;
    let teacher = TeacherClient::from_config(&config);
    let reply = teacher.explain_concept(&topic, &context).await;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", reply)?;
    Ok(())
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,prime_lock=debug".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
