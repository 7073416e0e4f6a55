//! mailguard: triage unread IMAP mail for phishing.
//!
//! # Usage
//!
//! ```bash
//! # Scan the folders named in the config file
//! mailguard --config mailguard.json
//!
//! # Scan two folders, report only
//! mailguard --config mailguard.json --folder INBOX --folder Work --dry-run
//! ```
//!
//! Exit status: 0 when the run completed or there was nothing to scan, 1 on a
//! fatal error, 2 on a configuration error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use mailguard::classifier::ProcessClassifier;
use mailguard::config::{load_config, validate_config, Config};
use mailguard::mailbox::{ImapClient, NameMatchSelector};
use mailguard::sanitize::{redact_address, redact_path};
use mailguard::triage::{RunOutcome, TriageController, TriageError};
use mailguard::Result;

#[derive(Parser, Debug)]
#[command(name = "mailguard")]
#[command(version, about = "Triage unread IMAP mail for phishing", long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "mailguard.json")]
    config: PathBuf,

    /// Probability at or above which a message is malicious
    #[arg(long)]
    threshold: Option<f64>,

    /// Folder to scan (repeatable); replaces the configured folders
    #[arg(long = "folder", value_name = "FOLDER")]
    folders: Vec<String>,

    /// Quarantine folder
    #[arg(long)]
    spam_folder: Option<String>,

    /// Classify and report without moving anything
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Command-line values override the config file.
    fn apply(&self, config: &mut Config) {
        if let Some(threshold) = self.threshold {
            config.triage.phishy_threshold = threshold;
        }
        if !self.folders.is_empty() {
            config.triage.folders = self.folders.clone();
        }
        if let Some(spam_folder) = &self.spam_folder {
            config.triage.spam_folder = Some(spam_folder.clone());
        }
        if self.dry_run {
            config.triage.dry_run = true;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mailguard=info"));
    let fmt_layer = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };
    let subscriber = Registry::default().with(filter).with(fmt_layer);

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge `log` records into tracing: {}", e);
    }
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let mut config = load_config(&cli.config)?;
    cli.apply(&mut config);
    validate_config(&config)?;
    info!(
        "Loaded configuration {} for {}",
        redact_path(&cli.config),
        redact_address(&config.mailbox.username)
    );

    let classifier = ProcessClassifier::from_config(&config.classifier);
    let controller = TriageController::new(
        config.triage.clone(),
        classifier,
        NameMatchSelector::default(),
    );

    let mut client = ImapClient::new(config.mailbox.clone());
    client.connect().await.map_err(TriageError::Connect)?;
    println!(
        "[🔑] Connection with the IMAP server {} established.\n",
        config.mailbox.host
    );

    let outcome = controller.run(client).await?;

    for warning in outcome.warnings() {
        println!("[⚠️ ] {}", warning);
    }
    match outcome {
        RunOutcome::NothingToScan { .. } => println!("\n[⚠️ ] No unseen emails to scan"),
        RunOutcome::Completed(report) => {
            for line in &report.lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
