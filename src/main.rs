//! Financial Document Analyzer
//!
//! The CLI entry point. Handles environment setup, the HTTP server,
//! the email worker, one-shot local analysis, and status display.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use findoc::analyzer::{analyze_pdf, GeminiClient};
use findoc::config::{load_config, AnalyzerConfig, ENV_FILE, INCOMING_DIR, RESULTS_FILE, RUBRICS_FILE};
use findoc::email::EmailWorker;
use findoc::results::ResultsStore;
use findoc::server::{serve, AppState};
use findoc::setup::{banner, run_setup, SetupOptions};
use findoc::types::DocumentType;

const VERSION: &str = "0.1.0";

/// Financial Document Analyzer -- AI review of financial documents
#[derive(Parser, Debug)]
#[command(
    name = "findoc",
    version = VERSION,
    about = "Financial Document Analyzer -- AI review of financial documents"
)]
struct Cli {
    /// Run environment setup (toolchain check, .env scaffold, working directory)
    #[arg(long)]
    setup: bool,

    /// Start the HTTP server (and the email worker when credentials exist)
    #[arg(long)]
    serve: bool,

    /// Run only the email inbox worker
    #[arg(long)]
    worker: bool,

    /// Analyze a local PDF and print the report JSON
    #[arg(long, value_name = "PATH")]
    analyze: Option<PathBuf>,

    /// Document type for --analyze: auto, bank_statement, credit_report, generic
    #[arg(long, default_value = "auto")]
    doc_type: String,

    /// Show current configuration and artifact status
    #[arg(long)]
    status: bool,
}

// ---- Status Command ---------------------------------------------------------

/// Display what setup and prior runs have left on disk.
fn show_status(config: &AnalyzerConfig) {
    let env_exists = std::path::Path::new(ENV_FILE).exists();
    let incoming = std::path::Path::new(INCOMING_DIR);
    let incoming_count = incoming
        .read_dir()
        .map(|entries| entries.count())
        .unwrap_or(0);
    let results_count = ResultsStore::new(PathBuf::from(RESULTS_FILE))
        .read_all()
        .map(|entries| entries.len())
        .unwrap_or(0);

    println!(
        r#"
=== FINDOC STATUS ===
Version:        {}
.env:           {}
Gemini key:     {}
Gmail worker:   {}
Model:          {}
incoming_pdfs:  {} ({} files)
Results:        {} entries
Server:         {}:{}
=====================
"#,
        VERSION,
        if env_exists { "present" } else { "missing (run findoc --setup)" },
        if config.gemini_api_key.is_empty() { "not set" } else { "set" },
        if config.has_gmail_credentials() { "configured" } else { "not configured" },
        config.gemini_model,
        if incoming.exists() { "present" } else { "missing" },
        incoming_count,
        results_count,
        config.bind_addr,
        config.port,
    );
}

// ---- Serve ------------------------------------------------------------------

/// Run the HTTP server, with the email worker alongside when the Gmail
/// credentials are configured.
async fn run_serve(config: AnalyzerConfig) -> Result<()> {
    let state = AppState::new(config.clone());

    if config.has_gmail_credentials() {
        // Share the server's results store so worker and HTTP appends
        // serialize on the same lock.
        let worker = EmailWorker::new(
            &config,
            Arc::clone(&state.gemini),
            state.results.as_ref().clone(),
            PathBuf::from(RUBRICS_FILE),
            PathBuf::from(INCOMING_DIR),
        );
        tokio::spawn(async move {
            if let Err(e) = worker.run().await {
                tracing::error!("email worker exited: {:#}", e);
            }
        });
    } else {
        tracing::warn!(
            "EMAIL_ADDRESS / GMAIL_ACCESS_TOKEN not set; email intake disabled, HTTP upload only"
        );
    }

    serve(state).await
}

// ---- One-shot Analyze -------------------------------------------------------

async fn run_analyze(config: AnalyzerConfig, path: PathBuf, doc_type: &str) -> Result<()> {
    let requested = DocumentType::from_slug(doc_type);
    if requested.is_none() && doc_type != "auto" {
        anyhow::bail!(
            "Unknown --doc-type '{}'. Use auto, bank_statement, credit_report, or generic",
            doc_type
        );
    }

    let gemini = GeminiClient::new(&config);
    let (detected, report) =
        analyze_pdf(&gemini, &PathBuf::from(RUBRICS_FILE), &path, requested).await?;

    ResultsStore::new(PathBuf::from(RESULTS_FILE))
        .append(findoc::types::ResultEntry::from_report(&report, detected, ""))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// ---- Entry Point ------------------------------------------------------------

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("findoc=info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.setup {
        let options = SetupOptions::default();
        match run_setup(&options) {
            Ok(report) => {
                let port = load_config().map(|c| c.port).unwrap_or(10000);
                banner::show_completion(&report, port);
            }
            Err(e) => {
                eprintln!("{}", format!("Setup failed: {}", e).red());
                std::process::exit(1);
            }
        }
        return;
    }

    if cli.status {
        match load_config() {
            Ok(config) => show_status(&config),
            Err(e) => {
                eprintln!("Failed to load configuration: {:#}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    if let Some(path) = cli.analyze {
        let config = match load_config() {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {:#}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = run_analyze(config, path, &cli.doc_type).await {
            eprintln!("Analysis failed: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    if cli.worker {
        let config = match load_config() {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {:#}", e);
                std::process::exit(1);
            }
        };
        let worker = EmailWorker::new(
            &config,
            Arc::new(GeminiClient::new(&config)),
            ResultsStore::new(PathBuf::from(RESULTS_FILE)),
            PathBuf::from(RUBRICS_FILE),
            PathBuf::from(INCOMING_DIR),
        );
        if let Err(e) = worker.run().await {
            eprintln!("Email worker failed: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    if cli.serve {
        let config = match load_config() {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {:#}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = run_serve(config).await {
            eprintln!("Fatal: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Default: show usage hints.
    println!("Run \"findoc --help\" for usage information.");
    println!("Run \"findoc --setup\" to prepare the environment.");
    println!("Run \"findoc --serve\" to start the analyzer.");
}
