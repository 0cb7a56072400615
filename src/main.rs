//! Career advisor CLI.
//!
//! Usage:
//!   career-advisor init                  Write a default config and load sample careers
//!   career-advisor ask "<question>"      Answer one career question
//!   career-advisor serve                 Run the HTTP service
//!   career-advisor import-careers <file> Import careers from a JSON file
//!   career-advisor history               Show recent questions

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use career_advisor::agent::Advisor;
use career_advisor::careers::{self, CareerStore};
use career_advisor::config::{self, AdvisorConfig, CONFIG_FILE};
use career_advisor::format::{format_answer, LineKind};
use career_advisor::model::InferenceClient;
use career_advisor::server::{self, AppState};
use career_advisor::state::Database;
use career_advisor::tools::job_search::StaticJobCatalog;
use career_advisor::tools::ToolRegistry;
use career_advisor::types::*;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "career-advisor")]
#[command(version)]
#[command(about = "Career advice from an LLM with job search, skill-gap and timeline tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the advisor home directory [default: ~/.career-advisor].
    #[arg(long)]
    home: Option<String>,

    /// Log level (debug, info, warn, error). Overrides the config file.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default config and load the bundled sample careers.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,

        /// Do not import the bundled sample careers.
        #[arg(long)]
        no_samples: bool,
    },

    /// Ask a career question.
    Ask {
        /// The question, e.g. "I know Python, how do I become a data scientist?"
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Run the HTTP service.
    Serve {
        /// Bind address (defaults to the config value).
        #[arg(long)]
        bind: Option<String>,
    },

    /// Import careers from a `{ "careers": [...] }` JSON file.
    ImportCareers { file: PathBuf },

    /// Show recent questions and their outcome.
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let home_dir = config::resolve_home_dir(cli.home.as_deref());
    let config_path = home_dir.join(CONFIG_FILE);
    let mut cfg = config::load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    cfg.apply_env_overrides();

    // RUST_LOG wins, then --log-level, then the config file.
    let level = cli.log_level.clone().unwrap_or_else(|| cfg.log_level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init { force, no_samples } => {
            cmd_init(&home_dir, &config_path, &cfg, force, no_samples)
        }
        Commands::Ask { question } => cmd_ask(&cfg, &question.join(" ")).await,
        Commands::Serve { bind } => cmd_serve(&cfg, bind).await,
        Commands::ImportCareers { file } => cmd_import(&cfg, &file),
        Commands::History { limit } => cmd_history(&cfg, limit),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_init(
    home_dir: &Path,
    config_path: &Path,
    cfg: &AdvisorConfig,
    force: bool,
    no_samples: bool,
) -> Result<()> {
    std::fs::create_dir_all(home_dir)
        .with_context(|| format!("Failed to create home directory: {}", home_dir.display()))?;

    if config_path.exists() && !force {
        println!(
            "{} Config already exists at {} (use --force to overwrite)",
            "!".yellow().bold(),
            config_path.display()
        );
    } else {
        // The env key is not written to disk.
        let mut to_save = cfg.clone();
        to_save.model_api_key.clear();
        config::save_config(&to_save, config_path)?;
        println!(
            "{} Wrote {}",
            ">>>".green().bold(),
            config_path.display()
        );
    }

    if !no_samples {
        let db = open_database(cfg)?;
        let report = careers::import_careers(&db, &careers::sample_careers()?)?;
        println!(
            "{} Sample careers: {} created, {} skipped",
            ">>>".green().bold(),
            report.created,
            report.skipped
        );
    }

    if cfg.model_api_key.is_empty() {
        println!(
            "{} Set {} or model_api_key in {} before asking questions.",
            "Note:".yellow().bold(),
            config::schema::API_KEY_ENV,
            CONFIG_FILE
        );
    }
    Ok(())
}

async fn cmd_ask(cfg: &AdvisorConfig, question: &str) -> Result<()> {
    let (advisor, db) = bootstrap(cfg)?;

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    println!("{} {}", "Question:".bold(), question);
    println!();

    let report = match advisor.get_advice(question, &cancel).await {
        Ok(report) => report,
        Err(e) if e.is_cancelled() => {
            println!("{} Request cancelled.", "!".yellow().bold());
            return Ok(());
        }
        Err(e) => {
            return Err(anyhow::Error::new(e).context("Could not reach the advice model"));
        }
    };

    {
        let db_lock = db.lock().await;
        if let Err(e) = db_lock.save_query(&report.to_query_record(question)) {
            warn!("Failed to record query: {:#}", e);
        }
    }

    match &report.outcome {
        AdviceOutcome::Done { answer, rounds } => {
            print_answer(answer);
            println!();
            println!(
                "{}",
                format!(
                    "({} round(s), {} tokens, careers: {})",
                    rounds,
                    report.usage.total_tokens,
                    if report.careers_used.is_empty() {
                        "none".to_string()
                    } else {
                        report.careers_used.join(", ")
                    }
                )
                .dimmed()
            );
        }
        AdviceOutcome::Exhausted { rounds } => {
            println!(
                "{} Could not complete the advice within {} rounds. Try a more specific question.",
                "!".yellow().bold(),
                rounds
            );
        }
    }
    Ok(())
}

async fn cmd_serve(cfg: &AdvisorConfig, bind: Option<String>) -> Result<()> {
    let (advisor, db) = bootstrap(cfg)?;
    let bind = bind.unwrap_or_else(|| cfg.bind_address.clone());

    println!(
        "{} Serving career advice on http://{} (model: {})",
        ">>>".green().bold(),
        bind,
        cfg.model
    );

    server::serve(&bind, AppState::new(advisor, db)).await?;
    info!("Server shutdown complete");
    Ok(())
}

fn cmd_import(cfg: &AdvisorConfig, file: &Path) -> Result<()> {
    let db = open_database(cfg)?;
    let report = careers::import_careers_file(&db, file)?;
    println!(
        "{} Imported {}: {} created, {} skipped (catalog now holds {})",
        ">>>".green().bold(),
        file.display(),
        report.created,
        report.skipped,
        db.career_count()?
    );
    Ok(())
}

fn cmd_history(cfg: &AdvisorConfig, limit: usize) -> Result<()> {
    let db = open_database(cfg)?;
    let queries = db.recent_queries(limit)?;

    println!();
    println!("{}", "=== Recent Questions ===".bold());
    println!();
    if queries.is_empty() {
        println!("  {}", "No questions yet.".dimmed());
    }
    for q in &queries {
        println!(
            "  {}  {}  {}",
            q.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            colorize_status(q.status),
            q.question
        );
        if !q.careers_used.is_empty() {
            println!("      careers: {}", q.careers_used.join(", "));
        }
    }
    println!();
    println!("  Total: {}", db.query_count()?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the advisor from config: model client, career store, tool registry.
fn bootstrap(cfg: &AdvisorConfig) -> Result<(Advisor, Arc<Mutex<Database>>)> {
    if cfg.model_api_key.is_empty() {
        warn!(
            "No model API key configured (set {} or model_api_key)",
            config::schema::API_KEY_ENV
        );
    }

    let db = Arc::new(Mutex::new(open_database(cfg)?));
    let model = InferenceClient::from_config(cfg)?;
    let tools = ToolRegistry::career_tools(
        Arc::new(StaticJobCatalog::sample()),
        cfg.hours_per_week_default,
    )
    .with_timeout(Duration::from_secs(cfg.tool_timeout_secs));
    let store = CareerStore::new(db.clone(), cfg.context_limit);

    let advisor = Advisor::new(Arc::new(model), tools, Arc::new(store))
        .with_max_rounds(cfg.max_rounds);
    Ok((advisor, db))
}

fn open_database(cfg: &AdvisorConfig) -> Result<Database> {
    let db_path = cfg.resolved_db_path();
    let db_path = Path::new(&db_path);
    Database::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))
}

fn print_answer(answer: &str) {
    for line in format_answer(answer) {
        match line.kind {
            LineKind::Heading(1) => println!("{}", line.text.bold().underline()),
            LineKind::Heading(_) => println!("{}", line.text.bold()),
            LineKind::ListItem => println!("  {} {}", "•".cyan(), line.text),
            LineKind::Emphasis => println!("{}", line.text.yellow().bold()),
            LineKind::Blank => println!(),
            LineKind::Paragraph => println!("{}", line.text),
        }
    }
}

fn colorize_status(status: AdviceStatus) -> String {
    match status {
        AdviceStatus::Done => "done".green().to_string(),
        AdviceStatus::Exhausted => "exhausted".yellow().to_string(),
    }
}
