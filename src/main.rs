//! WealthTrack - quarterly personal wealth tracker
//!
//! A CLI tool that records holdings per quarter, derives totals and
//! distributions, charts them over time and asks Gemini for advice.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid arguments, unwritable store, unknown entry, etc.)

mod advice;
mod analysis;
mod categories;
mod cli;
mod config;
mod editor;
mod models;
mod report;
mod store;

use advice::{AdvicePanel, GeminiAdvisor, GeminiConfig};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use cli::{Args, Command, OutputArgs, OutputFormat, RecordCommand};
use config::{Config, DEFAULT_CONFIG_FILE};
use editor::{parse_amount, EntryUpdate, QuarterDraft};
use indicatif::{ProgressBar, ProgressStyle};
use models::{GlobalMetrics, WealthRecord};
use report::{DashboardReport, TrendsReport};
use std::path::{Path, PathBuf};
use std::time::Duration;
use store::{DraftStore, RecordBook, RecordStore};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // The config file can turn on verbose logging, so it is read first
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(args.log_level(config.general.verbose));

    info!("WealthTrack v{}", env!("CARGO_PKG_VERSION"));
    source.log();
    debug!("Arguments: {:?}", args);

    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }

    if let Err(e) = run(args, config).await {
        error!("Command failed: {}", e);
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .wealthtrack.toml.
fn handle_init_config() -> Result<()> {
    if !write_default_config(Path::new(DEFAULT_CONFIG_FILE))? {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to change storage paths, the advice model and language.");
    Ok(())
}

/// Write the default config to `path`. Returns false if the file exists.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

async fn run(args: Args, config: Config) -> Result<()> {
    match args.command {
        Command::Dashboard { advice, ref output } => {
            run_dashboard(&config, advice, output, args.quiet).await
        }
        Command::Record { ref action } => run_record(&config, action),
        Command::Trends { ref output } => run_trends(&config, output),
        Command::InitConfig => handle_init_config(),
    }
}

/// Where the configuration came from. Reported once logging is up.
#[derive(Debug)]
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    Builtin,
    DefaultFileInvalid(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::DefaultFile => info!("Loaded default config from {}", DEFAULT_CONFIG_FILE),
            ConfigSource::Builtin => debug!("No config file found, using defaults"),
            ConfigSource::DefaultFileInvalid(e) => warn!("Failed to load config: {}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    Ok(match Config::load_default() {
        Ok(Some(config)) => (config, ConfigSource::DefaultFile),
        Ok(None) => (Config::default(), ConfigSource::Builtin),
        Err(e) => (Config::default(), ConfigSource::DefaultFileInvalid(e)),
    })
}

fn open_book(config: &Config) -> (RecordStore, RecordBook) {
    let store = RecordStore::new(&config.storage.records_path);
    let book = RecordBook::open(&store, config.storage.seed_demo_data, Utc::now());
    if book.is_empty() {
        info!("No records in {}", store.path().display());
    } else {
        debug!("{} records loaded from {}", book.len(), store.path().display());
    }
    (store, book)
}

async fn run_dashboard(config: &Config, with_advice: bool, output: &OutputArgs, quiet: bool) -> Result<()> {
    let (_, book) = open_book(config);
    let latest = book.latest();
    let mut report = DashboardReport::new(latest, Utc::now());

    if with_advice {
        match latest {
            Some(record) => {
                let metrics = report.metrics.metrics;
                report = report.with_advice(request_advice(config, record, &metrics, quiet).await);
            }
            None => warn!("No records yet, skipping advice"),
        }
    }

    let content = match output.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_dashboard_markdown(&report),
    };
    emit(&content, output)
}

/// Ask the advisor for one quarter, with a spinner while waiting.
///
/// Never fails: setup problems surface as fallback advice text.
async fn request_advice(
    config: &Config,
    record: &WealthRecord,
    metrics: &GlobalMetrics,
    quiet: bool,
) -> Option<String> {
    let panel = AdvicePanel::from_advisor(GeminiAdvisor::new(GeminiConfig::from_config(
        &config.advice,
    )));

    let spinner = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        match ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
            Ok(style) => pb.set_style(style),
            Err(e) => debug!("Keeping the default spinner style: {}", e),
        }
        pb.set_message(format!("Asking {} for advice on {}...", config.advice.model, record.id));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let advice = panel.request(record, metrics).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    advice
}

fn run_trends(config: &Config, output: &OutputArgs) -> Result<()> {
    let (_, book) = open_book(config);
    let report = TrendsReport::from_records(book.records());

    let content = match output.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_trends_markdown(&report),
    };
    emit(&content, output)
}

fn run_record(config: &Config, action: &RecordCommand) -> Result<()> {
    let drafts = DraftStore::new(&config.storage.draft_path);
    debug!("Using draft file {}", drafts.path().display());
    let now = Utc::now();

    match action {
        RecordCommand::Show { category } => {
            let draft = drafts.load_or_new(now);
            print!("{}", report::generate_record_form_markdown(&draft, *category));
        }

        RecordCommand::Add {
            category,
            label,
            value,
        } => {
            let mut draft = drafts.load_or_new(now);
            let amount = value.as_deref().map(parse_amount).unwrap_or(0.0);
            let id = draft.add_entry(*category, label.clone(), amount);
            drafts.save(&draft)?;

            println!(
                "✅ Added entry {} to {} ({}). Category total: {}",
                id,
                category,
                draft.quarter_id,
                report::format::format_currency(draft.category_total(*category))
            );
        }

        RecordCommand::Edit {
            category,
            id,
            label,
            value,
        } => {
            let mut draft = drafts.load_or_new(now);
            if let Some(label) = label {
                draft.update_entry(*category, id, EntryUpdate::Label(label.clone()))?;
            }
            if let Some(value) = value {
                draft.update_entry(*category, id, EntryUpdate::Value(parse_amount(value)))?;
            }
            drafts.save(&draft)?;

            println!(
                "✅ Updated entry {} in {}. Category total: {}",
                id,
                category,
                report::format::format_currency(draft.category_total(*category))
            );
        }

        RecordCommand::Delete { category, id } => {
            let mut draft = drafts.load_or_new(now);
            let removed = draft.delete_entry(*category, id)?;
            drafts.save(&draft)?;

            println!(
                "🗑️  Removed entry {} ({}) from {}",
                removed.id,
                if removed.label.is_empty() { "unnamed" } else { removed.label.as_str() },
                category
            );
        }

        RecordCommand::Quarter { label } => {
            let mut draft = drafts.load_or_new(now);
            draft.set_quarter(label)?;
            drafts.save(&draft)?;
            println!("✅ Draft will be saved as {}", draft.quarter_id);
        }

        RecordCommand::Load { label } => {
            let (_, book) = open_book(config);
            let record = book
                .get(label.trim())
                .ok_or_else(|| anyhow!("No saved record for quarter {}", label.trim()))?;

            let draft = QuarterDraft::from_record(record);
            drafts.save(&draft)?;
            println!(
                "✅ Loaded {} into the draft ({} entries)",
                draft.quarter_id,
                draft.data.entry_count()
            );
        }

        RecordCommand::Save => {
            let draft = drafts
                .load()
                .context("Nothing to save: start a draft with `wealthtrack record add`")?;

            if draft.data.is_empty() {
                warn!("Saving {} with no entries", draft.quarter_id);
            }

            let (store, mut book) = open_book(config);
            let record = draft.commit(now);
            let label = record.id.clone();
            let replaced = book.upsert(record);
            store.save(book.records())?;
            drafts.clear()?;

            match replaced.as_ref().and_then(WealthRecord::created_at) {
                Some(previous) => println!(
                    "✅ Replaced record {} from {} ({} records stored)",
                    label,
                    previous.format("%Y-%m-%d"),
                    book.len()
                ),
                None => println!("✅ Saved record {} ({} records stored)", label, book.len()),
            }
        }

        RecordCommand::Discard => {
            if drafts.clear()? {
                println!("🗑️  Draft discarded");
            } else {
                println!("No draft to discard");
            }
        }
    }

    Ok(())
}

/// Print to stdout or write to the requested file.
fn emit(content: &str, output: &OutputArgs) -> Result<()> {
    match output.output {
        Some(ref path) => {
            report::write_report(content, path)?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_write_default_config_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DEFAULT_CONFIG_FILE);

        assert!(write_default_config(&path).unwrap());
        let written: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.advice.model, Config::default().advice.model);

        std::fs::write(&path, "[general]\nverbose = true\n").unwrap();
        assert!(!write_default_config(&path).unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("verbose = true"));
    }

    #[test]
    fn test_init_config_parses_as_a_command() {
        let args = Args::try_parse_from(["wealthtrack", "init-config"]).unwrap();
        assert!(matches!(args.command, Command::InitConfig));
    }

    #[test]
    fn test_load_config_explicit_file_sets_verbose() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(&path, "[general]\nverbose = true\n").unwrap();

        let args = Args::try_parse_from([
            "wealthtrack",
            "--config",
            path.to_str().unwrap(),
            "trends",
        ])
        .unwrap();
        let (config, source) = load_config(&args).unwrap();

        assert!(matches!(source, ConfigSource::Explicit(ref p) if p == &path));
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);
    }

    #[test]
    fn test_load_config_explicit_file_errors_are_returned() {
        let args = Args::try_parse_from([
            "wealthtrack",
            "--config",
            "/nonexistent/wealthtrack.toml",
            "trends",
        ])
        .unwrap();
        assert!(load_config(&args).is_err());
    }
}
