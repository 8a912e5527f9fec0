//! Dompetku CLI
//!
//! Command-line front-end for the wallet ledger:
//! - Add and delete entries
//! - Clear the ledger (with confirmation)
//! - Show entries and totals
//! - Export data

use anyhow::Context;
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dompetku::config::{generate_default_config, Config};
use dompetku::export::{write_entries, ExportFormat};
use dompetku::ledger::{Entry, EntryId, EntryStore, StoreEvent};
use dompetku::storage::FileStore;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "dompetku")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Personal wallet ledger for income and expenses")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record an entry (positive = income, negative = expense)
    Add {
        /// Amount
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// Short description
        #[arg(short, long)]
        label: Option<String>,
        /// Category
        #[arg(short = 'C', long)]
        category: Option<String>,
        /// Date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,
        /// Entry id (default: current Unix time in milliseconds)
        #[arg(long)]
        id: Option<String>,
    },

    /// Delete every entry with the given id
    Delete {
        /// Entry id
        #[arg(allow_negative_numbers = true)]
        id: String,
    },

    /// Delete all entries
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List entries in the order they were added
    List,

    /// Show totals
    Summary,

    /// Export entries
    Export {
        /// Export format (csv, json)
        #[arg(long = "as", default_value = "csv")]
        export_format: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.to_string_lossy().to_string();
    }

    init_logging(&config);

    match cli.command {
        Commands::Config { output } => {
            let template = generate_default_config();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &template)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", template),
            }
            Ok(())
        }
        command => run_ledger_command(command, &config, &cli.format),
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dompetku={}", config.logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn open_store(config: &Config) -> anyhow::Result<EntryStore<FileStore>> {
    let backend = FileStore::new(config.storage.data_path());
    let key = config.storage.key.clone();

    let store = if config.storage.strict_load {
        EntryStore::open_strict(backend, key)
    } else {
        EntryStore::open(backend, key)
    }
    .with_context(|| format!("opening ledger in {}", config.storage.data_dir))?;

    if let Some(issue) = store.load_issue() {
        if issue.skipped.is_empty() {
            eprintln!(
                "Warning: ledger data under '{}' could not be read ({}); starting empty.",
                issue.key, issue.message
            );
        } else {
            eprintln!(
                "Warning: skipped {} unreadable entries under '{}' ({}).",
                issue.skipped.len(),
                issue.key,
                issue.message
            );
        }
        eprintln!("The original data was copied to '{}'.", issue.backup_key);
    }

    Ok(store)
}

fn run_ledger_command(command: Commands, config: &Config, format: &str) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    store.subscribe(|event| match event {
        StoreEvent::Added(entry) => println!("Added {} ({})", entry.id, format_amount(entry.amount)),
        StoreEvent::Deleted { id, removed } => println!("Deleted {} entries with id {}", removed, id),
        StoreEvent::Cleared { removed } => println!("Cleared {} entries", removed),
    });

    match command {
        Commands::Add {
            amount,
            label,
            category,
            date,
            id,
        } => {
            let id = match id {
                Some(raw) => raw.parse::<EntryId>()?,
                None => EntryId::Number(Utc::now().timestamp_millis()),
            };
            let date = match date.as_deref() {
                None | Some("today") => Local::now().date_naive(),
                Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .with_context(|| format!("Invalid date: {}. Use YYYY-MM-DD", s))?,
            };

            let mut entry = Entry::new(id, amount).date(date);
            if let Some(label) = label {
                entry = entry.label(label);
            }
            if let Some(category) = category {
                entry = entry.category(category);
            }

            store.add_entry(entry)?;
        }

        Commands::Delete { id } => {
            let id = id.parse::<EntryId>()?;
            store.delete_entry(&id)?;
        }

        Commands::Clear { yes } => {
            let cleared = if yes {
                store.clear_all_entries(&mut true)?
            } else {
                store.clear_all_entries(&mut terminal_prompt)?
            };
            if !cleared {
                println!("Nothing was deleted.");
            }
        }

        Commands::List => {
            if format == "json" {
                write_entries(store.entries(), ExportFormat::Json, std::io::stdout().lock())?;
            } else {
                print_entries(store.entries());
            }
        }

        Commands::Summary => {
            let summary = store.summary();
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Entries:  {}", summary.total_entries);
                println!("Income:   {}", format_amount(summary.total_income));
                println!("Expense:  {}", format_amount(summary.total_expense));
                println!("Balance:  {}", format_amount(summary.balance));
            }
        }

        Commands::Export {
            export_format,
            output,
        } => {
            let export_format: ExportFormat =
                export_format.parse().map_err(anyhow::Error::msg)?;
            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("creating {:?}", path))?;
                    write_entries(store.entries(), export_format, std::io::BufWriter::new(file))?;
                    eprintln!("Exported {} entries to {:?}", store.total_entries(), path);
                }
                None => write_entries(store.entries(), export_format, std::io::stdout().lock())?,
            }
        }

        Commands::Config { .. } => unreachable!("handled before the ledger is opened"),
    }

    Ok(())
}

/// Ask on the terminal; anything but y/yes declines
fn terminal_prompt(message: &str) -> bool {
    eprint!("{} [y/N] ", message);
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_entries(entries: &[Entry]) {
    if entries.is_empty() {
        println!("No entries yet.");
        println!();
        println!("Record your first one with:");
        println!("  dompetku add 50000 --label \"Uang saku\"");
        return;
    }

    println!(
        "{:<15} {:<12} {:<12} {:<24} {:>14}",
        "ID", "Date", "Category", "Label", "Amount"
    );
    println!("{}", "-".repeat(81));

    for entry in entries {
        println!(
            "{:<15} {:<12} {:<12} {:<24} {:>14}",
            entry.id.to_string(),
            entry.detail_str("date").unwrap_or("-"),
            entry.detail_str("category").unwrap_or("-"),
            entry.detail_str("label").unwrap_or("-"),
            format_amount(entry.amount)
        );
    }
}

fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}
