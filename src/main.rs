mod error;
mod extract;
mod learn;
mod record;
mod schema;
mod source;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::warn;

use extract::enrich::RemoteEnricher;
use record::ExtractedRecord;
use schema::SchemaRegistry;
use store::{TableStore, DEFAULT_STORE_DIR};

#[derive(Parser)]
#[command(name = "intake", about = "Turn free-form text into structured rows in daily tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from text and print the record (no write)
    Analyze {
        /// Inline text to analyze (otherwise --file, otherwise stdin)
        #[arg(short, long)]
        text: Option<String>,
        /// Plain-text file to analyze
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Skip the entity enricher even if configured
        #[arg(long)]
        no_enrich: bool,
    },
    /// Extract fields and append the record to today's table
    Save {
        #[arg(short, long)]
        text: Option<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(long)]
        no_enrich: bool,
        /// Store directory
        #[arg(short, long, default_value = DEFAULT_STORE_DIR)]
        dir: PathBuf,
    },
    /// Extract every text file in a directory and append all records
    Batch {
        /// Directory of .txt/.md files
        input: PathBuf,
        #[arg(short, long, default_value = DEFAULT_STORE_DIR)]
        dir: PathBuf,
        /// Max files to process
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Print the location of a period table
    Open {
        /// Period key (default: today)
        #[arg(long)]
        date: Option<String>,
        #[arg(short, long, default_value = DEFAULT_STORE_DIR)]
        dir: PathBuf,
    },
    /// Print rows from a period table
    Show {
        #[arg(long)]
        date: Option<String>,
        #[arg(short, long, default_value = DEFAULT_STORE_DIR)]
        dir: PathBuf,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Field frequency statistics from the learning store
    Stats {
        #[arg(short, long, default_value = DEFAULT_STORE_DIR)]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze { text, file, no_enrich } => {
            let raw = source::read_input(text, file)?;
            let mut schema = SchemaRegistry::with_core_fields();
            let enricher = build_enricher(no_enrich);
            let record = extract::extract(&raw, &mut schema, enricher.as_ref()).await?;
            print_record(&record);
            Ok(())
        }
        Commands::Save { text, file, no_enrich, dir } => {
            let raw = source::read_input(text, file)?;
            let mut schema = SchemaRegistry::with_core_fields();
            let enricher = build_enricher(no_enrich);
            let record = extract::extract(&raw, &mut schema, enricher.as_ref()).await?;

            let store = TableStore::new(&dir);
            let outcome = store.append(&record, &schema, &today())?;
            if outcome.recovered {
                println!("Warning: existing table was unreadable; started a fresh table.");
            }
            remember_fields(&dir, &record);
            println!("Saved row {} to {}", outcome.rows, outcome.path.display());
            Ok(())
        }
        Commands::Batch { input, dir, limit } => run_batch(&input, &dir, limit),
        Commands::Open { date, dir } => {
            let store = TableStore::new(&dir);
            let period = date.unwrap_or_else(today);
            let path = store.path_for(&period);
            if path.exists() {
                println!("{}", path.display());
            } else {
                println!("No table for {} under {}", period, dir.display());
            }
            Ok(())
        }
        Commands::Show { date, dir, limit } => {
            let store = TableStore::new(&dir);
            let period = date.unwrap_or_else(today);
            match store.load(&period)? {
                None => println!("No table for {}.", period),
                Some(t) => print_table(&t, limit),
            }
            Ok(())
        }
        Commands::Stats { dir } => {
            let conn = learn::connect(&dir)?;
            learn::init_schema(&conn)?;
            let stats = learn::field_stats(&conn)?;
            if stats.is_empty() {
                println!("No extractions recorded yet.");
            } else {
                println!("{:<24} {:>6}   first seen", "Field", "Seen");
                println!("{}", "-".repeat(50));
                for s in &stats {
                    println!("{:<24} {:>6}   {}", truncate(&s.name, 24), s.seen, s.first_seen);
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn build_enricher(no_enrich: bool) -> Option<RemoteEnricher> {
    if no_enrich {
        return None;
    }
    let enricher = RemoteEnricher::from_env();
    if enricher.is_none() {
        tracing::debug!("INTAKE_ENRICH_API_KEY not set, enrichment disabled");
    }
    enricher
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn remember_fields(dir: &std::path::Path, record: &ExtractedRecord) {
    let result = learn::connect(dir).and_then(|conn| {
        learn::init_schema(&conn)?;
        learn::record_fields(&conn, record)
    });
    if let Err(e) = result {
        warn!("learning store update skipped: {:#}", e);
    }
}

/// Batch ingest: parallel pure extraction (no enrichment), sequential
/// appends so every record lands in deterministic order.
fn run_batch(
    input: &std::path::Path,
    dir: &std::path::Path,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let mut files: Vec<PathBuf> = std::fs::read_dir(input)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| source::is_text_file(p))
        .collect();
    files.sort();
    if let Some(n) = limit {
        files.truncate(n);
    }
    if files.is_empty() {
        println!("No text files found in {}.", input.display());
        return Ok(());
    }

    println!("Processing {} files...", files.len());
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let store = TableStore::new(dir);
    let period = today();
    let mut schema = SchemaRegistry::with_core_fields();
    let mut saved = 0usize;
    let mut errors = 0usize;
    let mut recovered = false;
    let conn = match learn::connect(dir).and_then(|c| learn::init_schema(&c).map(|_| c)) {
        Ok(c) => Some(c),
        Err(e) => {
            warn!("learning store unavailable: {:#}", e);
            None
        }
    };

    for chunk in files.chunks(64) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|path| {
                source::load_text(path)
                    .and_then(|text| extract::resolve_fields(&text, None).map_err(Into::into))
                    .map_err(|e| (path.clone(), e))
            })
            .collect();

        for result in results {
            match result {
                Ok(record) => {
                    schema.absorb(&record);
                    let outcome = store.append(&record, &schema, &period)?;
                    recovered |= outcome.recovered;
                    if let Some(conn) = &conn {
                        if let Err(e) = learn::record_fields(conn, &record) {
                            warn!("learning store update skipped: {:#}", e);
                        }
                    }
                    saved += 1;
                }
                Err((path, e)) => {
                    warn!("skipped {}: {:#}", path.display(), e);
                    errors += 1;
                }
            }
            pb.inc(1);
        }
    }

    pb.finish_and_clear();
    if recovered {
        println!("Warning: existing table was unreadable; started a fresh table.");
    }
    println!(
        "Appended {} records to {} ({} skipped).",
        saved,
        store.path_for(&period).display(),
        errors
    );
    Ok(())
}

fn print_record(record: &ExtractedRecord) {
    let width = record
        .field_names()
        .map(|n| n.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);
    for (name, value) in record.iter() {
        println!("{:>w$} | {}", truncate(name, 24), truncate(value, 72), w = width);
    }
}

fn print_table(table: &store::PersistedTable, limit: usize) {
    let col = |name: &str| table.header.iter().position(|c| c == name);
    let cols = ["Captured At", "Name", "Phone", "Amount"];
    let idx: Vec<Option<usize>> = cols.iter().map(|c| col(c)).collect();

    println!(
        "{:>3} | {:<19} | {:<20} | {:<12} | {:<10}",
        "#", cols[0], cols[1], cols[2], cols[3]
    );
    println!("{}", "-".repeat(76));
    for (i, row) in table.rows.iter().take(limit).enumerate() {
        let cell = |j: usize| {
            idx[j]
                .and_then(|k| row.get(k))
                .map(String::as_str)
                .unwrap_or("")
        };
        println!(
            "{:>3} | {:<19} | {:<20} | {:<12} | {:<10}",
            i + 1,
            truncate(cell(0), 19),
            truncate(cell(1), 20),
            truncate(cell(2), 12),
            truncate(cell(3), 10),
        );
    }
    println!(
        "\n{} rows | {} columns",
        table.rows.len(),
        table.header.len()
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
