//! kmap CLI - Command-line tool for key abbreviation
//!
//! This binary provides command-line interfaces for:
//! - compact: rewrite a JSON document's keys from full names to abbreviations
//! - expand: rewrite a JSON document's keys from abbreviations to full names
//! - abbr: translate individual keys (dotted paths supported)
//! - key: translate individual abbreviations back to keys
//! - pairs: list the registered pairs of a mapping file

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use kmap_core::KeyMap;
use kmap_io::keymap_from_path;
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "kmap")]
#[command(about = "Bidirectional key abbreviation for JSON documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a JSON document's keys from full names to abbreviations
    ///
    /// Examples:
    ///   kmap compact data.json --map keymap.yml -o compacted.json
    ///   cat data.json | kmap compact - --map keymap.json --pretty
    Compact {
        /// Input JSON document ("-" for stdin)
        input: PathBuf,
        /// Mapping file (json, yaml, yml, or toml)
        #[arg(short, long)]
        map: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print the rewritten document
        #[arg(long)]
        pretty: bool,
        /// Show a progress spinner while rewriting
        #[arg(long)]
        progress: bool,
    },
    /// Rewrite a JSON document's keys from abbreviations to full names
    Expand {
        /// Input JSON document ("-" for stdin)
        input: PathBuf,
        /// Mapping file (json, yaml, yml, or toml)
        #[arg(short, long)]
        map: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print the rewritten document
        #[arg(long)]
        pretty: bool,
        /// Show a progress spinner while rewriting
        #[arg(long)]
        progress: bool,
    },
    /// Translate keys to abbreviations, one per line
    ///
    /// Dotted paths are decomposed into independently translated segments.
    Abbr {
        /// Keys to translate
        #[arg(required = true)]
        keys: Vec<String>,
        /// Mapping file (json, yaml, yml, or toml)
        #[arg(short, long)]
        map: PathBuf,
    },
    /// Translate abbreviations back to keys, one per line
    Key {
        /// Abbreviations to translate
        #[arg(required = true)]
        abbrs: Vec<String>,
        /// Mapping file (json, yaml, yml, or toml)
        #[arg(short, long)]
        map: PathBuf,
    },
    /// List the registered pairs of a mapping file
    ///
    /// Examples:
    ///   kmap pairs keymap.yml
    ///   kmap pairs keymap.yml --format json
    Pairs {
        /// Mapping file (json, yaml, yml, or toml)
        map: PathBuf,
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = PairsFormat::Table)]
        format: PairsFormat,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum PairsFormat {
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Direction {
    Compact,
    Expand,
}

impl Direction {
    fn past_tense(self) -> &'static str {
        match self {
            Direction::Compact => "Compacted",
            Direction::Expand => "Expanded",
        }
    }

    fn apply(self, map: &KeyMap, document: &Value) -> Value {
        match self {
            Direction::Compact => map.compact_value(document),
            Direction::Expand => map.expand_value(document),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compact {
            input,
            map,
            output,
            pretty,
            progress,
        } => {
            handle_rewrite(Direction::Compact, input, map, output, pretty, progress)?;
        }
        Commands::Expand {
            input,
            map,
            output,
            pretty,
            progress,
        } => {
            handle_rewrite(Direction::Expand, input, map, output, pretty, progress)?;
        }
        Commands::Abbr { keys, map } => {
            let keymap = keymap_from_path(&map)?;
            let mut stdout = std::io::stdout().lock();
            for key in keys {
                writeln!(&mut stdout, "{}", keymap.abbreviate(&key))?;
            }
        }
        Commands::Key { abbrs, map } => {
            let keymap = keymap_from_path(&map)?;
            let mut stdout = std::io::stdout().lock();
            for abbr in abbrs {
                writeln!(&mut stdout, "{}", keymap.restore(&abbr))?;
            }
        }
        Commands::Pairs { map, format } => {
            handle_pairs(map, format)?;
        }
    }

    Ok(())
}

fn handle_rewrite(
    direction: Direction,
    input: PathBuf,
    map_path: PathBuf,
    output: Option<PathBuf>,
    pretty: bool,
    show_progress: bool,
) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let keymap = keymap_from_path(&map_path)?;
    let content = read_input(&input)?;
    let document: Value = serde_json::from_str(&content)?;

    let mut progress_bar = show_progress.then(|| create_spinner("Rewriting keys"));
    let rewritten = direction.apply(&keymap, &document);
    let rendered = if pretty {
        serde_json::to_string_pretty(&rewritten)?
    } else {
        serde_json::to_string(&rewritten)?
    };
    let destination = write_output(output.as_deref(), &rendered)?;
    let elapsed = start.elapsed();

    if let Some(pb) = progress_bar.take() {
        pb.finish_with_message(format!(
            "{} {} in {:.2?}",
            direction.past_tense(),
            describe_input(&input),
            elapsed
        ));
    }
    report_rewrite_summary(direction, &destination, keymap.len(), elapsed)?;
    Ok(())
}

fn handle_pairs(map_path: PathBuf, format: PairsFormat) -> Result<(), Box<dyn Error>> {
    // Building the full KeyMap validates the mapping (duplicates included),
    // not just its syntax.
    let keymap = keymap_from_path(&map_path)?;
    let mut pairs: Vec<(String, String)> = keymap
        .pairs()
        .map(|(key, abbr)| (key.to_string(), abbr.to_string()))
        .collect();
    pairs.sort();

    match format {
        PairsFormat::Table => {
            let width = pairs
                .iter()
                .map(|(key, _)| key.len())
                .max()
                .unwrap_or(0)
                .max("KEY".len());
            println!("{:<width$}  ABBR", "KEY");
            for (key, abbr) in &pairs {
                println!("{:<width$}  {}", key, abbr);
            }
        }
        PairsFormat::Json => {
            let report = PairsReport {
                mapping: map_path.display().to_string(),
                pairs: pairs
                    .into_iter()
                    .map(|(key, abbr)| PairEntry { key, abbr })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, serde::Serialize)]
struct PairsReport {
    mapping: String,
    pairs: Vec<PairEntry>,
}

#[derive(Debug, Clone, serde::Serialize)]
struct PairEntry {
    key: String,
    abbr: String,
}

fn read_input(path: &Path) -> Result<String, Box<dyn Error>> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin().lock().read_to_string(&mut content)?;
        Ok(content)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn write_output(output: Option<&Path>, rendered: &str) -> Result<String, Box<dyn Error>> {
    match output {
        Some(path) => {
            fs::write(path, format!("{}\n", rendered))?;
            Ok(path.display().to_string())
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(&mut stdout, "{}", rendered)?;
            Ok("stdout".to_string())
        }
    }
}

fn describe_input(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "stdin".to_string()
    } else {
        path.display().to_string()
    }
}

fn report_rewrite_summary(
    direction: Direction,
    destination: &str,
    entries: usize,
    elapsed: Duration,
) -> Result<(), Box<dyn Error>> {
    let mut stderr = std::io::stderr().lock();
    writeln!(
        &mut stderr,
        "{} to {} (mapping entries: {}, elapsed: {:.2?})",
        direction.past_tense(),
        destination,
        entries,
        elapsed
    )?;
    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
