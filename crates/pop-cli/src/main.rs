use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process;

use pop_core::{convert, Diagnostics};

/// pop — POP equilibrium-description file converter
///
/// Convert thermodynamic POP files into structured JSON documents.
#[derive(Parser)]
#[command(name = "pop", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a POP file to a JSON document
    Convert {
        /// Path to .pop file
        file: PathBuf,
        /// Write the document here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Parse a POP file and report problems without emitting a document
    Check {
        /// Path to .pop file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Convert {
            file,
            output,
            compact,
        } => cmd_convert(&file, output.as_deref(), compact),
        Commands::Check { file, json } => cmd_check(&file, json),
        Commands::Version => {
            println!(
                "pop {} (pop-core {})",
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_VERSION")
            );
            0
        }
    };

    process::exit(exit_code);
}

// ── Diagnostics ────────────────────────────────────────────

/// Reports skipped commands on stderr as they happen
struct TermDiagnostics {
    skipped: usize,
}

impl Diagnostics for TermDiagnostics {
    fn skipped(&mut self, line: &str, feature: &str) {
        self.skipped += 1;
        eprintln!("{} {} ({})", "skipped:".yellow().bold(), line, feature);
    }
}

fn read_source(file: &Path) -> Result<String, i32> {
    std::fs::read_to_string(file).map_err(|e| {
        eprintln!(
            "{} cannot read {}: {}",
            "error:".red().bold(),
            file.display(),
            e
        );
        2
    })
}

// ── Convert ────────────────────────────────────────────────

fn cmd_convert(file: &Path, output: Option<&Path>, compact: bool) -> i32 {
    let source = match read_source(file) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let mut diagnostics = TermDiagnostics { skipped: 0 };
    let document = match convert(&source, &mut diagnostics) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return 1;
        }
    };

    let json = if compact {
        serde_json::to_string(&document)
    } else {
        serde_json::to_string_pretty(&document)
    };
    let json = match json {
        Ok(json) => json,
        Err(e) => {
            eprintln!("{} cannot serialize document: {}", "error:".red().bold(), e);
            return 2;
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, json + "\n") {
                eprintln!(
                    "{} cannot write {}: {}",
                    "error:".red().bold(),
                    path.display(),
                    e
                );
                return 2;
            }
            0
        }
        None => {
            println!("{json}");
            0
        }
    }
}

// ── Check ──────────────────────────────────────────────────

fn cmd_check(file: &Path, json: bool) -> i32 {
    let source = match read_source(file) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let mut diagnostics = TermDiagnostics { skipped: 0 };
    match convert(&source, &mut diagnostics) {
        Ok(document) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": true,
                        "records": document.records.len(),
                        "skipped": diagnostics.skipped,
                    })
                );
            } else {
                println!(
                    "{} {} records, {} commands skipped",
                    "ok:".green().bold(),
                    document.records.len(),
                    diagnostics.skipped
                );
            }
            0
        }
        Err(e) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "valid": false, "error": e.to_string() })
                );
            } else {
                eprintln!("{} {}", "error:".red().bold(), e);
            }
            1
        }
    }
}
