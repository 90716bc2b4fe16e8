use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use questionnaires::config::Config;
use questionnaires::document::load_directory;
use questionnaires::export::write_outputs;
use questionnaires::factory::{self, BatchReport};
use questionnaires::ExtractionMode;

#[derive(Parser, Debug)]
#[command(name = "questionnaires")]
#[command(about = "Extract questionnaire responses from Word documents")]
#[command(version)]
struct Cli {
    /// Directory of .docx questionnaires; prompts interactively when omitted
    directory: Option<PathBuf>,

    /// Response type to extract
    #[arg(short, long, value_enum)]
    mode: Option<ExtractionMode>,

    /// Cell separator for the .csv output
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Worker threads used for extraction
    #[arg(short, long)]
    workers: Option<usize>,

    /// Write a default configuration file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.init_config {
        Config::init_default()?;
        if let Some(path) = Config::get_config_path() {
            println!("Wrote default configuration to {}", path.display());
        }
        return Ok(());
    }

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(delimiter) = cli.delimiter {
        config.delimiter = delimiter;
    }
    if cli.workers.is_some() {
        config.workers = cli.workers;
    }
    config.validate()?;

    match cli.directory {
        Some(directory) => {
            let mode = cli.mode.unwrap_or(config.mode);
            run(&directory, mode, &config).await
        }
        None => interactive(&config).await,
    }
}

/// Prompt for directories until input ends, reporting errors and carrying on
async fn interactive(config: &Config) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!("Enter path containing questionnaires:");
        io::stdout().flush()?;
        let Some(directory) = lines.next().transpose()? else {
            return Ok(());
        };

        println!("Content controls (0) or form fields (1)?");
        io::stdout().flush()?;
        let Some(selector) = lines.next().transpose()? else {
            return Ok(());
        };

        let Some(mode) = ExtractionMode::from_selector(&selector) else {
            println!("Unrecognized selection '{}'.", selector.trim());
            continue;
        };

        if let Err(err) = run(Path::new(directory.trim()), mode, config).await {
            println!();
            println!("An error occured during extraction. {err}");
            println!();
        }
    }
}

async fn run(directory: &Path, mode: ExtractionMode, config: &Config) -> Result<()> {
    let started = Instant::now();

    let loaded = load_directory(directory)
        .await
        .with_context(|| format!("failed to read {}", directory.display()))?;

    let results = match config.workers {
        Some(workers) => rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?
            .install(|| factory::process(&loaded.documents, mode)),
        None => factory::process(&loaded.documents, mode),
    };
    let report: BatchReport = results.into_iter().collect();

    let written = write_outputs(
        &report.questionnaires,
        directory,
        &config.delimiter,
        config.write_xml,
        config.write_delimited,
    )?;

    for path in &loaded.unconverted {
        eprintln!("Skipped {}: convert it to .docx first.", path.display());
    }
    for (path, err) in &loaded.failures {
        eprintln!("Could not read {}: {err}", path.display());
    }
    for (name, err) in &report.failures {
        eprintln!("Could not extract {name}: {err}");
    }
    for path in &written {
        println!("Wrote {}", path.display());
    }

    println!();
    println!(
        "Extraction completed in {:.3} seconds.",
        started.elapsed().as_secs_f64()
    );
    println!();
    Ok(())
}
