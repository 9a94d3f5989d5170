use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use log::info;

use specimen_pair::utils::logging::console::print_pairing_result;
use specimen_pair::{
    PairingConfig, PairingPipeline, Result, SpecimenCategory, SpecimenRecord, load_records,
    prepare_records, read_json_files, write_subject_records,
};

/// Pair blood and tissue sequencing reports collected close together in time
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Select paired specimens and write one JSON file per subject
    Pair(PairArgs),
    /// Count subjects and specimens in a directory of paired subjects
    Summarize {
        /// Directory holding MRN_<id>.json files
        dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct PairArgs {
    /// Specimen export (.json or .parquet)
    input: PathBuf,

    /// Directory for paired subject files
    #[arg(short, long)]
    output: PathBuf,

    /// Pairing configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum span of a subject's selected window, in days
    #[arg(long)]
    max_span_days: Option<i64>,

    /// Keep report appendices and rows without report or verify date
    #[arg(long)]
    no_prepare: bool,

    /// Process subjects sequentially
    #[arg(long)]
    no_parallel: bool,

    /// Show a progress bar
    #[arg(long)]
    progress: bool,

    /// Print one line per subject
    #[arg(long)]
    per_subject: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Command::Pair(args) => run_pair(&args),
        Command::Summarize { dir } => run_summarize(&dir),
    }
}

fn load_config(args: &PairArgs) -> Result<PairingConfig> {
    let mut config = match &args.config {
        Some(path) => PairingConfig::from_json_file(path)?,
        None => PairingConfig::default(),
    };
    if let Some(days) = args.max_span_days {
        config.max_span_days = days;
    }
    if args.no_parallel {
        config.use_parallel = false;
    }
    if args.progress {
        config.show_progress = true;
    }
    config.validate()?;
    Ok(config)
}

fn run_pair(args: &PairArgs) -> Result<()> {
    let start = Instant::now();
    let config = load_config(args)?;
    info!("{config}");

    let mut records = load_records(&args.input)?;
    if !args.no_prepare {
        let (kept, summary) = prepare_records(records);
        info!("Dropped {} unusable records", summary.dropped());
        records = kept;
    }

    let pipeline = PairingPipeline::new(config)?;
    let result = pipeline.run(records);

    let mut written = 0;
    for outcome in result.paired() {
        if let Some(records) = outcome.paired_records() {
            write_subject_records(&args.output, &outcome.subject_id, records)?;
            written += 1;
        }
    }

    print_pairing_result(&result, args.per_subject);
    info!(
        "Wrote {written} paired subjects to {} in {:.2?}",
        args.output.display(),
        start.elapsed()
    );
    Ok(())
}

fn run_summarize(dir: &Path) -> Result<()> {
    let subjects: Vec<Vec<SpecimenRecord>> = read_json_files(dir)?;

    let mut by_category: BTreeMap<SpecimenCategory, usize> = BTreeMap::new();
    for record in subjects.iter().flatten() {
        *by_category.entry(record.category.clone()).or_default() += 1;
    }
    let total: usize = by_category.values().sum();

    println!("Paired subjects: {}", subjects.len());
    println!("Specimens: {total}");
    for (category, count) in &by_category {
        println!("  {category}: {count}");
    }
    Ok(())
}
