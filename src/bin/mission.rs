//! Mission CLI - Command-line interface for mission generation and analysis
//!
//! Commands:
//! - generate: Generate a day's mission, optionally writing it to a workbook
//! - events: Read and normalize annotated missions
//! - summarize: Per-date behavior trends, or one behavior's proportion series
//! - departures: Departure durations across sessions with a rolling mean
//! - ethogram: Print the behavior vocabulary

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mission_ethogram::ethogram::Behavior;
use mission_ethogram::series::session_starts;
use mission_ethogram::trends::{spearman_test, SpearmanResult};
use mission_ethogram::types::ProportionPoint;
use mission_ethogram::{
    generate_mission, write_daily_mission, JsonFileStore, MissionConfig, MissionError,
    MissionProcessor, ETHOGRAM, MISSION_VERSION,
};

/// Mission - departure-training missions and ethogram trends
#[derive(Parser)]
#[command(name = "mission")]
#[command(version = MISSION_VERSION)]
#[command(about = "Generate training missions and summarize annotated ethograms", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a day's mission
    Generate {
        /// First departure duration in seconds
        #[arg(long)]
        first: Option<u32>,

        /// Last (peak) departure duration in seconds
        #[arg(long)]
        last: Option<u32>,

        /// Lower bound of the multiplicative jitter (0-1)
        #[arg(long)]
        noise: Option<f64>,

        /// Total mission length in seconds
        #[arg(long)]
        duration: Option<u32>,

        /// Mission date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Leave the triggers column empty
        #[arg(long)]
        no_triggers: bool,

        /// Seed for a reproducible mission
        #[arg(long)]
        seed: Option<u64>,

        /// Write the mission into this workbook file
        #[arg(long)]
        workbook: Option<PathBuf>,

        /// Worksheet name (overrides config)
        #[arg(long)]
        worksheet: Option<String>,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Read and normalize annotated missions
    Events {
        #[command(flatten)]
        source: SheetSource,

        /// Emit only the first observation of each session
        #[arg(long)]
        session_starts: bool,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Per-date behavior trends
    Summarize {
        #[command(flatten)]
        source: SheetSource,

        /// Report the proportion series of one behavior (code or label)
        #[arg(long)]
        behavior: Option<String>,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Departure durations across sessions
    Departures {
        #[command(flatten)]
        source: SheetSource,

        /// Rolling mean window, in departures
        #[arg(long, default_value = "15")]
        window: usize,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Print the behavior vocabulary in display order
    Ethogram {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SheetSource {
    /// Workbook file to read
    #[arg(short, long)]
    workbook: PathBuf,

    /// Worksheet name (overrides config)
    #[arg(long)]
    worksheet: Option<String>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), MissionCliError> {
    let config = match &cli.config {
        Some(path) => MissionConfig::load(path)?,
        None => MissionConfig::default(),
    };

    match cli.command {
        Commands::Generate {
            first,
            last,
            noise,
            duration,
            date,
            no_triggers,
            seed,
            workbook,
            worksheet,
            output_format,
        } => {
            let mut generation = config.mission.clone();
            if let Some(first) = first {
                generation.first_duration = first;
            }
            if let Some(last) = last {
                generation.last_duration = last;
            }
            if let Some(noise) = noise {
                generation.noise_factor = noise;
            }
            if let Some(duration) = duration {
                generation.mission_duration = duration;
            }
            if no_triggers {
                generation.add_triggers = false;
            }
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let worksheet = worksheet.unwrap_or_else(|| config.worksheet.clone());

            cmd_generate(
                &generation.params_for(date),
                seed,
                workbook.as_deref(),
                &worksheet,
                &output_format,
            )
        }

        Commands::Events {
            source,
            session_starts,
            output_format,
        } => cmd_events(&source.open(&config)?, session_starts, &output_format),

        Commands::Summarize {
            source,
            behavior,
            output_format,
        } => cmd_summarize(&source.open(&config)?, behavior.as_deref(), &output_format),

        Commands::Departures {
            source,
            window,
            output_format,
        } => {
            let processor = source.open(&config)?;
            let series = processor.departures(window)?;
            print!("{}", format_output(&series, &output_format)?);
            Ok(())
        }

        Commands::Ethogram { json } => cmd_ethogram(json),
    }
}

impl SheetSource {
    fn open(
        &self,
        config: &MissionConfig,
    ) -> Result<MissionProcessor<JsonFileStore>, MissionCliError> {
        if !self.workbook.exists() {
            return Err(MissionCliError::MissingWorkbook(self.workbook.clone()));
        }
        let store = JsonFileStore::open(&self.workbook)?;
        let worksheet = self
            .worksheet
            .clone()
            .unwrap_or_else(|| config.worksheet.clone());
        Ok(MissionProcessor::new(store, worksheet))
    }
}

fn cmd_generate(
    params: &mission_ethogram::MissionParams,
    seed: Option<u64>,
    workbook: Option<&Path>,
    worksheet: &str,
    output_format: &OutputFormat,
) -> Result<(), MissionCliError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let rows = match workbook {
        Some(path) => {
            let mut store = JsonFileStore::open(path)?;
            let (rows, outcome) = write_daily_mission(&mut store, worksheet, params, &mut rng)?;
            debug!(
                path = %path.display(),
                first_row = outcome.first_row,
                replaced_rows = outcome.replaced_rows,
                "mission stored"
            );
            rows
        }
        None => generate_mission(params, &mut rng)?,
    };

    print!("{}", format_output(&rows, output_format)?);
    Ok(())
}

fn cmd_events(
    processor: &MissionProcessor<JsonFileStore>,
    starts_only: bool,
    output_format: &OutputFormat,
) -> Result<(), MissionCliError> {
    let events = processor.read_events()?;
    let output = if starts_only {
        format_output(&session_starts(&events), output_format)?
    } else {
        format_output(&events, output_format)?
    };
    print!("{}", output);
    Ok(())
}

fn cmd_summarize(
    processor: &MissionProcessor<JsonFileStore>,
    behavior: Option<&str>,
    output_format: &OutputFormat,
) -> Result<(), MissionCliError> {
    let Some(name) = behavior else {
        let trends = processor.summarize()?;
        print!("{}", format_output(&trends, output_format)?);
        return Ok(());
    };

    let behavior =
        Behavior::parse(name).ok_or_else(|| MissionCliError::UnknownBehavior(name.to_string()))?;
    let series = processor.percent_behavior(behavior)?;
    let report = ProportionReport {
        behavior,
        spearman: spearman_test(&series),
        series,
    };
    print!("{}", format_output(std::slice::from_ref(&report), output_format)?);
    Ok(())
}

fn cmd_ethogram(json: bool) -> Result<(), MissionCliError> {
    let entries: Vec<EthogramEntry> = ETHOGRAM
        .iter()
        .enumerate()
        .map(|(rank, &(code, label))| EthogramEntry { rank, code, label })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("Ethogram");
        println!("========");
        for entry in &entries {
            println!("  {:>2}  {:<3} {}", entry.rank, entry.code, entry.label);
        }
    }
    Ok(())
}

// Helper functions

fn format_output<T: Serialize>(
    records: &[T],
    format: &OutputFormat,
) -> Result<String, MissionCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            if lines.is_empty() {
                Ok(String::new())
            } else {
                Ok(lines.join("\n") + "\n")
            }
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)? + "\n"),
    }
}

// Error types

#[derive(Debug)]
enum MissionCliError {
    Mission(MissionError),
    Json(serde_json::Error),
    MissingWorkbook(PathBuf),
    UnknownBehavior(String),
}

impl From<MissionError> for MissionCliError {
    fn from(e: MissionError) -> Self {
        MissionCliError::Mission(e)
    }
}

impl From<serde_json::Error> for MissionCliError {
    fn from(e: serde_json::Error) -> Self {
        MissionCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MissionCliError> for CliError {
    fn from(e: MissionCliError) -> Self {
        match e {
            MissionCliError::Mission(e) => {
                let (code, hint) = match &e {
                    MissionError::InvalidParameters(_) => (
                        "INVALID_PARAMETERS",
                        "Check durations, noise factor and mission length",
                    ),
                    MissionError::SchemaError(_) => (
                        "SCHEMA_ERROR",
                        "Ensure the worksheet has date, type and durations columns",
                    ),
                    MissionError::UnknownBehaviorCode { .. } => (
                        "UNKNOWN_BEHAVIOR_CODE",
                        "Fix the annotation; run 'mission ethogram' for valid codes",
                    ),
                    MissionError::DivisionUndefined { .. } => (
                        "DIVISION_UNDEFINED",
                        "A session has no observations",
                    ),
                    MissionError::StoreUnavailable(_) => (
                        "STORE_UNAVAILABLE",
                        "Check the workbook path and worksheet name",
                    ),
                    MissionError::JsonError(_) => ("JSON_ERROR", "Check the workbook file syntax"),
                    MissionError::ConfigError(_) => ("CONFIG_ERROR", "Check the TOML configuration"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            MissionCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            MissionCliError::MissingWorkbook(path) => CliError {
                code: "MISSING_WORKBOOK".to_string(),
                message: format!("Workbook {} does not exist", path.display()),
                hint: Some("Run 'mission generate --workbook <path>' first".to_string()),
            },
            MissionCliError::UnknownBehavior(name) => CliError {
                code: "UNKNOWN_BEHAVIOR".to_string(),
                message: format!("Unknown behavior: {}", name),
                hint: Some("Run 'mission ethogram' for valid codes and labels".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ProportionReport {
    behavior: Behavior,
    spearman: Option<SpearmanResult>,
    series: Vec<ProportionPoint>,
}

#[derive(Serialize)]
struct EthogramEntry {
    rank: usize,
    code: &'static str,
    label: &'static str,
}
