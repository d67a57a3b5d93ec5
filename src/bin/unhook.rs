//! Unhook CLI - Command-line interface for the Unhook engine
//!
//! Commands:
//! - analyze: Run the full pipeline on one content item
//! - run: Process streaming NDJSON requests from stdin
//! - stats: Print behavior statistics for a user
//! - validate: Validate raw content items without analyzing them
//! - doctor: Diagnose engine health and configuration
//! - schema: Print input/output schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use unhook::normalizer::RawContentItem;
use unhook::pipeline::{AnalyzeRequest, Engine, PipelineResult};
use unhook::tracker::{BehaviorTracker, InMemoryProfileStore, ProfileStore};
use unhook::types::BehavioralContext;
use unhook::{Classifier, RecommendationSelector, ENGINE_VERSION, PRODUCER_NAME};

use std::sync::Arc;

/// Unhook - addiction-risk scoring and intervention engine
#[derive(Parser)]
#[command(name = "unhook")]
#[command(author = "Unhook Labs")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score feed content for addiction risk and choose interventions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on one content item
    Analyze {
        /// Input file with a raw item or analyze request JSON (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,

        /// User identifier for behavior tracking
        #[arg(long, default_value = "default")]
        user: String,

        /// Minutes spent in the current session
        #[arg(long, default_value = "0")]
        session_minutes: u32,

        /// Recent repeat-view count
        #[arg(long, default_value = "0")]
        repeat_count: u32,

        /// Local time of day as HH:MM
        #[arg(long, default_value = "")]
        time_of_day: String,

        /// Whether the user explicitly searched for the content
        #[arg(long)]
        searched: bool,

        /// Load user profiles from file
        #[arg(long)]
        load_profiles: Option<PathBuf>,

        /// Save user profiles to file after processing
        #[arg(long)]
        save_profiles: Option<PathBuf>,
    },

    /// Process streaming NDJSON requests from stdin
    Run {
        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Fallback user identifier for requests that carry none
        #[arg(long, default_value = "default")]
        user: String,

        /// Load user profiles from file
        #[arg(long)]
        load_profiles: Option<PathBuf>,

        /// Save user profiles to file on exit
        #[arg(long)]
        save_profiles: Option<PathBuf>,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Print behavior statistics for a user
    Stats {
        /// User identifier
        #[arg(long)]
        user: String,

        /// Profiles file to read state from
        #[arg(long)]
        profiles: PathBuf,
    },

    /// Validate raw content items without analyzing them
    Validate {
        /// Input file path (use - for stdin), NDJSON of raw items
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose engine health and configuration
    Doctor {
        /// Check a profiles file
        #[arg(long)]
        profiles: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one result per line)
    Ndjson,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (raw content item / analyze request)
    Input,
    /// Output schema (pipeline result)
    Output,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliErrorReport::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            format,
            user,
            session_minutes,
            repeat_count,
            time_of_day,
            searched,
            load_profiles,
            save_profiles,
        } => cmd_analyze(
            &input,
            &output,
            format,
            &user,
            BehavioralContext {
                session_minutes,
                repeat_count,
                time_of_day,
                user_searched: searched,
            },
            load_profiles.as_deref(),
            save_profiles.as_deref(),
        ),

        Commands::Run {
            output_format,
            user,
            load_profiles,
            save_profiles,
            flush,
        } => cmd_run(
            output_format,
            &user,
            load_profiles.as_deref(),
            save_profiles.as_deref(),
            flush,
        ),

        Commands::Stats { user, profiles } => cmd_stats(&user, &profiles),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Doctor { profiles, json } => cmd_doctor(profiles.as_deref(), json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),
    }
}

/// Build an engine over a store optionally pre-loaded from disk
fn build_engine(load_profiles: Option<&Path>) -> Result<(Engine, Arc<InMemoryProfileStore>), CliError> {
    let store = Arc::new(InMemoryProfileStore::new());

    if let Some(path) = load_profiles {
        let json = fs::read_to_string(path)?;
        store.import_json(&json)?;
    }

    let engine = Engine::with_components(
        Classifier::heuristic(),
        RecommendationSelector::offline(),
        BehaviorTracker::with_store(store.clone()),
    );
    Ok((engine, store))
}

fn save_profiles_if_requested(
    store: &InMemoryProfileStore,
    path: Option<&Path>,
) -> Result<(), CliError> {
    if let Some(path) = path {
        fs::write(path, store.export_json()?)?;
    }
    Ok(())
}

fn cmd_analyze(
    input: &PathBuf,
    output: &PathBuf,
    format: OutputFormat,
    user: &str,
    behavior: BehavioralContext,
    load_profiles: Option<&Path>,
    save_profiles: Option<&Path>,
) -> Result<(), CliError> {
    let input_data = read_input(input)?;
    let mut request = parse_request(&input_data)?;

    // CLI flags fill in whatever the request itself did not carry
    if request.user_id == "default" {
        request.user_id = user.to_string();
    }
    if request.behavior == BehavioralContext::default() {
        request.behavior = behavior;
    }

    let (engine, store) = build_engine(load_profiles)?;
    let result = engine.analyze(&request);

    save_profiles_if_requested(&store, save_profiles)?;

    let rendered = format_results(std::slice::from_ref(&result), &format)?;
    write_output(output, &rendered)?;

    if result.is_success() {
        Ok(())
    } else {
        Err(CliError::AnalysisFailed(
            result.error.map(|e| e.message).unwrap_or_default(),
        ))
    }
}

fn cmd_run(
    output_format: OutputFormat,
    user: &str,
    load_profiles: Option<&Path>,
    save_profiles: Option<&Path>,
    flush: bool,
) -> Result<(), CliError> {
    let (engine, store) = build_engine(load_profiles)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut request = parse_request(trimmed)?;
        if request.user_id == "default" {
            request.user_id = user.to_string();
        }

        let result = engine.analyze(&request);
        let rendered = format_results(std::slice::from_ref(&result), &output_format)?;
        write!(stdout, "{}", rendered)?;
        if flush {
            stdout.flush()?;
        }
    }

    save_profiles_if_requested(&store, save_profiles)?;
    Ok(())
}

fn cmd_stats(user: &str, profiles: &PathBuf) -> Result<(), CliError> {
    let (engine, _store) = build_engine(Some(profiles))?;
    let insight = engine.stats(user);
    println!("{}", serde_json::to_string_pretty(&insight)?);
    Ok(())
}

fn cmd_validate(input: &PathBuf, json: bool) -> Result<(), CliError> {
    let input_data = read_input(input)?;

    let mut total = 0usize;
    let mut errors: Vec<ValidationErrorDetail> = Vec::new();

    for (index, line) in input_data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        total += 1;

        let parsed: Result<RawContentItem, _> = serde_json::from_str(trimmed);
        let error = match parsed {
            Ok(raw) => unhook::ContentNormalizer::normalize(&raw)
                .err()
                .map(|e| e.to_string()),
            Err(e) => Some(format!("Invalid JSON: {}", e)),
        };

        if let Some(error) = error {
            errors.push(ValidationErrorDetail { index, error });
        }
    }

    let report = ValidationReport {
        total_items: total,
        valid_items: total - errors.len(),
        invalid_items: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total items:   {}", report.total_items);
        println!("Valid items:   {}", report.valid_items);
        println!("Invalid items: {}", report.invalid_items);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - line {}: {}", err.index + 1, err.error);
            }
        }
    }

    if report.invalid_items > 0 {
        Err(CliError::ValidationFailed(report.invalid_items))
    } else {
        Ok(())
    }
}

fn cmd_doctor(profiles: Option<&Path>, json: bool) -> Result<(), CliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Unhook version {}", ENGINE_VERSION),
    });

    if let Some(path) = profiles {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => {
                    let store = InMemoryProfileStore::new();
                    match store.import_json(&content) {
                        Ok(()) => checks.push(DoctorCheck {
                            name: "profiles".to_string(),
                            status: CheckStatus::Ok,
                            message: format!("Profiles file valid ({} users)", store.user_count()),
                        }),
                        Err(e) => checks.push(DoctorCheck {
                            name: "profiles".to_string(),
                            status: CheckStatus::Error,
                            message: format!("Invalid profiles JSON: {}", e),
                        }),
                    }
                }
                Err(e) => checks.push(DoctorCheck {
                    name: "profiles".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read profiles file: {}", e),
                }),
            }
        } else {
            checks.push(DoctorCheck {
                name: "profiles".to_string(),
                status: CheckStatus::Warning,
                message: "Profiles file does not exist".to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Unhook Doctor Report");
        println!("====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(CliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), CliError> {
    match schema_type {
        SchemaType::Input => {
            println!("Input: raw content item, or analyze request");
            println!();
            println!("Raw content item (all fields except title optional):");
            println!("  {{ \"id\", \"title\", \"url\", \"duration_sec\", \"channel\",");
            println!("    \"thumbnail\", \"description\", \"platform\" }}");
            println!();
            println!("Analyze request:");
            println!("  {{ \"item\": <raw content item>,");
            println!("    \"behavior\": {{ \"session_minutes\", \"repeat_count\",");
            println!("                  \"time_of_day\", \"user_searched\" }},");
            println!("    \"user_id\", \"locale\" }}");
        }
        SchemaType::Output => {
            println!("Output: pipeline result");
            println!();
            println!("- run_id: UUID of this pipeline run");
            println!("- elapsed_ms: wall time of the run");
            println!("- item / context: normalized content and derived indicators");
            println!("- classification: {{ category, reason, triggers, thumbnail_sentiment, confidence }}");
            println!("- risk: {{ index (0-100), tier, action, major_factors, breakdown }}");
            println!("- insight: {{ summary, early_warning, suggested_schedule, insights }}");
            println!("- alternatives: ranked healthier content (3 minimum)");
            println!("- decision: {{ action, overlay_text, cta_buttons, styling_hint, countdown_sec }}");
            println!("- error: {{ stage, message }} when a stage failed (partial results kept)");
        }
    }
    Ok(())
}

// Helper functions

fn read_input(input: &PathBuf) -> Result<String, CliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &PathBuf, data: &str) -> Result<(), CliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
        Ok(())
    } else {
        fs::write(output, data)?;
        Ok(())
    }
}

/// Accept either a full analyze request or a bare raw item
fn parse_request(json: &str) -> Result<AnalyzeRequest, CliError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("item").is_some() {
        Ok(serde_json::from_value(value)?)
    } else {
        let item: RawContentItem = serde_json::from_value(value)?;
        Ok(AnalyzeRequest::new(item, "default"))
    }
}

fn format_results(results: &[PipelineResult], format: &OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for result in results {
                lines.push(serde_json::to_string(result)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(results)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(results)?),
    }
}

// Error types

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Json(serde_json::Error),
    Engine(unhook::EngineError),
    AnalysisFailed(String),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<unhook::EngineError> for CliError {
    fn from(e: unhook::EngineError) -> Self {
        CliError::Engine(e)
    }
}

#[derive(serde::Serialize)]
struct CliErrorReport {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CliError> for CliErrorReport {
    fn from(e: CliError) -> Self {
        match e {
            CliError::Io(e) => CliErrorReport {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CliError::Json(e) => CliErrorReport {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            CliError::Engine(e) => CliErrorReport {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            CliError::AnalysisFailed(message) => CliErrorReport {
                code: "ANALYSIS_FAILED".to_string(),
                message,
                hint: Some("The partial pipeline result was written to the output".to_string()),
            },
            CliError::ValidationFailed(count) => CliErrorReport {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} items failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            CliError::DoctorFailed => CliErrorReport {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_items: usize,
    valid_items: usize,
    invalid_items: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
