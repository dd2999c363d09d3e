//! Insights CLI - Command-line interface for FocusPro Insights
//!
//! Commands:
//! - compute: Compute a metrics report from a data snapshot
//! - period: Resolve a period token to its concrete interval
//! - mood: Print mood statistics for a period
//! - validate: Validate snapshot records
//! - doctor: Diagnose configuration health
//! - schema: Print the snapshot input schema

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use focuspro_insights::config::EngineConfig;
use focuspro_insights::encoder::MetricsEncoder;
use focuspro_insights::pipeline::MetricsPipeline;
use focuspro_insights::schema::{DataSnapshot, RecordAdapter, SCHEMA_VERSION};
use focuspro_insights::types::MetricsReport;
use focuspro_insights::{ComputeError, INSIGHTS_VERSION, PRODUCER_NAME};

/// FocusPro Insights - temporal analytics and engagement metrics
#[derive(Parser)]
#[command(name = "insights")]
#[command(author = "FocusPro")]
#[command(version = INSIGHTS_VERSION)]
#[command(about = "Compute engagement and mood metrics from FocusPro data", long_about = None)]
struct Cli {
    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EngineArgs {
    /// Engine configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference timezone (IANA format, overrides the config file)
    #[arg(long)]
    timezone: Option<String>,

    /// Current instant (RFC 3339); defaults to the system clock
    #[arg(long)]
    now: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a metrics report from a data snapshot
    Compute {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Period token (today, yesterday, week, month, all)
        #[arg(short, long, default_value = "week")]
        period: String,

        /// Only process snapshots of this user
        #[arg(long)]
        user: Option<String>,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Resolve a period token to its concrete interval
    Period {
        /// Period token
        token: String,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Print mood statistics, top reasons and tags for a period
    Mood {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Period token
        #[arg(short, long, default_value = "month")]
        period: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Validate snapshot records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration health
    Doctor {
        /// Engine configuration file to check
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the snapshot input schema
    Schema {
        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// A single snapshot document
    Json,
    /// Newline-delimited JSON (one snapshot per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one report per line)
    Ndjson,
    /// JSON array of reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), InsightsCliError> {
    match cli.command {
        Commands::Compute {
            input,
            output,
            period,
            user,
            input_format,
            format,
            engine,
        } => cmd_compute(&input, &output, &period, user.as_deref(), input_format, format, &engine),

        Commands::Period { token, engine } => cmd_period(&token, &engine),

        Commands::Mood {
            input,
            period,
            json,
            engine,
        } => cmd_mood(&input, &period, json, &engine),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema { json_schema } => cmd_schema(json_schema),
    }
}

fn cmd_compute(
    input: &Path,
    output: &Path,
    period: &str,
    user: Option<&str>,
    input_format: InputFormat,
    format: OutputFormat,
    engine: &EngineArgs,
) -> Result<(), InsightsCliError> {
    let snapshots: Vec<DataSnapshot> = read_snapshots(input, &input_format)?
        .into_iter()
        .filter(|s| match (user, s.user_id.as_deref()) {
            (Some(wanted), Some(id)) => wanted == id,
            _ => true,
        })
        .collect();

    if snapshots.is_empty() {
        return Err(InsightsCliError::NoSnapshots);
    }

    let config = load_config(engine)?;
    let now = parse_now(engine.now.as_deref())?;
    let pipeline = MetricsPipeline::new(&config)?;
    let spec = pipeline.resolver().resolve(period, now)?;
    let encoder = MetricsEncoder::new();

    let mut reports: Vec<MetricsReport> = Vec::with_capacity(snapshots.len());
    for snapshot in &snapshots {
        RecordAdapter::ensure_valid(snapshot)?;
        let metrics = pipeline.compute_snapshot(snapshot, &spec, now);
        let user_id = snapshot.user_id.as_deref().or(user);
        reports.push(encoder.encode(user_id, &spec, &metrics));
    }
    debug!(reports = reports.len(), period = %spec.period, "computed reports");

    let output_data = format_output(&reports, &format)?;
    write_output(output, &output_data)
}

fn cmd_period(token: &str, engine: &EngineArgs) -> Result<(), InsightsCliError> {
    let config = load_config(engine)?;
    let now = parse_now(engine.now.as_deref())?;
    let spec = MetricsPipeline::new(&config)?.resolver().resolve(token, now)?;

    let mut value = serde_json::to_value(&spec)?;
    value["series_dates"] = serde_json::to_value(spec.series_dates())?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_mood(
    input: &Path,
    period: &str,
    json: bool,
    engine: &EngineArgs,
) -> Result<(), InsightsCliError> {
    let snapshot = RecordAdapter::parse_snapshot(&read_input(input)?)?;
    RecordAdapter::ensure_valid(&snapshot)?;

    let config = load_config(engine)?;
    let now = parse_now(engine.now.as_deref())?;
    let pipeline = MetricsPipeline::new(&config)?;
    let spec = pipeline.resolver().resolve(period, now)?;
    let metrics = pipeline.compute_snapshot(&snapshot, &spec, now);

    let report = MoodReport {
        period: spec.period.to_string(),
        mood_stats: metrics.mood_stats,
        top_reasons: metrics.top_reasons,
        top_tags: metrics.top_tags,
        weekly_evaluation: metrics.weekly_evaluation,
        insight_title: metrics.insight.map(|i| i.title),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Mood Report ({})", report.period);
    println!("=================");
    match &report.mood_stats {
        None => println!("No journal entries in this period"),
        Some(stats) => {
            println!("Entries:     {}", stats.entry_count);
            println!("Predominant: {}", stats.predominant_mood.as_str());
            println!("Mean:        {:.2}", stats.mean);
            println!("Std dev:     {:.3} ({:?})", stats.std_dev, stats.volatility_tier);
            println!("Positive:    {}", stats.positive_count);
            println!("Negative:    {}", stats.negative_count);
        }
    }
    if let Some(title) = &report.insight_title {
        println!("\nInsight: {}", title);
    }
    if !report.top_reasons.is_empty() {
        println!("\nTop reasons:");
        for reason in &report.top_reasons {
            println!("  - {} ({})", reason.label, reason.count);
        }
    }
    if !report.top_tags.is_empty() {
        println!("\nTop tags:");
        for tag in &report.top_tags {
            println!("  - {} ({})", tag.label, tag.count);
        }
    }
    if let Some(eval) = &report.weekly_evaluation {
        println!("\nLast 7 days: {} good, {} bad", eval.good_days, eval.bad_days);
        if let Some(reason) = &eval.top_reason {
            println!("Most frequent reason: {}", reason);
        }
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), InsightsCliError> {
    let snapshots = read_snapshots(input, &input_format)?;

    let mut total_records = 0;
    let mut errors: Vec<ValidationErrorDetail> = Vec::new();
    for (snapshot_index, snapshot) in snapshots.iter().enumerate() {
        total_records += snapshot.record_count();
        errors.extend(snapshot.validate().into_iter().map(|issue| ValidationErrorDetail {
            snapshot: snapshot_index,
            collection: issue.collection.to_string(),
            index: issue.index,
            record_id: issue.id,
            error: issue.error.to_string(),
        }));
    }

    let report = ValidationReport {
        total_snapshots: snapshots.len(),
        total_records,
        invalid_records: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Snapshots:       {}", report.total_snapshots);
        println!("Total records:   {}", report.total_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - {}[{}] {} (snapshot {}): {}",
                    err.collection,
                    err.index,
                    err.record_id.as_deref().unwrap_or("unknown"),
                    err.snapshot,
                    err.error
                );
            }
        }
    }

    if report.invalid_records > 0 {
        Err(InsightsCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), InsightsCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "insights_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Insights version {}", INSIGHTS_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_VERSION),
    });

    let config = match config_path {
        None => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: "No config file given, using defaults".to_string(),
            });
            Some(EngineConfig::default())
        }
        Some(path) if !path.exists() => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist, using defaults".to_string(),
            });
            Some(EngineConfig::default())
        }
        Some(path) => match fs::read_to_string(path)
            .map_err(InsightsCliError::from)
            .and_then(|content| EngineConfig::from_json(&content).map_err(InsightsCliError::from))
        {
            Ok(config) => {
                checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: "Config file valid".to_string(),
                });
                Some(config)
            }
            Err(e) => {
                checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid config: {}", CliError::from(e).message),
                });
                None
            }
        },
    };

    if let Some(config) = config {
        let tz_check = match config.tz() {
            Ok(tz) => {
                let offset = Utc::now().with_timezone(&tz).format("%:z");
                DoctorCheck {
                    name: "timezone".to_string(),
                    status: CheckStatus::Ok,
                    message: format!("Reference timezone {} (UTC{})", tz.name(), offset),
                }
            }
            Err(e) => DoctorCheck {
                name: "timezone".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        };
        checks.push(tz_check);
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
            message: "stdin is a pipe (use -i - to read snapshots)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: INSIGHTS_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Insights Doctor Report");
        println!("======================");
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

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(InsightsCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(json_schema: bool) -> Result<(), InsightsCliError> {
    if json_schema {
        println!("{}", get_input_json_schema());
        return Ok(());
    }

    println!("Input Schema: {}", SCHEMA_VERSION);
    println!();
    println!("A snapshot bundles all records of one user:");
    println!();
    println!("1. tasks - {{ id, status, created_at, completed_at? }}");
    println!("   - status: pending, in_progress, completed, paused, blocked, canceled, deferred");
    println!("   - only completed tasks count as micro-units");
    println!();
    println!("2. routines - {{ id, title, category, steps[], completed, updated_at? }}");
    println!("   - category: morning, afternoon, night (anything else is uncategorized)");
    println!("   - steps: {{ id, completed, completed_at? }}; a routine without steps is one slot");
    println!();
    println!("3. journal_entries - {{ id, date, mood, reasons[], tags[] }}");
    println!("   - mood: great (5), good (4), neutral (3), bad (2), terrible (1)");
    println!();
    println!("Period tokens: today/hoje, yesterday/ontem, week/semana, month/mes, all/sempre");

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, InsightsCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_snapshots(input: &Path, format: &InputFormat) -> Result<Vec<DataSnapshot>, InsightsCliError> {
    let data = read_input(input)?;
    let snapshots = match format {
        InputFormat::Json => vec![RecordAdapter::parse_snapshot(&data)?],
        InputFormat::Ndjson => RecordAdapter::parse_ndjson(&data)?,
    };
    Ok(snapshots)
}

fn write_output(output: &Path, data: &str) -> Result<(), InsightsCliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn load_config(engine: &EngineArgs) -> Result<EngineConfig, InsightsCliError> {
    let mut config = match &engine.config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    if let Some(tz) = &engine.timezone {
        config.timezone = tz.clone();
    }
    config.validate()?;
    Ok(config)
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>, InsightsCliError> {
    match now {
        None => Ok(Utc::now()),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| InsightsCliError::InvalidNow(format!("{s}: {e}"))),
    }
}

fn format_output(reports: &[MetricsReport], format: &OutputFormat) -> Result<String, InsightsCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for report in reports {
                lines.push(serde_json::to_string(report)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(reports)?),
        OutputFormat::JsonPretty => match reports {
            [single] => Ok(serde_json::to_string_pretty(single)? + "\n"),
            _ => Ok(serde_json::to_string_pretty(reports)? + "\n"),
        },
    }
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SCHEMA_VERSION,
        "description": "FocusPro data snapshot for one user",
        "type": "object",
        "properties": {
            "schema_version": { "type": "string", "const": SCHEMA_VERSION },
            "user_id": { "type": "string" },
            "tasks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "status", "created_at"],
                    "properties": {
                        "id": { "type": "string" },
                        "status": {
                            "type": "string",
                            "enum": ["pending", "in_progress", "completed", "paused", "blocked", "canceled", "deferred"]
                        },
                        "created_at": { "type": "string", "format": "date-time" },
                        "completed_at": { "type": "string", "format": "date-time" }
                    }
                }
            },
            "routines": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id"],
                    "properties": {
                        "id": { "type": "string" },
                        "title": { "type": "string" },
                        "category": { "type": "string" },
                        "completed": { "type": "boolean" },
                        "updated_at": { "type": "string", "format": "date-time" },
                        "steps": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["id"],
                                "properties": {
                                    "id": { "type": "string" },
                                    "completed": { "type": "boolean" },
                                    "completed_at": { "type": "string", "format": "date-time" }
                                }
                            }
                        }
                    }
                }
            },
            "journal_entries": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "date", "mood"],
                    "properties": {
                        "id": { "type": "string" },
                        "date": { "type": "string", "format": "date-time" },
                        "mood": { "type": "string", "enum": ["great", "good", "neutral", "bad", "terrible"] },
                        "reasons": { "type": "array", "items": { "type": "string" } },
                        "tags": { "type": "array", "items": { "type": "string" } }
                    }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum InsightsCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    InvalidNow(String),
    NoSnapshots,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for InsightsCliError {
    fn from(e: io::Error) -> Self {
        InsightsCliError::Io(e)
    }
}

impl From<ComputeError> for InsightsCliError {
    fn from(e: ComputeError) -> Self {
        InsightsCliError::Compute(e)
    }
}

impl From<serde_json::Error> for InsightsCliError {
    fn from(e: serde_json::Error) -> Self {
        InsightsCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<InsightsCliError> for CliError {
    fn from(e: InsightsCliError) -> Self {
        match e {
            InsightsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            InsightsCliError::Compute(e) => {
                let (code, hint) = match &e {
                    ComputeError::InvalidPeriod(_) => (
                        "INVALID_PERIOD",
                        "Use one of: today, yesterday, week, month, all",
                    ),
                    ComputeError::InvalidTimezone(_) => (
                        "INVALID_TIMEZONE",
                        "Use an IANA timezone name such as America/Sao_Paulo",
                    ),
                    ComputeError::InvalidRecord(_) => (
                        "VALIDATION_ERROR",
                        "Run 'insights validate' for details",
                    ),
                    ComputeError::InvalidConfig(_) => (
                        "CONFIG_ERROR",
                        "Run 'insights doctor --config <file>' for details",
                    ),
                    ComputeError::DataFetchFailed(_) | ComputeError::Superseded { .. } => (
                        "FETCH_ERROR",
                        "Retry once the data source is available",
                    ),
                    ComputeError::ParseError(_) | ComputeError::JsonError(_) => (
                        "PARSE_ERROR",
                        "Ensure input matches the focuspro.snapshot.v1 schema",
                    ),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            InsightsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            InsightsCliError::InvalidNow(msg) => CliError {
                code: "INVALID_NOW".to_string(),
                message: msg,
                hint: Some("Use an RFC 3339 timestamp, e.g. 2024-03-06T12:00:00-03:00".to_string()),
            },
            InsightsCliError::NoSnapshots => CliError {
                code: "NO_SNAPSHOTS".to_string(),
                message: "No snapshots found in input".to_string(),
                hint: Some("Ensure input file is not empty and --user matches".to_string()),
            },
            InsightsCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            InsightsCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct MoodReport {
    period: String,
    mood_stats: Option<focuspro_insights::types::MoodStats>,
    top_reasons: Vec<focuspro_insights::types::RankedLabel>,
    top_tags: Vec<focuspro_insights::types::RankedLabel>,
    weekly_evaluation: Option<focuspro_insights::types::WeeklyEvaluation>,
    insight_title: Option<String>,
}

#[derive(serde::Serialize)]
struct ValidationReport {
    total_snapshots: usize,
    total_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    snapshot: usize,
    collection: String,
    index: usize,
    record_id: Option<String>,
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
