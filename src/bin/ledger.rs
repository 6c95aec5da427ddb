//! Ledger CLI - Command-line interface for the activity ledger
//!
//! Commands:
//! - record: Add one day's activity to a ledger file
//! - ingest: Add a batch of activity events (NDJSON or JSON array)
//! - summary: Print aggregate statistics for a ledger file
//! - report: Print the full report for a stored profile
//! - bmi: Compute BMI from height and weight
//! - age: Compute age from a birth date
//! - doctor: Diagnose ledger files and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use activity_ledger::encoder::{summarize, ProfileEncoder};
use activity_ledger::event::{self, ActivityEvent};
use activity_ledger::metrics::{self, BmiReport};
use activity_ledger::{ActivityLedger, DayKey, LedgerError, PersonProfile, LEDGER_VERSION, PRODUCER_NAME};

/// Ledger - per-person daily activity accounting
#[derive(Parser)]
#[command(name = "ledger")]
#[command(version = LEDGER_VERSION)]
#[command(about = "Record daily steps and calories and derive activity statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one day's activity to a ledger file
    Record {
        /// Ledger file (created if missing)
        #[arg(short, long, env = "LEDGER_FILE")]
        ledger: PathBuf,

        /// Day to record (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        day: Option<String>,

        /// Steps walked
        #[arg(short, long, allow_negative_numbers = true)]
        steps: i64,

        /// Calories burned
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        calories: i64,
    },

    /// Add a batch of activity events to a ledger file (all or nothing)
    Ingest {
        /// Ledger file (created if missing)
        #[arg(short, long, env = "LEDGER_FILE")]
        ledger: PathBuf,

        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,
    },

    /// Print aggregate statistics for a ledger file
    Summary {
        /// Ledger file
        #[arg(short, long, env = "LEDGER_FILE")]
        ledger: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the full report for a stored profile
    Report {
        /// Profile JSON file
        #[arg(short, long)]
        profile: PathBuf,
    },

    /// Compute BMI from height (in) and weight (lb)
    Bmi {
        /// Height in inches
        #[arg(long, allow_negative_numbers = true)]
        height: f64,

        /// Weight in pounds
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,
    },

    /// Compute age in whole years from a birth date
    Age {
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        dob: String,

        /// Reference date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        today: Option<String>,
    },

    /// Diagnose ledger files and environment
    Doctor {
        /// Ledger file to check
        #[arg(short, long, env = "LEDGER_FILE")]
        ledger: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

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

fn run(cli: Cli) -> Result<(), LedgerCliError> {
    match cli.command {
        Commands::Record {
            ledger,
            day,
            steps,
            calories,
        } => cmd_record(&ledger, day, steps, calories),

        Commands::Ingest {
            ledger,
            input,
            input_format,
        } => cmd_ingest(&ledger, &input, input_format),

        Commands::Summary { ledger, json } => cmd_summary(&ledger, json),

        Commands::Report { profile } => cmd_report(&profile),

        Commands::Bmi { height, weight } => cmd_bmi(height, weight),

        Commands::Age { dob, today } => cmd_age(&dob, today.as_deref()),

        Commands::Doctor { ledger, json } => cmd_doctor(ledger.as_deref(), json),
    }
}

fn load_ledger(path: &Path) -> Result<ActivityLedger, LedgerCliError> {
    if !path.exists() {
        log::info!("{} does not exist, starting an empty ledger", path.display());
        return Ok(ActivityLedger::new());
    }
    let json = fs::read_to_string(path)?;
    Ok(ActivityLedger::from_json(&json)?)
}

/// Replace the ledger file atomically: write a sibling temp file, sync it,
/// then rename it over the original.
fn save_ledger(path: &Path, ledger: &ActivityLedger) -> Result<(), LedgerCliError> {
    let json = ledger.to_json()?;
    let tmp = temp_path(path);

    let mut file = fs::File::create(&tmp)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    drop(file);

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    log::debug!(
        "saved {} day(s) to {}",
        ledger.active_day_count(),
        path.display()
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn cmd_record(
    path: &Path,
    day: Option<String>,
    steps: i64,
    calories: i64,
) -> Result<(), LedgerCliError> {
    let day = day.unwrap_or_else(|| DayKey::today().to_string());
    let mut ledger = load_ledger(path)?;

    let event = ActivityEvent::new(day, steps, calories);
    ledger.record_event(&event)?;
    save_ledger(path, &ledger)?;

    log::info!(
        "recorded {} steps / {} kcal on {} ({} active day(s))",
        event.steps,
        event.calories,
        event.day,
        ledger.active_day_count()
    );
    Ok(())
}

fn cmd_ingest(
    path: &Path,
    input: &Path,
    input_format: InputFormat,
) -> Result<(), LedgerCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            log::warn!("reading events from a terminal; finish with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let events = match input_format {
        InputFormat::Ndjson => event::parse_ndjson(&input_data)?,
        InputFormat::Json => event::parse_array(&input_data)?,
    };

    if events.is_empty() {
        return Err(LedgerCliError::NoEvents);
    }

    let mut ledger = load_ledger(path)?;
    let applied = ledger.record_all(&events)?;
    save_ledger(path, &ledger)?;

    log::info!(
        "ingested {} event(s) ({} active day(s))",
        applied,
        ledger.active_day_count()
    );
    Ok(())
}

fn cmd_summary(path: &Path, json: bool) -> Result<(), LedgerCliError> {
    if !path.exists() {
        return Err(LedgerCliError::MissingLedger(path.to_path_buf()));
    }
    let ledger = load_ledger(path)?;
    let summary = summarize(&ledger);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Activity Summary");
    println!("================");
    println!("Active days:    {}", summary.active_days);
    match summary.average_steps {
        Some(avg) => println!("Average steps:  {}", avg),
        None => println!("Average steps:  n/a (no activity recorded)"),
    }
    println!("Total steps:    {}", summary.total_steps);
    println!("Total calories: {}", summary.total_calories);

    if !ledger.is_empty() {
        println!("\nDays:");
        for (day, stats) in &ledger {
            println!("  {}  {:>8} steps  {:>6} kcal", day, stats.steps, stats.calories);
        }
    }

    Ok(())
}

fn cmd_report(path: &Path) -> Result<(), LedgerCliError> {
    let json = fs::read_to_string(path)?;
    let profile: PersonProfile = serde_json::from_str(&json)?;
    println!("{}", ProfileEncoder::new().encode_to_json(&profile)?);
    Ok(())
}

fn cmd_bmi(height: f64, weight: f64) -> Result<(), LedgerCliError> {
    let report = BmiReport::from_measurements(height, weight)?;
    println!("{}", report.to_json()?);
    Ok(())
}

fn cmd_age(dob: &str, today: Option<&str>) -> Result<(), LedgerCliError> {
    let birth: DayKey = dob.parse()?;
    let today = match today {
        Some(t) => t.parse::<DayKey>()?,
        None => DayKey::today(),
    };

    match metrics::age(Some(birth.date()), today.date()) {
        Some(years) => println!("{}", years),
        None => {
            log::warn!("birth date {} is after {}", birth, today);
            println!("unknown");
        }
    }
    Ok(())
}

fn cmd_doctor(ledger: Option<&Path>, json: bool) -> Result<(), LedgerCliError> {
    let mut checks = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} {}", PRODUCER_NAME, LEDGER_VERSION),
    });

    if let Some(path) = ledger {
        let check = match fs::read_to_string(path) {
            Ok(content) => match ActivityLedger::from_json(&content) {
                Ok(ledger) => DoctorCheck {
                    name: "ledger".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "{} day(s) recorded, {} total steps",
                        ledger.active_day_count(),
                        ledger.total_steps()
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "ledger".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid ledger file: {}", e),
                },
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => DoctorCheck {
                name: "ledger".to_string(),
                status: CheckStatus::Warning,
                message: format!("{} does not exist yet", path.display()),
            },
            Err(e) => DoctorCheck {
                name: "ledger".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read ledger file: {}", e),
            },
        };
        checks.push(check);
    }

    checks.push(stdin_check(atty::is(atty::Stream::Stdin)));

    let failed = checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: LEDGER_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Ledger Doctor");
        println!("=============");
        for check in &report.checks {
            let marker = match check.status {
                CheckStatus::Ok => "ok",
                CheckStatus::Warning => "warn",
                CheckStatus::Error => "FAIL",
            };
            println!("[{:>4}] {}: {}", marker, check.name, check.message);
        }
    }

    if failed {
        return Err(LedgerCliError::DoctorFailed);
    }
    Ok(())
}

fn stdin_check(interactive: bool) -> DoctorCheck {
    if interactive {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Warning,
            message: "Interactive terminal; 'ingest --input -' will wait for Ctrl-D".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "Piped input available for ingest".to_string(),
        }
    }
}

// Error handling

#[derive(Debug)]
enum LedgerCliError {
    Io(io::Error),
    Ledger(LedgerError),
    Json(serde_json::Error),
    MissingLedger(PathBuf),
    NoEvents,
    DoctorFailed,
}

impl From<io::Error> for LedgerCliError {
    fn from(e: io::Error) -> Self {
        LedgerCliError::Io(e)
    }
}

impl From<LedgerError> for LedgerCliError {
    fn from(e: LedgerError) -> Self {
        LedgerCliError::Ledger(e)
    }
}

impl From<serde_json::Error> for LedgerCliError {
    fn from(e: serde_json::Error) -> Self {
        LedgerCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LedgerCliError> for CliError {
    fn from(e: LedgerCliError) -> Self {
        match e {
            LedgerCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            LedgerCliError::Ledger(e) => {
                let (code, hint) = match &e {
                    LedgerError::InvalidInput(_) => {
                        ("INVALID_INPUT", "Steps and calories must be non-negative")
                    }
                    LedgerError::InvalidDayKey(_) => ("INVALID_DAY", "Use YYYY-MM-DD dates"),
                    LedgerError::EmptyLedger => ("EMPTY_LEDGER", "Record some activity first"),
                    LedgerError::DegenerateMeasurement(_) => (
                        "DEGENERATE_MEASUREMENT",
                        "Height must be positive (inches); weight non-negative (pounds)",
                    ),
                    LedgerError::ParseError(_) | LedgerError::JsonError(_) => {
                        ("PARSE_ERROR", "Ensure input is one activity event per line")
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            LedgerCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            LedgerCliError::MissingLedger(path) => CliError {
                code: "MISSING_LEDGER".to_string(),
                message: format!("{} does not exist", path.display()),
                hint: Some("Record activity with 'ledger record' first".to_string()),
            },
            LedgerCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "No events found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            LedgerCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

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

#[derive(Debug, serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ledger-cli-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_save_ledger_replaces_file() {
        let dir = scratch_dir();
        let path = dir.join("ledger.json");
        fs::write(&path, "stale").unwrap();

        let mut ledger = ActivityLedger::new();
        ledger.record("2022-11-13".parse().unwrap(), 8000, 2200);
        save_ledger(&path, &ledger).unwrap();

        assert_eq!(load_ledger(&path).unwrap(), ledger);
        assert!(!temp_path(&path).exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_ledger_leaves_original_on_failure() {
        let dir = scratch_dir();
        // Renaming a file over a non-empty directory fails
        let path = dir.join("occupied");
        fs::create_dir_all(path.join("child")).unwrap();

        let ledger = ActivityLedger::new();
        assert!(save_ledger(&path, &ledger).is_err());
        assert!(path.join("child").is_dir());
        assert!(!temp_path(&path).exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_stdin_check_warns_on_terminal() {
        assert!(matches!(stdin_check(true).status, CheckStatus::Warning));
        assert!(matches!(stdin_check(false).status, CheckStatus::Ok));
    }
}
