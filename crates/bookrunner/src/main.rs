use anyhow::{Context, bail};
use bookrunner_engine::config::ConfigLoader;
use bookrunner_engine::request::{BookingRequest, BookingResponse};
use bookrunner_engine::runner::{BookingJob, JobStatus};
use bookrunner_h::HeadlessBackend;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod output;

#[derive(Parser)]
#[command(name = "bookrunner", version, about = "Book a class through the facility dashboard")]
struct Args {
    /// Booking request as a JSON file (camelCase fields, as in the response)
    #[arg(long, conflicts_with_all = ["email", "facility", "date", "time"])]
    request: Option<PathBuf>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long, env = "BOOKRUNNER_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Facility name as typed into the search box
    #[arg(long)]
    facility: Option<String>,

    /// Class date, YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,

    /// Class start time, H:MM or H:MM am/pm
    #[arg(long)]
    time: Option<String>,

    /// Per-strategy logging and screenshots in the response
    #[arg(long)]
    debug: bool,

    /// Launch browser in visible mode (not headless)
    #[arg(long)]
    visible: bool,

    /// Config file (defaults to ./bookrunner.yaml, then ~/.bookrunner/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print a step table instead of JSON
    #[arg(long)]
    pretty: bool,

    /// Seconds before reporting the booking as still running
    #[arg(long)]
    watchdog: Option<u64>,
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs never go to stdout, which carries the response.
    match &args.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn build_request(args: &Args) -> anyhow::Result<BookingRequest> {
    if let Some(path) = &args.request {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read request {}", path.display()))?;
        let mut request: BookingRequest =
            serde_json::from_str(&content).context("invalid request JSON")?;
        request.debug |= args.debug;
        return Ok(request);
    }

    let required = |value: &Option<String>, flag: &str| -> anyhow::Result<String> {
        match value {
            Some(v) => Ok(v.clone()),
            None => bail!("--{} is required without --request", flag),
        }
    };
    Ok(BookingRequest {
        email: required(&args.email, "email")?,
        password: required(&args.password, "password")?,
        facility_name: required(&args.facility, "facility")?,
        target_date: required(&args.date, "date")?,
        target_time: required(&args.time, "time")?,
        debug: args.debug,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_logging(&args)?;

    let mut config = ConfigLoader::load(args.config.as_deref())
        .await
        .context("failed to load configuration")?;
    if args.visible {
        config.browser.visible = true;
    }
    let request = build_request(&args)?;
    let bound = args
        .watchdog
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.timing.watchdog());

    let backend = HeadlessBackend::from_config(&config.browser);
    let job = BookingJob::spawn(backend, request, config);
    let response: BookingResponse = match job.wait(bound).await {
        JobStatus::Finished(response) => response,
        JobStatus::StillRunning(job) => {
            tracing::warn!(
                bound_secs = bound.as_secs(),
                "booking still running, waiting for it to finish"
            );
            eprintln!("Booking still running after {}s...", bound.as_secs());
            job.finish().await
        }
    };

    if args.pretty {
        println!("{}", output::pretty(&response));
    } else {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }

    Ok(if response.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
