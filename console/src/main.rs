mod config;
mod display;
mod poller;
mod session;

use clap::{Parser, Subcommand};
use config::ConsoleConfig;
use engine::{
    Admission, ComputeBackend, Dispatcher, HttpComputeClient, QuotaPolicy, TestRequestSpec,
    UnlockOutcome,
};
use poller::TelemetryPoller;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "perfdeck")]
#[command(about = "Terminal control panel for driving load against a compute endpoint")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Compute endpoint base URL (overrides the config file)
    #[arg(long)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single test request
    Single {
        /// Work units per request
        #[arg(short, long, default_value_t = 1_000_000)]
        intensity: u64,
        /// Per-request complexity multiplier
        #[arg(long, default_value_t = 1)]
        complexity: u32,
        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
        /// Unlock the quota ceilings before dispatching
        #[arg(long)]
        secret: Option<String>,
    },
    /// Fire a fixed-size burst of concurrent test requests
    Batch {
        /// Number of concurrent requests
        #[arg(short = 'n', long, default_value_t = 10)]
        count: u32,
        /// Work units per request
        #[arg(short, long, default_value_t = 1_000_000)]
        intensity: u64,
        /// Per-request complexity multiplier
        #[arg(long, default_value_t = 1)]
        complexity: u32,
        /// Print the raw results as JSON
        #[arg(long)]
        json: bool,
        /// Unlock the quota ceilings before dispatching
        #[arg(long)]
        secret: Option<String>,
    },
    /// Run continuous load, one request per second
    Stream {
        /// Stop after this many seconds (default: run until Ctrl-C)
        #[arg(short, long)]
        duration: Option<u64>,
        /// Work units per request
        #[arg(short, long, default_value_t = 500_000)]
        intensity: u64,
        /// Per-request complexity multiplier
        #[arg(long, default_value_t = 1)]
        complexity: u32,
        /// Unlock the quota ceilings before dispatching
        #[arg(long)]
        secret: Option<String>,
    },
    /// Show a system telemetry snapshot
    System {
        /// Keep polling and printing snapshots until Ctrl-C
        #[arg(short, long)]
        watch: bool,
    },
    /// Interactive console session
    Session,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut console_config = match &cli.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(endpoint) = cli.endpoint {
        console_config.endpoint.base_url = endpoint;
    }

    let client = HttpComputeClient::new(console_config.compute_config())?;
    info!("Using compute endpoint {}", client.base_url());

    let mut policy = QuotaPolicy::new(console_config.quota_config());
    let mut dispatcher = Dispatcher::new(client);

    match cli.command {
        Commands::Single {
            intensity,
            complexity,
            json,
            secret,
        } => {
            try_unlock(&mut policy, secret.as_deref());
            run_single_command(&dispatcher, &policy, intensity, complexity, json).await;
        }
        Commands::Batch {
            count,
            intensity,
            complexity,
            json,
            secret,
        } => {
            try_unlock(&mut policy, secret.as_deref());
            run_batch_command(&dispatcher, &policy, count, intensity, complexity, json).await;
        }
        Commands::Stream {
            duration,
            intensity,
            complexity,
            secret,
        } => {
            try_unlock(&mut policy, secret.as_deref());
            run_stream_command(&mut dispatcher, &policy, duration, intensity, complexity).await?;
        }
        Commands::System { watch } => {
            run_system_command(&dispatcher, console_config.poll_interval(), watch).await?;
        }
        Commands::Session => {
            session::run_session(&mut dispatcher, &mut policy, console_config.poll_interval())
                .await?;
        }
    }

    Ok(())
}

fn try_unlock(policy: &mut QuotaPolicy, secret: Option<&str>) {
    if let Some(secret) = secret {
        match policy.unlock(secret) {
            UnlockOutcome::Unlocked => println!("Quota ceilings unlocked."),
            UnlockOutcome::Rejected => println!("Wrong secret; ceilings still apply."),
        }
    }
}

async fn run_single_command<B: ComputeBackend + 'static>(
    dispatcher: &Dispatcher<B>,
    policy: &QuotaPolicy,
    intensity: u64,
    complexity: u32,
    json: bool,
) {
    if let Admission::Denied(reason) = policy.admit(1, intensity) {
        display::print_denial(&reason);
        return;
    }

    let spec = TestRequestSpec::new(intensity).with_complexity(complexity);
    match dispatcher.run_single(&spec).await {
        Ok(result) => {
            if json {
                match serde_json::to_string_pretty(&result) {
                    Ok(raw) => println!("{}", raw),
                    Err(e) => error!("Failed to render result: {}", e),
                }
            } else {
                display::print_result(&result);
                display::print_summary(&dispatcher.summary());
            }
        }
        Err(e) => error!("Single test failed: {}", e),
    }
}

async fn run_batch_command<B: ComputeBackend + 'static>(
    dispatcher: &Dispatcher<B>,
    policy: &QuotaPolicy,
    count: u32,
    intensity: u64,
    complexity: u32,
    json: bool,
) {
    if let Admission::Denied(reason) = policy.admit(count, intensity) {
        display::print_denial(&reason);
        return;
    }

    let spec = TestRequestSpec::new(intensity).with_complexity(complexity);
    match dispatcher.run_batch(count as usize, &spec).await {
        Ok(results) => {
            if json {
                match serde_json::to_string_pretty(&results) {
                    Ok(raw) => println!("{}", raw),
                    Err(e) => error!("Failed to render results: {}", e),
                }
            } else {
                for result in &results {
                    display::print_result(result);
                }
                display::print_summary(&dispatcher.summary());
            }
        }
        Err(e) => error!("Batch failed: {}", e),
    }
}

async fn run_stream_command<B: ComputeBackend + 'static>(
    dispatcher: &mut Dispatcher<B>,
    policy: &QuotaPolicy,
    duration: Option<u64>,
    intensity: u64,
    complexity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Admission::Denied(reason) = policy.admit(1, intensity) {
        display::print_denial(&reason);
        return Ok(());
    }

    let spec = TestRequestSpec::new(intensity).with_complexity(complexity);
    dispatcher.start_continuous(spec);
    println!("Continuous stream started; Ctrl-C stops it.");

    let deadline = duration.map(|secs| tokio::time::Instant::now() + Duration::from_secs(secs));
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                display::print_stream_stats(&dispatcher.stream_stats());
                if let Some(deadline) = deadline {
                    if tokio::time::Instant::now() >= deadline {
                        break;
                    }
                }
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                println!();
                break;
            }
        }
    }

    dispatcher.stop_continuous();
    display::print_stream_stats(&dispatcher.stream_stats());
    display::print_summary(&dispatcher.summary());

    Ok(())
}

async fn run_system_command<B: ComputeBackend + 'static>(
    dispatcher: &Dispatcher<B>,
    poll_interval: Duration,
    watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !watch {
        match dispatcher.backend().system_info().await {
            Ok(snapshot) => display::print_snapshot(&snapshot),
            Err(e) => warn!("Failed to fetch system info: {}", e),
        }
        return Ok(());
    }

    let poller = TelemetryPoller::start(dispatcher.backend(), poll_interval);
    let mut ticker = tokio::time::interval(poll_interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(snapshot) = poller.latest() {
                    display::print_snapshot(&snapshot);
                }
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                println!();
                break;
            }
        }
    }

    Ok(())
}
