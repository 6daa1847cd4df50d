use crate::display;
use crate::poller::TelemetryPoller;
use engine::{
    Admission, ComputeBackend, Dispatcher, QuotaPolicy, TestRequestSpec, UnlockOutcome,
};
use std::io::{self, Write};
use std::time::Duration;
use tracing::error;

/// Intensity used when a session command omits it, matching the one-shot
/// command defaults.
pub const DEFAULT_SINGLE_INTENSITY: u64 = 1_000_000;
pub const DEFAULT_STREAM_INTENSITY: u64 = 500_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Single { intensity: Option<u64> },
    Batch { count: u32, intensity: Option<u64> },
    Start { intensity: Option<u64> },
    Stop,
    Stats,
    Results,
    System,
    Unlock { secret: String },
    Limits,
    Help,
    Quit,
}

impl SessionCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let keyword = parts.next().ok_or_else(|| "empty command".to_string())?;

        let command = match keyword {
            "single" => Self::Single {
                intensity: parse_optional(parts.next())?,
            },
            "batch" => {
                let count = parts
                    .next()
                    .ok_or_else(|| "usage: batch <count> [intensity]".to_string())?
                    .parse::<u32>()
                    .map_err(|_| "batch count must be a positive integer".to_string())?;
                Self::Batch {
                    count,
                    intensity: parse_optional(parts.next())?,
                }
            }
            "start" => Self::Start {
                intensity: parse_optional(parts.next())?,
            },
            "stop" => Self::Stop,
            "stats" => Self::Stats,
            "results" => Self::Results,
            "system" => Self::System,
            "unlock" => {
                let secret = parts
                    .next()
                    .ok_or_else(|| "usage: unlock <secret>".to_string())?;
                Self::Unlock {
                    secret: secret.to_string(),
                }
            }
            "limits" => Self::Limits,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command: {}", other)),
        };

        if parts.next().is_some() {
            return Err(format!("too many arguments for '{}'", keyword));
        }

        Ok(command)
    }
}

fn parse_optional(token: Option<&str>) -> Result<Option<u64>, String> {
    token
        .map(|t| {
            t.parse::<u64>()
                .map_err(|_| "intensity must be a positive integer".to_string())
        })
        .transpose()
}

/// Interactive session: the unit of unlock persistence. Reads commands from
/// stdin until `quit` or EOF.
pub async fn run_session<B: ComputeBackend + 'static>(
    dispatcher: &mut Dispatcher<B>,
    policy: &mut QuotaPolicy,
    poll_interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let poller = TelemetryPoller::start(dispatcher.backend(), poll_interval);

    println!("perfdeck session — 'help' lists commands, 'quit' leaves");
    print_limits(policy);

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        match SessionCommand::parse(line) {
            Ok(SessionCommand::Quit) => break,
            Ok(command) => execute(dispatcher, policy, &poller, command).await,
            Err(message) => println!("{}", message),
        }
    }

    if dispatcher.is_streaming() {
        dispatcher.stop_continuous();
    }

    Ok(())
}

async fn execute<B: ComputeBackend + 'static>(
    dispatcher: &mut Dispatcher<B>,
    policy: &mut QuotaPolicy,
    poller: &TelemetryPoller,
    command: SessionCommand,
) {
    match command {
        SessionCommand::Single { intensity } => {
            let intensity = intensity.unwrap_or(DEFAULT_SINGLE_INTENSITY);
            match policy.admit(1, intensity) {
                Admission::Denied(reason) => display::print_denial(&reason),
                Admission::Admitted => {
                    match dispatcher.run_single(&TestRequestSpec::new(intensity)).await {
                        Ok(result) => {
                            display::print_result(&result);
                            display::print_summary(&dispatcher.summary());
                        }
                        Err(e) => error!("Single test failed: {}", e),
                    }
                }
            }
        }
        SessionCommand::Batch { count, intensity } => {
            let intensity = intensity.unwrap_or(DEFAULT_SINGLE_INTENSITY);
            match policy.admit(count, intensity) {
                Admission::Denied(reason) => display::print_denial(&reason),
                Admission::Admitted => {
                    let spec = TestRequestSpec::new(intensity);
                    match dispatcher.run_batch(count as usize, &spec).await {
                        Ok(results) => {
                            for result in &results {
                                display::print_result(result);
                            }
                            display::print_summary(&dispatcher.summary());
                        }
                        Err(e) => error!("Batch failed: {}", e),
                    }
                }
            }
        }
        SessionCommand::Start { intensity } => {
            let intensity = intensity.unwrap_or(DEFAULT_STREAM_INTENSITY);
            match policy.admit(1, intensity) {
                Admission::Denied(reason) => display::print_denial(&reason),
                Admission::Admitted => {
                    dispatcher.start_continuous(TestRequestSpec::new(intensity));
                    println!("Continuous stream started; 'stats' shows progress.");
                }
            }
        }
        SessionCommand::Stop => {
            dispatcher.stop_continuous();
            display::print_stream_stats(&dispatcher.stream_stats());
        }
        SessionCommand::Stats => {
            display::print_stream_stats(&dispatcher.stream_stats());
            display::print_summary(&dispatcher.summary());
        }
        SessionCommand::Results => {
            let recent = dispatcher.recent_results(10);
            if recent.is_empty() {
                println!("No results yet.");
            }
            for result in &recent {
                display::print_result(result);
            }
        }
        SessionCommand::System => match poller.latest() {
            Some(snapshot) => display::print_snapshot(&snapshot),
            None => println!("No telemetry snapshot yet."),
        },
        SessionCommand::Unlock { secret } => match policy.unlock(&secret) {
            UnlockOutcome::Unlocked => {
                println!("Ceilings unlocked for the rest of this session.")
            }
            UnlockOutcome::Rejected => println!("Wrong secret; ceilings unchanged."),
        },
        SessionCommand::Limits => print_limits(policy),
        SessionCommand::Help => print_help(),
        SessionCommand::Quit => unreachable!("quit is handled by the loop"),
    }
}

fn print_limits(policy: &QuotaPolicy) {
    if policy.is_unlocked() {
        println!("Ceilings unlocked for this session.");
    } else {
        println!(
            "Ceilings: {} concurrent requests, intensity {} (unlock to exceed).",
            policy.max_concurrency(),
            policy.max_intensity()
        );
    }
}

fn print_help() {
    println!("Commands:");
    println!("  single [intensity]      run one test request");
    println!("  batch <n> [intensity]   run n concurrent test requests");
    println!("  start [intensity]       start continuous testing (1 req/s)");
    println!("  stop                    stop continuous testing");
    println!("  stats                   stream counters and result summary");
    println!("  results                 ten most recent results");
    println!("  system                  latest telemetry snapshot");
    println!("  unlock <secret>         lift the quota ceilings");
    println!("  limits                  show the quota ceilings");
    println!("  quit                    leave the session");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single() {
        assert_eq!(
            SessionCommand::parse("single"),
            Ok(SessionCommand::Single { intensity: None })
        );
        assert_eq!(
            SessionCommand::parse("single 500000"),
            Ok(SessionCommand::Single {
                intensity: Some(500_000)
            })
        );
        assert!(SessionCommand::parse("single lots").is_err());
    }

    #[test]
    fn test_parse_batch() {
        assert_eq!(
            SessionCommand::parse("batch 10"),
            Ok(SessionCommand::Batch {
                count: 10,
                intensity: None
            })
        );
        assert_eq!(
            SessionCommand::parse("batch 4 1000"),
            Ok(SessionCommand::Batch {
                count: 4,
                intensity: Some(1000)
            })
        );
        assert!(SessionCommand::parse("batch").is_err());
        assert!(SessionCommand::parse("batch ten").is_err());
    }

    #[test]
    fn test_parse_stream_controls() {
        assert_eq!(
            SessionCommand::parse("start"),
            Ok(SessionCommand::Start { intensity: None })
        );
        assert_eq!(SessionCommand::parse("stop"), Ok(SessionCommand::Stop));
        assert_eq!(SessionCommand::parse("stats"), Ok(SessionCommand::Stats));
    }

    #[test]
    fn test_parse_unlock() {
        assert_eq!(
            SessionCommand::parse("unlock open-sesame"),
            Ok(SessionCommand::Unlock {
                secret: "open-sesame".to_string()
            })
        );
        assert!(SessionCommand::parse("unlock").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_and_trailing() {
        assert!(SessionCommand::parse("launch").is_err());
        assert!(SessionCommand::parse("stop now").is_err());
        assert!(SessionCommand::parse("").is_err());
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(SessionCommand::parse("quit"), Ok(SessionCommand::Quit));
        assert_eq!(SessionCommand::parse("exit"), Ok(SessionCommand::Quit));
        assert_eq!(SessionCommand::parse("?"), Ok(SessionCommand::Help));
    }
}
