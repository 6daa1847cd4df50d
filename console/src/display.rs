use engine::{DenialReason, ResultSummary, StreamStats, SystemSnapshot, TestResult};

pub fn print_result(result: &TestResult) {
    println!(
        "  {}  {:>10} units  {:>9.2} ms  cpu {:.2}/{:.2} ms",
        result.timestamp.format("%H:%M:%S"),
        result.intensity,
        result.execution_time_ms,
        result.cpu_usage.user,
        result.cpu_usage.system
    );
}

pub fn print_summary(summary: &ResultSummary) {
    println!(
        "Total tests: {}  |  avg execution: {:.2} ms  |  avg cpu: {:.2} ms",
        summary.count, summary.mean_execution_ms, summary.mean_cpu_ms
    );
}

pub fn print_stream_stats(stats: &StreamStats) {
    let state = if stats.running { "running" } else { "stopped" };
    println!(
        "Stream {}  |  requests: {}  |  rate: {:.2} req/s",
        state, stats.request_count, stats.current_rps
    );
}

pub fn print_denial(reason: &DenialReason) {
    match reason {
        DenialReason::Concurrency { requested, limit } => {
            println!(
                "Denied: {} concurrent requests exceeds the ceiling of {}.",
                requested, limit
            );
        }
        DenialReason::Intensity { requested, limit } => {
            println!(
                "Denied: intensity {} exceeds the ceiling of {}.",
                requested, limit
            );
        }
    }
    println!("Enter the unlock secret to lift the ceilings for this session.");
}

pub fn print_snapshot(snapshot: &SystemSnapshot) {
    println!(
        "{} ({} {}, node {})",
        snapshot.hostname, snapshot.platform, snapshot.arch, snapshot.node_version
    );
    println!(
        "  CPU: {} x {}",
        snapshot.cpu.cpu_count, snapshot.cpu.cpu_model
    );
    if let Some(utilization) = &snapshot.cpu.cpu_utilization {
        println!("  Utilization: {}%", utilization);
    }
    if let (Some(one), Some(five), Some(ten)) = (
        snapshot.cpu.load_average1min,
        snapshot.cpu.load_average5min,
        snapshot.cpu.load_average10min,
    ) {
        println!("  Load avg: {:.2} / {:.2} / {:.2}", one, five, ten);
    }
    println!(
        "  Memory: {:.2} / {:.2} GB ({}%)",
        snapshot.memory.used_gb(),
        snapshot.memory.total_gb(),
        snapshot.memory.usage_percent
    );
}
