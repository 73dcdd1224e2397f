//! multiping - concurrent ICMP echo over raw sockets.
//!
//! This is the command-line interface for the multiping library.

#![allow(clippy::uninlined_format_args)]

use anyhow::{bail, Result};
use clap::Parser;
use multiping::config::timing::{self, TimingConfig};
use multiping::report::{self, DEFAULT_VERBOSE_TIMEOUT};
use multiping::{PingConfig, PingError, PingResults, Session};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Get the version string for multiping
fn get_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(env!("CARGO_PKG_VERSION"), "-UNRELEASED")
    } else {
        env!("CARGO_PKG_VERSION")
    }
}

/// Command-line arguments for the ping tool.
#[derive(Parser, Debug)]
#[clap(author, version = get_version(), about = "Ping many hosts at once over raw ICMP sockets", long_about = None)]
struct Args {
    /// Hostnames or IPv4 addresses to ping
    #[clap(required = true)]
    hosts: Vec<String>,

    /// Timeout for individual probes in milliseconds [default: 1000, or 2000 with --count]
    #[clap(long)]
    timeout_ms: Option<u64>,

    /// Maximum number of hosts probed concurrently
    #[clap(long, default_value_t = timing::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Upper bound on a single readiness wait in milliseconds
    #[clap(long, default_value_t = timing::DEFAULT_MAIN_LOOP_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,

    /// Ping each host COUNT times one after another and print a line per attempt
    #[clap(short = 'c', long)]
    count: Option<usize>,

    /// Treat socket errors on a single host as unreachable instead of aborting
    #[clap(long)]
    ignore_errors: bool,

    /// Output results in JSON format
    #[clap(long)]
    json: bool,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// JSON output structure for a single host
#[derive(Debug, serde::Serialize)]
struct JsonHost {
    host: String,
    reachable: bool,
    rtt_ms: Option<f64>,
}

/// JSON output structure for the whole session
#[derive(Debug, serde::Serialize)]
struct JsonOutput {
    version: String,
    timeout_ms: u64,
    batch_size: usize,
    hosts: Vec<JsonHost>,
    reachable: usize,
    unreachable: usize,
    average_rtt_ms: Option<f64>,
}

impl Args {
    /// Per-probe timeout, defaulting by mode when not given
    fn timeout(&self) -> Duration {
        match (self.timeout_ms, self.count) {
            (Some(ms), _) => Duration::from_millis(ms),
            (None, Some(_)) => DEFAULT_VERBOSE_TIMEOUT,
            (None, None) => Duration::from_millis(timing::DEFAULT_PROBE_TIMEOUT_MS),
        }
    }
}

fn main() {
    if let Err(e) = run() {
        if let Some(PingError::InsufficientPermissions {
            required,
            suggestion,
        }) = e.downcast_ref::<PingError>()
        {
            eprintln!("Error: Insufficient permissions");
            eprintln!("Required: {}", required);
            eprintln!("Suggestion: {}", suggestion);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Validate arguments
    if args.timeout_ms == Some(0) {
        bail!("timeout-ms must be greater than 0");
    }
    if args.batch_size == 0 {
        bail!("batch-size must be at least 1");
    }
    if args.poll_interval_ms == 0 {
        bail!("poll-interval-ms must be greater than 0");
    }
    if args.count == Some(0) {
        bail!("count must be at least 1");
    }

    let timeout = args.timeout();
    if timing::set_config(TimingConfig {
        probe_timeout: timeout,
        main_loop_poll_interval: Duration::from_millis(args.poll_interval_ms),
    })
    .is_err()
    {
        tracing::warn!("timing configuration already set, keeping existing values");
    }

    if let Some(count) = args.count {
        return run_verbose(&args.hosts, timeout, count);
    }

    let config = PingConfig::builder()
        .batch_size(args.batch_size)
        .ignore_errors(args.ignore_errors)
        .build()?;
    let results = Session::new(config)?.run(&args.hosts)?;

    if args.json {
        display_json_results(&args, &results)?;
    } else {
        display_text_results(&args.hosts, &results);
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_verbose(hosts: &[String], timeout: Duration, count: usize) -> Result<()> {
    for host in hosts {
        for line in report::verbose_ping_lines(host, timeout, count)? {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Hosts in the order given on the command line, each listed once
fn ordered_hosts(hosts: &[String]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    hosts
        .iter()
        .map(String::as_str)
        .filter(|host| seen.insert(*host))
        .collect()
}

fn display_text_results(hosts: &[String], results: &PingResults) {
    for host in ordered_hosts(hosts) {
        match results.get(host).flatten() {
            Some(rtt) => println!("{} = {:.3} ms", host, rtt.as_secs_f64() * 1000.0),
            None => println!("{} = unreachable", host),
        }
    }
}

fn display_json_results(args: &Args, results: &PingResults) -> Result<()> {
    let to_ms = |rtt: Duration| rtt.as_secs_f64() * 1000.0;
    let hosts = ordered_hosts(&args.hosts)
        .into_iter()
        .map(|host| {
            let rtt = results.get(host).flatten();
            JsonHost {
                host: host.to_string(),
                reachable: rtt.is_some(),
                rtt_ms: rtt.map(to_ms),
            }
        })
        .collect();

    let output = JsonOutput {
        version: get_version().to_string(),
        timeout_ms: args.timeout().as_millis() as u64,
        batch_size: args.batch_size,
        hosts,
        reachable: results.reachable().len(),
        unreachable: results.unreachable().len(),
        average_rtt_ms: results.average_rtt().map(to_ms),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
