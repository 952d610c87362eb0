//! Playreport - report playbook runs to an HTTP endpoint
//!
//! Reads lifecycle events as JSON lines (one `CallbackEvent` per line) from a
//! file or stdin and feeds them, in order, to a single reporter.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use playreport::callback::{BoxedCallback, CallbackEvent, ReporterCallback};
use playreport::config::ReporterConfig;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "playreport", version, about, long_about = None)]
struct Cli {
    /// Ini settings file (defaults to the standard search path)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Destination endpoint, overrides configuration
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Request timeout in seconds, overrides configuration
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Bearer token, overrides configuration
    #[arg(long, value_name = "TOKEN", hide_env_values = true, env = "PLAYREPORT_API_TOKEN")]
    api_token: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Event stream to read; stdin when omitted
    input: Option<PathBuf>,
}

impl Cli {
    /// Loads configuration and applies command-line overrides.
    fn reporter_config(&self) -> ReporterConfig {
        let mut config = ReporterConfig::load(self.config.as_deref()).unwrap_or_else(|e| {
            warn!("Failed to load reporter configuration: {}", e);
            ReporterConfig::default()
        });

        if let Some(ref url) = self.api_url {
            config = config.with_api_url(url.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout_secs(secs);
        }
        if let Some(ref token) = self.api_token {
            config = config.with_api_token(token.clone());
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = cli.reporter_config();
    let mut callback: BoxedCallback = Box::new(ReporterCallback::new(&config));

    let reader: Box<dyn BufRead> = match cli.input {
        Some(ref path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    // Raw bytes: invalid UTF-8 is just another malformed line.
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line.context("Failed to read event stream")?;
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_slice::<CallbackEvent>(line) {
            Ok(event) => {
                match event.host() {
                    Some(host) => debug!("Event {}: {} on {}", index + 1, event.event_type(), host),
                    None => debug!("Event {}: {}", index + 1, event.event_type()),
                }
                callback.on_event(&event);
            }
            Err(e) => warn!("Skipping malformed event on line {}: {}", index + 1, e),
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}
