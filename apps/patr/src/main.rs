//! # patr
//!
//! The command-line binary for the patr unification engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              apps/patr (THE BINARY)          │
//! │                                              │
//! │  ┌─────────────┐    ┌────────────────────┐   │
//! │  │    CLI      │    │  Problem documents │   │
//! │  │   (clap)    │    │  (serde_json)      │   │
//! │  └──────┬──────┘    └─────────┬──────────┘   │
//! │         └──────────┬──────────┘              │
//! │                    ▼                         │
//! │            ┌───────────────┐                 │
//! │            │   patr-core   │                 │
//! │            │  (THE LOGIC)  │                 │
//! │            └───────────────┘                 │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! patr eval -f problem.json
//! patr eval -f problem.json --json-mode --wildcards
//! patr check -f problem.json
//! ```

use clap::Parser;
use patr::cli;
use patr::config::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();
    let config = cli::load_config(&cli.config);

    // PATR_LOG_FORMAT wins over the config file.
    let log_format = std::env::var("PATR_LOG_FORMAT")
        .ok()
        .and_then(|name| LogFormat::from_name(&name))
        .or_else(|| config.as_ref().ok().map(|c| c.log.format))
        .unwrap_or_default();
    init_tracing(log_format, cli.verbose);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    match cli::execute(cli, &config) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(format: LogFormat, verbose: bool) {
    let default_filter = if verbose {
        "patr=debug,patr_core=debug"
    } else {
        "patr=info,patr_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so JSON results on stdout stay parseable.
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Print the patr startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐┌─┐┌┬┐┬─┐
  ├─┘├─┤ │ ├┬┘
  ┴  ┴ ┴ ┴ ┴└─

  Feature Structure Unification v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
