//! 🚀 wcx-cli: the front door, the bouncer, the maitre d' of wcx.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 This binary crate is the thin CLI wrapper that loads config, sets up logging,
//! wires Ctrl-C to the big red button, and then lets the library do the heavy lifting.
//! Like a manager. 🦆
//!
//! stdout gets the answer. stderr gets everything else: logs, the spinner, the
//! error report. Pipe accordingly.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wcx::{CancelHandle, RunReport};

/// 🕷️ Crawl the job list, count the words in the word bank, print the top HEAD.
#[derive(Debug, Parser)]
#[command(name = "wcx-cli", version, about)]
struct Cli {
    /// 🔧 TOML config file. Environment variables (WCX_*) are read either way.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 📡 Log filter when RUST_LOG is not set, e.g. `info` or `wcx=debug`.
    #[arg(short, long, default_value = "info")]
    level: String,

    /// 📋 How to print the result on stdout.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// 🏆 How many words to report. Overrides `top_k` from the config.
    head: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// word → count as a JSON object
    Json,
    /// rank / word / count as a table
    Table,
}

/// 🚀 main(): where it all begins.
///
/// 🔧 Steps:
/// 1. Parse args, init tracing (so we can see what goes wrong, and when)
/// 2. Load config, let HEAD override top_k, validate
/// 3. Wire SIGINT / SIGTERM to cancellation
/// 4. Run the crawl, print the result, print the error report if there is one
/// 5. On a fatal error, print the whole cause chain and exit 1
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 📡 RUST_LOG wins when it's set, otherwise --level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = crawl(&cli).await {
        error!("💀 error: {}", err);
        // -- 🧅 peel the onion of sadness, one layer at a time
        let mut the_vibes_are_giving_connection_issues = false;
        for cause in err.chain().skip(1) {
            error!("⚠️  cause: {}", cause);
            let cause_str = cause.to_string();
            if cause_str.contains("error sending request")
                || cause_str.contains("connection refused")
                || cause_str.contains("Connection refused")
                || cause_str.contains("tcp connect error")
                || cause_str.contains("dns error")
            {
                the_vibes_are_giving_connection_issues = true;
            }
        }

        // -- 📡 if it smells like a connection problem, it's probably a connection problem
        if the_vibes_are_giving_connection_issues {
            error!(
                "🔧 hint: the word bank or the job list isn't reachable. \
                Check the URL, check your network, or point word_bank_source / job_list_source \
                at a local file instead. ☕"
            );
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn crawl(cli: &Cli) -> Result<()> {
    let mut app_config = wcx::load_config(cli.config.as_deref())
        .context("💀 In wcx-cli we couldn't load the config. Check the file, check the WCX_* variables.")?;
    if let Some(head) = cli.head {
        app_config.top_k = head;
        app_config.validate().context("💀 HEAD has to be a positive number")?;
    }

    let (button, cancel) = wcx::cancellation();
    tokio::spawn(cancel_on_signal(button));

    let report = wcx::run(app_config, cancel).await?;

    match cli.format {
        OutputFormat::Json => println!("{}", report.top_k_json()?),
        OutputFormat::Table => println!("{}", podium_table(&report)),
    }
    if !report.errors.is_empty() {
        eprintln!("errored jobs:");
        eprintln!("{}", report.errors.to_json()?);
    }
    if report.cancelled {
        warn!("🛑 results are partial, the crawl was cancelled");
    }
    Ok(())
}

/// 🔴 Press the big red button on the first SIGINT or SIGTERM. Once is enough.
async fn cancel_on_signal(button: CancelHandle) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("⚠️ could not listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                warn!("⚠️ could not listen for Ctrl-C: {}", err);
                return;
            }
        }
        _ = terminate => {}
    }
    info!("🛑 cancelled by user");
    button.cancel();
}

fn podium_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "word", "count"]);
    for (rank, entry) in report.top_k.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1).set_alignment(CellAlignment::Right),
            Cell::new(&entry.word),
            Cell::new(entry.count).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
