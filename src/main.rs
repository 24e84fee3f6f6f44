//! Entry point: argument parsing, address resolution, request construction,
//! and result emission — the glue layer around the core connection engine.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use swarm::{cli::Cli, request, resolve, swarm as orchestrator};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let nthreads = cli.nthreads().context("invalid thread count")?;

    let addr = resolve::resolve(&cli.host, cli.port)?;

    let request = request::build(&cli.host, cli.port, &cli.url);

    let results = orchestrator::run(addr, cli.nactive, cli.nidle, nthreads, request);

    for worker_results in &results {
        for result in worker_results {
            println!("{} {}", result.ttc, result.ttfb);
        }
    }

    Ok(())
}
