use std::path::PathBuf;

use clap::Parser;
use tracing::{level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use url_prober::{
    config::{ConfigOverrides, ProbeConfig, read_config_file},
    runner::ProbeRun,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "url-prober")]
#[command(about = "Probe a list of URLs concurrently and log reachability and latency")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<String>,

    /// Newline-delimited list of URLs
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// File that results are appended to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Maximum number of probes in flight (default: all at once)
    #[arg(short = 'j', long)]
    max_concurrency: Option<usize>,

    /// Write indented JSON blocks instead of one record per line
    #[arg(long)]
    pretty: bool,

    /// Ignore blank lines in the URL list
    #[arg(long)]
    skip_blank: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let filter = filter::Targets::new().with_target("url_prober", level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

fn build_config(args: &Args) -> anyhow::Result<ProbeConfig> {
    let config = match &args.config {
        Some(path) => read_config_file(path)?,
        None => ProbeConfig::default(),
    };

    config.apply_overrides(&ConfigOverrides {
        input: args.input.clone(),
        output: args.output.clone(),
        timeout_secs: args.timeout,
        max_concurrency: args.max_concurrency,
        pretty: args.pretty,
        skip_blank_lines: args.skip_blank,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    let config = build_config(&args)?;
    trace!("effective config: {config:?}");

    ProbeRun::new(config).execute().await?;

    Ok(())
}
