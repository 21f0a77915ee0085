use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tracing::info;

use hostpulse::config::{Config, load_config, load_config_from_path};
use hostpulse::logging::{LogFormat, init_tracing};
use hostpulse::server::{self, AppState};
use hostpulse::system::collector::Collector;

#[derive(Parser)]
#[command(
    name = "hostpulse",
    version,
    about = "Serve fresh host resource snapshots over HTTP"
)]
struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format: text, json
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP endpoint (default)
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<SocketAddr>,

        #[command(flatten)]
        sampling: SamplingArgs,
    },
    /// Capture one snapshot and print it as JSON
    Snapshot {
        /// Indent the JSON output
        #[arg(long, default_value_t = false)]
        pretty: bool,

        #[command(flatten)]
        sampling: SamplingArgs,
    },
}

#[derive(Args, Default)]
struct SamplingArgs {
    /// Number of processes to report, ranked by CPU
    #[arg(long)]
    top_n: Option<usize>,

    /// CPU sampling window in milliseconds
    #[arg(long)]
    cpu_interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let mut config = load_config_for_cli(&cli);

    let format: LogFormat = cli
        .log_format
        .as_deref()
        .unwrap_or(config.logging.format.as_str())
        .parse()?;
    init_tracing(&config.logging.level, format)?;

    match cli.command.unwrap_or(Command::Serve {
        bind: None,
        sampling: SamplingArgs::default(),
    }) {
        Command::Serve { bind, sampling } => {
            apply_sampling_overrides(&mut config, &sampling)?;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            run_server(config).await
        }
        Command::Snapshot { pretty, sampling } => {
            apply_sampling_overrides(&mut config, &sampling)?;
            print_snapshot(config, pretty).await
        }
    }
}

fn load_config_for_cli(cli: &Cli) -> Config {
    match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    }
}

fn apply_sampling_overrides(config: &mut Config, args: &SamplingArgs) -> Result<()> {
    if let Some(top_n) = args.top_n {
        config.sampling.top_n = top_n;
    }
    if let Some(ms) = args.cpu_interval_ms {
        config.sampling.cpu_interval_ms = ms;
    }
    if config.sampling.cpu_interval_ms == 0 {
        return Err(eyre!(
            "cpu interval must be greater than 0; a zero-length window always reads 0% busy"
        ));
    }
    if config.sampling.capture_timeout_ms == 0 {
        return Err(eyre!("capture_timeout_ms must be greater than 0"));
    }
    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    let collector = Collector::new(config.sampling.collector_config());
    info!(
        top_n = collector.config().top_n,
        cpu_interval_ms = collector.config().effective_cpu_interval().as_millis() as u64,
        "starting hostpulse {}",
        hostpulse::VERSION
    );
    let state = AppState::new(collector, config.sampling.capture_timeout());
    server::serve(config.server.bind, state).await?;
    Ok(())
}

async fn print_snapshot(config: Config, pretty: bool) -> Result<()> {
    let collector = Arc::new(Collector::new(config.sampling.collector_config()));
    let snapshot =
        server::capture_with_deadline(collector, config.sampling.capture_timeout()).await?;
    let json = if pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };
    println!("{json}");
    Ok(())
}
