use agent_swarm::{
    init_telemetry, shutdown_telemetry, CompletionMode, ShutdownCoordinator, SimulationRunner,
    SwarmConfig,
};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agent-swarm")]
#[command(about = "Coordinate a pool of role-typed agents over a shared priority queue")]
struct Cli {
    /// Configuration file (defaults to ./agent-swarm.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the swarm simulation until interrupted or the tick limit is reached
    Run {
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
        /// Delay between ticks in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Seed for reproducible task and message generation
        #[arg(long)]
        seed: Option<u64>,
        /// Keep agents busy until the next tick instead of finishing instantly
        #[arg(long)]
        deferred: bool,
        /// Emit JSON log lines
        #[arg(long)]
        json: bool,
    },
    /// List the agents that join at startup
    Roster {
        /// Print the roster as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML, or write it to a file
    Config {
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<SwarmConfig> {
    SwarmConfig::load_env_file()?;
    match path {
        Some(path) => SwarmConfig::load_from(path),
        None => SwarmConfig::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command.unwrap_or(Commands::Run {
        ticks: None,
        interval_ms: None,
        seed: None,
        deferred: false,
        json: false,
    }) {
        Commands::Run {
            ticks,
            interval_ms,
            seed,
            deferred,
            json,
        } => {
            if ticks.is_some() {
                config.simulation.max_ticks = ticks;
            }
            if let Some(interval_ms) = interval_ms {
                config.simulation.tick_interval_ms = interval_ms;
            }
            if seed.is_some() {
                config.simulation.seed = seed;
            }
            if deferred {
                config.simulation.completion = CompletionMode::Deferred;
            }
            config.observability.json |= json;
            run_command(config).await
        }
        Commands::Roster { json } => roster_command(&config, json),
        Commands::Config { write } => config_command(&config, write),
    }
}

async fn run_command(config: SwarmConfig) -> Result<()> {
    config.validate()?;
    init_telemetry(&config.observability)?;

    let shutdown = ShutdownCoordinator::new();
    shutdown.listen_for_signals();

    let mut runner = SimulationRunner::from_config(&config);
    let summary = runner.run(shutdown.subscribe()).await;

    tracing::info!(
        ticks = summary.ticks,
        interrupted = summary.interrupted,
        "Swarm simulation exited"
    );
    shutdown_telemetry();
    Ok(())
}

fn roster_command(config: &SwarmConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&config.agents)?);
        return Ok(());
    }

    println!("Agents ({}):", config.agents.len());
    for agent in &config.agents {
        println!("  Agent {} ({})", agent.id, agent.role);
    }
    println!("Completion mode: {:?}", config.simulation.completion);
    Ok(())
}

fn config_command(config: &SwarmConfig, write: Option<PathBuf>) -> Result<()> {
    match write {
        Some(path) => {
            config.save_to_file(&path)?;
            println!("Wrote configuration to {}", path.display());
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}
