use clap::{Parser, Subcommand};
use lit_pkp_harness::auth::load_wallet_from_env;
use lit_pkp_harness::config::{LitNetwork, LitNodeClientConfig};
use lit_pkp_harness::runner::{RunnerConfig, StepRunner};
use lit_pkp_harness::state::StateStore;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lit-pkp-harness", about = "End-to-end PKP lifecycle harness")]
struct Cli {
    /// Directory holding the persisted run state
    #[arg(long, env = "LIT_STATE_DIR", default_value = ".lit-pkp-harness")]
    state_dir: PathBuf,

    /// Override the chain RPC URL
    #[arg(long, env = "LIT_RPC_URL")]
    rpc_url: Option<String>,

    /// Lit network to run against
    #[arg(long, default_value = "datil-dev")]
    network: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full step sequence (default)
    Run {
        /// Discard any saved state before running
        #[arg(long)]
        fresh: bool,
    },
    /// Print the persisted state of the last run
    Status,
    /// Delete the persisted state
    Reset,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let lit_network = match LitNetwork::from_name(&cli.network) {
        Some(network) => network,
        None => {
            error!("Unknown network \"{}\"", cli.network);
            return ExitCode::FAILURE;
        }
    };

    let node_config = LitNodeClientConfig {
        lit_network,
        rpc_url: cli.rpc_url.clone(),
        ..Default::default()
    };
    let runner_config = RunnerConfig {
        node: node_config,
        wallet: load_wallet_from_env().ok(),
    };
    let store = StateStore::new(&cli.state_dir);

    match cli.command.unwrap_or(Command::Run { fresh: false }) {
        Command::Run { fresh } => {
            let mut runner = StepRunner::new(runner_config, store);
            if fresh {
                if let Err(e) = runner.reset() {
                    error!("Failed to clear state: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            if let Err(e) = runner.run_all().await {
                error!("Run failed: {}", e);
                return ExitCode::FAILURE;
            }
        }
        Command::Status => {
            let state = store.load();
            match serde_json::to_string_pretty(&state) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => {
                    error!("Failed to render state: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        Command::Reset => {
            if let Err(e) = store.clear() {
                error!("Failed to clear state: {}", e);
                return ExitCode::FAILURE;
            }
            println!("State cleared.");
        }
    }

    ExitCode::SUCCESS
}
