//! Command-line front end for the staking workflow.
//!
//! Talks to the staking API over HTTP and to a local JSON-RPC wallet
//! (e.g. Frame). Progress is printed as the workflow reports it; the final
//! state is printed when the command finishes.

use clap::{Parser, Subcommand};
use stakeflow_api::{ApiConfig, StakingApiClient};
use stakeflow_ops::{StakingWorkflow, WorkflowConfig, WorkflowEvent, WorkflowState};
use stakeflow_types::HOODI_CHAIN_ID;
use stakeflow_wallet::{RpcWallet, WalletConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stakeflow")]
#[command(about = "Stake through a custodial staking API and a local wallet", long_about = None)]
struct Cli {
    /// Staking API base URL
    #[arg(long, env = "STAKEFLOW_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Wallet JSON-RPC endpoint
    #[arg(long, env = "STAKEFLOW_WALLET_RPC", default_value = "http://127.0.0.1:1248")]
    wallet_rpc: String,

    /// Chain the wallet must be on
    #[arg(long, env = "STAKEFLOW_CHAIN_ID", default_value_t = HOODI_CHAIN_ID)]
    chain_id: u64,

    #[arg(long, env = "STAKEFLOW_ASSET_SYMBOL", default_value = "ETH")]
    symbol: String,

    /// Print the final workflow state as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Show the stakeable balance of the connected wallet
    Balance,
    /// Build an unsigned stake transaction without signing it
    Build {
        #[arg(short, long, default_value = "0.005")]
        amount: String,
    },
    /// Build a stake transaction, then sign and broadcast it through the wallet
    Stake {
        #[arg(short, long, default_value = "0.005")]
        amount: String,
    },
    /// Switch the wallet to the required network
    SwitchNetwork,
    /// Report whether the wallet is on the required network
    Network,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stakeflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!(
        api_url = %cli.api_url,
        wallet_rpc = %cli.wallet_rpc,
        chain_id = cli.chain_id,
        "configuration loaded"
    );

    let api = Arc::new(StakingApiClient::new(&ApiConfig {
        base_url: cli.api_url.clone(),
        ..ApiConfig::default()
    }));
    let wallet = Arc::new(RpcWallet::new(&WalletConfig {
        rpc_url: cli.wallet_rpc.clone(),
        ..WalletConfig::default()
    }));
    let config = WorkflowConfig {
        required_chain_id: cli.chain_id,
        asset_symbol: cli.symbol.clone(),
        ..WorkflowConfig::default()
    };
    let on_event = (!cli.json).then(|| Box::new(print_event) as stakeflow_ops::WorkflowEventHandler);
    let mut workflow = StakingWorkflow::new(config, api, wallet.clone(), wallet, on_event);

    let outcome = run(&mut workflow, cli.command).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(workflow.state())?);
    } else {
        print_state(workflow.state());
    }

    outcome.map_err(Into::into)
}

async fn run(workflow: &mut StakingWorkflow, command: Commands) -> stakeflow_types::Result<()> {
    match command {
        Commands::Balance => {
            workflow.check_balance().await?;
        }
        Commands::Build { amount } => {
            workflow.build_operation(&amount).await?;
        }
        Commands::Stake { amount } => {
            workflow.build_operation(&amount).await?;
            workflow.sign_and_broadcast().await?;
        }
        Commands::SwitchNetwork => {
            workflow.switch_network().await?;
        }
        Commands::Network => match workflow.network_warning().await {
            Some(warning) => println!("{}", warning),
            None => println!("On chain {}", workflow.config().required_chain_id),
        },
    }
    Ok(())
}

fn print_event(event: WorkflowEvent) {
    match event {
        WorkflowEvent::Status(status) => println!("> {}", status),
        WorkflowEvent::Error(error) => eprintln!("! {}", error),
        WorkflowEvent::PhaseChanged(_) => {}
    }
}

fn print_state(state: &WorkflowState) {
    println!();
    println!("Status:       {}", state.status);
    if let Some(balance) = &state.balance {
        println!("Wallet:       {}", balance.wallet_address);
        println!("Stakeable:    {}", balance.stakeable_balance);
        println!("Network:      {}", balance.network);
    }
    if let Some(id) = &state.operation_id {
        println!("Operation:    {}", id);
    }
    if let Some(tx) = &state.pending_tx {
        println!("Pending tx:   to {} value {} chain {}", tx.to, tx.value.as_str(), tx.chain_id);
    }
    if let Some(hash) = &state.tx_hash {
        println!("Tx hash:      {}", hash);
    }
    if let Some(error) = &state.error {
        println!("Error:        {}", error);
    }
}
