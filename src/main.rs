//! Guardian Vault CLI Application
//!
//! A command-line interface for operating a multi-signature vault.

use clap::{Parser, Subcommand};
use guardian_vault::cli::{self, AppState};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vault")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A guardian multi-signature vault in Rust", long_about = None)]
struct Cli {
    /// Data directory for vault storage
    #[arg(short, long, default_value = ".vault_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new vault
    Init {
        /// Guardian addresses (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        guardians: Vec<String>,

        /// Confirmations required to execute
        #[arg(short, long)]
        quorum: usize,

        /// Optional label for the vault
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Deposit value into the treasury
    Deposit {
        /// Sender address
        #[arg(short, long)]
        from: String,

        /// Amount to deposit
        #[arg(short, long)]
        amount: u128,
    },

    /// Submit a transaction on behalf of a guardian
    Submit {
        /// Guardian the vault acts for
        #[arg(long = "as")]
        guardian: String,

        /// Destination address
        #[arg(short, long)]
        to: String,

        /// Value to send (bounty pool for recovery transactions)
        #[arg(short, long, default_value = "0")]
        value: u128,

        /// Payload as hex
        #[arg(long)]
        data: Option<String>,

        /// Mark as a recovery transaction
        #[arg(long)]
        recovery: bool,
    },

    /// Confirm a transaction
    Confirm {
        /// Confirming guardian
        #[arg(long = "as")]
        guardian: String,

        /// Transaction ID
        id: u64,
    },

    /// Revoke a confirmation
    Revoke {
        /// Revoking guardian
        #[arg(long = "as")]
        guardian: String,

        /// Transaction ID
        id: u64,
    },

    /// Execute a confirmed transaction
    Execute {
        /// Executing guardian
        #[arg(long = "as")]
        guardian: String,

        /// Transaction ID
        id: u64,

        /// Make the external call fail
        #[arg(long)]
        simulate_failure: bool,
    },

    /// Sign a recovery transaction
    Sign {
        /// Signing guardian
        #[arg(long = "as")]
        guardian: String,

        /// Transaction ID
        id: u64,
    },

    /// Transaction queries
    Tx {
        #[command(subcommand)]
        action: TxCommands,
    },

    /// Show balances
    Balance {
        /// Address to query (treasury summary if omitted)
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Show recent events
    Events {
        /// Number of events to show
        #[arg(short, long, default_value = "20")]
        count: usize,
    },

    /// Display vault information
    Info,

    /// Export vault to file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import vault from file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Subcommand)]
enum TxCommands {
    /// Show one transaction
    Show {
        /// Transaction ID
        id: u64,
    },

    /// List transactions
    List {
        /// Only unexecuted transactions
        #[arg(long)]
        pending: bool,

        /// Only executed transactions
        #[arg(long)]
        executed: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle init command separately (doesn't need full state)
    if let Commands::Init {
        guardians,
        quorum,
        label,
    } = &cli.command
    {
        return cli::cmd_init(&cli.data_dir, guardians, *quorum, label.clone());
    }

    let mut app = AppState::new(cli.data_dir.clone())?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),

        Commands::Deposit { from, amount } => {
            cli::cmd_deposit(&mut app, &from, amount)?;
        }

        Commands::Submit {
            guardian,
            to,
            value,
            data,
            recovery,
        } => {
            cli::cmd_submit(&mut app, &guardian, &to, value, data.as_deref(), recovery)?;
        }

        Commands::Confirm { guardian, id } => {
            cli::cmd_confirm(&mut app, &guardian, id)?;
        }

        Commands::Revoke { guardian, id } => {
            cli::cmd_revoke(&mut app, &guardian, id)?;
        }

        Commands::Execute {
            guardian,
            id,
            simulate_failure,
        } => {
            cli::cmd_execute(&mut app, &guardian, id, simulate_failure)?;
        }

        Commands::Sign { guardian, id } => {
            cli::cmd_sign(&mut app, &guardian, id)?;
        }

        Commands::Tx { action } => match action {
            TxCommands::Show { id } => {
                cli::cmd_tx_show(&app, id)?;
            }
            TxCommands::List { pending, executed } => {
                cli::cmd_tx_list(&app, pending, executed)?;
            }
        },

        Commands::Balance { address } => {
            cli::cmd_balance(&app, address.as_deref())?;
        }

        Commands::Events { count } => {
            cli::cmd_events(&app, count)?;
        }

        Commands::Info => {
            cli::cmd_info(&app)?;
        }

        Commands::Export { output } => {
            cli::cmd_export(&app, &output)?;
        }

        Commands::Import { input } => {
            cli::cmd_import(&mut app, &input)?;
        }
    }

    Ok(())
}
