use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod eligibility;
pub mod transfer;
pub mod version;
pub mod vote;

use self::config::DaotxConfig;

#[derive(Parser)]
#[command(name = "daotx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compose unsigned DAO governance transactions", long_about = None)]
pub struct Cli {
    /// Path to config file (default: <config dir>/daotx/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compose a transfer-proposal transaction for a DAO
    Transfer {
        /// Account that will sign the transaction
        #[arg(long)]
        signer: String,

        /// Public key of the signing access key
        #[arg(long)]
        public_key: String,

        /// DAO contract account
        #[arg(long)]
        dao: String,

        /// Transfer recipient
        #[arg(long)]
        receiver: String,

        /// Quantity in display units (e.g. "1.5")
        #[arg(long)]
        quantity: String,

        /// Token contract account; omit for the native asset
        #[arg(long, default_value = "")]
        token_id: String,
    },

    /// Compose a vote transaction for an existing proposal
    Vote {
        /// Account that will sign the transaction
        #[arg(long)]
        signer: String,

        /// Public key of the signing access key
        #[arg(long)]
        public_key: String,

        /// DAO contract account
        #[arg(long)]
        dao: String,

        /// Proposal id to act on
        #[arg(long)]
        proposal_id: u64,

        /// Vote action: VoteApprove/approve, VoteReject/reject, VoteRemove/remove
        #[arg(long)]
        action: String,
    },

    /// Resolve which DAOs an account can vote in
    Eligibility {
        /// Account to resolve eligibility for
        #[arg(long)]
        account: String,

        /// Candidate DAO (repeatable); omitted = ask the indexer
        #[arg(long = "dao")]
        daos: Vec<String>,
    },

    /// Write a default configuration file
    InitConfig {
        /// Destination path (default: <config dir>/daotx/config.toml)
        #[arg(long)]
        path: Option<String>,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config);

    match cli.command {
        Commands::Transfer {
            signer,
            public_key,
            dao,
            receiver,
            quantity,
            token_id,
        } => transfer::execute(&config, signer, public_key, dao, receiver, quantity, token_id).await,
        Commands::Vote {
            signer,
            public_key,
            dao,
            proposal_id,
            action,
        } => vote::execute(&config, signer, public_key, dao, proposal_id, action).await,
        Commands::Eligibility { account, daos } => {
            eligibility::execute(&config, account, daos).await
        }
        Commands::InitConfig { path } => {
            let path = path
                .map(std::path::PathBuf::from)
                .unwrap_or_else(config::default_config_path);
            DaotxConfig::create_default(&path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}

fn load_config(path: Option<&str>) -> Result<DaotxConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => DaotxConfig::load(std::path::Path::new(p)),
        None => {
            let default = config::default_config_path();
            if default.exists() {
                DaotxConfig::load(&default)
            } else {
                Ok(DaotxConfig::default())
            }
        }
    }
}

fn init_logging(config: &DaotxConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    // Ignore a second init in tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_transfer() {
        let cli = Cli::parse_from([
            "daotx",
            "transfer",
            "--signer",
            "alice.test",
            "--public-key",
            "ed25519:abc",
            "--dao",
            "dao1.test",
            "--receiver",
            "bob.test",
            "--quantity",
            "1.5",
        ]);

        match cli.command {
            Commands::Transfer {
                signer,
                public_key,
                dao,
                receiver,
                quantity,
                token_id,
            } => {
                assert_eq!(signer, "alice.test");
                assert_eq!(public_key, "ed25519:abc");
                assert_eq!(dao, "dao1.test");
                assert_eq!(receiver, "bob.test");
                assert_eq!(quantity, "1.5");
                assert_eq!(token_id, ""); // native by default
            }
            _ => panic!("Expected Transfer command"),
        }
    }

    #[test]
    fn test_cli_parse_transfer_with_token() {
        let cli = Cli::parse_from([
            "daotx",
            "transfer",
            "--signer",
            "alice.test",
            "--public-key",
            "ed25519:abc",
            "--dao",
            "dao1.test",
            "--receiver",
            "bob.test",
            "--quantity",
            "12.5",
            "--token-id",
            "usdc.test",
        ]);

        match cli.command {
            Commands::Transfer { token_id, .. } => assert_eq!(token_id, "usdc.test"),
            _ => panic!("Expected Transfer command"),
        }
    }

    #[test]
    fn test_cli_parse_vote() {
        let cli = Cli::parse_from([
            "daotx",
            "vote",
            "--signer",
            "alice.test",
            "--public-key",
            "ed25519:abc",
            "--dao",
            "dao1.test",
            "--proposal-id",
            "42",
            "--action",
            "approve",
        ]);

        match cli.command {
            Commands::Vote {
                proposal_id,
                action,
                ..
            } => {
                assert_eq!(proposal_id, 42);
                assert_eq!(action, "approve");
            }
            _ => panic!("Expected Vote command"),
        }
    }

    #[test]
    fn test_cli_parse_eligibility_with_daos() {
        let cli = Cli::parse_from([
            "daotx",
            "eligibility",
            "--account",
            "alice.test",
            "--dao",
            "dao1.test",
            "--dao",
            "dao2.test",
        ]);

        match cli.command {
            Commands::Eligibility { account, daos } => {
                assert_eq!(account, "alice.test");
                assert_eq!(daos, vec!["dao1.test", "dao2.test"]);
            }
            _ => panic!("Expected Eligibility command"),
        }
    }

    #[test]
    fn test_cli_parse_eligibility_without_daos() {
        let cli = Cli::parse_from(["daotx", "eligibility", "--account", "alice.test"]);

        match cli.command {
            Commands::Eligibility { daos, .. } => assert!(daos.is_empty()),
            _ => panic!("Expected Eligibility command"),
        }
    }

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::parse_from(["daotx", "version"]);
        matches!(cli.command, Commands::Version);
    }

    #[test]
    fn test_cli_parse_global_config_flag() {
        let cli = Cli::parse_from(["daotx", "--config", "/etc/daotx.toml", "version"]);
        assert_eq!(cli.config, Some("/etc/daotx.toml".to_string()));
    }
}
