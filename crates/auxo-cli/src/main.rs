//! Auxo compounding CLI
//!
//! Drives the fetch and send halves of a compounding round and the report
//! checks run on their output.

use anyhow::Context;
use auxo_chain::JsonRpcClient;
use auxo_compound::{
    distribute_compounded, fetch_compounders, totals, union_addresses, validate_distribution,
    CompoundConfig, CompoundError,
};
use auxo_core::{Amount, RewardToken};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "auxo")]
#[command(version)]
#[command(
    about = "Auxo compounding - eligible compounders, pro-rata allocation, Safe batches",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "auxo.toml", env = "AUXO_CONFIG")]
    config: PathBuf,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find delegated-but-unclaimed recipients and write the claim batch
    Fetch {
        #[arg(short, long, value_enum, default_value = "all")]
        token: TokenSelection,
    },

    /// Allocate a reward pool over fetched recipients and write the deposit batch
    Send {
        #[arg(short, long, value_enum)]
        token: TokenArg,

        /// Pool in wei; defaults to the configured pool for the token
        #[arg(short, long)]
        amount: Option<Amount>,

        /// Recipients file; defaults to recipients-<TOKEN>-<round>.json
        #[arg(short, long)]
        recipients: Option<String>,
    },

    /// Check compound-<TOKEN>-<N>.json totals
    Validate {
        /// Compound report file names
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Compounder counts and WETH totals of recipients files
    Totals {
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Every address across recipients files
    Union {
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum TokenArg {
    Arv,
    Prv,
}

impl From<TokenArg> for RewardToken {
    fn from(arg: TokenArg) -> Self {
        match arg {
            TokenArg::Arv => RewardToken::ARV,
            TokenArg::Prv => RewardToken::PRV,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TokenSelection {
    Arv,
    Prv,
    All,
}

impl TokenSelection {
    fn tokens(self) -> Vec<RewardToken> {
        match self {
            Self::Arv => vec![RewardToken::ARV],
            Self::Prv => vec![RewardToken::PRV],
            Self::All => RewardToken::ALL.to_vec(),
        }
    }
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn expand_path(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

fn load_config(path: &Path) -> anyhow::Result<CompoundConfig> {
    let path = expand_path(path);
    let mut conf = CompoundConfig::load(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    conf.directory = expand_path(Path::new(&conf.directory))
        .to_string_lossy()
        .into_owned();
    Ok(conf)
}

/// Mark network failures as retryable and bad input as needing a fix
fn explain(err: CompoundError) -> anyhow::Error {
    let context = if err.is_transient() {
        "transient network failure, nothing was written; safe to re-run"
    } else if err.is_validation() {
        "invalid input, nothing was written; fix the input and re-run"
    } else {
        return anyhow::Error::new(err);
    };
    anyhow::Error::new(err).context(context)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let conf = load_config(&cli.config)?;

    match cli.command {
        Commands::Fetch { token } => {
            let client = JsonRpcClient::new(&conf.chain.rpc_url, conf.timeout())?;
            tracing::info!(
                "Epoch {} round {}, reading at block {}",
                conf.epoch,
                conf.compound_round,
                conf.block_snapshot
            );
            for token in token.tokens() {
                let outcome = fetch_compounders(&conf, token, &client)
                    .await
                    .map_err(explain)?;
                print_json(&outcome)?;
            }
        }

        Commands::Send {
            token,
            amount,
            recipients,
        } => {
            let token = RewardToken::from(token);
            let pool = conf.pool(token, amount).map_err(explain)?;
            let recipients = recipients
                .unwrap_or_else(|| format!("recipients-{}-{}.json", token, conf.compound_round));
            let outcome =
                distribute_compounded(&conf, token, pool, &recipients).map_err(explain)?;
            if !outcome.drift.within_tolerance() {
                tracing::warn!(
                    "{} rounding drift {} exceeds tolerance {}, review {} before executing",
                    token,
                    outcome.drift.diff,
                    outcome.drift.tolerance,
                    outcome.compound_file
                );
            }
            print_json(&outcome)?;
        }

        Commands::Validate { files } => {
            let store = conf.store()?;
            let mut failed = false;
            for file in &files {
                let check = validate_distribution(&store, file)?;
                failed |= !check.is_ok();
                print_json(&check)?;
            }
            if failed {
                anyhow::bail!("distribution check failed");
            }
        }

        Commands::Totals { files } => {
            let store = conf.store()?;
            for file in &files {
                print_json(&totals(&store, file)?)?;
            }
        }

        Commands::Union { files } => {
            let addresses = union_addresses(&conf.store()?, &files)?;
            tracing::info!("{} unique addresses", addresses.len());
            print_json(&addresses)?;
        }

        Commands::Config => {
            println!("{}", toml::to_string_pretty(&conf)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use auxo_chain::ChainError;

    #[test]
    fn test_explain_labels_error_class() {
        let transient = explain(ChainError::Transport("timed out".into()).into());
        assert!(transient.to_string().contains("safe to re-run"));

        let invalid = explain(CompoundError::MissingPool(RewardToken::PRV));
        assert!(invalid.to_string().starts_with("invalid input"));
        assert!(format!("{:#}", invalid).contains("No PRV reward pool configured"));

        let malformed = explain(ChainError::MalformedResponse("short word".into()).into());
        assert_eq!(malformed.to_string(), "Malformed response: short word");
    }
}
