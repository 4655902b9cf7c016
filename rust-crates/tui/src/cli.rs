use crate::{
    client::{
        self,
        AppConfig,
        NetworkTarget,
        WalletConfig,
    },
    wallets,
};
use clap::{
    ArgGroup,
    Parser,
};
use color_eyre::eyre::Result;
use deployments::{
    DEPLOYMENTS_ROOT,
    DeploymentStore,
};
use std::path::PathBuf;

/// Connects a wallet and shows the latest Cryptoshambo wagers.
#[derive(Parser, Debug)]
#[command(
    name = "cryptoshambo",
    version,
    about,
    long_about = None,
    group(
        ArgGroup::new("network")
            .args(["devnet", "testnet", "local"])
            .required(true)
    )
)]
pub struct Cli {
    /// Connect to Fuel devnet
    #[arg(long)]
    pub devnet: bool,

    /// Connect to Fuel testnet
    #[arg(long)]
    pub testnet: bool,

    /// Connect to a local Fuel node
    #[arg(long)]
    pub local: bool,

    /// Override the RPC URL for the selected network
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// forc-wallet profile to connect; prompts for one when omitted
    #[arg(long)]
    pub wallet: Option<String>,

    /// Override forc-wallet directory (defaults to ~/.fuel/wallets)
    #[arg(long)]
    pub wallet_dir: Option<String>,

    /// Read from this contract instead of the recorded deployment
    #[arg(long)]
    pub contract_id: Option<String>,

    #[arg(long, default_value = DEPLOYMENTS_ROOT)]
    pub deployments_dir: PathBuf,

    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,
}

impl Cli {
    pub fn network(&self) -> NetworkTarget {
        let custom = self.rpc_url.clone();
        if self.devnet {
            NetworkTarget::Devnet {
                url: custom.unwrap_or_else(|| client::DEFAULT_DEVNET_RPC_URL.to_string()),
            }
        } else if self.local {
            NetworkTarget::LocalNode {
                url: custom.unwrap_or_else(|| client::DEFAULT_LOCAL_RPC_URL.to_string()),
            }
        } else {
            NetworkTarget::Testnet {
                url: custom
                    .unwrap_or_else(|| client::DEFAULT_TESTNET_RPC_URL.to_string()),
            }
        }
    }

    pub fn into_config(self) -> Result<AppConfig> {
        let network = self.network();
        let store = DeploymentStore::open(&self.deployments_dir, network.deployment_env());
        let contract_id = client::resolve_contract_id(self.contract_id.as_deref(), &store)?;
        let dir = wallets::resolve_wallet_dir(self.wallet_dir.as_deref())?;
        Ok(AppConfig {
            network,
            wallets: WalletConfig::ForcKeystore {
                owner: self.wallet,
                dir,
            },
            contract_id,
        })
    }
}
