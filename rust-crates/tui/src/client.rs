use crate::{
    contract::CryptoshamboBinder,
    page::PageController,
    ui,
    wallets::KeystoreConnector,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use cryptoshambo_abi::CRYPTOSHAMBO_CONTRACT_ID;
use deployments::{
    DeploymentEnv,
    DeploymentStore,
};
use fuels::prelude::ContractId;
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    str::FromStr,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_TESTNET_RPC_URL: &str = "https://testnet.fuel.network";
pub const DEFAULT_DEVNET_RPC_URL: &str = "https://devnet.fuel.network";
pub const DEFAULT_LOCAL_RPC_URL: &str = "http://localhost:4000/";
pub const LOG_FILE_NAME: &str = "cryptoshambo.log";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NetworkTarget {
    Testnet { url: String },
    Devnet { url: String },
    LocalNode { url: String },
}

impl NetworkTarget {
    pub fn url(&self) -> &str {
        match self {
            NetworkTarget::Testnet { url }
            | NetworkTarget::Devnet { url }
            | NetworkTarget::LocalNode { url } => url,
        }
    }

    pub fn deployment_env(&self) -> DeploymentEnv {
        match self {
            NetworkTarget::Testnet { .. } => DeploymentEnv::Test,
            NetworkTarget::Devnet { .. } => DeploymentEnv::Dev,
            NetworkTarget::LocalNode { .. } => DeploymentEnv::Local,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WalletConfig {
    /// `owner` of `None` means "ask which one".
    ForcKeystore { owner: Option<String>, dir: PathBuf },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub network: NetworkTarget,
    pub wallets: WalletConfig,
    pub contract_id: ContractId,
}

/// Hex ids, optionally written as `fuel0x…`. Bech32 `fuel1…` ids are rejected.
pub fn parse_contract_id(raw: &str) -> Result<ContractId> {
    let trimmed = raw.trim();
    let hex = match trimmed.strip_prefix("fuel") {
        Some(rest) if rest.starts_with("0x") => rest,
        _ => trimmed,
    };
    ContractId::from_str(hex).map_err(|e| eyre!("invalid contract id {raw:?}: {e}"))
}

/// Explicit id, then the network's deployment record, then the built-in id.
pub fn resolve_contract_id(
    explicit: Option<&str>,
    store: &DeploymentStore,
) -> Result<ContractId> {
    if let Some(raw) = explicit {
        return parse_contract_id(raw).wrap_err("Invalid --contract-id");
    }
    let record = store.load().map_err(|e| eyre!("{e:#}"))?;
    if let Some(record) = record {
        tracing::info!(
            env = %store.env(),
            contract_id = %record.contract_id,
            deployed_at = %record.deployed_at,
            "using recorded deployment"
        );
        return parse_contract_id(&record.contract_id).wrap_err_with(|| {
            format!(
                "Deployment record {} contains an invalid contract id",
                store.path().display()
            )
        });
    }
    parse_contract_id(CRYPTOSHAMBO_CONTRACT_ID)
}

/// Logs go to a file; the terminal belongs to the UI.
pub fn init_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .wrap_err_with(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("Failed to install tracing subscriber: {e}"))?;
    Ok(guard)
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let AppConfig {
        network,
        wallets,
        contract_id,
    } = config;
    let WalletConfig::ForcKeystore { owner, dir } = wallets;
    tracing::info!(url = network.url(), %contract_id, "starting wager page");

    let connector = KeystoreConnector::new(network.url(), dir, owner);
    let binder = CryptoshamboBinder::new(contract_id);
    let mut page = PageController::new(connector, binder);
    // wallet prompts need the plain terminal, so the page mounts first
    page.mount().await;

    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(&page.snapshot(), &mut ui_state, &mut input_events).await;
    ui::terminal_exit()?;
    res
}

async fn run_loop(
    snapshot: &crate::page::PageSnapshot,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
) -> Result<()> {
    ui::draw(ui_state, snapshot).wrap_err("initial draw failed")?;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            raw_ev = ui::next_raw_event(input_events) => {
                match ui::interpret_event(raw_ev?) {
                    Some(ui::UserEvent::Quit) => break,
                    Some(ui::UserEvent::Redraw) => {
                        ui::draw(ui_state, snapshot).wrap_err("redraw failed")?;
                    }
                    None => {}
                }
            }
        }
    }
    tracing::info!("wager page closed");
    Ok(())
}
