use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use dialoguer::Select;
use eth_keystore::decrypt_key;
use fuels::{
    accounts::ViewOnlyAccount,
    crypto::SecretKey,
    prelude::{
        Provider,
        Wallet,
        derivation::DEFAULT_DERIVATION_PATH,
        private_key::PrivateKeySigner,
    },
};
use rpassword::prompt_password;
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

const MIN_MNEMONIC_WORDS: usize = 12;

/// Produces an authorized connection for the page to read through.
pub trait WalletConnector {
    type Connection;

    fn connect(&self) -> impl Future<Output = Result<Self::Connection>>;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WalletDescriptor {
    pub name: String,
    pub path: PathBuf,
}

pub fn default_wallet_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").wrap_err("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".fuel").join("wallets"))
}

pub fn resolve_wallet_dir(dir: Option<&str>) -> Result<PathBuf> {
    match dir {
        Some(raw) => Ok(PathBuf::from(shellexpand::tilde(raw).into_owned())),
        None => default_wallet_dir(),
    }
}

/// forc-wallet keystores (`*.wallet`) in `dir`, sorted by name.
pub fn list_wallets(dir: &Path) -> Result<Vec<WalletDescriptor>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut wallets = Vec::new();
    for entry in fs::read_dir(dir).wrap_err("Failed to read wallet directory")? {
        let path = entry.wrap_err("Failed to read wallet entry")?.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("wallet")
        {
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| eyre!("Invalid wallet filename {:?}", path))?
            .to_owned();
        wallets.push(WalletDescriptor { name, path });
    }
    wallets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(wallets)
}

pub fn find_wallet(dir: &Path, name: &str) -> Result<WalletDescriptor> {
    list_wallets(dir)?
        .into_iter()
        .find(|w| w.name == name)
        .ok_or_else(|| eyre!("Wallet '{name}' not found in {}", dir.display()))
}

/// Lets the user pick one of the keystores in `dir`. Escaping the prompt
/// counts as rejecting the connection.
pub fn prompt_for_wallet(dir: &Path) -> Result<WalletDescriptor> {
    let mut wallets = list_wallets(dir)?;
    if wallets.is_empty() {
        return Err(eyre!("No wallets found in {}", dir.display()));
    }
    let names: Vec<&str> = wallets.iter().map(|w| w.name.as_str()).collect();
    let choice = Select::new()
        .with_prompt("Select a wallet to connect")
        .items(&names)
        .default(0)
        .interact_opt()
        .wrap_err("Failed to read wallet selection")?;
    match choice {
        Some(idx) => Ok(wallets.swap_remove(idx)),
        None => Err(eyre!("Wallet selection cancelled")),
    }
}

pub fn unlock_wallet(descriptor: &WalletDescriptor, provider: &Provider) -> Result<Wallet> {
    let prompt = format!("Enter password for wallet '{}': ", descriptor.name);
    let password = prompt_password(prompt).wrap_err("Failed to read wallet password")?;

    let secret = decrypt_key(&descriptor.path, password.as_bytes())
        .map_err(|_| eyre!("Invalid password for wallet '{}'", descriptor.name))?;

    let signer = signer_from_secret(&descriptor.name, &secret)?;
    Ok(Wallet::new(signer, provider.clone()))
}

/// Keystores hold either a raw secret key or a mnemonic phrase.
pub fn signer_from_secret(name: &str, secret: &[u8]) -> Result<PrivateKeySigner> {
    if let Ok(secret_key) = SecretKey::try_from(secret) {
        return Ok(PrivateKeySigner::new(secret_key));
    }

    if let Ok(mnemonic) = std::str::from_utf8(secret)
        && mnemonic.split_whitespace().count() >= MIN_MNEMONIC_WORDS
    {
        let secret_key =
            SecretKey::new_from_mnemonic_phrase_with_path(mnemonic, DEFAULT_DERIVATION_PATH)
                .wrap_err_with(|| format!("Wallet '{name}' holds an invalid mnemonic"))?;
        return Ok(PrivateKeySigner::new(secret_key));
    }

    Err(eyre!("Wallet '{name}' contained unsupported key material"))
}

/// Connects through a forc-wallet keystore on disk.
#[derive(Clone, Debug)]
pub struct KeystoreConnector {
    rpc_url: String,
    dir: PathBuf,
    wallet: Option<String>,
}

impl KeystoreConnector {
    pub fn new(rpc_url: impl Into<String>, dir: PathBuf, wallet: Option<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            dir,
            wallet,
        }
    }

    fn choose_wallet(&self) -> Result<WalletDescriptor> {
        match self.wallet.as_deref() {
            Some(name) => find_wallet(&self.dir, name),
            None => prompt_for_wallet(&self.dir),
        }
    }
}

impl WalletConnector for KeystoreConnector {
    type Connection = Wallet;

    async fn connect(&self) -> Result<Wallet> {
        tracing::info!(url = %self.rpc_url, "connecting to provider");
        let provider = Provider::connect(&self.rpc_url)
            .await
            .wrap_err_with(|| format!("Failed to connect to provider at {}", self.rpc_url))?;

        let descriptor = self.choose_wallet()?;
        tracing::info!(wallet = %descriptor.name, "unlocking wallet");
        let wallet = unlock_wallet(&descriptor, &provider)?;
        tracing::info!(address = %wallet.address(), "wallet connected");
        Ok(wallet)
    }
}
