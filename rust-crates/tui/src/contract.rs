use color_eyre::eyre::{
    Result,
    WrapErr,
};
use cryptoshambo_abi::{
    contract_instance,
    cryptoshambo_types::Cryptoshambo,
};
use fuels::{
    accounts::wallet::Wallet,
    prelude::{
        ContractId,
        Execution,
    },
    types::Bytes,
};
use std::fmt;

/// One entry of `get_latest_wagers`, exactly as the contract encoded it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WagerRecord(Bytes);

impl WagerRecord {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0.0
    }
}

impl From<Bytes> for WagerRecord {
    fn from(raw: Bytes) -> Self {
        Self(raw)
    }
}

impl From<Vec<u8>> for WagerRecord {
    fn from(raw: Vec<u8>) -> Self {
        Self(Bytes(raw))
    }
}

impl fmt::Display for WagerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.as_bytes()))
    }
}

/// Read surface of the wager contract.
pub trait WagerContract {
    fn get_latest_wagers(&self) -> impl Future<Output = Result<Vec<WagerRecord>>>;
}

/// Turns a wallet connection into a contract proxy. Binding does no I/O.
pub trait ContractBinder<Connection> {
    type Contract: WagerContract;

    fn bind(&self, connection: Connection) -> Self::Contract;
}

#[derive(Clone, Copy, Debug)]
pub struct CryptoshamboBinder {
    contract_id: ContractId,
}

impl CryptoshamboBinder {
    pub fn new(contract_id: ContractId) -> Self {
        Self { contract_id }
    }

    pub fn contract_id(&self) -> ContractId {
        self.contract_id
    }

    /// Proxy at the configured id, driven by `account`.
    pub fn instance<A>(&self, account: A) -> Cryptoshambo<A> {
        contract_instance(self.contract_id, account)
    }
}

impl ContractBinder<Wallet> for CryptoshamboBinder {
    type Contract = WagerClient;

    fn bind(&self, wallet: Wallet) -> WagerClient {
        WagerClient {
            instance: self.instance(wallet),
        }
    }
}

pub struct WagerClient {
    instance: Cryptoshambo<Wallet>,
}

impl WagerClient {
    pub fn contract_id(&self) -> ContractId {
        self.instance.contract_id()
    }
}

impl WagerContract for WagerClient {
    async fn get_latest_wagers(&self) -> Result<Vec<WagerRecord>> {
        // read-only simulation: no fee, no signature
        let response = self
            .instance
            .methods()
            .get_latest_wagers()
            .simulate(Execution::state_read_only())
            .await
            .wrap_err("get_latest_wagers simulation failed")?;
        tracing::info!(
            contract_id = %self.contract_id(),
            count = response.value.len(),
            "fetched latest wagers"
        );
        Ok(response.value.into_iter().map(WagerRecord::from).collect())
    }
}
