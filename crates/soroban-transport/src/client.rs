//! Network client abstraction.
//!
//! The lifecycle builders only need a handful of node queries. This trait lets
//! them run against the JSON-RPC client in production and an in-memory fake in
//! tests without knowing which one they hold.

use anyhow::Result;
use soroban_toolkit_types::stellar_xdr::curr::{
    ContractExecutable, LedgerKey, ScContractInstance, ScVal,
};
use soroban_toolkit_types::{
    assemble_transaction, AccountAddress, ContractAddress, Durability, SimulationResult,
    Transaction,
};

/// Static facts the node reports about its network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub passphrase: String,
    pub protocol_version: u32,
    pub friendbot_url: Option<String>,
}

/// A contract data entry as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDataEntry {
    pub key: LedgerKey,
    pub val: ScVal,
    pub durability: Durability,
    pub last_modified_ledger: u32,
    pub live_until_ledger: Option<u32>,
}

impl ContractDataEntry {
    /// The instance payload, if this entry is a contract instance.
    pub fn instance(&self) -> Option<&ScContractInstance> {
        match &self.val {
            ScVal::ContractInstance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn executable(&self) -> Option<&ContractExecutable> {
        self.instance().map(|i| &i.executable)
    }

    /// Code hash of a Wasm-backed instance. `None` for built-in asset contracts.
    pub fn wasm_hash(&self) -> Option<[u8; 32]> {
        match self.executable()? {
            ContractExecutable::Wasm(hash) => Some(hash.0),
            ContractExecutable::StellarAsset => None,
        }
    }
}

/// Current state of a classic account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountEntry {
    pub account: AccountAddress,
    pub sequence: i64,
}

/// The node queries contract lifecycle transactions depend on.
#[async_trait::async_trait]
pub trait NetworkClient: Send + Sync {
    async fn get_network(&self) -> Result<NetworkInfo>;

    /// Look up one contract data entry. `Ok(None)` when the ledger has no such entry.
    async fn get_contract_data(
        &self,
        contract: &ContractAddress,
        key: &ScVal,
        durability: Durability,
    ) -> Result<Option<ContractDataEntry>>;

    async fn simulate_transaction(&self, tx: &Transaction) -> Result<SimulationResult>;

    /// Simulate `tx` and return it with the simulated resources applied.
    async fn prepare_transaction(&self, tx: &Transaction) -> Result<Transaction> {
        let sim = self.simulate_transaction(tx).await?;
        Ok(assemble_transaction(tx, &sim).build()?)
    }
}
