//! Soroban JSON-RPC client.
//!
//! ## Methods used
//! - `getNetwork`: passphrase and protocol version
//! - `getLedgerEntries`: contract data and account entries by ledger key
//! - `simulateTransaction`: resource discovery for a draft transaction
//!
//! ## Usage
//!
//! ```ignore
//! let client = RpcClient::new("https://soroban-testnet.stellar.org/");
//! let info = client.get_network().await?;
//! let account = client.get_account(&source).await?;
//! ```
//!
//! Requests go through a blocking `ureq` agent; the async methods move each
//! call onto tokio's blocking pool.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use soroban_toolkit_types::encoding::{xdr_from_base64, xdr_to_base64};
use soroban_toolkit_types::env_utils::env_var_or;
use soroban_toolkit_types::stellar_xdr::curr::{
    LedgerEntryData, LedgerKey, ScVal, SorobanTransactionData,
};
use soroban_toolkit_types::{
    contract_data_key, AccountAddress, ContractAddress, Durability, RestorePreamble,
    SimulationCost, SimulationResult, SorobanData, Transaction,
};

use crate::client::{AccountEntry, ContractDataEntry, NetworkClient, NetworkInfo};
use crate::network::{network_details, resolve_rpc_endpoint, NetworkTag};

/// One entry returned by `getLedgerEntries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntryResult {
    pub key: LedgerKey,
    pub data: LedgerEntryData,
    pub last_modified_ledger: u32,
    pub live_until_ledger: Option<u32>,
}

/// JSON-RPC client for a Soroban RPC node.
#[derive(Clone)]
pub struct RpcClient {
    endpoint: String,
    agent: ureq::Agent,
}

impl RpcClient {
    /// Default request timeout in seconds (can be overridden by env).
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds (can be overridden by env).
    const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    fn default_timeouts() -> (Duration, Duration) {
        (
            Duration::from_secs(env_var_or(
                "SOROBAN_RPC_TIMEOUT_SECS",
                Self::DEFAULT_TIMEOUT_SECS,
            )),
            Duration::from_secs(env_var_or(
                "SOROBAN_RPC_CONNECT_TIMEOUT_SECS",
                Self::DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
        )
    }

    fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build()
    }

    /// Client for a tag's endpoint, honoring `SOROBAN_RPC_URL`.
    pub fn for_network(tag: NetworkTag) -> Self {
        Self::new(&resolve_rpc_endpoint(tag))
    }

    pub fn testnet() -> Self {
        Self::new(&network_details(NetworkTag::Testnet).rpc_url)
    }

    /// Create a client with a custom endpoint.
    pub fn new(endpoint: &str) -> Self {
        let (timeout, connect_timeout) = Self::default_timeouts();
        Self::with_timeouts(endpoint, timeout, connect_timeout)
    }

    /// Create a client with explicit timeouts.
    pub fn with_timeouts(endpoint: &str, timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            agent: Self::build_agent(timeout, connect_timeout),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a JSON-RPC call and return its `result`.
    fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        tracing::debug!(endpoint = %self.endpoint, method, "rpc request");

        let response: Value = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| anyhow!("RPC request {} failed: {}", method, e))?
            .into_json()
            .map_err(|e| anyhow!("Failed to parse RPC response for {}: {}", method, e))?;

        extract_result(method, response)
    }

    async fn call_async(&self, method: &'static str, params: Value) -> Result<Value> {
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.call(method, params))
            .await
            .map_err(|e| anyhow!("RPC task for {} did not complete: {}", method, e))?
    }

    /// Fetch ledger entries by key. Keys with no entry are absent from the result.
    pub async fn get_ledger_entries(&self, keys: &[LedgerKey]) -> Result<Vec<LedgerEntryResult>> {
        let encoded = keys
            .iter()
            .map(|k| xdr_to_base64(k, "ledger key"))
            .collect::<Result<Vec<_>>>()?;
        let result = self
            .call_async("getLedgerEntries", json!({ "keys": encoded }))
            .await?;
        parse_ledger_entries(&result)
    }

    /// Current sequence number of `account`.
    pub async fn get_account(&self, account: &AccountAddress) -> Result<AccountEntry> {
        let entries = self.get_ledger_entries(&[account.ledger_key()]).await?;
        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("account {} not found", account))?;
        parse_account_entry(account, &entry.data)
    }
}

#[async_trait::async_trait]
impl NetworkClient for RpcClient {
    async fn get_network(&self) -> Result<NetworkInfo> {
        let result = self.call_async("getNetwork", json!({})).await?;
        parse_network_info(&result)
    }

    async fn get_contract_data(
        &self,
        contract: &ContractAddress,
        key: &ScVal,
        durability: Durability,
    ) -> Result<Option<ContractDataEntry>> {
        let ledger_key = contract_data_key(contract, key.clone(), durability);
        let entries = self.get_ledger_entries(&[ledger_key]).await?;
        entries
            .into_iter()
            .next()
            .map(contract_data_from_entry)
            .transpose()
    }

    async fn simulate_transaction(&self, tx: &Transaction) -> Result<SimulationResult> {
        let envelope = tx.to_envelope_base64()?;
        let result = self
            .call_async("simulateTransaction", json!({ "transaction": envelope }))
            .await?;
        parse_simulation(&result)
    }
}

fn extract_result(method: &str, mut response: Value) -> Result<Value> {
    if let Some(error) = response.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(anyhow!("RPC error from {} ({}): {}", method, code, message));
    }
    response
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| anyhow!("No result in RPC response for {}", method))
}

/// Numeric fields arrive as JSON numbers or decimal strings depending on the field.
fn number_field<T>(value: &Value, field: &str) -> Result<T>
where
    T: std::str::FromStr + TryFrom<u64>,
{
    let raw = value
        .get(field)
        .ok_or_else(|| anyhow!("missing field '{}'", field))?;
    let parsed = match raw {
        Value::String(s) => s.parse::<T>().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| T::try_from(n).ok()),
        _ => None,
    };
    parsed.ok_or_else(|| anyhow!("invalid numeric field '{}': {}", field, raw))
}

fn optional_number_field<T>(value: &Value, field: &str) -> Result<Option<T>>
where
    T: std::str::FromStr + TryFrom<u64>,
{
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => number_field(value, field).map(Some),
    }
}

fn str_field<'a>(value: &'a Value, field: &str) -> Result<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("missing field '{}'", field))
}

pub fn parse_network_info(result: &Value) -> Result<NetworkInfo> {
    Ok(NetworkInfo {
        passphrase: str_field(result, "passphrase")?.to_string(),
        protocol_version: number_field(result, "protocolVersion")?,
        friendbot_url: result
            .get("friendbotUrl")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from),
    })
}

pub fn parse_ledger_entries(result: &Value) -> Result<Vec<LedgerEntryResult>> {
    let Some(entries) = result.get("entries").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    entries
        .iter()
        .map(|entry| {
            Ok(LedgerEntryResult {
                key: xdr_from_base64(str_field(entry, "key")?, "ledger key")?,
                data: xdr_from_base64(str_field(entry, "xdr")?, "ledger entry data")?,
                last_modified_ledger: number_field(entry, "lastModifiedLedgerSeq")?,
                live_until_ledger: optional_number_field(entry, "liveUntilLedgerSeq")?,
            })
        })
        .collect()
}

fn contract_data_from_entry(entry: LedgerEntryResult) -> Result<ContractDataEntry> {
    match entry.data {
        LedgerEntryData::ContractData(data) => Ok(ContractDataEntry {
            key: entry.key,
            val: data.val,
            durability: data.durability.into(),
            last_modified_ledger: entry.last_modified_ledger,
            live_until_ledger: entry.live_until_ledger,
        }),
        other => Err(anyhow!(
            "expected contract data entry, got {}",
            other.name()
        )),
    }
}

fn parse_account_entry(account: &AccountAddress, data: &LedgerEntryData) -> Result<AccountEntry> {
    match data {
        LedgerEntryData::Account(entry) => Ok(AccountEntry {
            account: *account,
            sequence: entry.seq_num.0,
        }),
        other => Err(anyhow!("expected account entry, got {}", other.name())),
    }
}

fn parse_soroban_data(b64: &str) -> Result<SorobanData> {
    let data: SorobanTransactionData = xdr_from_base64(b64, "soroban transaction data")?;
    Ok(SorobanData::from_xdr(&data))
}

pub fn parse_simulation(result: &Value) -> Result<SimulationResult> {
    if let Some(error) = result.get("error").and_then(Value::as_str) {
        return Err(anyhow!("transaction simulation failed: {}", error));
    }

    let cost = match result.get("cost") {
        Some(cost) if !cost.is_null() => SimulationCost {
            cpu_instructions: number_field(cost, "cpuInsns")?,
            memory_bytes: number_field(cost, "memBytes")?,
        },
        _ => SimulationCost::default(),
    };

    let restore_preamble = match result.get("restorePreamble") {
        Some(preamble) if !preamble.is_null() => Some(RestorePreamble {
            min_resource_fee: number_field(preamble, "minResourceFee")?,
            transaction_data: parse_soroban_data(str_field(preamble, "transactionData")?)?,
        }),
        _ => None,
    };

    Ok(SimulationResult {
        min_resource_fee: number_field(result, "minResourceFee")?,
        transaction_data: parse_soroban_data(str_field(result, "transactionData")?)
            .context("simulation returned unusable transaction data")?,
        latest_ledger: number_field(result, "latestLedger")?,
        cost,
        restore_preamble,
    })
}
