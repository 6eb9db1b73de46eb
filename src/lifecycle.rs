//! Contract lifecycle transactions.
//!
//! Both builders run a short, strictly sequential conversation with the node
//! and return an unsigned transaction ready for signing:
//!
//! - [`prepare_restore`]: restore archived entries of a contract footprint
//! - [`prepare_expiration_bump`]: touch a contract's instance entry read-only,
//!   tagged with the requesting account in a hash memo
//!
//! Any [`NetworkClient`] failure aborts the call and is returned unchanged.
//! Nothing is cached between calls.

use std::fmt;

use anyhow::Result;
use soroban_toolkit_types::encoding::bytes_to_hex;
use soroban_toolkit_types::stellar_xdr::curr::{ContractExecutable, LedgerKey, ScVal};
use soroban_toolkit_types::{
    assemble_transaction, AccountAddress, ContractAddress, Durability, Footprint, Memo, Operation,
    Transaction, TransactionBuilder,
};
use soroban_transport::NetworkClient;

/// Validity window for restore transactions, in seconds.
pub const RESTORE_TIMEOUT_SECS: u64 = 1000;

/// Sequence target of the placeholder bump operation.
pub const BUMP_TO: i64 = 10;

/// Ledger state that rules out a lifecycle transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The contract has no instance entry on the ledger.
    ContractNotFound { contract: ContractAddress },
    /// The instance key resolved to something other than a contract instance.
    NotAContractInstance {
        contract: ContractAddress,
        found: &'static str,
    },
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::ContractNotFound { contract } => {
                write!(f, "contract {} has no instance entry on the ledger", contract)
            }
            LifecycleError::NotAContractInstance { contract, found } => write!(
                f,
                "instance entry of contract {} holds {} instead of a contract instance",
                contract, found
            ),
        }
    }
}

impl std::error::Error for LifecycleError {}

/// Build a transaction restoring every key of `contract_footprint`.
///
/// The keys become the read-write footprint, deduplicated; the read-only set
/// stays empty. The node fills in resources and fees.
pub async fn prepare_restore<C>(
    builder: TransactionBuilder,
    client: &C,
    contract_footprint: impl IntoIterator<Item = LedgerKey>,
) -> Result<Transaction>
where
    C: NetworkClient + ?Sized,
{
    let footprint = Footprint::read_write(contract_footprint);
    tracing::debug!(
        keys = footprint.read_write_keys().len(),
        "preparing footprint restore"
    );
    let passphrase = client.get_network().await?.passphrase;

    let draft = builder
        .set_timeout(RESTORE_TIMEOUT_SECS)
        .set_network_passphrase(passphrase)
        .set_footprint(footprint)
        .add_operation(Operation::RestoreFootprint)
        .build()?;

    client.prepare_transaction(&draft).await
}

/// Build a transaction that declares `contract_address`'s instance entry as its
/// only (read-only) footprint key, with `public_key` as the bump source and as
/// the hash memo.
///
/// Both addresses are parsed before any node call; a malformed one yields an
/// [`soroban_toolkit_types::AddressError`].
pub async fn prepare_expiration_bump<C>(
    builder: TransactionBuilder,
    client: &C,
    contract_address: &str,
    public_key: &str,
) -> Result<Transaction>
where
    C: NetworkClient + ?Sized,
{
    let contract: ContractAddress = contract_address.parse()?;
    let account: AccountAddress = public_key.parse()?;
    let instance_key = contract.instance_key();

    let passphrase = client.get_network().await?.passphrase;

    let entry = client
        .get_contract_data(
            &contract,
            &ScVal::LedgerKeyContractInstance,
            Durability::Persistent,
        )
        .await?
        .ok_or(LifecycleError::ContractNotFound { contract })?;
    match entry.executable() {
        Some(ContractExecutable::Wasm(hash)) => tracing::debug!(
            contract = %contract,
            wasm_hash = %bytes_to_hex(&hash.0),
            live_until = ?entry.live_until_ledger,
            "resolved contract code"
        ),
        Some(ContractExecutable::StellarAsset) => tracing::debug!(
            contract = %contract,
            live_until = ?entry.live_until_ledger,
            "contract is a built-in asset"
        ),
        None => {
            return Err(LifecycleError::NotAContractInstance {
                contract,
                found: entry.val.name(),
            }
            .into())
        }
    }

    let draft = builder
        .add_operation(Operation::BumpSequence {
            source: Some(account),
            bump_to: BUMP_TO,
        })
        .set_network_passphrase(passphrase)
        .set_footprint(Footprint::read_only([instance_key.clone()]))
        .set_timeout(0)
        .build()?;

    let sim = client.simulate_transaction(&draft).await?;
    if let Some(preamble) = &sim.restore_preamble {
        tracing::warn!(
            contract = %contract,
            restore_fee = preamble.min_resource_fee,
            "contract entries are archived; restore them before bumping"
        );
    }

    let declared = Footprint::read_only([instance_key]);
    if sim.transaction_data.footprint != declared {
        tracing::debug!(
            read_only = sim.transaction_data.footprint.read_only_keys().len(),
            read_write = sim.transaction_data.footprint.read_write_keys().len(),
            "simulated footprint differs; keeping the instance key only"
        );
    }

    let tx = assemble_transaction(&draft, &sim)
        .set_footprint(declared)
        .add_memo(Memo::Hash(*account.as_bytes()))
        .set_timeout(0)
        .build()?;
    Ok(tx)
}
