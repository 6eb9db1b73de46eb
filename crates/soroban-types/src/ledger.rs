//! Ledger keys, storage durability and transaction footprints.
//!
//! A footprint declares the ledger state a transaction reads and writes.
//! The node rejects transactions whose footprint over- or under-declares the
//! keys the attached operations touch, so builders construct footprints from
//! the helpers here rather than assembling raw XDR.

use serde::{Deserialize, Serialize};
use stellar_xdr::curr::{
    ContractDataDurability, Hash, LedgerFootprint, LedgerKey, LedgerKeyContractCode,
    LedgerKeyContractData, ScVal, VecM,
};

use crate::address::ContractAddress;

/// Lifecycle class of a contract storage entry.
///
/// Only persistent entries (including a contract's instance record) can be
/// restored after archival or have their TTL extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Durability {
    Temporary,
    Persistent,
}

impl From<Durability> for ContractDataDurability {
    fn from(d: Durability) -> Self {
        match d {
            Durability::Temporary => ContractDataDurability::Temporary,
            Durability::Persistent => ContractDataDurability::Persistent,
        }
    }
}

impl From<ContractDataDurability> for Durability {
    fn from(d: ContractDataDurability) -> Self {
        match d {
            ContractDataDurability::Temporary => Durability::Temporary,
            ContractDataDurability::Persistent => Durability::Persistent,
        }
    }
}

/// Key of a contract data entry.
pub fn contract_data_key(
    contract: &ContractAddress,
    key: ScVal,
    durability: Durability,
) -> LedgerKey {
    LedgerKey::ContractData(LedgerKeyContractData {
        contract: contract.to_sc_address(),
        key,
        durability: durability.into(),
    })
}

/// Key of an uploaded contract code (Wasm) entry.
pub fn contract_code_key(hash: [u8; 32]) -> LedgerKey {
    LedgerKey::ContractCode(LedgerKeyContractCode { hash: Hash(hash) })
}

/// Read-only and read-write key sets of a transaction.
///
/// Both sets keep insertion order and never hold duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Footprint {
    read_only: Vec<LedgerKey>,
    read_write: Vec<LedgerKey>,
}

impl Footprint {
    pub fn new(
        read_only: impl IntoIterator<Item = LedgerKey>,
        read_write: impl IntoIterator<Item = LedgerKey>,
    ) -> Self {
        Self {
            read_only: dedup(read_only),
            read_write: dedup(read_write),
        }
    }

    pub fn read_only(keys: impl IntoIterator<Item = LedgerKey>) -> Self {
        Self::new(keys, std::iter::empty())
    }

    pub fn read_write(keys: impl IntoIterator<Item = LedgerKey>) -> Self {
        Self::new(std::iter::empty(), keys)
    }

    pub fn read_only_keys(&self) -> &[LedgerKey] {
        &self.read_only
    }

    pub fn read_write_keys(&self) -> &[LedgerKey] {
        &self.read_write
    }

    pub fn is_empty(&self) -> bool {
        self.read_only.is_empty() && self.read_write.is_empty()
    }

    pub fn contains(&self, key: &LedgerKey) -> bool {
        self.read_only.contains(key) || self.read_write.contains(key)
    }

    pub fn to_xdr(&self) -> anyhow::Result<LedgerFootprint> {
        Ok(LedgerFootprint {
            read_only: to_vecm(&self.read_only)?,
            read_write: to_vecm(&self.read_write)?,
        })
    }

    pub fn from_xdr(footprint: &LedgerFootprint) -> Self {
        Self::new(
            footprint.read_only.iter().cloned(),
            footprint.read_write.iter().cloned(),
        )
    }
}

fn dedup(keys: impl IntoIterator<Item = LedgerKey>) -> Vec<LedgerKey> {
    let mut out: Vec<LedgerKey> = Vec::new();
    for key in keys {
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}

fn to_vecm(keys: &[LedgerKey]) -> anyhow::Result<VecM<LedgerKey>> {
    keys.to_vec()
        .try_into()
        .map_err(|e| anyhow::anyhow!("footprint has too many keys: {}", e))
}
