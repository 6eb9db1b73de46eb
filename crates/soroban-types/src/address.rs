//! Address parsing for contracts and accounts.
//!
//! This module is the canonical source for address handling in the workspace.
//! Other crates should import from here rather than parsing strkeys themselves.
//!
//! Ledger addresses are 32-byte values, but users exchange them as strkeys:
//! - Contract: `C...` (56 characters, version byte + payload + CRC16 checksum)
//! - Account: `G...` (56 characters, an ed25519 public key)
//!
//! Parsing never touches the network, so malformed input is rejected before
//! any request is issued.

use std::fmt;
use std::str::FromStr;

use stellar_xdr::curr::{
    AccountId, Hash, LedgerKey, LedgerKeyAccount, MuxedAccount, PublicKey, ScAddress, ScVal,
    Uint256,
};

use crate::ledger::{contract_data_key, Durability};

/// Error raised when a strkey does not decode to the expected address kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Not a valid `C...` contract strkey.
    InvalidContract { value: String },
    /// Not a valid `G...` account strkey.
    InvalidAccount { value: String },
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::InvalidContract { value } => {
                write!(f, "invalid contract address '{}'", value)
            }
            AddressError::InvalidAccount { value } => {
                write!(f, "invalid account address '{}'", value)
            }
        }
    }
}

impl std::error::Error for AddressError {}

/// A contract address (`C...` strkey).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractAddress([u8; 32]);

impl ContractAddress {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_sc_address(&self) -> ScAddress {
        ScAddress::Contract(Hash(self.0))
    }

    /// Ledger key of the contract's persistent instance entry.
    ///
    /// This is the single key a contract's own footprint consists of.
    pub fn instance_key(&self) -> LedgerKey {
        contract_data_key(self, ScVal::LedgerKeyContractInstance, Durability::Persistent)
    }
}

impl FromStr for ContractAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        stellar_strkey::Contract::from_string(s.trim())
            .map(|c| Self(c.0))
            .map_err(|_| AddressError::InvalidContract {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", stellar_strkey::Contract(self.0).to_string())
    }
}

/// An account address (`G...` strkey wrapping an ed25519 public key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress([u8; 32]);

impl AccountAddress {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw 32-byte account id.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_account_id(&self) -> AccountId {
        AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(self.0)))
    }

    pub fn to_muxed_account(&self) -> MuxedAccount {
        MuxedAccount::Ed25519(Uint256(self.0))
    }

    pub fn ledger_key(&self) -> LedgerKey {
        LedgerKey::Account(LedgerKeyAccount {
            account_id: self.to_account_id(),
        })
    }

    /// Recover the account from an XDR source field. Muxed ids are dropped.
    pub fn from_muxed_account(account: &MuxedAccount) -> Self {
        match account {
            MuxedAccount::Ed25519(Uint256(bytes)) => Self(*bytes),
            MuxedAccount::MuxedEd25519(muxed) => Self(muxed.ed25519.0),
        }
    }
}

impl FromStr for AccountAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        stellar_strkey::ed25519::PublicKey::from_string(s.trim())
            .map(|pk| Self(pk.0))
            .map_err(|_| AddressError::InvalidAccount {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            stellar_strkey::ed25519::PublicKey(self.0).to_string()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::{ContractDataDurability, LedgerKeyContractData};

    #[test]
    fn test_contract_strkey_roundtrip() {
        let contract = ContractAddress::from_bytes([7; 32]);
        let text = contract.to_string();
        assert!(text.starts_with('C'));
        assert_eq!(text.len(), 56);
        assert_eq!(text.parse::<ContractAddress>().unwrap(), contract);
    }

    #[test]
    fn test_account_strkey_roundtrip() {
        let account = AccountAddress::from_bytes([9; 32]);
        let text = account.to_string();
        assert!(text.starts_with('G'));
        assert_eq!(text.parse::<AccountAddress>().unwrap(), account);
    }

    #[test]
    fn test_invalid_contract_address() {
        let err = "not-a-contract".parse::<ContractAddress>().unwrap_err();
        assert_eq!(
            err,
            AddressError::InvalidContract {
                value: "not-a-contract".to_string()
            }
        );
        assert!(err.to_string().contains("invalid contract address"));
    }

    #[test]
    fn test_account_strkey_is_not_a_contract() {
        let account = AccountAddress::from_bytes([1; 32]).to_string();
        assert!(account.parse::<ContractAddress>().is_err());

        let contract = ContractAddress::from_bytes([1; 32]).to_string();
        assert!(matches!(
            contract.parse::<AccountAddress>(),
            Err(AddressError::InvalidAccount { .. })
        ));
    }

    #[test]
    fn test_corrupted_checksum_rejected() {
        let mut text = ContractAddress::from_bytes([3; 32]).to_string();
        let last = text.pop().unwrap();
        text.push(if last == 'A' { 'B' } else { 'A' });
        assert!(text.parse::<ContractAddress>().is_err());
    }

    #[test]
    fn test_instance_key_shape() {
        let contract = ContractAddress::from_bytes([5; 32]);
        match contract.instance_key() {
            LedgerKey::ContractData(LedgerKeyContractData {
                contract: addr,
                key,
                durability,
            }) => {
                assert_eq!(addr, ScAddress::Contract(Hash([5; 32])));
                assert_eq!(key, ScVal::LedgerKeyContractInstance);
                assert_eq!(durability, ContractDataDurability::Persistent);
            }
            other => panic!("unexpected key {:?}", other),
        }
    }

    #[test]
    fn test_muxed_account_conversion() {
        let account = AccountAddress::from_bytes([4; 32]);
        assert_eq!(
            AccountAddress::from_muxed_account(&account.to_muxed_account()),
            account
        );
    }
}
