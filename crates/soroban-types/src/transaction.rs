//! Immutable transaction builder and the unsigned transactions it produces.
//!
//! [`TransactionBuilder`] follows a snapshot discipline: every setter consumes
//! the builder and returns the next snapshot, and the builder is `Clone`, so a
//! caller can fork a partially configured draft without the branches observing
//! each other. [`TransactionBuilder::build`] validates the snapshot and yields
//! a [`Transaction`], whose fields are only reachable through getters.
//!
//! ```ignore
//! let tx = TransactionBuilder::new(source, sequence)
//!     .set_timeout(1000)
//!     .set_network_passphrase(passphrase)
//!     .set_footprint(Footprint::read_write([contract.instance_key()]))
//!     .add_operation(Operation::RestoreFootprint)
//!     .build()?;
//! let envelope = tx.to_envelope_base64()?;
//! ```

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    self as xdr, BumpSequenceOp, ExtensionPoint, Hash, Limits, OperationBody, Preconditions,
    RestoreFootprintOp, SequenceNumber, SorobanResources, SorobanTransactionData, StringM,
    TimeBounds, TimePoint, TransactionEnvelope, TransactionExt, TransactionSignaturePayload,
    TransactionSignaturePayloadTaggedTransaction, TransactionV1Envelope, VecM, WriteXdr,
};

use crate::address::AccountAddress;
use crate::encoding::base64_encode;
use crate::ledger::Footprint;

/// Inclusion fee per operation, in stroops.
pub const BASE_FEE: u32 = 100;

/// Protocol limit on operations per transaction.
pub const MAX_OPERATIONS: usize = 100;

/// Protocol limit on text memo length, in bytes.
pub const MAX_MEMO_TEXT_LEN: usize = 28;

/// Operations this toolkit attaches to lifecycle transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Restore archived persistent entries named in the read-write footprint.
    RestoreFootprint,
    /// Bump the source account's sequence number to `bump_to`.
    BumpSequence {
        source: Option<AccountAddress>,
        bump_to: i64,
    },
}

impl Operation {
    pub fn to_xdr(&self) -> xdr::Operation {
        match self {
            Operation::RestoreFootprint => xdr::Operation {
                source_account: None,
                body: OperationBody::RestoreFootprint(RestoreFootprintOp {
                    ext: ExtensionPoint::V0,
                }),
            },
            Operation::BumpSequence { source, bump_to } => xdr::Operation {
                source_account: source.map(|a| a.to_muxed_account()),
                body: OperationBody::BumpSequence(BumpSequenceOp {
                    bump_to: SequenceNumber(*bump_to),
                }),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Memo {
    #[default]
    None,
    Text(String),
    Id(u64),
    Hash([u8; 32]),
}

impl Memo {
    fn to_xdr(&self) -> Result<xdr::Memo> {
        Ok(match self {
            Memo::None => xdr::Memo::None,
            Memo::Text(text) => {
                let text: StringM<28> = text
                    .as_str()
                    .try_into()
                    .map_err(|e| anyhow!("memo text too long: {}", e))?;
                xdr::Memo::Text(text)
            }
            Memo::Id(id) => xdr::Memo::Id(*id),
            Memo::Hash(bytes) => xdr::Memo::Hash(Hash(*bytes)),
        })
    }
}

/// Soroban resource declaration attached to a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SorobanData {
    pub footprint: Footprint,
    pub instructions: u32,
    pub read_bytes: u32,
    pub write_bytes: u32,
    /// Resource fee in stroops, charged on top of the inclusion fee.
    pub resource_fee: i64,
}

impl SorobanData {
    pub fn with_footprint(footprint: Footprint) -> Self {
        Self {
            footprint,
            ..Default::default()
        }
    }

    pub fn to_xdr(&self) -> Result<SorobanTransactionData> {
        Ok(SorobanTransactionData {
            ext: ExtensionPoint::V0,
            resources: SorobanResources {
                footprint: self.footprint.to_xdr()?,
                instructions: self.instructions,
                read_bytes: self.read_bytes,
                write_bytes: self.write_bytes,
            },
            resource_fee: self.resource_fee,
        })
    }

    pub fn from_xdr(data: &SorobanTransactionData) -> Self {
        Self {
            footprint: Footprint::from_xdr(&data.resources.footprint),
            instructions: data.resources.instructions,
            read_bytes: data.resources.read_bytes,
            write_bytes: data.resources.write_bytes,
            resource_fee: data.resource_fee,
        }
    }
}

/// Reasons a builder snapshot cannot become a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    MissingTimeout,
    MissingNetworkPassphrase,
    NoOperations,
    TooManyOperations { count: usize },
    NegativeResourceFee { fee: i64 },
    FeeOverflow,
    InvalidMemo { reason: String },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::MissingTimeout => {
                write!(f, "timeout must be set before building (use 0 for no upper bound)")
            }
            BuildError::MissingNetworkPassphrase => write!(f, "network passphrase is not set"),
            BuildError::NoOperations => write!(f, "transaction has no operations"),
            BuildError::TooManyOperations { count } => write!(
                f,
                "transaction has {} operations, limit is {}",
                count, MAX_OPERATIONS
            ),
            BuildError::NegativeResourceFee { fee } => {
                write!(f, "resource fee must not be negative, got {}", fee)
            }
            BuildError::FeeOverflow => write!(f, "total fee does not fit in 32 bits"),
            BuildError::InvalidMemo { reason } => write!(f, "invalid memo: {}", reason),
        }
    }
}

impl std::error::Error for BuildError {}

/// Snapshot of a transaction under construction.
#[derive(Debug, Clone)]
#[must_use]
pub struct TransactionBuilder {
    source: AccountAddress,
    /// Current sequence of the source account; the built transaction uses the next one.
    sequence: i64,
    base_fee: u32,
    timeout: Option<u64>,
    network_passphrase: Option<String>,
    soroban_data: Option<SorobanData>,
    operations: Vec<Operation>,
    memo: Memo,
}

impl TransactionBuilder {
    pub fn new(source: AccountAddress, sequence: i64) -> Self {
        Self {
            source,
            sequence,
            base_fee: BASE_FEE,
            timeout: None,
            network_passphrase: None,
            soroban_data: None,
            operations: Vec::new(),
            memo: Memo::None,
        }
    }

    /// Re-open a built transaction for further configuration.
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            source: tx.source,
            sequence: tx.sequence - 1,
            base_fee: tx.base_fee,
            timeout: Some(tx.timeout),
            network_passphrase: Some(tx.network_passphrase.clone()),
            soroban_data: tx.soroban_data.clone(),
            operations: tx.operations.clone(),
            memo: tx.memo.clone(),
        }
    }

    pub fn with_base_fee(mut self, base_fee: u32) -> Self {
        self.base_fee = base_fee;
        self
    }

    /// Seconds from build time until the transaction expires; `0` sets no upper bound.
    pub fn set_timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn set_network_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.network_passphrase = Some(passphrase.into());
        self
    }

    /// Replace the footprint, keeping any resource figures already declared.
    pub fn set_footprint(mut self, footprint: Footprint) -> Self {
        let mut data = self.soroban_data.take().unwrap_or_default();
        data.footprint = footprint;
        self.soroban_data = Some(data);
        self
    }

    pub fn set_soroban_data(mut self, data: SorobanData) -> Self {
        self.soroban_data = Some(data);
        self
    }

    pub fn add_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    pub fn add_memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    pub fn build(&self) -> Result<Transaction, BuildError> {
        let timeout = self.timeout.ok_or(BuildError::MissingTimeout)?;
        let network_passphrase = self
            .network_passphrase
            .clone()
            .ok_or(BuildError::MissingNetworkPassphrase)?;
        if self.operations.is_empty() {
            return Err(BuildError::NoOperations);
        }
        if self.operations.len() > MAX_OPERATIONS {
            return Err(BuildError::TooManyOperations {
                count: self.operations.len(),
            });
        }
        if let Memo::Text(text) = &self.memo {
            if text.len() > MAX_MEMO_TEXT_LEN {
                return Err(BuildError::InvalidMemo {
                    reason: format!(
                        "text is {} bytes, limit is {}",
                        text.len(),
                        MAX_MEMO_TEXT_LEN
                    ),
                });
            }
        }

        let resource_fee = match &self.soroban_data {
            Some(data) => u64::try_from(data.resource_fee).map_err(|_| {
                BuildError::NegativeResourceFee {
                    fee: data.resource_fee,
                }
            })?,
            None => 0,
        };
        let inclusion_fee = u64::from(self.base_fee) * self.operations.len() as u64;
        let fee = u32::try_from(inclusion_fee + resource_fee).map_err(|_| BuildError::FeeOverflow)?;

        let max_time = if timeout == 0 {
            0
        } else {
            unix_now().saturating_add(timeout)
        };

        Ok(Transaction {
            source: self.source,
            sequence: self.sequence + 1,
            base_fee: self.base_fee,
            fee,
            timeout,
            max_time,
            network_passphrase,
            soroban_data: self.soroban_data.clone(),
            operations: self.operations.clone(),
            memo: self.memo.clone(),
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// An unsigned, fully assembled transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    source: AccountAddress,
    sequence: i64,
    base_fee: u32,
    fee: u32,
    timeout: u64,
    max_time: u64,
    network_passphrase: String,
    soroban_data: Option<SorobanData>,
    operations: Vec<Operation>,
    memo: Memo,
}

impl Transaction {
    pub fn source(&self) -> &AccountAddress {
        &self.source
    }

    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    /// Total fee: inclusion fee for every operation plus the resource fee.
    pub fn fee(&self) -> u32 {
        self.fee
    }

    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    /// Upper time bound written to the envelope; `0` means unbounded.
    pub fn max_time(&self) -> u64 {
        self.max_time
    }

    pub fn network_passphrase(&self) -> &str {
        &self.network_passphrase
    }

    pub fn soroban_data(&self) -> Option<&SorobanData> {
        self.soroban_data.as_ref()
    }

    pub fn footprint(&self) -> Option<&Footprint> {
        self.soroban_data.as_ref().map(|d| &d.footprint)
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn memo(&self) -> &Memo {
        &self.memo
    }

    pub fn to_xdr(&self) -> Result<xdr::Transaction> {
        let operations: VecM<xdr::Operation, 100> = self
            .operations
            .iter()
            .map(Operation::to_xdr)
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|e| anyhow!("too many operations: {}", e))?;
        let ext = match &self.soroban_data {
            Some(data) => TransactionExt::V1(data.to_xdr()?),
            None => TransactionExt::V0,
        };
        Ok(xdr::Transaction {
            source_account: self.source.to_muxed_account(),
            fee: self.fee,
            seq_num: SequenceNumber(self.sequence),
            cond: Preconditions::Time(TimeBounds {
                min_time: TimePoint(0),
                max_time: TimePoint(self.max_time),
            }),
            memo: self.memo.to_xdr()?,
            operations,
            ext,
        })
    }

    /// Unsigned V1 envelope.
    pub fn to_envelope_xdr(&self) -> Result<TransactionEnvelope> {
        Ok(TransactionEnvelope::Tx(TransactionV1Envelope {
            tx: self.to_xdr()?,
            signatures: VecM::default(),
        }))
    }

    pub fn to_envelope_base64(&self) -> Result<String> {
        let bytes = self
            .to_envelope_xdr()?
            .to_xdr(Limits::none())
            .map_err(|e| anyhow!("Failed to encode transaction envelope: {}", e))?;
        Ok(base64_encode(&bytes))
    }

    /// Hash signers sign over, bound to the network through its passphrase.
    pub fn hash(&self) -> Result<[u8; 32]> {
        let payload = TransactionSignaturePayload {
            network_id: Hash(network_id(&self.network_passphrase)),
            tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(self.to_xdr()?),
        };
        let bytes = payload
            .to_xdr(Limits::none())
            .map_err(|e| anyhow!("Failed to encode signature payload: {}", e))?;
        Ok(Sha256::digest(&bytes).into())
    }
}

/// SHA-256 of the network passphrase.
pub fn network_id(passphrase: &str) -> [u8; 32] {
    Sha256::digest(passphrase.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ContractAddress;
    use stellar_xdr::curr::ReadXdr;

    const PASSPHRASE: &str = "Test SDF Network ; September 2015";

    fn source() -> AccountAddress {
        AccountAddress::from_bytes([1; 32])
    }

    fn draft() -> TransactionBuilder {
        TransactionBuilder::new(source(), 41)
            .set_timeout(30)
            .set_network_passphrase(PASSPHRASE)
            .add_operation(Operation::RestoreFootprint)
    }

    #[test]
    fn test_build_increments_sequence_and_charges_base_fee() {
        let tx = draft().build().unwrap();
        assert_eq!(tx.sequence(), 42);
        assert_eq!(tx.fee(), BASE_FEE);
        assert_eq!(tx.timeout(), 30);
        assert!(tx.max_time() > 30);
        assert_eq!(tx.network_passphrase(), PASSPHRASE);
        assert_eq!(tx.memo(), &Memo::None);
        assert!(tx.footprint().is_none());
    }

    #[test]
    fn test_zero_timeout_has_no_upper_bound() {
        let tx = draft().set_timeout(0).build().unwrap();
        assert_eq!(tx.timeout(), 0);
        assert_eq!(tx.max_time(), 0);
    }

    #[test]
    fn test_snapshots_are_independent() {
        let base = draft();
        let with_memo = base.clone().add_memo(Memo::Id(7));
        let with_extra_op = base.clone().add_operation(Operation::RestoreFootprint);

        assert_eq!(base.build().unwrap().memo(), &Memo::None);
        assert_eq!(with_memo.build().unwrap().memo(), &Memo::Id(7));
        assert_eq!(with_memo.build().unwrap().operations().len(), 1);
        assert_eq!(with_extra_op.build().unwrap().operations().len(), 2);
        assert_eq!(with_extra_op.build().unwrap().fee(), 2 * BASE_FEE);
    }

    #[test]
    fn test_build_errors() {
        let bare = TransactionBuilder::new(source(), 0);
        assert_eq!(bare.build().unwrap_err(), BuildError::MissingTimeout);
        assert_eq!(
            bare.clone().set_timeout(0).build().unwrap_err(),
            BuildError::MissingNetworkPassphrase
        );
        assert_eq!(
            bare.set_timeout(0)
                .set_network_passphrase(PASSPHRASE)
                .build()
                .unwrap_err(),
            BuildError::NoOperations
        );
    }

    #[test]
    fn test_too_many_operations() {
        let mut builder = draft();
        for _ in 0..MAX_OPERATIONS {
            builder = builder.add_operation(Operation::RestoreFootprint);
        }
        assert_eq!(
            builder.build().unwrap_err(),
            BuildError::TooManyOperations {
                count: MAX_OPERATIONS + 1
            }
        );
    }

    #[test]
    fn test_memo_text_limit() {
        let ok = draft().add_memo(Memo::Text("a".repeat(MAX_MEMO_TEXT_LEN)));
        assert!(ok.build().unwrap().to_xdr().is_ok());

        let too_long = draft().add_memo(Memo::Text("a".repeat(MAX_MEMO_TEXT_LEN + 1)));
        assert!(matches!(
            too_long.build(),
            Err(BuildError::InvalidMemo { .. })
        ));
    }

    #[test]
    fn test_resource_fee_added_to_inclusion_fee() {
        let data = SorobanData {
            resource_fee: 5_000,
            ..Default::default()
        };
        let tx = draft().set_soroban_data(data).build().unwrap();
        assert_eq!(tx.fee(), BASE_FEE + 5_000);

        let negative = SorobanData {
            resource_fee: -1,
            ..Default::default()
        };
        assert_eq!(
            draft().set_soroban_data(negative).build().unwrap_err(),
            BuildError::NegativeResourceFee { fee: -1 }
        );

        let huge = SorobanData {
            resource_fee: i64::from(u32::MAX),
            ..Default::default()
        };
        assert_eq!(
            draft().set_soroban_data(huge).build().unwrap_err(),
            BuildError::FeeOverflow
        );
    }

    #[test]
    fn test_set_footprint_keeps_resources() {
        let key = ContractAddress::from_bytes([2; 32]).instance_key();
        let data = SorobanData {
            instructions: 10,
            ..Default::default()
        };
        let tx = draft()
            .set_soroban_data(data)
            .set_footprint(Footprint::read_only([key.clone()]))
            .build()
            .unwrap();
        let data = tx.soroban_data().unwrap();
        assert_eq!(data.instructions, 10);
        assert_eq!(data.footprint.read_only_keys(), &[key]);
    }

    #[test]
    fn test_from_transaction_rebuilds_same_sequence() {
        let tx = draft().add_memo(Memo::Id(3)).build().unwrap();
        let rebuilt = TransactionBuilder::from_transaction(&tx).build().unwrap();
        assert_eq!(rebuilt.sequence(), tx.sequence());
        assert_eq!(rebuilt.operations(), tx.operations());
        assert_eq!(rebuilt.memo(), tx.memo());
        assert_eq!(rebuilt.network_passphrase(), tx.network_passphrase());
    }

    #[test]
    fn test_envelope_decodes() {
        let account = AccountAddress::from_bytes([8; 32]);
        let tx = draft()
            .add_operation(Operation::BumpSequence {
                source: Some(account),
                bump_to: 10,
            })
            .add_memo(Memo::Hash(*account.as_bytes()))
            .set_footprint(Footprint::read_write([
                ContractAddress::from_bytes([2; 32]).instance_key()
            ]))
            .build()
            .unwrap();

        let b64 = tx.to_envelope_base64().unwrap();
        let bytes = crate::encoding::base64_decode(&b64, "envelope").unwrap();
        let envelope = TransactionEnvelope::from_xdr(bytes, Limits::none()).unwrap();
        let TransactionEnvelope::Tx(v1) = envelope else {
            panic!("expected a v1 envelope");
        };
        assert!(v1.signatures.is_empty());
        assert_eq!(v1.tx.seq_num, SequenceNumber(42));
        assert_eq!(v1.tx.operations.len(), 2);
        assert_eq!(v1.tx.memo, xdr::Memo::Hash(Hash([8; 32])));
        assert!(matches!(v1.tx.ext, TransactionExt::V1(_)));
    }

    #[test]
    fn test_hash_depends_on_network() {
        let tx = draft().set_timeout(0).build().unwrap();
        let other = draft()
            .set_timeout(0)
            .set_network_passphrase("Test SDF Future Network ; October 2022")
            .build()
            .unwrap();
        assert_eq!(tx.hash().unwrap(), tx.hash().unwrap());
        assert_ne!(tx.hash().unwrap(), other.hash().unwrap());
    }

    #[test]
    fn test_network_id_is_sha256_of_passphrase() {
        assert_eq!(
            crate::encoding::bytes_to_hex(&network_id(PASSPHRASE)),
            "cee0302d59844d32bdca915c8203dd44b33fbb7edc19051ea37abedf28ecd472"
        );
    }
}
