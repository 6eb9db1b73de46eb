//! Shared types for the soroban-toolkit workspace.
//!
//! This crate provides the ledger-facing vocabulary used by the spec decoder,
//! the network transport and the lifecycle transaction builder:
//!
//! - [`address`]: contract (`C...`) and account (`G...`) addresses
//! - [`ledger`]: durability, ledger keys and [`Footprint`]
//! - [`transaction`]: the immutable [`TransactionBuilder`] and [`Transaction`]
//! - [`simulation`]: [`SimulationResult`] and [`assemble_transaction`]

pub mod address;
pub mod encoding;
pub mod env_utils;
pub mod ledger;
pub mod simulation;
pub mod transaction;

pub use address::{AccountAddress, AddressError, ContractAddress};
pub use ledger::{contract_code_key, contract_data_key, Durability, Footprint};
pub use simulation::{assemble_transaction, RestorePreamble, SimulationCost, SimulationResult};
pub use transaction::{
    BuildError, Memo, Operation, SorobanData, Transaction, TransactionBuilder, BASE_FEE,
};

// The XDR vocabulary is part of the public surface (ledger keys, spec entries).
pub use stellar_xdr;
