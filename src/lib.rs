//! Soroban Toolkit
//!
//! Contract tooling for Soroban:
//!
//! - **Spec decoding**: split a contract's embedded interface spec into entries
//! - **Lifecycle transactions**: unsigned "restore footprint" and "extend
//!   instance TTL" transactions, prepared against an RPC node
//! - **Network configuration**: passphrase and RPC endpoint per network tag
//!
//! See [`lifecycle`] for the transaction builders and [`soroban_spec`] for the
//! decoder.

pub mod lifecycle;

pub use lifecycle::{prepare_expiration_bump, prepare_restore, LifecycleError};

pub use soroban_spec;
pub use soroban_toolkit_types;
pub use soroban_transport;
