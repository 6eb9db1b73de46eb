//! Soroban Transport Layer
//!
//! Network access for Soroban contract tooling.
//!
//! This crate provides:
//! - [`client`]: the [`NetworkClient`] capability the lifecycle builders depend on
//! - [`rpc`]: [`RpcClient`], a JSON-RPC implementation against a Soroban RPC node
//! - [`network`]: the network tag table (passphrases and default endpoints)
//!
//! # Example
//!
//! ```ignore
//! use soroban_transport::{NetworkClient, NetworkTag, RpcClient};
//!
//! let client = RpcClient::for_network(NetworkTag::Testnet);
//! let info = client.get_network().await?;
//! println!("{}", info.passphrase);
//! ```

pub mod client;
pub mod network;
pub mod rpc;

pub use client::{AccountEntry, ContractDataEntry, NetworkClient, NetworkInfo};
pub use network::{
    infer_network_from_url, network_details, resolve_rpc_endpoint, NetworkDetails, NetworkTag,
};
pub use rpc::{LedgerEntryResult, RpcClient};
