//! Encoding utilities for XDR, base64 and hex.
//!
//! Provides shared encoding/decoding functions used across workspace crates.
//! RPC payloads carry XDR values as standard base64, so most call sites go
//! through [`xdr_to_base64`] / [`xdr_from_base64`].

use anyhow::{anyhow, Result};
use stellar_xdr::curr::{Limits, ReadXdr, WriteXdr};

// =============================================================================
// Base64 Encoding/Decoding
// =============================================================================

/// Encode bytes to base64 string.
pub fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode base64 string to bytes with context-aware error message.
///
/// # Arguments
/// * `b64` - Base64 encoded string
/// * `context` - Description for error messages (e.g., "transaction data", "ledger entry")
pub fn base64_decode(b64: &str, context: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| anyhow!("Failed to decode {} from base64: {}", context, e))
}

// =============================================================================
// XDR
// =============================================================================

/// Serialize an XDR value and encode it as base64.
pub fn xdr_to_base64<T: WriteXdr>(value: &T, context: &str) -> Result<String> {
    let bytes = value
        .to_xdr(Limits::none())
        .map_err(|e| anyhow!("Failed to encode {} as XDR: {}", context, e))?;
    Ok(base64_encode(&bytes))
}

/// Decode a base64 string into an XDR value, requiring every byte be consumed.
pub fn xdr_from_base64<T: ReadXdr>(b64: &str, context: &str) -> Result<T> {
    let bytes = base64_decode(b64, context)?;
    T::from_xdr(bytes, Limits::none())
        .map_err(|e| anyhow!("Failed to decode {} from XDR: {}", context, e))
}

// =============================================================================
// Hex
// =============================================================================

/// Format bytes as lowercase hex without prefix.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
