//! Soroban Spec
//!
//! Contract interface spec decoding for Soroban contracts.
//!
//! A contract's interface is embedded in its Wasm as a custom section holding
//! back-to-back XDR `ScSpecEntry` values. This crate splits such a buffer into
//! entries and renders them for display.
//!
//! # Example
//!
//! ```ignore
//! use soroban_spec::{decode_spec_buffer, summary::summarize_all};
//!
//! let entries = decode_spec_buffer(&section_bytes);
//! for s in summarize_all(&entries) {
//!     println!("{}", s.signature());
//! }
//! ```

pub mod decoder;
pub mod summary;

pub use decoder::{
    decode_spec_buffer, DecodeMode, DecodedSpec, SpecDecodeError, SpecDecoder, SpecEntry,
};
pub use summary::{summarize, summarize_all, SpecEntrySummary};
