//! Greedy minimal-length decoding of contract spec buffers.
//!
//! A spec buffer is a concatenation of XDR-encoded `ScSpecEntry` values with
//! no framing between them. Entry boundaries are found by probing: at each
//! offset, candidate lengths `1, 2, 3, ...` are tried until the XDR reader
//! accepts a complete entry that consumes every probed byte. Decoding stops at
//! the first offset where no candidate succeeds.
//!
//! Probing is quadratic in the worst case, which is fine for spec buffers
//! (tens of entries). [`SpecDecoder::with_max_entry_len`] bounds the probe
//! length when inputs are less trusted.

use std::fmt;

use soroban_toolkit_types::env_utils::{env_bool, env_var};
use stellar_xdr::curr::{Limits, ReadXdr, ScSpecEntry};

/// Nesting depth allowed while probing a single entry.
const PROBE_DEPTH_LIMIT: u32 = 500;

/// A decoded entry and the number of bytes it occupied in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecEntry {
    pub entry: ScSpecEntry,
    pub len: usize,
}

/// Result of decoding a buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedSpec {
    /// Entries in buffer order.
    pub entries: Vec<SpecEntry>,
    /// Bytes covered by `entries`.
    pub consumed: usize,
    /// Bytes of undecodable tail that were dropped.
    pub discarded: usize,
}

impl DecodedSpec {
    pub fn is_complete(&self) -> bool {
        self.discarded == 0
    }

    pub fn into_entries(self) -> Vec<ScSpecEntry> {
        self.entries.into_iter().map(|e| e.entry).collect()
    }
}

/// What to do with a tail that does not decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeMode {
    /// Return the entries decoded so far and drop the tail.
    #[default]
    Lenient,
    /// Fail with [`SpecDecodeError::UndecodableTail`].
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecDecodeError {
    UndecodableTail {
        /// Offset of the first byte that could not be decoded.
        offset: usize,
        /// Bytes left from `offset` to the end of the buffer.
        remaining: usize,
        /// Entries successfully decoded before `offset`.
        decoded: usize,
    },
}

impl fmt::Display for SpecDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecDecodeError::UndecodableTail {
                offset,
                remaining,
                decoded,
            } => write!(
                f,
                "no spec entry decodes at offset {} ({} bytes remaining, {} entries decoded)",
                offset, remaining, decoded
            ),
        }
    }
}

impl std::error::Error for SpecDecodeError {}

/// Configurable spec buffer decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecDecoder {
    mode: DecodeMode,
    max_entry_len: Option<usize>,
}

impl SpecDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder configured from the environment.
    ///
    /// - `SOROBAN_SPEC_STRICT` - truthy selects [`DecodeMode::Strict`]
    /// - `SOROBAN_SPEC_MAX_ENTRY_LEN` - probe length cap in bytes
    pub fn from_env() -> Self {
        let mode = if env_bool("SOROBAN_SPEC_STRICT") {
            DecodeMode::Strict
        } else {
            DecodeMode::Lenient
        };
        Self {
            mode,
            max_entry_len: env_var("SOROBAN_SPEC_MAX_ENTRY_LEN"),
        }
    }

    pub fn with_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Never probe candidate lengths above `max`. Entries longer than the cap
    /// are treated as undecodable.
    pub fn with_max_entry_len(mut self, max: usize) -> Self {
        self.max_entry_len = Some(max);
        self
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    pub fn max_entry_len(&self) -> Option<usize> {
        self.max_entry_len
    }

    pub fn decode(&self, buffer: &[u8]) -> Result<DecodedSpec, SpecDecodeError> {
        let mut entries = Vec::new();
        let mut offset = 0;

        while offset < buffer.len() {
            match probe_entry(&buffer[offset..], self.max_entry_len) {
                Some(entry) => {
                    offset += entry.len;
                    entries.push(entry);
                }
                None => {
                    let remaining = buffer.len() - offset;
                    tracing::debug!(
                        offset,
                        remaining,
                        decoded = entries.len(),
                        "spec buffer tail does not decode"
                    );
                    if self.mode == DecodeMode::Strict {
                        return Err(SpecDecodeError::UndecodableTail {
                            offset,
                            remaining,
                            decoded: entries.len(),
                        });
                    }
                    break;
                }
            }
        }

        Ok(DecodedSpec {
            entries,
            consumed: offset,
            discarded: buffer.len() - offset,
        })
    }
}

/// Decode a spec buffer, silently dropping any undecodable tail.
pub fn decode_spec_buffer(buffer: &[u8]) -> Vec<ScSpecEntry> {
    SpecDecoder::new()
        .decode(buffer)
        .map(DecodedSpec::into_entries)
        .unwrap_or_default()
}

/// Find the shortest prefix of `bytes` that is exactly one entry.
fn probe_entry(bytes: &[u8], max_len: Option<usize>) -> Option<SpecEntry> {
    let upper = max_len.map_or(bytes.len(), |max| max.min(bytes.len()));
    (1..=upper).find_map(|len| {
        ScSpecEntry::from_xdr(&bytes[..len], Limits::depth(PROBE_DEPTH_LIMIT))
            .ok()
            .map(|entry| SpecEntry { entry, len })
    })
}
