//! Environment variable parsing utilities.
//!
//! Endpoint and timeout overrides across the workspace are read through these
//! helpers so that the parse-or-default pattern lives in one place:
//!
//! ```ignore
//! std::env::var("VAR_NAME")
//!     .ok()
//!     .and_then(|v| v.parse::<u64>().ok())
//!     .unwrap_or(default_value)
//! ```
//!
//! # Example
//!
//! ```
//! use soroban_toolkit_types::env_utils::{env_var, env_var_or};
//!
//! let timeout: u64 = env_var_or("SOROBAN_RPC_TIMEOUT_SECS", 30);
//! let custom: Option<u64> = env_var("CUSTOM_VALUE");
//! ```

use std::str::FromStr;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Parse an environment variable with a default value.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Read a string variable, treating unset and blank values as absent.
///
/// # Example
///
/// ```
/// use soroban_toolkit_types::env_utils::env_nonempty;
///
/// assert_eq!(env_nonempty("SOROBAN_TOOLKIT_UNSET_VAR_1"), None);
/// ```
pub fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Check if an environment variable is set to a truthy value.
///
/// Returns `true` if the variable is set to "1", "true", "yes", or "on" (case-insensitive).
pub fn env_bool(key: &str) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
