//! Network tags and their fixed passphrase / RPC endpoint table.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use soroban_toolkit_types::env_utils::env_nonempty;

const MAINNET_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";
const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
const FUTURENET_PASSPHRASE: &str = "Test SDF Future Network ; October 2022";

const MAINNET_RPC: &str = "https://rpc-mainnet.stellar.org/";
const TESTNET_RPC: &str = "https://soroban-testnet.stellar.org/";
const FUTURENET_RPC: &str = "https://rpc-futurenet.stellar.org/";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkTag {
    Mainnet,
    Testnet,
    #[default]
    Futurenet,
}

impl NetworkTag {
    pub const ALL: [NetworkTag; 3] = [Self::Mainnet, Self::Testnet, Self::Futurenet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Futurenet => "futurenet",
        }
    }

    /// Parse a tag, falling back to futurenet for anything unrecognized.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for NetworkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "public" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "futurenet" => Ok(Self::Futurenet),
            other => Err(anyhow::anyhow!(
                "unknown network '{}' (expected mainnet, testnet or futurenet)",
                other
            )),
        }
    }
}

/// Everything needed to talk to one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkDetails {
    pub network: NetworkTag,
    pub rpc_url: String,
    pub passphrase: String,
}

pub fn network_details(tag: NetworkTag) -> NetworkDetails {
    NetworkDetails {
        network: tag,
        rpc_url: default_rpc_endpoint(tag).to_string(),
        passphrase: passphrase(tag).to_string(),
    }
}

pub fn passphrase(tag: NetworkTag) -> &'static str {
    match tag {
        NetworkTag::Mainnet => MAINNET_PASSPHRASE,
        NetworkTag::Testnet => TESTNET_PASSPHRASE,
        NetworkTag::Futurenet => FUTURENET_PASSPHRASE,
    }
}

pub fn default_rpc_endpoint(tag: NetworkTag) -> &'static str {
    match tag {
        NetworkTag::Mainnet => MAINNET_RPC,
        NetworkTag::Testnet => TESTNET_RPC,
        NetworkTag::Futurenet => FUTURENET_RPC,
    }
}

pub fn infer_network_from_url(url: &str) -> Option<NetworkTag> {
    let lower = url.to_lowercase();
    if lower.contains("testnet") {
        Some(NetworkTag::Testnet)
    } else if lower.contains("futurenet") {
        Some(NetworkTag::Futurenet)
    } else if lower.contains("mainnet") || lower.contains("public") {
        Some(NetworkTag::Mainnet)
    } else {
        None
    }
}

/// RPC endpoint for `tag`, unless `SOROBAN_RPC_URL` overrides it.
pub fn resolve_rpc_endpoint(tag: NetworkTag) -> String {
    if let Some(url) = env_nonempty("SOROBAN_RPC_URL") {
        if let Some(inferred) = infer_network_from_url(&url) {
            if inferred != tag {
                tracing::warn!(
                    url = %url,
                    network = %tag,
                    "SOROBAN_RPC_URL looks like a different network"
                );
            }
        }
        return url;
    }
    default_rpc_endpoint(tag).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_default() {
        assert_eq!(NetworkTag::parse_or_default("mainnet"), NetworkTag::Mainnet);
        assert_eq!(NetworkTag::parse_or_default("TESTNET"), NetworkTag::Testnet);
        assert_eq!(NetworkTag::parse_or_default("futurenet"), NetworkTag::Futurenet);
        assert_eq!(NetworkTag::parse_or_default("standalone"), NetworkTag::Futurenet);
        assert_eq!(NetworkTag::parse_or_default(""), NetworkTag::Futurenet);
    }

    #[test]
    fn test_from_str_is_strict() {
        assert!("standalone".parse::<NetworkTag>().is_err());
        assert_eq!("public".parse::<NetworkTag>().unwrap(), NetworkTag::Mainnet);
    }

    #[test]
    fn test_network_details_table() {
        let main = network_details(NetworkTag::Mainnet);
        assert_eq!(main.passphrase, "Public Global Stellar Network ; September 2015");
        assert_eq!(main.rpc_url, "https://rpc-mainnet.stellar.org/");

        let test = network_details(NetworkTag::Testnet);
        assert_eq!(test.passphrase, "Test SDF Network ; September 2015");

        let default = network_details(NetworkTag::default());
        assert_eq!(default.network, NetworkTag::Futurenet);
        assert_eq!(default.passphrase, "Test SDF Future Network ; October 2022");
        assert_eq!(default.rpc_url, "https://rpc-futurenet.stellar.org/");
    }

    #[test]
    fn test_infer_network_from_url() {
        assert_eq!(
            infer_network_from_url("https://soroban-testnet.stellar.org"),
            Some(NetworkTag::Testnet)
        );
        assert_eq!(
            infer_network_from_url("https://rpc-futurenet.stellar.org/"),
            Some(NetworkTag::Futurenet)
        );
        assert_eq!(infer_network_from_url("http://localhost:8000/rpc"), None);
    }

    #[test]
    fn test_tags_round_trip_through_display() {
        for tag in NetworkTag::ALL {
            assert_eq!(tag.to_string().parse::<NetworkTag>().unwrap(), tag);
        }
    }

    #[test]
    fn test_resolve_rpc_endpoint_override() {
        std::env::set_var("SOROBAN_RPC_URL", "http://localhost:8000/soroban/rpc");
        let url = resolve_rpc_endpoint(NetworkTag::Mainnet);
        std::env::remove_var("SOROBAN_RPC_URL");
        assert_eq!(url, "http://localhost:8000/soroban/rpc");
    }
}
