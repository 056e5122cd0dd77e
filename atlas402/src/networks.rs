//! The fixed table of supported settlement networks.
//!
//! Exactly two networks are supported: Base (EVM) and Solana mainnet. Each
//! maps to a scheme, a USDC deployment, optional EIP-712 domain metadata,
//! and a default public RPC endpoint. This is a closed enumeration on
//! purpose: supporting another network is a code change here, not a plugin
//! point.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::scheme::Scheme;

/// USDC deployment on Base.
pub const USDC_BASE: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

/// USDC mint on Solana mainnet (legacy token program).
pub const USDC_SOLANA: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// A settlement network this gateway can charge on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Base mainnet (`"base"`).
    Base,
    /// Solana mainnet (`"solana-mainnet"`).
    SolanaMainnet,
}

impl Network {
    /// Returns the wire name of this network.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::SolanaMainnet => "solana-mainnet",
        }
    }

    /// Returns the payment scheme used on this network.
    #[must_use]
    pub const fn scheme(self) -> Scheme {
        match self {
            Self::Base => Scheme::Eip712,
            Self::SolanaMainnet => Scheme::Solana,
        }
    }

    /// Returns the USDC asset address charged on this network.
    #[must_use]
    pub const fn asset(self) -> &'static str {
        match self {
            Self::Base => USDC_BASE,
            Self::SolanaMainnet => USDC_SOLANA,
        }
    }

    /// Returns scheme-specific requirement metadata.
    ///
    /// On Base this is the EIP-712 signature domain of the USDC contract;
    /// Solana requirements carry none.
    #[must_use]
    pub fn extra(self) -> Option<serde_json::Value> {
        match self {
            Self::Base => Some(serde_json::json!({
                "name": "USDC",
                "version": "2",
            })),
            Self::SolanaMainnet => None,
        }
    }

    /// Returns the public RPC endpoint used when no override is configured.
    #[must_use]
    pub const fn default_rpc_url(self) -> &'static str {
        match self {
            Self::Base => "https://mainnet.base.org",
            Self::SolanaMainnet => "https://api.mainnet-beta.solana.com",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a network name outside the supported table.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown network: {0}")]
pub struct UnknownNetworkError(pub String);

impl FromStr for Network {
    type Err = UnknownNetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(Self::Base),
            "solana-mainnet" => Ok(Self::SolanaMainnet),
            other => Err(UnknownNetworkError(other.to_owned())),
        }
    }
}

impl Serialize for Network {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
