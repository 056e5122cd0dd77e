//! Payment scheme identifiers.
//!
//! A scheme names both a settlement network family and the proof format its
//! verification strategy expects. Two schemes are recognized; anything else
//! is carried verbatim so that foreign challenges still round-trip and an
//! unsupported scheme can be reported as a verification verdict rather than
//! a parse failure.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Identifier of a proof format and its verification strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// EVM-family scheme; proofs carry a transaction hash (`"x402+eip712"`).
    Eip712,
    /// Solana-family scheme; proofs carry a transaction signature (`"x402+solana"`).
    Solana,
    /// Any scheme this implementation does not verify itself.
    Other(String),
}

impl Scheme {
    /// Wire name of the EVM-family scheme.
    pub const EIP712: &'static str = "x402+eip712";
    /// Wire name of the Solana-family scheme.
    pub const SOLANA: &'static str = "x402+solana";

    /// Returns the wire representation of this scheme.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Eip712 => Self::EIP712,
            Self::Solana => Self::SOLANA,
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            Self::EIP712 => Self::Eip712,
            Self::SOLANA => Self::Solana,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl Serialize for Scheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Scheme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            Self::EIP712 => Self::Eip712,
            Self::SOLANA => Self::Solana,
            _ => Self::Other(s),
        })
    }
}
