//! Gateway configuration.
//!
//! A [`GatewayConfig`] is constructed once at startup and never mutated; it
//! is safe to share across concurrent request handlers behind an `Arc`.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use url::Url;

use crate::networks::{Network, UnknownNetworkError};

/// Micro-units per whole unit of the payment currency.
const MICRO_UNITS: u32 = 1_000_000;

/// Largest whole-unit price accepted, to keep the micro-unit amount in `u64`.
const MAX_PRICE: u64 = 1_000_000_000_000;

/// Error constructing a [`GatewayConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
    /// The price string is not a non-negative decimal amount.
    #[error("invalid price: {0:?}")]
    InvalidPrice(String),
    /// The configured network is outside the supported table.
    #[error(transparent)]
    UnknownNetwork(#[from] UnknownNetworkError),
    /// A configured URL failed to parse.
    #[error("invalid URL in {var}: {source}")]
    UrlParse {
        /// The offending environment variable or setting.
        var: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// The configured timeout is not a number of seconds.
    #[error("invalid timeout: {0:?}")]
    InvalidTimeout(String),
}

/// Process-wide gateway settings, read-only per request.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Facilitator base URL; when set, verification is delegated entirely.
    pub facilitator_url: Option<Url>,
    /// The settlement network this gateway charges on.
    pub network: Network,
    /// Merchant payout address.
    pub pay_to: String,
    /// JSON-RPC endpoint override for direct verification.
    pub rpc_url: Option<Url>,
    /// `maxTimeoutSeconds` advertised in challenges.
    pub max_timeout_seconds: u64,
    price: Decimal,
}

impl GatewayConfig {
    /// Default `maxTimeoutSeconds` advertised in challenges.
    pub const DEFAULT_MAX_TIMEOUT_SECONDS: u64 = 300;

    /// Creates a configuration with the given network, payout address, and
    /// whole-unit price (`"1.00"`; a leading `$` is accepted).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrice`] if the price does not parse as
    /// a non-negative decimal within range.
    pub fn new(
        network: Network,
        pay_to: impl Into<String>,
        price: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            facilitator_url: None,
            network,
            pay_to: pay_to.into(),
            rpc_url: None,
            max_timeout_seconds: Self::DEFAULT_MAX_TIMEOUT_SECONDS,
            price: parse_price(price)?,
        })
    }

    /// Sets the facilitator base URL.
    #[must_use]
    pub fn with_facilitator_url(mut self, url: Url) -> Self {
        self.facilitator_url = Some(url);
        self
    }

    /// Sets the JSON-RPC endpoint override for direct verification.
    #[must_use]
    pub fn with_rpc_url(mut self, url: Url) -> Self {
        self.rpc_url = Some(url);
        self
    }

    /// Sets the `maxTimeoutSeconds` advertised in challenges.
    #[must_use]
    pub const fn with_max_timeout_seconds(mut self, seconds: u64) -> Self {
        self.max_timeout_seconds = seconds;
        self
    }

    /// Reads configuration from `X402_*` environment variables.
    ///
    /// `X402_PAY_TO` is required. `X402_NETWORK` defaults to `base`,
    /// `X402_PRICE` to `1.00`; `X402_FACILITATOR_URL`, `X402_RPC_URL`, and
    /// `X402_MAX_TIMEOUT_SECONDS` are optional.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or any
    /// value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let network = match std::env::var("X402_NETWORK") {
            Ok(name) => name.parse::<Network>()?,
            Err(_) => Network::Base,
        };
        let pay_to =
            std::env::var("X402_PAY_TO").map_err(|_| ConfigError::MissingEnv("X402_PAY_TO"))?;
        let price = std::env::var("X402_PRICE").unwrap_or_else(|_| "1.00".to_owned());

        let mut config = Self::new(network, pay_to, &price)?;
        if let Ok(raw) = std::env::var("X402_FACILITATOR_URL") {
            let url = Url::parse(&raw).map_err(|source| ConfigError::UrlParse {
                var: "X402_FACILITATOR_URL",
                source,
            })?;
            config = config.with_facilitator_url(url);
        }
        if let Ok(raw) = std::env::var("X402_RPC_URL") {
            let url = Url::parse(&raw).map_err(|source| ConfigError::UrlParse {
                var: "X402_RPC_URL",
                source,
            })?;
            config = config.with_rpc_url(url);
        }
        if let Ok(raw) = std::env::var("X402_MAX_TIMEOUT_SECONDS") {
            let seconds = raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw))?;
            config = config.with_max_timeout_seconds(seconds);
        }
        Ok(config)
    }

    /// Returns the configured whole-unit price.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Returns the advertised amount: the price in micro-units, rounded to
    /// an integer string.
    #[must_use]
    pub fn max_amount_required(&self) -> String {
        let micro = (self.price * Decimal::from(MICRO_UNITS)).round();
        micro.to_u64().unwrap_or_default().to_string()
    }
}

/// Parses a whole-unit price string, accepting an optional leading `$`.
fn parse_price(raw: &str) -> Result<Decimal, ConfigError> {
    let trimmed = raw.trim().trim_start_matches('$');
    let price = trimmed
        .parse::<Decimal>()
        .map_err(|_| ConfigError::InvalidPrice(raw.to_owned()))?;
    if price.is_sign_negative() || price > Decimal::from(MAX_PRICE) {
        return Err(ConfigError::InvalidPrice(raw.to_owned()));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_converts_to_micro_units() {
        let config = GatewayConfig::new(Network::Base, "0xmerchant", "1.00").unwrap();
        assert_eq!(config.max_amount_required(), "1000000");

        let config = GatewayConfig::new(Network::Base, "0xmerchant", "$0.10").unwrap();
        assert_eq!(config.max_amount_required(), "100000");

        let config = GatewayConfig::new(Network::Base, "0xmerchant", "12.345678").unwrap();
        assert_eq!(config.max_amount_required(), "12345678");
    }

    #[test]
    fn fractional_micro_units_round() {
        let config = GatewayConfig::new(Network::Base, "0xmerchant", "0.0000015").unwrap();
        assert_eq!(config.max_amount_required(), "2");
    }

    #[test]
    fn bad_prices_are_rejected() {
        assert!(GatewayConfig::new(Network::Base, "0xmerchant", "free").is_err());
        assert!(GatewayConfig::new(Network::Base, "0xmerchant", "-1").is_err());
    }

    #[test]
    fn defaults() {
        let config = GatewayConfig::new(Network::SolanaMainnet, "merchant", "1.00").unwrap();
        assert!(config.facilitator_url.is_none());
        assert!(config.rpc_url.is_none());
        assert_eq!(
            config.max_timeout_seconds,
            GatewayConfig::DEFAULT_MAX_TIMEOUT_SECONDS
        );
    }
}
