//! Multi-strategy payment verification.
//!
//! [`PaymentVerifier`] checks a payment proof one of three ways, picked by
//! [`select_strategy`] in priority order:
//!
//! 1. **Delegate** — a facilitator URL is configured: forward the proof to
//!    `POST <facilitator>/verify` and relay its verdict. Transport failures
//!    on this path are hard errors, not rejections.
//! 2. **Evm** — no facilitator, EVM-family scheme: fetch the transaction
//!    receipt over JSON-RPC and require a success status.
//! 3. **Solana** — no facilitator, Solana-family scheme: fetch the
//!    transaction and require an error-free meta.
//!
//! Any other scheme is rejected with an `Unsupported scheme` verdict. The
//! dispatch is a priority chain, not a fallback chain: exactly one strategy
//! runs per verification, and nothing is retried.

pub(crate) mod evm;
mod facilitator;
pub(crate) mod solana;

use http::StatusCode;
use url::Url;

use atlas402::config::GatewayConfig;
use atlas402::proto::{CodecError, EvmProof, SolanaProof, VerificationResult};
use atlas402::scheme::Scheme;
use atlas402::verify::{BoxFuture, Verifier};
use atlas402::{PaymentPayload, PaymentRequirements};

use crate::constants::VERIFY_TIMEOUT;

/// Errors that can occur while attempting verification.
///
/// These surface only from the delegation path (and from constructing the
/// verifier): once a direct RPC call has been attempted, its failures are
/// folded into the verdict instead.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    /// URL construction failed.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// HTTP transport error.
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The peer answered with JSON that is not a verdict.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The peer answered with an unexpected HTTP status.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Human-readable context.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },
    /// The payment payload could not be re-encoded for delegation.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// The strategy chosen for one verification, a pure function of whether a
/// facilitator is configured and which scheme the requirement names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Forward the proof to the configured facilitator.
    Delegate,
    /// Inspect the transaction receipt directly over EVM JSON-RPC.
    Evm,
    /// Inspect the transaction directly over Solana JSON-RPC.
    Solana,
    /// No strategy can check this scheme.
    Unsupported,
}

/// Picks the verification strategy. First match wins; delegation always
/// takes priority when a facilitator is configured.
#[must_use]
pub fn select_strategy(facilitator_configured: bool, scheme: &Scheme) -> Strategy {
    if facilitator_configured {
        return Strategy::Delegate;
    }
    match scheme {
        Scheme::Eip712 => Strategy::Evm,
        Scheme::Solana => Strategy::Solana,
        Scheme::Other(_) => Strategy::Unsupported,
    }
}

/// Verifies payment proofs by delegation or direct chain inspection.
///
/// Holds the shared HTTP transport (bounded by a 30-second timeout) so the
/// whole verifier can be exercised against fake endpoints in tests.
#[derive(Debug, Clone)]
pub struct PaymentVerifier {
    http: reqwest::Client,
    verify_url: Option<Url>,
    rpc_url: Option<Url>,
}

impl PaymentVerifier {
    /// Creates a verifier with no facilitator and no RPC override: EVM and
    /// Solana proofs are checked against the public default endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError::Http`] if the HTTP client cannot be built.
    pub fn try_new() -> Result<Self, VerifierError> {
        let http = reqwest::Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .map_err(|source| VerifierError::Http {
                context: "build HTTP client",
                source,
            })?;
        Ok(Self {
            http,
            verify_url: None,
            rpc_url: None,
        })
    }

    /// Builds a verifier from gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError`] if the HTTP client cannot be built or the
    /// facilitator verify endpoint cannot be derived.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, VerifierError> {
        let mut verifier = Self::try_new()?;
        if let Some(base) = &config.facilitator_url {
            verifier = verifier.with_facilitator_url(base)?;
        }
        if let Some(rpc) = &config.rpc_url {
            verifier = verifier.with_rpc_url(rpc.clone());
        }
        Ok(verifier)
    }

    /// Configures delegation to the facilitator at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError::UrlParse`] if the `./verify` endpoint cannot
    /// be derived from the base URL.
    pub fn with_facilitator_url(mut self, base: &Url) -> Result<Self, VerifierError> {
        self.verify_url = Some(verify_endpoint(base)?);
        Ok(self)
    }

    /// Overrides the JSON-RPC endpoint used for direct verification.
    #[must_use]
    pub fn with_rpc_url(mut self, url: Url) -> Self {
        self.rpc_url = Some(url);
        self
    }

    /// Replaces the HTTP transport, e.g. with a preconfigured test client.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Returns the facilitator `/verify` endpoint, if delegation is configured.
    #[must_use]
    pub const fn verify_url(&self) -> Option<&Url> {
        self.verify_url.as_ref()
    }

    /// Verifies `payload` against `requirements` using the selected strategy.
    ///
    /// Direct-path RPC failures come back as `Ok(Invalid { .. })` verdicts:
    /// once a verification attempt was genuinely made, its outcome is
    /// reported rather than thrown. Only the delegation path can fail with
    /// an `Err`, because there the proof was never examined at all.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError`] if the facilitator cannot be reached or
    /// answers with something other than a verdict.
    pub async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<VerificationResult, VerifierError> {
        match select_strategy(self.verify_url.is_some(), &requirements.scheme) {
            Strategy::Delegate => {
                let url = self
                    .verify_url
                    .as_ref()
                    .expect("delegation selected only when a facilitator is configured");
                facilitator::delegate(&self.http, url, payload, requirements).await
            }
            Strategy::Evm => Ok(evm::verify_receipt(
                &self.http,
                &EvmProof::decode(&payload.payload),
                &requirements.network,
                self.rpc_url.as_ref(),
            )
            .await),
            Strategy::Solana => Ok(solana::verify_signature(
                &self.http,
                &SolanaProof::decode(&payload.payload),
                self.rpc_url.as_ref(),
            )
            .await),
            Strategy::Unsupported => Ok(VerificationResult::invalid(format!(
                "Unsupported scheme: {}",
                requirements.scheme
            ))),
        }
    }
}

impl Verifier for PaymentVerifier {
    type Error = VerifierError;

    fn verify<'a>(
        &'a self,
        payload: &'a PaymentPayload,
        requirements: &'a PaymentRequirements,
    ) -> BoxFuture<'a, Result<VerificationResult, VerifierError>> {
        Box::pin(PaymentVerifier::verify(self, payload, requirements))
    }
}

/// Derives the `/verify` endpoint from a facilitator base URL, tolerating a
/// missing or present trailing slash.
fn verify_endpoint(base: &Url) -> Result<Url, VerifierError> {
    let mut normalized = base.as_str().trim_end_matches('/').to_owned();
    normalized.push('/');
    let normalized = Url::parse(&normalized).map_err(|source| VerifierError::UrlParse {
        context: "normalize facilitator base URL",
        source,
    })?;
    normalized
        .join("./verify")
        .map_err(|source| VerifierError::UrlParse {
            context: "construct ./verify URL",
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas402::proto::V1;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> PaymentPayload {
        PaymentPayload {
            x402_version: V1,
            scheme: Scheme::Eip712,
            network: "base".to_owned(),
            payload: serde_json::json!({"transactionHash": "0xabc"}),
        }
    }

    fn requirements(scheme: Scheme) -> PaymentRequirements {
        PaymentRequirements {
            scheme,
            network: "base".to_owned(),
            max_amount_required: "10000000".to_owned(),
            resource: "/premium/content".to_owned(),
            description: "Payment required for /premium/content".to_owned(),
            mime_type: "application/json".to_owned(),
            pay_to: "0x8bee703d6214a266e245b0537085b1021e1ccaed".to_owned(),
            max_timeout_seconds: 300,
            asset: atlas402::networks::USDC_BASE.to_owned(),
            extra: None,
        }
    }

    #[test]
    fn strategy_is_a_priority_chain() {
        // A configured facilitator wins regardless of scheme.
        for scheme in [
            Scheme::Eip712,
            Scheme::Solana,
            Scheme::Other("x402+sui".to_owned()),
        ] {
            assert_eq!(select_strategy(true, &scheme), Strategy::Delegate);
        }
        assert_eq!(select_strategy(false, &Scheme::Eip712), Strategy::Evm);
        assert_eq!(select_strategy(false, &Scheme::Solana), Strategy::Solana);
        assert_eq!(
            select_strategy(false, &Scheme::Other("x402+sui".to_owned())),
            Strategy::Unsupported
        );
    }

    #[test]
    fn verify_endpoint_tolerates_trailing_slash() {
        let with = Url::parse("https://facilitator.example/").unwrap();
        let without = Url::parse("https://facilitator.example").unwrap();
        assert_eq!(
            verify_endpoint(&with).unwrap().as_str(),
            "https://facilitator.example/verify"
        );
        assert_eq!(
            verify_endpoint(&without).unwrap().as_str(),
            "https://facilitator.example/verify"
        );

        let nested = Url::parse("https://facilitator.example/api").unwrap();
        assert_eq!(
            verify_endpoint(&nested).unwrap().as_str(),
            "https://facilitator.example/api/verify"
        );
    }

    #[tokio::test]
    async fn unsupported_scheme_is_a_verdict_not_an_error() {
        let verifier = PaymentVerifier::try_new().unwrap();
        let verdict = verifier
            .verify(
                &payload(),
                &requirements(Scheme::Other("x402+sui".to_owned())),
            )
            .await
            .unwrap();
        assert_eq!(
            verdict.invalid_reason(),
            Some("Unsupported scheme: x402+sui")
        );
    }

    #[tokio::test]
    async fn delegation_relays_the_remote_verdict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verify"))
            .and(body_partial_json(serde_json::json!({
                "x402Version": 1,
                "paymentRequirements": {"scheme": "x402+eip712", "network": "base"},
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"isValid": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let verifier = PaymentVerifier::try_new()
            .unwrap()
            .with_facilitator_url(&server.uri().parse().unwrap())
            .unwrap();
        let verdict = verifier
            .verify(&payload(), &requirements(Scheme::Eip712))
            .await
            .unwrap();
        assert!(verdict.is_valid());
    }

    #[tokio::test]
    async fn delegation_relays_rejections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "isValid": false,
                "invalidReason": "insufficient amount",
            })))
            .mount(&server)
            .await;

        let verifier = PaymentVerifier::try_new()
            .unwrap()
            .with_facilitator_url(&server.uri().parse().unwrap())
            .unwrap();
        let verdict = verifier
            .verify(&payload(), &requirements(Scheme::Eip712))
            .await
            .unwrap();
        assert_eq!(verdict.invalid_reason(), Some("insufficient amount"));
    }

    #[tokio::test]
    async fn delegation_sends_the_original_payload_encoding() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verify"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"isValid": true})),
            )
            .mount(&server)
            .await;

        let verifier = PaymentVerifier::try_new()
            .unwrap()
            .with_facilitator_url(&server.uri().parse().unwrap())
            .unwrap();
        let sent = payload();
        verifier
            .verify(&sent, &requirements(Scheme::Eip712))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let relayed =
            PaymentPayload::from_base64(body["paymentHeader"].as_str().unwrap()).unwrap();
        assert_eq!(relayed, sent);
    }

    #[tokio::test]
    async fn delegation_transport_failure_is_an_error() {
        // A facilitator that answers 500 is indistinguishable from one that
        // is unreachable: neither produced a verdict.
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verify"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let verifier = PaymentVerifier::try_new()
            .unwrap()
            .with_facilitator_url(&server.uri().parse().unwrap())
            .unwrap();
        let err = verifier
            .verify(&payload(), &requirements(Scheme::Eip712))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifierError::HttpStatus { status, .. } if status == 500));
    }

    #[tokio::test]
    async fn delegation_garbage_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let verifier = PaymentVerifier::try_new()
            .unwrap()
            .with_facilitator_url(&server.uri().parse().unwrap())
            .unwrap();
        let err = verifier
            .verify(&payload(), &requirements(Scheme::Eip712))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifierError::JsonDeserialization { .. }));
    }
}
