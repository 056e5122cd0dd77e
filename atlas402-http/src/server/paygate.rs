//! Core payment gate logic: challenge synthesis, proof handling, and the
//! verdict-gated call into the downstream handler.

use std::convert::Infallible;
use std::sync::Arc;

use axum_core::body::Body;
use axum_core::extract::Request;
use axum_core::response::Response;
use http::header::CONTENT_TYPE;
use http::{StatusCode, Uri};
use tower::Service;
use tower::util::BoxCloneSyncService;

use atlas402::config::GatewayConfig;
use atlas402::proto::{CodecError, PaymentRequired, V1};
use atlas402::verify::Verifier;
use atlas402::{PaymentPayload, PaymentRequirements};

use super::error::ProofError;
use crate::constants::{VERIFICATION_FAILED_MESSAGE, VERIFY_TIMEOUT, X_PAYMENT_HEADER};

/// The downstream service a [`Paygate`] guards.
pub type Downstream = BoxCloneSyncService<Request, Response, Infallible>;

/// Per-request payment gate.
///
/// One gate handles one request: it either answers with a challenge, rejects
/// the proof, or invokes the downstream handler exactly once. Nothing
/// persists between requests beyond the shared read-only configuration.
#[derive(Debug, Clone)]
pub struct Paygate<V> {
    /// The verifier consulted for proof-carrying requests.
    pub verifier: V,
    /// Shared gateway configuration.
    pub config: Arc<GatewayConfig>,
}

impl<V: Verifier> Paygate<V> {
    /// Handles one request.
    ///
    /// # Errors
    ///
    /// Infallible: every failure becomes an HTTP response.
    pub async fn handle_request(
        &self,
        mut inner: Downstream,
        req: Request,
    ) -> Result<Response, Infallible> {
        let Some(header) = req.headers().get(X_PAYMENT_HEADER) else {
            record_challenge(req.uri());
            return Ok(self.challenge_response(req.uri()));
        };

        let payload = match header.to_str() {
            Ok(value) => decode_proof(value),
            Err(_) => Err(ProofError::InvalidHeader),
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(err) => return Ok(bad_request(&err)),
        };

        let requirements = self.requirements_for(req.uri());
        let verdict =
            tokio::time::timeout(VERIFY_TIMEOUT, self.verifier.verify(&payload, &requirements))
                .await;
        match verdict {
            Ok(Ok(result)) if result.is_valid() => inner.call(req).await,
            Ok(Ok(result)) => {
                record_rejection(&result.invalid_reason().unwrap_or_default());
                Ok(rejection_response())
            }
            Ok(Err(err)) => {
                record_rejection(&err);
                Ok(rejection_response())
            }
            Err(_elapsed) => {
                record_rejection(&"verification timed out");
                Ok(rejection_response())
            }
        }
    }

    /// Synthesizes the single requirement this gateway advertises for the
    /// requested resource. The same requirement is used for the challenge
    /// and for verifying an answering proof.
    pub fn requirements_for(&self, uri: &Uri) -> PaymentRequirements {
        let config = &self.config;
        let network = config.network;
        PaymentRequirements {
            scheme: network.scheme(),
            network: network.as_str().to_owned(),
            max_amount_required: config.max_amount_required(),
            resource: uri.to_string(),
            description: format!("Payment required for {}", uri.path()),
            mime_type: "application/json".to_owned(),
            pay_to: config.pay_to.clone(),
            max_timeout_seconds: config.max_timeout_seconds,
            asset: network.asset().to_owned(),
            extra: network.extra(),
        }
    }

    fn challenge_response(&self, uri: &Uri) -> Response {
        let challenge = PaymentRequired {
            x402_version: V1,
            accepts: vec![self.requirements_for(uri)],
            error: None,
        };
        let body = serde_json::to_vec(&challenge).expect("challenge body serializes");
        Response::builder()
            .status(StatusCode::PAYMENT_REQUIRED)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("challenge response builds")
    }
}

/// Decodes the proof header into a generic payload, distinguishing the two
/// client protocol errors.
fn decode_proof(header: &str) -> Result<PaymentPayload, ProofError> {
    PaymentPayload::from_base64(header).map_err(|err| match err {
        CodecError::Base64(_) => ProofError::InvalidHeader,
        CodecError::Json(_) => ProofError::InvalidPayload,
    })
}

/// 400 response for a proof header that could not be read.
fn bad_request(err: &ProofError) -> Response {
    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(err.to_string()))
        .expect("bad request response builds")
}

/// 402 response for a proof that did not verify. The body is a fixed
/// message; whatever the verifier reported stays in the log.
fn rejection_response() -> Response {
    let body = serde_json::json!({"error": VERIFICATION_FAILED_MESSAGE}).to_string();
    Response::builder()
        .status(StatusCode::PAYMENT_REQUIRED)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("rejection response builds")
}

#[cfg(feature = "telemetry")]
fn record_challenge(uri: &Uri) {
    tracing::debug!(resource = %uri, "Issuing 402 challenge");
}

#[cfg(not(feature = "telemetry"))]
fn record_challenge(_uri: &Uri) {}

#[cfg(feature = "telemetry")]
fn record_rejection<E: std::fmt::Display>(reason: &E) {
    tracing::warn!(reason = %reason, "Rejecting payment proof");
}

#[cfg(not(feature = "telemetry"))]
fn record_rejection<E: std::fmt::Display>(_reason: &E) {}
