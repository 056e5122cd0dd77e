//! Delegated verification against a remote facilitator.
//!
//! The gateway forwards the proof to `POST <facilitator>/verify` and relays
//! the remote verdict verbatim. Failures here propagate as errors rather
//! than rejections: the caller cannot distinguish "payment rejected" from
//! "could not ask", so it must not pretend to.

use http::StatusCode;
use url::Url;

use atlas402::proto::{VerificationResult, VerifyRequest};
use atlas402::{PaymentPayload, PaymentRequirements};

use super::VerifierError;

/// Forwards the proof to the facilitator and relays its verdict.
pub(crate) async fn delegate(
    http: &reqwest::Client,
    verify_url: &Url,
    payload: &PaymentPayload,
    requirements: &PaymentRequirements,
) -> Result<VerificationResult, VerifierError> {
    let request = VerifyRequest::new(payload, requirements)?;

    let response = http
        .post(verify_url.clone())
        .json(&request)
        .send()
        .await
        .map_err(|source| VerifierError::Http {
            context: "POST /verify",
            source,
        });
    let response = match response {
        Ok(response) => response,
        Err(err) => {
            record_failure(&err);
            return Err(err);
        }
    };

    if response.status() != StatusCode::OK {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let err = VerifierError::HttpStatus {
            context: "POST /verify",
            status,
            body,
        };
        record_failure(&err);
        return Err(err);
    }

    response
        .json::<VerificationResult>()
        .await
        .map_err(|source| VerifierError::JsonDeserialization {
            context: "POST /verify",
            source,
        })
        .inspect_err(record_failure)
}

/// Records a failed facilitator exchange.
#[cfg(feature = "telemetry")]
fn record_failure(err: &VerifierError) {
    tracing::error!(error = %err, "Request to facilitator failed");
}

/// Records a failed facilitator exchange. Noop when telemetry is off.
#[cfg(not(feature = "telemetry"))]
fn record_failure(_err: &VerifierError) {}
