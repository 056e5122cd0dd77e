//! Wire format types for x402 payment messages.
//!
//! Everything a challenge, a proof, or a facilitator exchange puts on the
//! wire lives here. All types serialize to JSON with camelCase field names.
//!
//! # Key Types
//!
//! - [`PaymentRequirements`] - One acceptable way to pay, advertised by the seller
//! - [`PaymentPayload`] - The proof a buyer presents
//! - [`PaymentRequired`] - The HTTP 402 challenge body
//! - [`VerifyRequest`] - The facilitator `/verify` request body
//! - [`VerificationResult`] - A verification verdict, on the wire as
//!   `{"isValid": bool, "invalidReason": str}`

use serde::{Deserialize, Deserializer, Serialize, Serializer};

mod v1;

pub use v1::{EvmProof, PaymentPayload, PaymentRequired, PaymentRequirements, Proof, SolanaProof};

/// Marker for x402 protocol version 1.
///
/// Serializes as the bare integer `1` and rejects any other value on
/// deserialization. Only one protocol version exists; the marker keeps a
/// mistyped or future version from silently passing decode.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct X402Version1;

/// Convenience constant for constructing protocol messages.
pub const V1: X402Version1 = X402Version1;

impl Serialize for X402Version1 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(1)
    }
}

impl<'de> Deserialize<'de> for X402Version1 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = u8::deserialize(deserializer)?;
        if v == 1 {
            Ok(Self)
        } else {
            Err(serde::de::Error::custom(format!("expected version 1, got {v}")))
        }
    }
}

/// Error decoding or encoding a base64 payment header.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The header value is not valid standard base64.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The decoded bytes are not the expected JSON document.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Request body for a facilitator's `POST /verify` endpoint.
///
/// The payment payload travels pre-encoded in `payment_header`, exactly as
/// the client originally sent it, so the facilitator sees the same bytes the
/// gateway received.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// Protocol version (always 1).
    pub x402_version: X402Version1,
    /// Base64 of the UTF-8 JSON serialization of the payment payload.
    pub payment_header: String,
    /// The requirement the payload is being checked against.
    pub payment_requirements: PaymentRequirements,
}

impl VerifyRequest {
    /// Builds a verify request for `payload` against `requirements`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] if the payload fails to serialize.
    pub fn new<T: Serialize>(
        payload: &PaymentPayload<T>,
        requirements: &PaymentRequirements,
    ) -> Result<Self, CodecError> {
        Ok(Self {
            x402_version: V1,
            payment_header: payload.to_base64()?,
            payment_requirements: requirements.clone(),
        })
    }
}

/// Verdict of a payment verification. Never partially valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// The payment proof checks out.
    Valid,
    /// The payment proof was rejected.
    Invalid {
        /// Why the proof was rejected.
        reason: String,
    },
}

impl VerificationResult {
    /// Creates a rejection verdict with the given reason.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    /// Returns `true` for [`VerificationResult::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns the rejection reason, if any.
    #[must_use]
    pub fn invalid_reason(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { reason } => Some(reason),
        }
    }
}

/// On-the-wire shape of [`VerificationResult`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerificationResultWire {
    is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    invalid_reason: Option<String>,
}

impl Serialize for VerificationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = VerificationResultWire {
            is_valid: self.is_valid(),
            invalid_reason: self.invalid_reason().map(str::to_owned),
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VerificationResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = VerificationResultWire::deserialize(deserializer)?;
        if wire.is_valid {
            Ok(Self::Valid)
        } else {
            Ok(Self::Invalid {
                reason: wire.invalid_reason.unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::Scheme;

    fn requirements() -> PaymentRequirements {
        PaymentRequirements {
            scheme: Scheme::Eip712,
            network: "base".to_owned(),
            max_amount_required: "1000000".to_owned(),
            resource: "/premium/content".to_owned(),
            description: "Payment required for /premium/content".to_owned(),
            mime_type: "application/json".to_owned(),
            pay_to: "0x8bee703d6214a266e245b0537085b1021e1ccaed".to_owned(),
            max_timeout_seconds: 300,
            asset: crate::networks::USDC_BASE.to_owned(),
            extra: None,
        }
    }

    #[test]
    fn version_marker_serializes_as_integer_one() {
        assert_eq!(serde_json::to_string(&V1).unwrap(), "1");
        assert!(serde_json::from_str::<X402Version1>("1").is_ok());
        assert!(serde_json::from_str::<X402Version1>("2").is_err());
    }

    #[test]
    fn verdict_wire_shape() {
        let valid = serde_json::to_value(&VerificationResult::Valid).unwrap();
        assert_eq!(valid, serde_json::json!({"isValid": true}));

        let invalid = serde_json::to_value(&VerificationResult::invalid("Transaction failed")).unwrap();
        assert_eq!(
            invalid,
            serde_json::json!({"isValid": false, "invalidReason": "Transaction failed"})
        );
    }

    #[test]
    fn verdict_decodes_missing_reason_as_empty() {
        let verdict: VerificationResult = serde_json::from_str("{\"isValid\": false}").unwrap();
        assert_eq!(verdict.invalid_reason(), Some(""));

        let verdict: VerificationResult = serde_json::from_str("{\"isValid\": true}").unwrap();
        assert!(verdict.is_valid());
    }

    #[test]
    fn verify_request_embeds_encoded_payload() {
        let payload = PaymentPayload {
            x402_version: V1,
            scheme: Scheme::Eip712,
            network: "base".to_owned(),
            payload: serde_json::json!({"transactionHash": "0xabc"}),
        };
        let request = VerifyRequest::new(&payload, &requirements()).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["x402Version"], 1);
        assert_eq!(json["paymentRequirements"]["scheme"], "x402+eip712");

        let decoded: PaymentPayload =
            PaymentPayload::from_base64(json["paymentHeader"].as_str().unwrap()).unwrap();
        assert_eq!(decoded.payload["transactionHash"], "0xabc");
    }
}
