//! Payment requirements, payloads, and the 402 challenge body.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{CodecError, X402Version1};
use crate::scheme::Scheme;

/// Payment terms set by the seller: one acceptable way to pay.
///
/// Exactly one scheme/network pair per requirement. A challenge carries an
/// ordered, non-empty list of these; the first entry is the default this
/// implementation accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    /// The proof format and verification strategy expected.
    pub scheme: Scheme,
    /// The settlement network name (e.g. `"base"`).
    pub network: String,
    /// Amount owed, as an integer string in the asset's smallest unit.
    pub max_amount_required: String,
    /// The URL or path being paid for.
    pub resource: String,
    /// Human-readable description of the resource.
    pub description: String,
    /// MIME type of the resource.
    pub mime_type: String,
    /// Destination address for funds.
    pub pay_to: String,
    /// Upper bound, in seconds, the payer has to complete payment.
    pub max_timeout_seconds: u64,
    /// Contract or mint address of the payment currency.
    pub asset: String,
    /// Scheme-specific metadata; serialized as explicit `null` when absent.
    pub extra: Option<serde_json::Value>,
}

/// A payment proof presented by the buyer.
///
/// Generic over the proof body: servers decode into the default raw JSON
/// form and interpret the body per scheme later; clients construct the typed
/// [`Proof`] form directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload<TPayload = serde_json::Value> {
    /// Protocol version (always 1).
    pub x402_version: X402Version1,
    /// Scheme the proof answers; must match one advertised requirement.
    pub scheme: Scheme,
    /// Network the proof answers; must match one advertised requirement.
    pub network: String,
    /// Scheme-specific proof body.
    pub payload: TPayload,
}

impl<TPayload: Serialize> PaymentPayload<TPayload> {
    /// Encodes this payload for the `x-payment` request header.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] if serialization fails.
    pub fn to_base64(&self) -> Result<String, CodecError> {
        let json = serde_json::to_vec(self)?;
        Ok(BASE64.encode(json))
    }
}

impl<TPayload: DeserializeOwned> PaymentPayload<TPayload> {
    /// Decodes an `x-payment` header value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Base64`] if the value is not valid base64, or
    /// [`CodecError::Json`] if the decoded bytes are not a payment payload.
    pub fn from_base64(header: &str) -> Result<Self, CodecError> {
        let bytes = BASE64.decode(header.trim())?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Proof body for the EVM-family scheme.
///
/// `transaction_hash` is what verification keys on; the remaining fields
/// restate the payment terms for redundancy. All fields stay optional so a
/// missing hash surfaces as a verification verdict, not a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvmProof {
    /// Hash of the settling transaction.
    pub transaction_hash: Option<String>,
    /// Amount paid, restated from the requirement.
    pub amount: Option<String>,
    /// Payment currency symbol.
    pub currency: Option<String>,
    /// Destination address, restated from the requirement.
    pub pay_to: Option<String>,
}

/// Proof body for the Solana-family scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolanaProof {
    /// Signature of the settling transaction.
    pub signature: Option<String>,
    /// Amount paid, restated from the requirement.
    pub amount: Option<String>,
    /// Payment currency symbol.
    pub currency: Option<String>,
    /// Destination address, restated from the requirement.
    pub pay_to: Option<String>,
}

impl EvmProof {
    /// Decodes a raw proof body leniently: a body that does not match the
    /// expected shape yields an empty proof, so the absent required field is
    /// reported as a verdict by the verifier.
    #[must_use]
    pub fn decode(raw: &serde_json::Value) -> Self {
        serde_json::from_value(raw.clone()).unwrap_or_default()
    }
}

impl SolanaProof {
    /// Decodes a raw proof body leniently; see [`EvmProof::decode`].
    #[must_use]
    pub fn decode(raw: &serde_json::Value) -> Self {
        serde_json::from_value(raw.clone()).unwrap_or_default()
    }
}

/// Scheme-keyed proof body: the closed set of proofs this protocol defines.
///
/// The enclosing [`PaymentPayload::scheme`] field is the discriminant, so
/// the union serializes untagged; the variant's own fields are the payload
/// body on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Proof {
    /// Transaction-hash proof for [`Scheme::Eip712`].
    Evm(EvmProof),
    /// Signature proof for [`Scheme::Solana`].
    Solana(SolanaProof),
}

/// HTTP 402 challenge body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    /// Protocol version (always 1).
    pub x402_version: X402Version1,
    /// Acceptable payment methods, in preference order.
    #[serde(default)]
    pub accepts: Vec<PaymentRequirements>,
    /// Error message for a malformed exchange; `null` on a fresh challenge.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::V1;

    fn evm_payload() -> PaymentPayload<Proof> {
        PaymentPayload {
            x402_version: V1,
            scheme: Scheme::Eip712,
            network: "base".to_owned(),
            payload: Proof::Evm(EvmProof {
                transaction_hash: Some("0xabc".to_owned()),
                amount: Some("10000000".to_owned()),
                currency: Some("USDC".to_owned()),
                pay_to: Some("0x8bee703d6214a266e245b0537085b1021e1ccaed".to_owned()),
            }),
        }
    }

    #[test]
    fn header_round_trip_preserves_structure() {
        let sent = evm_payload();
        let header = sent.to_base64().unwrap();

        let received: PaymentPayload = PaymentPayload::from_base64(&header).unwrap();
        assert_eq!(received.scheme, Scheme::Eip712);
        assert_eq!(received.network, "base");

        let Proof::Evm(original) = sent.payload else {
            panic!("expected EVM proof");
        };
        assert_eq!(EvmProof::decode(&received.payload), original);
    }

    #[test]
    fn payload_wire_shape_is_camel_case() {
        let json = serde_json::to_value(&evm_payload()).unwrap();
        assert_eq!(json["x402Version"], 1);
        assert_eq!(json["scheme"], "x402+eip712");
        assert_eq!(json["payload"]["transactionHash"], "0xabc");
        assert_eq!(json["payload"]["payTo"], "0x8bee703d6214a266e245b0537085b1021e1ccaed");
    }

    #[test]
    fn from_base64_rejects_garbage() {
        assert!(matches!(
            PaymentPayload::<serde_json::Value>::from_base64("not base64!!!"),
            Err(CodecError::Base64(_))
        ));

        let not_json = BASE64.encode(b"hello");
        assert!(matches!(
            PaymentPayload::<serde_json::Value>::from_base64(&not_json),
            Err(CodecError::Json(_))
        ));
    }

    #[test]
    fn lenient_proof_decode_defaults_on_mismatch() {
        let proof = EvmProof::decode(&serde_json::json!({"signature": "sig"}));
        assert!(proof.transaction_hash.is_none());

        let proof = EvmProof::decode(&serde_json::json!(42));
        assert_eq!(proof, EvmProof::default());

        let proof = SolanaProof::decode(&serde_json::json!({"signature": "sig"}));
        assert_eq!(proof.signature.as_deref(), Some("sig"));
    }

    #[test]
    fn challenge_body_serializes_null_fields() {
        let challenge = PaymentRequired {
            x402_version: V1,
            accepts: vec![],
            error: None,
        };
        let json = serde_json::to_value(&challenge).unwrap();
        assert!(json["error"].is_null());
        assert!(json["accepts"].as_array().unwrap().is_empty());
    }
}
