//! Direct Solana verification via `getTransaction`.

use serde::Deserialize;
use url::Url;

use atlas402::Network;
use atlas402::proto::{SolanaProof, VerificationResult};

#[derive(Debug, Default, Deserialize)]
struct TransactionEnvelope {
    #[serde(default)]
    result: Option<TransactionResult>,
}

#[derive(Debug, Default, Deserialize)]
struct TransactionResult {
    #[serde(default)]
    meta: Option<TransactionMeta>,
}

#[derive(Debug, Default, Deserialize)]
struct TransactionMeta {
    #[serde(default)]
    err: Option<serde_json::Value>,
}

/// Checks that the proof's transaction executed without error on chain.
///
/// Mirrors the EVM path: RPC failures after the call was attempted fold
/// into the verdict, and only a proof without a signature short-circuits.
/// Absence of an error in the transaction meta counts as success.
pub(crate) async fn verify_signature(
    http: &reqwest::Client,
    proof: &SolanaProof,
    rpc_override: Option<&Url>,
) -> VerificationResult {
    let Some(signature) = proof.signature.as_deref() else {
        return VerificationResult::invalid("Missing transaction signature");
    };

    let endpoint = rpc_override.map_or(Network::SolanaMainnet.default_rpc_url(), Url::as_str);
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getTransaction",
        "params": [signature, {"encoding": "json"}],
    });

    let response = match http.post(endpoint).json(&body).send().await {
        Ok(response) => response,
        Err(err) => return VerificationResult::invalid(err.to_string()),
    };
    let envelope = match response.json::<TransactionEnvelope>().await {
        Ok(envelope) => envelope,
        Err(_) => return VerificationResult::invalid("Failed to parse RPC response"),
    };

    let err = envelope.result.and_then(|r| r.meta).and_then(|m| m.err);
    if err.is_some() {
        VerificationResult::invalid("Transaction failed")
    } else {
        VerificationResult::Valid
    }
}
