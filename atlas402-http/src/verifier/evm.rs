//! Direct EVM verification via `eth_getTransactionReceipt`.

use serde::Deserialize;
use url::Url;

use atlas402::Network;
use atlas402::proto::{EvmProof, VerificationResult};

use crate::constants::FALLBACK_EVM_RPC_URL;

/// Receipt status code of a successful transaction.
const STATUS_SUCCESS: &str = "0x1";

#[derive(Debug, Default, Deserialize)]
struct ReceiptEnvelope {
    #[serde(default)]
    result: Option<Receipt>,
}

#[derive(Debug, Default, Deserialize)]
struct Receipt {
    #[serde(default)]
    status: String,
}

/// Checks that the proof's transaction landed successfully on chain.
///
/// RPC failures after the call was attempted fold into the verdict; only a
/// proof without a transaction hash short-circuits before any network I/O.
pub(crate) async fn verify_receipt(
    http: &reqwest::Client,
    proof: &EvmProof,
    network: &str,
    rpc_override: Option<&Url>,
) -> VerificationResult {
    let Some(tx_hash) = proof.transaction_hash.as_deref() else {
        return VerificationResult::invalid("Missing transaction hash");
    };

    let endpoint = rpc_override.map_or_else(|| default_rpc_url(network), Url::as_str);
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_getTransactionReceipt",
        "params": [tx_hash],
    });

    let response = match http.post(endpoint).json(&body).send().await {
        Ok(response) => response,
        Err(err) => return VerificationResult::invalid(err.to_string()),
    };
    let envelope = match response.json::<ReceiptEnvelope>().await {
        Ok(envelope) => envelope,
        Err(_) => return VerificationResult::invalid("Failed to parse RPC response"),
    };

    // A null result (unknown transaction) reads as an empty status.
    let status = envelope.result.map(|r| r.status).unwrap_or_default();
    if status == STATUS_SUCCESS {
        VerificationResult::Valid
    } else {
        VerificationResult::invalid("Transaction failed")
    }
}

fn default_rpc_url(network: &str) -> &'static str {
    if network == Network::Base.as_str() {
        Network::Base.default_rpc_url()
    } else {
        FALLBACK_EVM_RPC_URL
    }
}
