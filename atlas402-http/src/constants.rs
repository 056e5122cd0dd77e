//! HTTP-level constants for the x402 payment gating protocol.

use std::time::Duration;

/// Request header carrying the base64-encoded payment proof.
pub const X_PAYMENT_HEADER: &str = "x-payment";

/// Default facilitator service URL.
pub const DEFAULT_FACILITATOR_URL: &str = "https://facilitator.payai.network";

/// Fallback JSON-RPC endpoint for EVM networks outside the supported table.
/// The operator supplies the project id.
pub const FALLBACK_EVM_RPC_URL: &str = "https://mainnet.infura.io/v3/...";

/// Ceiling on any single outbound verification call, and on the overall
/// in-handler verification step.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed rejection message returned to clients whose proof did not verify.
/// Internal failure detail never leaves the gateway.
pub const VERIFICATION_FAILED_MESSAGE: &str = "Payment verification failed";
