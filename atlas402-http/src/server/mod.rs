//! Axum middleware for enforcing x402 payments on protected routes.
//!
//! [`X402Middleware`] wraps a downstream handler. Requests without a payment
//! proof are answered with a 402 challenge synthesized from the gateway
//! configuration; requests carrying a proof are verified before the handler
//! runs. A malformed proof header is a client protocol error and gets a 400,
//! without consulting the verifier.
//!
//! The middleware keeps no state across requests and caches no verdicts:
//! every proof is re-verified from scratch, even an identical one seen
//! twice.

pub mod error;
pub mod layer;
pub mod paygate;

pub use error::ProofError;
pub use layer::{X402Middleware, X402MiddlewareService};
pub use paygate::Paygate;
