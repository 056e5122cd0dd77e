//! HTTP transport for x402 payment gating.
//!
//! Three pieces sit on top of the `atlas402` core types:
//!
//! - [`verifier`] — the multi-strategy [`PaymentVerifier`]: delegate to a
//!   facilitator when one is configured, otherwise inspect the transaction
//!   directly over JSON-RPC (EVM receipts or Solana signatures)
//! - [`server`] — the challenge-issuing middleware: a [`tower::Layer`] that
//!   answers unpaid requests with a 402 challenge and gates the downstream
//!   handler on the verification verdict
//! - [`client`] — a `reqwest` middleware that answers a 402 challenge by
//!   attaching a payment proof and retrying the request exactly once
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation

pub mod client;
pub mod constants;
pub mod server;
pub mod verifier;

pub use client::{ClientConfig, ClientError, X402Client, fetch};
pub use server::X402Middleware;
pub use verifier::{PaymentVerifier, VerifierError};
