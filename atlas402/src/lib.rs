//! Core types for the x402 payment gating protocol.
//!
//! This crate defines the wire contract of an HTTP "payment required" flow:
//! a server advertises a price for a resource with a 402 challenge, a client
//! answers with a base64-encoded payment proof in a request header, and the
//! server verifies that proof before serving the resource.
//!
//! The crate is transport-free by design. HTTP middleware, the facilitator
//! client, and direct on-chain verification live in `atlas402-http`.
//!
//! # Modules
//!
//! - [`config`] - Process-wide gateway configuration
//! - [`networks`] - The fixed table of supported settlement networks
//! - [`proto`] - Wire format types and the proof-header codec
//! - [`scheme`] - Payment scheme identifiers
//! - [`verify`] - The verifier seam and verification verdicts

pub mod config;
pub mod networks;
pub mod proto;
pub mod scheme;
pub mod verify;

pub use config::GatewayConfig;
pub use networks::Network;
pub use proto::{PaymentPayload, PaymentRequired, PaymentRequirements, VerificationResult};
pub use scheme::Scheme;
pub use verify::Verifier;
