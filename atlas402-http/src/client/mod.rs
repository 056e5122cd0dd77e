//! Reqwest middleware for answering 402 challenges.
//!
//! [`X402Client`] watches responses for the payment-required status. On a
//! 402 it decodes the advertised requirements, takes the first one, attaches
//! a payment proof in the `x-payment` header, and retries the request
//! exactly once. Any other status — including a second 402 — is returned to
//! the caller untouched.
//!
//! [`fetch`] wraps the middleware in a one-call convenience for simple
//! clients.

mod middleware;

pub use middleware::{ClientConfig, ClientError, X402Client, fetch};

use reqwest_middleware as rqm;

/// Adds x402 payment handling to a reqwest client.
pub trait ReqwestWithPayments {
    /// Wraps the client with the [`X402Client`] middleware.
    fn with_payments(self) -> rqm::ClientWithMiddleware;
}

impl ReqwestWithPayments for reqwest::Client {
    fn with_payments(self) -> rqm::ClientWithMiddleware {
        rqm::ClientBuilder::new(self).with(X402Client::new()).build()
    }
}
