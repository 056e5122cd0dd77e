//! The verifier seam.
//!
//! Server middleware is generic over [`Verifier`] so the payment gate can be
//! exercised with fake verifiers in tests while production wires in the
//! HTTP-backed implementation from `atlas402-http`.

use std::future::Future;
use std::pin::Pin;

use crate::proto::{PaymentPayload, PaymentRequirements, VerificationResult};

/// A boxed future returned by [`Verifier`] implementations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Checks a payment proof against a requirement and returns a verdict.
///
/// A verifier distinguishes two failure shapes: a rejected payment is an
/// `Ok(VerificationResult::Invalid { .. })` verdict, while not being able to
/// ask at all (transport failure toward a facilitator) is an `Err`. Callers
/// that cannot tell the two apart must treat both as "not paid".
pub trait Verifier: Send + Sync {
    /// Transport-level failure while attempting verification.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Verifies `payload` against `requirements`.
    fn verify<'a>(
        &'a self,
        payload: &'a PaymentPayload,
        requirements: &'a PaymentRequirements,
    ) -> BoxFuture<'a, Result<VerificationResult, Self::Error>>;
}
