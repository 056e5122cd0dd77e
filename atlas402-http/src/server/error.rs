//! Error types for the payment gate.

/// A proof header that could not be read at all.
///
/// Distinct from a rejected payment: these terminate the exchange with a
/// 400 Bad Request before the verifier is consulted, and the display text
/// is the plain-text response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProofError {
    /// The header value is not valid base64 (or not ASCII).
    #[error("Invalid payment header")]
    InvalidHeader,
    /// The header decoded, but the bytes are not a payment payload.
    #[error("Invalid payment payload")]
    InvalidPayload,
}
