//! The challenge-answering middleware and the `fetch` convenience.

use std::time::Duration;

use http::{Extensions, HeaderValue, StatusCode};
use reqwest::{Request, Response};
use reqwest_middleware as rqm;

use atlas402::proto::{CodecError, EvmProof, PaymentRequired, Proof, V1};
use atlas402::{PaymentPayload, PaymentRequirements};

use super::ReqwestWithPayments;
use crate::constants::X_PAYMENT_HEADER;

/// Stand-in transaction hash attached to constructed proofs. Producing a
/// real one means signing and settling on chain, which belongs to a wallet
/// integration, not this client.
const PLACEHOLDER_TRANSACTION_HASH: &str = "0x...";

/// Currency symbol restated in constructed proofs.
const CURRENCY: &str = "USDC";

/// Errors raised by the payment client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The 402 response body could not be parsed as a challenge.
    #[error("Failed to parse 402 response: {0}")]
    ParseError(String),
    /// The challenge advertised no payment requirements.
    #[error("no payment requirements provided")]
    NoPaymentRequirements,
    /// The original request has a streaming body and cannot be reissued.
    #[error("request cannot be retried with a payment header")]
    RequestNotCloneable,
    /// The constructed payload could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Transport-level failure.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl From<rqm::Error> for ClientError {
    fn from(err: rqm::Error) -> Self {
        match err {
            rqm::Error::Reqwest(err) => Self::Http(err),
            rqm::Error::Middleware(err) => match err.downcast::<Self>() {
                Ok(err) => err,
                Err(err) => Self::ParseError(err.to_string()),
            },
        }
    }
}

/// Settings for [`fetch`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Overall timeout applied to each HTTP request.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// Middleware that answers a 402 challenge with a payment proof.
#[derive(Debug, Clone, Copy, Default)]
pub struct X402Client;

impl X402Client {
    /// Creates the middleware.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Builds the proof answering `requirement`: version and scheme/network are
/// copied from the challenge, the amount and payee are restated, and the
/// transaction hash is a placeholder.
fn payment_for(requirement: &PaymentRequirements) -> PaymentPayload<Proof> {
    PaymentPayload {
        x402_version: V1,
        scheme: requirement.scheme.clone(),
        network: requirement.network.clone(),
        payload: Proof::Evm(EvmProof {
            transaction_hash: Some(PLACEHOLDER_TRANSACTION_HASH.to_owned()),
            amount: Some(requirement.max_amount_required.clone()),
            currency: Some(CURRENCY.to_owned()),
            pay_to: Some(requirement.pay_to.clone()),
        }),
    }
}

fn middleware_err(err: ClientError) -> rqm::Error {
    rqm::Error::Middleware(err.into())
}

#[async_trait::async_trait]
impl rqm::Middleware for X402Client {
    /// Runs the request; on a 402, pays and retries exactly once.
    ///
    /// There is no loop and no backoff: one challenge, one paid retry, and
    /// the second response is final whatever its status.
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: rqm::Next<'_>,
    ) -> rqm::Result<Response> {
        let retry_req = req.try_clone();
        let res = next.clone().run(req, extensions).await?;
        if res.status() != StatusCode::PAYMENT_REQUIRED {
            return Ok(res);
        }

        record_challenge(res.url().as_str());

        let challenge: PaymentRequired = res
            .json()
            .await
            .map_err(|err| middleware_err(ClientError::ParseError(err.to_string())))?;
        let Some(requirement) = challenge.accepts.into_iter().next() else {
            return Err(middleware_err(ClientError::NoPaymentRequirements));
        };

        let header = payment_for(&requirement)
            .to_base64()
            .map_err(|err| middleware_err(err.into()))?;
        let header = HeaderValue::from_str(&header)
            .map_err(|err| middleware_err(ClientError::ParseError(err.to_string())))?;

        let mut retry = retry_req.ok_or_else(|| middleware_err(ClientError::RequestNotCloneable))?;
        retry.headers_mut().insert(X_PAYMENT_HEADER, header);
        next.run(retry, extensions).await
    }
}

/// Issues a GET to `url`, paying a 402 challenge along the way.
///
/// # Errors
///
/// Returns [`ClientError`] on transport failure or an unanswerable
/// challenge. A rejected payment is not an error: the final 402 response is
/// returned for the caller to inspect.
pub async fn fetch(url: &str, config: &ClientConfig) -> Result<Response, ClientError> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()?
        .with_payments();
    client.get(url).send().await.map_err(ClientError::from)
}

#[cfg(feature = "telemetry")]
fn record_challenge(url: &str) {
    tracing::info!(url, "Received 402 challenge, retrying with payment");
}

#[cfg(not(feature = "telemetry"))]
fn record_challenge(_url: &str) {}
