//! Tower layer plumbing for the payment gate.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum_core::extract::Request;
use axum_core::response::Response;
use tower::util::BoxCloneSyncService;
use tower::{Layer, Service};

use atlas402::config::GatewayConfig;
use atlas402::verify::Verifier;

use super::paygate::Paygate;
use crate::verifier::{PaymentVerifier, VerifierError};

/// The x402 middleware: gates wrapped routes on payment.
///
/// Create one per application from a [`GatewayConfig`] and apply it as an
/// axum layer. The verifier is pluggable so tests can substitute a fake.
pub struct X402Middleware<V> {
    verifier: V,
    config: Arc<GatewayConfig>,
}

impl X402Middleware<PaymentVerifier> {
    /// Creates the middleware with the standard [`PaymentVerifier`] built
    /// from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError`] if the verifier cannot be constructed.
    pub fn try_new(config: GatewayConfig) -> Result<Self, VerifierError> {
        let verifier = PaymentVerifier::from_config(&config)?;
        Ok(Self {
            verifier,
            config: Arc::new(config),
        })
    }
}

impl<V> X402Middleware<V> {
    /// Creates the middleware with a custom verifier.
    pub fn with_verifier(config: GatewayConfig, verifier: V) -> Self {
        Self {
            verifier,
            config: Arc::new(config),
        }
    }

    /// Returns the underlying verifier.
    pub const fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Returns the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl<V: Clone> Clone for X402Middleware<V> {
    fn clone(&self) -> Self {
        Self {
            verifier: self.verifier.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for X402Middleware<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X402Middleware")
            .field("verifier", &self.verifier)
            .field("config", &self.config)
            .finish()
    }
}

impl<S, V> Layer<S> for X402Middleware<V>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
    V: Verifier + Clone,
{
    type Service = X402MiddlewareService<V>;

    fn layer(&self, inner: S) -> Self::Service {
        X402MiddlewareService {
            verifier: self.verifier.clone(),
            config: Arc::clone(&self.config),
            inner: BoxCloneSyncService::new(inner),
        }
    }
}

/// Service produced by [`X402Middleware`]; intercepts every request and
/// defers to [`Paygate`].
#[allow(missing_debug_implementations)] // BoxCloneSyncService does not implement Debug
pub struct X402MiddlewareService<V> {
    verifier: V,
    config: Arc<GatewayConfig>,
    inner: BoxCloneSyncService<Request, Response, Infallible>,
}

impl<V: Clone> Clone for X402MiddlewareService<V> {
    fn clone(&self) -> Self {
        Self {
            verifier: self.verifier.clone(),
            config: Arc::clone(&self.config),
            inner: self.inner.clone(),
        }
    }
}

impl<V> Service<Request> for X402MiddlewareService<V>
where
    V: Verifier + Clone + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let gate = Paygate {
            verifier: self.verifier.clone(),
            config: Arc::clone(&self.config),
        };
        let inner = self.inner.clone();
        Box::pin(async move { gate.handle_request(inner, req).await })
    }
}
