//! Classifier Gateway
//!
//! Owns the lifecycle of a classification backend and turns an image into a
//! ranked prediction list. The backend session is loaded lazily and at most
//! once: callers that arrive while a load is in flight await the same shared
//! future instead of starting their own.

use crate::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;
use xray_lens_types::{ImageInput, Prediction};

pub mod remote;
pub mod upload;

pub use remote::{RemoteBackend, RemoteSession};

/// A classification backend: something that must be loaded once and can then
/// classify images.
#[async_trait]
pub trait ClassifierBackend: Send + Sync + 'static {
    /// Whatever `load` produces and `infer` needs (model handle, HTTP client, ...)
    type Session: Send + Sync + 'static;
    /// Image in the form `infer` consumes
    type Prepared: Send + Sync + 'static;

    /// Name used in log lines
    fn name(&self) -> &str;

    async fn load(&self) -> GatewayResult<Self::Session>;

    /// Read and convert the image. Not covered by the request timeout.
    async fn prepare(&self, image: &ImageInput) -> GatewayResult<Self::Prepared>;

    async fn infer(
        &self,
        session: &Self::Session,
        input: &Self::Prepared,
    ) -> GatewayResult<Vec<Prediction>>;
}

type PendingLoad<S> = Shared<BoxFuture<'static, Result<Arc<S>, String>>>;

enum InitState<S> {
    Uninitialized,
    Initializing { attempt: u64, pending: PendingLoad<S> },
    Ready(Arc<S>),
}

pub struct ClassifierGateway<B: ClassifierBackend> {
    backend: Arc<B>,
    state: Mutex<InitState<B::Session>>,
    attempts: AtomicU64,
    request_timeout: Duration,
}

impl<B: ClassifierBackend> ClassifierGateway<B> {
    pub fn new(backend: B, request_timeout: Duration) -> Self {
        Self {
            backend: Arc::new(backend),
            state: Mutex::new(InitState::Uninitialized),
            attempts: AtomicU64::new(0),
            request_timeout,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.lock(), InitState::Ready(_))
    }

    /// Classify an image, highest confidence first.
    ///
    /// An empty list means the backend recognised nothing; that is not an error.
    /// Predictions with a non-finite confidence are dropped.
    pub async fn classify(&self, image: &ImageInput) -> GatewayResult<Vec<Prediction>> {
        let prepared = self.backend.prepare(image).await?;
        let session = self.session().await?;

        tracing::debug!(backend = self.backend.name(), image = %image.describe(), "Running classification");
        let inference = self.backend.infer(&session, &prepared);
        let mut predictions = match tokio::time::timeout(self.request_timeout, inference).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(GatewayError::Timeout {
                    duration_ms: self.request_timeout.as_millis() as u64,
                });
            }
        };

        predictions.retain(|p| {
            let finite = p.confidence.is_finite();
            if !finite {
                tracing::warn!(label = %p.label, confidence = p.confidence, "Dropped prediction with non-finite confidence");
            }
            finite
        });
        predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        tracing::debug!(count = predictions.len(), "Classification complete");
        Ok(predictions)
    }

    async fn session(&self) -> GatewayResult<Arc<B::Session>> {
        let (attempt, pending) = {
            let mut state = self.state.lock();
            match &*state {
                InitState::Ready(session) => return Ok(session.clone()),
                InitState::Initializing { attempt, pending } => (*attempt, pending.clone()),
                InitState::Uninitialized => {
                    let attempt = self.attempts.fetch_add(1, AtomicOrdering::SeqCst) + 1;
                    let pending = self.start_load(attempt);
                    *state = InitState::Initializing {
                        attempt,
                        pending: pending.clone(),
                    };
                    (attempt, pending)
                }
            }
        };

        let outcome = pending.await;

        let mut state = self.state.lock();
        let current = matches!(&*state, InitState::Initializing { attempt: a, .. } if *a == attempt);
        match outcome {
            Ok(session) => {
                if current {
                    *state = InitState::Ready(session.clone());
                }
                Ok(session)
            }
            Err(message) => {
                if current {
                    *state = InitState::Uninitialized;
                }
                Err(GatewayError::ModelInitialization(message))
            }
        }
    }

    fn start_load(&self, attempt: u64) -> PendingLoad<B::Session> {
        let backend = self.backend.clone();
        async move {
            tracing::info!(backend = backend.name(), attempt, "Loading classification backend");
            match backend.load().await {
                Ok(session) => {
                    tracing::info!(backend = backend.name(), "Classification backend ready");
                    Ok(Arc::new(session))
                }
                Err(e) => {
                    tracing::error!(backend = backend.name(), error = %e, "Failed to load classification backend");
                    Err(match e {
                        GatewayError::ModelInitialization(message) => message,
                        other => other.to_string(),
                    })
                }
            }
        }
        .boxed()
        .shared()
    }
}
