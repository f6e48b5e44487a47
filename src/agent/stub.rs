//! In-process generators for tests.

use crate::agent::client::TextGenerator;
use crate::error::ExternalCallError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

type Responder = dyn Fn(&str) -> Result<String, ExternalCallError> + Send + Sync;

/// A [`TextGenerator`] whose answers are computed from the prompt.
pub struct StubGenerator {
    responder: Box<Responder>,
    delay: Option<Duration>,
    never_completes: bool,
    calls: AtomicUsize,
}

impl StubGenerator {
    fn build<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, ExternalCallError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: None,
            never_completes: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answer `text`.
    pub fn reply(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Arc::new(Self::build(move |_| Ok(text.clone())))
    }

    /// Always fail with `ExternalCallError::Provider(message)`.
    pub fn fail(message: &str) -> Arc<Self> {
        let message = message.to_string();
        Arc::new(Self::build(move |_| {
            Err(ExternalCallError::Provider(message.clone()))
        }))
    }

    /// Answer with the prompt itself.
    pub fn echo() -> Arc<Self> {
        Arc::new(Self::build(|prompt| Ok(prompt.to_string())))
    }

    /// Answer with `f(prompt)`.
    pub fn from_fn<F>(f: F) -> Arc<Self>
    where
        F: Fn(&str) -> Result<String, ExternalCallError> + Send + Sync + 'static,
    {
        Arc::new(Self::build(f))
    }

    /// Answer `text` after sleeping for `delay`.
    pub fn delayed(text: &str, delay: Duration) -> Arc<Self> {
        let text = text.to_string();
        let mut stub = Self::build(move |_| Ok(text.clone()));
        stub.delay = Some(delay);
        Arc::new(stub)
    }

    /// Fail with `message` after sleeping for `delay`.
    pub fn delayed_fail(message: &str, delay: Duration) -> Arc<Self> {
        let message = message.to_string();
        let mut stub = Self::build(move |_| {
            Err(ExternalCallError::Provider(message.clone()))
        });
        stub.delay = Some(delay);
        Arc::new(stub)
    }

    /// Block forever.
    pub fn pending() -> Arc<Self> {
        let mut stub = Self::build(|_| Ok(String::new()));
        stub.never_completes = true;
        Arc::new(stub)
    }

    /// Number of calls that reached this generator.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    fn model(&self) -> &str {
        "stub"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ExternalCallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.never_completes {
            futures::future::pending::<()>().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        (self.responder)(prompt)
    }
}
