//! Rotating wellness tips.
//!
//! The tip board is process-wide and independent of sessions. It only
//! changes when a refresh is requested.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::sync::RwLock;
use tokio::time::timeout;

use crate::domain::tips::{HealthTip, TipTopic, FALLBACK_TIPS};
use crate::ports::{AIProvider, CompletionRequest, MessageRole, RequestMetadata, RequestPurpose};

/// Default sampling temperature for tips.
pub const TIP_TEMPERATURE: f32 = 0.9;

/// Default bound on the tip call.
pub const TIP_TIMEOUT: Duration = Duration::from_secs(15);

/// Generates one short tip on a random topic.
#[derive(Clone)]
pub struct HealthTipGenerator {
    provider: Arc<dyn AIProvider>,
    temperature: f32,
    timeout: Duration,
}

impl HealthTipGenerator {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            temperature: TIP_TEMPERATURE,
            timeout: TIP_TIMEOUT,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Picks a topic at random and asks the gateway for a tip.
    pub async fn generate(&self) -> HealthTip {
        let topic = *TipTopic::ALL[..]
            .choose(&mut rand::thread_rng())
            .unwrap_or(&TipTopic::Diet);
        self.generate_for(topic).await
    }

    /// Asks for a tip on `topic`, falling back to the static pool.
    pub async fn generate_for(&self, topic: TipTopic) -> HealthTip {
        let request = CompletionRequest::new(RequestMetadata::detached(RequestPurpose::HealthTip))
            .with_message(MessageRole::User, topic.prompt())
            .with_temperature(self.temperature);

        match timeout(self.timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) if !response.content.trim().is_empty() => {
                HealthTip::generated(topic, response.content.trim())
            }
            Ok(Ok(_)) => {
                tracing::warn!(topic = topic.label(), "Empty tip from provider, using fallback");
                random_fallback()
            }
            Ok(Err(err)) => {
                tracing::warn!(topic = topic.label(), error = %err, "Tip generation failed, using fallback");
                random_fallback()
            }
            Err(_) => {
                tracing::warn!(topic = topic.label(), "Tip generation timed out, using fallback");
                random_fallback()
            }
        }
    }
}

fn random_fallback() -> HealthTip {
    HealthTip::fallback(rand::thread_rng().gen_range(0..FALLBACK_TIPS.len()))
}

/// The tip currently shown to every visitor.
pub struct TipBoard {
    generator: HealthTipGenerator,
    current: RwLock<HealthTip>,
}

impl TipBoard {
    /// Creates a board showing the first fallback tip.
    pub fn new(generator: HealthTipGenerator) -> Self {
        Self {
            generator,
            current: RwLock::new(HealthTip::default()),
        }
    }

    pub async fn current(&self) -> HealthTip {
        self.current.read().await.clone()
    }

    /// Replaces the tip with a freshly generated one.
    pub async fn refresh(&self) -> HealthTip {
        let tip = self.generator.generate().await;
        *self.current.write().await = tip.clone();
        tracing::debug!(generated = tip.topic.is_some(), "Tip board refreshed");
        tip
    }
}
