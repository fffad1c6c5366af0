//! Personalization collaborator seam.
//!
//! The "personal story" store lives outside this crate; the engine only
//! consumes an opaque text block through this trait. An incomplete context
//! and an absent one are treated identically by the prompt builder.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prior-answered biographical context for a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationContext {
    /// Whether the caller finished answering the story questions. Partial
    /// context is never injected into prompts.
    pub complete: bool,
    pub text: String,
}

/// Supplies personalization context for a caller identity, if any exists.
#[async_trait]
pub trait PersonalizationSource: Send + Sync {
    async fn get_context(
        &self,
        caller_id: Uuid,
    ) -> anyhow::Result<Option<PersonalizationContext>>;
}

/// Default source for deployments without a story store: always absent.
pub struct NullPersonalization;

#[async_trait]
impl PersonalizationSource for NullPersonalization {
    async fn get_context(
        &self,
        _caller_id: Uuid,
    ) -> anyhow::Result<Option<PersonalizationContext>> {
        Ok(None)
    }
}
