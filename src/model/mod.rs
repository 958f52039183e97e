//! Model invocation layer.
//!
//! [`TextGenerator`] is the seam between study-aid orchestration and the
//! actual model call: the session layer builds a prompt, picks a
//! temperature, and hands both to whatever generator it was given. The
//! shipped implementation is [`GeminiClient`]; tests substitute a scripted
//! generator to exercise success and failure paths without the network.

use crate::error::StudyBuddyError;
use async_trait::async_trait;

pub mod gemini;

pub use gemini::GeminiClient;

/// Per-request sampling knobs.
///
/// Kept separate from [`crate::StudyConfig`] because the session layer
/// chooses a different temperature per study aid while the config holds
/// both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
}

/// A text-in, text-out model client.
///
/// Implementations must map every failure (network, HTTP status, response
/// shape) to [`StudyBuddyError::ModelRequest`] so callers see a single
/// recoverable error kind for "the model call did not work out".
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, StudyBuddyError>;
}
