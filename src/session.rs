//! Study-session orchestration.
//!
//! ## Why a session object?
//!
//! A study workflow is load-once, generate-many: the user brings in one set
//! of notes and then asks for a summary, a deck, maybe a bigger deck, all
//! against the same material. [`StudySession`] holds that state (the notes
//! plus one slot per study aid) so callers don't thread strings around.
//! The stateless core lives in [`StudyBuddy`], which embedders can use
//! directly when they manage their own state.

use crate::config::{StudyConfig, StudyMode, CARD_COUNT_MAX, CARD_COUNT_MIN};
use crate::credentials;
use crate::error::StudyBuddyError;
use crate::extract::{self, DocumentKind};
use crate::model::{GeminiClient, GenerationOptions, TextGenerator};
use crate::progress::{NoopProgress, ProgressHandle};
use crate::prompts;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// The study-aid generation service.
///
/// Owns the configuration and a model client; construction resolves the
/// API key and fails immediately when none is available, so a
/// misconfigured deployment is caught before any material is loaded.
pub struct StudyBuddy {
    config: StudyConfig,
    generator: Arc<dyn TextGenerator>,
}

// The config's own Debug already redacts the key; the generator is an
// opaque trait object, so it is shown as a placeholder.
impl fmt::Debug for StudyBuddy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudyBuddy")
            .field("config", &self.config)
            .field("generator", &"<dyn TextGenerator>")
            .finish()
    }
}

impl StudyBuddy {
    /// Create a service backed by the Gemini API.
    ///
    /// The API key comes from the first available source: the config's
    /// explicit key, the file named by `GEMINI_API_KEY_FILE`, then the
    /// `GEMINI_API_KEY` environment variable.
    ///
    /// # Errors
    /// * [`StudyBuddyError::MissingApiKey`] when no source supplies a key
    /// * [`StudyBuddyError::Internal`] when the HTTP client cannot be built
    pub fn new(config: StudyConfig) -> Result<Self, StudyBuddyError> {
        let api_key = credentials::resolve_api_key(config.api_key.as_deref())?;
        let client = GeminiClient::new(config.model.clone(), config.api_base_url.clone(), api_key)?;
        info!(model = %config.model, "study buddy ready");

        Ok(Self {
            config,
            generator: Arc::new(client),
        })
    }

    /// Create a service with a caller-supplied generator.
    ///
    /// No credential resolution happens; the generator is used as-is.
    /// This is the seam for tests and for embedders with custom transport
    /// (caching, rate limiting, a different backend).
    pub fn with_generator(config: StudyConfig, generator: Arc<dyn TextGenerator>) -> Self {
        Self { config, generator }
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    /// Generate one study aid from the given notes.
    ///
    /// Stateless: the caller owns the notes and the result. Empty or
    /// whitespace-only notes are rejected before any request is made.
    pub async fn generate(
        &self,
        notes: &str,
        mode: &StudyMode,
    ) -> Result<String, StudyBuddyError> {
        if notes.trim().is_empty() {
            return Err(StudyBuddyError::EmptyNotes);
        }

        let start = Instant::now();
        let prompt = prompts::build_prompt(mode, notes);
        let options = GenerationOptions {
            temperature: self.config.temperature_for(mode),
        };

        debug!(
            mode = mode.label(),
            notes_chars = notes.chars().count(),
            temperature = options.temperature,
            "generating study aid"
        );

        let output = self.generator.generate(&prompt, &options).await?;

        info!(
            mode = mode.label(),
            output_chars = output.chars().count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "study aid generated"
        );

        Ok(output)
    }

    /// Synchronous wrapper around [`StudyBuddy::generate`].
    ///
    /// Creates a temporary tokio runtime internally.
    pub fn generate_sync(&self, notes: &str, mode: &StudyMode) -> Result<String, StudyBuddyError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| StudyBuddyError::Internal(format!("Failed to create tokio runtime: {e}")))?
            .block_on(self.generate(notes, mode))
    }
}

/// One user's material and the study aids generated from it.
///
/// The summary and flashcard slots are independent: regenerating one
/// leaves the other untouched, and a failed generation leaves its own
/// slot's previous content in place.
///
/// # Example
/// ```rust,no_run
/// use study_buddy::{StudyBuddy, StudyConfig, StudySession};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let buddy = StudyBuddy::new(StudyConfig::default())?;
/// let mut session = StudySession::new(buddy);
///
/// session.set_notes("The mitochondria is the powerhouse of the cell.");
/// let summary = session.generate_summary().await?;
/// println!("{summary}");
/// # Ok(())
/// # }
/// ```
pub struct StudySession {
    buddy: StudyBuddy,
    progress: ProgressHandle,
    notes: String,
    summary: Option<String>,
    flashcards: Option<String>,
}

impl StudySession {
    /// Create a session with no progress reporting.
    pub fn new(buddy: StudyBuddy) -> Self {
        Self::with_progress(buddy, Arc::new(NoopProgress))
    }

    /// Create a session that reports events to the given handle.
    pub fn with_progress(buddy: StudyBuddy, progress: ProgressHandle) -> Self {
        Self {
            buddy,
            progress,
            notes: String::new(),
            summary: None,
            flashcards: None,
        }
    }

    pub fn config(&self) -> &StudyConfig {
        self.buddy.config()
    }

    /// Replace the session's notes with pasted text.
    ///
    /// Returns the length of the new material in characters. Previously
    /// generated aids stay in their slots until regenerated.
    pub fn set_notes(&mut self, notes: impl Into<String>) -> usize {
        self.notes = notes.into();
        let chars = self.notes.chars().count();
        self.progress.on_document_loaded(chars);
        chars
    }

    /// Extract notes from in-memory document bytes and load them.
    ///
    /// On extraction failure the session's current notes are left intact,
    /// so a bad upload never destroys material the user already had.
    pub fn load_document(
        &mut self,
        bytes: &[u8],
        kind: DocumentKind,
    ) -> Result<usize, StudyBuddyError> {
        let text = extract::extract_notes(bytes, kind)?;
        Ok(self.set_notes(text))
    }

    /// Read a `.pdf` or `.txt` file and load its text as notes.
    ///
    /// Same failure semantics as [`StudySession::load_document`].
    pub fn load_file(&mut self, path: &Path) -> Result<usize, StudyBuddyError> {
        let text = extract::load_notes_from_path(path)?;
        Ok(self.set_notes(text))
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Whether the session has material to work with.
    ///
    /// Whitespace-only notes count as empty.
    pub fn has_notes(&self) -> bool {
        !self.notes.trim().is_empty()
    }

    /// Last generated summary, if any.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Last generated flashcard table, if any.
    pub fn flashcards(&self) -> Option<&str> {
        self.flashcards.as_deref()
    }

    /// Generate the summary and action plan for the loaded notes.
    pub async fn generate_summary(&mut self) -> Result<String, StudyBuddyError> {
        self.generate_into_slot(StudyMode::Summary).await
    }

    /// Generate a flashcard deck for the loaded notes.
    ///
    /// `count` falls back to the config's default when `None` and is
    /// clamped to the supported deck-size range either way.
    pub async fn generate_flashcards(
        &mut self,
        count: Option<u8>,
    ) -> Result<String, StudyBuddyError> {
        let count = count
            .unwrap_or(self.buddy.config.default_card_count)
            .clamp(CARD_COUNT_MIN, CARD_COUNT_MAX);
        self.generate_into_slot(StudyMode::Flashcards { count }).await
    }

    /// Synchronous wrapper around [`StudySession::generate_summary`].
    pub fn generate_summary_sync(&mut self) -> Result<String, StudyBuddyError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| StudyBuddyError::Internal(format!("Failed to create tokio runtime: {e}")))?
            .block_on(self.generate_summary())
    }

    /// Synchronous wrapper around [`StudySession::generate_flashcards`].
    pub fn generate_flashcards_sync(
        &mut self,
        count: Option<u8>,
    ) -> Result<String, StudyBuddyError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| StudyBuddyError::Internal(format!("Failed to create tokio runtime: {e}")))?
            .block_on(self.generate_flashcards(count))
    }

    /// Run one generation and store the result in the mode's slot.
    ///
    /// Every started event is paired with exactly one completed or failed
    /// event. The slot is only written on success.
    async fn generate_into_slot(&mut self, mode: StudyMode) -> Result<String, StudyBuddyError> {
        if !self.has_notes() {
            return Err(StudyBuddyError::EmptyNotes);
        }

        self.progress.on_generation_started(&mode);

        match self.buddy.generate(&self.notes, &mode).await {
            Ok(output) => {
                self.progress
                    .on_generation_completed(&mode, output.chars().count());
                let slot = match mode {
                    StudyMode::Summary => &mut self.summary,
                    StudyMode::Flashcards { .. } => &mut self.flashcards,
                };
                *slot = Some(output.clone());
                Ok(output)
            }
            Err(e) => {
                self.progress.on_generation_failed(&mode, &e.to_string());
                Err(e)
            }
        }
    }
}
