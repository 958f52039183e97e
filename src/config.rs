//! Configuration types for study-aid generation.
//!
//! All generation behaviour is controlled through [`StudyConfig`], built via
//! its [`StudyConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config between the library and the terminal app, and
//! to diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest. Setters clamp obviously-wrong
//! values into range; `build()` rejects what cannot be clamped.

use crate::error::StudyBuddyError;
use std::fmt;

/// Default Gemini model used for both study aids.
///
/// Flash-tier models are fast and cheap, which suits an interactive tool
/// where the user sits waiting for every response.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default Gemini REST endpoint base.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for a study-aid generation service.
///
/// Built via [`StudyConfig::builder()`] or using [`StudyConfig::default()`].
///
/// # Example
/// ```rust
/// use study_buddy::StudyConfig;
///
/// let config = StudyConfig::builder()
///     .model("gemini-2.5-flash")
///     .default_card_count(15)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct StudyConfig {
    /// Gemini model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Explicit API key. Default: None.
    ///
    /// When set, this is the first credential source tried, ahead of the
    /// `GEMINI_API_KEY_FILE` secret mount and the `GEMINI_API_KEY`
    /// environment variable. Intended for tests and embedding callers that
    /// manage secrets themselves.
    pub api_key: Option<String>,

    /// Base URL of the Gemini REST API. Default: [`DEFAULT_API_BASE_URL`].
    ///
    /// Overridable so tests and proxies can point the client elsewhere.
    pub api_base_url: String,

    /// Sampling temperature for summary generation. Range 0.0-1.0. Default: 0.2.
    ///
    /// Low temperature keeps the output deterministic and close to the
    /// source notes.
    pub summary_temperature: f32,

    /// Sampling temperature for flashcard generation. Range 0.0-1.0. Default: 0.5.
    ///
    /// A moderate temperature varies question phrasing across the deck
    /// without drifting from the material.
    pub flashcard_temperature: f32,

    /// Flashcard count used when the caller does not supply one.
    /// Range 5-20. Default: 10.
    pub default_card_count: u8,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            summary_temperature: 0.2,
            flashcard_temperature: 0.5,
            default_card_count: 10,
        }
    }
}

impl fmt::Debug for StudyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudyConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("summary_temperature", &self.summary_temperature)
            .field("flashcard_temperature", &self.flashcard_temperature)
            .field("default_card_count", &self.default_card_count)
            .finish()
    }
}

impl StudyConfig {
    /// Create a new builder for `StudyConfig`.
    pub fn builder() -> StudyConfigBuilder {
        StudyConfigBuilder {
            config: Self::default(),
        }
    }

    /// Temperature for the given generation mode.
    pub fn temperature_for(&self, mode: &StudyMode) -> f32 {
        match mode {
            StudyMode::Summary => self.summary_temperature,
            StudyMode::Flashcards { .. } => self.flashcard_temperature,
        }
    }
}

/// Builder for [`StudyConfig`].
#[derive(Debug)]
pub struct StudyConfigBuilder {
    config: StudyConfig,
}

impl StudyConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn summary_temperature(mut self, t: f32) -> Self {
        self.config.summary_temperature = t.clamp(0.0, 1.0);
        self
    }

    pub fn flashcard_temperature(mut self, t: f32) -> Self {
        self.config.flashcard_temperature = t.clamp(0.0, 1.0);
        self
    }

    pub fn default_card_count(mut self, n: u8) -> Self {
        self.config.default_card_count = n.clamp(CARD_COUNT_MIN, CARD_COUNT_MAX);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<StudyConfig, StudyBuddyError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(StudyBuddyError::InvalidConfig(
                "Model identifier must not be empty".into(),
            ));
        }
        if !c.api_base_url.starts_with("http://") && !c.api_base_url.starts_with("https://") {
            return Err(StudyBuddyError::InvalidConfig(format!(
                "API base URL must be http(s), got '{}'",
                c.api_base_url
            )));
        }
        if let Some(ref key) = c.api_key {
            if key.trim().is_empty() {
                return Err(StudyBuddyError::InvalidConfig(
                    "Explicit API key must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Modes ────────────────────────────────────────────────────────────────

/// Smallest flashcard deck the tool will request.
pub const CARD_COUNT_MIN: u8 = 5;

/// Largest flashcard deck the tool will request.
pub const CARD_COUNT_MAX: u8 = 20;

/// Which study aid to generate.
///
/// The mode selects the instruction template and the sampling temperature;
/// `Flashcards` additionally carries the requested deck size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudyMode {
    /// Condensed summary with study tips and a review action plan.
    Summary,
    /// Question/answer deck rendered as a two-column markdown table.
    Flashcards { count: u8 },
}

impl StudyMode {
    /// Short label for log lines and progress displays.
    pub fn label(&self) -> &'static str {
        match self {
            StudyMode::Summary => "summary",
            StudyMode::Flashcards { .. } => "flashcards",
        }
    }
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudyMode::Summary => write!(f, "summary"),
            StudyMode::Flashcards { count } => write!(f, "flashcards ({count} cards)"),
        }
    }
}
