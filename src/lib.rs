//! # study-buddy
//!
//! Turn study notes into AI-generated summaries and flashcard decks with
//! Google Gemini.
//!
//! ## Why this crate?
//!
//! Reading notes back is passive; testing yourself on them is what sticks.
//! This crate takes raw study material (a pasted wall of text, a lecture
//! PDF, a `.txt` export) and asks Gemini for the two artefacts that make
//! review active: a condensed summary with an action plan, and a
//! question/answer flashcard deck ready for self-quizzing.
//!
//! ## Session Overview
//!
//! ```text
//! notes (.pdf / .txt / pasted text)
//!  │
//!  ├─ 1. Extract   local text extraction via pdf-extract (no upload)
//!  ├─ 2. Prompt    instruction template + STUDY MATERIAL block
//!  ├─ 3. Generate  Gemini generateContent, temperature per study aid
//!  └─ 4. Store     session slots: summary + flashcard deck
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use study_buddy::{StudyBuddy, StudyConfig, StudySession};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Key read from GEMINI_API_KEY or a GEMINI_API_KEY_FILE secret mount
//!     let buddy = StudyBuddy::new(StudyConfig::default())?;
//!     let mut session = StudySession::new(buddy);
//!
//!     session.load_file(Path::new("lecture_notes.pdf"))?;
//!     println!("{}", session.generate_summary().await?);
//!     println!("{}", session.generate_flashcards(Some(12)).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `study-buddy` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! study-buddy = { version = "0.3", default-features = false }
//! ```
//!
//! ## Study Aids
//!
//! | Aid | Temperature | Output |
//! |-----|-------------|--------|
//! | Summary + action plan | 0.2 | markdown with `Summary` and `Action Plan` headings |
//! | Flashcards | 0.5 | two-column markdown table, 5 to 20 cards |
//!
//! The low summary temperature keeps the condensation faithful to the
//! source; the moderate flashcard temperature varies question phrasing
//! across the deck.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod model;
pub mod progress;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    StudyConfig, StudyConfigBuilder, StudyMode, CARD_COUNT_MAX, CARD_COUNT_MIN, DEFAULT_MODEL,
};
pub use error::StudyBuddyError;
pub use extract::{extract_notes, load_notes_from_path, DocumentKind};
pub use model::{GeminiClient, GenerationOptions, TextGenerator};
pub use progress::{NoopProgress, ProgressHandle, SessionProgress};
pub use session::{StudyBuddy, StudySession};
