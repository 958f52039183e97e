//! Progress-callback trait for study-session events.
//!
//! Inject an [`Arc<dyn SessionProgress>`] via
//! [`crate::session::StudySession::with_progress`] to be notified when
//! material is loaded and when generation starts, finishes, or fails.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a terminal spinner, a GUI status line, or a log
//! sink without the library knowing anything about how the host
//! application communicates. The trait is `Send + Sync` so a handle can be
//! shared with the async tasks that perform generation.
//!
//! # Example
//!
//! ```rust
//! use study_buddy::{SessionProgress, StudyMode, ProgressHandle};
//! use std::sync::Arc;
//!
//! struct StderrProgress;
//!
//! impl SessionProgress for StderrProgress {
//!     fn on_generation_started(&self, mode: &StudyMode) {
//!         eprintln!("working on the {}...", mode.label());
//!     }
//! }
//!
//! // Hand this to StudySession::with_progress.
//! let handle: ProgressHandle = Arc::new(StderrProgress);
//! handle.on_generation_started(&StudyMode::Summary);
//! ```

use crate::config::StudyMode;
use std::sync::Arc;

/// Called by a [`crate::session::StudySession`] as it works.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events for a single session arrive in order, but
/// the handle itself must be `Send + Sync` because generation runs inside
/// async tasks.
pub trait SessionProgress: Send + Sync {
    /// Called after a document or pasted text becomes the session's notes.
    ///
    /// # Arguments
    /// * `chars`: length of the loaded material in characters
    fn on_document_loaded(&self, chars: usize) {
        let _ = chars;
    }

    /// Called just before a model request is sent.
    fn on_generation_started(&self, mode: &StudyMode) {
        let _ = mode;
    }

    /// Called when a study aid has been generated and stored.
    ///
    /// # Arguments
    /// * `mode`: which aid finished
    /// * `output_chars`: length of the generated markdown in characters
    fn on_generation_completed(&self, mode: &StudyMode, output_chars: usize) {
        let _ = (mode, output_chars);
    }

    /// Called when a model request fails.
    ///
    /// # Arguments
    /// * `mode`: which aid was being generated
    /// * `error`: human-readable error description
    fn on_generation_failed(&self, mode: &StudyMode, error: &str) {
        let _ = (mode, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no handle is configured.
pub struct NoopProgress;

impl SessionProgress for NoopProgress {}

/// Convenience alias matching the type stored in a session.
pub type ProgressHandle = Arc<dyn SessionProgress>;
