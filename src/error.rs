//! Error types for the study-buddy library.
//!
//! One flat enum, [`StudyBuddyError`], covers every failure the library can
//! produce. The variants group into three tiers that callers treat
//! differently:
//!
//! * **Configuration** (`MissingApiKey`, `InvalidConfig`): raised while
//!   constructing [`crate::session::StudyBuddy`]. Fatal: the tool must not
//!   run without a credential, so these halt startup.
//!
//! * **Extraction** (`PdfExtraction`, `TextDecoding`, `UnsupportedFileType`,
//!   `FileNotFound`, `FileRead`): a document could not be turned into notes
//!   text. Recoverable: the session keeps its previous notes and the user
//!   retries with a different file.
//!
//! * **Invocation** (`ModelRequest`): the Gemini call failed for any reason
//!   (network, auth, quota, context length). Recoverable: the message is
//!   shown inline and previously generated results stay visible.
//!
//! The tiering is positional rather than encoded in a method: configuration
//! errors can only come out of constructors, so callers know the tier from
//! where the `Result` appeared.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the study-buddy library.
#[derive(Debug, Error)]
pub enum StudyBuddyError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// No credential source in the chain produced a value.
    #[error(
        "Gemini API key not found.\nSources tried (in order): {attempted}.\n\
Set GEMINI_API_KEY in the environment or a .env file, or point\n\
GEMINI_API_KEY_FILE at a mounted secret."
    )]
    MissingApiKey { attempted: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The buffer claimed to be a PDF but could not be parsed as one.
    #[error("Could not extract text from PDF: {message}\nEncrypted or scanned PDFs are not supported.")]
    PdfExtraction { message: String },

    /// A plain-text buffer was not valid UTF-8.
    #[error("Text file is not valid UTF-8: {message}")]
    TextDecoding { message: String },

    /// Declared file type is neither PDF nor plain text.
    #[error("Unsupported file type '{extension}'. Please upload a supported file type (.pdf or .txt).")]
    UnsupportedFileType { extension: String },

    // ── Invocation errors ─────────────────────────────────────────────────
    /// The Gemini request failed. Carries the underlying cause text;
    /// network, auth, quota, and context-length failures all land here.
    #[error("Gemini request failed: {message}\nCheck your API key and the length of your notes.")]
    ModelRequest { message: String },

    // ── Session guard ─────────────────────────────────────────────────────
    /// A generation action was requested before any notes were loaded.
    #[error("No study material loaded. Paste notes or load a .pdf/.txt file first.")]
    EmptyNotes,

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (runtime construction in sync wrappers).
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_names_sources() {
        let e = StudyBuddyError::MissingApiKey {
            attempted: "explicit config, GEMINI_API_KEY_FILE, GEMINI_API_KEY".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("GEMINI_API_KEY_FILE"), "got: {msg}");
        assert!(msg.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn unsupported_type_display() {
        let e = StudyBuddyError::UnsupportedFileType {
            extension: "docx".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("docx"));
        assert!(msg.contains("Please upload a supported file type (.pdf or .txt)."));
    }

    #[test]
    fn model_request_carries_cause() {
        let e = StudyBuddyError::ModelRequest {
            message: "HTTP 429: quota exceeded".into(),
        };
        assert!(e.to_string().contains("quota exceeded"));
    }

    #[test]
    fn file_not_found_display() {
        let e = StudyBuddyError::FileNotFound {
            path: PathBuf::from("/tmp/notes.pdf"),
        };
        assert!(e.to_string().contains("/tmp/notes.pdf"));
    }

    #[test]
    fn empty_notes_points_at_fix() {
        let msg = StudyBuddyError::EmptyNotes.to_string();
        assert!(msg.contains("Paste notes"));
    }
}
