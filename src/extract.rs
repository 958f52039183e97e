//! Document ingestion: turning an uploaded file into plain study notes.
//!
//! Two source formats are supported, PDF and plain text. Extraction works
//! on in-memory bytes so the same path serves files read from disk and
//! buffers handed over by an embedding application. PDF text extraction
//! runs entirely locally; nothing is sent to the model until the user asks
//! for a study aid.

use crate::error::StudyBuddyError;
use std::path::Path;
use tracing::debug;

/// Magic bytes at the start of every well-formed PDF.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Source format of an uploaded document, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Classify a path by extension, case-insensitively.
    ///
    /// Returns `None` for anything that is not `.pdf` or `.txt`; callers
    /// turn that into [`StudyBuddyError::UnsupportedFileType`] so the
    /// message can name the offending extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Extract study notes from raw document bytes.
///
/// For [`DocumentKind::Pdf`] the bytes are checked for the `%PDF-` magic
/// before being handed to the text extractor; a wrong extension or a
/// corrupt download fails with a clear message instead of a parser panic.
/// Page texts arrive concatenated in document order.
///
/// For [`DocumentKind::PlainText`] the bytes must be valid UTF-8.
pub fn extract_notes(bytes: &[u8], kind: DocumentKind) -> Result<String, StudyBuddyError> {
    match kind {
        DocumentKind::Pdf => extract_pdf_text(bytes),
        DocumentKind::PlainText => decode_text(bytes),
    }
}

/// Load a document from disk and extract its notes.
///
/// The extension picks the extraction path; unsupported extensions are
/// rejected before the file is read.
pub fn load_notes_from_path(path: &Path) -> Result<String, StudyBuddyError> {
    let kind = DocumentKind::from_path(path).ok_or_else(|| {
        StudyBuddyError::UnsupportedFileType {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("<none>")
                .to_string(),
        }
    })?;

    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StudyBuddyError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => StudyBuddyError::FileRead {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    debug!(path = %path.display(), bytes = bytes.len(), kind = ?kind, "document read");
    extract_notes(&bytes, kind)
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String, StudyBuddyError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(StudyBuddyError::PdfExtraction {
            message: "file does not start with the %PDF- header".to_string(),
        });
    }

    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        StudyBuddyError::PdfExtraction {
            message: e.to_string(),
        }
    })?;

    debug!(chars = text.chars().count(), "PDF text extracted");
    Ok(text)
}

fn decode_text(bytes: &[u8]) -> Result<String, StudyBuddyError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| StudyBuddyError::TextDecoding {
        message: e.to_string(),
    })
}
