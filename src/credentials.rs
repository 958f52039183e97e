//! API key resolution.
//!
//! The Gemini key is looked up from an ordered chain of sources and the
//! first hit wins. Resolution happens once, when the service is
//! constructed, so a missing key fails fast instead of surfacing midway
//! through a study session.
//!
//! The key value itself is never logged; log lines only name which source
//! supplied it.

use crate::error::StudyBuddyError;
use std::env;
use std::fs;
use tracing::debug;

/// Environment variable holding the key directly.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable pointing at a file that holds the key, as used by
/// container secret mounts.
pub const API_KEY_FILE_ENV: &str = "GEMINI_API_KEY_FILE";

/// Resolve the Gemini API key from the first available source.
///
/// Sources, most specific first:
/// 1. The explicit key passed by the caller (from `StudyConfig.api_key`).
/// 2. A secret file named by `GEMINI_API_KEY_FILE`.
/// 3. The `GEMINI_API_KEY` environment variable, which also picks up
///    values loaded from a `.env` file by the terminal app.
///
/// Whitespace is trimmed; a source that produces an empty value counts as
/// absent and the chain moves on. When every source comes up empty the
/// error lists what was tried so the user can fix their setup.
pub fn resolve_api_key(explicit: Option<&str>) -> Result<String, StudyBuddyError> {
    // 1. Explicit key from config. Callers that manage secrets themselves
    //    hand it over here and the environment is never consulted.
    if let Some(key) = explicit {
        let key = key.trim();
        if !key.is_empty() {
            debug!(source = "explicit", "API key resolved");
            return Ok(key.to_string());
        }
    }

    // 2. Secret file, e.g. a Docker/Kubernetes secret mount. An unreadable
    //    or empty file is treated as absent rather than fatal so that a
    //    stale pointer does not block the plain environment variable.
    if let Ok(path) = env::var(API_KEY_FILE_ENV) {
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let key = contents.trim();
                if !key.is_empty() {
                    debug!(source = "key file", "API key resolved");
                    return Ok(key.to_string());
                }
                debug!(source = "key file", "secret file is empty, trying next source");
            }
            Err(e) => {
                debug!(source = "key file", error = %e, "secret file unreadable, trying next source");
            }
        }
    }

    // 3. Plain environment variable.
    if let Ok(key) = env::var(API_KEY_ENV) {
        let key = key.trim().to_string();
        if !key.is_empty() {
            debug!(source = "environment", "API key resolved");
            return Ok(key);
        }
    }

    Err(StudyBuddyError::MissingApiKey {
        attempted: format!("explicit config, {API_KEY_FILE_ENV}, {API_KEY_ENV}"),
    })
}
