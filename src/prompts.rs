//! Prompt templates for study-aid generation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth**: tuning what the model is asked for (bullet
//!    counts, table layout, tone) requires editing exactly one place.
//!
//! 2. **Testability**: tests can import and inspect the built prompts
//!    directly without invoking the model, making wording regressions easy
//!    to catch.
//!
//! Both templates ask for markdown on purpose. Summaries render cleanly in
//! a terminal, and the flashcard table doubles as an import format for
//! spaced-repetition tools.

use crate::config::StudyMode;

/// Instruction for the summary and action-plan study aid.
///
/// The trailing space is deliberate: the material header is appended
/// directly after it.
pub const SUMMARY_INSTRUCTION: &str = "You are an expert academic summarizer. Take the following study material and condense it into a clear, concise summary of 5-7 key bullet points. Then, based on the summary, provide 3 actionable study tips and a 3-step action plan for reviewing this material. Output the result using clear markdown with headings for 'Summary' and 'Action Plan'. ";

/// Instruction for the flashcard deck, minus the leading sentence that
/// carries the requested card count (see [`build_flashcard_prompt`]).
pub const FLASHCARD_INSTRUCTION: &str = "Present the output as a two-column Markdown table. The first column should be 'Question' (a concept or term) and the second column should be 'Answer' (the definition or explanation). Do not include any other introductory or concluding text, only the table. ";

/// Separator between the instruction and the user's material.
pub const STUDY_MATERIAL_HEADER: &str = "\n\nSTUDY MATERIAL:\n\n";

/// Build the full prompt for a summary request.
pub fn build_summary_prompt(notes: &str) -> String {
    format!("{SUMMARY_INSTRUCTION}{STUDY_MATERIAL_HEADER}{notes}")
}

/// Build the full prompt for a flashcard request.
///
/// The count is spliced in verbatim. Range policy belongs to the session
/// layer, not the template; an explicit caller gets exactly what it asked
/// for.
pub fn build_flashcard_prompt(notes: &str, count: u8) -> String {
    format!(
        "Generate {count} flashcards from the following study material. {FLASHCARD_INSTRUCTION}{STUDY_MATERIAL_HEADER}{notes}"
    )
}

/// Build the prompt for the given generation mode.
pub fn build_prompt(mode: &StudyMode, notes: &str) -> String {
    match mode {
        StudyMode::Summary => build_summary_prompt(notes),
        StudyMode::Flashcards { count } => build_flashcard_prompt(notes, *count),
    }
}
