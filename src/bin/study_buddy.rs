//! Terminal app for study-buddy.
//!
//! A thin shim over the library crate: drives a [`StudySession`] from a
//! small stdin menu, with an indicatif spinner during model calls.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use study_buddy::{
    DocumentKind, NoopProgress, ProgressHandle, SessionProgress, StudyBuddy, StudyConfig,
    StudyMode, StudySession, CARD_COUNT_MAX, CARD_COUNT_MIN,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Spinner progress handle using indicatif ──────────────────────────────────

/// Shows a spinner while Gemini works and a one-line receipt when it's done.
///
/// The bar is created on `on_generation_started` and always cleared on
/// completion or failure, so menu prompts never fight a live spinner.
struct SpinnerProgress {
    bar: Mutex<Option<ProgressBar>>,
    started_at: Mutex<Option<Instant>>,
}

impl SpinnerProgress {
    fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            started_at: Mutex::new(None),
        }
    }
}

fn spinner_message(mode: &StudyMode) -> String {
    match mode {
        StudyMode::Summary => "Gemini is analyzing and summarizing your notes...".to_string(),
        StudyMode::Flashcards { count } => format!("Gemini is generating {count} flashcards..."),
    }
}

impl SessionProgress for SpinnerProgress {
    fn on_generation_started(&self, mode: &StudyMode) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(spinner_message(mode));
        bar.enable_steady_tick(Duration::from_millis(80));

        *self.bar.lock().unwrap() = Some(bar);
        *self.started_at.lock().unwrap() = Some(Instant::now());
    }

    fn on_generation_completed(&self, mode: &StudyMode, output_chars: usize) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
        let elapsed = self
            .started_at
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);

        eprintln!(
            "{} {}",
            green("✔"),
            dim(&format!(
                "{} ready ({output_chars} chars, {elapsed:.1}s)",
                mode.label()
            ))
        );
    }

    fn on_generation_failed(&self, _mode: &StudyMode, _error: &str) {
        // Clear the spinner; the menu loop prints the error itself.
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
        *self.started_at.lock().unwrap() = None;
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start an interactive session
  study-buddy

  # Preload a lecture PDF
  study-buddy --file lecture_notes.pdf

  # Preload pasted text
  study-buddy --notes "The Krebs cycle produces ATP through oxidation."

  # Use a different Gemini model
  study-buddy --model gemini-2.5-pro --file chapter3.txt

STUDY AIDS:
  summary      5-7 key bullet points, 3 study tips, 3-step action plan
  flashcards   5-20 question/answer cards as a two-column markdown table

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY       Google Gemini API key (required)
  GEMINI_API_KEY_FILE  Path to a file containing the key (secret mounts)
  GEMINI_MODEL         Override the model ID (default: gemini-2.5-flash)

SETUP:
  1. Get a key:       https://aistudio.google.com/apikey
  2. Export it:       export GEMINI_API_KEY=...   (or put it in a .env file)
  3. Start studying:  study-buddy --file notes.pdf
"#;

/// Turn study notes into summaries and flashcard decks with Google Gemini.
#[derive(Parser, Debug)]
#[command(
    name = "study-buddy",
    version,
    about = "Turn study notes into AI-generated summaries and flashcard decks with Google Gemini",
    long_about = "Interactive study tool: paste notes or load a .pdf/.txt file, then generate \
a condensed summary with an action plan, or a question/answer flashcard deck, powered by the \
Google Gemini API.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Preload a .pdf or .txt file as study notes.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Preload pasted text as study notes.
    #[arg(long, conflicts_with = "file")]
    notes: Option<String>,

    /// Gemini model ID (e.g. gemini-2.5-flash, gemini-2.5-pro).
    #[arg(long, env = "GEMINI_MODEL")]
    model: Option<String>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress spinners and non-essential output.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up GEMINI_API_KEY and friends from a local .env, if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Default to warnings only; the menu is the interface, not the log.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = StudyConfig::builder();
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Start the service: missing credentials fail here, not mid-session ─
    let buddy = match StudyBuddy::new(config) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("{} {e}", red("✘"));
            std::process::exit(1);
        }
    };

    let progress: ProgressHandle = if cli.quiet {
        Arc::new(NoopProgress)
    } else {
        Arc::new(SpinnerProgress::new())
    };
    let mut session = StudySession::with_progress(buddy, progress);

    if !cli.quiet {
        println!("{}", bold("Study Buddy"));
        println!(
            "{}",
            dim(&format!("model: {}", session.config().model))
        );
    }

    // ── Preload material from flags ──────────────────────────────────────
    if let Some(ref path) = cli.file {
        load_and_report(&mut session, path);
    }
    if let Some(ref notes) = cli.notes {
        let chars = session.set_notes(notes.clone());
        println!("{} Notes loaded ({chars} characters).", green("✔"));
    }

    interactive_loop(&mut session).await
}

/// The stdin menu. Returns when the user quits or stdin reaches EOF.
async fn interactive_loop(session: &mut StudySession) -> Result<()> {
    loop {
        println!();
        if session.has_notes() {
            println!(
                "{}",
                dim(&format!(
                    "loaded notes: {} characters",
                    session.notes().chars().count()
                ))
            );
        } else {
            println!(
                "{}",
                cyan("Please paste your study notes or upload a file (.pdf or .txt) to activate the study tools.")
            );
        }

        println!("  {} Paste study notes", cyan("[1]"));
        println!("  {} Load a file (.pdf or .txt)", cyan("[2]"));
        println!("  {} Generate summary & action plan", cyan("[3]"));
        println!("  {} Generate flashcards", cyan("[4]"));
        println!("  {} Show last results", cyan("[5]"));
        println!("  {} Quit", cyan("[q]"));

        let choice = match prompt_line("> ")? {
            Some(c) => c,
            None => break, // EOF: behave like quit
        };

        match choice.trim() {
            "1" => {
                let notes = read_notes_block()?;
                if notes.trim().is_empty() {
                    println!("{} Nothing pasted; notes unchanged.", cyan("⚠"));
                } else {
                    let chars = session.set_notes(notes);
                    println!("{} Notes loaded ({chars} characters).", green("✔"));
                }
            }
            "2" => match prompt_line("File path (.pdf or .txt): ")? {
                Some(path) if !path.trim().is_empty() => {
                    load_and_report(session, Path::new(path.trim()));
                }
                Some(_) => println!("{} No path given.", cyan("⚠")),
                None => break,
            },
            "3" => generate_summary(session).await,
            "4" => {
                let count = match ask_card_count(session.config().default_card_count)? {
                    Some(n) => n,
                    None => break,
                };
                generate_flashcards(session, count).await;
            }
            "5" => show_results(session),
            "q" | "quit" | "exit" => break,
            other => {
                println!("{}", dim(&format!("'{other}' is not an option, try 1-5 or q.")));
            }
        }
    }

    Ok(())
}

async fn generate_summary(session: &mut StudySession) {
    if !session.has_notes() {
        println!(
            "{}",
            cyan("Please paste your study notes or upload a file (.pdf or .txt) to activate the study tools.")
        );
        return;
    }

    match session.generate_summary().await {
        Ok(summary) => {
            println!();
            println!("{summary}");
        }
        Err(e) => {
            println!(
                "{} An error occurred with the Gemini API. Check your key and context length. Error: {e}",
                red("✘")
            );
        }
    }
}

async fn generate_flashcards(session: &mut StudySession, count: u8) {
    if !session.has_notes() {
        println!(
            "{}",
            cyan("Please paste your study notes or upload a file (.pdf or .txt) to activate the study tools.")
        );
        return;
    }

    match session.generate_flashcards(Some(count)).await {
        Ok(table) => {
            println!();
            println!("{}", bold("### Generated Flashcards (Question : Answer)"));
            println!("{table}");
            println!(
                "{} Flashcards ready! Use the table for active recall.",
                green("✔")
            );
        }
        Err(e) => {
            println!(
                "{} An error occurred with the Gemini API. Error: {e}",
                red("✘")
            );
        }
    }
}

fn show_results(session: &StudySession) {
    match session.summary() {
        Some(summary) => {
            println!();
            println!("{summary}");
        }
        None => println!("{}", dim("(no summary generated yet)")),
    }
    match session.flashcards() {
        Some(table) => {
            println!();
            println!("{}", bold("### Generated Flashcards (Question : Answer)"));
            println!("{table}");
        }
        None => println!("{}", dim("(no flashcards generated yet)")),
    }
}

/// Load a file into the session and print the outcome without aborting.
fn load_and_report(session: &mut StudySession, path: &Path) {
    match session.load_file(path) {
        Ok(chars) => {
            let what = match DocumentKind::from_path(path) {
                Some(DocumentKind::Pdf) => "PDF content",
                _ => "Text file content",
            };
            println!("{} {what} loaded ({chars} characters).", green("✔"));
        }
        Err(e) => println!("{} {e}", red("✘")),
    }
}

/// Ask for a deck size; blank or unparseable input falls back to `default`.
///
/// Returns `None` on EOF.
fn ask_card_count(default: u8) -> Result<Option<u8>> {
    let prompt = format!("How many flashcards? [{CARD_COUNT_MIN}-{CARD_COUNT_MAX}, default {default}]: ");
    let line = match prompt_line(&prompt)? {
        Some(l) => l,
        None => return Ok(None),
    };

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Some(default));
    }

    match trimmed.parse::<u8>() {
        Ok(n) => Ok(Some(n)),
        Err(_) => {
            println!("{}", cyan(&format!("'{trimmed}' is not a number, using {default}.")));
            Ok(Some(default))
        }
    }
}

/// Print a prompt and read one line. Returns `None` on EOF.
fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    let n = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

/// Read pasted notes until a line containing only `END` (or EOF).
fn read_notes_block() -> Result<String> {
    println!(
        "{}",
        dim("Paste your notes below, then finish with a line containing only END:")
    );

    let stdin = io::stdin();
    let mut buf = String::new();
    loop {
        let mut line = String::new();
        let n = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if n == 0 || line.trim() == "END" {
            break;
        }
        buf.push_str(&line);
    }

    Ok(buf)
}
