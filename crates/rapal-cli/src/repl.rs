//! Interactive REPL against the chat service, no HTTP involved.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use serde_json::Value;
use tracing::debug;

use rapal_server::error::{reply_for, REPLY_INTERNAL};
use rapal_server::ChatService;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Drops the current session so the next message starts fresh.
const RESET_COMMAND: &str = "/reset";

/// Send one message and return the text to show: the model reply, or the
/// user-facing error reply.
pub async fn ask(service: &ChatService, message: &str, session_id: &str) -> String {
    let message = Value::String(message.to_string());
    match service.chat(Some(&message), Some(session_id)).await {
        Ok(reply) => reply.reply,
        Err(e) => {
            debug!(error = %e, "chat failed");
            let reply = reply_for(&e);
            if reply == REPLY_INTERNAL {
                format!("{reply}\n({e})")
            } else {
                reply
            }
        }
    }
}

/// Run the interactive REPL loop.
pub async fn run(service: &ChatService, session_id: &str) -> Result<()> {
    helpers::print_banner(session_id);

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("Kamu: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                // Ctrl-C
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                // Ctrl-D
                break;
            }
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            println!("\nSampai jumpa! 👋");
            break;
        }

        let _ = editor.add_history_entry(&input);

        if trimmed.eq_ignore_ascii_case(RESET_COMMAND) {
            if service.reset(Some(session_id)).await {
                println!("\n  Session berhasil direset\n");
            } else {
                println!("\n  Session tidak ditemukan\n");
            }
            continue;
        }

        debug!(session = session_id, "processing input");
        helpers::print_thinking();
        let reply = ask(service, &input, session_id).await;
        helpers::clear_thinking();
        helpers::print_reply(&reply);
    }

    save_history(&mut editor);

    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    rapal_core::utils::get_data_path().join("history").join("cli_history")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
