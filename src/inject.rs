//! Replacement execution: erase the rendered trigger, inject the expansion.

use crate::config::EngineConfig;
use crate::error::{ExpandError, Result};
use crate::hangul;
use arboard::Clipboard;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use std::thread;
use std::time::Duration;

/// How the expansion text reaches the target application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectStrategy {
    /// Synthesize the text as Unicode key events.
    DirectType,
    /// Place the text on the clipboard and synthesize a paste chord.
    ClipboardPaste,
}

/// A fully decided replacement, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementPlan {
    pub erase_count: usize,
    pub strategy: InjectStrategy,
    pub text: String,
}

/// Decide erase length and injection strategy for a matched trigger.
///
/// The erase count covers what the IME rendered for the trigger keystrokes
/// plus the terminator that fired the match. Consoles get direct typing
/// because paste chords are unreliable there; short expansions get it
/// because it leaves the clipboard untouched.
pub fn plan_replacement(
    trigger_key: &str,
    expansion: &str,
    in_console: bool,
    direct_type_max: usize,
) -> ReplacementPlan {
    let erase_count = hangul::visual_length(trigger_key) + 1;
    let strategy = if in_console || expansion.chars().count() < direct_type_max {
        InjectStrategy::DirectType
    } else {
        InjectStrategy::ClipboardPaste
    };
    ReplacementPlan {
        erase_count,
        strategy,
        text: expansion.to_string(),
    }
}

/// Create a keyboard controller
pub fn create_keyboard_controller() -> Result<Enigo> {
    let settings = Settings::default();
    Enigo::new(&settings).map_err(|err| {
        ExpandError::Injection(format!("failed to create keyboard controller: {}", err))
    })
}

/// Send backspace key presses
pub fn send_backspace(keyboard: &mut Enigo, count: usize, interval_ms: u64) -> Result<()> {
    for _ in 0..count {
        thread::sleep(Duration::from_millis(interval_ms));
        keyboard
            .key(Key::Backspace, Direction::Click)
            .map_err(|err| ExpandError::Injection(format!("failed to send backspace: {}", err)))?;
    }
    Ok(())
}

/// Type text as Unicode key events, preserving newlines and splitting long
/// lines so the target's input queue keeps up.
pub fn type_text_with_formatting(keyboard: &mut impl Keyboard, text: &str) -> Result<()> {
    const CHUNK_SIZE: usize = 512;

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            keyboard
                .key(Key::Return, Direction::Click)
                .map_err(|err| {
                    ExpandError::Injection(format!("failed to type newline: {}", err))
                })?;

            // Small delay after newline to ensure it registers properly
            thread::sleep(Duration::from_millis(15));
        }

        if line.chars().count() > CHUNK_SIZE {
            for chunk in line.chars().collect::<Vec<_>>().chunks(CHUNK_SIZE) {
                let chunk_str: String = chunk.iter().collect();
                keyboard.text(&chunk_str).map_err(|err| {
                    ExpandError::Injection(format!("failed to type text: {}", err))
                })?;

                // Small delay between chunks
                thread::sleep(Duration::from_millis(20));
            }
        } else if !line.is_empty() {
            keyboard
                .text(line)
                .map_err(|err| ExpandError::Injection(format!("failed to type text: {}", err)))?;
        }
        // Small delay after each line for reliability
        thread::sleep(Duration::from_millis(10));
    }

    Ok(())
}

/// Get the current clipboard content as text
pub fn get_clipboard_text() -> Result<String> {
    let mut clipboard = Clipboard::new().map_err(|e| ExpandError::Clipboard(e.to_string()))?;
    clipboard
        .get_text()
        .map_err(|e| ExpandError::Clipboard(e.to_string()))
}

/// Set the clipboard content as text
pub fn set_clipboard_text(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().map_err(|e| ExpandError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| ExpandError::Clipboard(e.to_string()))
}

/// Clipboard snapshot taken before a paste, restored afterwards.
pub struct ClipboardBackup {
    content: Option<String>,
}

impl ClipboardBackup {
    /// Back up the current clipboard content
    pub fn save() -> Self {
        Self {
            content: get_clipboard_text().ok(),
        }
    }

    /// Restore the backed up content, best effort
    pub fn restore(self) {
        if let Some(content) = self.content {
            if let Err(err) = set_clipboard_text(&content) {
                log::warn!("failed to restore clipboard: {}", err);
            }
        }
    }
}

fn paste_chord(keyboard: &mut Enigo, key_delay_ms: u64) -> Result<()> {
    #[cfg(target_os = "macos")]
    let hold = Key::Meta;
    #[cfg(not(target_os = "macos"))]
    let hold = Key::Control;

    keyboard
        .key(hold, Direction::Press)
        .map_err(|err| ExpandError::Injection(format!("failed to press paste chord: {}", err)))?;
    thread::sleep(Duration::from_millis(key_delay_ms));
    keyboard
        .key(Key::Unicode('v'), Direction::Click)
        .map_err(|err| ExpandError::Injection(format!("failed to click paste key: {}", err)))?;
    thread::sleep(Duration::from_millis(key_delay_ms));
    keyboard
        .key(hold, Direction::Release)
        .map_err(|err| ExpandError::Injection(format!("failed to release paste chord: {}", err)))
}

fn paste_via_clipboard(keyboard: &mut Enigo, text: &str, config: &EngineConfig) -> Result<()> {
    let backup = ClipboardBackup::save();
    set_clipboard_text(text)?;
    thread::sleep(Duration::from_millis(config.paste_key_delay_ms));

    let chord = paste_chord(keyboard, config.paste_key_delay_ms);

    // Give the target time to read the clipboard before restoring it
    thread::sleep(Duration::from_millis(config.paste_settle_ms));
    backup.restore();
    chord
}

/// Execute a plan against the focused application.
pub fn execute_plan(plan: &ReplacementPlan, config: &EngineConfig) -> Result<()> {
    let mut keyboard = create_keyboard_controller()?;

    send_backspace(&mut keyboard, plan.erase_count, config.backspace_interval_ms)?;

    // Small delay before injecting the replacement
    thread::sleep(Duration::from_millis(10));

    match plan.strategy {
        InjectStrategy::DirectType => type_text_with_formatting(&mut keyboard, &plan.text),
        InjectStrategy::ClipboardPaste => paste_via_clipboard(&mut keyboard, &plan.text, config),
    }
}
