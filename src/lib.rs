//! danchu - a Korean-IME-aware system-wide text snippet expander.
//!
//! A global keyboard hook watches raw keystrokes, a state machine tracks what
//! the user typed in the QWERTY keystroke domain while the Korean 2-set IME
//! composes Hangul on screen, and registered trigger abbreviations followed
//! by space or tab are erased and replaced with their expansion text in
//! whichever application has focus.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod engine;
pub mod error;
pub mod focus;
pub mod hangul;
pub mod index;
pub mod inject;
pub mod keymap;
pub mod models;
pub mod storage;

// Re-export
pub use config::{get_config_dir, is_daemon_running, load_engine_config, EngineConfig};
pub use daemon::{daemon_status, run_daemon_worker, start_daemon, stop_daemon};
pub use engine::{EngineState, SnippetEngine};
pub use error::{ExpandError, Result};
pub use focus::{FixedClassifier, ForegroundClassifier, SystemClassifier};
pub use index::TriggerIndex;
pub use models::Trigger;
pub use storage::{add_trigger, delete_trigger, load_triggers, update_trigger};
