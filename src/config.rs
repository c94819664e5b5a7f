use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

pub const PID_FILENAME: &str = "danchu-daemon.pid";
pub const STORE_FILENAME: &str = "danchu.json";
pub const CONFIG_FILENAME: &str = "config.json";

/// Get the danchu configuration directory
pub fn get_config_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".danchu"))
        .unwrap_or_else(|_| PathBuf::from(".danchu"))
}

/// Ensure the configuration directory exists
pub fn ensure_config_dir() -> Result<PathBuf> {
    let config_dir = get_config_dir();
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }
    Ok(config_dir)
}

/// Get the path to the PID file
pub fn get_pid_file_path() -> PathBuf {
    get_config_dir().join(PID_FILENAME)
}

/// Get the path to the trigger store file
pub fn get_store_file_path() -> PathBuf {
    get_config_dir().join(STORE_FILENAME)
}

/// Get the path to the engine config file
pub fn get_engine_config_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILENAME)
}

/// Check if the trigger store file exists
pub fn store_file_exists() -> bool {
    get_store_file_path().exists()
}

/// Check if daemon is running
pub fn is_daemon_running() -> Result<Option<u32>> {
    let pid_file = get_pid_file_path();

    if pid_file.exists() {
        match fs::read_to_string(&pid_file) {
            Ok(contents) => {
                match contents.trim().parse::<u32>() {
                    Ok(pid) => Ok(Some(pid)),
                    Err(_) => {
                        // Invalid PID, treat as not running and clean up
                        let _ = fs::remove_file(&pid_file);
                        Ok(None)
                    }
                }
            }
            Err(_) => {
                // Can't read file, treat as not running and clean up
                let _ = fs::remove_file(&pid_file);
                Ok(None)
            }
        }
    } else {
        Ok(None)
    }
}

/// Engine timing and sizing knobs. Missing file or fields fall back to the
/// defaults, so old config files keep working.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EngineConfig {
    /// Minimum gap between two completed replacements (ms).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Wait for IME composition to settle before injecting (ms).
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Gap between synthetic backspace clicks (ms).
    #[serde(default = "default_backspace_interval_ms")]
    pub backspace_interval_ms: u64,
    /// Gap between the key events of the paste chord (ms).
    #[serde(default = "default_paste_key_delay_ms")]
    pub paste_key_delay_ms: u64,
    /// Wait after the paste chord before restoring the clipboard (ms).
    #[serde(default = "default_paste_settle_ms")]
    pub paste_settle_ms: u64,
    /// Expansions shorter than this are typed directly instead of pasted.
    #[serde(default = "default_direct_type_max")]
    pub direct_type_max: usize,
    /// Extra buffer capacity beyond the longest registered key.
    #[serde(default = "default_buffer_slack")]
    pub buffer_slack: usize,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_settle_delay_ms() -> u64 {
    50
}

fn default_backspace_interval_ms() -> u64 {
    20
}

fn default_paste_key_delay_ms() -> u64 {
    10
}

fn default_paste_settle_ms() -> u64 {
    150
}

fn default_direct_type_max() -> usize {
    40
}

fn default_buffer_slack() -> usize {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            backspace_interval_ms: default_backspace_interval_ms(),
            paste_key_delay_ms: default_paste_key_delay_ms(),
            paste_settle_ms: default_paste_settle_ms(),
            direct_type_max: default_direct_type_max(),
            buffer_slack: default_buffer_slack(),
        }
    }
}

/// Load the engine config, falling back to defaults when the file is absent
/// or unreadable.
pub fn load_engine_config() -> EngineConfig {
    let path = get_engine_config_path();
    match fs::read_to_string(&path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => EngineConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.settle_delay_ms, 50);
        assert_eq!(config.direct_type_max, 40);
        assert_eq!(config.buffer_slack, 5);
    }

    #[test]
    fn test_backward_compat_missing_field() {
        // Older config files without newer fields still parse
        let json = r#"{"debounce_ms": 150}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.paste_settle_ms, 150);
    }
}
