use crate::config::{ensure_config_dir, get_store_file_path};
use crate::error::{ExpandError, Result};
use crate::hangul;
use crate::models::Trigger;
use std::fs;
use std::path::Path;

/// Canonical stored form of a trigger: whitespace stripped, Hangul reduced
/// to the literal jamo sequence the keystrokes produce. `감사` becomes
/// `ㄱㅏㅁㅅㅏ`; `rt` becomes `ㄱㅅ`; characters outside the layout pass
/// through unchanged.
pub fn normalize_trigger(input: &str) -> Result<String> {
    let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() {
        return Err(ExpandError::InvalidTrigger("trigger is empty".to_string()));
    }
    let normalized = if stripped.chars().any(hangul::is_hangul) {
        hangul::to_literal(&hangul::to_keystrokes(&stripped))
    } else {
        hangul::to_literal(&stripped)
    };
    Ok(normalized)
}

/// Load all triggers from a store file
pub fn load_triggers_from(path: &Path) -> Result<Vec<Trigger>> {
    if !path.exists() {
        return Err(ExpandError::StoreNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    let content = fs::read_to_string(path)?;

    // Handle empty store file
    if content.trim().is_empty() {
        return Ok(vec![]);
    }

    serde_json::from_str(&content).map_err(|e| e.into())
}

/// Save triggers to a store file
pub fn save_triggers_to(path: &Path, triggers: &[Trigger]) -> Result<()> {
    let serialized = serde_json::to_string_pretty(&triggers)?;
    fs::write(path, serialized)?;
    Ok(())
}

/// Load all triggers from the default store
pub fn load_triggers() -> Result<Vec<Trigger>> {
    load_triggers_from(&get_store_file_path())
}

/// Save triggers to the default store
pub fn save_triggers(triggers: &[Trigger]) -> Result<()> {
    ensure_config_dir()?;
    save_triggers_to(&get_store_file_path(), triggers)
}

/// Create the store with the stock greeting entry when it does not exist yet
pub fn seed_default_store() -> Result<()> {
    ensure_config_dir()?;
    let path = get_store_file_path();
    if path.exists() {
        return Ok(());
    }
    log::info!("seeding trigger store at {}", path.display());
    let defaults = vec![Trigger::new(
        "ㄱㅅ".to_string(),
        "감사합니다".to_string(),
    )];
    save_triggers_to(&path, &defaults)
}

/// Add a new trigger
pub fn add_trigger(trigger: String, content: String) -> Result<Trigger> {
    let normalized = normalize_trigger(&trigger)?;
    if content.is_empty() {
        return Err(ExpandError::InvalidTrigger("content is empty".to_string()));
    }

    let mut triggers = match load_triggers() {
        Ok(t) => t,
        Err(ExpandError::StoreNotFound(_)) => vec![],
        Err(e) => return Err(e),
    };

    let entry = Trigger::new(normalized, content);
    triggers.push(entry.clone());
    save_triggers(&triggers)?;
    Ok(entry)
}

/// Delete a trigger
pub fn delete_trigger(trigger: &str) -> Result<()> {
    let normalized = normalize_trigger(trigger)?;
    let mut triggers = load_triggers()?;
    triggers.retain(|entry| entry.trigger != normalized);
    save_triggers(&triggers)
}

/// Update the expansion text of an existing trigger
pub fn update_trigger(trigger: &str, new_content: String) -> Result<()> {
    let normalized = normalize_trigger(trigger)?;
    let mut triggers = load_triggers()?;
    let mut updated = false;

    for entry in &mut triggers {
        if entry.trigger == normalized {
            entry.update_content(new_content.clone());
            updated = true;
        }
    }

    if !updated {
        return Err(ExpandError::Other(format!(
            "Trigger '{}' not found",
            normalized
        )));
    }

    save_triggers(&triggers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_whitespace() {
        assert_eq!(normalize_trigger(" ㄱ ㅅ ").unwrap(), "ㄱㅅ");
    }

    #[test]
    fn test_normalize_hangul_to_jamo() {
        assert_eq!(normalize_trigger("감사").unwrap(), "ㄱㅏㅁㅅㅏ");
        assert_eq!(normalize_trigger("ㄱㅅ").unwrap(), "ㄱㅅ");
        // A compound final decomposes into its pair
        assert_eq!(normalize_trigger("ㄳ").unwrap(), "ㄱㅅ");
    }

    #[test]
    fn test_normalize_latin_to_jamo() {
        assert_eq!(normalize_trigger("rt").unwrap(), "ㄱㅅ");
        // Keys without a jamo pass through
        assert_eq!(normalize_trigger("r1").unwrap(), "ㄱ1");
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(normalize_trigger("").is_err());
        assert!(normalize_trigger("   ").is_err());
    }
}
