//! Lookup table from trigger keystrokes to expansion text.

use crate::hangul;
use crate::models::Trigger;
use std::collections::HashMap;

/// Index over all registered triggers, keyed by both the QWERTY keystroke
/// form and (when different) the literal trigger text, so a trigger typed
/// through the IME or as raw keys resolves to the same expansion.
#[derive(Debug, Default, Clone)]
pub struct TriggerIndex {
    entries: HashMap<String, String>,
    max_key_len: usize,
}

impl TriggerIndex {
    /// Build the index from a trigger snapshot. Total: every trigger yields
    /// at least one entry. On key collision the later trigger wins.
    pub fn build(triggers: &[Trigger]) -> Self {
        let mut entries = HashMap::new();
        for entry in triggers {
            let keystrokes = hangul::to_keystrokes(&entry.trigger);
            entries.insert(keystrokes.clone(), entry.content.clone());
            if entry.trigger != keystrokes {
                entries.insert(entry.trigger.clone(), entry.content.clone());
            }
        }
        let max_key_len = entries.keys().map(|k| k.chars().count()).max().unwrap_or(0);
        Self {
            entries,
            max_key_len,
        }
    }

    /// The longest registered key that is a suffix of the snapshot, with its
    /// expansion. Two distinct suffixes of one string cannot tie on length,
    /// so the result is deterministic.
    pub fn longest_suffix_match(&self, snapshot: &str) -> Option<(&str, &str)> {
        let mut best: Option<(&str, &str)> = None;
        for (key, content) in &self.entries {
            if !snapshot.ends_with(key.as_str()) {
                continue;
            }
            let longer = match best {
                Some((held, _)) => key.chars().count() > held.chars().count(),
                None => true,
            };
            if longer {
                best = Some((key.as_str(), content.as_str()));
            }
        }
        best
    }

    /// Character length of the longest key; bounds buffer growth.
    pub fn max_key_len(&self) -> usize {
        self.max_key_len
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(t: &str, c: &str) -> Trigger {
        Trigger::new(t.to_string(), c.to_string())
    }

    #[test]
    fn test_build_inserts_both_forms() {
        let index = TriggerIndex::build(&[trigger("ㄱㅅ", "감사합니다")]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.longest_suffix_match("rt"), Some(("rt", "감사합니다")));
        assert_eq!(
            index.longest_suffix_match("ㄱㅅ"),
            Some(("ㄱㅅ", "감사합니다"))
        );
    }

    #[test]
    fn test_build_skips_duplicate_form() {
        // A pure-ASCII trigger has identical keystroke and literal forms
        let index = TriggerIndex::build(&[trigger("1234", "test")]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_longest_suffix_wins() {
        let index = TriggerIndex::build(&[trigger("ab", "X"), trigger("cab", "Y")]);
        assert_eq!(index.longest_suffix_match("xxcab"), Some(("cab", "Y")));
        assert_eq!(index.longest_suffix_match("xxdab"), Some(("ab", "X")));
        assert_eq!(index.longest_suffix_match("xxcb"), None);
    }

    #[test]
    fn test_later_trigger_wins_collision() {
        let index = TriggerIndex::build(&[trigger("ab", "first"), trigger("ab", "second")]);
        assert_eq!(index.longest_suffix_match("ab"), Some(("ab", "second")));
    }

    #[test]
    fn test_max_key_len() {
        let index = TriggerIndex::build(&[trigger("ㄱㅅ", "x"), trigger("rkatk", "y")]);
        // Keys: "rt", "ㄱㅅ", "rkatk", "ㄱㅏㅁㅅㅏ"
        assert_eq!(index.max_key_len(), 5);
        assert_eq!(TriggerIndex::default().max_key_len(), 0);
    }
}
