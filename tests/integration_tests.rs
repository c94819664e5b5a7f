//! End-to-end properties of the expansion pipeline: codec, index, state
//! machine, and replacement planning wired together the way the engine
//! drives them, without a live OS hook.

use danchu::engine::EngineState;
use danchu::hangul::{to_keystrokes, to_literal, visual_length};
use danchu::index::TriggerIndex;
use danchu::inject::{plan_replacement, InjectStrategy};
use danchu::keymap::{classify, KeyClass, ModifierKey, TerminatorKey};
use danchu::models::Trigger;
use danchu::storage::{load_triggers_from, normalize_trigger, save_triggers_to};
use rdev::Key;
use std::time::Duration;

fn trigger(t: &str, c: &str) -> Trigger {
    Trigger::new(t.to_string(), c.to_string())
}

/// Feed printable characters through the state machine.
fn type_str(state: &mut EngineState, text: &str) {
    for c in text.chars() {
        state.on_key(KeyClass::Printable(c), true, 32);
    }
}

fn press_space(state: &mut EngineState) -> Option<String> {
    state.on_key(KeyClass::Terminator(TerminatorKey::Space), true, 32)
}

#[test]
fn test_round_trip_on_basic_jamo() {
    // The 14 basic consonants and 10 basic vowels survive the round trip
    for jamo in "ㄱㄴㄷㄹㅁㅂㅅㅇㅈㅊㅋㅌㅍㅎㅏㅑㅓㅕㅗㅛㅜㅠㅡㅣ".chars() {
        let s = jamo.to_string();
        assert_eq!(to_literal(&to_keystrokes(&s)), s);
    }
}

#[test]
fn test_round_trip_gap_on_compound_vowels() {
    // Multi-key compounds come back as their constituent jamo
    assert_eq!(to_literal(&to_keystrokes("ㅘ")), "ㅗㅏ");
    assert_eq!(to_literal(&to_keystrokes("ㅢ")), "ㅡㅣ");
}

#[test]
fn test_visual_length_properties() {
    // Single jamo is one unit
    for key in ["r", "s", "k", "l"] {
        assert_eq!(visual_length(key), 1);
    }
    // Registered batchim pairs merge into one unit
    for pair in ["rt", "sw", "sg", "fr", "fa", "fq", "ft", "fx", "fv", "fg", "qt"] {
        assert_eq!(visual_length(pair), 1);
    }
    // Unregistered pairs stay two
    assert_eq!(visual_length("tr"), 2);
    assert_eq!(visual_length("rk"), 2);
}

#[test]
fn test_longest_suffix_beats_shorter_trigger() {
    let index = TriggerIndex::build(&[trigger("ab", "X"), trigger("cab", "Y")]);

    let mut state = EngineState::new();
    type_str(&mut state, "xxcab");
    let snapshot = press_space(&mut state).unwrap();

    let (key, content) = index.longest_suffix_match(&snapshot).unwrap();
    assert_eq!(key, "cab");
    assert_eq!(content, "Y");
}

#[test]
fn test_debounce_suppresses_second_fire() {
    let window = Duration::from_millis(300);
    let mut state = EngineState::new();

    type_str(&mut state, "rt");
    let first = press_space(&mut state);
    assert!(first.is_some());
    assert!(!state.debounced(window));
    state.mark_replaced();

    // A second terminator right after the replacement lands in the window
    type_str(&mut state, "rt");
    let second = press_space(&mut state);
    assert!(second.is_some());
    assert!(state.debounced(window));
}

#[test]
fn test_modifier_chord_never_reaches_buffer() {
    let mut state = EngineState::new();
    type_str(&mut state, "rt");

    state.on_key(KeyClass::Modifier(ModifierKey::Ctrl), true, 32);
    state.on_key(KeyClass::Printable('c'), true, 32);
    assert_eq!(state.buffer(), "");

    // Release does not restore what was cleared
    state.on_key(KeyClass::Modifier(ModifierKey::Ctrl), false, 32);
    assert_eq!(state.buffer(), "");
}

#[test]
fn test_end_to_end_korean_trigger() {
    // Stored trigger ㄱㅅ, typed as the raw keys r t then space
    let index = TriggerIndex::build(&[trigger("ㄱㅅ", "감사합니다")]);
    let mut state = EngineState::new();

    for key in [Key::KeyR, Key::KeyT] {
        let class = classify(key, state.shift());
        state.on_key(class, true, index.max_key_len() + 5);
    }
    let snapshot = state
        .on_key(classify(Key::Space, false), true, index.max_key_len() + 5)
        .unwrap();
    assert_eq!(snapshot, "rt");

    let (key, content) = index.longest_suffix_match(&snapshot).unwrap();
    let plan = plan_replacement(key, content, false, 40);

    // ㄱ+ㅅ merged into one compound final on screen, plus the space
    assert_eq!(plan.erase_count, 2);
    assert_eq!(plan.strategy, InjectStrategy::DirectType);
    assert_eq!(plan.text, "감사합니다");
}

#[test]
fn test_end_to_end_long_expansion_pastes_in_gui() {
    let long = "a".repeat(120);
    let index = TriggerIndex::build(&[trigger("addr", &long)]);

    let mut state = EngineState::new();
    type_str(&mut state, "addr");
    let snapshot = press_space(&mut state).unwrap();
    let (key, content) = index.longest_suffix_match(&snapshot).unwrap();

    let plan = plan_replacement(key, content, false, 40);
    assert_eq!(plan.strategy, InjectStrategy::ClipboardPaste);
    // "addr" renders as four units plus the terminator
    assert_eq!(plan.erase_count, 5);

    // The same expansion in a console must type directly
    let console_plan = plan_replacement(key, content, true, 40);
    assert_eq!(console_plan.strategy, InjectStrategy::DirectType);
}

#[test]
fn test_refresh_does_not_affect_captured_snapshot() {
    // A match in flight holds the (key, content) pair it captured; swapping
    // the index only changes matches that start afterwards.
    let index = TriggerIndex::build(&[trigger("rt", "old")]);
    let mut state = EngineState::new();
    type_str(&mut state, "rt");
    let snapshot = press_space(&mut state).unwrap();
    let captured = index
        .longest_suffix_match(&snapshot)
        .map(|(k, c)| (k.to_string(), c.to_string()))
        .unwrap();

    let rebuilt = TriggerIndex::build(&[trigger("rt", "new")]);
    assert_eq!(captured.1, "old");
    assert_eq!(rebuilt.longest_suffix_match("rt").unwrap().1, "new");
}

#[test]
fn test_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("danchu.json");

    let stored = vec![
        trigger(&normalize_trigger("감사").unwrap(), "감사합니다"),
        trigger(&normalize_trigger("addr").unwrap(), "서울특별시"),
    ];
    save_triggers_to(&path, &stored).unwrap();

    let loaded = load_triggers_from(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].trigger, "ㄱㅏㅁㅅㅏ");
    assert_eq!(loaded[0].content, "감사합니다");
    // Latin keys without a jamo mapping pass through
    assert_eq!(loaded[1].trigger, "ㅁㅇㅇㄱ");
}

#[test]
fn test_missing_store_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    assert!(load_triggers_from(&path).is_err());
}

#[test]
fn test_index_rebuild_is_idempotent() {
    let triggers = vec![trigger("ㄱㅅ", "감사합니다"), trigger(".sig", "--\nKim")];
    let a = TriggerIndex::build(&triggers);
    let b = TriggerIndex::build(&triggers);
    assert_eq!(a.len(), b.len());
    assert_eq!(a.max_key_len(), b.max_key_len());
    assert_eq!(a.longest_suffix_match("rt"), b.longest_suffix_match("rt"));
}
