//! The expansion engine: global hook, keystroke state machine, matching.
//!
//! The hook callback stays minimal: it forwards raw key events into a
//! channel. A dedicated consumer thread classifies them, drives the state
//! machine, and matches terminator snapshots against the trigger index. Each
//! match runs on its own worker thread so the sleep-laden replacement
//! sequence never blocks event processing.

use crate::config::EngineConfig;
use crate::error::{ExpandError, Result};
use crate::focus::{self, ForegroundClassifier};
use crate::index::TriggerIndex;
use crate::inject;
use crate::keymap::{self, KeyClass, ModifierKey};
use crate::models::Trigger;
use rdev::{EventType, Key as RdevKey};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// How long start() waits for the hook thread to report an install failure.
const HOOK_GRACE_MS: u64 = 350;

/// Rolling keystroke state, mutated only through [`EngineState::on_key`].
#[derive(Debug, Default)]
pub struct EngineState {
    buffer: String,
    ctrl: bool,
    alt: bool,
    shift: bool,
    last_replace: Option<Instant>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shift(&self) -> bool {
        self.shift
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Apply one classified key transition. Returns the buffer snapshot when
    /// a terminator fires on a non-empty buffer; the live buffer is cleared
    /// before the snapshot is handed out.
    pub fn on_key(&mut self, class: KeyClass, down: bool, buffer_limit: usize) -> Option<String> {
        match class {
            KeyClass::Modifier(modifier) => {
                let flag = match modifier {
                    ModifierKey::Ctrl => &mut self.ctrl,
                    ModifierKey::Alt => &mut self.alt,
                    ModifierKey::Shift => &mut self.shift,
                };
                *flag = down;
                None
            }
            _ if !down => None,
            KeyClass::Terminator(_) => {
                if self.buffer.is_empty() {
                    None
                } else {
                    Some(std::mem::take(&mut self.buffer))
                }
            }
            KeyClass::Navigation => {
                self.buffer.clear();
                None
            }
            KeyClass::Backspace => {
                self.buffer.pop();
                None
            }
            KeyClass::Printable(c) => {
                // Ctrl/Alt chords are shortcuts, not trigger text. Shift
                // stays transparent: it only selected the variant of `c`.
                if self.ctrl || self.alt {
                    self.buffer.clear();
                } else {
                    self.buffer.push(c);
                    let excess = self.buffer.chars().count().saturating_sub(buffer_limit);
                    if excess > 0 {
                        self.buffer = self.buffer.chars().skip(excess).collect();
                    }
                }
                None
            }
            KeyClass::Other => None,
        }
    }

    /// True while the debounce window after the last replacement is open.
    pub fn debounced(&self, window: Duration) -> bool {
        match self.last_replace {
            Some(at) => at.elapsed() < window,
            None => false,
        }
    }

    pub fn mark_replaced(&mut self) {
        self.last_replace = Some(Instant::now());
    }

    /// Drop rolling state. Modifier flags reset too: releases that happened
    /// while the hook was paused were never observed.
    pub fn reset_transient(&mut self) {
        self.buffer.clear();
        self.ctrl = false;
        self.alt = false;
        self.shift = false;
    }
}

/// Handles shared between the hook callback, the consumer, and workers.
struct Shared {
    state: Mutex<EngineState>,
    index: Mutex<TriggerIndex>,
    running: AtomicBool,
    /// Queue-pause gate: while set, the hook callback drops events so
    /// synthetic input from a replacement cannot re-enter the pipeline.
    suspended: AtomicBool,
    is_replacing: AtomicBool,
    hook_live: AtomicBool,
}

enum EngineWork {
    Key { key: RdevKey, down: bool },
    Shutdown,
}

/// The system-wide expansion engine.
pub struct SnippetEngine {
    shared: Arc<Shared>,
    config: EngineConfig,
    classifier: Arc<dyn ForegroundClassifier>,
    work_tx: Mutex<Option<Sender<EngineWork>>>,
    consumer: Mutex<Option<thread::JoinHandle<()>>>,
}

impl SnippetEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_classifier(config, focus::system_classifier())
    }

    pub fn with_classifier(
        config: EngineConfig,
        classifier: Arc<dyn ForegroundClassifier>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(EngineState::new()),
                index: Mutex::new(TriggerIndex::default()),
                running: AtomicBool::new(false),
                suspended: AtomicBool::new(false),
                is_replacing: AtomicBool::new(false),
                hook_live: AtomicBool::new(false),
            }),
            config,
            classifier,
            work_tx: Mutex::new(None),
            consumer: Mutex::new(None),
        }
    }

    /// Swap in a freshly built index. Safe at any time; a match already in
    /// flight keeps the pair it captured.
    pub fn refresh_triggers(&self, triggers: &[Trigger]) {
        let rebuilt = TriggerIndex::build(triggers);
        *self.shared.index.lock().unwrap() = rebuilt;
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Install the hook (first call) and begin processing events.
    pub fn start(&self) -> Result<()> {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return Err(ExpandError::AlreadyRunning);
        }
        self.shared.state.lock().unwrap().reset_transient();

        let result = self.ensure_hook();
        if result.is_err() {
            self.shared.running.store(false, Ordering::SeqCst);
        }
        result
    }

    /// Stop processing and clear transient state. Idempotent. The hook
    /// itself stays installed; the running gate renders it inert.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.state.lock().unwrap().reset_transient();
    }

    fn ensure_hook(&self) -> Result<()> {
        let mut tx_slot = self.work_tx.lock().unwrap();
        if tx_slot.is_none() {
            let (tx, rx) = mpsc::channel();
            *self.consumer.lock().unwrap() = Some(self.spawn_consumer(rx));
            *tx_slot = Some(tx);
        }
        if self.shared.hook_live.load(Ordering::SeqCst) {
            return Ok(());
        }

        let tx = tx_slot.as_ref().expect("sender installed above").clone();
        drop(tx_slot);

        // rdev reports installation failure only inside the listener thread:
        // wait a short grace window for an early error.
        let install_rx = self.spawn_listener(tx);
        match install_rx.recv_timeout(Duration::from_millis(HOOK_GRACE_MS)) {
            Ok(message) => Err(ExpandError::Hook(message)),
            Err(RecvTimeoutError::Timeout) => {
                self.shared.hook_live.store(true, Ordering::SeqCst);
                Ok(())
            }
            Err(RecvTimeoutError::Disconnected) => Err(ExpandError::Hook(
                "keyboard listener exited unexpectedly".to_string(),
            )),
        }
    }

    fn spawn_listener(&self, tx: Sender<EngineWork>) -> Receiver<String> {
        let (install_tx, install_rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let shared_exit = Arc::clone(&self.shared);

        thread::spawn(move || {
            let callback = move |event: rdev::Event| {
                if !shared.running.load(Ordering::Relaxed)
                    || shared.suspended.load(Ordering::Relaxed)
                {
                    return;
                }
                let work = match event.event_type {
                    EventType::KeyPress(key) => EngineWork::Key { key, down: true },
                    EventType::KeyRelease(key) => EngineWork::Key { key, down: false },
                    _ => return,
                };
                let _ = tx.send(work);
            };

            if let Err(err) = rdev::listen(callback) {
                log::error!("keyboard listener failed: {:?}", err);
                shared_exit.hook_live.store(false, Ordering::SeqCst);
                shared_exit.running.store(false, Ordering::SeqCst);
                let _ = install_tx.send(format!("{:?}", err));
            }
        });

        install_rx
    }

    fn spawn_consumer(&self, rx: Receiver<EngineWork>) -> thread::JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let classifier = Arc::clone(&self.classifier);
        thread::spawn(move || consumer_loop(rx, shared, config, classifier))
    }
}

impl Drop for SnippetEngine {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        if let Some(tx) = self.work_tx.lock().unwrap().take() {
            let _ = tx.send(EngineWork::Shutdown);
        }
        if let Some(handle) = self.consumer.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

fn consumer_loop(
    rx: Receiver<EngineWork>,
    shared: Arc<Shared>,
    config: EngineConfig,
    classifier: Arc<dyn ForegroundClassifier>,
) {
    while let Ok(work) = rx.recv() {
        let (key, down) = match work {
            EngineWork::Key { key, down } => (key, down),
            EngineWork::Shutdown => break,
        };
        if !shared.running.load(Ordering::SeqCst) {
            continue;
        }
        if shared.is_replacing.load(Ordering::SeqCst) {
            continue;
        }

        let snapshot = {
            let mut state = shared.state.lock().unwrap();
            let class = keymap::classify(key, state.shift());
            let limit = shared.index.lock().unwrap().max_key_len() + config.buffer_slack;
            state.on_key(class, down, limit)
        };
        let snapshot = match snapshot {
            Some(snapshot) => snapshot,
            None => continue,
        };

        let matched = {
            let state = shared.state.lock().unwrap();
            if state.debounced(Duration::from_millis(config.debounce_ms)) {
                None
            } else {
                shared
                    .index
                    .lock()
                    .unwrap()
                    .longest_suffix_match(&snapshot)
                    .map(|(key, content)| (key.to_string(), content.to_string()))
            }
        };
        let (trigger_key, expansion) = match matched {
            Some(pair) => pair,
            None => continue,
        };

        shared.is_replacing.store(true, Ordering::SeqCst);
        let worker_shared = Arc::clone(&shared);
        let worker_config = config.clone();
        let worker_classifier = Arc::clone(&classifier);
        thread::spawn(move || {
            run_replacement(
                worker_shared,
                worker_config,
                worker_classifier,
                trigger_key,
                expansion,
            )
        });
    }
}

/// One replacement, on its own thread. The cleanup runs whether or not the
/// injection succeeded.
fn run_replacement(
    shared: Arc<Shared>,
    config: EngineConfig,
    classifier: Arc<dyn ForegroundClassifier>,
    trigger_key: String,
    expansion: String,
) {
    // Let the IME finish composing before synthetic events go out.
    thread::sleep(Duration::from_millis(config.settle_delay_ms));
    shared.suspended.store(true, Ordering::SeqCst);

    let plan = inject::plan_replacement(
        &trigger_key,
        &expansion,
        classifier.is_console(),
        config.direct_type_max,
    );
    log::debug!(
        "replacing {:?}: erase {}, strategy {:?}",
        trigger_key,
        plan.erase_count,
        plan.strategy
    );
    if let Err(err) = inject::execute_plan(&plan, &config) {
        log::warn!("replacement for {:?} failed: {}", trigger_key, err);
    }

    shared.suspended.store(false, Ordering::SeqCst);
    {
        let mut state = shared.state.lock().unwrap();
        state.reset_transient();
        state.mark_replaced();
    }
    shared.is_replacing.store(false, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::TerminatorKey;

    fn press(state: &mut EngineState, class: KeyClass) -> Option<String> {
        state.on_key(class, true, 16)
    }

    fn release(state: &mut EngineState, class: KeyClass) {
        state.on_key(class, false, 16);
    }

    fn type_str(state: &mut EngineState, text: &str) {
        for c in text.chars() {
            press(state, KeyClass::Printable(c));
        }
    }

    #[test]
    fn test_printable_appends() {
        let mut state = EngineState::new();
        type_str(&mut state, "rt");
        assert_eq!(state.buffer(), "rt");
    }

    #[test]
    fn test_terminator_snapshots_and_clears() {
        let mut state = EngineState::new();
        type_str(&mut state, "rt");
        let snapshot = press(&mut state, KeyClass::Terminator(TerminatorKey::Space));
        assert_eq!(snapshot.as_deref(), Some("rt"));
        assert_eq!(state.buffer(), "");

        // Empty buffer yields no snapshot
        assert_eq!(
            press(&mut state, KeyClass::Terminator(TerminatorKey::Tab)),
            None
        );
    }

    #[test]
    fn test_ctrl_chord_clears_buffer() {
        let mut state = EngineState::new();
        type_str(&mut state, "rt");
        press(&mut state, KeyClass::Modifier(ModifierKey::Ctrl));
        press(&mut state, KeyClass::Printable('c'));
        assert_eq!(state.buffer(), "");

        // Releasing the modifier does not bring lost content back
        release(&mut state, KeyClass::Modifier(ModifierKey::Ctrl));
        assert_eq!(state.buffer(), "");
        press(&mut state, KeyClass::Printable('r'));
        assert_eq!(state.buffer(), "r");
    }

    #[test]
    fn test_shift_does_not_clear_buffer() {
        let mut state = EngineState::new();
        type_str(&mut state, "r");
        press(&mut state, KeyClass::Modifier(ModifierKey::Shift));
        assert!(state.shift());
        press(&mut state, KeyClass::Printable('R'));
        assert_eq!(state.buffer(), "rR");
        release(&mut state, KeyClass::Modifier(ModifierKey::Shift));
        assert!(!state.shift());
    }

    #[test]
    fn test_navigation_clears_buffer() {
        let mut state = EngineState::new();
        type_str(&mut state, "rt");
        press(&mut state, KeyClass::Navigation);
        assert_eq!(state.buffer(), "");
    }

    #[test]
    fn test_backspace_pops() {
        let mut state = EngineState::new();
        type_str(&mut state, "rt");
        press(&mut state, KeyClass::Backspace);
        assert_eq!(state.buffer(), "r");
        press(&mut state, KeyClass::Backspace);
        press(&mut state, KeyClass::Backspace);
        assert_eq!(state.buffer(), "");
    }

    #[test]
    fn test_buffer_trims_from_front() {
        let mut state = EngineState::new();
        for c in "abcdefgh".chars() {
            state.on_key(KeyClass::Printable(c), true, 4);
        }
        assert_eq!(state.buffer(), "efgh");
    }

    #[test]
    fn test_key_release_ignored_for_non_modifiers() {
        let mut state = EngineState::new();
        type_str(&mut state, "rt");
        state.on_key(KeyClass::Terminator(TerminatorKey::Space), false, 16);
        assert_eq!(state.buffer(), "rt");
    }

    #[test]
    fn test_debounce_window() {
        let mut state = EngineState::new();
        assert!(!state.debounced(Duration::from_millis(300)));
        state.mark_replaced();
        assert!(state.debounced(Duration::from_millis(300)));
        assert!(!state.debounced(Duration::ZERO));
    }

    #[test]
    fn test_reset_transient_clears_modifiers() {
        let mut state = EngineState::new();
        press(&mut state, KeyClass::Modifier(ModifierKey::Ctrl));
        press(&mut state, KeyClass::Modifier(ModifierKey::Shift));
        type_str(&mut state, "x");
        state.reset_transient();
        assert_eq!(state.buffer(), "");
        assert!(!state.shift());
        // Ctrl flag cleared: the next printable appends again
        press(&mut state, KeyClass::Printable('r'));
        assert_eq!(state.buffer(), "r");
    }
}
