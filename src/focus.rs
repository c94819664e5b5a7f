//! Foreground window classification: is the user typing into a terminal?
//!
//! Paste chords behave unpredictably in console hosts, so the actuator types
//! text directly there. The classifier is a trait so tests can pin the
//! answer.

use std::sync::Arc;

pub trait ForegroundClassifier: Send + Sync {
    /// True when the active window looks like a terminal or console.
    fn is_console(&self) -> bool;
}

/// Classifier with a fixed answer.
pub struct FixedClassifier(pub bool);

impl ForegroundClassifier for FixedClassifier {
    fn is_console(&self) -> bool {
        self.0
    }
}

/// Window-class substrings that identify a terminal host.
#[cfg_attr(not(windows), allow(dead_code))]
const TERMINAL_CLASS_HINTS: &[&str] = &[
    "consolewindowclass",
    "cascadia_hosting_window_class",
    "mintty",
    "terminal",
    "putty",
    "vte",
];

/// Terminal executables, checked when the window class is inconclusive.
#[cfg_attr(not(windows), allow(dead_code))]
const TERMINAL_PROGRAMS: &[&str] = &[
    "cmd.exe",
    "powershell.exe",
    "pwsh.exe",
    "windowsterminal.exe",
    "wt.exe",
    "openconsole.exe",
    "conhost.exe",
    "mintty.exe",
    "alacritty.exe",
    "wezterm-gui.exe",
    "hyper.exe",
];

#[cfg_attr(not(windows), allow(dead_code))]
fn class_looks_like_terminal(class_name: &str) -> bool {
    let lower = class_name.to_lowercase();
    TERMINAL_CLASS_HINTS.iter().any(|hint| lower.contains(hint))
}

#[cfg_attr(not(windows), allow(dead_code))]
fn program_looks_like_terminal(image_path: &str) -> bool {
    let lower = image_path.to_lowercase().replace('\\', "/");
    let file = lower.rsplit('/').next().unwrap_or("");
    TERMINAL_PROGRAMS.iter().any(|program| file == *program)
}

/// Classifier backed by the platform window-query API.
pub struct SystemClassifier;

#[cfg(windows)]
impl ForegroundClassifier for SystemClassifier {
    fn is_console(&self) -> bool {
        use windows::core::PWSTR;
        use windows::Win32::Foundation::CloseHandle;
        use windows::Win32::System::Threading::{
            OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
            PROCESS_QUERY_LIMITED_INFORMATION,
        };
        use windows::Win32::UI::WindowsAndMessaging::{
            GetClassNameW, GetForegroundWindow, GetWindowThreadProcessId,
        };

        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.0.is_null() {
                return false;
            }

            let mut class_buf = [0u16; 256];
            let class_len = GetClassNameW(hwnd, &mut class_buf);
            if class_len > 0 {
                let class_name = String::from_utf16_lossy(&class_buf[..class_len as usize]);
                if class_looks_like_terminal(&class_name) {
                    return true;
                }
            }

            let mut pid = 0u32;
            GetWindowThreadProcessId(hwnd, Some(&mut pid));
            if pid == 0 {
                return false;
            }

            let handle = match OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) {
                Ok(handle) => handle,
                Err(err) => {
                    log::debug!("OpenProcess failed for pid {}: {}", pid, err);
                    return false;
                }
            };

            let mut image_buf = [0u16; 512];
            let mut image_len = image_buf.len() as u32;
            let queried = QueryFullProcessImageNameW(
                handle,
                PROCESS_NAME_WIN32,
                PWSTR(image_buf.as_mut_ptr()),
                &mut image_len,
            )
            .is_ok();
            let _ = CloseHandle(handle);
            if !queried {
                return false;
            }

            let image_path = String::from_utf16_lossy(&image_buf[..image_len as usize]);
            program_looks_like_terminal(&image_path)
        }
    }
}

// No window-query API is wired up on other platforms; assume a regular
// window so the clipboard path stays available.
#[cfg(not(windows))]
impl ForegroundClassifier for SystemClassifier {
    fn is_console(&self) -> bool {
        false
    }
}

pub fn system_classifier() -> Arc<dyn ForegroundClassifier> {
    Arc::new(SystemClassifier)
}
