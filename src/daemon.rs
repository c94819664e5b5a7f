//! Daemon lifecycle: a PID-file single-instance background process that owns
//! the expansion engine and keeps its trigger index in sync with the store.

use crate::config::{
    ensure_config_dir, get_config_dir, get_pid_file_path, get_store_file_path, is_daemon_running,
    load_engine_config,
};
use crate::engine::SnippetEngine;
use crate::error::{ExpandError, Result};
use crate::storage::{load_triggers, seed_default_store};
use std::fs::{self, File};
use std::io::Write;
use std::process;
use std::time::{Duration, SystemTime};

/// How often the worker polls the store file for external edits.
const STORE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Start the daemon process in the background.
pub fn start_daemon() -> Result<()> {
    if let Some(pid) = is_daemon_running()? {
        return Err(ExpandError::DaemonAlreadyRunning(pid));
    }

    ensure_config_dir()?;
    seed_default_store()?;

    #[cfg(unix)]
    {
        use daemonize::Daemonize;
        println!("Starting danchu daemon in the background");

        let log_path = get_config_dir().join("daemon.log");
        let daemonize = Daemonize::new()
            .working_directory("/tmp")
            .stdout(File::create(&log_path)?)
            .stderr(File::create(&log_path)?);

        match daemonize.start() {
            // We are the daemon process now
            Ok(_) => run_daemon_worker(),
            Err(e) => Err(ExpandError::Other(format!("Error starting daemon: {}", e))),
        }
    }

    #[cfg(windows)]
    {
        use std::process::Command;
        use std::thread;

        let current_exe = std::env::current_exe()?;
        let log_path = get_config_dir().join("daemon.log");
        let cmd = format!(
            "START /B \"danchu\" \"{}\" daemon-worker > \"{}\" 2>&1",
            current_exe.to_string_lossy(),
            log_path.to_string_lossy()
        );
        Command::new("cmd").arg("/C").arg(&cmd).status()?;

        // Wait for the child to write its PID file
        for _ in 0..20 {
            thread::sleep(Duration::from_millis(100));
            if is_daemon_running()?.is_some() {
                println!("danchu daemon started");
                return Ok(());
            }
        }
        Err(ExpandError::Other(format!(
            "Daemon failed to start. Check logs at {}",
            log_path.display()
        )))
    }

    #[cfg(not(any(unix, windows)))]
    {
        println!("Starting danchu daemon in the foreground (background not supported here)");
        run_daemon_worker()
    }
}

/// The daemon worker: owns the engine for the process lifetime.
pub fn run_daemon_worker() -> Result<()> {
    let pid_file = get_pid_file_path();
    let mut file = File::create(&pid_file)?;
    write!(file, "{}", process::id())?;

    seed_default_store()?;
    let triggers = load_triggers()?;

    let engine = SnippetEngine::new(load_engine_config());
    engine.refresh_triggers(&triggers);
    engine.start()?;
    log::info!("engine started with {} trigger(s)", triggers.len());

    // Poll the store so CLI edits from another process reach the running
    // engine without IPC.
    let store_path = get_store_file_path();
    let mut last_seen = store_mtime(&store_path);
    while engine.is_running() {
        std::thread::sleep(STORE_POLL_INTERVAL);

        let mtime = store_mtime(&store_path);
        if mtime != last_seen {
            last_seen = mtime;
            match load_triggers() {
                Ok(triggers) => {
                    log::info!("trigger store changed, {} trigger(s)", triggers.len());
                    engine.refresh_triggers(&triggers);
                }
                Err(e) => log::warn!("failed to reload trigger store: {}", e),
            }
        }
    }

    if let Err(e) = fs::remove_file(&pid_file) {
        log::warn!("failed to remove PID file: {}", e);
    }
    Ok(())
}

fn store_mtime(path: &std::path::Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Stop the daemon if it is running.
pub fn stop_daemon() -> Result<()> {
    let pid_file = get_pid_file_path();

    if !pid_file.exists() {
        return Err(ExpandError::DaemonNotRunning);
    }

    let pid_str = fs::read_to_string(&pid_file)?;
    let pid = pid_str
        .trim()
        .parse::<u32>()
        .map_err(|_| ExpandError::InvalidPid)?;

    #[cfg(unix)]
    {
        let status = std::process::Command::new("kill")
            .arg(pid.to_string())
            .status();

        if let Ok(status) = status {
            if status.success() {
                println!("Stopped danchu daemon with PID {}", pid);
                fs::remove_file(&pid_file)?;
                return Ok(());
            }
        }

        Err(ExpandError::Other(format!(
            "Failed to stop daemon with PID {}",
            pid
        )))
    }

    #[cfg(windows)]
    {
        use std::process::Command;
        let status = Command::new("taskkill")
            .args(["/PID", &pid.to_string(), "/F"])
            .status();

        if let Ok(status) = status {
            if status.success() {
                println!("Stopped danchu daemon with PID {}", pid);
                fs::remove_file(&pid_file)?;
                return Ok(());
            }
        }

        Err(ExpandError::Other(format!(
            "Failed to stop daemon with PID {}",
            pid
        )))
    }

    #[cfg(not(any(unix, windows)))]
    {
        Err(ExpandError::Other(
            "Stopping daemon not supported on this platform".to_string(),
        ))
    }
}

/// Print whether the daemon is running.
pub fn daemon_status() -> Result<()> {
    match is_daemon_running()? {
        Some(pid) => println!("danchu daemon is running with PID {}", pid),
        None => println!("danchu daemon is not running"),
    }
    Ok(())
}
