// src/util/process.rs
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::constants::{LAUNCH_GRACE_MS, LAUNCH_POLL_ATTEMPTS, LAUNCH_POLL_DELAY_MS};
use crate::infrastructure::config::LaunchConfig;

/// Start Anki detached from this process.
///
/// Only the spawn itself is checked; whether AnkiConnect actually comes up
/// is the caller's problem and answered by probing the endpoint.
pub fn launch_detached(config: &LaunchConfig) -> Result<()> {
    info!(command = %config.command, args = ?config.args, "Launching Anki");
    Command::new(&config.command)
        .args(&config.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to launch '{}'", config.command))?;
    Ok(())
}

/// Poll `probe` until it reports success or the attempts are exhausted.
pub fn wait_for(probe: impl Fn() -> bool, attempts: u32, delay: Duration) -> bool {
    for attempt in 1..=attempts {
        if probe() {
            debug!(attempt, "Probe succeeded");
            return true;
        }
        debug!(attempt, "Probe failed, waiting");
        thread::sleep(delay);
    }
    false
}

/// Make sure Anki is reachable: probe once, launch it when it is not, give
/// the application a grace period to open its collection, then poll the
/// endpoint. Returns whether the service ended up available.
pub fn ensure_running(probe: impl Fn() -> bool, config: &LaunchConfig) -> Result<bool> {
    if probe() {
        debug!("Anki already reachable");
        return Ok(true);
    }

    launch_detached(config)?;
    thread::sleep(Duration::from_millis(LAUNCH_GRACE_MS));

    let up = wait_for(
        probe,
        LAUNCH_POLL_ATTEMPTS,
        Duration::from_millis(LAUNCH_POLL_DELAY_MS),
    );
    if !up {
        warn!("Anki did not become reachable after launch");
    }
    Ok(up)
}
