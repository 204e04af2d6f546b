//! External screenshot utility bridge
//!
//! Owns the child process of the system screenshot tool and tracks its
//! lifecycle explicitly: NotStarted -> Running -> Exited. The tool writes
//! its capture to a file named on the command line; the exit status plus
//! that file decide whether a run produced anything.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::{CaptureOrigin, CapturedImage};

/// Screenshot utility driven by default.
pub const DEFAULT_RECORDER: &str = "deepin-screen-recorder";

const SAVE_PATH_FLAG: &str = "--save-path";

/// How long teardown waits for a terminated child before killing it.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(1000);

const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// Where the utility is told to write its capture.
pub fn default_output_path() -> PathBuf {
    std::env::temp_dir().join("screenshot_temp.png")
}

/// Lifecycle of the spawned utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    NotStarted,
    Running,
    Exited { code: Option<i32>, normal: bool },
}

/// What a finished run produced.
pub enum ExternalOutcome {
    /// The tool exited cleanly and left a decodable file behind.
    Captured(CapturedImage),
    /// Anything else: nonzero exit, killed, file missing or unreadable.
    /// Indistinguishable from the user closing the tool, so never
    /// surfaced as an error.
    Dismissed,
}

#[derive(Debug)]
pub enum LaunchError {
    AlreadyRunning,

    Spawn(std::io::Error),
}

impl std::fmt::Display for LaunchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "A capture process is already running"),
            Self::Spawn(e) => write!(f, "Failed to spawn capture process: {}", e),
        }
    }
}

impl std::error::Error for LaunchError {}

/// One bridge lives for the window's lifetime and is reused run after
/// run; concurrent runs are rejected at `launch`.
pub struct RecorderBridge {
    program: String,
    child: Option<Child>,
    state: ProcessState,
    output_path: Option<PathBuf>,
}

impl RecorderBridge {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            child: None,
            state: ProcessState::NotStarted,
            output_path: None,
        }
    }

    /// Bridge for the system screenshot utility.
    pub fn system() -> Self {
        Self::new(DEFAULT_RECORDER)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ProcessState::Running
    }

    /// Synchronous PATH probe, fast enough for the UI thread.
    pub fn tool_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    /// Spawn `<program> --save-path <output_path>`.
    pub fn launch(&mut self, output_path: &Path) -> Result<(), LaunchError> {
        if self.is_running() {
            return Err(LaunchError::AlreadyRunning);
        }

        // A leftover file from an earlier run would make the exit check
        // lie about this one.
        if output_path.exists() {
            let _ = fs::remove_file(output_path);
        }

        let child = Command::new(&self.program)
            .arg(SAVE_PATH_FLAG)
            .arg(output_path)
            .spawn()
            .map_err(LaunchError::Spawn)?;

        info!(
            "Launched {} (pid {}) writing to {}",
            self.program,
            child.id(),
            output_path.display()
        );

        self.child = Some(child);
        self.state = ProcessState::Running;
        self.output_path = Some(output_path.to_path_buf());
        Ok(())
    }

    /// Non-blocking exit check. Returns the run's outcome exactly once,
    /// on the call that observes the exit.
    pub fn poll(&mut self) -> Option<ExternalOutcome> {
        let child = self.child.as_mut()?;

        match child.try_wait() {
            Ok(Some(status)) => {
                // code() is None when a signal killed the child
                self.state = ProcessState::Exited {
                    code: status.code(),
                    normal: status.code().is_some(),
                };
                self.child = None;
                Some(self.evaluate_exit())
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to poll {}: {}", self.program, e);
                // The handle is about to be discarded; without a reap the
                // child would outlive the bridge.
                if let Some(mut child) = self.child.take() {
                    let _ = child.kill();
                    let _ = child.wait();
                }
                self.state = ProcessState::Exited {
                    code: None,
                    normal: false,
                };
                Some(ExternalOutcome::Dismissed)
            }
        }
    }

    fn evaluate_exit(&self) -> ExternalOutcome {
        let ProcessState::Exited { code, normal } = self.state else {
            return ExternalOutcome::Dismissed;
        };

        if code != Some(0) || !normal {
            info!(
                "{} exited without capturing (code {:?})",
                self.program, code
            );
            return ExternalOutcome::Dismissed;
        }

        let Some(path) = self.output_path.as_deref() else {
            return ExternalOutcome::Dismissed;
        };

        if !path.exists() {
            info!(
                "{} exited cleanly but wrote no file, treating as dismissed",
                self.program
            );
            return ExternalOutcome::Dismissed;
        }

        match image::open(path) {
            Ok(loaded) => {
                debug!("Loaded external capture from {}", path.display());
                ExternalOutcome::Captured(CapturedImage::new(
                    loaded.to_rgba8(),
                    CaptureOrigin::ExternalTool,
                ))
            }
            Err(e) => {
                warn!("Failed to decode {}: {}", path.display(), e);
                ExternalOutcome::Dismissed
            }
        }
    }

    /// Ask a running child to terminate and wait up to `SHUTDOWN_GRACE`
    /// for it, then kill. Blocks, but only while the window is closing.
    pub fn shutdown(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        info!("Terminating {} (pid {})", self.program, child.id());
        request_termination(&child);

        let deadline = Instant::now() + SHUTDOWN_GRACE;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    self.state = ProcessState::Exited {
                        code: status.code(),
                        normal: status.code().is_some(),
                    };
                    return;
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        break;
                    }
                    thread::sleep(SHUTDOWN_POLL);
                }
                Err(_) => break,
            }
        }

        warn!("{} ignored the termination request, killing it", self.program);
        let _ = child.kill();
        let _ = child.wait();
        self.state = ProcessState::Exited {
            code: None,
            normal: false,
        };
    }
}

impl Drop for RecorderBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// SIGTERM first, so the tool can exit on its own terms.
fn request_termination(child: &Child) {
    unsafe {
        libc::kill(child.id() as libc::pid_t, libc::SIGTERM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::os::unix::fs::PermissionsExt;

    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn bridge_for(script_path: &Path) -> RecorderBridge {
        RecorderBridge::new(script_path.to_str().unwrap())
    }

    fn poll_until_exit(bridge: &mut RecorderBridge) -> ExternalOutcome {
        for _ in 0..500 {
            if let Some(outcome) = bridge.poll() {
                return outcome;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("external process never exited");
    }

    #[test]
    fn test_absent_tool_is_not_available() {
        let bridge = RecorderBridge::new("screenshot-probe-no-such-tool");
        assert!(!bridge.tool_available());
    }

    #[test]
    fn test_present_tool_is_available() {
        let bridge = RecorderBridge::new("sh");
        assert!(bridge.tool_available());
    }

    #[test]
    fn test_fresh_bridge_is_not_started() {
        let bridge = RecorderBridge::system();
        assert_eq!(bridge.state(), ProcessState::NotStarted);
        assert!(!bridge.is_running());
        assert_eq!(bridge.program(), DEFAULT_RECORDER);
    }

    #[test]
    fn test_successful_run_loads_the_written_file() {
        let dir = TempDir::new().unwrap();
        let fixture = dir.path().join("fixture.png");
        RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]))
            .save(&fixture)
            .unwrap();

        let tool = script(
            &dir,
            "fake-recorder",
            &format!("cp '{}' \"$2\"", fixture.display()),
        );
        let out = dir.path().join("out.png");

        let mut bridge = bridge_for(&tool);
        bridge.launch(&out).unwrap();
        assert!(bridge.is_running());

        match poll_until_exit(&mut bridge) {
            ExternalOutcome::Captured(captured) => {
                assert_eq!(captured.origin, CaptureOrigin::ExternalTool);
                assert_eq!(captured.width(), 2);
                assert_eq!(captured.height(), 2);
                assert_eq!(captured.image.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
            }
            ExternalOutcome::Dismissed => panic!("expected a capture"),
        }
        assert_eq!(
            bridge.state(),
            ProcessState::Exited {
                code: Some(0),
                normal: true
            }
        );
    }

    #[test]
    fn test_nonzero_exit_is_dismissed() {
        let dir = TempDir::new().unwrap();
        let tool = script(&dir, "fake-recorder", "exit 1");
        let out = dir.path().join("out.png");

        let mut bridge = bridge_for(&tool);
        bridge.launch(&out).unwrap();

        assert!(matches!(
            poll_until_exit(&mut bridge),
            ExternalOutcome::Dismissed
        ));
        assert!(!out.exists());
        assert_eq!(
            bridge.state(),
            ProcessState::Exited {
                code: Some(1),
                normal: true
            }
        );
    }

    #[test]
    fn test_clean_exit_without_a_file_is_dismissed() {
        let dir = TempDir::new().unwrap();
        let tool = script(&dir, "fake-recorder", "exit 0");
        let out = dir.path().join("out.png");

        let mut bridge = bridge_for(&tool);
        bridge.launch(&out).unwrap();

        assert!(matches!(
            poll_until_exit(&mut bridge),
            ExternalOutcome::Dismissed
        ));
    }

    #[test]
    fn test_undecodable_output_file_is_dismissed() {
        let dir = TempDir::new().unwrap();
        let tool = script(&dir, "fake-recorder", "echo not-an-image > \"$2\"");
        let out = dir.path().join("out.png");

        let mut bridge = bridge_for(&tool);
        bridge.launch(&out).unwrap();

        assert!(matches!(
            poll_until_exit(&mut bridge),
            ExternalOutcome::Dismissed
        ));
    }

    #[test]
    fn test_stale_output_file_is_removed_at_launch() {
        let dir = TempDir::new().unwrap();
        let tool = script(&dir, "fake-recorder", "exit 0");
        let out = dir.path().join("out.png");
        fs::write(&out, b"stale").unwrap();

        let mut bridge = bridge_for(&tool);
        bridge.launch(&out).unwrap();

        assert!(matches!(
            poll_until_exit(&mut bridge),
            ExternalOutcome::Dismissed
        ));
        assert!(!out.exists());
    }

    #[test]
    fn test_launch_rejects_while_a_run_is_outstanding() {
        let dir = TempDir::new().unwrap();
        let tool = script(&dir, "fake-recorder", "exec sleep 5");
        let out = dir.path().join("out.png");

        let mut bridge = bridge_for(&tool);
        bridge.launch(&out).unwrap();
        assert!(matches!(
            bridge.launch(&out),
            Err(LaunchError::AlreadyRunning)
        ));

        bridge.shutdown();
    }

    #[test]
    fn test_launch_of_a_missing_tool_fails_without_spawning() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.png");

        let mut bridge = RecorderBridge::new("screenshot-probe-no-such-tool");
        assert!(matches!(bridge.launch(&out), Err(LaunchError::Spawn(_))));

        assert_eq!(bridge.state(), ProcessState::NotStarted);
        assert!(!bridge.is_running());
    }

    #[test]
    fn test_shutdown_terminates_within_the_grace_period() {
        let dir = TempDir::new().unwrap();
        let tool = script(&dir, "fake-recorder", "exec sleep 5");
        let out = dir.path().join("out.png");

        let mut bridge = bridge_for(&tool);
        bridge.launch(&out).unwrap();
        assert!(bridge.is_running());

        let started = Instant::now();
        bridge.shutdown();
        assert!(started.elapsed() < SHUTDOWN_GRACE + Duration::from_millis(500));

        assert!(!bridge.is_running());
        assert!(matches!(
            bridge.state(),
            ProcessState::Exited { normal: false, .. }
        ));
    }

    #[test]
    fn test_shutdown_kills_a_child_that_ignores_termination() {
        let dir = TempDir::new().unwrap();
        let tool = script(&dir, "fake-recorder", "trap '' TERM\nsleep 5");
        let out = dir.path().join("out.png");

        let mut bridge = bridge_for(&tool);
        bridge.launch(&out).unwrap();

        let started = Instant::now();
        bridge.shutdown();
        assert!(started.elapsed() < SHUTDOWN_GRACE + Duration::from_millis(500));

        assert!(!bridge.is_running());
        assert!(matches!(
            bridge.state(),
            ProcessState::Exited { normal: false, .. }
        ));
    }

    #[test]
    fn test_shutdown_with_nothing_running_is_a_no_op() {
        let mut bridge = RecorderBridge::system();
        bridge.shutdown();
        assert_eq!(bridge.state(), ProcessState::NotStarted);
    }

    #[test]
    fn test_default_output_path_is_the_temp_file() {
        let path = default_output_path();
        assert!(path.starts_with(std::env::temp_dir()));
        assert_eq!(path.file_name().unwrap(), "screenshot_temp.png");
    }
}
