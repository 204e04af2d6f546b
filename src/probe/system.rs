//! Static platform report shown once at startup

use std::env;
use std::fs;
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemReport {
    pub cpu_arch: String,
    pub os_name: String,
    pub kernel_name: String,
    pub kernel_version: String,
    pub recorder: String,
    pub recorder_available: bool,
}

impl SystemReport {
    /// The single info line rendered at the top of the window.
    pub fn summary(&self) -> String {
        format!(
            "CPU: {} | OS: {} | Kernel: {} {} | {}: {}",
            self.cpu_arch,
            self.os_name,
            self.kernel_name,
            self.kernel_version,
            self.recorder,
            if self.recorder_available {
                "available"
            } else {
                "not found"
            }
        )
    }
}

/// Collect the report. Reads /etc/os-release and runs `uname` twice;
/// called once while the window is being built.
pub fn collect(recorder: &str, recorder_available: bool) -> SystemReport {
    SystemReport {
        cpu_arch: env::consts::ARCH.to_string(),
        os_name: os_pretty_name(),
        kernel_name: uname("-s"),
        kernel_version: uname("-r"),
        recorder: recorder.to_string(),
        recorder_available,
    }
}

fn os_pretty_name() -> String {
    fs::read_to_string("/etc/os-release")
        .ok()
        .and_then(|content| pretty_name_from(&content))
        .unwrap_or_else(|| env::consts::OS.to_string())
}

fn pretty_name_from(os_release: &str) -> Option<String> {
    os_release
        .lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|value| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

fn uname(flag: &str) -> String {
    Command::new("uname")
        .arg(flag)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|stdout| stdout.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
