//! Platform detection and the per-platform startup strategies.
//!
//! Each supported operating system has its own on-disk representation of a
//! startup entry:
//! - Windows: `{id}.bat` in the Start Menu `Startup` folder
//! - macOS: `{id}.sh` + `{id}.plist` in `LaunchAgents`
//! - Linux: `{id}.sh` + `{id}.desktop` in the XDG `autostart` folder

mod linux;
mod macos;
mod windows;

pub use linux::LinuxStrategy;
pub use macos::MacosStrategy;
pub use windows::WindowsStrategy;

use crate::error::{AutostartError, Result};
use crate::fs::remove_all;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Operating systems with a startup strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Windows,
    Darwin,
    Linux,
}

impl Platform {
    /// Map an OS name (`std::env::consts::OS` style, or `darwin`) to a platform
    pub fn from_os_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "windows" => Some(Platform::Windows),
            "macos" | "darwin" => Some(Platform::Darwin),
            "linux" => Some(Platform::Linux),
            _ => None,
        }
    }

    /// The platform this process runs on. Detected once per process.
    pub fn current() -> Result<Self> {
        static CURRENT: OnceLock<Option<Platform>> = OnceLock::new();

        CURRENT
            .get_or_init(|| Platform::from_os_name(std::env::consts::OS))
            .ok_or_else(|| AutostartError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    /// Interpreter used when the caller does not name one
    pub fn default_interpreter(self) -> &'static str {
        match self {
            Platform::Windows => "cmd",
            Platform::Darwin | Platform::Linux => "sh",
        }
    }

    /// File extensions making up one startup entry
    pub fn artifact_extensions(self) -> &'static [&'static str] {
        match self {
            Platform::Windows => &["bat"],
            Platform::Darwin => &["plist", "sh"],
            Platform::Linux => &["sh", "desktop"],
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Windows => write!(f, "windows"),
            Platform::Darwin => write!(f, "darwin"),
            Platform::Linux => write!(f, "linux"),
        }
    }
}

/// Whether an entry applies to the current user or to every user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    PerUser,
    SystemWide,
}

impl Scope {
    pub fn from_system_wide(system_wide: bool) -> Self {
        if system_wide {
            Scope::SystemWide
        } else {
            Scope::PerUser
        }
    }

    pub fn is_system_wide(self) -> bool {
        self == Scope::SystemWide
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::PerUser => write!(f, "per-user"),
            Scope::SystemWide => write!(f, "system-wide"),
        }
    }
}

/// Directories a strategy writes entries into, one per scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupDirs {
    pub per_user: PathBuf,
    pub system_wide: PathBuf,
}

impl StartupDirs {
    pub fn new(per_user: impl Into<PathBuf>, system_wide: impl Into<PathBuf>) -> Self {
        Self {
            per_user: per_user.into(),
            system_wide: system_wide.into(),
        }
    }

    /// The platform's conventional startup directories for the current user
    pub fn conventional(platform: Platform) -> Result<Self> {
        match platform {
            Platform::Windows => windows::conventional_dirs(),
            Platform::Darwin => macos::conventional_dirs(),
            Platform::Linux => linux::conventional_dirs(),
        }
    }

    /// Replace either directory when an override is given
    pub fn with_overrides(mut self, per_user: Option<PathBuf>, system_wide: Option<PathBuf>) -> Self {
        if let Some(dir) = per_user {
            self.per_user = dir;
        }
        if let Some(dir) = system_wide {
            self.system_wide = dir;
        }
        self
    }

    pub fn for_scope(&self, scope: Scope) -> &Path {
        match scope {
            Scope::PerUser => &self.per_user,
            Scope::SystemWide => &self.system_wide,
        }
    }
}

/// Everything needed to write one startup entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupEntry {
    pub identifier: String,
    pub script_location: String,
    pub interpreter: String,
    pub arguments: String,
    pub scope: Scope,
}

impl StartupEntry {
    /// `{interpreter} {script} {arguments}`, skipping empty parts
    pub fn invocation_line(&self) -> String {
        [
            self.interpreter.trim(),
            self.script_location.trim(),
            self.arguments.trim(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Bash wrapper shared by the macOS and Linux strategies
    pub(crate) fn shell_script(&self) -> String {
        format!("#!/bin/bash\n\n{}\n", self.invocation_line())
    }
}

/// Platform-specific way of registering a startup entry
pub trait StartupStrategy: Send + Sync {
    fn platform(&self) -> Platform;

    fn dirs(&self) -> &StartupDirs;

    /// Write the entry's artifact files, replacing any entry with the same identifier
    fn add(&self, entry: &StartupEntry) -> Result<()>;

    /// Delete the entry's artifact files. Missing files are not an error.
    fn remove(&self, identifier: &str, scope: Scope) -> bool {
        remove_all(&self.artifact_paths(identifier, scope))
    }

    fn startup_folder(&self, scope: Scope) -> &Path {
        self.dirs().for_scope(scope)
    }

    /// Paths of every artifact file the entry consists of
    fn artifact_paths(&self, identifier: &str, scope: Scope) -> Vec<PathBuf> {
        let dir = self.startup_folder(scope);
        self.platform()
            .artifact_extensions()
            .iter()
            .map(|ext| dir.join(format!("{}.{}", identifier, ext)))
            .collect()
    }
}

/// Build the strategy for a platform
pub fn strategy_for(platform: Platform, dirs: StartupDirs) -> Box<dyn StartupStrategy> {
    match platform {
        Platform::Windows => Box::new(WindowsStrategy::new(dirs)),
        Platform::Darwin => Box::new(MacosStrategy::new(dirs)),
        Platform::Linux => Box::new(LinuxStrategy::new(dirs)),
    }
}

pub(crate) fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(AutostartError::HomeDirUnavailable)
}

/// Check if the current process is running with elevated privileges
pub fn is_elevated() -> bool {
    #[cfg(target_os = "windows")]
    {
        is_elevated_windows()
    }

    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(any(target_os = "windows", unix)))]
    {
        false
    }
}

#[cfg(target_os = "windows")]
fn is_elevated_windows() -> bool {
    use std::process::Command;

    match Command::new("whoami").args(["/groups"]).output() {
        Ok(output) => {
            let output_str = String::from_utf8_lossy(&output.stdout);
            output_str.contains("S-1-16-12288") || output_str.contains("High Mandatory Level")
        }
        Err(_) => false,
    }
}
