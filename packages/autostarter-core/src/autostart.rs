//! Dispatch of add/remove/status to the strategy for the running platform.

use crate::config::AutostartConfig;
use crate::error::{AutostartError, Result};
use crate::id::{validate_identifier, IdGenerator, UuidGenerator};
use crate::platform::{
    is_elevated, strategy_for, Platform, Scope, StartupDirs, StartupEntry, StartupStrategy,
};
use serde::Serialize;
use std::path::PathBuf;

/// Options for [`Autostarter::add`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Identifier for the entry; a fresh one is generated when absent or empty
    pub identifier: Option<String>,
    /// Register for all users. Requires root/administrator privileges.
    pub system_wide: bool,
    /// CLI arguments appended to the invocation
    pub arguments: String,
    /// Program that runs the script; defaults to "cmd" on Windows, "sh" elsewhere
    pub interpreter: Option<String>,
}

impl AddOptions {
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn system_wide(mut self, system_wide: bool) -> Self {
        self.system_wide = system_wide;
        self
    }

    pub fn arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = arguments.into();
        self
    }

    pub fn interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }
}

/// Options for [`Autostarter::remove`] and [`Autostarter::status`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Target the system-wide (all users) entry
    pub system_wide: bool,
}

impl RemoveOptions {
    pub fn system_wide(system_wide: bool) -> Self {
        Self { system_wide }
    }
}

/// On-disk state of a startup entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryStatus {
    pub identifier: String,
    pub platform: Platform,
    pub scope: Scope,
    pub directory: PathBuf,
    /// Artifact files that exist
    pub present: Vec<PathBuf>,
    /// Artifact files that do not exist
    pub missing: Vec<PathBuf>,
    /// True when every artifact file exists
    pub registered: bool,
}

/// Adds and removes startup entries through one platform strategy
pub struct Autostarter {
    strategy: Box<dyn StartupStrategy>,
    id_generator: Box<dyn IdGenerator>,
    default_interpreter: Option<String>,
}

impl Autostarter {
    /// Strategy for the running platform with its conventional directories
    pub fn new() -> Result<Self> {
        Self::for_platform(Platform::current()?)
    }

    /// Strategy for a named OS (`windows`, `macos`/`darwin`, `linux`)
    pub fn for_os(os_name: &str) -> Result<Self> {
        let platform = Platform::from_os_name(os_name)
            .ok_or_else(|| AutostartError::UnsupportedPlatform(os_name.to_string()))?;
        Self::for_platform(platform)
    }

    pub fn for_platform(platform: Platform) -> Result<Self> {
        Ok(Self::with_dirs(platform, StartupDirs::conventional(platform)?))
    }

    /// Strategy for `platform` writing into explicit directories
    pub fn with_dirs(platform: Platform, dirs: StartupDirs) -> Self {
        Self {
            strategy: strategy_for(platform, dirs),
            id_generator: Box::new(UuidGenerator),
            default_interpreter: None,
        }
    }

    /// Running platform, with directory and interpreter overrides applied
    pub fn from_config(config: &AutostartConfig) -> Result<Self> {
        let platform = Platform::current()?;
        let dirs = StartupDirs::conventional(platform)?.with_overrides(
            config.directories.per_user.clone(),
            config.directories.system_wide.clone(),
        );

        let mut autostarter = Self::with_dirs(platform, dirs);
        autostarter.default_interpreter = config.interpreter().map(str::to_string);
        Ok(autostarter)
    }

    /// Replace the source of identifiers for entries added without one
    pub fn with_id_generator(mut self, generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Box::new(generator);
        self
    }

    pub fn platform(&self) -> Platform {
        self.strategy.platform()
    }

    pub fn dirs(&self) -> &StartupDirs {
        self.strategy.dirs()
    }

    /// Interpreter used when [`AddOptions::interpreter`] is not set
    pub fn default_interpreter(&self) -> &str {
        self.default_interpreter
            .as_deref()
            .unwrap_or_else(|| self.platform().default_interpreter())
    }

    /// Register `script_location` to run at login. Returns the identifier used.
    pub fn add(&self, script_location: &str, options: &AddOptions) -> Result<String> {
        let identifier = match options.identifier.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.id_generator.generate(),
        };
        validate_identifier(&identifier)?;

        let scope = Scope::from_system_wide(options.system_wide);
        warn_if_not_elevated(scope, "add");

        let interpreter = options
            .interpreter
            .clone()
            .unwrap_or_else(|| self.default_interpreter().to_string());

        let entry = StartupEntry {
            identifier,
            script_location: script_location.to_string(),
            interpreter,
            arguments: options.arguments.clone(),
            scope,
        };

        self.strategy.add(&entry)?;

        tracing::info!(
            "Added {} startup entry '{}' for {} in {}",
            scope,
            entry.identifier,
            script_location,
            self.strategy.startup_folder(scope).display()
        );
        Ok(entry.identifier)
    }

    /// Remove the entry's files. Removing an entry that does not exist succeeds.
    pub fn remove(&self, identifier: &str, options: &RemoveOptions) -> Result<bool> {
        validate_identifier(identifier)?;

        let scope = Scope::from_system_wide(options.system_wide);
        warn_if_not_elevated(scope, "remove");

        let removed = self.strategy.remove(identifier, scope);
        if removed {
            tracing::info!("Removed {} startup entry '{}'", scope, identifier);
        } else {
            tracing::warn!("Could not fully remove {} startup entry '{}'", scope, identifier);
        }
        Ok(removed)
    }

    /// Report which artifact files of the entry exist
    pub fn status(&self, identifier: &str, options: &RemoveOptions) -> Result<EntryStatus> {
        validate_identifier(identifier)?;

        let scope = Scope::from_system_wide(options.system_wide);
        let (present, missing): (Vec<PathBuf>, Vec<PathBuf>) = self
            .strategy
            .artifact_paths(identifier, scope)
            .into_iter()
            .partition(|path| path.exists());

        Ok(EntryStatus {
            identifier: identifier.to_string(),
            platform: self.platform(),
            scope,
            directory: self.strategy.startup_folder(scope).to_path_buf(),
            registered: missing.is_empty(),
            present,
            missing,
        })
    }
}

fn warn_if_not_elevated(scope: Scope, operation: &str) {
    if scope.is_system_wide() && !is_elevated() {
        tracing::warn!(
            "System-wide {} without elevated privileges; this usually needs root/administrator",
            operation
        );
    }
}

/// Add a startup entry for the running platform. See [`Autostarter::add`].
pub fn add(script_location: &str, options: &AddOptions) -> Result<String> {
    Autostarter::new()?.add(script_location, options)
}

/// Remove a startup entry for the running platform. See [`Autostarter::remove`].
pub fn remove(identifier: &str, options: &RemoveOptions) -> Result<bool> {
    Autostarter::new()?.remove(identifier, options)
}

/// Query a startup entry for the running platform. See [`Autostarter::status`].
pub fn status(identifier: &str, options: &RemoveOptions) -> Result<EntryStatus> {
    Autostarter::new()?.status(identifier, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn linux(tmp: &tempfile::TempDir) -> Autostarter {
        Autostarter::with_dirs(
            Platform::Linux,
            StartupDirs::new(tmp.path().join("user"), tmp.path().join("system")),
        )
    }

    #[test]
    fn test_unknown_os_is_unsupported() {
        match Autostarter::for_os("plan9") {
            Err(AutostartError::UnsupportedPlatform(os)) => assert_eq!(os, "plan9"),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("plan9 should be unsupported"),
        }
    }

    #[test]
    fn test_generated_identifiers_differ() {
        let tmp = tempfile::tempdir().unwrap();
        let autostarter = linux(&tmp);

        let first = autostarter.add("/bin/true", &AddOptions::default()).unwrap();
        let second = autostarter.add("/bin/true", &AddOptions::default()).unwrap();

        assert!(!first.is_empty());
        assert_ne!(first, second);
    }

    #[test]
    fn test_injected_generator_and_empty_identifier() {
        let tmp = tempfile::tempdir().unwrap();
        let counter = AtomicUsize::new(0);
        let autostarter = linux(&tmp).with_id_generator(move || {
            format!("entry-{}", counter.fetch_add(1, Ordering::SeqCst))
        });

        let id = autostarter
            .add("/bin/true", &AddOptions::default().identifier(""))
            .unwrap();
        assert_eq!(id, "entry-0");
        assert!(tmp.path().join("user").join("entry-0.sh").exists());

        let id = autostarter.add("/bin/true", &AddOptions::default()).unwrap();
        assert_eq!(id, "entry-1");
    }

    #[test]
    fn test_padded_identifier_is_used_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let autostarter = linux(&tmp);
        let options = RemoveOptions::default();

        let id = autostarter
            .add("/bin/true", &AddOptions::default().identifier(" job "))
            .unwrap();
        assert_eq!(id, " job ");
        assert!(autostarter.status(" job ", &options).unwrap().registered);
        assert!(!autostarter.status("job", &options).unwrap().registered);

        assert!(autostarter.remove(" job ", &options).unwrap());
        assert_eq!(std::fs::read_dir(tmp.path().join("user")).unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_identifier_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let autostarter = linux(&tmp);

        let err = autostarter
            .add("/bin/true", &AddOptions::default().identifier("../escape"))
            .unwrap_err();
        assert!(matches!(err, AutostartError::InvalidIdentifier(_)));
        assert!(!tmp.path().join("user").exists());

        assert!(autostarter.remove("a/b", &RemoveOptions::default()).is_err());
    }

    #[test]
    fn test_default_interpreter_per_platform() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = StartupDirs::new(tmp.path().join("user"), tmp.path().join("system"));

        let windows = Autostarter::with_dirs(Platform::Windows, dirs.clone());
        windows
            .add("job.bat", &AddOptions::default().identifier("job"))
            .unwrap();
        let batch = std::fs::read_to_string(tmp.path().join("user").join("job.bat")).unwrap();
        assert_eq!(batch, "@echo off\r\ncmd job.bat\r\n");

        let macos = Autostarter::with_dirs(Platform::Darwin, dirs);
        macos
            .add("/opt/job", &AddOptions::default().identifier("job").interpreter("zsh"))
            .unwrap();
        let script = std::fs::read_to_string(tmp.path().join("user").join("job.sh")).unwrap();
        assert_eq!(script, "#!/bin/bash\n\nzsh /opt/job\n");
    }

    #[test]
    fn test_status_reports_partial_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let autostarter = linux(&tmp);
        let options = RemoveOptions::default();

        let status = autostarter.status("job", &options).unwrap();
        assert!(!status.registered);
        assert!(status.present.is_empty());

        autostarter
            .add("/bin/true", &AddOptions::default().identifier("job"))
            .unwrap();
        assert!(autostarter.status("job", &options).unwrap().registered);

        std::fs::remove_file(tmp.path().join("user").join("job.desktop")).unwrap();
        let status = autostarter.status("job", &options).unwrap();
        assert!(!status.registered);
        assert_eq!(status.present, vec![tmp.path().join("user").join("job.sh")]);
        assert_eq!(status.missing, vec![tmp.path().join("user").join("job.desktop")]);
    }
}
