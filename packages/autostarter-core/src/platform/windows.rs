use super::{home_dir, Platform, StartupDirs, StartupEntry, StartupStrategy};
use crate::error::Result;
use crate::fs::{write_artifacts, Artifact};
use std::path::PathBuf;

const SYSTEM_WIDE_DIR: &str = r"C:\ProgramData\Microsoft\Windows\Start Menu\Programs\StartUp";

/// Batch file in the Start Menu `Startup` folder
pub struct WindowsStrategy {
    dirs: StartupDirs,
}

impl WindowsStrategy {
    pub fn new(dirs: StartupDirs) -> Self {
        Self { dirs }
    }
}

impl StartupStrategy for WindowsStrategy {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn dirs(&self) -> &StartupDirs {
        &self.dirs
    }

    fn add(&self, entry: &StartupEntry) -> Result<()> {
        let start_dir = self.startup_folder(entry.scope);
        let batch_path = start_dir.join(format!("{}.bat", entry.identifier));
        let batch_content = format!("@echo off\r\n{}\r\n", entry.invocation_line());

        write_artifacts(start_dir, &[Artifact::descriptor(batch_path, batch_content)])
    }
}

pub(super) fn conventional_dirs() -> Result<StartupDirs> {
    // dirs::data_dir() is {FOLDERID_RoamingAppData} (%APPDATA%) on Windows
    let roaming: PathBuf = match dirs::data_dir() {
        Some(dir) => dir,
        None => home_dir()?.join("AppData").join("Roaming"),
    };

    let per_user = ["Microsoft", "Windows", "Start Menu", "Programs", "Startup"]
        .iter()
        .fold(roaming, |path, part| path.join(part));

    Ok(StartupDirs::new(per_user, SYSTEM_WIDE_DIR))
}
