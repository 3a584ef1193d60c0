//! Filesystem helpers shared by the platform strategies.
//!
//! Adding an entry writes every artifact to a temporary sibling first and
//! only then renames them into place, so a failed add leaves nothing behind.
//! Removing an entry tolerates files that are already gone.

use crate::error::{AutostartError, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Mode for generated shell scripts (rwxr-xr-x)
pub const EXECUTABLE_MODE: u32 = 0o755;
/// Mode for descriptor files (rw-r--r--)
pub const DESCRIPTOR_MODE: u32 = 0o644;

/// A single file belonging to a startup entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
    /// Unix permission bits; ignored on other platforms
    pub mode: u32,
}

impl Artifact {
    pub fn executable(path: PathBuf, contents: String) -> Self {
        Self {
            path,
            contents,
            mode: EXECUTABLE_MODE,
        }
    }

    pub fn descriptor(path: PathBuf, contents: String) -> Self {
        Self {
            path,
            contents,
            mode: DESCRIPTOR_MODE,
        }
    }
}

/// Write all artifacts into `dir`, creating it if needed.
///
/// Either every artifact ends up at its final path or none of them does.
/// Files being replaced are kept as backups until every rename succeeded,
/// so a failed overwrite restores the previous entry.
pub fn write_artifacts(dir: &Path, artifacts: &[Artifact]) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| AutostartError::io("create directory", dir, e))?;

    // Stage everything first; a failure here drops the temp files with it
    let mut staged = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        staged.push((stage(dir, artifact)?, artifact));
    }

    let mut committed: Vec<Replaced<'_>> = Vec::with_capacity(staged.len());
    for (temp, artifact) in staged {
        let backup = match back_up(&artifact.path) {
            Ok(backup) => backup,
            Err(e) => {
                rollback(&committed);
                return Err(e);
            }
        };

        if let Err(e) = temp.persist(&artifact.path) {
            tracing::error!(
                "Failed to move {} into place, rolling back {} file(s)",
                artifact.path.display(),
                committed.len()
            );
            if let Some(backup) = &backup {
                restore(backup, &artifact.path);
            }
            rollback(&committed);
            return Err(AutostartError::io("write", &artifact.path, e.error));
        }
        tracing::debug!("Wrote {}", artifact.path.display());
        committed.push(Replaced {
            target: &artifact.path,
            backup,
        });
    }

    for replaced in &committed {
        if let Some(backup) = &replaced.backup {
            if let Err(e) = fs::remove_file(backup) {
                tracing::warn!("Failed to remove backup {}: {}", backup.display(), e);
            }
        }
    }

    Ok(())
}

/// An artifact moved into place, with the file it replaced parked beside it
struct Replaced<'a> {
    target: &'a Path,
    backup: Option<PathBuf>,
}

fn backup_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.autostarter-backup", name))
}

/// Move an existing target out of the way so a failed add can put it back
fn back_up(target: &Path) -> Result<Option<PathBuf>> {
    match fs::symlink_metadata(target) {
        Ok(_) => {
            let backup = backup_path(target);
            fs::rename(target, &backup).map_err(|e| AutostartError::io("back up", target, e))?;
            Ok(Some(backup))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AutostartError::io("inspect", target, e)),
    }
}

fn restore(backup: &Path, target: &Path) {
    if let Err(e) = fs::rename(backup, target) {
        tracing::error!(
            "Rollback failed to restore {} from {}: {}",
            target.display(),
            backup.display(),
            e
        );
    }
}

fn stage(dir: &Path, artifact: &Artifact) -> Result<NamedTempFile> {
    let mut temp = tempfile::Builder::new()
        .prefix(".autostarter-")
        .tempfile_in(dir)
        .map_err(|e| AutostartError::io("create temporary file in", dir, e))?;

    if let Err(e) = temp
        .write_all(artifact.contents.as_bytes())
        .and_then(|_| temp.flush())
    {
        return Err(AutostartError::io("write", temp.path(), e));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(artifact.mode))
            .map_err(|e| AutostartError::io("set permissions on", temp.path(), e))?;
    }

    Ok(temp)
}

fn rollback(committed: &[Replaced<'_>]) {
    for replaced in committed.iter().rev() {
        if let Err(e) = fs::remove_file(replaced.target) {
            tracing::error!("Rollback failed to remove {}: {}", replaced.target.display(), e);
        }
        if let Some(backup) = &replaced.backup {
            restore(backup, replaced.target);
        }
    }
}

/// Remove every path in the list.
///
/// Missing files count as removed. Any other error is logged and stops the
/// removal with `false`; this never returns an error.
pub fn remove_all<P: AsRef<Path>>(paths: &[P]) -> bool {
    for path in paths {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => tracing::debug!("Removed {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    "File {} tried to be removed, however it was not found",
                    path.display()
                );
            }
            Err(e) => {
                tracing::error!("Failed to remove {}: {}", path.display(), e);
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_artifacts_creates_directory_and_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("autostart");

        let artifacts = [
            Artifact::executable(dir.join("job.sh"), "#!/bin/bash\n".to_string()),
            Artifact::descriptor(dir.join("job.desktop"), "[Desktop Entry]\n".to_string()),
        ];
        write_artifacts(&dir, &artifacts).unwrap();

        assert_eq!(entries(&dir), vec!["job.desktop", "job.sh"]);
        assert_eq!(fs::read_to_string(dir.join("job.sh")).unwrap(), "#!/bin/bash\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_artifacts_applies_modes() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let artifacts = [
            Artifact::executable(tmp.path().join("job.sh"), String::new()),
            Artifact::descriptor(tmp.path().join("job.plist"), String::new()),
        ];
        write_artifacts(tmp.path(), &artifacts).unwrap();

        let mode = |name: &str| {
            fs::metadata(tmp.path().join(name))
                .unwrap()
                .permissions()
                .mode()
                & 0o777
        };
        assert_eq!(mode("job.sh"), 0o755);
        assert_eq!(mode("job.plist"), 0o644);
    }

    #[test]
    fn test_write_artifacts_overwrites_existing_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("job.bat");
        fs::write(&path, "old").unwrap();

        write_artifacts(tmp.path(), &[Artifact::descriptor(path.clone(), "new".into())]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(entries(tmp.path()), vec!["job.bat"]);
    }

    #[test]
    fn test_failed_write_rolls_back_committed_files() {
        let tmp = tempfile::tempdir().unwrap();
        let artifacts = [
            Artifact::executable(tmp.path().join("job.sh"), "script".into()),
            // Parent directory does not exist, so the rename fails
            Artifact::descriptor(tmp.path().join("missing").join("job.desktop"), "entry".into()),
        ];

        let err = write_artifacts(tmp.path(), &artifacts).unwrap_err();

        assert!(matches!(err, AutostartError::Io { .. }));
        assert!(entries(tmp.path()).is_empty(), "left behind: {:?}", entries(tmp.path()));
    }

    #[test]
    fn test_failed_overwrite_restores_previous_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("job.sh");
        fs::write(&script, "old script").unwrap();

        let artifacts = [
            Artifact::executable(script.clone(), "new script".into()),
            Artifact::descriptor(tmp.path().join("missing").join("job.desktop"), "entry".into()),
        ];
        assert!(write_artifacts(tmp.path(), &artifacts).is_err());

        assert_eq!(fs::read_to_string(&script).unwrap(), "old script");
        assert_eq!(entries(tmp.path()), vec!["job.sh"]);
    }

    #[test]
    fn test_remove_all_tolerates_missing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let present = tmp.path().join("job.sh");
        fs::write(&present, "x").unwrap();

        assert!(remove_all(&[present.clone(), tmp.path().join("job.desktop")]));
        assert!(!present.exists());
        assert!(remove_all(&[tmp.path().join("never-existed.sh")]));
    }

    #[test]
    fn test_remove_all_reports_other_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let not_a_file = tmp.path().join("job.sh");
        fs::create_dir(&not_a_file).unwrap();

        assert!(!remove_all(&[not_a_file.clone()]));
        assert!(not_a_file.exists());
    }
}
