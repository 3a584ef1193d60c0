use super::{home_dir, Platform, StartupDirs, StartupEntry, StartupStrategy};
use crate::error::Result;
use crate::fs::{write_artifacts, Artifact};

const SYSTEM_WIDE_DIR: &str = "/etc/init.d";

/// Shell script plus an XDG autostart desktop entry
pub struct LinuxStrategy {
    dirs: StartupDirs,
}

impl LinuxStrategy {
    pub fn new(dirs: StartupDirs) -> Self {
        Self { dirs }
    }
}

impl StartupStrategy for LinuxStrategy {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn dirs(&self) -> &StartupDirs {
        &self.dirs
    }

    fn add(&self, entry: &StartupEntry) -> Result<()> {
        let start_dir = self.startup_folder(entry.scope);
        let script_path = start_dir.join(format!("{}.sh", entry.identifier));
        let desktop_path = start_dir.join(format!("{}.desktop", entry.identifier));

        let desktop_content = format!(
            "[Desktop Entry]\nType=Application\nName={}\nExec={}\n",
            entry.identifier,
            desktop_exec_value(&script_path.to_string_lossy())
        );

        write_artifacts(
            start_dir,
            &[
                Artifact::executable(script_path, entry.shell_script()),
                Artifact::descriptor(desktop_path, desktop_content),
            ],
        )
    }
}

/// Encode a program path for the `Exec=` key of a desktop entry.
///
/// Paths with reserved characters are double-quoted with `"`, `` ` ``, `$`
/// and `\` backslash-escaped; string-level escaping then doubles every
/// backslash. `%` is doubled so it is not read as a field code.
fn desktop_exec_value(program: &str) -> String {
    const RESERVED: &[char] = &[
        ' ', '\t', '\n', '"', '\'', '\\', '>', '<', '~', '|', '&', ';', '$', '*', '?', '#', '(',
        ')', '`',
    ];

    let program = program.replace('%', "%%");
    let quoted = if program.contains(RESERVED) {
        let mut quoted = String::with_capacity(program.len() + 2);
        quoted.push('"');
        for c in program.chars() {
            if matches!(c, '"' | '`' | '$' | '\\') {
                quoted.push('\\');
            }
            quoted.push(c);
        }
        quoted.push('"');
        quoted
    } else {
        program
    };

    quoted
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}

pub(super) fn conventional_dirs() -> Result<StartupDirs> {
    let config_home = match dirs::config_dir() {
        Some(dir) => dir,
        None => home_dir()?.join(".config"),
    };

    Ok(StartupDirs::new(config_home.join("autostart"), SYSTEM_WIDE_DIR))
}
