use super::{home_dir, Platform, StartupDirs, StartupEntry, StartupStrategy};
use crate::error::Result;
use crate::fs::{write_artifacts, Artifact};

const SYSTEM_WIDE_DIR: &str = "/Library/LaunchAgents";

/// Shell script plus a LaunchAgent property list pointing at it
pub struct MacosStrategy {
    dirs: StartupDirs,
}

impl MacosStrategy {
    pub fn new(dirs: StartupDirs) -> Self {
        Self { dirs }
    }
}

impl StartupStrategy for MacosStrategy {
    fn platform(&self) -> Platform {
        Platform::Darwin
    }

    fn dirs(&self) -> &StartupDirs {
        &self.dirs
    }

    fn add(&self, entry: &StartupEntry) -> Result<()> {
        let start_dir = self.startup_folder(entry.scope);
        let script_path = start_dir.join(format!("{}.sh", entry.identifier));
        let plist_path = start_dir.join(format!("{}.plist", entry.identifier));

        let plist_content = launch_agent_plist(&entry.identifier, &script_path.to_string_lossy());

        // launchd refuses to run the script without execute permission
        write_artifacts(
            start_dir,
            &[
                Artifact::executable(script_path, entry.shell_script()),
                Artifact::descriptor(plist_path, plist_content),
            ],
        )
    }
}

/// Render `{Label, ProgramArguments: [script], RunAtLoad: true}` as an XML plist
fn launch_agent_plist(label: &str, script_path: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>Label</key>
	<string>{}</string>
	<key>ProgramArguments</key>
	<array>
		<string>{}</string>
	</array>
	<key>RunAtLoad</key>
	<true/>
</dict>
</plist>
"#,
        escape_xml(label),
        escape_xml(script_path)
    )
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub(super) fn conventional_dirs() -> Result<StartupDirs> {
    let home = home_dir()?;
    Ok(StartupDirs::new(
        home.join("Library").join("LaunchAgents"),
        SYSTEM_WIDE_DIR,
    ))
}
