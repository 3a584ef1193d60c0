//! Autostarter Core Library
//!
//! This crate registers and unregisters scripts that run automatically when a
//! user (or the whole machine) logs in:
//! - Windows: a batch file in the Start Menu `Startup` folder
//! - macOS: a shell script plus a LaunchAgent property list
//! - Linux: a shell script plus an XDG autostart desktop entry
//!
//! The platform is detected once per process and mapped to a
//! [`StartupStrategy`]. Every operation goes straight to the filesystem; no
//! state is cached between calls.
//!
//! # Example
//!
//! ```no_run
//! use autostarter_core::{AddOptions, RemoveOptions};
//!
//! fn main() -> Result<(), autostarter_core::AutostartError> {
//!     let id = autostarter_core::add(
//!         "/usr/local/bin/sync.sh",
//!         &AddOptions::default().arguments("--quiet"),
//!     )?;
//!     println!("Registered startup entry {}", id);
//!
//!     let removed = autostarter_core::remove(&id, &RemoveOptions::default())?;
//!     println!("Removed: {}", removed);
//!     Ok(())
//! }
//! ```

pub mod autostart;
pub mod config;
pub mod error;
pub mod fs;
pub mod id;
pub mod platform;

// Re-export commonly used types
pub use autostart::{add, remove, status, AddOptions, Autostarter, EntryStatus, RemoveOptions};
pub use config::{load_config, AutostartConfig, ConfigSource};
pub use error::{AutostartError, Result};
pub use id::{IdGenerator, UuidGenerator};
pub use platform::{Platform, Scope, StartupDirs, StartupEntry, StartupStrategy};
