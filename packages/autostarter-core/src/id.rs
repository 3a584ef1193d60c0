//! Startup entry identifiers.

use crate::error::{AutostartError, Result};
use uuid::Uuid;

/// Source of fresh identifiers for entries added without one
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Generates hyphenated random (v4) UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Check that an identifier names a file inside the startup directory.
///
/// Identifiers become file stems (`{identifier}.sh`), so anything that could
/// resolve outside the directory is rejected.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    let invalid = identifier.is_empty()
        || identifier == "."
        || identifier == ".."
        || identifier.contains(['/', '\\', '\0']);

    if invalid {
        return Err(AutostartError::InvalidIdentifier(identifier.to_string()));
    }
    Ok(())
}
