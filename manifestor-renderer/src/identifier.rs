//! Stable per-unit identifiers.
//!
//! `identifier(workspace, unit)` is the first 16 bytes of
//! `SHA-256(workspace ‖ unit ‖ SALT)`, shown as an upper-case hyphenated GUID.
//! It depends on nothing but its two arguments, so any task may compute it at
//! any time and dependents embed exactly the value the unit itself declares.

use std::fmt;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use manifestor_core::UnitName;

/// Fixed salt mixed into every identifier.
const SALT: &str = "salt";

/// A 128-bit stable identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid(Uuid);

impl Guid {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Guid(Uuid::from_bytes(bytes))
    }

    /// `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}`, as embedded in manifests.
    pub fn braced(&self) -> String {
        format!("{{{self}}}")
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated().to_string().to_uppercase())
    }
}

/// A unit name paired with its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitIdentifier {
    pub name: UnitName,
    pub guid: Guid,
}

impl UnitIdentifier {
    pub fn new(workspace: &str, name: &UnitName) -> Self {
        UnitIdentifier {
            name: name.clone(),
            guid: identifier(workspace, name.as_str()),
        }
    }
}

/// Derive the stable identifier of `unit` inside `workspace`.
pub fn identifier(workspace: &str, unit: &str) -> Guid {
    let mut hasher = Sha256::new();
    hasher.update(workspace.as_bytes());
    hasher.update(unit.as_bytes());
    hasher.update(SALT.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Guid::from_bytes(bytes)
}
