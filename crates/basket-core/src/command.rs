//! Command abstractions.

use crate::store::SessionKey;

/// Trait that all cart commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging).
    fn command_type(&self) -> &'static str;

    /// The session whose cart this command targets.
    fn session_key(&self) -> &SessionKey;
}
