//! Port for the flag ledger.

use async_trait::async_trait;

use crate::domain::Flag;

use super::define_port_error;

define_port_error! {
    /// Errors raised by flag repository adapters.
    pub enum FlagRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "flag repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "flag repository query failed: {message}",
        /// The target does not exist or is inactive.
        TargetNotFound =>
            "flag target not found",
        /// The user already flagged this target.
        Duplicate =>
            "content already flagged by this user",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlagRepository: Send + Sync {
    /// Record a flag on an active target.
    ///
    /// Flagged-but-active targets may still be flagged by other users.
    async fn insert(&self, flag: &Flag) -> Result<(), FlagRepositoryError>;
}
