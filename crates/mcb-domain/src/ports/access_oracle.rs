//! Case-level authorization port (§4.1/§9 case isolation).

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::CaseName;

/// Action being authorized against a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Read,
    Write,
}

/// Checks whether a user may act on a case, ahead of any collection access.
/// Every use-case service calls this before touching [`crate::ports::VectorStoreAdapter`]
/// or [`crate::ports::DocumentRegistry`] for that case.
#[async_trait]
pub trait AccessOracle: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the authorization backend is unreachable; an
    /// authorized "no" is `Ok(false)`, not an error.
    async fn can_access(&self, case: &CaseName, user_id: &str, permission: Permission) -> Result<bool>;
}
