//! Storage-permission collaborator.

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    #[must_use]
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// Write-permission gate consulted before legacy storage access.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Current grant state, without prompting.
    fn status(&self) -> PermissionStatus;

    /// Ask for the permission and wait for the decision.
    async fn request(&self) -> PermissionStatus;
}

/// Gate for hosts without a permission model.
pub struct AlwaysGranted;

#[async_trait]
impl PermissionGate for AlwaysGranted {
    fn status(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn request(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }
}
