//! Obtaining the coordinate a pairing session is anchored to.
//!
//! The platform side (permission prompts, GPS) sits behind
//! [`LocationProvider`]; [`LocationAcquirer`] owns the policy around it.

pub mod acquirer;
pub mod configured;
pub mod retry_policy;

use async_trait::async_trait;
use common::errors::PairingError;
use common::types::geo::GeoCoordinate;

pub use acquirer::LocationAcquirer;
pub use configured::ConfiguredLocationProvider;
pub use retry_policy::{Backoff, RetryPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Never asked yet.
    Undetermined,
}

/// Platform location facilities.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn permission_status(&self) -> PermissionStatus;

    /// Prompts for permission and returns the answer.
    async fn request_permission(&self) -> PermissionStatus;

    async fn services_enabled(&self) -> bool;

    /// One position fix. Callers bound it with their own timeout.
    async fn current_position(&self) -> Result<GeoCoordinate, PairingError>;
}
