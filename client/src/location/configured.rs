use crate::location::{LocationProvider, PermissionStatus};
use async_trait::async_trait;
use common::errors::PairingError;
use common::types::geo::GeoCoordinate;

/// Provider for hosts without positioning hardware: reports whatever
/// coordinate the configuration carries.
pub struct ConfiguredLocationProvider {
    coordinate: Option<GeoCoordinate>,
}

impl ConfiguredLocationProvider {
    pub fn new(coordinate: Option<GeoCoordinate>) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl LocationProvider for ConfiguredLocationProvider {
    async fn permission_status(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn services_enabled(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<GeoCoordinate, PairingError> {
        self.coordinate.ok_or_else(|| {
            PairingError::LocationUnavailable("no location configured".to_string())
        })
    }
}
