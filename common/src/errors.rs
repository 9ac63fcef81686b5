use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the pairing engine.
///
/// Payloads are plain strings so the error can be cloned into presenter state
/// and carried across actor mailboxes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PairingError {
    #[error("location permission was denied")]
    PermissionDenied,

    #[error("location services are disabled")]
    ServiceDisabled,

    #[error("no location fix within {0:?}")]
    LocationTimeout(Duration),

    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("only {found} restaurant(s) returned, at least 2 are needed")]
    InsufficientResults { found: usize },

    #[error("no unseen restaurant after {attempts} fetches")]
    NoNovelCandidates { attempts: u32 },

    #[error("network error: {0}")]
    Network(String),

    #[error("favorite sync failed: {0}")]
    FavoriteSync(String),

    #[error("no authentication token available")]
    Unauthenticated,

    #[error("pairing is not ready")]
    NotReady,

    #[error("component is no longer mounted")]
    Detached,
}

impl PairingError {
    /// Text suitable for showing to the person using the app.
    pub fn user_message(&self) -> String {
        match self {
            PairingError::PermissionDenied => {
                "Location permission is required to use this app. Please enable location access in your device settings.".to_string()
            }
            PairingError::ServiceDisabled => {
                "Location services are disabled. Please enable them in your device settings to use this app.".to_string()
            }
            PairingError::LocationTimeout(_) | PairingError::LocationUnavailable(_) => {
                "Could not get your location. Please enter it manually.".to_string()
            }
            PairingError::InvalidCoordinate(reason) => reason.clone(),
            PairingError::InsufficientResults { .. } => {
                "Not enough restaurants found in this area".to_string()
            }
            PairingError::NoNovelCandidates { .. } => {
                "You've seen every restaurant nearby. Reset to start over.".to_string()
            }
            PairingError::Network(_) => "Failed to load nearby restaurants".to_string(),
            PairingError::FavoriteSync(_) => "Could not update favorites".to_string(),
            PairingError::Unauthenticated => "Please log in to use the app".to_string(),
            PairingError::NotReady => "Restaurants are still loading".to_string(),
            PairingError::Detached => "The screen was closed".to_string(),
        }
    }

    /// Whether the failure came from location acquisition, in which case the
    /// manual entry path should be offered.
    pub fn is_location_failure(&self) -> bool {
        matches!(
            self,
            PairingError::PermissionDenied
                | PairingError::ServiceDisabled
                | PairingError::LocationTimeout(_)
                | PairingError::LocationUnavailable(_)
        )
    }
}

/// Invalid environment configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} is set without {1}")]
    MissingPair(&'static str, &'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_results_has_area_message() {
        let err = PairingError::InsufficientResults { found: 1 };
        assert_eq!(err.user_message(), "Not enough restaurants found in this area");
    }

    #[test]
    fn location_failures_are_flagged() {
        assert!(PairingError::PermissionDenied.is_location_failure());
        assert!(PairingError::LocationTimeout(Duration::from_secs(15)).is_location_failure());
        assert!(!PairingError::Network("reset".into()).is_location_failure());
    }
}
