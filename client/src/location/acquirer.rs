use crate::location::{LocationProvider, PermissionStatus, RetryPolicy};
use colored::Color;
use common::errors::PairingError;
use common::logger::Logger;
use common::types::geo::GeoCoordinate;
use std::sync::Arc;
use tokio::time::{sleep, timeout};

/// Resolves a coordinate from a [`LocationProvider`].
///
/// Permission denial and disabled services end the call at once. Position
/// fixes are retried under the [`RetryPolicy`], each attempt bounded by its
/// timeout; when every attempt fails the last failure is returned so the
/// caller can offer manual entry.
pub struct LocationAcquirer {
    provider: Arc<dyn LocationProvider>,
    policy: RetryPolicy,
    logger: Logger,
}

impl LocationAcquirer {
    pub fn new(provider: Arc<dyn LocationProvider>, policy: RetryPolicy) -> Self {
        Self {
            provider,
            policy,
            logger: Logger::new("Location", Color::Cyan),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn acquire(&self) -> Result<GeoCoordinate, PairingError> {
        let mut status = self.provider.permission_status().await;
        if status != PermissionStatus::Granted {
            self.logger.debug("Location permission not granted yet, asking");
            status = self.provider.request_permission().await;
        }
        if status != PermissionStatus::Granted {
            self.logger.warn("Location permission denied");
            return Err(PairingError::PermissionDenied);
        }

        if !self.provider.services_enabled().await {
            self.logger.warn("Location services are disabled");
            return Err(PairingError::ServiceDisabled);
        }

        let mut attempt = 1;
        loop {
            let error = match timeout(self.policy.attempt_timeout, self.provider.current_position())
                .await
            {
                Ok(Ok(coordinate)) => {
                    self.logger
                        .info(format!("Got location {} on attempt {}", coordinate, attempt));
                    return Ok(coordinate);
                }
                Ok(Err(e)) => e,
                Err(_) => PairingError::LocationTimeout(self.policy.attempt_timeout),
            };

            if matches!(
                error,
                PairingError::PermissionDenied | PairingError::ServiceDisabled
            ) || !self.policy.allows_retry_after(attempt)
            {
                self.logger.error(format!(
                    "Giving up on location after {} attempt(s): {}",
                    attempt, error
                ));
                return Err(error);
            }

            let delay = self.policy.delay_after(attempt);
            self.logger.warn(format!(
                "Location attempt {} failed ({}), retrying in {:?}",
                attempt, error, delay
            ));
            sleep(delay).await;
            attempt += 1;
        }
    }
}
