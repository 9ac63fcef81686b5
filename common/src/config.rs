use crate::constants::*;
use crate::errors::ConfigError;
use crate::types::geo::GeoCoordinate;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings of the pairing client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the restaurant/favorites service, `/api` prefix included.
    pub api_url: String,
    /// Bearer credential handed over by the token store.
    pub auth_token: Option<String>,
    pub radius_meters: u32,
    /// Serve candidates from a fixture instead of the remote service.
    pub test_mode: bool,
    pub fixture_path: Option<PathBuf>,
    /// Position reported by the terminal location provider.
    pub fixed_location: Option<GeoCoordinate>,
    pub http_timeout: Duration,
    pub max_novel_attempts: u32,
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            radius_meters: DEFAULT_RADIUS_METERS,
            test_mode: false,
            fixture_path: None,
            fixed_location: None,
            http_timeout: Duration::from_secs(HTTP_TIMEOUT_SECONDS),
            max_novel_attempts: MAX_NOVEL_ATTEMPTS,
            verbose: false,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(url) = get(ENV_API_URL) {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        config.auth_token = get(ENV_TOKEN);
        if let Some(radius) = get(ENV_RADIUS) {
            config.radius_meters = parse_number(ENV_RADIUS, &radius, "a positive integer")?;
            if config.radius_meters == 0 {
                return Err(invalid(ENV_RADIUS, "a positive integer", radius));
            }
        }
        if let Some(flag) = get(ENV_TEST_MODE) {
            config.test_mode = parse_flag(ENV_TEST_MODE, &flag)?;
        }
        config.fixture_path = get(ENV_FIXTURE).map(PathBuf::from);
        if let Some(timeout) = get(ENV_HTTP_TIMEOUT) {
            let seconds: u64 = parse_number(ENV_HTTP_TIMEOUT, &timeout, "a number of seconds")?;
            config.http_timeout = Duration::from_secs(seconds);
        }
        if let Some(attempts) = get(ENV_MAX_NOVEL_ATTEMPTS) {
            config.max_novel_attempts =
                parse_number(ENV_MAX_NOVEL_ATTEMPTS, &attempts, "a positive integer")?;
            if config.max_novel_attempts == 0 {
                return Err(invalid(ENV_MAX_NOVEL_ATTEMPTS, "a positive integer", attempts));
            }
        }
        if let Some(flag) = get(ENV_VERBOSE) {
            config.verbose = parse_flag(ENV_VERBOSE, &flag)?;
        }

        config.fixed_location = match (get(ENV_LATITUDE), get(ENV_LONGITUDE)) {
            (Some(lat), Some(lng)) => {
                let lat: f64 = parse_number(ENV_LATITUDE, &lat, "a latitude")?;
                let lng: f64 = parse_number(ENV_LONGITUDE, &lng, "a longitude")?;
                let coordinate = GeoCoordinate::new(lat, lng).map_err(|e| {
                    invalid(ENV_LATITUDE, "a coordinate in range", e.to_string())
                })?;
                Some(coordinate)
            }
            (Some(_), None) => return Err(ConfigError::MissingPair(ENV_LATITUDE, ENV_LONGITUDE)),
            (None, Some(_)) => return Err(ConfigError::MissingPair(ENV_LONGITUDE, ENV_LATITUDE)),
            (None, None) => None,
        };

        Ok(config)
    }
}

fn invalid(key: &'static str, expected: &'static str, value: String) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        expected,
        value,
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &'static str,
    value: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value
        .parse::<T>()
        .map_err(|_| invalid(key, expected, value.to_string()))
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, "true or false", value.to_string())),
    }
}
