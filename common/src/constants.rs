use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5001/api";
pub const DEFAULT_RADIUS_METERS: u32 = 1000;
pub const HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Candidates needed to seed both slots.
pub const MIN_INITIAL_CANDIDATES: usize = 2;
/// Remote fetches `next()` may spend looking for an unseen candidate.
pub const MAX_NOVEL_ATTEMPTS: u32 = 10;

pub const LOCATION_MAX_ATTEMPTS: u32 = 3;
pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(15);
const LOCATION_RETRY_DELAY_SECONDS: u64 = 2;
pub const LOCATION_RETRY_DELAY: Duration = Duration::from_secs(LOCATION_RETRY_DELAY_SECONDS);

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

pub const DEFAULT_PHOTO_MAX_WIDTH: u32 = 400;

pub const ENV_API_URL: &str = "FOODFIGHT_API_URL";
pub const ENV_TOKEN: &str = "FOODFIGHT_TOKEN";
pub const ENV_RADIUS: &str = "FOODFIGHT_RADIUS";
pub const ENV_TEST_MODE: &str = "FOODFIGHT_TEST_MODE";
pub const ENV_FIXTURE: &str = "FOODFIGHT_FIXTURE";
pub const ENV_LATITUDE: &str = "FOODFIGHT_LATITUDE";
pub const ENV_LONGITUDE: &str = "FOODFIGHT_LONGITUDE";
pub const ENV_HTTP_TIMEOUT: &str = "FOODFIGHT_HTTP_TIMEOUT_SECS";
pub const ENV_MAX_NOVEL_ATTEMPTS: &str = "FOODFIGHT_MAX_NOVEL_ATTEMPTS";
pub const ENV_VERBOSE: &str = "FOODFIGHT_VERBOSE";
