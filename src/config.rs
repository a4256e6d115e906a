use std::env;
use std::path::PathBuf;

/// Process configuration, read once at startup. Every knob has a default
/// that works from a fresh checkout; environment variables override.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
    /// Fixed post-hoc calibration applied to every raw model price. The
    /// constant has no documented derivation; it is carried as configuration,
    /// not as domain logic.
    pub price_multiplier: f64,
    pub kms_min: i64,
    pub kms_max: i64,
    /// Prefill and step for the kilometers input on the served page.
    pub kms_default: i64,
    pub kms_step: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            dataset_path: PathBuf::from("data/cars.csv"),
            model_path: PathBuf::from("data/model.json"),
            price_multiplier: 3.5,
            kms_min: 0,
            kms_max: 1_000_000,
            kms_default: 50_000,
            kms_step: 1_000,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults above for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parse_env("PORT", defaults.port),
            dataset_path: env::var("DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.dataset_path),
            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            price_multiplier: parse_env("PRICE_MULTIPLIER", defaults.price_multiplier),
            kms_min: parse_env("KMS_MIN", defaults.kms_min),
            kms_max: parse_env("KMS_MAX", defaults.kms_max),
            kms_default: parse_env("KMS_DEFAULT", defaults.kms_default),
            kms_step: parse_env("KMS_STEP", defaults.kms_step),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
