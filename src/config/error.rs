use thiserror::Error;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("radius_m must be between {min} and {max} metres, got {value}")]
    Radius { value: f64, min: f64, max: f64 },

    #[error("{field} must be between {min} and {max} minutes, got {value}")]
    StepMinutes {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("animation_interval_ms must be positive")]
    AnimationInterval,

    #[error("http_timeout_s must be positive")]
    HttpTimeout,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}
