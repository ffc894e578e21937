//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::ConfigError;

/// Output format of the subscriber
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Directive used when `RUST_LOG` is unset
    pub default_directive: String,
    pub format: LogFormat,
    /// Write to the test writer so output is captured per test
    pub test_writer: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            default_directive: "info".to_string(),
            format: LogFormat::Text,
            test_writer: false,
        }
    }
}

impl TelemetryConfig {
    /// Verbose, test-captured output
    pub fn for_tests() -> Self {
        TelemetryConfig {
            default_directive: "tidemark_state=debug,tidemark_runtime=debug".to_string(),
            format: LogFormat::Text,
            test_writer: true,
        }
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.default_directive))
    }
}

/// Install the global tracing subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), ConfigError> {
    let builder = tracing_subscriber::fmt().with_env_filter(config.env_filter());

    let result = match (config.format, config.test_writer) {
        (LogFormat::Text, false) => builder.try_init(),
        (LogFormat::Text, true) => builder.with_test_writer().try_init(),
        (LogFormat::Json, false) => builder.json().try_init(),
        (LogFormat::Json, true) => builder.json().with_test_writer().try_init(),
    };

    result.map_err(|e| ConfigError::Telemetry(e.to_string()))
}

/// Install the subscriber unless one is already set
pub fn try_init_tracing(config: &TelemetryConfig) {
    if let Err(e) = init_tracing(config) {
        tracing::trace!("tracing already initialised: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        try_init_tracing(&TelemetryConfig::for_tests());

        let err = init_tracing(&TelemetryConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Telemetry(_)));
    }

    #[test]
    fn test_telemetry_config_builders() {
        let config = TelemetryConfig::default()
            .with_directive("tidemark_runtime=trace")
            .with_format(LogFormat::Json);

        assert_eq!(config.default_directive, "tidemark_runtime=trace");
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.test_writer);
    }
}
