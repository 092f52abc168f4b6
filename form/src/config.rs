//! Swap form configuration.

use std::time::Duration;

use swapform_common::OUTPUT_DECIMAL_PLACES;

/// Configuration for the swap form.
#[derive(Debug, Clone)]
pub struct FormConfig {
    /// How long a transient advisory stays visible.
    pub advisory_ttl: Duration,
    /// Latency of the simulated swap executor.
    pub submit_latency: Duration,
    /// Decimal places shown for the output amount.
    pub output_decimal_places: u32,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            advisory_ttl: Duration::from_secs(3),
            submit_latency: Duration::from_millis(1500),
            output_decimal_places: OUTPUT_DECIMAL_PLACES,
        }
    }
}

impl FormConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = env_millis("SWAPFORM_ADVISORY_TTL_MS") {
            config.advisory_ttl = ms;
        }

        if let Some(ms) = env_millis("SWAPFORM_SUBMIT_LATENCY_MS") {
            config.submit_latency = ms;
        }

        if let Some(places) = std::env::var("SWAPFORM_OUTPUT_DECIMAL_PLACES")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.output_decimal_places = places;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.advisory_ttl.is_zero() {
            return Err("Advisory TTL cannot be zero".to_string());
        }

        // rust_decimal keeps at most 28 fractional digits
        if self.output_decimal_places > 28 {
            return Err(format!(
                "Output decimal places must be at most 28, got {}",
                self.output_decimal_places
            ));
        }

        Ok(())
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = FormConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output_decimal_places, 6);
        assert_eq!(config.advisory_ttl, Duration::from_secs(3));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = FormConfig {
            advisory_ttl: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FormConfig {
            output_decimal_places: 40,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
