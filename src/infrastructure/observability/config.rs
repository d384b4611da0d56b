//! Telemetry export settings, under `[observability]`

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// OTLP collector; spans are only exported when this is set
    pub otlp_endpoint: Option<String>,
    pub sampling_ratio: f64,
    pub metrics: bool,
    pub metrics_path: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            sampling_ratio: 1.0,
            metrics: true,
            metrics_path: "/metrics".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_is_off_by_default() {
        let config = ObservabilityConfig::default();

        assert!(config.otlp_endpoint.is_none());
        assert!(config.metrics);
        assert_eq!(config.metrics_path, "/metrics");
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: ObservabilityConfig = serde_json::from_value(serde_json::json!({
            "otlp_endpoint": "http://collector:4317",
            "sampling_ratio": 0.25
        }))
        .unwrap();

        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://collector:4317"));
        assert_eq!(config.sampling_ratio, 0.25);
        assert!(config.metrics);
    }
}
