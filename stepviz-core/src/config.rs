use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{VizError, VizResult};
use crate::speed::SpeedMapping;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    #[default]
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Per-page settings. Every field may be overridden from the page's
/// `data-config` attribute; missing fields keep the built-in default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// API path, relative to the page base URL. Tree pages append
    /// `/init`, `/insert` or `/delete`.
    pub endpoint: String,
    pub method: Method,
    pub speed: SpeedMapping,
    /// Slider position on load.
    pub initial_speed: f64,
    /// Start auto-play as soon as a run has loaded.
    pub autoplay: bool,
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        VisualizerConfig {
            endpoint: String::new(),
            method: Method::Post,
            speed: SpeedMapping::default(),
            initial_speed: 4500.0,
            autoplay: true,
            min_width: 600.0,
            min_height: 400.0,
        }
    }
}

impl VisualizerConfig {
    /// Merge a JSON object over `self`, key by key.
    pub fn merged(&self, overrides: &str) -> VizResult<VisualizerConfig> {
        let patch: Value = serde_json::from_str(overrides)?;
        let Value::Object(patch) = patch else {
            return Err(VizError::Config("data-config must be a JSON object".into()));
        };
        let mut base = serde_json::to_value(self)?;
        if let Value::Object(ref mut base) = base {
            for (k, v) in patch {
                base.insert(k, v);
            }
        }
        let merged: VisualizerConfig = serde_json::from_value(base)?;
        merged.validate()?;
        Ok(merged)
    }

    pub fn validate(&self) -> VizResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(VizError::Config("endpoint must not be empty".into()));
        }
        if !(self.min_width > 0.0 && self.min_height > 0.0) {
            return Err(VizError::Config("minimum canvas size must be positive".into()));
        }
        Ok(())
    }

    pub fn delay_ms(&self, value: f64) -> u32 {
        self.speed.delay_ms(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> VisualizerConfig {
        VisualizerConfig {
            endpoint: "api/knapsack/run".into(),
            ..VisualizerConfig::default()
        }
    }

    #[test]
    fn merge_keeps_unlisted_fields() {
        let cfg = base().merged(r#"{"autoplay": false}"#).unwrap();
        assert!(!cfg.autoplay);
        assert_eq!(cfg.endpoint, "api/knapsack/run");
        assert_eq!(cfg.speed, SpeedMapping::default());
    }

    #[test]
    fn merge_replaces_speed_mapping() {
        let cfg = base()
            .merged(r#"{"speed": {"kind": "direct"}, "initial_speed": 800}"#)
            .unwrap();
        assert_eq!(cfg.delay_ms(cfg.initial_speed), 800);
    }

    #[test]
    fn merge_rejects_non_objects_and_bad_values() {
        assert!(matches!(base().merged("[1]"), Err(VizError::Config(_))));
        assert!(base().merged(r#"{"endpoint": ""}"#).is_err());
        assert!(base().merged(r#"{"method": "PATCH"}"#).is_err());
    }
}
