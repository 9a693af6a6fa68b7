use serde::{Deserialize, Serialize};

/// Shortest interval the auto-play timer is ever armed with.
pub const MIN_DELAY_MS: u32 = 16;

/// How a speed slider value turns into an auto-play interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeedMapping {
    /// `delay = max_ms - k * value`
    LinearInverse { max_ms: f64, k: f64 },
    /// `delay = base_ms / value`
    RatioInverse { base_ms: f64 },
    /// The slider value is the delay in milliseconds.
    Direct,
    /// No slider; the interval never changes.
    Fixed { ms: u32 },
}

impl Default for SpeedMapping {
    fn default() -> Self {
        SpeedMapping::LinearInverse {
            max_ms: 5100.0,
            k: 1.0,
        }
    }
}

impl SpeedMapping {
    pub fn delay_ms(&self, value: f64) -> u32 {
        let raw = match *self {
            SpeedMapping::LinearInverse { max_ms, k } => max_ms - k * value,
            SpeedMapping::RatioInverse { base_ms } => {
                if value > 0.0 {
                    base_ms / value
                } else {
                    base_ms
                }
            }
            SpeedMapping::Direct => value,
            SpeedMapping::Fixed { ms } => ms as f64,
        };
        if !raw.is_finite() {
            return MIN_DELAY_MS;
        }
        (raw.round().max(MIN_DELAY_MS as f64)).min(u32::MAX as f64) as u32
    }

    pub fn label(&self, value: f64) -> String {
        format!("{} ms", self.delay_ms(value))
    }

    /// Whether the page shows a slider for this mapping.
    pub fn adjustable(&self) -> bool {
        !matches!(self, SpeedMapping::Fixed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_inverse_matches_slider_pages() {
        let m = SpeedMapping::default();
        assert_eq!(m.delay_ms(4500.0), 600);
        assert_eq!(m.label(4500.0), "600 ms");
    }

    #[test]
    fn delays_never_drop_below_floor() {
        let m = SpeedMapping::default();
        assert_eq!(m.delay_ms(6000.0), MIN_DELAY_MS);
        assert_eq!(SpeedMapping::Direct.delay_ms(0.0), MIN_DELAY_MS);
        assert_eq!(SpeedMapping::RatioInverse { base_ms: 1000.0 }.delay_ms(0.0), 1000);
    }

    #[test]
    fn ratio_inverse_and_fixed() {
        assert_eq!(SpeedMapping::RatioInverse { base_ms: 1000.0 }.delay_ms(4.0), 250);
        let fixed = SpeedMapping::Fixed { ms: 1500 };
        assert_eq!(fixed.delay_ms(1.0), 1500);
        assert!(!fixed.adjustable());
    }

    #[test]
    fn decodes_from_page_config() {
        let m: SpeedMapping = serde_json::from_str(r#"{"kind":"fixed","ms":500}"#).unwrap();
        assert_eq!(m, SpeedMapping::Fixed { ms: 500 });
        let m: SpeedMapping = serde_json::from_str(r#"{"kind":"direct"}"#).unwrap();
        assert_eq!(m, SpeedMapping::Direct);
    }
}
