//! Threshold classification of daily maximum temperatures

use serde::{Deserialize, Serialize};

/// Above this a day is hot (exclusive)
pub const HOT_THRESHOLD_CELSIUS: f64 = 30.0;

/// Below this a day is cold (exclusive)
pub const COLD_THRESHOLD_CELSIUS: f64 = 10.0;

/// Display category of a single chart point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointCategory {
    /// Strictly above 30 °C
    Hot,
    /// Strictly below 10 °C
    Cold,
    /// Everything else, both thresholds included
    Normal,
}

impl PointCategory {
    /// CSS color used to fill the point
    #[must_use]
    pub fn css_color(self) -> &'static str {
        match self {
            PointCategory::Hot => "red",
            PointCategory::Cold => "blue",
            PointCategory::Normal => "#007bff",
        }
    }

    /// Same color as RGB components
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            PointCategory::Hot => (255, 0, 0),
            PointCategory::Cold => (0, 0, 255),
            PointCategory::Normal => (0, 123, 255),
        }
    }
}

/// Classify a temperature in Celsius.
///
/// The hot check runs first. Both thresholds are exclusive, so 30 and 10
/// are `Normal`, and NaN fails both comparisons and lands in `Normal` too.
#[must_use]
pub fn classify(temp: f64) -> PointCategory {
    if temp > HOT_THRESHOLD_CELSIUS {
        PointCategory::Hot
    } else if temp < COLD_THRESHOLD_CELSIUS {
        PointCategory::Cold
    } else {
        PointCategory::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(30.1, PointCategory::Hot)]
    #[case(45.0, PointCategory::Hot)]
    #[case(f64::INFINITY, PointCategory::Hot)]
    #[case(30.0, PointCategory::Normal)]
    #[case(20.0, PointCategory::Normal)]
    #[case(10.0, PointCategory::Normal)]
    #[case(9.99, PointCategory::Cold)]
    #[case(-15.0, PointCategory::Cold)]
    #[case(f64::NEG_INFINITY, PointCategory::Cold)]
    fn test_classify(#[case] temp: f64, #[case] expected: PointCategory) {
        assert_eq!(classify(temp), expected);
    }

    #[test]
    fn test_classify_nan_is_normal() {
        assert_eq!(classify(f64::NAN), PointCategory::Normal);
    }

    #[test]
    fn test_classify_sweep_matches_thresholds() {
        for tenth in -400..=500 {
            let temp = f64::from(tenth) / 10.0;
            let category = classify(temp);
            if temp > 30.0 {
                assert_eq!(category, PointCategory::Hot, "{temp}");
            } else if temp < 10.0 {
                assert_eq!(category, PointCategory::Cold, "{temp}");
            } else {
                assert_eq!(category, PointCategory::Normal, "{temp}");
            }
        }
    }

    #[test]
    fn test_category_colors() {
        assert_eq!(PointCategory::Hot.css_color(), "red");
        assert_eq!(PointCategory::Cold.css_color(), "blue");
        assert_eq!(PointCategory::Normal.css_color(), "#007bff");
        assert_eq!(PointCategory::Normal.rgb(), (0, 123, 255));
    }
}
