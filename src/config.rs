use log::warn;

use crate::detection::{AnalysisKind, DetectionRequest};
use crate::observation::LandmarkRegion;
use crate::overlay::{Color, OverlayStyle, Stroke};
use crate::settings::UserSettings;

// Default values for configuration
// These serve as fallback values and can be used for "reset to defaults" functionality
pub const APP_NAME: &str = "face-overlay";
pub const LOG_TARGET: &str = "face_overlay";
pub const DEFAULT_BOX_COLOR: &str = "#0000ff";
pub const DEFAULT_BOX_BORDER_WIDTH: f32 = 1.0;
pub const DEFAULT_LABEL_FONT_SCALE: f32 = 0.9;     // Label font size relative to box height
pub const DEFAULT_LANDMARK_COLOR: &str = "#0000ff";
pub const DEFAULT_LANDMARK_LINE_WIDTH: f32 = 2.0;
pub const DEFAULT_LANDMARK_REGIONS: &[&str] = &["outer_lips"];
pub const DEFAULT_ANALYSES: &[&str] = &["face_rectangles", "face_landmarks"];
pub const MAX_LOG_LINES: usize = 1000;             // In-memory log lines kept for export

/// Everything a detection session needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub style: OverlayStyle,
    pub requests: Vec<DetectionRequest>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_settings(&UserSettings::default())
    }
}

impl Config {
    /// Resolves settings strings; unknown values are skipped with a warning.
    pub fn from_settings(settings: &UserSettings) -> Self {
        let style = OverlayStyle {
            box_border: Stroke::new(parse_color(&settings.box_color, DEFAULT_BOX_COLOR), settings.box_border_width),
            label_text: settings.label_text.clone().filter(|text| !text.is_empty()),
            label_font_scale: settings.label_font_scale,
            landmark_stroke: Stroke::new(
                parse_color(&settings.landmark_color, DEFAULT_LANDMARK_COLOR),
                settings.landmark_line_width,
            ),
            landmark_regions: parse_all::<LandmarkRegion>(&settings.landmark_regions),
        };

        let mut requests: Vec<DetectionRequest> = Vec::new();
        for kind in parse_all::<AnalysisKind>(&settings.analyses) {
            let request = DetectionRequest::new(kind);
            if !requests.contains(&request) {
                requests.push(request);
            }
        }

        Self { style, requests }
    }
}

fn parse_color(value: &str, fallback: &str) -> Color {
    Color::from_hex(value).unwrap_or_else(|| {
        warn!("Unknown color '{}', defaulting to {}", value, fallback);
        Color::from_hex(fallback).unwrap_or(Color::BLUE)
    })
}

fn parse_all<T: std::str::FromStr<Err = String>>(values: &[String]) -> Vec<T> {
    values
        .iter()
        .filter_map(|value| match value.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("{}, skipping", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.style, OverlayStyle::default());
        assert_eq!(
            config.requests,
            vec![DetectionRequest::face_rectangles(), DetectionRequest::face_landmarks()]
        );
    }

    #[test]
    fn test_unknown_values_are_skipped() {
        let settings = UserSettings {
            box_color: "blue-ish".to_string(),
            label_text: Some(String::new()),
            landmark_regions: vec!["nose".to_string(), "tail".to_string()],
            analyses: vec!["landmarks".to_string(), "landmarks".to_string(), "text".to_string()],
            ..UserSettings::default()
        };

        let config = Config::from_settings(&settings);
        assert_eq!(config.style.box_border.color, Color::BLUE);
        assert_eq!(config.style.label_text, None);
        assert_eq!(config.style.landmark_regions, vec![LandmarkRegion::Nose]);
        assert_eq!(config.requests, vec![DetectionRequest::face_landmarks()]);
    }
}
