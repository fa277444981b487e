use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info, warn, error};

use crate::config::{
    DEFAULT_ANALYSES, DEFAULT_BOX_BORDER_WIDTH, DEFAULT_BOX_COLOR, DEFAULT_LABEL_FONT_SCALE,
    DEFAULT_LANDMARK_COLOR, DEFAULT_LANDMARK_LINE_WIDTH, DEFAULT_LANDMARK_REGIONS,
};
use crate::error::Result;

/// User-specific overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Face box border color, "#rrggbb" or "#rrggbbaa"
    #[serde(default = "default_box_color")]
    pub box_color: String,

    #[serde(default = "default_box_border_width")]
    pub box_border_width: f32,

    /// Text centered in each face box (none by default)
    #[serde(default)]
    pub label_text: Option<String>,

    /// Label font size relative to the box height
    #[serde(default = "default_label_font_scale")]
    pub label_font_scale: f32,

    #[serde(default = "default_landmark_color")]
    pub landmark_color: String,

    #[serde(default = "default_landmark_line_width")]
    pub landmark_line_width: f32,

    /// Landmark contours to outline, e.g. "outer_lips", "left_eye"
    #[serde(default = "default_landmark_regions")]
    pub landmark_regions: Vec<String>,

    /// Analyses to request: "face_rectangles", "face_landmarks"
    #[serde(default = "default_analyses")]
    pub analyses: Vec<String>,
}

fn default_box_color() -> String {
    DEFAULT_BOX_COLOR.to_string()
}

fn default_box_border_width() -> f32 {
    DEFAULT_BOX_BORDER_WIDTH
}

fn default_label_font_scale() -> f32 {
    DEFAULT_LABEL_FONT_SCALE
}

fn default_landmark_color() -> String {
    DEFAULT_LANDMARK_COLOR.to_string()
}

fn default_landmark_line_width() -> f32 {
    DEFAULT_LANDMARK_LINE_WIDTH
}

fn default_landmark_regions() -> Vec<String> {
    DEFAULT_LANDMARK_REGIONS.iter().map(|s| s.to_string()).collect()
}

fn default_analyses() -> Vec<String> {
    DEFAULT_ANALYSES.iter().map(|s| s.to_string()).collect()
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            box_color: default_box_color(),
            box_border_width: default_box_border_width(),
            label_text: None,
            label_font_scale: default_label_font_scale(),
            landmark_color: default_landmark_color(),
            landmark_line_width: default_landmark_line_width(),
            landmark_regions: default_landmark_regions(),
            analyses: default_analyses(),
        }
    }
}

impl UserSettings {
    /// Get the path to the settings file
    /// On macOS: ~/Library/Application Support/FaceOverlay/settings.yaml
    /// On Linux: ~/.config/FaceOverlay/settings.yaml
    /// On Windows: C:\Users\<user>\AppData\Roaming\FaceOverlay\settings.yaml
    pub fn settings_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."));

        config_dir.join("FaceOverlay").join("settings.yaml")
    }

    /// Load settings from the YAML file
    /// If custom_path is provided, uses that path; otherwise uses the default settings path
    pub fn load(custom_path: Option<&Path>) -> Self {
        let path = match custom_path {
            Some(p) => {
                info!("Using custom settings path: {}", p.display());
                p.to_path_buf()
            }
            None => Self::settings_path(),
        };

        if !path.exists() {
            info!("Settings file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_yaml::from_str::<UserSettings>(&contents) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    debug!("Settings: box_color={}, label={:?}, regions={:?}, analyses={:?}",
                        settings.box_color, settings.label_text, settings.landmark_regions, settings.analyses);
                    settings
                }
                Err(e) => {
                    error!("Failed to parse settings file at {:?}: {}", path, e);
                    warn!("Using default settings");
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read settings file at {:?}: {}", path, e);
                warn!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to `path`, keeping comments of an existing file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => {
                    fs::write(path, self.update_yaml_values(&contents))?;
                    info!("Saved settings to {:?} (comments preserved)", path);
                    return Ok(());
                }
                Err(e) => {
                    warn!("Failed to read existing settings file for comment preservation: {}", e);
                }
            }
        }

        fs::write(path, self.to_yaml_with_comments())?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Update YAML values while preserving existing comments and structure
    fn update_yaml_values(&self, yaml_content: &str) -> String {
        let mut result = yaml_content.to_string();

        result = Self::replace_yaml_value(&result, "box_color", &quoted(&self.box_color));
        result = Self::replace_yaml_value(&result, "box_border_width", &self.box_border_width.to_string());
        result = Self::replace_yaml_value(&result, "label_text", &optional_quoted(&self.label_text));
        result = Self::replace_yaml_value(&result, "label_font_scale", &self.label_font_scale.to_string());
        result = Self::replace_yaml_value(&result, "landmark_color", &quoted(&self.landmark_color));
        result = Self::replace_yaml_value(&result, "landmark_line_width", &self.landmark_line_width.to_string());
        result = Self::replace_yaml_value(&result, "landmark_regions", &inline_list(&self.landmark_regions));
        result = Self::replace_yaml_value(&result, "analyses", &inline_list(&self.analyses));

        result
    }

    /// Replace a YAML key's value while preserving the rest of the file
    ///
    /// A value that continues on following lines (a block sequence such as
    /// `- outer_lips`, or any indented continuation) is replaced as a whole.
    fn replace_yaml_value(yaml: &str, key: &str, new_value: &str) -> String {
        let pattern = format!(
            r"(?m)^([ \t]*{}[ \t]*:)[^\n]*(?:\n(?:[ \t]+\S|-)[^\n]*)*",
            regex::escape(key)
        );

        match regex::Regex::new(&pattern) {
            Ok(re) => re
                .replace_all(yaml, |caps: &regex::Captures| format!("{} {}", &caps[1], new_value))
                .to_string(),
            Err(e) => {
                warn!("Failed to create regex for key '{}': {}", key, e);
                yaml.to_string()
            }
        }
    }

    /// Generate YAML content with comments for new files
    fn to_yaml_with_comments(&self) -> String {
        format!(
            r##"# Face overlay settings
# Values here override the built-in defaults.

# Border color of face boxes ("#rrggbb" or "#rrggbbaa")
box_color: {}

# Border width of face boxes, in pixels
box_border_width: {}

# Text drawn centered in each face box (null = no label)
label_text: {}

# Label font size as a fraction of the box height
label_font_scale: {}

# Stroke color of landmark outlines
landmark_color: {}

# Stroke width of landmark outlines, in pixels
landmark_line_width: {}

# Landmark contours to outline. Available: face_contour, left_eye, right_eye,
# left_eyebrow, right_eyebrow, nose, nose_crest, median_line, outer_lips,
# inner_lips, left_pupil, right_pupil
landmark_regions: {}

# Analyses requested per detection pass: face_rectangles, face_landmarks
analyses: {}
"##,
            quoted(&self.box_color),
            self.box_border_width,
            optional_quoted(&self.label_text),
            self.label_font_scale,
            quoted(&self.landmark_color),
            self.landmark_line_width,
            inline_list(&self.landmark_regions),
            inline_list(&self.analyses),
        )
    }
}

// JSON string literals are valid double-quoted YAML scalars
fn quoted(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

fn optional_quoted(value: &Option<String>) -> String {
    value.as_deref().map(quoted).unwrap_or_else(|| "null".to_string())
}

fn inline_list(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| quoted(v)).collect();
    format!("[{}]", items.join(", "))
}
