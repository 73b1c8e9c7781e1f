use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::geo::{GeoPos, GeoRect};
use crate::render::Color4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Colours a symbol cycles through on double click
    #[serde(default = "default_palette")]
    pub palette: Vec<Color4>,
    /// Dropped icon size in screen pixels
    #[serde(default = "default_icon_size")]
    pub icon_size: [f64; 2],
    /// Dropped symbol size in projected units (meters)
    #[serde(default = "default_symbol_size")]
    pub symbol_size: [f64; 2],
    #[serde(default)]
    pub initial_view: ViewConfig,
    /// Screen pixels per projected unit
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_lat")]
    pub lat: f64,
    #[serde(default = "default_lon")]
    pub lon: f64,
    /// Degrees shown on each side of the center
    #[serde(default = "default_span")]
    pub span_deg: f64,
}

impl ViewConfig {
    pub fn target_area(&self) -> GeoRect {
        GeoRect::around(GeoPos::new(self.lat, self.lon), self.span_deg)
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            lat: default_lat(),
            lon: default_lon(),
            span_deg: default_span(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            icon_size: default_icon_size(),
            symbol_size: default_symbol_size(),
            initial_view: ViewConfig::default(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            session_file: default_session_file(),
        }
    }
}

impl AppConfig {
    /// Loads from `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Rejects values the camera and the initial view cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.min_scale, self.max_scale);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(ConfigError::Invalid(format!(
                "scale bounds must satisfy 0 < min_scale <= max_scale, got {} and {}",
                min, max
            )));
        }
        let view = &self.initial_view;
        GeoPos::try_new(view.lat, view.lon)?;
        if !(view.span_deg.is_finite() && view.span_deg > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "initial_view.span_deg must be positive, got {}",
                view.span_deg
            )));
        }
        Ok(())
    }
}

// Default value functions
fn default_palette() -> Vec<Color4> {
    vec![
        Color4::RED,
        Color4::BLUE,
        Color4::GREEN,
        Color4::GRAY,
        Color4::CYAN,
        Color4::MAGENTA,
        Color4::YELLOW,
    ]
}

fn default_icon_size() -> [f64; 2] {
    [32.0, 32.0]
}

fn default_symbol_size() -> [f64; 2] {
    [2000.0, 2000.0]
}

fn default_lat() -> f64 {
    -23.55651916354534
}

fn default_lon() -> f64 {
    -46.61844717963553
}

fn default_span() -> f64 {
    0.33
}

fn default_min_scale() -> f64 {
    1e-5
}

fn default_max_scale() -> f64 {
    10.0
}

fn default_session_file() -> PathBuf {
    PathBuf::from("geoview-session.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeoError;

    #[test]
    fn test_no_path_gives_defaults() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.palette.len(), 7);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "icon_size": [48.0, 48.0], "initial_view": { "span_deg": 1.0 } }"#)
                .unwrap();
        assert_eq!(config.icon_size, [48.0, 48.0]);
        assert_eq!(config.initial_view.span_deg, 1.0);
        assert_eq!(config.initial_view.lat, default_lat());
        assert_eq!(config.symbol_size, default_symbol_size());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/geoview.json")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_inverted_scale_bounds_are_rejected() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "min_scale": 20.0, "max_scale": 10.0 }"#).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let path = std::env::temp_dir().join(format!("geoview-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "min_scale": 0.0 }"#).unwrap();
        let result = AppConfig::load(Some(&path));
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_out_of_range_initial_view_is_rejected() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "initial_view": { "lat": 200.0 } }"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidView(GeoError::InvalidLatitude(_)))
        ));
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_target_area_spans_both_sides() {
        let area = ViewConfig::default().target_area();
        assert!((area.north - area.south - 0.66).abs() < 1e-9);
        assert!((area.center().lat - default_lat()).abs() < 1e-9);
    }
}
