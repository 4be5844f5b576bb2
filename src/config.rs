use crate::error::ConfigError;
use log::LevelFilter;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "color_blending.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub window_width: u32,
    pub window_height: u32,
    pub vsync: bool,
    /// Half the side of the square drawn for each sampled point, in logical
    /// pixels.
    pub point_radius: f32,
    /// Alpha given to palette colors so overlapping strokes blend.
    pub stroke_alpha: f32,
    pub initial_brightness: f32,
    pub initial_stroke_capacity: u32,
    pub initial_vertex_capacity: u32,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            window_width: 1024,
            window_height: 720,
            vsync: true,
            point_radius: 1.0,
            stroke_alpha: 0.5,
            initial_brightness: 1.0,
            initial_stroke_capacity: 512,
            initial_vertex_capacity: 8192,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Reads the settings file at `path`. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings file at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Config =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_json::from_str(json).map_err(|source| ConfigError::Parse {
                path: "<inline>".into(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::Invalid {
                name: "window_width/window_height",
                reason: "window must not be empty".to_string(),
            });
        }
        if !(self.point_radius > 0.0) {
            return Err(ConfigError::Invalid {
                name: "point_radius",
                reason: format!("{} is not positive", self.point_radius),
            });
        }
        if !(0.0..=1.0).contains(&self.stroke_alpha) {
            return Err(ConfigError::Invalid {
                name: "stroke_alpha",
                reason: format!("{} is outside 0..=1", self.stroke_alpha),
            });
        }
        if !(0.0..=1.0).contains(&self.initial_brightness) {
            return Err(ConfigError::Invalid {
                name: "initial_brightness",
                reason: format!("{} is outside 0..=1", self.initial_brightness),
            });
        }
        if self.initial_stroke_capacity == 0 || self.initial_vertex_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: "initial_stroke_capacity/initial_vertex_capacity",
                reason: "buffer capacities must be non-zero".to_string(),
            });
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: "log_level",
                reason: format!("unknown level `{}`", self.log_level),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let config = Config::from_json(r#"{ "vsync": false, "stroke_alpha": 0.25 }"#).unwrap();
        assert_eq!(
            config,
            Config {
                vsync: false,
                stroke_alpha: 0.25,
                ..Config::default()
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_json(r#"{ "colour": 1 }"#),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            Config::from_json(r#"{ "initial_brightness": 1.5 }"#),
            Err(ConfigError::Invalid { name: "initial_brightness", .. })
        ));
        assert!(matches!(
            Config::from_json(r#"{ "point_radius": 0.0 }"#),
            Err(ConfigError::Invalid { name: "point_radius", .. })
        ));
        assert!(matches!(
            Config::from_json(r#"{ "log_level": "loud" }"#),
            Err(ConfigError::Invalid { name: "log_level", .. })
        ));
    }

    #[test]
    fn log_level_parses() {
        let config = Config::from_json(r#"{ "log_level": "debug" }"#).unwrap();
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load("this/file/does/not/exist.json").unwrap();
        assert_eq!(config, Config::default());
    }
}
