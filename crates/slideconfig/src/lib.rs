use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleOrder {
    #[default]
    Sequential,
    Shuffle,
}

impl fmt::Display for CycleOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOrder::Sequential => f.write_str("sequential"),
            CycleOrder::Shuffle => f.write_str("shuffle"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingSetting {
    Linear,
    #[default]
    EaseOut,
    EaseInOut,
    Smoothstep,
}

impl fmt::Display for EasingSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EasingSetting::Linear => f.write_str("linear"),
            EasingSetting::EaseOut => f.write_str("ease-out"),
            EasingSetting::EaseInOut => f.write_str("ease-in-out"),
            EasingSetting::Smoothstep => f.write_str("smoothstep"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlideshowConfig {
    pub version: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub cadence: CadenceSettings,
    #[serde(default)]
    pub transition: TransitionSettings,
    #[serde(default)]
    pub window: WindowSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CadenceSettings {
    #[serde(default = "default_interval", deserialize_with = "deserialize_duration")]
    pub interval: Duration,
    #[serde(default)]
    pub order: CycleOrder,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for CadenceSettings {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            order: CycleOrder::default(),
            enabled: default_enabled(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionSettings {
    #[serde(
        default = "default_transition_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub duration: Duration,
    #[serde(default)]
    pub easing: EasingSetting,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            duration: default_transition_duration(),
            easing: EasingSetting::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default)]
    pub fps: Option<f32>,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            background: default_background(),
            fps: None,
        }
    }
}

impl WindowSettings {
    /// Parsed background colour; only valid after [`SlideshowConfig::validate`].
    pub fn background_rgb(&self) -> Result<[u8; 3], ConfigError> {
        parse_hex_color(&self.background).map_err(ConfigError::Invalid)
    }

    /// FPS cap with `0` (or negative) mapped to uncapped.
    pub fn fps_cap(&self) -> Option<f32> {
        self.fps.filter(|fps| *fps > 0.0)
    }
}

/// Smallest positive frame-rate cap; `0` still means uncapped.
pub const MIN_FPS: f32 = 0.1;

fn default_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_transition_duration() -> Duration {
    Duration::from_secs(1)
}

fn default_enabled() -> bool {
    true
}

fn default_title() -> String {
    "Potato Slider".to_string()
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_background() -> String {
    "#23272a".to_string()
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse_duration(v).map_err(E::custom)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

/// Parses `"5s"`, `"1500ms"`, or a bare number of seconds (`"2.5"`).
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if seconds.is_nan() || seconds.is_sign_negative() {
            return Err(format!("invalid duration '{raw}': must be non-negative"));
        }
        return Duration::try_from_secs_f64(seconds)
            .map_err(|err| format!("invalid duration '{raw}': {err}"));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{raw}': {err}"))
}

/// Parses a `#rrggbb` colour.
pub fn parse_hex_color(raw: &str) -> Result<[u8; 3], String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix('#')
        .ok_or_else(|| format!("invalid colour '{raw}': expected '#rrggbb'"))?;
    if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!("invalid colour '{raw}': expected '#rrggbb'"));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|err| format!("invalid colour '{raw}': {err}"))
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            version: 1,
            images: Vec::new(),
            cadence: CadenceSettings::default(),
            transition: TransitionSettings::default(),
            window: WindowSettings::default(),
        }
    }
}

impl SlideshowConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SlideshowConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.images.is_empty() {
            return Err(ConfigError::Invalid(
                "config must list at least one image".into(),
            ));
        }

        for (index, image) in self.images.iter().enumerate() {
            if image.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "image #{index} must not be empty"
                )));
            }
        }

        if self.cadence.interval.is_zero() {
            return Err(ConfigError::Invalid(
                "cadence.interval must be greater than zero".into(),
            ));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero (got {}x{})",
                self.window.width, self.window.height
            )));
        }

        parse_hex_color(&self.window.background).map_err(ConfigError::Invalid)?;

        if let Some(fps) = self.window.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "window.fps must be a finite number >= 0 (got {fps})"
                )));
            }
            if fps > 0.0 && fps < MIN_FPS {
                return Err(ConfigError::Invalid(format!(
                    "window.fps must be 0 (uncapped) or at least {MIN_FPS} (got {fps})"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
version = 1
images = [
    "https://images.example.com/one.jpg",
    "./local/two.png",
]

[cadence]
interval = "7s"
order = "shuffle"

[transition]
duration = "1500ms"
easing = "ease-in-out"

[window]
title = "Lobby"
width = 800
height = 600
background = "#102030"
fps = 30
"##;

    #[test]
    fn parses_sample_config() {
        let config = SlideshowConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        assert_eq!(config.images.len(), 2);
        assert_eq!(config.cadence.interval, Duration::from_secs(7));
        assert_eq!(config.cadence.order, CycleOrder::Shuffle);
        assert!(config.cadence.enabled);
        assert_eq!(config.transition.duration, Duration::from_millis(1500));
        assert_eq!(config.transition.easing, EasingSetting::EaseInOut);
        assert_eq!(config.window.title, "Lobby");
        assert_eq!(config.window.background_rgb().unwrap(), [0x10, 0x20, 0x30]);
        assert_eq!(config.window.fps_cap(), Some(30.0));
    }

    #[test]
    fn applies_defaults() {
        let config = SlideshowConfig::from_toml_str(
            r#"
version = 1
images = ["a.png"]
"#,
        )
        .unwrap();
        assert_eq!(config.cadence.interval, Duration::from_secs(5));
        assert_eq!(config.cadence.order, CycleOrder::Sequential);
        assert_eq!(config.transition.duration, Duration::from_secs(1));
        assert_eq!(config.transition.easing, EasingSetting::EaseOut);
        assert_eq!(config.window.background_rgb().unwrap(), [0x23, 0x27, 0x2a]);
        assert_eq!(config.window.fps_cap(), None);
    }

    #[test]
    fn numeric_durations_are_seconds() {
        let config = SlideshowConfig::from_toml_str(
            r#"
version = 1
images = ["a.png"]

[cadence]
interval = 3

[transition]
duration = 0.5
"#,
        )
        .unwrap();
        assert_eq!(config.cadence.interval, Duration::from_secs(3));
        assert_eq!(config.transition.duration, Duration::from_millis(500));
    }

    #[test]
    fn rejects_empty_image_list() {
        let err = SlideshowConfig::from_toml_str("version = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_interval() {
        let err = SlideshowConfig::from_toml_str(
            r#"
version = 1
images = ["a.png"]

[cadence]
interval = 0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_background() {
        let err = SlideshowConfig::from_toml_str(
            r#"
version = 1
images = ["a.png"]

[window]
background = "teal"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_version() {
        let err = SlideshowConfig::from_toml_str(
            r#"
version = 2
images = ["a.png"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn parse_duration_accepts_plain_seconds() {
        assert_eq!(parse_duration("2.5").unwrap(), Duration::from_millis(2500));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("inf").is_err());
        assert!(parse_duration("1e30").is_err());
    }

    #[test]
    fn rejects_unbounded_numeric_duration() {
        let err = SlideshowConfig::from_toml_str(
            r#"
version = 1
images = ["a.png"]

[cadence]
interval = inf
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("invalid duration"), "{err}");

        let err = SlideshowConfig::from_toml_str(
            r#"
version = 1
images = ["a.png"]

[transition]
duration = 1e30
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_unusable_fps() {
        let mut config = SlideshowConfig::default();
        config.images = vec!["a.png".into()];

        config.window.fps = Some(0.0);
        assert!(config.validate().is_ok());
        config.window.fps = Some(30.0);
        assert!(config.validate().is_ok());

        for fps in [1e-30, f32::INFINITY, f32::NAN, -1.0] {
            config.window.fps = Some(fps);
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "fps {fps} should be rejected"
            );
        }
    }

    #[test]
    fn parse_hex_color_requires_six_digits() {
        assert_eq!(parse_hex_color("#ffffff").unwrap(), [255, 255, 255]);
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("ffffff").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }
}
