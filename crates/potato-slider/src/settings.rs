use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use slideconfig::{ConfigError, EasingSetting, SlideshowConfig};
use slider::{Easing, ImageSource, SliderOptions, WindowConfig};

use crate::cli::RunArgs;
use crate::paths::AppPaths;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::File(path) => write!(f, "{}", path.display()),
            ConfigOrigin::Defaults => f.write_str("built-in defaults"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: SlideshowConfig,
    pub origin: ConfigOrigin,
}

/// Loads the config file (explicit, or the default one when present), applies
/// CLI overrides, and validates the result.
pub fn resolve(args: &RunArgs, paths: &AppPaths) -> Result<ResolvedConfig> {
    let (mut config, origin) = match &args.config {
        Some(path) => (load_file(path)?, ConfigOrigin::File(path.clone())),
        None => {
            let path = paths.default_config_file();
            if path.is_file() {
                (load_file(&path)?, ConfigOrigin::File(path))
            } else {
                tracing::debug!(path = %path.display(), "no slideshow config; using defaults");
                (SlideshowConfig::default(), ConfigOrigin::Defaults)
            }
        }
    };

    apply_overrides(&mut config, args);
    config
        .validate()
        .with_context(|| format!("invalid slideshow configuration ({origin})"))?;
    Ok(ResolvedConfig { config, origin })
}

fn load_file(path: &Path) -> Result<SlideshowConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read slideshow config {}", path.display()))?;
    // validation runs after CLI overrides, which may supply the images
    toml::from_str(&raw)
        .map_err(ConfigError::from)
        .with_context(|| format!("failed to load {}", path.display()))
}

pub fn apply_overrides(config: &mut SlideshowConfig, args: &RunArgs) {
    if !args.images.is_empty() {
        config.images = args.images.clone();
    }
    if let Some(interval) = args.interval {
        config.cadence.interval = interval;
    }
    if let Some(order) = args.order {
        config.cadence.order = order;
    }
    if args.no_cycle {
        config.cadence.enabled = false;
    }
    if let Some(duration) = args.duration {
        config.transition.duration = duration;
    }
    if let Some((width, height)) = args.size {
        config.window.width = width;
        config.window.height = height;
    }
    if let Some(fps) = args.fps {
        config.window.fps = Some(fps);
    }
    if let Some(background) = &args.background {
        config.window.background = background.clone();
    }
    if let Some(title) = &args.title {
        config.window.title = title.clone();
    }
}

pub fn easing(setting: EasingSetting) -> Easing {
    match setting {
        EasingSetting::Linear => Easing::Linear,
        EasingSetting::EaseOut => Easing::EaseOut,
        EasingSetting::EaseInOut => Easing::EaseInOut,
        EasingSetting::Smoothstep => Easing::Smoothstep,
    }
}

pub fn window_config(config: &SlideshowConfig) -> Result<WindowConfig> {
    let images = config
        .images
        .iter()
        .map(|image| ImageSource::new(image.trim()))
        .collect();
    let mut window = WindowConfig::new(images);
    window.title = config.window.title.clone();
    window.size = (config.window.width, config.window.height);
    window.background = config
        .window
        .background_rgb()
        .context("invalid window background")?;
    window.target_fps = config.window.fps_cap();
    window.options = SliderOptions {
        transition_duration: config.transition.duration,
        easing: easing(config.transition.easing),
    };
    Ok(window)
}

/// Human-readable summary printed by `potato-slider check`.
pub fn describe(resolved: &ResolvedConfig) -> String {
    let config = &resolved.config;
    let mut out = String::new();
    out.push_str(&format!("Configuration: {}\n", resolved.origin));
    out.push_str(&format!("Images ({}):\n", config.images.len()));
    for (index, image) in config.images.iter().enumerate() {
        out.push_str(&format!("  [{index}] {image}\n"));
    }
    let cadence = if config.cadence.enabled {
        format!(
            "every {:?} ({})",
            config.cadence.interval,
            config.cadence.order
        )
    } else {
        "disabled".to_string()
    };
    out.push_str(&format!("Cadence:    {cadence}\n"));
    out.push_str(&format!(
        "Transition: {:?} {}\n",
        config.transition.duration,
        config.transition.easing
    ));
    out.push_str(&format!(
        "Window:     {}x{} \"{}\" background {}\n",
        config.window.width, config.window.height, config.window.title, config.window.background
    ));
    let fps = match config.window.fps_cap() {
        Some(fps) => format!("{fps}"),
        None => "uncapped".to_string(),
    };
    out.push_str(&format!("FPS:        {fps}\n"));
    out
}
