use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use slideconfig::{parse_duration, parse_hex_color, CycleOrder};

#[derive(Parser, Debug)]
#[command(
    name = "potato-slider",
    author,
    version,
    about = "Displacement cross-fade image slideshow",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Clone, Default)]
pub struct RunArgs {
    /// Image URLs or paths; replaces the `images` list of the config file.
    #[arg(value_name = "IMAGES")]
    pub images: Vec<String>,

    /// Slideshow TOML file.
    #[arg(long, value_name = "FILE", env = "POTATO_SLIDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Time between automatic switches (`5s`, `1m30s`, or bare seconds).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub interval: Option<Duration>,

    /// Cycle order: `sequential` or `shuffle`.
    #[arg(long, value_name = "ORDER", value_parser = parse_order)]
    pub order: Option<CycleOrder>,

    /// Length of one cross-fade.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Frame rate cap (0=uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Background colour behind the images (`#rrggbb`).
    #[arg(long, value_name = "COLOR", value_parser = parse_background)]
    pub background: Option<String>,

    /// Window title.
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Show the first image and never switch automatically.
    #[arg(long)]
    pub no_cycle: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate and print the resolved configuration without opening a window.
    Check(RunArgs),
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_order(value: &str) -> Result<CycleOrder, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "sequential" | "seq" | "in-order" => Ok(CycleOrder::Sequential),
        "shuffle" | "random" => Ok(CycleOrder::Shuffle),
        "" => Err("cycle order must not be empty".to_string()),
        other => Err(format!(
            "unknown cycle order '{other}'; expected sequential or shuffle"
        )),
    }
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("window size must be greater than zero".into());
    }
    Ok((width, height))
}

fn parse_background(value: &str) -> Result<String, String> {
    parse_hex_color(value)?;
    Ok(value.trim().to_string())
}
