use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cadence::Cadence;
use slider::{PendingResult, SliderError, WindowRuntime};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::paths::AppPaths;
use crate::settings::{self, ResolvedConfig};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn check(args: RunArgs) -> Result<()> {
    let resolved = resolve(&args)?;
    print!("{}", settings::describe(&resolved));
    println!("Configuration is valid.");
    Ok(())
}

pub fn run(args: RunArgs) -> Result<()> {
    let ResolvedConfig { config, origin } = resolve(&args)?;
    tracing::info!(
        images = config.images.len(),
        config = %origin,
        interval = ?config.cadence.interval,
        order = %config.cadence.order,
        "starting potato-slider"
    );

    let window = settings::window_config(&config)?;
    let runtime = WindowRuntime::spawn(window).context("failed to open slideshow window")?;

    if let Err(err) = runtime.init().wait() {
        tracing::error!(error = %err, "slideshow failed to initialise");
        runtime.shutdown()?;
        return Err(err).context("failed to load slideshow images");
    }

    if config.cadence.enabled && config.images.len() > 1 {
        let mut cadence = Cadence::from_config(&config, Instant::now())
            .context("failed to start slideshow cadence")?;
        cycle(&runtime, &mut cadence);
    } else {
        tracing::info!("automatic switching disabled; close the window to exit");
        while !runtime.is_finished() {
            thread::sleep(POLL_INTERVAL);
        }
    }

    runtime.shutdown()
}

fn resolve(args: &RunArgs) -> Result<ResolvedConfig> {
    let paths = AppPaths::discover()?;
    tracing::debug!(config_dir = %paths.config_dir().display(), "resolved potato-slider paths");
    settings::resolve(args, &paths)
}

/// Switches on the cadence until the window closes. Only one switch is in
/// flight at a time; a tick that lands while one is running waits for it.
fn cycle(runtime: &WindowRuntime, cadence: &mut Cadence) {
    let mut in_flight: Option<(usize, PendingResult)> = None;
    while !runtime.is_finished() {
        if let Some((index, pending)) = in_flight.take() {
            match pending.try_result() {
                None => in_flight = Some((index, pending)),
                Some(Ok(())) => tracing::debug!(index, "switch finished"),
                Some(Err(SliderError::Disposed)) => break,
                Some(Err(err)) => tracing::warn!(index, error = %err, "switch failed"),
            }
        }

        if in_flight.is_none() {
            if let Some(index) = cadence.tick(Instant::now()) {
                tracing::info!(index, "switching image");
                in_flight = Some((index, runtime.switch_by_id(index)));
            }
        }

        thread::sleep(POLL_INTERVAL);
    }
}
