use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Sender};
use tracing::{debug, error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{
    ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy, EventLoopWindowTarget,
};
use winit::window::{Window, WindowBuilder};

use crate::completion::{completion_pair, Completion, PendingResult};
use crate::error::RenderError;
use crate::fetch::{HttpFetcher, ImageFetcher};
use crate::gpu::{GpuSurface, DEFAULT_BACKGROUND};
use crate::runtime::FrameLoop;
use crate::sizing::ContainerSize;
use crate::slider::{Operation, Slider, SliderOptions, TransitionRequest};
use crate::source::ImageSource;

/// Everything the window thread needs to build its slider.
#[derive(Clone)]
pub struct WindowConfig {
    pub title: String,
    pub size: (u32, u32),
    pub background: [u8; 3],
    /// `None` renders on every display refresh.
    pub target_fps: Option<f32>,
    pub images: Vec<ImageSource>,
    pub options: SliderOptions,
    /// Defaults to [`HttpFetcher`].
    pub fetcher: Option<Arc<dyn ImageFetcher>>,
}

impl WindowConfig {
    pub fn new(images: Vec<ImageSource>) -> Self {
        Self {
            title: "Potato Slider".to_string(),
            size: (1280, 720),
            background: DEFAULT_BACKGROUND,
            target_fps: None,
            images,
            options: SliderOptions::default(),
            fetcher: None,
        }
    }
}

#[derive(Debug)]
enum WindowCommand {
    Init(Completion),
    Switch(TransitionRequest),
    Update {
        images: Vec<ImageSource>,
        completion: Completion,
    },
    Shutdown,
}

/// A slider living in its own window on a dedicated thread.
///
/// Every command returns a [`PendingResult`]; commands sent after the window
/// has closed resolve with [`SliderError::Disposed`](crate::SliderError::Disposed).
pub struct WindowRuntime {
    proxy: EventLoopProxy<WindowCommand>,
    join_handle: Option<JoinHandle<Result<()>>>,
}

impl WindowRuntime {
    pub fn spawn(config: WindowConfig) -> Result<Self> {
        let (ready_tx, ready_rx) = bounded(1);
        let handle = thread::Builder::new()
            .name("potato-slider-window".into())
            .spawn(move || run_window_thread(config, ready_tx))
            .map_err(|err| anyhow!("failed to spawn window thread: {err}"))?;

        let proxy = match ready_rx.recv() {
            Ok(Ok(proxy)) => proxy,
            Ok(Err(err)) => {
                let _ = handle.join();
                return Err(err);
            }
            Err(err) => {
                let _ = handle.join();
                return Err(anyhow!("window thread failed to initialise: {err}"));
            }
        };

        Ok(Self {
            proxy,
            join_handle: Some(handle),
        })
    }

    pub fn init(&self) -> PendingResult {
        let (completion, pending) = completion_pair();
        self.send(WindowCommand::Init(completion));
        pending
    }

    pub fn switch_by_id(&self, index: usize) -> PendingResult {
        let (completion, pending) = completion_pair();
        self.send(WindowCommand::Switch(TransitionRequest::new(index, completion)));
        pending
    }

    pub fn update_slider(&self, images: Vec<ImageSource>) -> PendingResult {
        let (completion, pending) = completion_pair();
        self.send(WindowCommand::Update { images, completion });
        pending
    }

    /// True once the window thread has exited (window closed or failed).
    pub fn is_finished(&self) -> bool {
        self.join_handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    pub fn shutdown(mut self) -> Result<()> {
        if let Some(handle) = self.join_handle.take() {
            let _ = self.proxy.send_event(WindowCommand::Shutdown);
            handle
                .join()
                .map_err(|err| anyhow!("window thread panicked: {err:?}"))??;
        }
        Ok(())
    }

    fn send(&self, command: WindowCommand) {
        // a closed loop hands the command back; dropping it resolves the
        // caller's handle with `Disposed`
        if let Err(err) = self.proxy.send_event(command) {
            warn!(command = ?err.0, "window runtime is closed");
        }
    }
}

impl Drop for WindowRuntime {
    fn drop(&mut self) {
        if let Some(handle) = self.join_handle.take() {
            let _ = self.proxy.send_event(WindowCommand::Shutdown);
            let _ = handle.join();
        }
    }
}

type WindowParts = (EventLoop<WindowCommand>, Arc<Window>, Slider<GpuSurface>);

fn build_window(config: &WindowConfig) -> Result<WindowParts> {
    let mut builder = EventLoopBuilder::<WindowCommand>::with_user_event();
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        use winit::platform::wayland::EventLoopBuilderExtWayland;
        EventLoopBuilderExtWayland::with_any_thread(&mut builder, true);
    }

    #[cfg(any(
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    ))]
    {
        use winit::platform::x11::EventLoopBuilderExtX11;
        EventLoopBuilderExtX11::with_any_thread(&mut builder, true);
    }
    let event_loop = builder
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let (width, height) = config.size;
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(PhysicalSize::new(width.max(1), height.max(1)))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create slider window: {err}"))?;
    let window = Arc::new(window);

    let size = window.inner_size();
    let container = ContainerSize::new(size.width, size.height);
    let surface = GpuSurface::new(window.as_ref(), container, config.background)
        .context("failed to initialise window renderer")?;

    let fetcher: Arc<dyn ImageFetcher> = match &config.fetcher {
        Some(fetcher) => Arc::clone(fetcher),
        None => Arc::new(HttpFetcher::new().context("failed to build HTTP client")?),
    };
    let slider = Slider::new(surface, fetcher, config.options, config.images.clone());
    Ok((event_loop, window, slider))
}

fn run_window_thread(
    config: WindowConfig,
    ready_tx: Sender<Result<EventLoopProxy<WindowCommand>>>,
) -> Result<()> {
    let (event_loop, window, mut slider) = match build_window(&config) {
        Ok(parts) => parts,
        Err(err) => {
            let message = format!("{err:#}");
            let _ = ready_tx.send(Err(anyhow!(message)));
            return Err(err);
        }
    };

    let mut frames = FrameLoop::new(config.target_fps);
    frames.request();
    window.request_redraw();

    let _ = ready_tx.send(Ok(event_loop.create_proxy()));
    info!(
        width = config.size.0,
        height = config.size.1,
        images = config.images.len(),
        "slider window ready"
    );

    let loop_window = Arc::clone(&window);
    let run_result = event_loop.run(move |event, elwt| match event {
        Event::UserEvent(command) => {
            match command {
                WindowCommand::Init(completion) => slider.enqueue(Operation::Init(completion)),
                WindowCommand::Switch(request) => slider.enqueue(Operation::Switch(request)),
                WindowCommand::Update { images, completion } => {
                    slider.enqueue(Operation::Update {
                        sources: images,
                        completion,
                    })
                }
                WindowCommand::Shutdown => {
                    frames.cancel();
                    slider.dispose();
                    elwt.exit();
                    return;
                }
            }
            loop_window.request_redraw();
        }
        Event::WindowEvent { window_id, event } if window_id == loop_window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                info!("slider window closed");
                frames.cancel();
                slider.dispose();
                elwt.exit();
            }
            WindowEvent::Resized(new_size) => {
                let container = ContainerSize::new(new_size.width, new_size.height);
                if container.is_empty() {
                    return;
                }
                let backend = slider.backend_mut();
                backend.resize_surface(container);
                backend.reframe_camera();
                if let Err(err) = slider.set_container_size(container) {
                    handle_render_error(&mut slider, err, elwt);
                }
                debug!(
                    width = container.width,
                    height = container.height,
                    render = ?slider.backend().render_size(),
                    "window resized"
                );
            }
            WindowEvent::RedrawRequested => {
                if !frames.is_active() {
                    return;
                }
                let now = Instant::now();
                frames.mark_rendered(now);
                if let Err(err) = slider.frame(now) {
                    handle_render_error(&mut slider, err, elwt);
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            if frames.ready_for_frame(now) {
                loop_window.request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = frames.next_deadline() {
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    });

    // the closure owning the surface is gone; the window can follow
    drop(window);
    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}

fn handle_render_error(
    slider: &mut Slider<GpuSurface>,
    err: RenderError,
    elwt: &EventLoopWindowTarget<WindowCommand>,
) {
    match err {
        RenderError::Lost | RenderError::Outdated => slider.backend_mut().reconfigure(),
        RenderError::Timeout => warn!("surface timeout; retrying next frame"),
        RenderError::OutOfMemory => {
            error!("surface out of memory; closing slider window");
            slider.dispose();
            elwt.exit();
        }
        RenderError::Other(message) => warn!(%message, "surface error; retrying next frame"),
    }
}
