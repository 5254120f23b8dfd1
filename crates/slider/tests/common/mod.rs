#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use image::RgbaImage;
use slider::{
    ContainerSize, DecodedImage, ImageFetcher, ImageSource, LoadError, LoadedTexture,
    PendingResult, RenderBackend, RenderError, RenderSize, ShaderState, Slider, SliderOptions,
    SliderResult, TextureId,
};

/// What one `render` call saw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub current: Option<TextureId>,
    pub next: Option<TextureId>,
    pub disp_factor: f32,
    pub size: RenderSize,
}

/// Backend that records every call instead of drawing.
#[derive(Debug)]
pub struct RecordingBackend {
    pub container: ContainerSize,
    pub size: RenderSize,
    pub frames: Vec<Frame>,
    pub uploads: Vec<(TextureId, u32, u32)>,
    pub live: Vec<TextureId>,
    pub fail_next_render: Option<RenderError>,
    pub anisotropy: u16,
}

impl RecordingBackend {
    pub fn new(width: u32, height: u32) -> Self {
        let container = ContainerSize::new(width, height);
        Self {
            container,
            size: container.as_render_size(),
            frames: Vec::new(),
            uploads: Vec::new(),
            live: Vec::new(),
            fail_next_render: None,
            anisotropy: 8,
        }
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.frames.last().copied()
    }
}

impl RenderBackend for RecordingBackend {
    fn container_size(&self) -> ContainerSize {
        self.container
    }

    fn max_anisotropy(&self) -> u16 {
        self.anisotropy
    }

    fn upload_texture(
        &mut self,
        texture: &LoadedTexture,
        image: &DecodedImage,
    ) -> anyhow::Result<()> {
        self.uploads.push((texture.id, image.width, image.height));
        self.live.push(texture.id);
        Ok(())
    }

    fn retain_textures(&mut self, live: &[TextureId]) {
        self.live.retain(|id| live.contains(id));
    }

    fn resize(&mut self, size: RenderSize) {
        self.size = size;
    }

    fn render(&mut self, state: &ShaderState) -> Result<(), RenderError> {
        if let Some(err) = self.fail_next_render.take() {
            return Err(err);
        }
        self.frames.push(Frame {
            current: state.current_id(),
            next: state.next_id(),
            disp_factor: state.disp_factor,
            size: self.size,
        });
        Ok(())
    }
}

/// Serves solid images of fixed sizes; unknown sources fail like a 404.
#[derive(Debug, Default, Clone)]
pub struct MemoryFetcher {
    images: HashMap<String, (u32, u32)>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, source: &str, width: u32, height: u32) -> Self {
        self.images.insert(source.to_string(), (width, height));
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl ImageFetcher for MemoryFetcher {
    fn fetch(&self, source: &ImageSource) -> Result<DecodedImage, LoadError> {
        self.fetched.lock().unwrap().push(source.to_string());
        match self.images.get(source.as_str()) {
            Some(&(width, height)) => Ok(DecodedImage::from_top_down(RgbaImage::new(
                width, height,
            ))),
            None => Err(LoadError::Io {
                location: source.to_string(),
                error: io::Error::new(io::ErrorKind::NotFound, "no such image"),
            }),
        }
    }
}

pub fn sources(names: &[&str]) -> Vec<ImageSource> {
    names.iter().map(|name| ImageSource::from(*name)).collect()
}

/// Three landscape images, `u0` to `u2`, in a 800x600 container.
pub fn three_image_slider() -> (Slider<RecordingBackend>, MemoryFetcher) {
    let fetcher = MemoryFetcher::new()
        .with_image("u0", 1600, 900)
        .with_image("u1", 1200, 800)
        .with_image("u2", 400, 600);
    let slider = Slider::new(
        RecordingBackend::new(800, 600),
        Arc::new(fetcher.clone()),
        SliderOptions::default(),
        sources(&["u0", "u1", "u2"]),
    );
    (slider, fetcher)
}

/// Synthetic clock for driving `Slider::frame`.
pub struct Clock {
    now: Instant,
    step: Duration,
}

impl Clock {
    pub fn new(step: Duration) -> Self {
        Self {
            now: Instant::now(),
            step,
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn tick(&mut self) -> Instant {
        self.now += self.step;
        self.now
    }
}

/// Runs frames until `pending` resolves. Loader threads run in real time, so
/// frames sleep briefly while a batch is still loading.
pub fn drive(
    slider: &mut Slider<RecordingBackend>,
    clock: &mut Clock,
    pending: &PendingResult,
) -> SliderResult {
    for _ in 0..5_000 {
        let _ = slider.frame(clock.tick());
        if let Some(result) = pending.try_result() {
            return result;
        }
        if slider.is_loading() {
            thread::sleep(Duration::from_millis(1));
        }
    }
    panic!("operation never resolved");
}

/// Initialises `slider` and asserts success.
pub fn init(slider: &mut Slider<RecordingBackend>, clock: &mut Clock) {
    let pending = slider.init();
    drive(slider, clock, &pending).expect("init succeeds");
}
