//! Displacement cross-fade image slider.
//!
//! A [`Slider`] owns an ordered list of image sources, loads them into GPU
//! textures, and switches between them with a shader transition driven by a
//! displacement factor that eases from 0 to 1:
//!
//! ```text
//!   init / switch_by_id / update_slider
//!          │ queued, one at a time
//!          ▼
//!   Slider::frame ──▶ TextureCache::poll ──▶ RenderBackend::upload_texture
//!          │
//!          ├──▶ TransitionController::advance ──▶ ShaderState.disp_factor
//!          │
//!          └──▶ RenderBackend::render(&ShaderState)
//! ```
//!
//! Decoding runs on a loader thread; uploads and draws stay on the thread
//! that calls [`Slider::frame`]. [`GpuSurface`] renders through wgpu into a
//! window surface, and [`WindowRuntime`] hosts the whole thing in its own
//! winit window so callers can drive it from any thread.

mod backend;
mod completion;
mod error;
mod fetch;
mod gpu;
mod runtime;
mod scene;
mod sizing;
mod slider;
mod source;
mod state;
mod texture;
mod timeline;
mod transition;
mod window;

pub use backend::RenderBackend;
pub use completion::{completion_pair, Completion, PendingResult, SliderResult};
pub use error::{LoadError, RenderError, SliderError};
pub use fetch::{DecodedImage, HttpFetcher, ImageFetcher};
pub use gpu::{GpuSurface, DEFAULT_BACKGROUND};
pub use runtime::FrameLoop;
pub use sizing::{compute_size, visible_region, ContainerSize, RenderSize, VisibleRegion};
pub use slider::{Slider, SliderOptions, TransitionRequest};
pub use source::{ImageSource, SourceLocation};
pub use state::ShaderState;
pub use texture::{
    FilterMode, LoadedTexture, TextureCache, TextureFilter, TextureId, TextureRef, TextureSet,
};
pub use timeline::{Easing, Tween};
pub use transition::{TransitionController, TransitionPhase, TransitionStep};
pub use window::{WindowConfig, WindowRuntime};
