//! wgpu rendering for the slider.
//!
//! - `context` owns the instance, device, and window surface and reconfigures
//!   the swapchain on resize.
//! - `shader` holds the GLSL quad and displacement programs.
//! - `pipeline` builds the single render pipeline and its bind group layouts.
//! - `textures` keeps one texture/sampler pair per uploaded slide.
//! - `uniforms` mirrors the shader's uniform block.
//! - `surface` ties them together as a [`RenderBackend`](crate::RenderBackend).

mod context;
mod pipeline;
mod shader;
mod surface;
mod textures;
mod uniforms;

pub use surface::{GpuSurface, DEFAULT_BACKGROUND};
