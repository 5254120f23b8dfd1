use crate::error::RenderError;
use crate::fetch::DecodedImage;
use crate::sizing::{ContainerSize, RenderSize};
use crate::state::ShaderState;
use crate::texture::{LoadedTexture, TextureId};

/// Drawing surface driven by the [`Slider`](crate::Slider).
///
/// [`GpuSurface`](crate::GpuSurface) is the wgpu implementation; tests swap in
/// a recording fake.
pub trait RenderBackend {
    /// Current bounds of the hosting container.
    fn container_size(&self) -> ContainerSize;

    /// Highest anisotropic filtering level the device supports (1 when none).
    fn max_anisotropy(&self) -> u16;

    /// Creates GPU resources for `texture` from the decoded pixels.
    fn upload_texture(&mut self, texture: &LoadedTexture, image: &DecodedImage)
        -> anyhow::Result<()>;

    /// Releases resources of every texture not listed in `live`.
    fn retain_textures(&mut self, live: &[TextureId]);

    /// Sets the drawing buffer size.
    fn resize(&mut self, size: RenderSize);

    /// Draws one frame for `state`. Must be idempotent.
    fn render(&mut self, state: &ShaderState) -> Result<(), RenderError>;
}
