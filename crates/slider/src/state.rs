use crate::texture::{TextureId, TextureRef};

/// Values fed to the displacement shader each frame.
#[derive(Debug, Clone, Default)]
pub struct ShaderState {
    pub current: Option<TextureRef>,
    pub next: Option<TextureRef>,
    pub disp_factor: f32,
}

impl ShaderState {
    pub fn current_id(&self) -> Option<TextureId> {
        self.current.as_ref().map(|texture| texture.id)
    }

    pub fn next_id(&self) -> Option<TextureId> {
        self.next.as_ref().map(|texture| texture.id)
    }

    /// Intrinsic size of the image on screen, used for fitting.
    pub fn current_dims(&self) -> Option<(u32, u32)> {
        self.current.as_ref().map(|texture| texture.dimensions())
    }

    pub fn ids(&self) -> impl Iterator<Item = TextureId> {
        self.current_id().into_iter().chain(self.next_id())
    }
}
