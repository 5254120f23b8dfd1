use bytemuck::{Pod, Zeroable};

use crate::scene::Mat4;
use crate::sizing::VisibleRegion;

use super::shader::INTENSITY;

/// std140 mirror of the `SliderParams` block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct SliderUniforms {
    pub view_projection: Mat4,
    /// `xy` visible scale, `zw` visible offset, in UV units.
    pub crop: [f32; 4],
    pub background: [f32; 4],
    pub disp_factor: f32,
    pub intensity: f32,
    pub _padding: [f32; 2],
}

impl SliderUniforms {
    pub fn new(view_projection: Mat4, background: [f32; 4]) -> Self {
        Self {
            view_projection,
            crop: [1.0, 1.0, 0.0, 0.0],
            background,
            disp_factor: 0.0,
            intensity: INTENSITY,
            _padding: [0.0; 2],
        }
    }

    pub fn set_crop(&mut self, region: VisibleRegion) {
        self.crop = [
            region.scale[0],
            region.scale[1],
            region.offset[0],
            region.offset[1],
        ];
    }
}
