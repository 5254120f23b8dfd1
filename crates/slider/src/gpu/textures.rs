use std::collections::HashMap;

use anyhow::Result;
use wgpu::util::{DeviceExt, TextureDataOrder};

use crate::fetch::DecodedImage;
use crate::texture::{FilterMode, LoadedTexture, TextureId};

pub(crate) struct GpuTexture {
    pub _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// GPU resources of every uploaded slide, keyed by [`TextureId`].
#[derive(Default)]
pub(crate) struct TextureRegistry {
    entries: HashMap<TextureId, GpuTexture>,
}

impl TextureRegistry {
    pub fn get(&self, id: TextureId) -> Option<&GpuTexture> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        max_dimension: u32,
        texture: &LoadedTexture,
        image: &DecodedImage,
    ) -> Result<()> {
        if image.width == 0 || image.height == 0 {
            anyhow::bail!("image {} has no pixels", texture.source);
        }
        if image.width > max_dimension || image.height > max_dimension {
            anyhow::bail!(
                "image {} is {}x{}, GPU max texture dimension is {max_dimension}",
                texture.source,
                image.width,
                image.height
            );
        }

        let gpu_texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(&format!("slide texture #{}", texture.id.0)),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            image.pixels.as_raw(),
        );

        let view = gpu_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let filter = texture.filter;
        let mag_filter = filter_mode(filter.mag);
        let min_filter = filter_mode(filter.min);
        // anisotropic sampling is only valid when every filter is linear
        let all_linear = mag_filter == wgpu::FilterMode::Linear
            && min_filter == wgpu::FilterMode::Linear;
        let anisotropy_clamp = if all_linear {
            filter.anisotropy.clamp(1, 16)
        } else {
            1
        };
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("slide sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter,
            min_filter,
            mipmap_filter: if all_linear {
                wgpu::FilterMode::Linear
            } else {
                wgpu::FilterMode::Nearest
            },
            anisotropy_clamp,
            ..Default::default()
        });

        tracing::debug!(
            id = texture.id.0,
            width = image.width,
            height = image.height,
            anisotropy = anisotropy_clamp,
            "uploaded slide texture"
        );
        self.entries.insert(
            texture.id,
            GpuTexture {
                _texture: gpu_texture,
                view,
                sampler,
            },
        );
        Ok(())
    }

    /// Drops every texture not in `live`; returns how many were released.
    pub fn retain(&mut self, live: &[TextureId]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| live.contains(id));
        before - self.entries.len()
    }
}

fn filter_mode(mode: FilterMode) -> wgpu::FilterMode {
    match mode {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}
