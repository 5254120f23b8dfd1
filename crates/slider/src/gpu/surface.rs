use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;

use crate::backend::RenderBackend;
use crate::error::RenderError;
use crate::fetch::DecodedImage;
use crate::scene::{quad_vertices, OrthographicCamera, QuadVertex};
use crate::sizing::{visible_region, ContainerSize, RenderSize};
use crate::state::ShaderState;
use crate::texture::{LoadedTexture, TextureId};

use super::context::GpuContext;
use super::pipeline::SliderPipeline;
use super::textures::TextureRegistry;
use super::uniforms::SliderUniforms;

/// Fixed background of the window, `#23272a` unless configured otherwise.
pub const DEFAULT_BACKGROUND: [u8; 3] = [0x23, 0x27, 0x2a];

struct BoundPair {
    current: TextureId,
    next: TextureId,
    bind_group: wgpu::BindGroup,
}

/// wgpu implementation of [`RenderBackend`] drawing into a window surface.
///
/// The camera and quad are framed to the container size given at
/// construction; [`GpuSurface::reframe_camera`] re-frames them explicitly.
pub struct GpuSurface {
    context: GpuContext,
    pipeline: SliderPipeline,
    uniforms: SliderUniforms,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    textures: TextureRegistry,
    bound: Option<BoundPair>,
    camera: OrthographicCamera,
    container: ContainerSize,
    render_size: RenderSize,
    background: wgpu::Color,
}

impl GpuSurface {
    pub fn new<T>(target: &T, container: ContainerSize, background: [u8; 3]) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let container = ContainerSize::new(container.width.max(1), container.height.max(1));
        let context = GpuContext::new(target, container)?;
        let pipeline = SliderPipeline::new(&context.device, context.surface_format);

        let [r, g, b] = background.map(|channel| channel as f32 / 255.0);
        let camera = OrthographicCamera::framing(container);
        let uniforms = SliderUniforms::new(camera.view_projection(), [r, g, b, 1.0]);
        let uniform_buffer =
            context
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("slider uniforms"),
                    contents: bytemuck::bytes_of(&uniforms),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &pipeline.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
        let vertex_buffer = create_quad_buffer(&context.device, container);

        Ok(Self {
            context,
            pipeline,
            uniforms,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            textures: TextureRegistry::default(),
            bound: None,
            camera,
            container,
            render_size: container.as_render_size(),
            background: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
        })
    }

    /// Reconfigures the swapchain for a new container (window) size.
    pub fn resize_surface(&mut self, container: ContainerSize) {
        if container.is_empty() {
            return;
        }
        self.container = container;
        self.context.resize(container);
    }

    /// Recovers from a lost or outdated swapchain.
    pub fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    /// Frames the camera and quad to the current container size.
    pub fn reframe_camera(&mut self) {
        self.camera = OrthographicCamera::framing(self.container);
        self.uniforms.view_projection = self.camera.view_projection();
        self.vertex_buffer = create_quad_buffer(&self.context.device, self.container);
    }

    pub fn render_size(&self) -> RenderSize {
        self.render_size
    }

    /// Rebuilds the texture bind group when the `(current, next)` pair changed.
    fn bind_textures(&mut self, state: &ShaderState) -> bool {
        let (Some(current), Some(next)) = (state.current_id(), state.next_id()) else {
            return false;
        };
        if self
            .bound
            .as_ref()
            .is_some_and(|bound| bound.current == current && bound.next == next)
        {
            return true;
        }
        let (Some(current_texture), Some(next_texture)) =
            (self.textures.get(current), self.textures.get(next))
        else {
            tracing::warn!(?current, ?next, "shader references textures that were never uploaded");
            self.bound = None;
            return false;
        };
        let bind_group =
            self.pipeline
                .texture_bind_group(&self.context.device, current_texture, next_texture);
        self.bound = Some(BoundPair {
            current,
            next,
            bind_group,
        });
        true
    }
}

impl RenderBackend for GpuSurface {
    fn container_size(&self) -> ContainerSize {
        self.container
    }

    fn max_anisotropy(&self) -> u16 {
        self.context.max_anisotropy
    }

    fn upload_texture(&mut self, texture: &LoadedTexture, image: &DecodedImage) -> Result<()> {
        self.textures.upload(
            &self.context.device,
            &self.context.queue,
            self.context.max_texture_dimension,
            texture,
            image,
        )
    }

    fn retain_textures(&mut self, live: &[TextureId]) {
        let released = self.textures.retain(live);
        if self
            .bound
            .as_ref()
            .is_some_and(|bound| !live.contains(&bound.current) || !live.contains(&bound.next))
        {
            self.bound = None;
        }
        if released > 0 {
            tracing::debug!(released, remaining = self.textures.len(), "released slide textures");
        }
    }

    fn resize(&mut self, size: RenderSize) {
        self.render_size = size;
    }

    fn render(&mut self, state: &ShaderState) -> Result<(), RenderError> {
        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let draw_quad = self.bind_textures(state);
        self.uniforms.disp_factor = state.disp_factor;
        self.uniforms
            .set_crop(visible_region(self.render_size, self.container));
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("slider pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            if let (true, Some(bound)) = (draw_quad, self.bound.as_ref()) {
                render_pass.set_pipeline(&self.pipeline.pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_bind_group(1, &bound.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.draw(0..6, 0..1);
            }
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_quad_buffer(device: &wgpu::Device, container: ContainerSize) -> wgpu::Buffer {
    let vertices: [QuadVertex; 6] =
        quad_vertices(container.width as f32, container.height as f32);
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("slider quad"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    })
}
