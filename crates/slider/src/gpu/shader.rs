use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Strength of the displacement applied by the fragment shader.
pub(crate) const INTENSITY: f32 = 0.3;

pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("slider quad vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("slider displacement fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(FRAGMENT_SHADER_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Uniform block shared by both stages. Must match
/// [`SliderUniforms`](super::uniforms::SliderUniforms).
macro_rules! uniform_block {
    () => {
        r"
layout(std140, set = 0, binding = 0) uniform SliderParams {
    mat4 view_projection;
    vec4 crop;
    vec4 background;
    float disp_factor;
    float intensity;
    vec2 _padding;
} ubo;
"
    };
}

const VERTEX_SHADER_GLSL: &str = concat!(
    r"#version 450
layout(location = 0) in vec3 position;
layout(location = 1) in vec2 uv;
layout(location = 0) out vec2 v_uv;
",
    uniform_block!(),
    r"
void main() {
    v_uv = uv;
    gl_Position = ubo.view_projection * vec4(position, 1.0);
}
"
);

/// Displacement cross-fade. Each image is sampled with its y coordinate pushed
/// by the red channel of the other image, then the two are mixed by
/// `disp_factor`. Outside the cover-fitted image the background shows.
const FRAGMENT_SHADER_GLSL: &str = concat!(
    r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;
",
    uniform_block!(),
    r"
layout(set = 1, binding = 0) uniform texture2D current_texture;
layout(set = 1, binding = 1) uniform sampler current_sampler;
layout(set = 1, binding = 2) uniform texture2D next_texture;
layout(set = 1, binding = 3) uniform sampler next_sampler;

void main() {
    vec2 uv = ubo.crop.zw + v_uv * ubo.crop.xy;
    float inside = step(0.0, uv.x) * step(uv.x, 1.0) * step(0.0, uv.y) * step(uv.y, 1.0);

    vec4 orig1 = texture(sampler2D(current_texture, current_sampler), uv);
    vec4 orig2 = texture(sampler2D(next_texture, next_sampler), uv);

    vec4 current = texture(
        sampler2D(current_texture, current_sampler),
        vec2(uv.x, uv.y + ubo.disp_factor * (orig2.r * ubo.intensity)));
    vec4 next = texture(
        sampler2D(next_texture, next_sampler),
        vec2(uv.x, uv.y + (1.0 - ubo.disp_factor) * (orig1.r * ubo.intensity)));

    vec4 color = mix(current, next, ubo.disp_factor);
    out_color = mix(ubo.background, color, inside);
}
"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_stages_declare_the_same_uniform_block() {
        let block = uniform_block!().trim();
        assert!(VERTEX_SHADER_GLSL.contains(block));
        assert!(FRAGMENT_SHADER_GLSL.contains(block));
    }

    #[test]
    fn fragment_displaces_by_the_other_image() {
        assert!(FRAGMENT_SHADER_GLSL.contains("ubo.disp_factor * (orig2.r * ubo.intensity)"));
        assert!(FRAGMENT_SHADER_GLSL.contains("(1.0 - ubo.disp_factor) * (orig1.r * ubo.intensity)"));
        assert!(FRAGMENT_SHADER_GLSL.contains("mix(current, next, ubo.disp_factor)"));
    }
}
