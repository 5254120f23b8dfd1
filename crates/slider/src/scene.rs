//! Camera and quad geometry for the single textured plane the slider draws.

use bytemuck::{Pod, Zeroable};

use crate::sizing::ContainerSize;

pub type Mat4 = [[f32; 4]; 4];

const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Orthographic camera framed to a container's pixel bounds, looking down -Z
/// from `z = 1`. Matrices are column-major with a `[0, 1]` depth range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl OrthographicCamera {
    pub fn framing(container: ContainerSize) -> Self {
        let half_width = container.width.max(1) as f32 / 2.0;
        let half_height = container.height.max(1) as f32 / 2.0;
        Self {
            left: -half_width,
            right: half_width,
            top: half_height,
            bottom: -half_height,
            near: 1.0,
            far: 1000.0,
            position: [0.0, 0.0, 1.0],
        }
    }

    pub fn projection(&self) -> Mat4 {
        let width = self.right - self.left;
        let height = self.top - self.bottom;
        let depth = self.far - self.near;
        let mut m = IDENTITY;
        m[0][0] = 2.0 / width;
        m[1][1] = 2.0 / height;
        m[2][2] = -1.0 / depth;
        m[3][0] = -(self.right + self.left) / width;
        m[3][1] = -(self.top + self.bottom) / height;
        m[3][2] = -self.near / depth;
        m
    }

    pub fn view(&self) -> Mat4 {
        let mut m = IDENTITY;
        m[3][0] = -self.position[0];
        m[3][1] = -self.position[1];
        m[3][2] = -self.position[2];
        m
    }

    pub fn view_projection(&self) -> Mat4 {
        multiply(&self.projection(), &self.view())
    }
}

fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [[0.0; 4]; 4];
    for (column, out_column) in out.iter_mut().enumerate() {
        for (row, cell) in out_column.iter_mut().enumerate() {
            *cell = (0..4).map(|k| a[k][row] * b[column][k]).sum();
        }
    }
    out
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Plane centred on the origin, two counter-clockwise triangles.
pub fn quad_vertices(width: f32, height: f32) -> [QuadVertex; 6] {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let bottom_left = QuadVertex {
        position: [-hw, -hh, 0.0],
        uv: [0.0, 0.0],
    };
    let bottom_right = QuadVertex {
        position: [hw, -hh, 0.0],
        uv: [1.0, 0.0],
    };
    let top_right = QuadVertex {
        position: [hw, hh, 0.0],
        uv: [1.0, 1.0],
    };
    let top_left = QuadVertex {
        position: [-hw, hh, 0.0],
        uv: [0.0, 1.0],
    };
    [
        bottom_left,
        bottom_right,
        top_right,
        bottom_left,
        top_right,
        top_left,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform_point(m: &Mat4, point: [f32; 3]) -> [f32; 4] {
        let v = [point[0], point[1], point[2], 1.0];
        let mut out = [0.0; 4];
        for (row, cell) in out.iter_mut().enumerate() {
            *cell = (0..4).map(|k| m[k][row] * v[k]).sum();
        }
        out
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn quad_corners_fill_clip_space() {
        let container = ContainerSize::new(800, 600);
        let camera = OrthographicCamera::framing(container);
        let vp = camera.view_projection();
        for vertex in quad_vertices(800.0, 600.0) {
            let clip = transform_point(&vp, vertex.position);
            let expected_x = vertex.uv[0] * 2.0 - 1.0;
            let expected_y = vertex.uv[1] * 2.0 - 1.0;
            assert!(approx(clip[0], expected_x), "x {clip:?}");
            assert!(approx(clip[1], expected_y), "y {clip:?}");
            assert!(clip[2] >= 0.0 && clip[2] <= 1.0, "depth {clip:?}");
            assert!(approx(clip[3], 1.0));
        }
    }

    #[test]
    fn far_plane_maps_to_one() {
        let camera = OrthographicCamera::framing(ContainerSize::new(10, 10));
        let clip = transform_point(&camera.view_projection(), [0.0, 0.0, 1.0 - camera.far]);
        assert!(approx(clip[2], 1.0));
    }

    #[test]
    fn multiply_by_identity_is_noop() {
        let camera = OrthographicCamera::framing(ContainerSize::new(320, 200));
        let projection = camera.projection();
        assert_eq!(multiply(&projection, &IDENTITY), projection);
        assert_eq!(multiply(&IDENTITY, &projection), projection);
    }

    #[test]
    fn quad_winds_counter_clockwise() {
        let vertices = quad_vertices(2.0, 2.0);
        for triangle in vertices.chunks(3) {
            let [a, b, c] = [triangle[0].position, triangle[1].position, triangle[2].position];
            let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(cross > 0.0);
        }
    }
}
