//! Cover-fit sizing of the drawing buffer against its container.

/// Size of the drawing buffer in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSize {
    pub width: f32,
    pub height: f32,
}

impl RenderSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Pixel extent for allocating GPU targets; never below 1x1.
    pub fn to_pixels(self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

/// Size of the hosting container (the window's inner size) in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSize {
    pub width: u32,
    pub height: u32,
}

impl ContainerSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_render_size(self) -> RenderSize {
        RenderSize::new(self.width as f32, self.height as f32)
    }
}

/// Fits an image of `image` dimensions so it covers `container` on both axes.
///
/// Without an image, or with a degenerate one, the container bounds are used.
pub fn compute_size(image: Option<(u32, u32)>, container: ContainerSize) -> RenderSize {
    let Some((image_width, image_height)) = image.filter(|(w, h)| *w > 0 && *h > 0) else {
        return container.as_render_size();
    };
    if container.is_empty() {
        return container.as_render_size();
    }

    let image_ratio = image_width as f32 / image_height as f32;
    let container_ratio = container.width as f32 / container.height as f32;

    if image_ratio >= container_ratio {
        let height = container.height as f32;
        RenderSize::new(height * image_ratio, height)
    } else {
        let width = container.width as f32;
        RenderSize::new(width, width / image_ratio)
    }
}

/// Portion of the drawing buffer visible through a centred container, in UV
/// units: `scale` is the visible fraction per axis, `offset` its start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRegion {
    pub scale: [f32; 2],
    pub offset: [f32; 2],
}

impl VisibleRegion {
    pub const FULL: Self = Self {
        scale: [1.0, 1.0],
        offset: [0.0, 0.0],
    };
}

pub fn visible_region(render: RenderSize, container: ContainerSize) -> VisibleRegion {
    if render.width <= 0.0 || render.height <= 0.0 || container.is_empty() {
        return VisibleRegion::FULL;
    }
    let scale_x = container.width as f32 / render.width;
    let scale_y = container.height as f32 / render.height;
    VisibleRegion {
        scale: [scale_x, scale_y],
        offset: [(1.0 - scale_x) * 0.5, (1.0 - scale_y) * 0.5],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn no_image_uses_container_bounds() {
        let container = ContainerSize::new(800, 600);
        assert_eq!(compute_size(None, container), RenderSize::new(800.0, 600.0));
        assert_eq!(
            compute_size(Some((0, 10)), container),
            RenderSize::new(800.0, 600.0)
        );
    }

    #[test]
    fn wide_image_matches_container_height() {
        let size = compute_size(Some((2000, 1000)), ContainerSize::new(800, 600));
        assert!(approx(size.height, 600.0));
        assert!(approx(size.width, 1200.0));
    }

    #[test]
    fn tall_image_matches_container_width() {
        let size = compute_size(Some((1000, 2000)), ContainerSize::new(800, 600));
        assert!(approx(size.width, 800.0));
        assert!(approx(size.height, 1600.0));
    }

    #[test]
    fn equal_ratios_fill_exactly() {
        let size = compute_size(Some((1600, 1200)), ContainerSize::new(800, 600));
        assert_eq!(size, RenderSize::new(800.0, 600.0));
    }

    #[test]
    fn cover_fit_preserves_aspect_and_covers() {
        let containers = [(800, 600), (600, 800), (1920, 1080), (333, 777)];
        let images = [(640, 480), (480, 640), (4000, 1000), (1, 1), (1234, 567)];
        for (cw, ch) in containers {
            for (iw, ih) in images {
                let size = compute_size(Some((iw, ih)), ContainerSize::new(cw, ch));
                let ratio = iw as f32 / ih as f32;
                assert!((size.width / size.height - ratio).abs() < 1e-3 * ratio.max(1.0));
                assert!(size.width + 1e-3 >= cw as f32);
                assert!(size.height + 1e-3 >= ch as f32);
                assert!(approx(size.width, cw as f32) || approx(size.height, ch as f32));
            }
        }
    }

    #[test]
    fn visible_region_is_centred() {
        let region = visible_region(RenderSize::new(1200.0, 600.0), ContainerSize::new(800, 600));
        assert!(approx(region.scale[0], 800.0 / 1200.0));
        assert!(approx(region.scale[1], 1.0));
        assert!(approx(region.offset[0], (1.0 - 800.0 / 1200.0) / 2.0));
        assert!(approx(region.offset[1], 0.0));
    }

    #[test]
    fn degenerate_sizes_show_everything() {
        assert_eq!(
            visible_region(RenderSize::new(0.0, 0.0), ContainerSize::new(800, 600)),
            VisibleRegion::FULL
        );
    }
}
