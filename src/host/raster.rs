//! Bounding-box rasterizer used by [`MemoryHost`](super::MemoryHost) renders.
//!
//! Each visible object is drawn as the screen rectangle covering its projected world
//! bounds, far to near. Holdout objects punch transparent holes.

use crate::foundation::core::{Aabb, Mat4, Vec3};
use crate::host::{CameraSettings, Compositing};

/// Pinhole projection for a camera looking down its local `-Z` axis.
#[derive(Clone, Copy, Debug)]
pub struct Projector {
    view: Mat4,
    scale_x: f32,
    scale_y: f32,
    clip_start: f32,
    width: u32,
    height: u32,
}

impl Projector {
    pub fn new(camera_world: Mat4, cam: &CameraSettings, width: u32, height: u32) -> Self {
        let focal = 2.0 * cam.lens / cam.sensor_width.max(f32::EPSILON);
        let aspect = width as f32 / height.max(1) as f32;
        // Sensor width fits the longer image side.
        let (scale_x, scale_y) = if aspect >= 1.0 {
            (focal, focal * aspect)
        } else {
            (focal / aspect, focal)
        };
        Self {
            view: camera_world.inverse(),
            scale_x,
            scale_y,
            clip_start: cam.clip_start,
            width,
            height,
        }
    }

    /// Pixel coordinates and view depth, `None` behind the near clip plane.
    pub fn project(&self, p: Vec3) -> Option<(f32, f32, f32)> {
        let v = self.view.transform_point3(p);
        let depth = -v.z;
        if depth < self.clip_start {
            return None;
        }
        let nx = v.x / depth * self.scale_x;
        let ny = v.y / depth * self.scale_y;
        let px = (nx + 1.0) * 0.5 * self.width as f32;
        let py = (1.0 - ny) * 0.5 * self.height as f32;
        Some((px, py, depth))
    }

    /// Screen rectangle covering the box, clamped to the image.
    pub fn rect(&self, bounds: Aabb) -> Option<PixelRect> {
        let mut points = Vec::with_capacity(8);
        for c in bounds.corners() {
            points.push(self.project(c)?);
        }
        let x0 = points.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
        let x1 = points.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
        let y0 = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let y1 = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
        let depth = points.iter().map(|p| p.2).sum::<f32>() / points.len() as f32;

        let clamp_x = |v: f32| v.clamp(0.0, self.width as f32) as u32;
        let clamp_y = |v: f32| v.clamp(0.0, self.height as f32) as u32;
        let rect = PixelRect {
            x0: clamp_x(x0.floor()),
            y0: clamp_y(y0.floor()),
            x1: clamp_x(x1.ceil()),
            y1: clamp_y(y1.ceil()),
            depth,
        };
        (rect.x0 < rect.x1 && rect.y0 < rect.y1).then_some(rect)
    }
}

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
    pub depth: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fill {
    Color([u8; 4]),
    Holdout,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shape {
    pub rect: PixelRect,
    pub fill: Fill,
}

pub fn rgb_to_rgba8(rgb: [f32; 3]) -> [u8; 4] {
    let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [c(rgb[0]), c(rgb[1]), c(rgb[2]), 255]
}

pub fn rasterize(
    width: u32,
    height: u32,
    mut shapes: Vec<Shape>,
    compositing: Compositing,
) -> image::RgbaImage {
    let mut img = image::RgbaImage::new(width, height);
    shapes.sort_by(|a, b| b.rect.depth.total_cmp(&a.rect.depth));
    for shape in &shapes {
        let px = match shape.fill {
            Fill::Color(c) => image::Rgba(c),
            Fill::Holdout => image::Rgba([0, 0, 0, 0]),
        };
        for y in shape.rect.y0..shape.rect.y1.min(height) {
            for x in shape.rect.x0..shape.rect.x1.min(width) {
                img.put_pixel(x, y, px);
            }
        }
    }

    if compositing == Compositing::MonochromeMask {
        for p in img.pixels_mut() {
            *p = if p[3] > 0 {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            };
        }
    }
    img
}

#[cfg(test)]
#[path = "../../tests/unit/host/raster.rs"]
mod tests;
