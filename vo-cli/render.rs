use image::{GrayImage, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use vo_core::{Feature, FeatureKind, ObstacleCue};
use vo_slam::Snapshot;

use crate::{CliError, CliResult};

fn feature_color(kind: FeatureKind) -> Rgba<u8> {
    match kind {
        FeatureKind::Obstacle(ObstacleCue::Depth) => Rgba([100, 200, 255, 255]),
        FeatureKind::Obstacle(_) => Rgba([255, 0, 0, 255]),
        FeatureKind::Corner => Rgba([255, 200, 200, 255]),
    }
}

/// Ring each feature, colored by how it was classified
pub fn draw_features(canvas: &mut RgbaImage, features: &[Feature]) {
    for f in features {
        let center = (f.x as i32, f.y as i32);
        let color = feature_color(f.kind);
        draw_hollow_circle_mut(canvas, center, 3, color);
        draw_hollow_circle_mut(canvas, center, 5, color);
    }
}

/// Luminance frame with its features drawn on top
pub fn feature_overlay(luma: &[u8], width: usize, height: usize, features: &[Feature]) -> CliResult<RgbaImage> {
    let gray = GrayImage::from_raw(width as u32, height as u32, luma.to_vec()).ok_or(CliError::BufferSize {
        width,
        height,
        actual: luma.len(),
    })?;
    let mut canvas = image::DynamicImage::ImageLuma8(gray).into_rgba8();
    draw_features(&mut canvas, features);
    Ok(canvas)
}

/// Top-down view of trajectory and landmarks, scaled to fit the canvas.
///
/// The view spans the trajectory's bounding box (at least one unit per
/// axis); landmarks outside it are clipped.
#[derive(Debug, Clone, Copy)]
pub struct MapRenderer {
    pub width: u32,
    pub height: u32,
    pub padding: f32,
    pub grid_step: u32,
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self { width: 400, height: 400, padding: 20.0, grid_step: 40 }
    }
}

struct View {
    min_x: f64,
    min_y: f64,
    range_x: f64,
    range_y: f64,
    inner_w: f64,
    inner_h: f64,
    padding: f64,
    height: f64,
}

impl View {
    /// World to canvas, with +y pointing up
    fn to_canvas(&self, x: f64, y: f64) -> (f32, f32) {
        let cx = self.padding + (x - self.min_x) / self.range_x * self.inner_w;
        let cy = self.height - self.padding - (y - self.min_y) / self.range_y * self.inner_h;
        (cx as f32, cy as f32)
    }
}

impl MapRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, ..Self::default() }
    }

    pub fn render(&self, snapshot: &Snapshot) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(self.width, self.height, Rgb([17, 17, 17]));
        self.draw_grid(&mut canvas);

        let traj = &snapshot.trajectory;
        if traj.len() < 2 {
            return canvas;
        }

        let (mut min_x, mut max_x, mut min_y, mut max_y) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for p in traj {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        let padding = self.padding as f64;
        let view = View {
            min_x,
            min_y,
            range_x: (max_x - min_x).max(1.0),
            range_y: (max_y - min_y).max(1.0),
            inner_w: self.width as f64 - 2.0 * padding,
            inner_h: self.height as f64 - 2.0 * padding,
            padding,
            height: self.height as f64,
        };

        for pair in traj.windows(2) {
            let a = view.to_canvas(pair[0].x, pair[0].y);
            let b = view.to_canvas(pair[1].x, pair[1].y);
            draw_line_segment_mut(&mut canvas, a, b, Rgb([0, 255, 0]));
        }

        for lm in &snapshot.landmarks {
            let (lx, ly) = view.to_canvas(lm.x, lm.y);
            draw_filled_rect_mut(&mut canvas, Rect::at(lx as i32 - 1, ly as i32 - 1).of_size(2, 2), Rgb([200, 200, 0]));
        }

        let start = view.to_canvas(traj[0].x, traj[0].y);
        draw_filled_circle_mut(&mut canvas, (start.0 as i32, start.1 as i32), 5, Rgb([0, 136, 255]));
        if let Some(last) = traj.last() {
            let curr = view.to_canvas(last.x, last.y);
            draw_filled_circle_mut(&mut canvas, (curr.0 as i32, curr.1 as i32), 5, Rgb([255, 0, 0]));
        }

        canvas
    }

    fn draw_grid(&self, canvas: &mut RgbImage) {
        if self.grid_step == 0 {
            return;
        }
        let color = Rgb([34, 34, 34]);
        for x in (0..self.width).step_by(self.grid_step as usize) {
            draw_line_segment_mut(canvas, (x as f32, 0.0), (x as f32, self.height as f32), color);
        }
        for y in (0..self.height).step_by(self.grid_step as usize) {
            draw_line_segment_mut(canvas, (0.0, y as f32), (self.width as f32, y as f32), color);
        }
    }
}
