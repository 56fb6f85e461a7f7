//! Debug overlay drawn onto published frames.

use tape_vision_core::{BgrFrame, BoundingBox};
use tape_vision_pipeline::DetectionResult;

pub const BLUE: [u8; 3] = [255, 0, 0];
pub const RED: [u8; 3] = [0, 0, 255];
pub const WHITE: [u8; 3] = [255, 255, 255];

/// Draws human-facing markup. Nothing the pipeline reads depends on it.
pub trait Annotator {
    fn annotate(&self, frame: &mut BgrFrame, result: &DetectionResult);
}

/// Target boxes, enclosing box, center crosshair and frame midlines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrosshairAnnotator {
    pub target_color: [u8; 3],
    pub enclosing_color: [u8; 3],
    pub midline_color: [u8; 3],
    pub thickness: i32,
    /// Half length of each crosshair arm, in pixels.
    pub crosshair_half: i32,
    /// Distance kept between the midlines and the frame border.
    pub midline_inset: i32,
}

impl Default for CrosshairAnnotator {
    fn default() -> Self {
        Self {
            target_color: BLUE,
            enclosing_color: RED,
            midline_color: WHITE,
            thickness: 3,
            crosshair_half: 5,
            midline_inset: 50,
        }
    }
}

impl Annotator for CrosshairAnnotator {
    fn annotate(&self, frame: &mut BgrFrame, result: &DetectionResult) {
        if let Some(pair) = result.geometry.filter(|_| result.see_target) {
            draw_rect(frame, &pair.target1, self.target_color, self.thickness);
            draw_rect(frame, &pair.target2, self.target_color, self.thickness);
            draw_rect(frame, &pair.enclosing, self.enclosing_color, self.thickness);

            let cx = result.center[0].round() as i32;
            let cy = result.center[1].round() as i32;
            let arm = self.crosshair_half;
            draw_vline(frame, cx, cy - arm, cy + arm, self.enclosing_color, self.thickness);
            draw_hline(frame, cy, cx - arm, cx + arm, self.enclosing_color, self.thickness);
        }

        let (w, h) = (frame.width as i32, frame.height as i32);
        let inset = self.midline_inset;
        draw_vline(frame, w / 2, inset, h - inset, self.midline_color, 1);
        draw_hline(frame, h / 2, inset, w - inset, self.midline_color, 1);
    }
}

/// Rectangle outline from `(x, y)` to `(right, bottom)`, stroke centered on the edges.
pub fn draw_rect(frame: &mut BgrFrame, bb: &BoundingBox, color: [u8; 3], thickness: i32) {
    let (x0, y0, x1, y1) = (bb.x, bb.y, bb.right(), bb.bottom());
    draw_hline(frame, y0, x0, x1, color, thickness);
    draw_hline(frame, y1, x0, x1, color, thickness);
    draw_vline(frame, x0, y0, y1, color, thickness);
    draw_vline(frame, x1, y0, y1, color, thickness);
}

/// Horizontal segment `x0..=x1` at row `y`. Out-of-frame pixels are skipped.
pub fn draw_hline(frame: &mut BgrFrame, y: i32, x0: i32, x1: i32, color: [u8; 3], thickness: i32) {
    let (lo, hi) = stroke(thickness);
    for yy in y - lo..=y + hi {
        for xx in x0 - lo..=x1 + hi {
            frame.put_pixel(xx, yy, color);
        }
    }
}

/// Vertical segment `y0..=y1` at column `x`. Out-of-frame pixels are skipped.
pub fn draw_vline(frame: &mut BgrFrame, x: i32, y0: i32, y1: i32, color: [u8; 3], thickness: i32) {
    let (lo, hi) = stroke(thickness);
    for xx in x - lo..=x + hi {
        for yy in y0 - lo..=y1 + hi {
            frame.put_pixel(xx, yy, color);
        }
    }
}

#[inline]
fn stroke(thickness: i32) -> (i32, i32) {
    let t = thickness.max(1);
    ((t - 1) / 2, t / 2)
}
