//! Color segmentation in HLS space.

use image::GrayImage;
use tape_vision_core::BgrFrameView;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::ThresholdConfig;

const FOREGROUND: u8 = 255;

/// Convert one BGR pixel to 8-bit HLS, returned as `[hue, luminance, saturation]`.
///
/// Hue is stored as degrees / 2 (0..180); luminance and saturation are
/// scaled to 0..255. Values are rounded to the nearest integer.
#[inline]
pub fn bgr_to_hls(bgr: [u8; 3]) -> [u8; 3] {
    let b = bgr[0] as f32 / 255.0;
    let g = bgr[1] as f32 / 255.0;
    let r = bgr[2] as f32 / 255.0;

    let vmax = r.max(g).max(b);
    let vmin = r.min(g).min(b);
    let diff = vmax - vmin;
    let l = (vmax + vmin) * 0.5;

    let (mut h, s) = if diff > f32::EPSILON {
        let s = if l < 0.5 {
            diff / (vmax + vmin)
        } else {
            diff / (2.0 - vmax - vmin)
        };
        let h = if vmax == r {
            60.0 * (g - b) / diff
        } else if vmax == g {
            120.0 + 60.0 * (b - r) / diff
        } else {
            240.0 + 60.0 * (r - g) / diff
        };
        (h, s)
    } else {
        (0.0, 0.0)
    };
    if h < 0.0 {
        h += 360.0;
    }

    [to_u8(h * 0.5), to_u8(l * 255.0), to_u8(s * 255.0)]
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Segment a frame into a freshly allocated mask.
pub fn segment(frame: &BgrFrameView<'_>, threshold: &ThresholdConfig) -> GrayImage {
    let mut mask = GrayImage::new(frame.width as u32, frame.height as u32);
    segment_into(frame, threshold, &mut mask);
    mask
}

/// Segment a frame into `mask`, reusing its buffer when the size matches.
///
/// A pixel is set (255) iff its hue, saturation and luminance each fall
/// inside the corresponding inclusive range; every other pixel is 0.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(width = frame.width, height = frame.height))
)]
pub fn segment_into(frame: &BgrFrameView<'_>, threshold: &ThresholdConfig, mask: &mut GrayImage) {
    let (w, h) = (frame.width as u32, frame.height as u32);
    if mask.dimensions() != (w, h) {
        *mask = GrayImage::new(w, h);
    }

    let ThresholdConfig {
        hue,
        saturation,
        luminance,
    } = *threshold;

    if hue.min > hue.max || saturation.min > saturation.max || luminance.min > luminance.max {
        mask.iter_mut().for_each(|v| *v = 0);
        return;
    }

    for (dst, px) in mask.iter_mut().zip(frame.data.chunks_exact(3)) {
        let [hh, ll, ss] = bgr_to_hls([px[0], px[1], px[2]]);
        let inside = hue.contains(hh as f64)
            && luminance.contains(ll as f64)
            && saturation.contains(ss as f64);
        *dst = if inside { FOREGROUND } else { 0 };
    }
}
