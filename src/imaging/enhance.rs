//! Contrast enhancement and thumbnails.

use crate::constants::enhance::DENOISE_SIGMA;
use image::imageops;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contrast::equalize_histogram;
use imageproc::filter::gaussian_blur_f32;

/// BT.601 luma of an RGB pixel.
fn luma(p: &Rgb<u8>) -> f32 {
    0.114f32.mul_add(
        f32::from(p[2]),
        0.299f32.mul_add(f32::from(p[0]), 0.587 * f32::from(p[1])),
    )
}

/// Luma plane of an RGB image, rounded to 8 bits.
fn luma_plane(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let v = luma(image.get_pixel(x, y)).round().clamp(0.0, 255.0) as u8;
        Luma([v])
    })
}

/// Denoise lightly then equalize the luma channel, keeping chroma.
///
/// A flat image has nothing to stretch and is only denoised.
pub fn enhance_image(image: &RgbImage) -> RgbImage {
    let mut out = gaussian_blur_f32(image, DENOISE_SIGMA);

    let plane = luma_plane(&out);
    let first = plane.pixels().next().map_or(0, |p| p[0]);
    if plane.pixels().all(|p| p[0] == first) {
        return out;
    }
    let equalized = equalize_histogram(&plane);

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let delta = f32::from(equalized.get_pixel(x, y)[0]) - luma(pixel);
        for channel in &mut pixel.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let shifted = (f32::from(*channel) + delta).round().clamp(0.0, 255.0) as u8;
            *channel = shifted;
        }
    }

    out
}

/// Shrink to fit within `max_width` x `max_height`, preserving aspect ratio.
///
/// Images already inside the box are returned unchanged.
pub fn make_thumbnail(image: &RgbImage, max_width: u32, max_height: u32) -> RgbImage {
    let (w, h) = image.dimensions();
    if w <= max_width && h <= max_height {
        return image.clone();
    }

    let scale = (f64::from(max_width) / f64::from(w)).min(f64::from(max_height) / f64::from(h));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let fit = |v: u32| ((f64::from(v) * scale).round() as u32).max(1);
    imageops::thumbnail(image, fit(w), fit(h))
}
