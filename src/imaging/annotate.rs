//! Detection box rendering.

use crate::constants::annotate::{BOX_THICKNESS, LABEL_PADDING, LABEL_SCALE, LABEL_TEXT_COLOR};
use crate::inference::{BoundingBox, Detection};
use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::sync::LazyLock;

static LABEL_FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

static LABEL_FONT: LazyLock<Option<FontRef<'static>>> = LazyLock::new(|| {
    FontRef::try_from_slice(LABEL_FONT_DATA)
        .map_err(|e| tracing::warn!("Label font unavailable, labels drawn without text: {e}"))
        .ok()
});

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Draw a rectangle outline `thickness` pixels wide, growing inwards.
fn draw_box(image: &mut RgbImage, bbox: BoundingBox, thickness: u32, color: Rgb<u8>) {
    let t = thickness.min(bbox.width / 2).min(bbox.height / 2).max(1);
    for inset in 0..t {
        let width = bbox.width.saturating_sub(2 * inset).max(1);
        let height = bbox.height.saturating_sub(2 * inset).max(1);
        let rect = Rect::at(to_i32(bbox.x + inset), to_i32(bbox.y + inset)).of_size(width, height);
        draw_hollow_rect_mut(image, rect, color);
    }
}

/// Tab rectangle for a label of `text_width` x `text_height` pixels.
///
/// Placed above the box, or inside its top edge when there is no room.
fn label_tab(bbox: BoundingBox, text_width: u32, text_height: u32) -> Rect {
    let width = text_width + 2 * LABEL_PADDING;
    let height = text_height + 2 * LABEL_PADDING;
    let top = if bbox.y >= height { bbox.y - height } else { bbox.y };
    Rect::at(to_i32(bbox.x), to_i32(top)).of_size(width, height)
}

/// Text shown for a detection, e.g. `Red Fox: 0.87`.
pub fn detection_label(detection: &Detection) -> String {
    format!(
        "{}: {:.2}",
        crate::catalog::display_name(&detection.species),
        detection.confidence
    )
}

/// Draw the filled label tab and its text for one box.
fn draw_label(image: &mut RgbImage, bbox: BoundingBox, label: &str, color: Rgb<u8>) {
    let scale = PxScale::from(LABEL_SCALE);
    let Some(font) = LABEL_FONT.as_ref() else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let height = LABEL_SCALE as u32;
        draw_filled_rect_mut(image, label_tab(bbox, height, height), color);
        return;
    };

    let (text_width, text_height) = text_size(scale, font, label);
    let tab = label_tab(bbox, text_width.max(1), text_height.max(1));
    draw_filled_rect_mut(image, tab, color);
    draw_text_mut(
        image,
        Rgb(LABEL_TEXT_COLOR),
        tab.left() + to_i32(LABEL_PADDING),
        tab.top() + to_i32(LABEL_PADDING),
        scale,
        font,
        label,
    );
}

/// Draw boxes and labels for every localized detection onto a copy of `image`.
///
/// Detections without a box (and the no-detection marker) are skipped.
pub fn annotate(image: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut out = image.clone();

    for detection in detections {
        let Some(bbox) = detection.bounding_box else {
            continue;
        };
        if bbox.x >= out.width() || bbox.y >= out.height() || bbox.width == 0 || bbox.height == 0 {
            tracing::debug!("Box for {} lies outside the image", detection.species);
            continue;
        }

        let color = Rgb(detection.tier().color());
        draw_box(&mut out, bbox, BOX_THICKNESS, color);
        draw_label(&mut out, bbox, &detection_label(detection), color);
    }

    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn boxed(confidence: f32, bbox: BoundingBox) -> Detection {
        Detection::from_label("red fox", confidence, Some(bbox))
    }

    /// Pixels inside the rectangle that are (near) the label text color.
    fn white_pixels(image: &RgbImage, x0: u32, y0: u32, x1: u32, y1: u32) -> usize {
        (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| (x, y)))
            .filter(|&(x, y)| image.get_pixel(x, y).0.iter().all(|&c| c >= 240))
            .count()
    }

    #[test]
    fn test_box_drawn_in_tier_color() {
        let img = RgbImage::new(200, 200);
        let bbox = BoundingBox {
            x: 50,
            y: 60,
            width: 40,
            height: 30,
        };
        let out = annotate(&img, &[boxed(0.9, bbox)]);

        assert_eq!(out.get_pixel(50, 70), &Rgb([0, 200, 0]));
        assert_eq!(out.get_pixel(52, 70), &Rgb([0, 200, 0]));
        assert_eq!(out.get_pixel(89, 70), &Rgb([0, 200, 0]));
        // interior untouched
        assert_eq!(out.get_pixel(70, 75), &Rgb([0, 0, 0]));
        // label tab above the box, left padding in box color
        assert_eq!(out.get_pixel(51, 58), &Rgb([0, 200, 0]));
    }

    #[test]
    fn test_label_text_is_rendered() {
        let img = RgbImage::new(240, 200);
        let bbox = BoundingBox {
            x: 50,
            y: 80,
            width: 60,
            height: 40,
        };
        let out = annotate(&img, &[boxed(0.9, bbox)]);

        let font = LABEL_FONT.as_ref().unwrap();
        let (w, h) = text_size(PxScale::from(LABEL_SCALE), font, "Red Fox: 0.90");
        assert!(w > 0 && h > 0);
        let top = 80 - (h + 2 * LABEL_PADDING);
        assert!(white_pixels(&out, 50, top, 50 + w + 2 * LABEL_PADDING, 80) > 10);
        // no text outside the tab
        assert_eq!(white_pixels(&out, 0, 80, 240, 200), 0);
    }

    #[test]
    fn test_low_confidence_is_red() {
        let img = RgbImage::new(100, 100);
        let bbox = BoundingBox {
            x: 10,
            y: 30,
            width: 20,
            height: 20,
        };
        let out = annotate(&img, &[boxed(0.55, bbox)]);
        assert_eq!(out.get_pixel(10, 30), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_box_clipped_to_image() {
        let img = RgbImage::new(50, 50);
        let bbox = BoundingBox {
            x: 40,
            y: 5,
            width: 100,
            height: 100,
        };
        let out = annotate(&img, &[boxed(0.7, bbox)]);
        assert_eq!(out.dimensions(), (50, 50));
        assert_eq!(out.get_pixel(40, 45), &Rgb([255, 165, 0]));
    }

    #[test]
    fn test_marker_and_unboxed_are_skipped() {
        let img = RgbImage::new(30, 30);
        let unboxed = Detection::from_label("coyote", 0.9, None);
        let out = annotate(&img, &[Detection::no_detection(), unboxed]);
        assert_eq!(out, img);
    }

    #[test]
    fn test_label_text() {
        let d = Detection::from_label("red fox", 0.873, None);
        assert_eq!(detection_label(&d), "Red Fox: 0.87");
    }
}
