use image::{GrayImage, ImageBuffer, Luma, Rgba, RgbaImage};

use crate::card::FieldRect;

/// Border color used when padding crops. Black, matching the card background.
pub const BORDER_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Crops a sub-region from an image using relative coordinates.
///
/// Converts the relative rect (0.0–1.0) to absolute pixel coordinates
/// and returns the cropped sub-image.
pub fn crop_region(img: &RgbaImage, region: &FieldRect) -> RgbaImage {
    let (w, h) = img.dimensions();
    let px = region.to_pixels(w, h);

    image::imageops::crop_imm(img, px.x, px.y, px.width, px.height).to_image()
}

/// Surrounds the image with a uniform border of `padding` pixels on every side.
///
/// Tesseract misses glyphs that touch the image edge, so every crop gets one.
pub fn pad_border(img: &RgbaImage, padding: u32, color: Rgba<u8>) -> RgbaImage {
    let (w, h) = img.dimensions();
    let mut output = ImageBuffer::from_pixel(w + padding * 2, h + padding * 2, color);
    image::imageops::replace(&mut output, img, padding as i64, padding as i64);
    output
}

/// BT.601 luma of a pixel, 0.0 (black) to 255.0 (white).
fn luminance(pixel: &Rgba<u8>) -> f32 {
    0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32
}

/// Converts image to binary on luminance.
///
/// Pixels brighter than `threshold` become white (255), everything else black (0).
pub fn threshold_luma(img: &RgbaImage, threshold: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = ImageBuffer::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let value = if luminance(pixel) > threshold as f32 {
            255u8
        } else {
            0u8
        };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}

/// Binarizes each color channel separately.
///
/// Every R, G and B value above `threshold` becomes 255 and every other one 0,
/// which snaps colors onto the eight corners of the RGB cube. Alpha is kept.
pub fn threshold_channels(img: &RgbaImage, threshold: u8) -> RgbaImage {
    let snap = |v: u8| if v > threshold { 255u8 } else { 0u8 };
    let mut output = img.clone();

    for pixel in output.pixels_mut() {
        pixel[0] = snap(pixel[0]);
        pixel[1] = snap(pixel[1]);
        pixel[2] = snap(pixel[2]);
    }

    output
}

/// Full per-field preparation: crop, pad, binarize.
pub fn prepare_field(img: &RgbaImage, region: &FieldRect, padding: u32, threshold: u8) -> GrayImage {
    let cropped = crop_region(img, region);
    let padded = pad_border(&cropped, padding, BORDER_COLOR);
    threshold_luma(&padded, threshold)
}
