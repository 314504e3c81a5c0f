//! Diagnostic overlays for checking the card layout.
//!
//! Draws every field rectangle onto a copy of the card so misaligned regions
//! are obvious at a glance.

use anyhow::{Context, Result};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use crate::card::{FieldRect, PixelRect};

/// Color constants for preview rendering.
pub const COLOR_TEXT_FIELD: Rgba<u8> = Rgba([0, 255, 0, 255]); // Green
pub const COLOR_STAT_FIELD: Rgba<u8> = Rgba([0, 160, 255, 255]); // Blue
pub const COLOR_NATURE_MARKER: Rgba<u8> = Rgba([255, 255, 0, 255]); // Yellow

/// Renders the text fields and the nature marker column onto the card.
pub fn render_field_overlay(
    card: &RgbaImage,
    table: &[(&str, FieldRect)],
    nature_marker: &FieldRect,
) -> RgbaImage {
    let mut img = card.clone();
    let (width, height) = img.dimensions();

    for (name, region) in table {
        let color = if crate::card::is_stat_field(name) {
            COLOR_STAT_FIELD
        } else {
            COLOR_TEXT_FIELD
        };
        draw_rect(&mut img, &region.to_pixels(width, height), color, 2);
    }

    draw_rect(
        &mut img,
        &nature_marker.to_pixels(width, height),
        COLOR_NATURE_MARKER,
        2,
    );

    img
}

/// Saves the overlay as `overlay.png` in `dir`, creating the directory.
pub fn save_overlay(dir: &Path, overlay: &RgbaImage) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create debug dir {}", dir.display()))?;
    let path = dir.join("overlay.png");
    overlay
        .save(&path)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(path)
}

/// Draws a rectangle border on an image.
pub fn draw_rect(
    img: &mut ImageBuffer<Rgba<u8>, Vec<u8>>,
    rect: &PixelRect,
    color: Rgba<u8>,
    thickness: u32,
) {
    let (img_w, img_h) = img.dimensions();
    let PixelRect { x, y, width: w, height: h } = *rect;

    let mut plot = |px: u32, py: u32| {
        if px < img_w && py < img_h {
            img.put_pixel(px, py, color);
        }
    };

    for d in 0..thickness {
        for dx in 0..w {
            // Top and bottom edges
            plot(x + dx, y + d);
            plot(x + dx, (y + h).saturating_sub(1 + d));
        }
        for dy in 0..h {
            // Left and right edges
            plot(x + d, y + dy);
            plot((x + w).saturating_sub(1 + d), y + dy);
        }
    }
}
