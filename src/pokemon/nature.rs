//! Nature detection from the colored stat arrows.
//!
//! The card marks the boosted stat with a red/orange arrow and the lowered
//! stat with a blue arrow, next to the A..S rows. Binarizing the marker column
//! per channel snaps those colors onto pure red/yellow and blue/cyan, and the
//! first row containing each color tells which stat it sits on.

use image::RgbaImage;
use serde::Serialize;

use crate::ocr::preprocess::threshold_channels;

/// Stats a nature can raise or lower, top to bottom on the card (H is never affected).
pub const NATURE_AXES: [&str; 5] = ["A", "B", "C", "D", "S"];

/// Nature used when the arrows are missing or inconsistent.
pub const NEUTRAL_NATURE: &str = "まじめ";

/// (boosted axis, lowered axis, nature), axes indexed into [`NATURE_AXES`].
const NATURE_TABLE: [(usize, usize, &str); 20] = [
    (0, 1, "ずぶとい"),
    (0, 2, "ひかえめ"),
    (0, 3, "おだやか"),
    (0, 4, "おくびょう"),
    (1, 0, "さみしがり"),
    (1, 2, "おっとり"),
    (1, 3, "おとなしい"),
    (1, 4, "せっかち"),
    (2, 0, "いじっぱり"),
    (2, 1, "わんぱく"),
    (2, 3, "しんちょう"),
    (2, 4, "ようき"),
    (3, 0, "やんちゃ"),
    (3, 1, "のうてんき"),
    (3, 2, "うっかりや"),
    (3, 4, "むじゃき"),
    (4, 0, "ゆうかん"),
    (4, 1, "のんき"),
    (4, 2, "れいせい"),
    (4, 3, "なまいき"),
];

/// Which stat rows carry the boosted and lowered arrows.
///
/// `None` means the arrow color was not found in the marker region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NatureBuffPair {
    pub up: Option<usize>,
    pub down: Option<usize>,
}

impl NatureBuffPair {
    pub fn new(up: Option<usize>, down: Option<usize>) -> Self {
        Self { up, down }
    }

    /// Looks the pair up in the nature table, falling back to [`NEUTRAL_NATURE`].
    pub fn nature(&self) -> &'static str {
        buffs_to_nature(*self)
    }
}

/// Maps a boosted/lowered pair to its nature name.
///
/// Missing axes, identical axes and out-of-range indices give [`NEUTRAL_NATURE`].
pub fn buffs_to_nature(pair: NatureBuffPair) -> &'static str {
    let (Some(up), Some(down)) = (pair.up, pair.down) else {
        return NEUTRAL_NATURE;
    };

    NATURE_TABLE
        .iter()
        .find(|(u, d, _)| *u == up && *d == down)
        .map(|(_, _, nature)| *nature)
        .unwrap_or(NEUTRAL_NATURE)
}

/// Red through yellow after channel binarization: full red, no blue.
fn is_boost_color(pixel: &image::Rgba<u8>) -> bool {
    pixel[0] == 255 && pixel[2] == 0
}

/// Blue through cyan after channel binarization: full blue, no red.
fn is_drop_color(pixel: &image::Rgba<u8>) -> bool {
    pixel[2] == 255 && pixel[0] == 0
}

/// Bucket (0..5) of the first row holding a pixel accepted by `matches`.
fn first_matching_bucket(img: &RgbaImage, matches: fn(&image::Rgba<u8>) -> bool) -> Option<usize> {
    let (width, height) = img.dimensions();
    if height == 0 {
        return None;
    }

    let row = (0..height).find(|&y| (0..width).any(|x| matches(img.get_pixel(x, y))))?;
    let bucket = row as usize * NATURE_AXES.len() / height as usize;
    Some(bucket.min(NATURE_AXES.len() - 1))
}

/// Classifies the arrows in a cropped marker region.
pub fn classify_nature(marker: &RgbaImage, threshold: u8) -> NatureBuffPair {
    let binary = threshold_channels(marker, threshold);

    let pair = NatureBuffPair::new(
        first_matching_bucket(&binary, is_boost_color),
        first_matching_bucket(&binary, is_drop_color),
    );

    crate::log(&format!(
        "Nature markers: up={:?} down={:?} -> {}",
        pair.up.map(|i| NATURE_AXES[i]),
        pair.down.map(|i| NATURE_AXES[i]),
        pair.nature()
    ));

    pair
}
