//! Field layout of the PAMO3 stat card.
//!
//! Every region is stored in relative coordinates (0.0 to 1.0) so the same
//! table works for any screenshot resolution, as long as the card fills the
//! whole image.

use serde::{Deserialize, Serialize};

/// A rectangle in relative coordinates (0.0 to 1.0).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldRect {
    /// X position of top-left corner (0.0 = left edge, 1.0 = right edge)
    pub x: f32,
    /// Y position of top-left corner (0.0 = top edge, 1.0 = bottom edge)
    pub y: f32,
    /// Width as fraction of card width
    pub width: f32,
    /// Height as fraction of card height
    pub height: f32,
}

impl FieldRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Converts the relative rect to absolute pixels for an image of the given size.
    ///
    /// Rounds each coordinate independently. A rect reaching past the image is a
    /// layout authoring bug: asserted in debug builds, clamped otherwise.
    pub fn to_pixels(&self, image_width: u32, image_height: u32) -> PixelRect {
        let x = (self.x * image_width as f32).round() as u32;
        let y = (self.y * image_height as f32).round() as u32;
        let width = (self.width * image_width as f32).round() as u32;
        let height = (self.height * image_height as f32).round() as u32;

        debug_assert!(
            x + width <= image_width + 1 && y + height <= image_height + 1,
            "field rect {:?} exceeds {}x{} image",
            self,
            image_width,
            image_height
        );

        let x = x.min(image_width);
        let y = y.min(image_height);
        PixelRect {
            x,
            y,
            width: width.min(image_width - x),
            height: height.min(image_height - y),
        }
    }
}

/// A rectangle in absolute pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Stat order used everywhere on the card and in the output text.
pub const STAT_KEYS: [&str; 6] = ["H", "A", "B", "C", "D", "S"];

/// Text regions of the card, in OCR order.
///
/// `pokemon_name1` covers the single-type layout and `pokemon_name2` the
/// dual-type layout (the second type icon pushes the name to the right).
/// Both are always read.
pub const FIELD_TABLE: [(&str, FieldRect); 19] = [
    ("pokemon_name2", FieldRect::new(0.1652, 0.1429, 0.5302, 0.0714)),
    ("pokemon_name1", FieldRect::new(0.1, 0.1429, 0.5954, 0.0714)),
    ("ability", FieldRect::new(0.0336, 0.2997, 0.4431, 0.0662)),
    ("move_1", FieldRect::new(0.1019, 0.4251, 0.2809, 0.061)),
    ("B_effort", FieldRect::new(0.8813, 0.5122, 0.0653, 0.0453)),
    ("H", FieldRect::new(0.7428, 0.3188, 0.0653, 0.0488)),
    ("H_effort", FieldRect::new(0.8813, 0.3188, 0.0653, 0.0488)),
    ("A", FieldRect::new(0.7428, 0.4146, 0.0653, 0.0488)),
    ("A_effort", FieldRect::new(0.8813, 0.4146, 0.0653, 0.0488)),
    ("B", FieldRect::new(0.7428, 0.5105, 0.0653, 0.047)),
    ("move_2", FieldRect::new(0.1019, 0.5575, 0.2809, 0.0523)),
    ("C", FieldRect::new(0.7428, 0.6045, 0.0653, 0.047)),
    ("C_effort", FieldRect::new(0.8813, 0.6063, 0.0653, 0.0453)),
    ("move_3", FieldRect::new(0.1019, 0.6794, 0.2809, 0.0575)),
    ("D", FieldRect::new(0.7428, 0.6986, 0.0653, 0.0488)),
    ("D_effort", FieldRect::new(0.8813, 0.7038, 0.0653, 0.0418)),
    ("move_4", FieldRect::new(0.1029, 0.8049, 0.2809, 0.054)),
    ("S", FieldRect::new(0.7428, 0.7944, 0.0653, 0.0453)),
    ("S_effort", FieldRect::new(0.8813, 0.7944, 0.0653, 0.0453)),
];

/// Column holding the red/blue nature arrows, spanning the A..S stat rows.
///
/// Split vertically into five equal buckets, one per stat row.
pub const NATURE_MARKER_RECT: FieldRect = FieldRect::new(0.70, 0.3935, 0.035, 0.471);

/// Returns true for the numeric stat fields (`H`..`S` and their `_effort` twins).
pub fn is_stat_field(name: &str) -> bool {
    name.starts_with(['H', 'A', 'B', 'C', 'D', 'S'])
}
