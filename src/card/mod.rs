//! Card geometry: where each field lives on the stat card.

pub mod layout;

pub use layout::{is_stat_field, FieldRect, PixelRect, FIELD_TABLE, NATURE_MARKER_RECT, STAT_KEYS};
