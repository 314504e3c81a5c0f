use anyhow::Result;
use image::RgbaImage;
use std::collections::HashMap;
use std::path::Path;

use super::engine::{OcrEngine, PageSegMode, RecognizeOptions};
use super::normalize::normalize;
use super::preprocess::prepare_field;
use crate::card::{is_stat_field, FieldRect};
use crate::log;

/// Share of the progress bar covered by field OCR. The rest is reported by
/// the pipeline once the record is assembled.
pub const OCR_PROGRESS_SPAN: f32 = 95.0;

/// Preprocessing and recognition settings for one extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractOptions<'a> {
    /// Luminance cutoff used to binarize each crop
    pub threshold: u8,
    /// Border added around each crop, in pixels
    pub padding: u32,
    pub page_seg_mode: PageSegMode,
    /// When set, every preprocessed crop is saved here as `<field>.png`
    pub debug_dir: Option<&'a Path>,
}

/// Normalized OCR text per field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields {
    fields: HashMap<String, String>,
}

impl RawFields {
    pub fn insert(&mut self, field: &str, text: String) {
        self.fields.insert(field.to_string(), text);
    }

    /// Text recognized for `field`, or an empty string if it was never read.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for RawFields {
    fn from(entries: [(&str, &str); N]) -> Self {
        let mut raw = RawFields::default();
        for (field, text) in entries {
            raw.insert(field, text.to_string());
        }
        raw
    }
}

/// Reads every field of the card, one OCR call at a time, in table order.
///
/// Each crop is padded, binarized and recognized; stat fields are restricted
/// to digits. `progress` receives the cumulative percentage after each field,
/// reaching at most [`OCR_PROGRESS_SPAN`].
pub fn extract_fields<E: OcrEngine + ?Sized>(
    img: &RgbaImage,
    table: &[(&str, FieldRect)],
    engine: &mut E,
    options: &ExtractOptions,
    progress: &mut dyn FnMut(u8),
) -> Result<RawFields> {
    let mut result = RawFields::default();
    let delta = OCR_PROGRESS_SPAN / table.len().max(1) as f32;
    let mut done = 0.0f32;

    for (name, region) in table {
        let prepared = prepare_field(img, region, options.padding, options.threshold);

        if let Some(dir) = options.debug_dir {
            let path = dir.join(format!("{}.png", name));
            if let Err(e) = prepared.save(&path) {
                log(&format!("Failed to save debug crop {}: {}", path.display(), e));
            }
        }

        let recognize_options = if is_stat_field(name) {
            RecognizeOptions::digits(options.page_seg_mode)
        } else {
            RecognizeOptions::text(options.page_seg_mode)
        };

        let text = engine.recognize(&prepared, &recognize_options)?;
        let normalized = normalize(&text);
        log(&format!("OCR {}: {:?} -> {:?}", name, text.trim(), normalized));
        result.insert(name, normalized);

        done += delta;
        progress(done.floor().min(OCR_PROGRESS_SPAN) as u8);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::FIELD_TABLE;
    use image::{GrayImage, ImageBuffer, Rgba};

    /// Engine that answers every call with the same text and records options.
    struct EchoEngine {
        reply: String,
        calls: Vec<(u32, u32, RecognizeOptions)>,
    }

    impl OcrEngine for EchoEngine {
        fn recognize(&mut self, img: &GrayImage, options: &RecognizeOptions) -> Result<String> {
            self.calls.push((img.width(), img.height(), *options));
            Ok(self.reply.clone())
        }
    }

    fn options() -> ExtractOptions<'static> {
        ExtractOptions {
            threshold: 140,
            padding: 10,
            page_seg_mode: PageSegMode::SingleWord,
            debug_dir: None,
        }
    }

    #[test]
    fn test_extract_fields_reads_every_field_in_order() {
        let img: RgbaImage = ImageBuffer::from_pixel(670, 574, Rgba([30, 30, 30, 255]));
        let mut engine = EchoEngine {
            reply: "つら ら ば ぱり\n".to_string(),
            calls: Vec::new(),
        };

        let raw = extract_fields(&img, &FIELD_TABLE, &mut engine, &options(), &mut |_: u8| {}).unwrap();

        assert_eq!(raw.len(), FIELD_TABLE.len());
        assert_eq!(engine.calls.len(), FIELD_TABLE.len());
        // Text is normalized before it is stored
        assert_eq!(raw.get("move_1"), "つららばり");

        for ((name, _), (_, _, opts)) in FIELD_TABLE.iter().zip(&engine.calls) {
            assert_eq!(opts.digits_only, is_stat_field(name), "field {}", name);
        }
    }

    #[test]
    fn test_extract_fields_pads_crops() {
        let img: RgbaImage = ImageBuffer::from_pixel(1000, 1000, Rgba([30, 30, 30, 255]));
        let table = [("ability", FieldRect::new(0.1, 0.2, 0.3, 0.05))];
        let mut engine = EchoEngine {
            reply: String::new(),
            calls: Vec::new(),
        };

        extract_fields(&img, &table, &mut engine, &options(), &mut |_: u8| {}).unwrap();

        assert_eq!(engine.calls[0].0, 300 + 20);
        assert_eq!(engine.calls[0].1, 50 + 20);
    }

    #[test]
    fn test_extract_fields_progress_is_monotonic() {
        let img: RgbaImage = ImageBuffer::from_pixel(670, 574, Rgba([30, 30, 30, 255]));
        let mut engine = EchoEngine {
            reply: "1".to_string(),
            calls: Vec::new(),
        };
        let mut reported = Vec::new();

        extract_fields(&img, &FIELD_TABLE, &mut engine, &options(), &mut |p: u8| reported.push(p))
            .unwrap();

        assert_eq!(reported.len(), FIELD_TABLE.len());
        assert!(reported.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*reported.last().unwrap(), 95);
    }

    #[test]
    fn test_raw_fields_missing_is_empty() {
        let raw = RawFields::from([("ability", "てんのめぐみ")]);
        assert_eq!(raw.get("ability"), "てんのめぐみ");
        assert_eq!(raw.get("move_4"), "");
    }
}
