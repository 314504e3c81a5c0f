//! Reads one card image end to end.
//!
//! Classifies the nature arrows, OCRs every field, resolves the name and
//! renders the result. Progress is reported as 0, then per field, then 100.

use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::Path;

use crate::card::{FIELD_TABLE, NATURE_MARKER_RECT};
use crate::config::ReaderConfig;
use crate::log;
use crate::ocr::preprocess::crop_region;
use crate::ocr::{extract_fields, ExtractOptions, OcrEngine};
use crate::pokemon::{assemble, classify_nature, to_pokesol_text, NameResolver, PokemonRecord};
use crate::preview::{render_field_overlay, save_overlay};

/// Decodes a card image from disk.
pub fn load_card(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to decode image {}", path.display()))?;
    Ok(img.to_rgba8())
}

/// Reads a card into a record. Reports 100 once the record is assembled.
pub fn read_card_record<E: OcrEngine + ?Sized>(
    img: &RgbaImage,
    engine: &mut E,
    names: &NameResolver,
    config: &ReaderConfig,
    progress: &mut dyn FnMut(u8),
) -> Result<PokemonRecord> {
    progress(0);
    log(&format!("Reading card ({}x{})", img.width(), img.height()));

    let marker = crop_region(img, &NATURE_MARKER_RECT);
    let nature = classify_nature(&marker, config.marker_threshold).nature();

    let debug_dir = config.debug_dir.as_deref().filter(|dir| prepare_debug_dir(img, dir));

    let options = ExtractOptions {
        threshold: config.ocr_threshold,
        padding: config.border_padding,
        page_seg_mode: config.page_seg_mode,
        debug_dir,
    };
    let raw = extract_fields(img, &FIELD_TABLE, engine, &options, progress)?;

    let record = assemble(&raw, nature, names);
    log(&format!("Card read: {} ({}, {} fields)", record.name, nature, raw.len()));
    progress(100);

    Ok(record)
}

/// Reads a card and renders it in Pokesol text format.
pub fn read_card_to_text<E: OcrEngine + ?Sized>(
    img: &RgbaImage,
    engine: &mut E,
    names: &NameResolver,
    config: &ReaderConfig,
    progress: &mut dyn FnMut(u8),
) -> Result<String> {
    let record = read_card_record(img, engine, names, config, progress)?;
    Ok(to_pokesol_text(&record, names))
}

/// Like [`read_card_to_text`], decoding the image from `path` first.
/// A decode failure is returned before any progress is reported.
pub fn read_card_file<E: OcrEngine + ?Sized>(
    path: &Path,
    engine: &mut E,
    names: &NameResolver,
    config: &ReaderConfig,
    progress: &mut dyn FnMut(u8),
) -> Result<String> {
    let img = load_card(path)?;
    read_card_to_text(&img, engine, names, config, progress)
}

/// Writes the field overlay into `dir`. Returns false if the directory is
/// unusable, in which case field crops are skipped too.
fn prepare_debug_dir(img: &RgbaImage, dir: &Path) -> bool {
    let overlay = render_field_overlay(img, &FIELD_TABLE, &NATURE_MARKER_RECT);
    match save_overlay(dir, &overlay) {
        Ok(path) => {
            log(&format!("Debug overlay saved: {}", path.display()));
            true
        }
        Err(e) => {
            log(&format!("Debug output disabled: {:#}", e));
            false
        }
    }
}
