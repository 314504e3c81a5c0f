//! Card worker thread.
//!
//! Receives card images from the work queue, reads each one with the single
//! OCR session it owns and sends the rendered result back. Runs until the
//! sender side of the queue is dropped.

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};

use super::queue::{CardResult, CardWorkItem};
use crate::config::ReaderConfig;
use crate::ocr::OcrEngine;
use crate::pipeline::{load_card, read_card_file, read_card_record};
use crate::pokemon::NameResolver;

/// How each card is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Six-line Pokesol text
    #[default]
    Text,
    /// The assembled record as pretty-printed JSON
    Json,
}

/// Runs the card worker loop.
///
/// A failing card is reported through its [`CardResult`] and the worker moves
/// on to the next item. This function blocks until the channel closes, so it
/// should be run in a dedicated thread.
pub fn run_card_worker<E: OcrEngine>(
    receiver: Receiver<CardWorkItem>,
    mut engine: E,
    names: &NameResolver,
    config: &ReaderConfig,
    format: OutputFormat,
    results: Sender<CardResult>,
) {
    crate::log("Card worker started");

    while let Ok(work_item) = receiver.recv() {
        crate::log(&format!(
            "Card worker: processing #{} ({})",
            work_item.index,
            work_item.image_path.display()
        ));

        let outcome = read_one(&work_item, &mut engine, names, config, format);
        if let Err(e) = &outcome {
            crate::log(&format!("Card worker: #{} failed: {:#}", work_item.index, e));
        }

        let result = CardResult {
            index: work_item.index,
            image_path: work_item.image_path,
            outcome,
        };
        if results.send(result).is_err() {
            crate::log("Card worker: result receiver dropped, exiting");
            break;
        }
    }

    crate::log("Card worker finished");
}

fn read_one<E: OcrEngine>(
    item: &CardWorkItem,
    engine: &mut E,
    names: &NameResolver,
    config: &ReaderConfig,
    format: OutputFormat,
) -> Result<String> {
    let config = match &config.debug_dir {
        Some(dir) => Cow::Owned(ReaderConfig {
            debug_dir: Some(card_debug_dir(dir, item)),
            ..config.clone()
        }),
        None => Cow::Borrowed(config),
    };

    let index = item.index;
    let mut progress = |p: u8| crate::log(&format!("Card #{}: {}%", index, p));

    match format {
        OutputFormat::Text => {
            read_card_file(&item.image_path, engine, names, &config, &mut progress)
        }
        OutputFormat::Json => {
            let img = load_card(&item.image_path)?;
            let record = read_card_record(&img, engine, names, &config, &mut progress)?;
            serde_json::to_string_pretty(&record).context("Failed to serialize record")
        }
    }
}

/// Per-card debug folder so crops from different images don't overwrite each other.
fn card_debug_dir(base: &Path, item: &CardWorkItem) -> PathBuf {
    let stem = item
        .image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "card".to_string());
    base.join(format!("{:03}_{}", item.index, stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::queue::create_work_queue;
    use crate::ocr::engine::RecognizeOptions;
    use image::{GrayImage, ImageBuffer, Rgba, RgbaImage};
    use std::sync::mpsc::channel;
    use std::thread;
    use tempfile::tempdir;

    /// Reads every field as a fixed answer: "プリン" for text, "7" for stats.
    struct FixedEngine;

    impl OcrEngine for FixedEngine {
        fn recognize(&mut self, _img: &GrayImage, options: &RecognizeOptions) -> Result<String> {
            Ok(if options.digits_only { "7" } else { "プリン" }.to_string())
        }
    }

    fn write_card(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let card: RgbaImage = ImageBuffer::from_pixel(670, 574, Rgba([30, 30, 30, 255]));
        card.save(&path).unwrap();
        path
    }

    fn spawn_worker(
        format: OutputFormat,
        config: ReaderConfig,
    ) -> (
        Sender<CardWorkItem>,
        Receiver<CardResult>,
        thread::JoinHandle<()>,
    ) {
        let (sender, receiver) = create_work_queue();
        let (result_tx, result_rx) = channel();
        let handle = thread::spawn(move || {
            let names = NameResolver::builtin().unwrap();
            run_card_worker(receiver, FixedEngine, &names, &config, format, result_tx);
        });
        (sender, result_rx, handle)
    }

    #[test]
    fn test_worker_exits_when_channel_closes() {
        let (sender, _results, handle) = spawn_worker(OutputFormat::Text, ReaderConfig::default());
        drop(sender);
        handle.join().expect("Worker thread panicked");
    }

    #[test]
    fn test_worker_continues_after_failure() {
        let dir = tempdir().unwrap();
        let good = write_card(dir.path(), "good.png");

        let (sender, results, handle) = spawn_worker(OutputFormat::Text, ReaderConfig::default());
        sender.send(CardWorkItem::new(dir.path().join("missing.png"), 0)).unwrap();
        sender.send(CardWorkItem::new(good.clone(), 1)).unwrap();
        drop(sender);

        let first = results.recv().unwrap();
        assert_eq!(first.index, 0);
        assert!(first.outcome.is_err());

        let second = results.recv().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.image_path, good);
        let text = second.outcome.unwrap();
        assert!(text.starts_with("プリン @ ふめい\n"));
        assert!(text.contains("\n7(7)-7(7)-7(7)-7(7)-7(7)-7(7)\n"));
        assert!(text.contains("性格: まじめ"));

        assert!(results.recv().is_err());
        handle.join().unwrap();
    }

    #[test]
    fn test_worker_json_output() {
        let dir = tempdir().unwrap();
        let card = write_card(dir.path(), "card.png");

        let (sender, results, handle) = spawn_worker(OutputFormat::Json, ReaderConfig::default());
        sender.send(CardWorkItem::new(card, 0)).unwrap();
        drop(sender);

        let json: serde_json::Value =
            serde_json::from_str(&results.recv().unwrap().outcome.unwrap()).unwrap();
        assert_eq!(json["name"], "プリン");
        assert_eq!(json["nature"], "まじめ");
        assert_eq!(json["effort"]["s"]["value"], 7);
        handle.join().unwrap();
    }

    #[test]
    fn test_worker_debug_dirs_per_card() {
        let dir = tempdir().unwrap();
        let first = write_card(dir.path(), "first.png");
        let second = write_card(dir.path(), "second.png");
        let debug_dir = dir.path().join("debug");

        let config = ReaderConfig {
            debug_dir: Some(debug_dir.clone()),
            ..ReaderConfig::default()
        };
        let (sender, results, handle) = spawn_worker(OutputFormat::Text, config);
        sender.send(CardWorkItem::new(first, 0)).unwrap();
        sender.send(CardWorkItem::new(second, 1)).unwrap();
        drop(sender);

        assert!(results.recv().unwrap().outcome.is_ok());
        assert!(results.recv().unwrap().outcome.is_ok());
        handle.join().unwrap();

        assert!(debug_dir.join("000_first").join("overlay.png").exists());
        assert!(debug_dir.join("001_second").join("H.png").exists());
    }
}
