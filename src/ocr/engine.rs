use anyhow::{anyhow, Context, Result};
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::{find_tessdata_dir, find_tesseract_executable};

/// Characters allowed when a field is numeric.
const DIGIT_WHITELIST: &str = "0123456789";

/// Tesseract page segmentation modes used by the card reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegMode {
    /// Treat the image as a single text line (`--psm 7`)
    SingleLine,
    /// Treat the image as a single word (`--psm 8`)
    #[default]
    SingleWord,
}

impl PageSegMode {
    fn as_arg(self) -> &'static str {
        match self {
            PageSegMode::SingleLine => "7",
            PageSegMode::SingleWord => "8",
        }
    }
}

/// Per-call recognition settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognizeOptions {
    pub page_seg_mode: PageSegMode,
    /// Restrict output to decimal digits
    pub digits_only: bool,
}

impl RecognizeOptions {
    /// Options for free text fields (names, ability, moves).
    pub fn text(page_seg_mode: PageSegMode) -> Self {
        Self {
            page_seg_mode,
            digits_only: false,
        }
    }

    /// Options for numeric stat fields.
    pub fn digits(page_seg_mode: PageSegMode) -> Self {
        Self {
            page_seg_mode,
            digits_only: true,
        }
    }
}

/// A text recognition session.
///
/// Sessions carry per-call configuration, so a call takes `&mut self`: one
/// recognition at a time, each fully configured before it starts.
pub trait OcrEngine {
    /// Recognizes the text in a preprocessed grayscale crop.
    ///
    /// Returns the raw text (possibly empty). Errors mean the engine itself
    /// failed, not that nothing was recognized.
    fn recognize(&mut self, img: &GrayImage, options: &RecognizeOptions) -> Result<String>;
}

/// Resolved locations of the Tesseract install.
#[derive(Debug, Clone)]
struct ResolvedTesseract {
    executable: PathBuf,
    tessdata: PathBuf,
}

/// OCR session backed by the Tesseract command line tool.
///
/// Create one and reuse it for every field of every card: the executable and
/// tessdata lookup happens on the first call and is cached afterwards.
pub struct TesseractSession {
    lang: String,
    resolved: Option<ResolvedTesseract>,
}

impl TesseractSession {
    pub fn new(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
            resolved: None,
        }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    fn resolve(&mut self) -> Result<ResolvedTesseract> {
        if let Some(resolved) = &self.resolved {
            return Ok(resolved.clone());
        }

        let resolved = ResolvedTesseract {
            executable: find_tesseract_executable()?,
            tessdata: find_tessdata_dir(&self.lang)?,
        };
        crate::log(&format!(
            "OCR session ready: {} (tessdata: {}, lang: {})",
            resolved.executable.display(),
            resolved.tessdata.display(),
            self.lang
        ));

        self.resolved = Some(resolved.clone());
        Ok(resolved)
    }
}

impl OcrEngine for TesseractSession {
    fn recognize(&mut self, img: &GrayImage, options: &RecognizeOptions) -> Result<String> {
        let tesseract = self.resolve()?;

        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())
            .context("Failed to write OCR input image")?;

        let mut command = Command::new(&tesseract.executable);
        command
            .arg(temp_input.path())
            .arg("stdout")
            .arg("--tessdata-dir")
            .arg(&tesseract.tessdata)
            .arg("-l")
            .arg(&self.lang)
            .arg("--psm")
            .arg(options.page_seg_mode.as_arg());

        if options.digits_only {
            command
                .arg("-c")
                .arg(format!("tessedit_char_whitelist={}", DIGIT_WHITELIST));
        }

        let output = command
            .output()
            .with_context(|| format!("Failed to run {}", tesseract.executable.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_options() {
        assert!(!RecognizeOptions::text(PageSegMode::SingleWord).digits_only);
        assert!(RecognizeOptions::digits(PageSegMode::SingleWord).digits_only);
        assert_eq!(
            RecognizeOptions::text(PageSegMode::SingleLine).page_seg_mode,
            PageSegMode::SingleLine
        );
    }

    #[test]
    fn test_page_seg_mode_from_json() {
        let mode: PageSegMode = serde_json::from_str("\"single_line\"").unwrap();
        assert_eq!(mode, PageSegMode::SingleLine);
        assert_eq!(PageSegMode::default(), PageSegMode::SingleWord);
    }

    #[test]
    fn test_page_seg_mode_args() {
        assert_eq!(PageSegMode::SingleLine.as_arg(), "7");
        assert_eq!(PageSegMode::SingleWord.as_arg(), "8");
    }

    #[test]
    fn test_session_starts_unresolved() {
        let session = TesseractSession::new("jpn");
        assert_eq!(session.lang(), "jpn");
        assert!(session.resolved.is_none());
    }
}
