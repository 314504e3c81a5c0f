//! Reader configuration.
//!
//! Loads settings from config.json at startup. Provides binarization
//! thresholds, crop padding, OCR language, and optional overrides for the name
//! list and debug image output.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::ocr::PageSegMode;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<ReaderConfig> = OnceLock::new();

/// Complete reader configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Luminance cutoff for binarizing text crops (brighter = text)
    #[serde(default = "default_ocr_threshold")]
    pub ocr_threshold: u8,
    /// Black border added around each crop before OCR, in pixels
    #[serde(default = "default_border_padding")]
    pub border_padding: u32,
    /// Per-channel cutoff for the nature arrow colors
    #[serde(default = "default_marker_threshold")]
    pub marker_threshold: u8,
    /// Tesseract language (trained data file name without extension)
    #[serde(default = "default_tesseract_lang")]
    pub tesseract_lang: String,
    #[serde(default)]
    pub page_seg_mode: PageSegMode,
    /// Replacement for the built-in Pokémon name list
    #[serde(default)]
    pub names_file: Option<PathBuf>,
    /// Where to write field overlays and crops; disabled when unset
    #[serde(default)]
    pub debug_dir: Option<PathBuf>,
}

fn default_ocr_threshold() -> u8 {
    140
}

fn default_border_padding() -> u32 {
    10
}

fn default_marker_threshold() -> u8 {
    140
}

fn default_tesseract_lang() -> String {
    "jpn".to_string()
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            ocr_threshold: default_ocr_threshold(),
            border_padding: default_border_padding(),
            marker_threshold: default_marker_threshold(),
            tesseract_lang: default_tesseract_lang(),
            page_seg_mode: PageSegMode::default(),
            names_file: None,
            debug_dir: None,
        }
    }
}

/// Default config location: config.json next to the executable.
pub fn default_config_path() -> PathBuf {
    crate::paths::get_exe_dir().join("config.json")
}

/// Loads configuration from `path` or returns defaults.
pub fn load_config(path: &Path) -> ReaderConfig {
    crate::log(&format!("Looking for config at: {}", path.display()));

    if path.exists() {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log("Config loaded from config.json");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse {}: {}. Using defaults.",
                        path.display(),
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read {}: {}. Using defaults.",
                    path.display(),
                    e
                ));
            }
        }
    } else {
        crate::log("config.json not found. Using default config.");
    }

    ReaderConfig::default()
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config(config: ReaderConfig) {
    let _ = CONFIG.set(config);
}

/// Returns a reference to the global configuration, or the defaults if
/// `init_config` was never called.
pub fn get_config() -> &'static ReaderConfig {
    CONFIG.get_or_init(ReaderConfig::default)
}
