pub mod setup;
pub mod preprocess;
pub mod engine;
pub mod normalize;
pub mod extract;

pub use setup::ensure_tesseract;
pub use engine::{OcrEngine, PageSegMode, TesseractSession};
pub use extract::{extract_fields, ExtractOptions, RawFields};
