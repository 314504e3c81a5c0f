use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::log;

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";

/// Executable name on this platform.
#[cfg(windows)]
const TESSERACT_EXE: &str = "tesseract.exe";
#[cfg(not(windows))]
const TESSERACT_EXE: &str = "tesseract";

/// Common install locations checked when tesseract is not on PATH.
const COMMON_EXECUTABLE_PATHS: [&str; 5] = [
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
];

/// Common tessdata directories shipped by installers and package managers.
const COMMON_TESSDATA_PATHS: [&str; 6] = [
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
];

pub struct TesseractPaths {
    pub executable: PathBuf,
    pub tessdata: PathBuf,
}

/// Returns the directory for storing Tesseract files
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pokesol-card-reader")
        .join("tesseract")
}

fn traineddata_file(lang: &str) -> String {
    format!("{}.traineddata", lang)
}

/// Ensures Tesseract and the trained data for `lang` are available.
/// Downloads the trained data into the local tessdata dir if necessary.
pub fn ensure_tesseract(lang: &str) -> Result<TesseractPaths> {
    let executable = find_tesseract_executable()?;

    if let Ok(tessdata) = find_tessdata_dir(lang) {
        log(&format!(
            "Tesseract found at: {} (tessdata: {})",
            executable.display(),
            tessdata.display()
        ));
        return Ok(TesseractPaths {
            executable,
            tessdata,
        });
    }

    log(&format!("{} not found, downloading...", traineddata_file(lang)));

    let tessdata = get_tesseract_dir().join("tessdata");
    fs::create_dir_all(&tessdata)
        .with_context(|| format!("Failed to create {}", tessdata.display()))?;
    download_tessdata(&tessdata, lang)?;

    log(&format!("Tesseract ready, tessdata at: {}", tessdata.display()));

    Ok(TesseractPaths {
        executable,
        tessdata,
    })
}

/// Downloads trained data for `lang` from the tessdata repository
fn download_tessdata(tessdata_dir: &Path, lang: &str) -> Result<()> {
    let file_name = traineddata_file(lang);
    let url = format!("{}/{}", TESSDATA_REPO, file_name);
    let target = tessdata_dir.join(&file_name);

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let response = client
        .get(&url)
        .header("User-Agent", "pokesol-card-reader")
        .send()?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to download {}: HTTP {}",
            file_name,
            response.status()
        ));
    }

    let bytes = response.bytes()?;
    let mut file = fs::File::create(&target)?;
    file.write_all(&bytes)?;

    log(&format!("Downloaded {} ({} bytes)", file_name, bytes.len()));

    Ok(())
}

/// Finds the Tesseract executable, checking our local dir first, then system
pub fn find_tesseract_executable() -> Result<PathBuf> {
    let local_exe = get_tesseract_dir().join(TESSERACT_EXE);

    if local_exe.exists() {
        return Ok(local_exe);
    }

    // Check PATH
    if let Ok(output) = std::process::Command::new("tesseract")
        .arg("--version")
        .output()
    {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    for path in &COMMON_EXECUTABLE_PATHS {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!("Tesseract not found. Please install Tesseract-OCR."))
}

/// Returns the first candidate directory containing `<lang>.traineddata`.
fn first_with_traineddata<I>(candidates: I, lang: &str) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    let file_name = traineddata_file(lang);
    candidates
        .into_iter()
        .find(|dir| dir.join(&file_name).exists())
}

/// Finds a tessdata directory that has trained data for `lang`
pub fn find_tessdata_dir(lang: &str) -> Result<PathBuf> {
    let mut candidates = vec![get_tesseract_dir().join("tessdata")];

    // TESSDATA_PREFIX may point at tessdata itself or at its parent
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        candidates.push(PathBuf::from(&prefix));
        candidates.push(PathBuf::from(&prefix).join("tessdata"));
    }

    candidates.extend(COMMON_TESSDATA_PATHS.iter().map(PathBuf::from));

    first_with_traineddata(candidates, lang).ok_or_else(|| {
        anyhow!(
            "tessdata directory not found. Please ensure {} is available (run with --setup).",
            traineddata_file(lang)
        )
    })
}
