//! Pokesol Card Reader
//!
//! Reads Pokémon stat-card screenshots with Tesseract OCR and prints them in
//! the six-line Pokesol text format.

mod batch;
mod card;
mod config;
mod ocr;
mod paths;
mod pipeline;
mod pokemon;
mod preview;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use batch::{create_work_queue, run_card_worker, CardResult, CardWorkItem, OutputFormat};
use pokemon::NameResolver;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to config.json (defaults to the one next to the executable)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Newline-delimited Pokémon name list replacing the built-in one
    #[arg(long)]
    names: Option<PathBuf>,

    /// Write field overlays and preprocessed crops here
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Print the assembled record as JSON instead of Pokesol text
    #[arg(long)]
    json: bool,

    /// Download the Tesseract trained data if it is missing
    #[arg(long)]
    setup: bool,

    /// Card images to read
    #[arg(required_unless_present = "setup")]
    images: Vec<PathBuf>,
}

/// Logs a message to both stderr and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    eprint!("{}", line);
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths::get_log_file())
    {
        let _ = file.write_all(line.as_bytes());
    }
}

fn main() -> ExitCode {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        log(&format!("[PANIC]{} {}", location, msg));
    }));

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Reads every image on the command line. Returns false if any card failed.
fn run(cli: Cli) -> Result<bool> {
    paths::ensure_directories()?;

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let mut reader_config = config::load_config(&config_path);
    if cli.names.is_some() {
        reader_config.names_file = cli.names.clone();
    }
    if cli.debug_dir.is_some() {
        reader_config.debug_dir = cli.debug_dir.clone();
    }
    config::init_config(reader_config);
    let config = config::get_config();

    if cli.setup {
        let tesseract = ocr::ensure_tesseract(&config.tesseract_lang)?;
        log(&format!(
            "Tesseract ready: {} (tessdata: {})",
            tesseract.executable.display(),
            tesseract.tessdata.display()
        ));
        if cli.images.is_empty() {
            return Ok(true);
        }
    }

    let names = match &config.names_file {
        Some(path) => NameResolver::from_file(path)?,
        None => NameResolver::builtin()?,
    };
    log(&format!("Loaded {} Pokémon names", names.len()));

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let (sender, receiver) = create_work_queue();
    let (result_tx, result_rx) = std::sync::mpsc::channel();
    let session = ocr::TesseractSession::new(&config.tesseract_lang);
    log(&format!("Reading {} card(s) with language {}", cli.images.len(), session.lang()));
    let worker = thread::spawn(move || {
        run_card_worker(receiver, session, &names, config, format, result_tx);
    });

    for (index, path) in cli.images.iter().enumerate() {
        sender.send(CardWorkItem::new(path.clone(), index))?;
    }
    drop(sender);

    let mut results: Vec<Option<CardResult>> = cli.images.iter().map(|_| None).collect();
    for result in result_rx {
        let index = result.index;
        if let Some(slot) = results.get_mut(index) {
            *slot = Some(result);
        }
    }
    if worker.join().is_err() {
        log("Card worker panicked");
    }

    Ok(print_results(&cli.images, results))
}

/// Prints outputs in input order, separated by blank lines. Failures go to stderr.
fn print_results(images: &[PathBuf], results: Vec<Option<CardResult>>) -> bool {
    let mut all_ok = true;
    let mut printed = 0;

    for (path, result) in images.iter().zip(results) {
        let Some(result) = result else {
            eprintln!("{}: not processed", path.display());
            all_ok = false;
            continue;
        };

        match result.outcome {
            Ok(text) => {
                if printed > 0 {
                    println!();
                }
                println!("{}", text);
                printed += 1;
            }
            Err(e) => {
                eprintln!("{}: {:#}", result.image_path.display(), e);
                all_ok = false;
            }
        }
    }

    all_ok
}
