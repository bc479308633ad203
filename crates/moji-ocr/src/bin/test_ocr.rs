//! Manual OCR check - run with: cargo run -p moji-ocr --bin test_ocr -- <image> [lang]

use std::path::PathBuf;

use anyhow::{Context, Result};
use moji_ocr::{TesseractRecognizer, TextRecognizer};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("debug").init();

    let mut args = std::env::args().skip(1);
    let path = PathBuf::from(args.next().context("usage: test_ocr <image> [lang]")?);
    let language = args.next().unwrap_or_else(|| "kor".to_string());

    tracing::info!("1. Loading {}", path.display());
    let start = std::time::Instant::now();
    let png = moji_ocr::load_image(&path)?;
    tracing::info!("   {} bytes in {:?}", png.len(), start.elapsed());

    tracing::info!("2. Running OCR ({})", language);
    let recognizer = TesseractRecognizer::new("tesseract", language);
    let start = std::time::Instant::now();
    match recognizer.recognize(&png).await {
        Ok(text) => {
            let text = moji_ocr::clean_text(&text);
            tracing::info!("   {:?} - {} chars", start.elapsed(), text.chars().count());
            for line in text.lines().take(5) {
                tracing::info!("   > {}", line);
            }
        }
        Err(e) => tracing::error!("   Failed: {:#}", e),
    }

    Ok(())
}
