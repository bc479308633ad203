use std::process::Stdio;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Turns an image into text
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize text from PNG image bytes
    async fn recognize(&self, image_bytes: &[u8]) -> Result<String>;
}

/// Drives an external tesseract-compatible command over stdin/stdout
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    command: String,
    language: String,
}

impl TesseractRecognizer {
    /// `language` is a recognizer model name, e.g. "kor" or "kor+eng"
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, image_bytes: &[u8]) -> Result<String> {
        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start '{}'", self.command))?;

        let mut stdin = child.stdin.take().context("Recognizer stdin unavailable")?;
        stdin
            .write_all(image_bytes)
            .await
            .context("Failed to write image to recognizer")?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for recognizer")?;

        if !output.status.success() {
            bail!(
                "Recognizer exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let text = String::from_utf8(output.stdout).context("Recognizer output is not UTF-8")?;
        tracing::debug!("[OCR] Recognized {} chars", text.chars().count());
        Ok(text)
    }
}
