//! OCR through an external Tesseract process.
//!
//! Images are decoded with the `image` crate, converted to grayscale and
//! binarized at the Otsu threshold, then piped as PNG into
//! `tesseract stdin stdout -l <languages>`.

use async_trait::async_trait;
use carlens_core::{DecodeError, ImageToText};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Configuration for the Tesseract adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Executable to run
    #[serde(default = "default_command")]
    pub command: String,
    /// Tesseract language list, `+`-separated
    #[serde(default = "default_languages")]
    pub languages: String,
}

fn default_command() -> String {
    "tesseract".to_string()
}

fn default_languages() -> String {
    "por+eng".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            languages: default_languages(),
        }
    }
}

/// [`ImageToText`] backed by the `tesseract` command-line tool.
pub struct TesseractOcr {
    config: OcrConfig,
}

impl TesseractOcr {
    /// Create a new adapter.
    #[must_use]
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    async fn run_engine(&self, png: &[u8]) -> Result<String, DecodeError> {
        let mut child = Command::new(&self.config.command)
            .args(["stdin", "stdout", "-l", &self.config.languages])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DecodeError::Engine(format!("failed to start {}: {e}", self.config.command))
            })?;

        // Dropping stdin closes the pipe so the engine sees EOF
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(png).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(DecodeError::Engine(format!(
                "{} exited with {}: {}",
                self.config.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new(OcrConfig::default())
    }
}

#[async_trait]
impl ImageToText for TesseractOcr {
    fn engine_name(&self) -> &str {
        "tesseract"
    }

    async fn image_to_text(&self, path: &Path) -> Result<String, DecodeError> {
        debug!("Running OCR on {:?}", path);

        let bytes = tokio::fs::read(path).await?;

        // Decode and threshold off the async runtime
        let png = tokio::task::spawn_blocking(move || prepare_for_ocr(&bytes))
            .await
            .map_err(|e| DecodeError::Engine(format!("Task join error: {e}")))?
            .map_err(|reason| DecodeError::Unreadable {
                path: path.to_path_buf(),
                reason,
            })?;

        let text = self.run_engine(&png).await?;
        debug!("OCR produced {} bytes of text", text.len());
        Ok(text)
    }
}

/// Decode, binarize and re-encode as PNG.
fn prepare_for_ocr(bytes: &[u8]) -> Result<Vec<u8>, String> {
    let img = image::load_from_memory(bytes).map_err(|e| format!("Failed to load image: {e}"))?;
    let binary = preprocess(&img);

    let mut out = Vec::new();
    DynamicImage::ImageLuma8(binary)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| format!("Failed to encode image: {e}"))?;
    Ok(out)
}

/// Grayscale, then binary threshold at the Otsu level.
///
/// Pixels strictly above the level become white, the rest black.
#[must_use]
pub fn preprocess(img: &DynamicImage) -> GrayImage {
    let mut gray = img.to_luma8();
    let level = otsu_level(&gray);

    for pixel in gray.pixels_mut() {
        *pixel = if pixel.0[0] > level { Luma([255]) } else { Luma([0]) };
    }
    gray
}

/// Threshold maximizing between-class variance of the gray histogram.
#[must_use]
pub fn otsu_level(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[usize::from(pixel.0[0])] += 1;
    }

    let total: u64 = histogram.iter().sum();
    let weighted_total: f64 = (0u8..=255)
        .zip(histogram.iter())
        .map(|(level, &count)| f64::from(level) * count as f64)
        .sum();

    let mut background_weight = 0u64;
    let mut background_sum = 0.0;
    let mut best_variance = 0.0;
    let mut best_level = 0u8;

    for (level, &count) in (0u8..=255).zip(histogram.iter()) {
        background_weight += count;
        if background_weight == 0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0 {
            break;
        }

        background_sum += f64::from(level) * count as f64;
        let background_mean = background_sum / background_weight as f64;
        let foreground_mean = (weighted_total - background_sum) / foreground_weight as f64;
        let variance = background_weight as f64
            * foreground_weight as f64
            * (background_mean - foreground_mean).powi(2);

        if variance > best_variance {
            best_variance = variance;
            best_level = level;
        }
    }

    best_level
}
