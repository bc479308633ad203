use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat};

/// Load a picked image and prepare it for recognition.
///
/// Any format the decoder knows is accepted; the result is a grayscale PNG.
pub fn load_image(path: &Path) -> Result<Vec<u8>> {
    let image = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?;

    tracing::debug!(
        "[OCR] Loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );

    encode_png(&image.grayscale())
}

pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    #[test]
    fn loads_and_reencodes_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.jpg");
        RgbImage::from_pixel(8, 4, Rgb([200, 10, 10]))
            .save(&path)
            .unwrap();

        let png = load_image(&path).unwrap();

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
        assert!(decoded.as_luma8().is_some());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_image(Path::new("does/not/exist.png")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.png"));
    }
}
