//! Texture image decoding.

use std::path::Path;

use super::importer::AssetError;

/// Decoded image in tightly packed RGBA8.
pub struct DecodedImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// `width * height * 4` bytes, row-major
    pub pixels: Vec<u8>,
}

/// Decode an image file into RGBA8, converting from whatever channel
/// layout the file uses.
pub fn load_rgba8(path: &Path) -> Result<DecodedImage, AssetError> {
    let image = image::open(path)?.into_rgba8();
    let (width, height) = image.dimensions();

    log::debug!("Decoded texture {} ({}x{})", path.display(), width, height);

    Ok(DecodedImage {
        width,
        height,
        pixels: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_to_rgba8() {
        let dir = std::env::temp_dir().join("viewer_engine_image_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pixel.png");

        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 255, 0, 128]));
        img.save(&path).unwrap();

        let decoded = load_rgba8(&path).unwrap();
        assert_eq!(decoded.width, 2);
        assert_eq!(decoded.height, 1);
        assert_eq!(decoded.pixels.len(), 8);
        assert_eq!(&decoded.pixels[0..4], &[255, 0, 0, 255]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_rgba8(Path::new("does/not/exist.png")).is_err());
    }
}
