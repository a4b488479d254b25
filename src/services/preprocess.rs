//! Image download and CLIP input preprocessing.

use std::time::Duration;

use image::imageops::FilterType;
use ndarray::Array4;
use reqwest::Client;

use crate::error::EncodingError;

/// Per-channel mean used when CLIP was trained.
pub const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
/// Per-channel standard deviation used when CLIP was trained.
pub const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Downloads image bytes over HTTP(S).
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, EncodingError> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| EncodingError::Fetch(e.to_string()))?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, EncodingError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EncodingError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EncodingError::HttpStatus(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EncodingError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Decode `bytes` and turn them into a `(1, 3, size, size)` CLIP input tensor.
///
/// The short side is resized to `size` with a bicubic filter, the center is
/// cropped, and each channel is normalized with [`CLIP_MEAN`] and [`CLIP_STD`].
pub fn preprocess(bytes: &[u8], size: u32) -> Result<Array4<f32>, EncodingError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| EncodingError::Decode(e.to_string()))?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodingError::Decode("image has no pixels".to_string()));
    }

    let scale = size as f32 / width.min(height) as f32;
    let resized_w = ((width as f32 * scale).round() as u32).max(size);
    let resized_h = ((height as f32 * scale).round() as u32).max(size);
    let resized = image::imageops::resize(&rgb, resized_w, resized_h, FilterType::CatmullRom);

    let left = (resized_w - size) / 2;
    let top = (resized_h - size) / 2;
    let cropped = image::imageops::crop_imm(&resized, left, top, size, size).to_image();

    let side = size as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
    for (x, y, pixel) in cropped.enumerate_pixels() {
        for c in 0..3 {
            let value = pixel[c] as f32 / 255.0;
            tensor[[0, c, y as usize, x as usize]] = (value - CLIP_MEAN[c]) / CLIP_STD[c];
        }
    }

    Ok(tensor)
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(color));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}
