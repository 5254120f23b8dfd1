use std::fs;

use image::imageops::flip_vertical_in_place;
use image::RgbaImage;
use reqwest::blocking::Client;
use tracing::debug;

use crate::error::LoadError;
use crate::source::{ImageSource, SourceLocation};

/// RGBA8 pixels ready for upload. Row 0 is the bottom row of the picture so
/// UV `(0, 0)` samples the bottom-left corner.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: RgbaImage,
}

impl DecodedImage {
    /// Wraps top-down RGBA pixels, flipping them into bottom-up row order.
    pub fn from_top_down(mut pixels: RgbaImage) -> Self {
        flip_vertical_in_place(&mut pixels);
        Self {
            width: pixels.width(),
            height: pixels.height(),
            pixels,
        }
    }

    pub fn decode(location: &str, bytes: &[u8]) -> Result<Self, LoadError> {
        let image = image::load_from_memory(bytes).map_err(|error| LoadError::Decode {
            location: location.to_string(),
            error,
        })?;
        Ok(Self::from_top_down(image.to_rgba8()))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Fetches and decodes image sources. Called from loader threads.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, source: &ImageSource) -> Result<DecodedImage, LoadError>;
}

/// Default fetcher: HTTP(S) through a blocking `reqwest` client, `file://`
/// URLs and plain paths from disk.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = Client::builder().build()?;
        Ok(Self { http })
    }

    fn fetch_bytes(&self, source: &ImageSource) -> Result<Vec<u8>, LoadError> {
        let location = source.as_str();
        match source.location() {
            SourceLocation::Remote(url) => {
                debug!(%url, "downloading image");
                let response = self
                    .http
                    .get(url)
                    .send()
                    .map_err(|error| LoadError::Request {
                        location: location.to_string(),
                        error,
                    })?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        location: location.to_string(),
                        status: status.as_u16(),
                    });
                }
                let bytes = response.bytes().map_err(|error| LoadError::Request {
                    location: location.to_string(),
                    error,
                })?;
                Ok(bytes.to_vec())
            }
            SourceLocation::Local(path) => {
                debug!(path = %path.display(), "reading image");
                fs::read(&path).map_err(|error| LoadError::Io {
                    location: location.to_string(),
                    error,
                })
            }
            SourceLocation::Unsupported { scheme } => Err(LoadError::UnsupportedScheme {
                location: location.to_string(),
                scheme,
            }),
        }
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, source: &ImageSource) -> Result<DecodedImage, LoadError> {
        let bytes = self.fetch_bytes(source)?;
        DecodedImage::decode(source.as_str(), &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn encode_png(image: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn decode_flips_rows() {
        let mut image = RgbaImage::new(1, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        let decoded = DecodedImage::decode("mem", &encode_png(&image)).unwrap();
        assert_eq!(decoded.dimensions(), (1, 2));
        assert_eq!(decoded.pixels.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(decoded.pixels.get_pixel(0, 1), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = DecodedImage::decode("mem", b"definitely not an image").unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }

    #[test]
    fn reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slide.png");
        std::fs::write(&path, encode_png(&RgbaImage::new(4, 3))).unwrap();

        let fetcher = HttpFetcher::new().unwrap();
        let decoded = fetcher
            .fetch(&ImageSource::new(path.to_string_lossy().into_owned()))
            .unwrap();
        assert_eq!(decoded.dimensions(), (4, 3));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch(&ImageSource::new(path.to_string_lossy().into_owned()))
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch(&ImageSource::new("ftp://example.com/a.png"))
            .unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedScheme { ref scheme, .. } if scheme == "ftp"));
    }
}
