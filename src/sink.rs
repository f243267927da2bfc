//! Decoded frames and the display-side sink boundary.

use image::GenericImageView;

/// A decoded video frame. Ownership transfers to the sink on delivery.
#[derive(Clone)]
pub struct DecodedImage {
    pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    pub(crate) fn from_raw(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Decode a JPEG byte range into an RGB frame.
    pub fn from_jpeg(bytes: &[u8]) -> image::ImageResult<Self> {
        let decoded = image::load_from_memory(bytes)?;
        let (width, height) = decoded.dimensions();
        Ok(Self {
            pixels: decoded.into_rgb8().into_raw(),
            width,
            height,
        })
    }

    /// Packed RGB8 pixel data, `width * height * 3` bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Consumer of decoded frames.
///
/// Frames are delivered from whichever decode worker finishes first, so
/// `accept` may be invoked concurrently from multiple threads and in an order
/// that differs from datagram arrival order. Implementations must either be
/// thread-safe or perform their own serialization (e.g. queue onto a single
/// display thread).
pub trait ImageSink: Send + Sync {
    fn accept(&self, image: DecodedImage);
}

impl<F> ImageSink for F
where
    F: Fn(DecodedImage) + Send + Sync,
{
    fn accept(&self, image: DecodedImage) {
        self(image)
    }
}
