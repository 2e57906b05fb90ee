//! JPEG encoding and multipart framing for the MJPEG stream

use bytes::{BufMut, Bytes, BytesMut};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::error::EncodeError;

/// Multipart boundary separating frames
pub const BOUNDARY: &str = "frame";

/// Response content type of the stream endpoint
pub const CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

/// Encode a frame as baseline JPEG at `quality` (1..=100)
pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity((frame.width() * frame.height() / 8) as usize);
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    encoder.encode_image(frame)?;
    Ok(out)
}

/// Wrap an encoded JPEG as one part of the multipart stream
pub fn frame_part(jpeg: &[u8]) -> Bytes {
    let header = format!("--{BOUNDARY}\r\nContent-Type: image/jpeg\r\n\r\n");
    let mut part = BytesMut::with_capacity(header.len() + jpeg.len() + 2);
    part.put_slice(header.as_bytes());
    part.put_slice(jpeg);
    part.put_slice(b"\r\n");
    part.freeze()
}
