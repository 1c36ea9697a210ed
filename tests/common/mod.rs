#![allow(dead_code)]

pub mod image_server;

use std::io::Cursor;
use std::sync::Mutex;

use image::codecs::gif::GifEncoder;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use image_from_url::fetch::{HttpRequest, Transport};

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

pub fn png(image: &DynamicImage) -> Vec<u8> {
    encode(image, ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(&DynamicImage::new_rgb8(width, height), ImageFormat::Jpeg)
}

/// Animated GIF with `frames` solid frames of the same size.
pub fn gif(frames: usize, width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        let frames = (0..frames).map(|i| {
            let shade = u8::try_from(i * 40).unwrap();
            image::Frame::new(RgbaImage::from_pixel(width, height, Rgba([shade, 0, 0, 255])))
        });
        encoder.encode_frames(frames).unwrap();
    }
    out
}

/// Insert a marker segment right after the SOI of a JPEG stream.
fn insert_segment(mut jpeg: Vec<u8>, marker: u8, payload: &[u8]) -> Vec<u8> {
    let len = u16::try_from(payload.len() + 2).unwrap().to_be_bytes();
    let tail = jpeg.split_off(2);
    jpeg.extend_from_slice(&[0xFF, marker, len[0], len[1]]);
    jpeg.extend_from_slice(payload);
    jpeg.extend_from_slice(&tail);
    jpeg
}

/// Add an EXIF APP1 segment carrying only an orientation tag.
pub fn with_exif_orientation(jpeg: Vec<u8>, orientation: u16) -> Vec<u8> {
    let mut payload = b"Exif\0\0".to_vec();
    // Big-endian TIFF header, IFD at offset 8
    payload.extend_from_slice(b"MM\0\x2a\0\0\0\x08");
    // One entry: tag 0x0112, SHORT, count 1
    payload.extend_from_slice(&1u16.to_be_bytes());
    payload.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0, 0, 0, 1]);
    payload.extend_from_slice(&orientation.to_be_bytes());
    payload.extend_from_slice(&[0, 0]);
    // No next IFD
    payload.extend_from_slice(&[0, 0, 0, 0]);
    insert_segment(jpeg, 0xE1, &payload)
}

/// Concatenate JPEG streams into an MPO file.
pub fn mpo(streams: &[Vec<u8>]) -> Vec<u8> {
    let mut data = insert_segment(streams[0].clone(), 0xE2, b"MPF\0MM\0\x2a\0\0\0\x08");
    for stream in &streams[1..] {
        data.extend_from_slice(stream);
    }
    data
}

/// Transport that records requests and answers with a fixed body.
pub struct CapturingTransport {
    body: Vec<u8>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl CapturingTransport {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for CapturingTransport {
    fn get(&self, request: &HttpRequest) -> image_from_url::Result<Vec<u8>> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.body.clone())
    }
}
