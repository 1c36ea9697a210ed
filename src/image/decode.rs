//! Container decoding: format sniffing, frame extraction, and EXIF orientation.

use std::fmt;
use std::io::Cursor;

use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::metadata::Orientation;
use image::{
    AnimationDecoder, DynamicImage, GrayImage, ImageBuffer, ImageDecoder, ImageFormat, ImageReader,
    Luma, Rgb, RgbImage,
};

use crate::error::Result;

use super::{mpo, EXCLUDED_MULTI_FRAME_FORMATS};

/// Container format of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Multi-picture JPEG (stereo pairs, previews).
    Mpo,
    /// Any format handled directly by the `image` crate.
    Image(ImageFormat),
}

impl ContainerFormat {
    /// Whether multiple frames of this format may be concatenated into a batch.
    #[must_use]
    pub fn is_batchable(&self) -> bool {
        !EXCLUDED_MULTI_FRAME_FORMATS.contains(self)
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mpo => f.write_str("MPO"),
            Self::Image(format) => write!(f, "{}", format!("{format:?}").to_uppercase()),
        }
    }
}

/// Pixel representation of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    L,
    La,
    Rgb,
    Rgba,
    /// Single integer channel holding 16-bit range luminance.
    I,
    La16,
    Rgb16,
    Rgba16,
    RgbF32,
    RgbaF32,
    Other { alpha: bool },
}

impl ColorMode {
    fn of(image: &DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(_) => Self::L,
            DynamicImage::ImageLumaA8(_) => Self::La,
            DynamicImage::ImageRgb8(_) => Self::Rgb,
            DynamicImage::ImageRgba8(_) => Self::Rgba,
            DynamicImage::ImageLuma16(_) => Self::I,
            DynamicImage::ImageLumaA16(_) => Self::La16,
            DynamicImage::ImageRgb16(_) => Self::Rgb16,
            DynamicImage::ImageRgba16(_) => Self::Rgba16,
            DynamicImage::ImageRgb32F(_) => Self::RgbF32,
            DynamicImage::ImageRgba32F(_) => Self::RgbaF32,
            other => Self::Other {
                alpha: other.color().has_alpha(),
            },
        }
    }

    /// Whether frames in this mode carry an alpha channel.
    #[must_use]
    pub const fn has_alpha(&self) -> bool {
        match self {
            Self::La | Self::Rgba | Self::La16 | Self::Rgba16 | Self::RgbaF32 => true,
            Self::Other { alpha } => *alpha,
            _ => false,
        }
    }
}

/// Read-only view over one decoded frame.
pub trait FrameView {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn color_mode(&self) -> ColorMode;

    fn has_alpha(&self) -> bool {
        self.color_mode().has_alpha()
    }

    /// The frame as 8-bit RGB. "I" frames are rescaled by 1/255 first.
    fn to_rgb8(&self) -> RgbImage;

    /// The alpha channel as 8-bit values, if the frame has one.
    fn alpha8(&self) -> Option<GrayImage>;
}

/// One decoded, orientation-corrected frame.
#[derive(Debug, Clone)]
pub struct Frame {
    image: DynamicImage,
}

impl Frame {
    #[must_use]
    pub const fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    #[must_use]
    pub const fn image(&self) -> &DynamicImage {
        &self.image
    }
}

impl FrameView for Frame {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn color_mode(&self) -> ColorMode {
        ColorMode::of(&self.image)
    }

    fn to_rgb8(&self) -> RgbImage {
        match &self.image {
            DynamicImage::ImageLuma16(luma) => rescale_wide_luma(luma),
            image => image.to_rgb8(),
        }
    }

    fn alpha8(&self) -> Option<GrayImage> {
        if !self.has_alpha() {
            return None;
        }
        let rgba = self.image.to_rgba8();
        Some(GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            Luma([rgba.get_pixel(x, y)[3]])
        }))
    }
}

/// Bring 16-bit range luminance into 8-bit range by dividing by 255.
fn rescale_wide_luma(luma: &ImageBuffer<Luma<u16>, Vec<u16>>) -> RgbImage {
    RgbImage::from_fn(luma.width(), luma.height(), |x, y| {
        let value = rescale_wide_value(luma.get_pixel(x, y)[0]);
        Rgb([value, value, value])
    })
}

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rescale_wide_value(value: u16) -> u8 {
    // Safe: clamped to [0, 255] before casting
    (f32::from(value) / 255.0).round().min(255.0) as u8
}

/// A decoded image container and its frames, in container order.
#[derive(Debug, Clone)]
pub struct Container {
    format: ContainerFormat,
    frames: Vec<Frame>,
}

impl Container {
    #[must_use]
    pub const fn new(format: ContainerFormat, frames: Vec<Frame>) -> Self {
        Self { format, frames }
    }

    #[must_use]
    pub const fn format(&self) -> ContainerFormat {
        self.format
    }

    /// Iterate over the frames. Each call starts from the first frame.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Decode `bytes` into a container of orientation-corrected frames.
///
/// The container's own EXIF orientation applies to every frame that has no
/// orientation metadata of its own; MPO sub-images use their own.
///
/// # Errors
///
/// Returns a decode-kind error if the format is unknown or the data is corrupt.
pub fn decode_container(bytes: &[u8]) -> Result<Container> {
    let format = image::guess_format(bytes)?;

    let container = match format {
        ImageFormat::Jpeg if mpo::is_mpo(bytes) => decode_mpo(bytes)?,
        ImageFormat::Gif => {
            let mut decoder = GifDecoder::new(Cursor::new(bytes))?;
            let orientation = decoder.orientation()?;
            // Palette frames carry no alpha band
            animated(format, orientation, false, decoder.into_frames())?
        }
        ImageFormat::Png => {
            let mut decoder = PngDecoder::new(Cursor::new(bytes))?;
            if decoder.is_apng()? {
                let orientation = decoder.orientation()?;
                let alpha = decoder.color_type().has_alpha();
                animated(format, orientation, alpha, decoder.apng()?.into_frames())?
            } else {
                single(format, decoder)?
            }
        }
        ImageFormat::WebP => {
            let mut decoder = WebPDecoder::new(Cursor::new(bytes))?;
            if decoder.has_animation() {
                let orientation = decoder.orientation()?;
                let alpha = decoder.color_type().has_alpha();
                animated(format, orientation, alpha, decoder.into_frames())?
            } else {
                single(format, decoder)?
            }
        }
        other => single(
            other,
            ImageReader::with_format(Cursor::new(bytes), other).into_decoder()?,
        )?,
    };

    tracing::debug!(
        "Decoded {} container with {} frame(s)",
        container.format(),
        container.len()
    );
    Ok(container)
}

fn single(format: ImageFormat, mut decoder: impl ImageDecoder) -> Result<Container> {
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(Container::new(
        ContainerFormat::Image(format),
        vec![Frame::new(image)],
    ))
}

/// Collect animation frames. The decoder composites into RGBA; frames of a
/// source without alpha are narrowed back to RGB.
fn animated(
    format: ImageFormat,
    orientation: Orientation,
    alpha: bool,
    frames: image::Frames<'_>,
) -> Result<Container> {
    let frames = frames
        .collect_frames()?
        .into_iter()
        .map(|frame| {
            let rgba = DynamicImage::ImageRgba8(frame.into_buffer());
            let mut image = if alpha {
                rgba
            } else {
                DynamicImage::ImageRgb8(rgba.into_rgb8())
            };
            image.apply_orientation(orientation);
            Frame::new(image)
        })
        .collect();
    Ok(Container::new(ContainerFormat::Image(format), frames))
}

fn decode_mpo(bytes: &[u8]) -> Result<Container> {
    let frames = mpo::split_streams(bytes)?
        .into_iter()
        .map(|range| -> Result<Frame> {
            let mut decoder =
                ImageReader::with_format(Cursor::new(&bytes[range]), ImageFormat::Jpeg)
                    .into_decoder()?;
            let orientation = decoder.orientation()?;
            let mut image = DynamicImage::from_decoder(decoder)?;
            image.apply_orientation(orientation);
            Ok(Frame::new(image))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Container::new(ContainerFormat::Mpo, frames))
}
