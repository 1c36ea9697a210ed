//! Image decoding, normalization, and preview export.

mod decode;
mod mpo;
mod normalize;
mod save;

pub use decode::{decode_container, ColorMode, Container, ContainerFormat, Frame, FrameView};
pub use normalize::{frame_to_tensors, normalize_container, LoadedBatch};
pub use save::save_batch;

use ndarray::{Array3, Array4};

/// Image batch in NHWC format (batch, height, width, channels).
/// Values are normalized to [0, 1].
pub type ImageTensor = Array4<f32>;

/// Mask batch in NHW format (batch, height, width), values in [0, 1].
pub type MaskTensor = Array3<f32>;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;

/// Side length of the placeholder mask used when a frame has no alpha.
pub const FALLBACK_MASK_SIZE: usize = 64;

/// Formats whose extra frames are not animation frames and are never batched.
pub const EXCLUDED_MULTI_FRAME_FORMATS: &[ContainerFormat] = &[ContainerFormat::Mpo];
