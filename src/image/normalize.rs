//! Frame normalization and batch aggregation.

use ndarray::{concatenate, Array, Array3, Array4, Axis, RemoveAxis};

use crate::error::{Error, Result};

use super::{Container, FrameView, ImageTensor, MaskTensor, FALLBACK_MASK_SIZE, RGB_CHANNELS};

/// Image and mask batches produced from one container.
///
/// Both batches have the same leading dimension. A mask entry is either the
/// inverted alpha channel (same height and width as the image) or a
/// 64x64 zero placeholder when the frame has no alpha.
#[derive(Debug, Clone)]
pub struct LoadedBatch {
    pub image: ImageTensor,
    pub mask: MaskTensor,
}

impl LoadedBatch {
    /// Number of frames in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.image.shape()[0]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn into_parts(self) -> (ImageTensor, MaskTensor) {
        (self.image, self.mask)
    }
}

/// Convert one frame into a single-entry image batch and mask batch.
///
/// The image is `(1, H, W, 3)` with values in [0, 1]. The mask is
/// `1 - alpha / 255` with shape `(1, H, W)`, or a `(1, 64, 64)` zero tensor
/// if the frame has no alpha channel.
pub fn frame_to_tensors<F: FrameView + ?Sized>(frame: &F) -> (ImageTensor, MaskTensor) {
    let rgb = frame.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);

    let mut image = Array4::<f32>::zeros((1, height, width, RGB_CHANNELS));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..RGB_CHANNELS {
            image[[0, y as usize, x as usize, c]] = f32::from(pixel[c]) / 255.0;
        }
    }

    let mask = frame.alpha8().map_or_else(
        || Array3::<f32>::zeros((1, FALLBACK_MASK_SIZE, FALLBACK_MASK_SIZE)),
        |alpha| {
            let (width, height) = (alpha.width() as usize, alpha.height() as usize);
            let mut mask = Array3::<f32>::zeros((1, height, width));
            for (x, y, pixel) in alpha.enumerate_pixels() {
                mask[[0, y as usize, x as usize]] = 1.0 - f32::from(pixel[0]) / 255.0;
            }
            mask
        },
    );

    (image, mask)
}

/// Normalize every frame of `container` and aggregate the results.
///
/// Frames whose dimensions differ from the first frame are dropped. When more
/// than one frame survives and the format is batchable, all frames are
/// concatenated along the batch axis; otherwise only the first frame is kept.
///
/// # Errors
///
/// Returns [`Error::EmptyContainer`] if there are no frames, or
/// [`Error::ShapeMismatch`] if the surviving masks cannot be concatenated.
pub fn normalize_container(container: &Container) -> Result<LoadedBatch> {
    let mut images = Vec::new();
    let mut masks = Vec::new();
    let mut reference = None;

    for (index, frame) in container.frames().enumerate() {
        let dims = (frame.width(), frame.height());
        match reference {
            None => reference = Some(dims),
            Some(expected) if expected != dims => {
                tracing::debug!(
                    "Skipping frame {index}: {}x{} does not match {}x{}",
                    dims.0,
                    dims.1,
                    expected.0,
                    expected.1
                );
                continue;
            }
            Some(_) => {}
        }

        let (image, mask) = frame_to_tensors(frame);
        images.push(image);
        masks.push(mask);
    }

    if images.is_empty() {
        return Err(Error::EmptyContainer);
    }

    if images.len() > 1 && container.format().is_batchable() {
        return Ok(LoadedBatch {
            image: concat_batch(&images)?,
            mask: concat_batch(&masks)?,
        });
    }

    if images.len() > 1 {
        tracing::debug!(
            "{} frames are not batched; keeping the first of {}",
            container.format(),
            images.len()
        );
    }
    Ok(LoadedBatch {
        image: images.swap_remove(0),
        mask: masks.swap_remove(0),
    })
}

/// Concatenate tensors along the batch axis.
fn concat_batch<D: RemoveAxis>(tensors: &[Array<f32, D>]) -> Result<Array<f32, D>> {
    let views: Vec<_> = tensors.iter().map(|tensor| tensor.view()).collect();
    concatenate(Axis(0), &views).map_err(|_| {
        let expected = tensors[0].shape();
        let actual = tensors
            .iter()
            .map(|tensor| tensor.shape())
            .find(|shape| shape[1..] != expected[1..])
            .unwrap_or(expected);
        Error::ShapeMismatch {
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    })
}
