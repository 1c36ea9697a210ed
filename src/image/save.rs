//! Preview export of image batches.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgb};
use ndarray::{ArrayView3, Axis};

use crate::error::{Error, Result};

use super::{ImageTensor, RGB_CHANNELS};

/// Save every entry of an image batch as a PNG in `dir`.
///
/// Files are named `frame_000.png`, `frame_001.png`, ... in batch order.
/// The directory is created if needed.
///
/// # Errors
///
/// Returns an error if the tensor is not `(N, H, W, 3)` or a file cannot be written.
pub fn save_batch<P: AsRef<Path>>(batch: &ImageTensor, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();

    let shape = batch.shape();
    if shape[3] != RGB_CHANNELS {
        return Err(Error::ShapeMismatch {
            expected: format!("[N, H, W, {RGB_CHANNELS}]"),
            actual: format!("{shape:?}"),
        });
    }

    fs::create_dir_all(dir)?;

    batch
        .axis_iter(Axis(0))
        .enumerate()
        .map(|(index, frame)| -> Result<PathBuf> {
            let path = dir.join(format!("frame_{index:03}.png"));
            tracing::debug!("Saving frame {index} to: {}", path.display());
            tensor_to_image(frame)?.save(&path)?;
            Ok(path)
        })
        .collect()
}

/// Convert one normalized HWC frame to an RGB image.
fn tensor_to_image(frame: ArrayView3<'_, f32>) -> Result<ImageBuffer<Rgb<u8>, Vec<u8>>> {
    let (height, width, _) = frame.dim();
    let too_large = |_| Error::InvalidParameter {
        name: "batch".to_string(),
        reason: format!("frame {width}x{height} is too large to save"),
    };
    let img_width = u32::try_from(width).map_err(too_large)?;
    let img_height = u32::try_from(height).map_err(too_large)?;

    Ok(ImageBuffer::from_fn(img_width, img_height, |x, y| {
        let (x, y) = (x as usize, y as usize);
        Rgb([
            denormalize(frame[[y, x, 0]]),
            denormalize(frame[[y, x, 1]]),
            denormalize(frame[[y, x, 2]]),
        ])
    }))
}

/// Denormalize a value from [0, 1] to [0, 255] with clamping.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn denormalize(value: f32) -> u8 {
    // Safe: clamped to [0, 255] range before casting
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_denormalize() {
        assert_eq!(denormalize(0.0), 0);
        assert_eq!(denormalize(0.2), 51);
        assert_eq!(denormalize(1.0), 255);
    }

    #[test]
    fn test_denormalize_clamp() {
        assert_eq!(denormalize(-1.0), 0);
        assert_eq!(denormalize(2.0), 255);
    }

    #[test]
    fn test_save_batch_writes_one_file_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut batch = Array4::<f32>::zeros((2, 3, 4, 3));
        batch[[1, 2, 3, 0]] = 1.0;

        let paths = save_batch(&batch, dir.path().join("out")).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("frame_000.png"));

        let second = image::open(&paths[1]).unwrap().to_rgb8();
        assert_eq!(second.dimensions(), (4, 3));
        assert_eq!(second.get_pixel(3, 2), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_save_rejects_non_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let batch = Array4::<f32>::zeros((1, 2, 2, 4));
        assert!(save_batch(&batch, dir.path()).is_err());
    }
}
