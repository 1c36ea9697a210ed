//! # `image-from-url`
//!
//! Load a single image from an HTTP(S) URL and turn it into an image batch
//! and a mask batch for a node-graph image-processing host.
//!
//! Every frame of the container is orientation-corrected and normalized to
//! `[0, 1]`. Animated formats become a batch of frames; multi-picture JPEGs
//! (MPO) only contribute their first picture.
//!
//! ## Example
//!
//! ```no_run
//! use image_from_url::{Config, Loader};
//!
//! # fn main() -> image_from_url::Result<()> {
//! let loader = Loader::new(Config::default())?;
//! let batch = loader.load("https://example.com/cat.png")?;
//!
//! println!("image {:?}, mask {:?}", batch.image.shape(), batch.mask.shape());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fetch;
pub mod image;
pub mod node;
pub mod pipeline;

pub use error::{Error, ErrorKind, Result};
pub use crate::image::{ImageTensor, LoadedBatch, MaskTensor};
pub use node::{registry, LoadImageFromUrlNode, NodeInputs};
pub use pipeline::{fetch_and_normalize, Config, Loader};
