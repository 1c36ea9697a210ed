//! URL image loading pipeline.

mod loader;

pub use loader::{fetch_and_normalize, Config, Loader, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};
