//! Dataset toolkit for the WLASL sign language video corpus.
//!
//! The crate covers the manifest model, the manifest filter that joins the
//! manifest against the video directory, the clip loader that decodes videos
//! into tensors, and the ordered dataset stream the verifier and the feature
//! extractor consume.

mod common;

pub mod bbox;
pub mod dataset;
pub mod filter;
pub mod loader;
pub mod manifest;
pub mod record;
pub mod utils;
pub mod verify;
pub mod video_index;

pub use bbox::*;
pub use dataset::*;
pub use filter::*;
pub use loader::*;
pub use manifest::*;
pub use record::*;
pub use verify::*;
pub use video_index::*;
