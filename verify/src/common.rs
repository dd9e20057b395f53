pub use anyhow::{ensure, Context as _, Result};
pub use indexmap::IndexSet;
pub use sign_dataset::{
    filter_manifest, save_instances, utils::save_classes_file, verify_instances, ClipDataset,
    ClipLoader, ClipTransform, FilterSummary, FilteredManifest, Instance, Manifest,
    VideoClipLoader, VideoIndex,
};
pub use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
pub use tracing::info;
