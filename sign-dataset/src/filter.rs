//! Joins the manifest against the video directory.

use crate::{
    common::*,
    manifest::{Instance, Manifest, Split},
    video_index::VideoIndex,
};

/// The upper bound of the number of classes in WLASL.
pub const MAX_CLASSES: usize = 2000;

/// Clamp the requested number of classes to [MAX_CLASSES].
pub fn effective_num_classes(n_classes: usize) -> usize {
    n_classes.min(MAX_CLASSES)
}

/// Counts of a filtering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterSummary {
    pub total: usize,
    pub found: usize,
    pub missing: usize,
}

/// The manifest split into train and non-train instances.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredManifest {
    pub train: Vec<Instance>,
    pub test: Vec<Instance>,
    /// Class names in manifest order.
    pub classes: IndexSet<String>,
    pub summary: FilterSummary,
}

/// Keep the instances of the first `min(n_classes, MAX_CLASSES)` classes
/// whose video file exists and partition them by split tag.
pub fn filter_manifest(
    manifest: &Manifest,
    index: &VideoIndex,
    n_classes: usize,
) -> FilteredManifest {
    let n_classes = effective_num_classes(n_classes);

    let mut train = vec![];
    let mut test = vec![];
    let mut classes = IndexSet::new();
    let mut total = 0;
    let mut missing = 0;

    for entry in manifest.entries.iter().take(n_classes) {
        if !classes.insert(entry.gloss.clone()) {
            warn!("duplicated gloss '{}' in manifest", entry.gloss);
        }

        for instance in &entry.instances {
            total += 1;

            if !index.contains(&instance.video_id) {
                missing += 1;
                continue;
            }

            let item = Instance {
                gloss: entry.gloss.clone(),
                video_id: instance.video_id.clone(),
                bbox: instance.bbox,
            };

            match instance.split() {
                Split::Train => train.push(item),
                Split::NonTrain => test.push(item),
            }
        }
    }

    let found = total - missing;
    info!("{}/{} videos found.", found, total);

    FilteredManifest {
        train,
        test,
        classes,
        summary: FilterSummary {
            total,
            found,
            missing,
        },
    }
}
