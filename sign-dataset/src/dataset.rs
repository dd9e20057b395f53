//! The clip dataset and its ordered loading streams.

use crate::{
    common::*,
    loader::ClipLoader,
    manifest::Instance,
    record::{ClipBatch, ClipRecord},
};

/// The dataset of video instances decoded on demand.
#[derive(Debug)]
pub struct ClipDataset {
    instances: Vec<Instance>,
    loader: Arc<dyn ClipLoader>,
}

impl ClipDataset {
    /// Build a dataset.
    ///
    /// Every instance gloss must be listed in `classes`.
    pub fn new(
        instances: Vec<Instance>,
        classes: &IndexSet<String>,
        loader: Arc<dyn ClipLoader>,
    ) -> Result<Self> {
        if let Some(instance) = instances
            .iter()
            .find(|instance| !classes.contains(&instance.gloss))
        {
            bail!(
                "the gloss '{}' of video '{}' is not in the class list",
                instance.gloss,
                instance.video_id
            );
        }

        Ok(Self { instances, loader })
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn num_records(&self) -> usize {
        self.instances.len()
    }

    /// Load the nth record in the dataset.
    ///
    /// It blocks on video decoding.
    pub fn nth(&self, index: usize) -> Result<ClipRecord> {
        let instance = self
            .instances
            .get(index)
            .ok_or_else(|| format_err!("invalid index {}", index))?;

        let clip = self
            .loader
            .load(instance)
            .with_context(|| format!("failed to load video '{}'", instance.video_id))?;

        Ok(ClipRecord {
            index,
            video_id: instance.video_id.clone(),
            gloss: instance.gloss.clone(),
            clip,
        })
    }

    /// Load records in dataset order.
    ///
    /// Up to `num_workers` videos are decoded ahead of the consumer on
    /// blocking threads. The output order matches the dataset order.
    pub fn stream(
        self: Arc<Self>,
        num_workers: usize,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<ClipRecord>> + Send>>> {
        ensure!(num_workers > 0, "num_workers must be positive");

        let dataset = self;
        let num_records = dataset.num_records();
        let stream = stream::iter(0..num_records).par_map(num_workers, move |index| {
            let dataset = dataset.clone();
            move || dataset.nth(index)
        });

        Ok(Box::pin(stream))
    }

    /// Load records in dataset order grouped into batches.
    ///
    /// The last batch is smaller if the dataset size is not a multiple of
    /// `batch_size`.
    pub fn batches(
        self: Arc<Self>,
        batch_size: usize,
        num_workers: usize,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<ClipBatch>> + Send>>> {
        ensure!(batch_size > 0, "batch_size must be positive");

        let stream = self
            .stream(num_workers)?
            .chunks(batch_size)
            .map(|results| {
                let records: Vec<_> = results.into_iter().try_collect()?;
                ClipBatch::from_records(records)
            });

        Ok(Box::pin(stream))
    }
}

/// The class list in order of first appearance.
pub fn classes_from_instances<'a>(
    instances: impl IntoIterator<Item = &'a Instance>,
) -> IndexSet<String> {
    instances
        .into_iter()
        .map(|instance| instance.gloss.clone())
        .collect()
}
