//! Extracts backbone embeddings of verified WLASL videos into CSV tables.

mod common;
pub mod config;
pub mod extract;
pub mod model;
pub mod table;

use crate::{
    common::*,
    config::{Config, DatasetConfig, InferenceConfig, OutputConfig},
    extract::extract_features,
    model::Backbone,
    table::gloss_map,
};

/// Row counts of an extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    pub num_train: usize,
    pub num_val: usize,
    pub dim: usize,
}

/// Run the extraction with the OpenCV video decoder.
pub async fn start(config: Arc<Config>) -> Result<ExtractSummary> {
    let DatasetConfig {
        ref video_dir,
        transform,
        ..
    } = config.dataset;
    let loader = VideoClipLoader::new(video_dir, transform)?;
    run(config, Arc::new(loader)).await
}

/// Run the extraction with the given clip loader.
pub async fn run(config: Arc<Config>, loader: Arc<dyn ClipLoader>) -> Result<ExtractSummary> {
    let Config {
        dataset:
            DatasetConfig {
                ref manifest_file,
                ref classes_file,
                ..
            },
        inference:
            InferenceConfig {
                batch_size,
                num_workers,
                device,
            },
        output:
            OutputConfig {
                ref train_file,
                ref val_file,
                val_ratio,
                seed,
            },
        ..
    } = *config;

    // load dataset
    let instances = load_instances(manifest_file)?;
    let classes = match classes_file {
        Some(path) => load_classes_file(path)?,
        None => classes_from_instances(&instances),
    };
    let glosses = gloss_map(&instances);
    if glosses.len() != instances.len() {
        warn!(
            "'{}' lists {} instances but only {} distinct video ids",
            manifest_file.display(),
            instances.len(),
            glosses.len()
        );
    }
    info!(
        "loaded {} videos of {} classes from '{}'",
        instances.len(),
        classes.len(),
        manifest_file.display()
    );
    let num_classes = classes.len();
    let dataset = Arc::new(ClipDataset::new(instances, &classes, loader)?);

    // load model
    let backbone = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || Backbone::load(&config.model, num_classes, device))
            .await??
    };
    info!("backbone loaded on {:?}", device);

    // run inference
    let (_backbone, table) = extract_features(
        dataset,
        backbone,
        &glosses,
        device,
        batch_size.get(),
        num_workers.get(),
    )
    .await?;
    let dim = table.dim();

    // save tables
    let (train, val) = table.split(val_ratio, seed)?;
    train.write_csv(train_file)?;
    val.write_csv(val_file)?;
    info!(
        "saved {} train rows to '{}' and {} validation rows to '{}'",
        train.len(),
        train_file.display(),
        val.len(),
        val_file.display()
    );

    Ok(ExtractSummary {
        num_train: train.len(),
        num_val: val.len(),
        dim,
    })
}
