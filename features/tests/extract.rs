use anyhow::Result;
use noisy_float::prelude::*;
use semver::Version;
use sign_dataset::{save_instances, BoundingBox, ClipLoader, ClipTransform, Instance};
use std::{collections::HashMap, path::Path, sync::Arc};
use tch::{nn, Device, Tensor};
use tch_i3d::{I3dInit, FEATURE_DIM};
use wlasl_features::config::{
    Config, DatasetConfig, InferenceConfig, ModelConfig, OutputConfig,
};

/// Produces random clips.
#[derive(Debug)]
struct RandomLoader {
    transform: ClipTransform,
}

impl ClipLoader for RandomLoader {
    fn load(&self, _instance: &Instance) -> Result<Tensor> {
        Ok(Tensor::rand(
            &self.transform.clip_shape(),
            tch::kind::FLOAT_CPU,
        ) * 2.0
            - 1.0)
    }
}

fn instances() -> Vec<Instance> {
    (1..=5)
        .map(|id| Instance {
            gloss: if id % 2 == 0 { "book" } else { "drink" }.to_string(),
            video_id: format!("{:05}", id),
            bbox: BoundingBox::from_x1y1x2y2(0.0, 0.0, 64.0, 64.0).unwrap(),
        })
        .collect()
}

fn config(dir: &Path, num_classes: usize, batch_size: usize) -> Config {
    let weights_file = dir.join("i3d.ot");
    let vs = nn::VarStore::new(Device::Cpu);
    let _model = I3dInit::new(num_classes).build(&vs.root()).unwrap();
    vs.save(&weights_file).unwrap();

    let manifest_file = dir.join("train_2.json");
    save_instances(&manifest_file, &instances()).unwrap();

    Config {
        version: Version::new(0, 1, 0),
        dataset: DatasetConfig {
            manifest_file,
            video_dir: dir.join("videos"),
            classes_file: None,
            transform: ClipTransform {
                num_frames: 8,
                frame_size: 64,
                crop_to_bbox: false,
            },
        },
        model: ModelConfig::I3d {
            weights_file,
            num_classes: None,
            dropout: r64(0.5),
        },
        inference: InferenceConfig {
            batch_size: batch_size.try_into().unwrap(),
            num_workers: 2usize.try_into().unwrap(),
            device: Device::Cpu,
        },
        output: OutputConfig {
            train_file: dir.join("features").join("train.csv"),
            val_file: dir.join("features").join("val.csv"),
            val_ratio: r64(0.2),
            seed: Some(3),
        },
    }
}

fn read_rows(path: &Path) -> Vec<(String, String, usize)> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader.headers().unwrap().clone();
    assert_eq!(header.len(), FEATURE_DIM + 2);
    assert_eq!(&header[0], "feature_0");
    assert_eq!(&header[FEATURE_DIM], "video_id");
    assert_eq!(&header[FEATURE_DIM + 1], "gloss");

    reader
        .records()
        .map(|record| {
            let record = record.unwrap();
            (
                record[FEATURE_DIM].to_string(),
                record[FEATURE_DIM + 1].to_string(),
                record.len(),
            )
        })
        .collect()
}

#[tokio::test]
async fn extracts_every_video_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(config(dir.path(), 2, 2));
    let loader = Arc::new(RandomLoader {
        transform: config.dataset.transform,
    });

    let summary = wlasl_features::run(config.clone(), loader).await.unwrap();
    assert_eq!(summary.dim, FEATURE_DIM);
    assert_eq!(summary.num_train, 4);
    assert_eq!(summary.num_val, 1);

    let expect: HashMap<_, _> = instances()
        .into_iter()
        .map(|instance| (instance.video_id, instance.gloss))
        .collect();

    let mut rows = read_rows(&config.output.train_file);
    rows.extend(read_rows(&config.output.val_file));
    assert_eq!(rows.len(), expect.len());

    let mut seen = HashMap::new();
    for (video_id, gloss, len) in rows {
        assert_eq!(len, FEATURE_DIM + 2);
        assert_eq!(expect[&video_id], gloss);
        assert!(seen.insert(video_id, gloss).is_none());
    }
}

#[tokio::test]
async fn rejects_mismatched_weights() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path(), 7, 2);
    config.model = match config.model {
        ModelConfig::I3d {
            weights_file,
            dropout,
            ..
        } => ModelConfig::I3d {
            weights_file,
            num_classes: Some(2),
            dropout,
        },
        model => model,
    };
    let loader = Arc::new(RandomLoader {
        transform: config.dataset.transform,
    });

    let result = wlasl_features::run(Arc::new(config), loader).await;
    assert!(result.is_err());
    assert!(!dir.path().join("features").exists());
}
