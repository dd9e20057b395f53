use crate::{
    common::*,
    model::Backbone,
    table::{FeatureRow, FeatureTable},
};

/// Run the backbone over the dataset in batches and collect one row per
/// video.
///
/// Glosses are resolved through `glosses` by video id. The backbone is
/// returned after the pass.
pub async fn extract_features(
    dataset: Arc<ClipDataset>,
    mut backbone: Backbone,
    glosses: &HashMap<String, String>,
    device: Device,
    batch_size: usize,
    num_workers: usize,
) -> Result<(Backbone, FeatureTable)> {
    let total = dataset.instances().len();
    let mut batches = dataset.batches(batch_size, num_workers)?;
    let mut table: Option<FeatureTable> = None;
    let mut rate_counter = RateCounter::with_second_interval();
    let mut next_index = 0;

    while let Some(batch) = batches.try_next().await? {
        ensure!(
            batch.indexes.first() == Some(&next_index),
            "expect a batch starting at record {}, but get {:?}",
            next_index,
            batch.indexes
        );
        let batch_len = batch.len();
        next_index += batch_len;

        let (backbone_, batch, features) = tokio::task::spawn_blocking(move || -> Result<_> {
            let batch = batch.to_device(device);
            let features = tch::no_grad(|| -> Result<_> {
                let features = backbone.forward(&batch.clips)?;
                Ok(features.to_device(Device::Cpu).to_kind(Kind::Float))
            })?;
            Ok((backbone, batch, features))
        })
        .await??;
        backbone = backbone_;
        let ClipBatch {
            video_ids,
            glosses: batch_glosses,
            ..
        } = batch;

        let (num_rows, dim) = match *features.size() {
            [num_rows, dim] => (num_rows as usize, dim as usize),
            ref size => bail!("invalid embedding shape {:?}", size),
        };
        ensure!(dim > 0, "the backbone returns empty embeddings");
        ensure!(
            num_rows == batch_len,
            "expect {} embeddings, but get {}",
            batch_len,
            num_rows
        );

        let table = table.get_or_insert_with(|| FeatureTable::new(dim));
        let values = Vec::<f32>::from(&features.contiguous().view([-1]));

        let rows = video_ids
            .into_iter()
            .zip_eq(batch_glosses)
            .zip_eq(values.chunks(dim));

        for ((video_id, batch_gloss), chunk) in rows {
            let gloss = glosses
                .get(&video_id)
                .ok_or_else(|| format_err!("video '{}' is not in the manifest", video_id))?
                .clone();
            ensure!(
                gloss == batch_gloss,
                "video '{}' is labeled '{}' in the manifest, but loaded as '{}'",
                video_id,
                gloss,
                batch_gloss
            );
            table.push(FeatureRow {
                video_id,
                gloss,
                features: chunk.to_vec(),
            })?;
        }

        rate_counter.add(batch_len as f64);
        if let Some(rate) = rate_counter.rate() {
            info!(
                "extracted {}/{} videos, {:.2} videos/s",
                table.len(),
                total,
                rate
            );
        }
    }

    let table = table.unwrap_or_else(|| FeatureTable::new(0));
    info!("extracted features of {} videos", table.len());
    Ok((backbone, table))
}
