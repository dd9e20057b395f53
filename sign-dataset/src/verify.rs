//! Drops instances whose video does not decode.

use crate::{
    common::*,
    dataset::ClipDataset,
    manifest::Instance,
    utils::RateCounter,
};

/// Decode every instance once and keep those with a non-zero clip.
///
/// The output preserves the dataset order.
pub async fn verify_instances(
    dataset: Arc<ClipDataset>,
    num_workers: usize,
) -> Result<Vec<Instance>> {
    let total = dataset.num_records();
    let mut stream = dataset.clone().stream(num_workers)?;
    let mut verified = vec![];
    let mut next_index = 0;
    let mut rate_counter = RateCounter::with_second_interval();

    while let Some(record) = stream.try_next().await? {
        ensure!(
            record.index == next_index,
            "expect record {}, but get record {}",
            next_index,
            record.index
        );
        next_index += 1;

        if record.is_degenerate() {
            debug!("video '{}' decodes to an empty clip", record.video_id);
        } else {
            verified.push(dataset.instances()[record.index].clone());
        }

        rate_counter.add(1.0);
        if let Some(rate) = rate_counter.rate() {
            info!("verified {}/{} videos, {:.2} videos/s", next_index, total, rate);
        }
    }

    ensure!(
        next_index == total,
        "expect {} records, but the stream ended after {}",
        total,
        next_index
    );

    info!(
        "Verification complete. {}/{} videos loaded successfully.",
        verified.len(),
        total
    );

    Ok(verified)
}
