use crate::common::*;

/// A loaded dataset item tagged with its identity.
#[derive(Debug)]
pub struct ClipRecord {
    /// The position of the item in the dataset.
    pub index: usize,
    pub video_id: String,
    pub gloss: String,
    /// The `[3, T, H, W]` clip tensor.
    pub clip: Tensor,
}

impl ClipRecord {
    /// Check if every element of the clip is zero, which marks a failed decode.
    pub fn is_degenerate(&self) -> bool {
        is_all_zero(&self.clip)
    }
}

/// A batch of loaded items in dataset order.
#[derive(Debug, TensorLike)]
pub struct ClipBatch {
    #[tensor_like(clone)]
    pub indexes: Vec<usize>,
    #[tensor_like(clone)]
    pub video_ids: Vec<String>,
    #[tensor_like(clone)]
    pub glosses: Vec<String>,
    /// Clips in `[B, 3, T, H, W]` shape.
    pub clips: Tensor,
}

impl ClipBatch {
    /// Stack a non-empty list of records into a batch.
    pub fn from_records(records: Vec<ClipRecord>) -> Result<Self> {
        ensure!(!records.is_empty(), "cannot build an empty batch");

        let (indexes, video_ids, glosses, clips) = records
            .into_iter()
            .map(|record| {
                let ClipRecord {
                    index,
                    video_id,
                    gloss,
                    clip,
                } = record;
                (index, video_id, gloss, clip)
            })
            .unzip_n_vec();

        let clips = Tensor::stack(&clips, 0);

        Ok(Self {
            indexes,
            video_ids,
            glosses,
            clips,
        })
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

pub fn is_all_zero(tensor: &Tensor) -> bool {
    tensor.numel() == 0 || f64::from(tensor.abs().max()) == 0.0
}
