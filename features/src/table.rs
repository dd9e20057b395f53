//! The feature table and its CSV export.

use crate::common::*;

/// The embedding of one video.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub video_id: String,
    pub gloss: String,
    pub features: Vec<f32>,
}

/// Rows of fixed-length embeddings.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    dim: usize,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(dim: usize) -> Self {
        Self { dim, rows: vec![] }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: FeatureRow) -> Result<()> {
        ensure!(
            row.features.len() == self.dim,
            "expect {} features for video '{}', but get {}",
            self.dim,
            row.video_id,
            row.features.len()
        );
        self.rows.push(row);
        Ok(())
    }

    /// Shuffle the rows and split off `ceil(len * val_ratio)` rows as the
    /// validation table.
    ///
    /// The split is reproducible if `seed` is set.
    pub fn split(mut self, val_ratio: R64, seed: Option<u64>) -> Result<(Self, Self)> {
        let val_ratio = val_ratio.raw();
        ensure!(
            (0.0..=1.0).contains(&val_ratio),
            "val_ratio must be in range [0, 1], but get {}",
            val_ratio
        );

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.rows.shuffle(&mut rng);

        let num_rows = self.rows.len();
        let num_val = ((num_rows as f64 * val_ratio).ceil() as usize).min(num_rows);
        let val_rows = self.rows.split_off(num_rows - num_val);

        let val = Self {
            dim: self.dim,
            rows: val_rows,
        };
        Ok((self, val))
    }

    /// Write the table with a `feature_0..feature_{K-1},video_id,gloss`
    /// header. Parent directories are created.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory '{}'", dir.display()))?;
        }

        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("failed to create file '{}'", path.display()))?;

        let header = (0..self.dim)
            .map(|index| format!("feature_{}", index))
            .chain(["video_id".to_string(), "gloss".to_string()]);
        writer.write_record(header)?;

        for row in &self.rows {
            let FeatureRow {
                video_id,
                gloss,
                features,
            } = row;
            let record = features
                .iter()
                .map(|value| value.to_string())
                .chain([video_id.clone(), gloss.clone()]);
            writer.write_record(record)?;
        }

        writer
            .flush()
            .with_context(|| format!("failed to write file '{}'", path.display()))?;
        Ok(())
    }
}

/// Map each video to its gloss.
pub fn gloss_map<'a>(instances: impl IntoIterator<Item = &'a Instance>) -> HashMap<String, String> {
    instances
        .into_iter()
        .map(|instance| (instance.video_id.clone(), instance.gloss.clone()))
        .collect()
}
