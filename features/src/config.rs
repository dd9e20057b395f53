use crate::common::*;

pub use dataset::*;
pub use inference::*;
pub use model::*;
pub use output::*;

/// Accepted configuration versions, `^0.1`.
pub static CONFIG_VERSION: Lazy<VersionReq> = Lazy::new(|| VersionReq {
    comparators: vec![Comparator {
        op: Op::Caret,
        major: 0,
        minor: Some(1),
        patch: None,
        pre: Prerelease::EMPTY,
    }],
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_version")]
    pub version: Version,
    pub dataset: DatasetConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        Self::from_json5(&text)
    }

    pub fn from_json5(text: &str) -> Result<Self> {
        let config: Self = json5::from_str(text)?;

        let val_ratio = config.output.val_ratio.raw();
        ensure!(
            (0.0..=1.0).contains(&val_ratio),
            "output.val_ratio must be in range [0, 1], but get {}",
            val_ratio
        );
        ensure!(
            config.dataset.transform.num_frames > 0 && config.dataset.transform.frame_size > 0,
            "dataset.transform.num_frames and dataset.transform.frame_size must be positive"
        );

        Ok(config)
    }
}

mod dataset {
    use super::*;

    /// Input video options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DatasetConfig {
        /// The JSON array of verified instances.
        pub manifest_file: PathBuf,
        /// The directory of `{video_id}.mp4` files.
        pub video_dir: PathBuf,
        /// Optional newline separated class names. The class order of the
        /// manifest is used if it is not set.
        pub classes_file: Option<PathBuf>,
        #[serde(default)]
        pub transform: ClipTransform,
    }
}

mod model {
    use super::*;

    /// Backbone options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(tag = "type")]
    pub enum ModelConfig {
        /// The native Inception-3D backbone.
        I3d {
            weights_file: PathBuf,
            /// The size of the logits layer in the weights file. It defaults
            /// to the number of classes of the dataset.
            num_classes: Option<usize>,
            #[serde(default = "default_dropout")]
            dropout: R64,
        },
        /// A scripted module returning an `(embedding, logits)` tuple.
        TorchScript { module_file: PathBuf },
    }

    fn default_dropout() -> R64 {
        r64(0.5)
    }
}

mod inference {
    use super::*;

    const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(4) {
        Some(size) => size,
        None => unreachable!(),
    };
    const DEFAULT_NUM_WORKERS: NonZeroUsize = DEFAULT_BATCH_SIZE;

    /// Forward pass options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct InferenceConfig {
        #[serde(default = "default_batch_size")]
        pub batch_size: NonZeroUsize,
        /// The number of videos decoded in parallel.
        #[serde(default = "default_num_workers")]
        pub num_workers: NonZeroUsize,
        /// The device where the backbone runs on.
        #[serde(with = "tch_serde::serde_device", default = "default_device")]
        pub device: Device,
    }

    impl Default for InferenceConfig {
        fn default() -> Self {
            Self {
                batch_size: default_batch_size(),
                num_workers: default_num_workers(),
                device: default_device(),
            }
        }
    }

    fn default_batch_size() -> NonZeroUsize {
        DEFAULT_BATCH_SIZE
    }

    fn default_num_workers() -> NonZeroUsize {
        DEFAULT_NUM_WORKERS
    }

    fn default_device() -> Device {
        Device::cuda_if_available()
    }
}

mod output {
    use super::*;

    /// Feature table options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct OutputConfig {
        pub train_file: PathBuf,
        pub val_file: PathBuf,
        /// The ratio of rows in the validation split.
        #[serde(default = "default_val_ratio")]
        pub val_ratio: R64,
        /// Random seed of the split. It is drawn from entropy if not set.
        pub seed: Option<u64>,
    }

    fn default_val_ratio() -> R64 {
        r64(0.2)
    }
}

pub fn deserialize_version<'de, D>(deserializer: D) -> Result<Version, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let version = Version::parse(&text).map_err(|err| {
        D::Error::custom(format!(
            "failed to parse version number '{}': {:?}",
            text, err
        ))
    })?;

    if !CONFIG_VERSION.matches(&version) {
        return Err(D::Error::custom(format!(
            "incompatible version: get '{}', but it is incompatible with requirement '{}'",
            version, &*CONFIG_VERSION,
        )));
    }

    Ok(version)
}
