pub use anyhow::{bail, ensure, format_err, Context as _, Result};
pub use futures::stream::TryStreamExt as _;
pub use itertools::Itertools as _;
pub use noisy_float::prelude::*;
pub use once_cell::sync::Lazy;
pub use rand::{prelude::*, rngs::StdRng};
pub use semver::{Comparator, Op, Prerelease, Version, VersionReq};
pub use serde::{de::Error as DeserializeError, Deserialize, Deserializer, Serialize};
pub use sign_dataset::{
    classes_from_instances, load_instances, utils::load_classes_file, utils::RateCounter,
    ClipBatch, ClipDataset, ClipLoader, ClipTransform, Instance, VideoClipLoader,
};
pub use std::{
    collections::HashMap,
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};
pub use tch::{nn, Device, Kind, Tensor};
pub use tch_tensor_like::TensorLike;
pub use tracing::{info, warn};
