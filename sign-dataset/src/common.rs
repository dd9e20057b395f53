pub use anyhow::{bail, ensure, format_err, Context as _, Result};
pub use futures::stream::{self, Stream, StreamExt as _, TryStreamExt as _};
pub use indexmap::IndexSet;
pub use itertools::Itertools as _;
pub use par_stream::prelude::*;
pub use serde::{
    de::Error as _, ser::SerializeSeq, Deserialize, Deserializer, Serialize, Serializer,
};
pub use std::{
    collections::HashSet,
    ffi::{OsStr, OsString},
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    pin::Pin,
    sync::Arc,
    time::{Duration, Instant},
};
pub use tch::{Device, Kind, Tensor};
pub use tch_tensor_like::TensorLike;
pub use tracing::{debug, info, warn};

unzip_n::unzip_n!(pub 4);
