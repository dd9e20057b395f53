pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use itertools::Itertools as _;
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{borrow::Borrow, collections::HashMap, path::Path};
pub use tch::{
    nn::{self, ModuleT as _},
    Device, Kind, Tensor,
};
pub use tracing::{info, warn};

pub type Fallible<T> = Result<T, Error>;
