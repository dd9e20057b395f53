use crate::{common::*, config::ModelConfig};
use tch::{CModule, IValue};
use tch_i3d::{load_weights, I3d, I3dInit, I3dOutput};

/// The backbone adaptor for embedding extraction.
#[derive(Debug)]
pub enum Backbone {
    I3d {
        // keeps the variables alive
        #[allow(dead_code)]
        vs: nn::VarStore,
        model: I3d,
    },
    TorchScript {
        module: CModule,
    },
}

impl Backbone {
    /// Build the backbone on `device` and load its weights.
    ///
    /// `num_classes` is the logits size used when the config does not set one.
    pub fn load(config: &ModelConfig, num_classes: usize, device: Device) -> Result<Self> {
        let backbone = match *config {
            ModelConfig::I3d {
                ref weights_file,
                num_classes: logits_size,
                dropout,
            } => {
                let mut vs = nn::VarStore::new(device);
                let model = I3dInit {
                    dropout,
                    ..I3dInit::new(logits_size.unwrap_or(num_classes))
                }
                .build(&vs.root())?;
                load_weights(&mut vs, weights_file)?;
                vs.freeze();

                Self::I3d { vs, model }
            }
            ModelConfig::TorchScript { ref module_file } => {
                let module = CModule::load_on_device(module_file, device).with_context(|| {
                    format!("failed to load TorchScript module '{}'", module_file.display())
                })?;
                Self::TorchScript { module }
            }
        };

        Ok(backbone)
    }

    /// Compute `[B, K]` embeddings of `[B, 3, T, H, W]` clips.
    ///
    /// The logits output is discarded.
    pub fn forward(&self, clips: &Tensor) -> Result<Tensor> {
        let features = match self {
            Self::I3d { model, .. } => {
                let I3dOutput { features, .. } = model.forward_t(clips, false)?;
                features
            }
            Self::TorchScript { module } => {
                let output = module.forward_is(&[IValue::Tensor(clips.shallow_clone())])?;
                match output {
                    IValue::Tuple(values) => match values.into_iter().next() {
                        Some(IValue::Tensor(features)) => features,
                        _ => bail!("expect the first module output to be a tensor"),
                    },
                    IValue::Tensor(_) => {
                        bail!("expect an (embedding, logits) tuple, but the module returns a tensor")
                    }
                    _ => bail!("invalid module output type"),
                }
            }
        };

        let size = features.size();
        ensure!(
            size.len() == 2,
            "expect [batch, features] embedding shape, but get {:?}",
            size
        );
        Ok(features)
    }
}
