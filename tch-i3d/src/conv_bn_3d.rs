use crate::common::*;

/// Initializer of the 3D convolution unit.
#[derive(Debug, Clone)]
pub struct ConvBn3DInit {
    pub ksize: [usize; 3],
    pub stride: [usize; 3],
    pub padding: [usize; 3],
    pub bias: bool,
    pub batch_norm: bool,
    pub relu: bool,
    pub ws_init: nn::Init,
    pub bs_init: nn::Init,
}

impl ConvBn3DInit {
    pub fn new(ksize: usize) -> Self {
        Self::new_3d([ksize; 3])
    }

    pub fn new_3d(ksize: [usize; 3]) -> Self {
        Self {
            ksize,
            stride: [1; 3],
            padding: [ksize[0] / 2, ksize[1] / 2, ksize[2] / 2],
            bias: false,
            batch_norm: true,
            relu: true,
            ws_init: nn::Init::KaimingUniform,
            bs_init: nn::Init::Const(0.0),
        }
    }

    pub fn build<'a>(
        self,
        path: impl Borrow<nn::Path<'a>>,
        in_dim: usize,
        out_dim: usize,
    ) -> Result<ConvBn3D> {
        let Self {
            ksize,
            stride,
            padding,
            bias,
            batch_norm,
            relu,
            ws_init,
            bs_init,
        } = self;

        ensure!(in_dim > 0 && out_dim > 0, "in_dim and out_dim must be positive");
        ensure!(
            ksize.iter().all(|&size| size > 0) && stride.iter().all(|&step| step > 0),
            "ksize and stride must be positive"
        );

        let path = path.borrow();
        let in_dim = in_dim as i64;
        let out_dim = out_dim as i64;

        let weight = {
            let conv = path / "conv";
            let size: Vec<i64> = [out_dim, in_dim]
                .into_iter()
                .chain(ksize.iter().map(|&size| size as i64))
                .collect();
            conv.var("weight", &size, ws_init)
        };
        let bias = bias.then(|| (path / "conv").var("bias", &[out_dim], bs_init));
        let bn = batch_norm.then(|| {
            nn::batch_norm3d(
                path / "bn",
                out_dim,
                nn::BatchNormConfig {
                    eps: 1e-3,
                    momentum: 0.01,
                    ..Default::default()
                },
            )
        });

        Ok(ConvBn3D {
            stride: stride.iter().map(|&step| step as i64).collect(),
            padding: padding.iter().map(|&pad| pad as i64).collect(),
            weight,
            bias,
            bn,
            relu,
        })
    }
}

/// Convolution followed by optional batch normalization and ReLU.
#[derive(Debug)]
pub struct ConvBn3D {
    stride: Vec<i64>,
    padding: Vec<i64>,
    weight: Tensor,
    bias: Option<Tensor>,
    bn: Option<nn::BatchNorm>,
    relu: bool,
}

impl nn::ModuleT for ConvBn3D {
    fn forward_t(&self, input: &Tensor, train: bool) -> Tensor {
        let Self {
            ref stride,
            ref padding,
            ref weight,
            ref bias,
            ref bn,
            relu,
        } = *self;

        let xs = input.convolution(
            weight,
            bias.as_ref(),
            stride,
            padding,
            &[1, 1, 1],
            false,
            &[0, 0, 0],
            1,
        );
        let xs = match bn {
            Some(bn) => bn.forward_t(&xs, train),
            None => xs,
        };

        if relu {
            xs.relu()
        } else {
            xs
        }
    }
}
