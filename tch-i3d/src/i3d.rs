//! The I3D backbone with an embedding output.

use crate::{
    common::*,
    conv_bn_3d::{ConvBn3D, ConvBn3DInit},
    inception_3d::{Inception3D, Inception3DInit},
};

/// The dimension of the pooled embedding.
pub const FEATURE_DIM: usize = 1024;

const MIXED_3: [Inception3DInit; 2] = [
    Inception3DInit::new([64, 96, 128, 16, 32, 32]),
    Inception3DInit::new([128, 128, 192, 32, 96, 64]),
];

const MIXED_4: [Inception3DInit; 5] = [
    Inception3DInit::new([192, 96, 208, 16, 48, 64]),
    Inception3DInit::new([160, 112, 224, 24, 64, 64]),
    Inception3DInit::new([128, 128, 256, 24, 64, 64]),
    Inception3DInit::new([112, 144, 288, 32, 64, 64]),
    Inception3DInit::new([256, 160, 320, 32, 128, 128]),
];

const MIXED_5: [Inception3DInit; 2] = [
    Inception3DInit::new([256, 160, 320, 32, 128, 128]),
    Inception3DInit::new([384, 192, 384, 48, 128, 128]),
];

/// I3D backbone initializer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I3dInit {
    pub num_classes: usize,
    #[serde(default = "default_in_channels")]
    pub in_channels: usize,
    /// Dropout probability before the logits layer.
    #[serde(default = "default_dropout")]
    pub dropout: R64,
}

impl I3dInit {
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            in_channels: default_in_channels(),
            dropout: default_dropout(),
        }
    }

    pub fn build<'a>(self, path: impl Borrow<nn::Path<'a>>) -> Result<I3d> {
        let path = path.borrow();
        let Self {
            num_classes,
            in_channels,
            dropout,
        } = self;

        ensure!(num_classes > 0, "num_classes must be positive");
        ensure!(
            (0.0..1.0).contains(&dropout.raw()),
            "dropout must be in range [0, 1)"
        );

        let conv_1a = ConvBn3DInit {
            stride: [2, 2, 2],
            ..ConvBn3DInit::new(7)
        }
        .build(path / "conv3d_1a_7x7", in_channels, 64)?;
        let conv_2b = ConvBn3DInit::new(1).build(path / "conv3d_2b_1x1", 64, 64)?;
        let conv_2c = ConvBn3DInit::new(3).build(path / "conv3d_2c_3x3", 64, 192)?;

        let (mixed_3, in_dim) = build_mixed(path, "mixed_3", &MIXED_3, 192)?;
        let (mixed_4, in_dim) = build_mixed(path, "mixed_4", &MIXED_4, in_dim)?;
        let (mixed_5, in_dim) = build_mixed(path, "mixed_5", &MIXED_5, in_dim)?;
        debug_assert_eq!(in_dim, FEATURE_DIM);

        let logits = ConvBn3DInit {
            bias: true,
            batch_norm: false,
            relu: false,
            ..ConvBn3DInit::new(1)
        }
        .build(path / "logits", FEATURE_DIM, num_classes)?;

        Ok(I3d {
            in_channels: in_channels as i64,
            num_classes: num_classes as i64,
            dropout: dropout.raw(),
            conv_1a,
            conv_2b,
            conv_2c,
            mixed_3,
            mixed_4,
            mixed_5,
            logits,
        })
    }
}

fn build_mixed<'a>(
    path: &nn::Path<'a>,
    prefix: &str,
    inits: &[Inception3DInit],
    in_dim: usize,
) -> Result<(Vec<Inception3D>, usize)> {
    inits
        .iter()
        .enumerate()
        .try_fold((vec![], in_dim), |(mut blocks, in_dim), (index, init)| {
            let name = format!("{}{}", prefix, (b'b' + index as u8) as char);
            let block = init.build(path / name, in_dim)?;
            blocks.push(block);
            Fallible::Ok((blocks, init.out_dim()))
        })
}

fn default_in_channels() -> usize {
    3
}

fn default_dropout() -> R64 {
    r64(0.5)
}

/// The output of [I3d].
#[derive(Debug)]
pub struct I3dOutput {
    /// Pooled embedding in `[B, 1024]` shape.
    pub features: Tensor,
    /// Class logits in `[B, num_classes]` shape.
    pub logits: Tensor,
}

/// The I3D backbone.
#[derive(Debug)]
pub struct I3d {
    in_channels: i64,
    num_classes: i64,
    dropout: f64,
    conv_1a: ConvBn3D,
    conv_2b: ConvBn3D,
    conv_2c: ConvBn3D,
    mixed_3: Vec<Inception3D>,
    mixed_4: Vec<Inception3D>,
    mixed_5: Vec<Inception3D>,
    logits: ConvBn3D,
}

impl I3d {
    /// Run the backbone on `[B, C, T, H, W]` clips.
    pub fn forward_t(&self, input: &Tensor, train: bool) -> Result<I3dOutput> {
        let size = input.size();
        ensure!(
            size.len() == 5 && size[1] == self.in_channels,
            "expect input shape [B, {}, T, H, W], but get {:?}",
            self.in_channels,
            size
        );

        let xs = self.conv_1a.forward_t(input, train);
        let xs = xs.max_pool3d(&[1, 3, 3], &[1, 2, 2], &[0, 1, 1], &[1, 1, 1], false);
        let xs = self.conv_2b.forward_t(&xs, train);
        let xs = self.conv_2c.forward_t(&xs, train);
        let xs = xs.max_pool3d(&[1, 3, 3], &[1, 2, 2], &[0, 1, 1], &[1, 1, 1], false);
        let xs = forward_blocks(&self.mixed_3, xs, train);
        let xs = xs.max_pool3d(&[3, 3, 3], &[2, 2, 2], &[1, 1, 1], &[1, 1, 1], false);
        let xs = forward_blocks(&self.mixed_4, xs, train);
        let xs = xs.max_pool3d(&[2, 2, 2], &[2, 2, 2], &[0, 0, 0], &[1, 1, 1], true);
        let xs = forward_blocks(&self.mixed_5, xs, train);

        let pooled = xs.adaptive_avg_pool3d(&[1, 1, 1]);
        let batch_size = pooled.size()[0];
        let features = pooled.view([batch_size, FEATURE_DIM as i64]);
        let logits = self
            .logits
            .forward_t(&pooled.dropout(self.dropout, train), train)
            .view([batch_size, self.num_classes]);

        Ok(I3dOutput { features, logits })
    }
}

fn forward_blocks(blocks: &[Inception3D], input: Tensor, train: bool) -> Tensor {
    blocks
        .iter()
        .fold(input, |xs, block| block.forward_t(&xs, train))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i3d_output_shape_test() {
        let vs = nn::VarStore::new(Device::Cpu);
        let model = I3dInit::new(5).build(&vs.root()).unwrap();

        let input = Tensor::rand(&[2, 3, 8, 64, 64], tch::kind::FLOAT_CPU);
        let I3dOutput { features, logits } =
            tch::no_grad(|| model.forward_t(&input, false)).unwrap();
        assert_eq!(features.size(), [2, FEATURE_DIM as i64]);
        assert_eq!(logits.size(), [2, 5]);
    }

    #[test]
    fn i3d_rejects_bad_input_test() {
        let vs = nn::VarStore::new(Device::Cpu);
        let model = I3dInit::new(5).build(&vs.root()).unwrap();

        let input = Tensor::rand(&[2, 1, 8, 64, 64], tch::kind::FLOAT_CPU);
        assert!(model.forward_t(&input, false).is_err());

        let input = Tensor::rand(&[3, 8, 64, 64], tch::kind::FLOAT_CPU);
        assert!(model.forward_t(&input, false).is_err());
    }

    #[test]
    fn i3d_init_deserialize_test() {
        let init: I3dInit = serde_json::from_str(r#"{"num_classes": 100}"#).unwrap();
        assert_eq!(init.num_classes, 100);
        assert_eq!(init.in_channels, 3);
        assert_eq!(init.dropout, r64(0.5));
    }
}
