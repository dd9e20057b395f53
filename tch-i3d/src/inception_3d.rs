use crate::{
    common::*,
    conv_bn_3d::{ConvBn3D, ConvBn3DInit},
};

/// Initializer of the 3D inception block.
///
/// The fields are output channels of the four branches: a 1x1x1
/// convolution, two 1x1x1 to 3x3x3 reductions, and a max pooling followed
/// by a 1x1x1 convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Inception3DInit {
    pub b0: usize,
    pub b1: [usize; 2],
    pub b2: [usize; 2],
    pub b3: usize,
}

impl Inception3DInit {
    pub const fn new(channels: [usize; 6]) -> Self {
        let [b0, b1a, b1b, b2a, b2b, b3] = channels;
        Self {
            b0,
            b1: [b1a, b1b],
            b2: [b2a, b2b],
            b3,
        }
    }

    pub fn out_dim(&self) -> usize {
        self.b0 + self.b1[1] + self.b2[1] + self.b3
    }

    pub fn build<'a>(self, path: impl Borrow<nn::Path<'a>>, in_dim: usize) -> Result<Inception3D> {
        let path = path.borrow();
        let Self { b0, b1, b2, b3 } = self;

        Ok(Inception3D {
            b0: ConvBn3DInit::new(1).build(path / "b0", in_dim, b0)?,
            b1a: ConvBn3DInit::new(1).build(path / "b1a", in_dim, b1[0])?,
            b1b: ConvBn3DInit::new(3).build(path / "b1b", b1[0], b1[1])?,
            b2a: ConvBn3DInit::new(1).build(path / "b2a", in_dim, b2[0])?,
            b2b: ConvBn3DInit::new(3).build(path / "b2b", b2[0], b2[1])?,
            b3b: ConvBn3DInit::new(1).build(path / "b3b", in_dim, b3)?,
        })
    }
}

#[derive(Debug)]
pub struct Inception3D {
    b0: ConvBn3D,
    b1a: ConvBn3D,
    b1b: ConvBn3D,
    b2a: ConvBn3D,
    b2b: ConvBn3D,
    b3b: ConvBn3D,
}

impl nn::ModuleT for Inception3D {
    fn forward_t(&self, input: &Tensor, train: bool) -> Tensor {
        let Self {
            b0,
            b1a,
            b1b,
            b2a,
            b2b,
            b3b,
        } = self;

        let y0 = b0.forward_t(input, train);
        let y1 = b1b.forward_t(&b1a.forward_t(input, train), train);
        let y2 = b2b.forward_t(&b2a.forward_t(input, train), train);
        let y3 = {
            let pooled = input.max_pool3d(&[3, 3, 3], &[1, 1, 1], &[1, 1, 1], &[1, 1, 1], false);
            b3b.forward_t(&pooled, train)
        };

        Tensor::cat(&[y0, y1, y2, y3], 1)
    }
}
