//! Inflated Inception 3D (I3D) video backbone on top of `tch`.

mod common;

pub mod conv_bn_3d;
pub mod i3d;
pub mod inception_3d;
pub mod weights;

pub use conv_bn_3d::*;
pub use i3d::*;
pub use inception_3d::*;
pub use weights::*;
