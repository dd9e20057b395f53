//! Signer bounding boxes.

use crate::common::*;
use opencv::core as core_cv;

/// Bounding box in pixel units, stored in the manifest's `[x1, y1, x2, y2]` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl BoundingBox {
    pub fn from_x1y1x2y2(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        ensure!(
            x1.is_finite() && y1.is_finite() && x2.is_finite() && y2.is_finite(),
            "bounding box coordinates must be finite"
        );
        Ok(Self { x1, y1, x2, y2 })
    }

    pub fn x1y1x2y2(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    pub fn t(&self) -> f64 {
        self.y1.min(self.y2)
    }

    pub fn l(&self) -> f64 {
        self.x1.min(self.x2)
    }

    pub fn b(&self) -> f64 {
        self.y1.max(self.y2)
    }

    pub fn r(&self) -> f64 {
        self.x1.max(self.x2)
    }

    pub fn h(&self) -> f64 {
        self.b() - self.t()
    }

    pub fn w(&self) -> f64 {
        self.r() - self.l()
    }

    /// Crops the box to a frame of the given size.
    ///
    /// Returns `None` if nothing of the box is left inside the frame.
    pub fn clamp_to_frame(&self, frame_h: usize, frame_w: usize) -> Option<PixelRect> {
        let frame_h = frame_h as f64;
        let frame_w = frame_w as f64;

        let t = self.t().floor().clamp(0.0, frame_h);
        let l = self.l().floor().clamp(0.0, frame_w);
        let b = self.b().ceil().clamp(0.0, frame_h);
        let r = self.r().ceil().clamp(0.0, frame_w);

        (b > t && r > l).then(|| PixelRect {
            t: t as usize,
            l: l as usize,
            h: (b - t) as usize,
            w: (r - l) as usize,
        })
    }
}

impl Serialize for BoundingBox {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // integral coordinates are written as integers
        let mut seq = serializer.serialize_seq(Some(4))?;
        for value in self.x1y1x2y2() {
            if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                seq.serialize_element(&(value as i64))?;
            } else {
                seq.serialize_element(&value)?;
            }
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for BoundingBox {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [x1, y1, x2, y2] = <[f64; 4]>::deserialize(deserializer)?;
        Self::from_x1y1x2y2(x1, y1, x2, y2).map_err(|err| D::Error::custom(format!("{:#}", err)))
    }
}

/// Integer rectangle inside a frame, in TLHW layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub t: usize,
    pub l: usize,
    pub h: usize,
    pub w: usize,
}

impl From<&PixelRect> for core_cv::Rect {
    fn from(from: &PixelRect) -> Self {
        Self {
            x: from.l as i32,
            y: from.t as i32,
            width: from.w as i32,
            height: from.h as i32,
        }
    }
}

impl From<PixelRect> for core_cv::Rect {
    fn from(from: PixelRect) -> Self {
        (&from).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_keeps_integer_spelling() {
        let bbox: BoundingBox = serde_json::from_str("[385, 37, 885.5, 720]").unwrap();
        assert_eq!(bbox.x1y1x2y2(), [385.0, 37.0, 885.5, 720.0]);
        assert_eq!(serde_json::to_string(&bbox).unwrap(), "[385,37,885.5,720]");
    }

    #[test]
    fn bbox_drops_decimal_point_of_integral_values() {
        // "385.0" comes back as "385", so only the value round-trips
        let bbox: BoundingBox = serde_json::from_str("[385.0, 37, 885.0, 720.25]").unwrap();
        assert_eq!(serde_json::to_string(&bbox).unwrap(), "[385,37,885,720.25]");
    }

    #[test]
    fn bbox_rejects_wrong_arity() {
        assert!(serde_json::from_str::<BoundingBox>("[1, 2, 3]").is_err());
    }

    #[test]
    fn bbox_clamp_to_frame() {
        let bbox = BoundingBox::from_x1y1x2y2(-10.0, 20.0, 700.0, 500.2).unwrap();
        let rect = bbox.clamp_to_frame(480, 640).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                t: 20,
                l: 0,
                h: 460,
                w: 640
            }
        );

        let outside = BoundingBox::from_x1y1x2y2(700.0, 0.0, 800.0, 100.0).unwrap();
        assert!(outside.clamp_to_frame(480, 640).is_none());
    }

    #[test]
    fn bbox_swapped_corners() {
        let bbox = BoundingBox::from_x1y1x2y2(50.0, 60.0, 10.0, 20.0).unwrap();
        assert_eq!((bbox.t(), bbox.l(), bbox.h(), bbox.w()), (20.0, 10.0, 40.0, 40.0));
    }
}
