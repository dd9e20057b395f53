//! The video clip loader.

use crate::{bbox::BoundingBox, common::*, manifest::Instance};
use opencv::{
    core::{self as core_cv, Mat},
    imgproc,
    prelude::*,
    videoio,
};

/// Clip decoding options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipTransform {
    /// The number of frames sampled from each video.
    pub num_frames: usize,
    /// The output frame height and width in pixels.
    pub frame_size: usize,
    /// If set, frames are cropped to the signer bounding box before resizing.
    #[serde(default)]
    pub crop_to_bbox: bool,
}

impl Default for ClipTransform {
    fn default() -> Self {
        Self {
            num_frames: 64,
            frame_size: 224,
            crop_to_bbox: false,
        }
    }
}

impl ClipTransform {
    /// The clip shape in `[channels, frames, height, width]` layout.
    pub fn clip_shape(&self) -> [i64; 4] {
        [
            3,
            self.num_frames as i64,
            self.frame_size as i64,
            self.frame_size as i64,
        ]
    }

    /// The clip that stands for a failed decode.
    pub fn zeros(&self) -> Tensor {
        Tensor::zeros(&self.clip_shape(), (Kind::Float, Device::Cpu))
    }

    fn check(&self) -> Result<()> {
        ensure!(self.num_frames > 0, "num_frames must be positive");
        ensure!(self.frame_size > 0, "frame_size must be positive");
        Ok(())
    }
}

/// Decodes the video of an instance into a clip tensor.
pub trait ClipLoader
where
    Self: Debug + Send + Sync,
{
    /// Load a `[3, T, H, W]` float clip with values in `[-1, 1]`.
    ///
    /// A video that cannot be decoded yields an all-zero clip rather than an
    /// error.
    fn load(&self, instance: &Instance) -> Result<Tensor>;
}

/// Frame indices that pick `num_frames` frames uniformly out of
/// `num_decoded` frames, repeating the last frame for short videos.
pub fn sample_frame_indices(num_decoded: usize, num_frames: usize) -> Vec<usize> {
    if num_decoded == 0 {
        return vec![];
    }

    if num_decoded >= num_frames {
        (0..num_frames)
            .map(|index| index * num_decoded / num_frames)
            .collect()
    } else {
        (0..num_frames)
            .map(|index| index.min(num_decoded - 1))
            .collect()
    }
}

/// Stack `[H, W, 3]` byte frames into a `[3, T, H, W]` float clip in
/// `[-1, 1]`, picking `num_frames` of them with [sample_frame_indices].
pub fn frames_to_clip(frames: &[Tensor], num_frames: usize) -> Result<Tensor> {
    ensure!(!frames.is_empty(), "no frames to stack");
    ensure!(num_frames > 0, "num_frames must be positive");

    let selected: Vec<_> = sample_frame_indices(frames.len(), num_frames)
        .into_iter()
        .map(|index| frames[index].shallow_clone())
        .collect();

    let clip = tch::no_grad(|| {
        // [T, H, W, C] bytes -> [C, T, H, W]
        Tensor::stack(&selected, 0)
            .permute(&[3, 0, 1, 2])
            .to_kind(Kind::Float)
            / 127.5
            - 1.0
    });
    Ok(clip)
}

/// The clip loader decoding `.mp4` files with OpenCV.
#[derive(Debug, Clone)]
pub struct VideoClipLoader {
    video_dir: PathBuf,
    transform: ClipTransform,
}

impl VideoClipLoader {
    /// Build a loader reading `{video_id}.mp4` files from `video_dir`.
    pub fn new(video_dir: impl AsRef<Path>, transform: ClipTransform) -> Result<Self> {
        transform.check()?;

        Ok(Self {
            video_dir: video_dir.as_ref().to_owned(),
            transform,
        })
    }

    fn decode_frames(&self, path: &Path, bbox: &BoundingBox) -> Result<Vec<Tensor>> {
        let path_str = path
            .to_str()
            .ok_or_else(|| format_err!("non UTF-8 path '{}'", path.display()))?;
        let mut capture = videoio::VideoCapture::from_file(path_str, videoio::CAP_ANY)?;
        ensure!(capture.is_opened()?, "unable to open the video");

        let mut frames = vec![];
        let mut frame = Mat::default();

        while capture.read(&mut frame)? {
            if frame.rows() <= 0 || frame.cols() <= 0 {
                break;
            }
            frames.push(self.preprocess_frame(&frame, bbox)?);
        }

        Ok(frames)
    }

    /// Crop, convert to RGB and resize a BGR frame into a `[H, W, 3]` byte tensor.
    fn preprocess_frame(&self, frame: &Mat, bbox: &BoundingBox) -> Result<Tensor> {
        let ClipTransform {
            frame_size,
            crop_to_bbox,
            ..
        } = self.transform;

        let cropped;
        let source = match crop_to_bbox
            .then(|| bbox.clamp_to_frame(frame.rows() as usize, frame.cols() as usize))
            .flatten()
        {
            Some(rect) => {
                cropped = Mat::roi(frame, rect.into())?;
                &cropped
            }
            None => frame,
        };

        let mut rgb = Mat::default();
        imgproc::cvt_color(source, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

        let mut resized = Mat::default();
        imgproc::resize(
            &rgb,
            &mut resized,
            core_cv::Size::new(frame_size as i32, frame_size as i32),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )?;

        let bytes = resized.data_bytes()?;
        let shape = [frame_size as i64, frame_size as i64, 3];
        ensure!(
            bytes.len() as i64 == shape.iter().product::<i64>(),
            "unexpected frame buffer size {}",
            bytes.len()
        );

        Ok(Tensor::of_data_size(bytes, &shape, Kind::Uint8))
    }
}

impl ClipLoader for VideoClipLoader {
    fn load(&self, instance: &Instance) -> Result<Tensor> {
        let path = self.video_dir.join(instance.video_file_name());

        let frames = match self.decode_frames(&path, &instance.bbox) {
            Ok(frames) => frames,
            Err(err) => {
                warn!("failed to decode '{}': {:#}", path.display(), err);
                vec![]
            }
        };

        if frames.is_empty() {
            warn!("no frames decoded from '{}'", path.display());
            return Ok(self.transform.zeros());
        }

        let clip = frames_to_clip(&frames, self.transform.num_frames)?;
        Ok(clip)
    }
}
