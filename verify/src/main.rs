use anyhow::{ensure, Result};
use sign_dataset::ClipTransform;
use std::{env, path::PathBuf};
use structopt::StructOpt;
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};
use wlasl_verify::VerifyOptions;

#[derive(Debug, Clone, StructOpt)]
/// Filter the WLASL manifest and drop videos that fail to decode
struct Args {
    #[structopt(long = "json_path", default_value = "data/raw/WLASL_v0.3.json")]
    /// the WLASL manifest file
    pub json_path: PathBuf,
    #[structopt(long = "video_root", default_value = "data/raw/videos")]
    /// the directory of video files
    pub video_root: PathBuf,
    #[structopt(long = "output_folder", default_value = "data/raw")]
    /// the directory to write outputs
    pub output_folder: PathBuf,
    #[structopt(long = "n_classes", default_value = "100")]
    /// the number of classes to keep
    pub n_classes: usize,
    #[structopt(long = "num_workers", default_value = "4")]
    /// the number of videos decoded in parallel
    pub num_workers: usize,
    #[structopt(long = "num_frames", default_value = "64")]
    /// the number of frames sampled from each video
    pub num_frames: usize,
    #[structopt(long = "frame_size", default_value = "224")]
    /// the frame height and width after resizing
    pub frame_size: usize,
    #[structopt(long = "crop_to_bbox")]
    /// crop frames to the signer bounding box
    pub crop_to_bbox: bool,
}

#[tokio::main]
pub async fn main() -> Result<()> {
    // setup tracing
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).compact();
    let filter_layer = {
        let filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            filter.add_directive(LevelFilter::INFO.into())
        } else {
            filter
        }
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    // parse arguments
    let Args {
        json_path,
        video_root,
        output_folder,
        n_classes,
        num_workers,
        num_frames,
        frame_size,
        crop_to_bbox,
    } = Args::from_args();
    ensure!(num_workers > 0, "--num_workers must be positive");

    let options = VerifyOptions {
        json_path,
        video_root,
        output_folder,
        n_classes,
        num_workers,
        transform: ClipTransform {
            num_frames,
            frame_size,
            crop_to_bbox,
        },
    };

    wlasl_verify::start(options).await?;

    Ok(())
}
