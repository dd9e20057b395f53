//! Filters the WLASL manifest against the video directory, drops videos
//! that fail to decode and persists the result.

mod common;

use crate::common::*;

/// Options of a verification run.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// The WLASL manifest file.
    pub json_path: PathBuf,
    /// The directory of `{video_id}.mp4` files.
    pub video_root: PathBuf,
    /// The directory the output files are written to.
    pub output_folder: PathBuf,
    /// The requested number of classes. It names the output files as given.
    pub n_classes: usize,
    /// The number of videos decoded in parallel.
    pub num_workers: usize,
    pub transform: ClipTransform,
}

/// The paths of the three output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub train_file: PathBuf,
    pub test_file: PathBuf,
    pub classes_file: PathBuf,
}

impl OutputFiles {
    pub fn new(output_folder: impl AsRef<Path>, n_classes: usize) -> Self {
        let dir = output_folder.as_ref();
        Self {
            train_file: dir.join(format!("train_{}.json", n_classes)),
            test_file: dir.join(format!("test_{}.json", n_classes)),
            classes_file: dir.join(format!("classnames_{}.txt", n_classes)),
        }
    }
}

/// Counts of a verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifySummary {
    pub filter: FilterSummary,
    pub num_classes: usize,
    pub num_train: usize,
    pub num_test: usize,
    pub files: OutputFiles,
}

/// Run the pipeline with the OpenCV video decoder.
pub async fn start(options: VerifyOptions) -> Result<VerifySummary> {
    let loader = VideoClipLoader::new(&options.video_root, options.transform)?;
    run(&options, Arc::new(loader)).await
}

/// Run filter, verification and persistence with the given clip loader.
///
/// Nothing is written until both splits are verified.
pub async fn run(options: &VerifyOptions, loader: Arc<dyn ClipLoader>) -> Result<VerifySummary> {
    let VerifyOptions {
        ref json_path,
        ref video_root,
        ref output_folder,
        n_classes,
        num_workers,
        ..
    } = *options;

    let manifest = Manifest::open(json_path)?;
    let index = VideoIndex::scan(video_root)?;
    info!(
        "loaded {} classes from '{}', {} files in '{}'",
        manifest.num_classes(),
        json_path.display(),
        index.len(),
        video_root.display()
    );

    let FilteredManifest {
        train,
        test,
        classes,
        summary,
    } = filter_manifest(&manifest, &index, n_classes);

    info!("verifying {} train videos", train.len());
    let train = verify_split(train, &classes, &loader, num_workers).await?;
    info!("verifying {} test videos", test.len());
    let test = verify_split(test, &classes, &loader, num_workers).await?;

    let files = OutputFiles::new(output_folder, n_classes);
    save_outputs(&files, &train, &test, &classes)?;

    Ok(VerifySummary {
        filter: summary,
        num_classes: classes.len(),
        num_train: train.len(),
        num_test: test.len(),
        files,
    })
}

async fn verify_split(
    instances: Vec<Instance>,
    classes: &IndexSet<String>,
    loader: &Arc<dyn ClipLoader>,
    num_workers: usize,
) -> Result<Vec<Instance>> {
    let dataset = ClipDataset::new(instances, classes, loader.clone())?;
    verify_instances(Arc::new(dataset), num_workers).await
}

fn save_outputs(
    files: &OutputFiles,
    train: &[Instance],
    test: &[Instance],
    classes: &IndexSet<String>,
) -> Result<()> {
    let OutputFiles {
        train_file,
        test_file,
        classes_file,
    } = files;

    if let Some(dir) = train_file.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory '{}'", dir.display()))?;
    }

    save_instances(train_file, train)?;
    save_instances(test_file, test)?;
    save_classes_file(classes_file, classes)?;

    info!(
        "saved {} train and {} test videos of {} classes to '{}', '{}' and '{}'",
        train.len(),
        test.len(),
        classes.len(),
        train_file.display(),
        test_file.display(),
        classes_file.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_files_test() {
        let files = OutputFiles::new("data/raw", 5000);
        assert_eq!(files.train_file, Path::new("data/raw/train_5000.json"));
        assert_eq!(files.test_file, Path::new("data/raw/test_5000.json"));
        assert_eq!(files.classes_file, Path::new("data/raw/classnames_5000.txt"));
    }
}
