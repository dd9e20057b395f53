use crate::{common::*, manifest::video_file_name};

/// The set of file names in the video directory, listed once.
#[derive(Debug, Clone)]
pub struct VideoIndex {
    dir: PathBuf,
    files: HashSet<OsString>,
}

impl VideoIndex {
    /// List the video directory.
    ///
    /// It fails if the directory does not exist or cannot be read.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let files: HashSet<_> = fs::read_dir(dir)
            .with_context(|| format!("failed to list video directory '{}'", dir.display()))?
            .map(|entry| -> Result<_> { Ok(entry?.file_name()) })
            .try_collect()
            .with_context(|| format!("failed to list video directory '{}'", dir.display()))?;
        debug!("found {} files in '{}'", files.len(), dir.display());

        Ok(Self {
            dir: dir.to_owned(),
            files,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if `{video_id}.mp4` was present at scan time.
    pub fn contains(&self, video_id: &str) -> bool {
        self.files.contains(OsStr::new(&video_file_name(video_id)))
    }

    pub fn video_path(&self, video_id: &str) -> PathBuf {
        self.dir.join(video_file_name(video_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_index_test() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("00001.mp4"), b"").unwrap();
        fs::write(dir.path().join("00002.avi"), b"").unwrap();

        let index = VideoIndex::scan(dir.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.contains("00001"));
        assert!(!index.contains("00002"));
        assert!(!index.contains("00003"));
        assert_eq!(index.video_path("00001"), dir.path().join("00001.mp4"));

        // the listing is a snapshot
        fs::write(dir.path().join("00003.mp4"), b"").unwrap();
        assert!(!index.contains("00003"));
    }

    #[test]
    fn video_index_missing_dir_test() {
        let dir = tempfile::tempdir().unwrap();
        assert!(VideoIndex::scan(dir.path().join("missing")).is_err());
    }
}
