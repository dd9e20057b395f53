//! The WLASL manifest format and the filtered instance lists.

use crate::{bbox::BoundingBox, common::*};

/// The raw class-to-instance manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Read and parse a manifest file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest file '{}'", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("failed to parse manifest file '{}'", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let manifest = serde_json::from_str(text)?;
        Ok(manifest)
    }

    pub fn num_classes(&self) -> usize {
        self.entries.len()
    }

    pub fn num_instances(&self) -> usize {
        self.entries.iter().map(|entry| entry.instances.len()).sum()
    }
}

/// One class of the manifest with its video instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub gloss: String,
    pub instances: Vec<ManifestInstance>,
}

/// A video instance as listed in the manifest.
///
/// Other instance attributes of the corpus, such as frame ranges and signer
/// ids, are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestInstance {
    pub video_id: String,
    pub bbox: BoundingBox,
    pub split: String,
}

impl ManifestInstance {
    pub fn split(&self) -> Split {
        Split::from_tag(&self.split)
    }
}

/// The split tag collapsed to train and everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    NonTrain,
}

impl Split {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "train" => Self::Train,
            _ => Self::NonTrain,
        }
    }
}

/// A labeled video reference that survived filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub gloss: String,
    pub video_id: String,
    pub bbox: BoundingBox,
}

impl Instance {
    pub fn video_file_name(&self) -> String {
        video_file_name(&self.video_id)
    }
}

/// The file name of a video in the video directory.
pub fn video_file_name(video_id: &str) -> String {
    format!("{}.mp4", video_id)
}

/// Load a JSON array of instances.
pub fn load_instances(path: impl AsRef<Path>) -> Result<Vec<Instance>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read instance file '{}'", path.display()))?;
    let instances = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse instance file '{}'", path.display()))?;
    Ok(instances)
}

/// Serialize instances as a JSON array indented by four spaces.
pub fn instances_to_json(instances: &[Instance]) -> Result<Vec<u8>> {
    let mut buf = vec![];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    instances.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write instances to a JSON file.
pub fn save_instances(path: impl AsRef<Path>, instances: &[Instance]) -> Result<()> {
    let path = path.as_ref();
    let bytes = instances_to_json(instances)?;
    fs::write(path, bytes)
        .with_context(|| format!("failed to write instance file '{}'", path.display()))?;
    Ok(())
}
