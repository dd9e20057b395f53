use sign_dataset::{
    effective_num_classes, filter_manifest, instances_to_json, Manifest, VideoIndex, MAX_CLASSES,
};
use std::path::{Path, PathBuf};

lazy_static::lazy_static! {
    static ref DATASET_DIR: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("wlasl_mini");
    static ref MANIFEST_FILE: PathBuf = DATASET_DIR.join("manifest.json");
    static ref VIDEO_DIR: PathBuf = DATASET_DIR.join("videos");
}

fn load() -> (Manifest, VideoIndex) {
    let manifest = Manifest::open(&*MANIFEST_FILE).unwrap();
    let index = VideoIndex::scan(&*VIDEO_DIR).unwrap();
    (manifest, index)
}

fn video_ids(instances: &[sign_dataset::Instance]) -> Vec<&str> {
    instances
        .iter()
        .map(|instance| instance.video_id.as_str())
        .collect()
}

#[test]
fn two_classes_with_one_missing_video() {
    let (manifest, index) = load();
    let filtered = filter_manifest(&manifest, &index, 2);

    assert_eq!(filtered.summary.total, 4);
    assert_eq!(filtered.summary.found, 3);
    assert_eq!(filtered.summary.missing, 1);
    assert_eq!(filtered.train.len() + filtered.test.len(), 3);
    assert_eq!(video_ids(&filtered.train), ["00001", "00003"]);
    assert_eq!(video_ids(&filtered.test), ["00002"]);
    assert_eq!(
        filtered.classes.iter().collect::<Vec<_>>(),
        ["book", "drink"]
    );
    assert_eq!(filtered.train[1].gloss, "drink");
}

#[test]
fn class_count_is_clamped() {
    assert_eq!(effective_num_classes(5000), MAX_CLASSES);

    let (manifest, index) = load();
    let filtered = filter_manifest(&manifest, &index, 5000);

    // the manifest has fewer classes than the clamp
    assert_eq!(filtered.classes.len(), manifest.num_classes());
    assert_eq!(filtered.summary.total, manifest.num_instances());
    assert_eq!(video_ids(&filtered.test), ["00002", "00005"]);
}

#[test]
fn survivors_match_existing_files() {
    let (manifest, index) = load();

    for n_classes in 0..=4 {
        let filtered = filter_manifest(&manifest, &index, n_classes);
        let expect: usize = manifest
            .entries
            .iter()
            .take(n_classes)
            .flat_map(|entry| &entry.instances)
            .filter(|instance| index.contains(&instance.video_id))
            .count();
        let total: usize = manifest
            .entries
            .iter()
            .take(n_classes)
            .map(|entry| entry.instances.len())
            .sum();

        assert_eq!(filtered.train.len() + filtered.test.len(), expect);
        assert_eq!(filtered.summary.total, total);
        assert_eq!(filtered.summary.missing, total - expect);
        assert_eq!(filtered.classes.len(), n_classes.min(manifest.num_classes()));
    }
}

#[test]
fn filtering_is_idempotent() {
    let (manifest, index) = load();
    let first = filter_manifest(&manifest, &index, 100);
    let second = filter_manifest(&manifest, &index, 100);

    assert_eq!(first, second);
    assert_eq!(
        instances_to_json(&first.train).unwrap(),
        instances_to_json(&second.train).unwrap()
    );
    assert_eq!(
        instances_to_json(&first.test).unwrap(),
        instances_to_json(&second.test).unwrap()
    );
}

#[test]
fn missing_video_dir_is_fatal() {
    assert!(VideoIndex::scan(DATASET_DIR.join("no_such_dir")).is_err());
}
