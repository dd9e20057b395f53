//! Misc utilities.

use crate::common::*;

/// Load a newline separated class names file.
pub fn load_classes_file(path: impl AsRef<Path>) -> Result<IndexSet<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read classes file '{}'", path.display()))?;
    let lines: Vec<_> = content.lines().collect();
    let classes: IndexSet<_> = lines.iter().cloned().map(ToOwned::to_owned).collect();
    ensure!(
        lines.len() == classes.len(),
        "duplicated class names found in '{}'",
        path.display()
    );
    ensure!(
        !classes.is_empty(),
        "no classes found in '{}'",
        path.display()
    );
    Ok(classes)
}

/// Write class names joined by newlines, without a trailing newline.
pub fn save_classes_file<'a>(
    path: impl AsRef<Path>,
    classes: impl IntoIterator<Item = &'a String>,
) -> Result<()> {
    let path = path.as_ref();
    let text = classes.into_iter().join("\n");
    fs::write(path, text)
        .with_context(|| format!("failed to write classes file '{}'", path.display()))?;
    Ok(())
}

/// Counts events and reports the rate once per interval.
#[derive(Debug)]
pub struct RateCounter {
    count: f64,
    instant: Instant,
    interval: Duration,
}

impl RateCounter {
    pub fn new(interval: Duration) -> Self {
        Self {
            count: 0.0,
            instant: Instant::now(),
            interval,
        }
    }

    pub fn with_second_interval() -> Self {
        Self::new(Duration::from_secs(1))
    }

    pub fn add(&mut self, addition: f64) {
        self.count += addition;
    }

    pub fn rate(&mut self) -> Option<f64> {
        let elapsed = self.instant.elapsed();
        if elapsed >= self.interval {
            let rate = self.count / elapsed.as_secs_f64();
            self.count = 0.0;
            self.instant = Instant::now();
            Some(rate)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_file_test() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classnames_2.txt");
        let classes: IndexSet<String> = ["book", "drink"].iter().map(|s| s.to_string()).collect();

        save_classes_file(&path, &classes).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "book\ndrink");
        assert_eq!(load_classes_file(&path).unwrap(), classes);
    }

    #[test]
    fn duplicated_classes_test() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.txt");
        fs::write(&path, "book\nbook").unwrap();
        assert!(load_classes_file(&path).is_err());
    }

    #[test]
    fn rate_counter_test() {
        let mut counter = RateCounter::new(Duration::from_secs(3600));
        counter.add(5.0);
        assert!(counter.rate().is_none());

        let mut counter = RateCounter::new(Duration::ZERO);
        counter.add(5.0);
        let rate = counter.rate().unwrap();
        assert!(rate > 0.0);
    }
}
