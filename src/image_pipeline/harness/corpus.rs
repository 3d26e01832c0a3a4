use std::path::{Path, PathBuf};

use crate::image_pipeline::common::error::{IspError, Result};

/// Extension of the raw vectors picked up by [`Corpus::discover`].
pub const RAW_EXTENSION: &str = "raw";

/// One raw input of the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVector {
    /// File stem, used as the vector's name in reports
    pub name: String,
    pub path: PathBuf,
}

impl TestVector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub vectors: Vec<TestVector>,
}

impl Corpus {
    /// Every `*.raw` file directly inside `dir`, sorted by name.
    pub fn discover(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| IspError::InputRead {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut vectors = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_raw = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(RAW_EXTENSION));
            if is_raw && path.is_file() {
                vectors.push(TestVector::new(path));
            }
        }
        vectors.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(Self { vectors })
    }

    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            vectors: paths.into_iter().map(TestVector::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_raw_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.raw", "a.raw", "c.RAW", "notes.txt", "a.rgb"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.raw")).unwrap();

        let corpus = Corpus::discover(dir.path()).unwrap();
        let names: Vec<&str> = corpus.vectors.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_directory_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Corpus::discover(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, IspError::InputRead { .. }));
    }
}
