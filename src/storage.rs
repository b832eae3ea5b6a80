//! Read-only storage that resolves a filename to a stream.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufReader, Cursor, Read},
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use log::debug;

use crate::error::AnalysisError;

pub type InputStream = Box<dyn Read + Send>;

pub trait Storage: Send + Sync {
    /// Opens `filename` for reading, or fails with [`AnalysisError::NotFound`].
    fn open(&self, filename: &str) -> Result<InputStream, AnalysisError>;
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn open(&self, filename: &str) -> Result<InputStream, AnalysisError> {
        (**self).open(filename)
    }
}

impl<S: Storage + ?Sized> Storage for &S {
    fn open(&self, filename: &str) -> Result<InputStream, AnalysisError> {
        (**self).open(filename)
    }
}

/// Files stored under a single root directory.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let relative = Path::new(filename);
        let mut components = relative.components().peekable();
        components.peek()?;
        if !components.all(|component| matches!(component, Component::Normal(_))) {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl Storage for DirectoryStorage {
    fn open(&self, filename: &str) -> Result<InputStream, AnalysisError> {
        let not_found = || AnalysisError::NotFound {
            filename: filename.to_string(),
        };
        let Some(path) = self.resolve(filename) else {
            debug!("Rejected storage name {filename:?}");
            return Err(not_found());
        };
        if !path.is_file() {
            return Err(not_found());
        }
        match File::open(&path) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(not_found()),
            Err(err) => Err(AnalysisError::Io(err)),
        }
    }
}

/// Named in-memory buffers, used for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: HashMap<String, Arc<[u8]>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files
            .insert(filename.into(), Arc::from(contents.into().into_boxed_slice()));
    }

    pub fn with_file(mut self, filename: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(filename, contents);
        self
    }
}

impl Storage for MemoryStorage {
    fn open(&self, filename: &str) -> Result<InputStream, AnalysisError> {
        self.files
            .get(filename)
            .map(|bytes| Box::new(Cursor::new(Arc::clone(bytes))) as InputStream)
            .ok_or_else(|| AnalysisError::NotFound {
                filename: filename.to_string(),
            })
    }
}
