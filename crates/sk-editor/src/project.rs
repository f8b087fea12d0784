//! Project file service: whole-file reads and writes keyed by path.
//!
//! The dialect of a file follows its extension (see [`Dialect::from_path`]).

use sk_core::{CanvasSize, Dialect, ParseError, Scene};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no dialect for {} (expected .xml, .html, .css, .jsx or .tsx)", .0.display())]
    UnknownDialect(PathBuf),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Whole-file text storage.
pub trait FileStore {
    fn read(&self, path: &Path) -> Result<String, FileError>;
    fn write(&mut self, path: &Path, text: &str) -> Result<(), FileError>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileStore;

impl FileStore for FsFileStore {
    fn read(&self, path: &Path) -> Result<String, FileError> {
        std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FileError::NotFound(path.to_path_buf())
            } else {
                FileError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
    }

    fn write(&mut self, path: &Path, text: &str) -> Result<(), FileError> {
        std::fs::write(path, text).map_err(|source| FileError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// In-memory files, for tests and hosts that own storage themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    files: HashMap<PathBuf, String>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.insert(path.into(), text.into());
        self
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }
}

impl FileStore for MemoryFileStore {
    fn read(&self, path: &Path) -> Result<String, FileError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FileError::NotFound(path.to_path_buf()))
    }

    fn write(&mut self, path: &Path, text: &str) -> Result<(), FileError> {
        self.files.insert(path.to_path_buf(), text.to_string());
        Ok(())
    }
}

fn dialect_for(path: &Path) -> Result<Dialect, FileError> {
    Dialect::from_path(path).ok_or_else(|| FileError::UnknownDialect(path.to_path_buf()))
}

/// Read and parse a scene, reporting every failure.
pub fn try_load_scene(
    store: &dyn FileStore,
    path: &Path,
    canvas: CanvasSize,
) -> Result<Scene, FileError> {
    let dialect = dialect_for(path)?;
    let text = store.read(path)?;
    let parsed = dialect.parse(&text)?;
    log::debug!(
        "loaded {} shapes and {} texts from {}",
        parsed.shapes.len(),
        parsed.texts.len(),
        path.display()
    );
    Ok(Scene::from_parsed(parsed, canvas))
}

/// Read and parse a scene. Failures are logged and yield an empty scene.
pub fn load_scene(store: &dyn FileStore, path: &Path, canvas: CanvasSize) -> Scene {
    try_load_scene(store, path, canvas).unwrap_or_else(|e| {
        log::warn!("starting with an empty scene: {e}");
        Scene::new(canvas)
    })
}

/// Write `scene` in the dialect matching the path's extension.
pub fn save_scene(store: &mut dyn FileStore, path: &Path, scene: &Scene) -> Result<(), FileError> {
    let dialect = dialect_for(path)?;
    store.write(path, &dialect.generate(scene))?;
    log::debug!("saved {} to {}", dialect, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_core::{Rect, SceneMutation, Shape, ShapeKind};

    #[test]
    fn save_then_load_in_each_dialect() {
        let mut scene = Scene::new(CanvasSize::default());
        scene.apply(SceneMutation::AddShape(Shape::new(
            ShapeKind::Diamond,
            Rect::new(5, 5, 60, 60),
        )));

        let mut store = MemoryFileStore::new();
        for name in ["a.xml", "a.css", "a.jsx"] {
            let path = Path::new(name);
            save_scene(&mut store, path, &scene).unwrap();
            let loaded = load_scene(&store, path, CanvasSize::default());
            assert_eq!(loaded.shapes(), scene.shapes(), "{name}");
        }
    }

    #[test]
    fn failures_yield_empty_scene() {
        let store = MemoryFileStore::new().with_file("broken.xml", "<scene><shape");
        let canvas = CanvasSize::default();
        assert!(load_scene(&store, Path::new("broken.xml"), canvas).is_empty());
        assert!(load_scene(&store, Path::new("missing.css"), canvas).is_empty());
        assert!(matches!(
            try_load_scene(&store, Path::new("broken.xml"), canvas),
            Err(FileError::Parse(_))
        ));
        assert!(matches!(
            try_load_scene(&store, Path::new("missing.css"), canvas),
            Err(FileError::NotFound(_))
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let mut store = MemoryFileStore::new();
        let scene = Scene::new(CanvasSize::default());
        assert!(matches!(
            save_scene(&mut store, Path::new("notes.txt"), &scene),
            Err(FileError::UnknownDialect(_))
        ));
        assert_eq!(store.get(Path::new("notes.txt")), None);
    }
}
