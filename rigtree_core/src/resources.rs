//! Mesh resource resolution
//!
//! The tree builder only knows normalized mesh paths. Turning a path into
//! something the engine can instantiate is delegated to a [`MeshResolver`];
//! a `None` answer drops the primitive and never aborts the build.

use std::path::{Path, PathBuf};

/// Opaque reference to a resolved mesh
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeshHandle {
    location: PathBuf,
}

impl MeshHandle {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }
}

/// Resolves normalized mesh paths to loadable resources
pub trait MeshResolver {
    fn resolve(&self, path: &str) -> Option<MeshHandle>;
}

impl<F> MeshResolver for F
where
    F: Fn(&str) -> Option<MeshHandle>,
{
    fn resolve(&self, path: &str) -> Option<MeshHandle> {
        self(path)
    }
}

/// Resolves meshes relative to a base directory, requiring the file to exist
#[derive(Debug, Clone)]
pub struct FsMeshResolver {
    base_path: PathBuf,
}

impl FsMeshResolver {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Map a mesh reference to a filesystem path without touching the disk
    pub fn locate(&self, filename: &str) -> PathBuf {
        if let Some(relative) = filename.strip_prefix("package://") {
            self.base_path.join(relative)
        } else if let Some(absolute) = filename.strip_prefix("file://") {
            PathBuf::from(absolute)
        } else {
            self.base_path.join(filename)
        }
    }
}

impl MeshResolver for FsMeshResolver {
    fn resolve(&self, path: &str) -> Option<MeshHandle> {
        if path.is_empty() {
            return None;
        }
        let location = self.locate(path);
        if location.is_file() {
            Some(MeshHandle::new(location))
        } else {
            tracing::debug!("Mesh not found on disk: {}", location.display());
            None
        }
    }
}

/// Accepts every non-empty path as-is; for inspection without mesh assets
#[derive(Debug, Clone, Copy, Default)]
pub struct PathOnlyResolver;

impl MeshResolver for PathOnlyResolver {
    fn resolve(&self, path: &str) -> Option<MeshHandle> {
        (!path.is_empty()).then(|| MeshHandle::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_handles_uri_schemes() {
        let resolver = FsMeshResolver::new("/robots/meshes");
        assert_eq!(
            resolver.locate("package://g1/pelvis.glb"),
            PathBuf::from("/robots/meshes/g1/pelvis.glb")
        );
        assert_eq!(resolver.locate("file:///tmp/a.glb"), PathBuf::from("/tmp/a.glb"));
        assert_eq!(resolver.locate("pelvis.glb"), PathBuf::from("/robots/meshes/pelvis.glb"));
    }

    #[test]
    fn test_fs_resolver_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pelvis.glb"), b"glTF").unwrap();

        let resolver = FsMeshResolver::new(dir.path());
        let handle = resolver.resolve("pelvis.glb").unwrap();
        assert_eq!(handle.location(), dir.path().join("pelvis.glb"));

        assert!(resolver.resolve("knee.glb").is_none());
        assert!(resolver.resolve("").is_none());
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |path: &str| path.ends_with(".glb").then(|| MeshHandle::new(path));
        assert!(resolver.resolve("a.glb").is_some());
        assert!(resolver.resolve("a.STL").is_none());
    }

    #[test]
    fn test_path_only_resolver() {
        assert!(PathOnlyResolver.resolve("anything").is_some());
        assert!(PathOnlyResolver.resolve("").is_none());
    }
}
