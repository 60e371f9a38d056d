//! Post-process transform registry.
//!
//! Callers register text transforms per [`ManifestKind`]. Every rendered
//! manifest of that kind passes through the matching transforms, in
//! registration order, before it is committed. Transforms run on worker
//! threads, so they must be `Send + Sync`.

use std::fmt;
use std::path::Path;

use manifestor_renderer::{ManifestKind, PooledBuffer, RenderError};

type Transform = Box<dyn Fn(&Path, String) -> String + Send + Sync>;

#[derive(Default)]
pub struct PostProcessRegistry {
    transforms: Vec<(ManifestKind, Transform)>,
}

impl PostProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform for manifests of `kind`.
    pub fn register<F>(&mut self, kind: ManifestKind, transform: F)
    where
        F: Fn(&Path, String) -> String + Send + Sync + 'static,
    {
        self.transforms.push((kind, Box::new(transform)));
    }

    pub fn has_transforms_for(&self, kind: ManifestKind) -> bool {
        self.transforms.iter().any(|(k, _)| *k == kind)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Run every transform registered for `kind` over `buffer`, in place.
    pub fn apply(
        &self,
        kind: ManifestKind,
        path: &Path,
        buffer: &mut PooledBuffer<'_>,
    ) -> Result<(), RenderError> {
        if !self.has_transforms_for(kind) {
            return Ok(());
        }
        let bytes = std::mem::take(&mut **buffer);
        let mut text = String::from_utf8(bytes).map_err(|_| RenderError::InvalidUtf8 {
            path: path.to_path_buf(),
        })?;
        for (_, transform) in self.transforms.iter().filter(|(k, _)| *k == kind) {
            text = transform(path, text);
        }
        **buffer = text.into_bytes();
        Ok(())
    }
}

impl fmt::Debug for PostProcessRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<ManifestKind> = self.transforms.iter().map(|(k, _)| *k).collect();
        f.debug_struct("PostProcessRegistry")
            .field("transforms", &kinds)
            .finish()
    }
}
