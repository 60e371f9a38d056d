//! Path resolution stage: one [`UnitRecord`] in, manifest-ready text out.
//!
//! Source files become workspace-relative, `\`-separated, XML-escaped item
//! paths in declared order. References become a module name plus a
//! containing directory; directories are collected first-seen-first, without
//! duplicates, because earlier search-path entries take precedence for the
//! consumer. All text goes through one bounded [`Encoder`] per unit.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use manifestor_core::{UnitName, UnitRecord};

use crate::buffer::{BufferPool, Encoder, Separators};
use crate::error::RenderError;
use crate::reference_cache::ReferenceDirectoryCache;
use crate::response_file::ResponseFileOptions;

/// Shared, read-only inputs of the stage.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub workspace_root: &'a Path,
    pub pool: &'a BufferPool,
    pub reference_dirs: &'a ReferenceDirectoryCache,
}

/// A unit with every text field encoded for the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUnit {
    pub name: UnitName,
    /// Encoded unit name.
    pub assembly_name: String,
    /// Encoded names of `unit_references`, index-aligned with them.
    pub dependency_names: Vec<String>,
    pub compile_items: Vec<String>,
    pub reference_names: Vec<String>,
    pub search_paths: Vec<String>,
    pub defines: Vec<String>,
    pub lang_version: String,
    pub allow_unsafe: bool,
    pub nullable: Option<String>,
}

/// Resolve and encode everything the project manifest of `unit` needs.
pub fn resolve_unit(
    unit: &UnitRecord,
    request: &ResolveRequest<'_>,
) -> Result<ResolvedUnit, RenderError> {
    let root = request.workspace_root;
    let rsp = ResponseFileOptions::load_all(root, &unit.response_files)?;
    let mut encoder = Encoder::new(request.pool);
    let assembly_name = encoder.encode(unit.name.as_str(), Separators::Keep)?;
    let mut dependency_names = Vec::with_capacity(unit.unit_references.len());
    for dependency in &unit.unit_references {
        dependency_names.push(encoder.encode(dependency.as_str(), Separators::Keep)?);
    }

    let mut compile_items = Vec::with_capacity(unit.source_files.len());
    for source in &unit.source_files {
        let relative = relative_to_root(source, root)?;
        compile_items.push(encoder.encode(&relative.to_string_lossy(), Separators::Backslash)?);
    }

    let mut reference_names = Vec::new();
    let mut seen_names = HashSet::new();
    let mut search_paths = Vec::new();
    let mut seen_dirs = HashSet::new();
    for reference in unit.references.iter().chain(rsp.references.iter()) {
        let (name, dir) = split_reference(reference, root)?;
        if seen_names.insert(name.clone()) {
            reference_names.push(encoder.encode(&name, Separators::Keep)?);
        }
        let dir = dir.to_string_lossy().into_owned();
        if seen_dirs.insert(dir.clone()) {
            search_paths.push(encoder.encode(&dir, Separators::Keep)?);
        }
    }

    if let Some(level) = &unit.api_level {
        for dir in request.reference_dirs.directories(level).iter() {
            let dir = dir.to_string_lossy().into_owned();
            if seen_dirs.insert(dir.clone()) {
                search_paths.push(encoder.encode(&dir, Separators::Keep)?);
            }
        }
    }

    let mut defines = Vec::new();
    let mut seen_defines = HashSet::new();
    for define in unit.defines.iter().chain(rsp.defines.iter()) {
        if seen_defines.insert(define.as_str()) {
            defines.push(encoder.encode(define, Separators::Keep)?);
        }
    }

    let lang_version = rsp.lang_version.as_deref().unwrap_or(&unit.lang_version);
    let lang_version = encoder.encode(lang_version, Separators::Keep)?;
    let nullable = match &rsp.nullable {
        Some(value) => Some(encoder.encode(value, Separators::Keep)?),
        None => None,
    };

    Ok(ResolvedUnit {
        name: unit.name.clone(),
        assembly_name,
        dependency_names,
        compile_items,
        reference_names,
        search_paths,
        defines,
        lang_version,
        allow_unsafe: rsp.allow_unsafe.unwrap_or(unit.allow_unsafe),
        nullable,
    })
}

/// Express `path` relative to `root`, lexically normalized.
pub fn relative_to_root(path: &Path, root: &Path) -> Result<PathBuf, RenderError> {
    check_file_path(path)?;
    let relative = if path.is_absolute() {
        pathdiff::diff_paths(path, root).ok_or_else(|| RenderError::PathResolution {
            path: path.to_path_buf(),
            reason: "not reachable from the workspace root",
        })?
    } else {
        path.to_path_buf()
    };

    let normalized = normalize(&relative);
    if normalized.as_os_str().is_empty() {
        return Err(RenderError::PathResolution {
            path: path.to_path_buf(),
            reason: "names the workspace root, not a file",
        });
    }
    Ok(normalized)
}

/// Split a binary reference into (module name, containing directory).
/// Relative references are taken from the workspace root.
pub fn split_reference(path: &Path, root: &Path) -> Result<(String, PathBuf), RenderError> {
    check_file_path(path)?;
    let full = if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&root.join(path))
    };
    let name = full
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| RenderError::PathResolution {
            path: path.to_path_buf(),
            reason: "has no file name",
        })?;
    let dir = full.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok((name, dir))
}

fn check_file_path(path: &Path) -> Result<(), RenderError> {
    let raw = path.as_os_str().to_string_lossy();
    let reason = if raw.is_empty() {
        "empty path"
    } else if raw.ends_with('/') || raw.ends_with('\\') {
        "ends at a directory separator"
    } else {
        return Ok(());
    };
    Err(RenderError::PathResolution {
        path: path.to_path_buf(),
        reason,
    })
}

/// Drop `.` components and fold `..` into preceding normal components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifestor_core::GrowthPolicy;
    use tempfile::TempDir;

    struct Fixture {
        root: TempDir,
        pool: BufferPool,
        cache: ReferenceDirectoryCache,
    }

    impl Fixture {
        fn new() -> Self {
            let root = TempDir::new().unwrap();
            let cache = ReferenceDirectoryCache::new(Some(root.path().join("frameworks")));
            Fixture {
                root,
                pool: BufferPool::new(GrowthPolicy::default()),
                cache,
            }
        }

        fn request(&self) -> ResolveRequest<'_> {
            ResolveRequest {
                workspace_root: self.root.path(),
                pool: &self.pool,
                reference_dirs: &self.cache,
            }
        }
    }

    fn unit_with_sources(sources: &[&str]) -> UnitRecord {
        let mut unit = UnitRecord::new("Game.Core");
        unit.source_files = sources.iter().map(PathBuf::from).collect();
        unit
    }

    #[test]
    fn sources_keep_declared_order_and_use_backslashes() {
        let fx = Fixture::new();
        let abs = fx.root.path().join("Assets").join("Z.cs");
        let mut unit = unit_with_sources(&["Assets/B.cs", "./Assets/Sub/../A.cs"]);
        unit.source_files.push(abs);

        let resolved = resolve_unit(&unit, &fx.request()).unwrap();
        assert_eq!(
            resolved.compile_items,
            vec!["Assets\\B.cs", "Assets\\A.cs", "Assets\\Z.cs"]
        );
    }

    #[test]
    fn sources_outside_root_climb_with_parent_components() {
        let root = Path::new("/work/game");
        let rel = relative_to_root(Path::new("/work/shared/Lib.cs"), root).unwrap();
        assert_eq!(rel, PathBuf::from("../shared/Lib.cs"));
    }

    #[test]
    fn trailing_separator_is_a_resolution_failure() {
        let fx = Fixture::new();
        let unit = unit_with_sources(&["Assets/Scripts/"]);
        let err = resolve_unit(&unit, &fx.request()).unwrap_err();
        assert!(
            matches!(err, RenderError::PathResolution { reason, .. } if reason.contains("separator")),
            "got {err:?}"
        );
    }

    #[test]
    fn empty_and_root_paths_are_resolution_failures() {
        let root = Path::new("/work/game");
        assert!(relative_to_root(Path::new(""), root).is_err());
        assert!(relative_to_root(Path::new("Assets/.."), root).is_err());
        assert!(split_reference(Path::new("Libs\\"), root).is_err());
    }

    #[test]
    fn search_paths_are_unique_in_first_seen_order() {
        let fx = Fixture::new();
        let mut unit = unit_with_sources(&["a.cs"]);
        unit.references = vec![
            PathBuf::from("/engine/Managed/Engine.dll"),
            PathBuf::from("/packages/x/X.dll"),
            PathBuf::from("/engine/Managed/Engine.UI.dll"),
            PathBuf::from("/packages/x/X.Extra.dll"),
        ];

        let resolved = resolve_unit(&unit, &fx.request()).unwrap();
        assert_eq!(
            resolved.reference_names,
            vec!["Engine", "X", "Engine.UI", "X.Extra"]
        );
        assert_eq!(resolved.search_paths, vec!["/engine/Managed", "/packages/x"]);
    }

    #[test]
    fn response_files_override_unit_flags_and_extend_lists() {
        let fx = Fixture::new();
        std::fs::write(
            fx.root.path().join("csc.rsp"),
            "-unsafe\n-nullable:enable\n-define:EXTRA;DEBUG\n-r:Plugins/Native.dll\n",
        )
        .unwrap();
        let mut unit = unit_with_sources(&["a.cs"]);
        unit.defines = vec!["DEBUG".to_string(), "TRACE".to_string()];
        unit.response_files = vec![PathBuf::from("csc.rsp")];

        let resolved = resolve_unit(&unit, &fx.request()).unwrap();
        assert!(resolved.allow_unsafe);
        assert_eq!(resolved.nullable.as_deref(), Some("enable"));
        assert_eq!(resolved.defines, vec!["DEBUG", "TRACE", "EXTRA"]);
        assert_eq!(resolved.reference_names, vec!["Native"]);
        let plugins = fx.root.path().join("Plugins").to_string_lossy().into_owned();
        assert_eq!(resolved.search_paths, vec![plugins]);
    }

    #[test]
    fn api_level_appends_system_directories_after_references() {
        let fx = Fixture::new();
        let level = fx.root.path().join("frameworks").join("netstandard2.1");
        std::fs::create_dir_all(level.join("Facades")).unwrap();

        let mut unit = unit_with_sources(&["a.cs"]);
        unit.references = vec![PathBuf::from("/engine/Engine.dll")];
        unit.api_level = Some("netstandard2.1".to_string());

        let resolved = resolve_unit(&unit, &fx.request()).unwrap();
        assert_eq!(resolved.search_paths.len(), 3);
        assert_eq!(resolved.search_paths[0], "/engine");
        assert_eq!(resolved.search_paths[1], level.to_string_lossy());
        assert_eq!(resolved.search_paths[2], level.join("Facades").to_string_lossy());
    }

    #[test]
    fn oversized_path_aborts_with_encoding_overflow() {
        let root = TempDir::new().unwrap();
        let pool = BufferPool::new(GrowthPolicy {
            initial_capacity: 16,
            max_capacity: 32,
        });
        let cache = ReferenceDirectoryCache::new(None);
        let request = ResolveRequest {
            workspace_root: root.path(),
            pool: &pool,
            reference_dirs: &cache,
        };
        let long = format!("Assets/{}.cs", "n".repeat(64));
        let unit = unit_with_sources(&[long.as_str()]);

        let err = resolve_unit(&unit, &request).unwrap_err();
        assert!(matches!(err, RenderError::EncodingOverflow { capacity: 32, .. }));
        assert_eq!(pool.idle(), 1, "scratch buffer returned on failure");
    }
}
