//! Tera rendering engine: [`ManifestKind`] and [`TemplateEngine`].
//!
//! | Kind           | Template                      | Output path                  |
//! |----------------|-------------------------------|------------------------------|
//! | Project        | `manifest/project.csproj.tera`| `<root>/<unit>.csproj`       |
//! | Solution       | `manifest/workspace.sln.tera` | `<root>/<workspace>.sln`     |
//! | EditorSettings | `editor/settings.json.tera`   | `<root>/.vscode/settings.json`|

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tera::Tera;

use crate::buffer::{BufferPool, PooledBuffer};
use crate::error::{io_err, RenderError};

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    (
        "manifest/project.csproj.tera",
        include_str!("templates/project.csproj.tera"),
    ),
    (
        "manifest/workspace.sln.tera",
        include_str!("templates/workspace.sln.tera"),
    ),
    (
        "editor/settings.json.tera",
        include_str!("templates/settings.json.tera"),
    ),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        tracing::debug!("template override: {name}");
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(
            normalize_template_name(Path::new(name)),
            (*content).to_string(),
        );
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates.into_iter().collect::<Vec<_>>())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// ManifestKind
// ---------------------------------------------------------------------------

/// Every file the engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    /// Per-unit project manifest.
    Project,
    /// Aggregate workspace manifest.
    Solution,
    /// Companion editor settings, written once.
    EditorSettings,
}

impl ManifestKind {
    pub fn all() -> &'static [ManifestKind] {
        &[
            ManifestKind::Project,
            ManifestKind::Solution,
            ManifestKind::EditorSettings,
        ]
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            ManifestKind::Project => "manifest/project.csproj.tera",
            ManifestKind::Solution => "manifest/workspace.sln.tera",
            ManifestKind::EditorSettings => "editor/settings.json.tera",
        }
    }

    /// Companion settings path, relative to the workspace root.
    pub fn editor_settings_path(root: &Path) -> PathBuf {
        root.join(".vscode").join("settings.json")
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ManifestKind::Project => "project",
            ManifestKind::Solution => "solution",
            ManifestKind::EditorSettings => "editor-settings",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine for rendering manifests with optional user overrides.
///
/// `user_template_dir` may contain `.tera` files that override the embedded
/// defaults, named like them (`manifest/project.csproj.tera`, ...). Template
/// names are normalised to lowercase relative paths.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render `kind` into a freshly checked-out pooled buffer.
    pub fn render_to_buffer<'pool>(
        &self,
        kind: ManifestKind,
        ctx: &tera::Context,
        pool: &'pool BufferPool,
    ) -> Result<PooledBuffer<'pool>, RenderError> {
        let mut buffer = pool.checkout();
        self.tera.render_to(kind.template_name(), ctx, &mut *buffer)?;
        Ok(buffer)
    }

    /// Render `kind` to a `String`.
    pub fn render(&self, kind: ManifestKind, ctx: &tera::Context) -> Result<String, RenderError> {
        Ok(self.tera.render(kind.template_name(), ctx)?)
    }
}

impl fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("templates", &self.tera.get_template_names().count())
            .finish()
    }
}
