//! Template contexts: serializable rendering payloads for each manifest kind.
//!
//! Every string in a context is final manifest text. Escaping happens during
//! path resolution, and identifiers arrive already wrapped in braces so the
//! templates never need `{{{`.

use serde::{Deserialize, Serialize};

use manifestor_core::{ExclusionSet, UnitName};

use crate::error::RenderError;
use crate::identifier::{identifier, UnitIdentifier};
use crate::paths::ResolvedUnit;

/// Appended to every search-path list so the consumer keeps its own defaults.
pub const SEARCH_PATH_PLACEHOLDER: &str = "$(AssemblySearchPaths)";

/// Tool-kind identifier of C# projects in the aggregate manifest.
pub const CSHARP_TOOL_KIND: &str = "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}";

/// The single build configuration declared by the aggregate manifest.
pub const CONFIGURATION: &str = "Debug|Any CPU";

// ---------------------------------------------------------------------------
// Project manifest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectContext {
    pub lang_version: String,
    /// `True` / `False`.
    pub allow_unsafe: String,
    #[serde(default)]
    pub nullable: Option<String>,
    pub output_path: String,
    pub assembly_search_paths: String,
    pub define_constants: String,
    pub project_guid: String,
    pub assembly_name: String,
    pub compile_items: Vec<String>,
    /// Binary references, then excluded dependencies.
    pub references: Vec<String>,
    pub project_references: Vec<ProjectReferenceCtx>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectReferenceCtx {
    pub file_name: String,
    pub guid: String,
    pub name: String,
}

impl ProjectContext {
    /// Assemble the context of one unit.
    ///
    /// `dependencies` are the unit's declared `unit_references`; each one is
    /// either a plain reference (when excluded) or a project reference.
    pub fn build(
        resolved: &ResolvedUnit,
        dependencies: &[UnitName],
        exclusions: &ExclusionSet,
        workspace_name: &str,
        output_path: &str,
    ) -> Self {
        let mut references = resolved.reference_names.clone();
        let mut project_references = Vec::new();
        for (dependency, encoded) in dependencies.iter().zip(&resolved.dependency_names) {
            if exclusions.contains(dependency) {
                references.push(encoded.clone());
            } else {
                project_references.push(ProjectReferenceCtx {
                    file_name: format!("{encoded}.csproj"),
                    guid: identifier(workspace_name, dependency.as_str()).braced(),
                    name: encoded.clone(),
                });
            }
        }

        let mut search_paths = resolved.search_paths.clone();
        search_paths.push(SEARCH_PATH_PLACEHOLDER.to_string());

        ProjectContext {
            lang_version: resolved.lang_version.clone(),
            allow_unsafe: if resolved.allow_unsafe { "True" } else { "False" }.to_string(),
            nullable: resolved.nullable.clone(),
            output_path: output_path.to_string(),
            assembly_search_paths: search_paths.join(";"),
            define_constants: resolved.defines.join(";"),
            project_guid: identifier(workspace_name, resolved.name.as_str()).braced(),
            assembly_name: resolved.assembly_name.clone(),
            compile_items: resolved.compile_items.clone(),
            references,
            project_references,
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

// ---------------------------------------------------------------------------
// Aggregate manifest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionContext {
    pub tool_kind: String,
    pub configuration: String,
    pub projects: Vec<SolutionProjectCtx>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SolutionProjectCtx {
    pub name: String,
    pub file_name: String,
    pub guid: String,
}

impl SolutionContext {
    /// One entry per generated unit, in the order given.
    pub fn from_identifiers(units: &[UnitIdentifier]) -> Self {
        SolutionContext {
            tool_kind: CSHARP_TOOL_KIND.to_string(),
            configuration: CONFIGURATION.to_string(),
            projects: units
                .iter()
                .map(|u| SolutionProjectCtx {
                    name: u.name.to_string(),
                    file_name: format!("{}.csproj", u.name),
                    guid: u.guid.braced(),
                })
                .collect(),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

// ---------------------------------------------------------------------------
// Companion editor settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSettingsContext {
    /// JSON string literal, quotes included.
    pub solution_file: String,
}

impl EditorSettingsContext {
    pub fn new(workspace_name: &str) -> Result<Self, RenderError> {
        Ok(EditorSettingsContext {
            solution_file: serde_json::to_string(&format!("{workspace_name}.sln"))?,
        })
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}
