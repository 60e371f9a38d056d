//! Project text synthesizer: one `.csproj` per included unit.

use manifestor_core::{ExclusionSet, UnitRecord};

use crate::buffer::{BufferPool, Encoder, PooledBuffer, Separators};
use crate::context::ProjectContext;
use crate::engine::{ManifestKind, TemplateEngine};
use crate::error::RenderError;
use crate::paths::ResolvedUnit;

/// Renders project manifests for one workspace.
///
/// Shared read-only by every synthesis task of a pass.
#[derive(Debug)]
pub struct ProjectTextSynthesizer<'a> {
    engine: &'a TemplateEngine,
    workspace_name: &'a str,
    output_path: String,
}

impl<'a> ProjectTextSynthesizer<'a> {
    pub fn new(
        engine: &'a TemplateEngine,
        workspace_name: &'a str,
        output_path: &str,
        pool: &BufferPool,
    ) -> Result<Self, RenderError> {
        let output_path = Encoder::new(pool).encode(output_path, Separators::Keep)?;
        Ok(ProjectTextSynthesizer {
            engine,
            workspace_name,
            output_path,
        })
    }

    pub fn context(
        &self,
        unit: &UnitRecord,
        resolved: &ResolvedUnit,
        exclusions: &ExclusionSet,
    ) -> ProjectContext {
        ProjectContext::build(
            resolved,
            &unit.unit_references,
            exclusions,
            self.workspace_name,
            &self.output_path,
        )
    }

    /// Render the manifest of `unit` into a pooled buffer owned by the caller.
    pub fn synthesize<'pool>(
        &self,
        unit: &UnitRecord,
        resolved: &ResolvedUnit,
        exclusions: &ExclusionSet,
        pool: &'pool BufferPool,
    ) -> Result<PooledBuffer<'pool>, RenderError> {
        let ctx = self.context(unit, resolved, exclusions).to_tera_context()?;
        self.engine.render_to_buffer(ManifestKind::Project, &ctx, pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::{resolve_unit, ResolveRequest};
    use crate::reference_cache::ReferenceDirectoryCache;
    use manifestor_core::GrowthPolicy;
    use std::path::PathBuf;

    fn render(unit: &UnitRecord, exclusions: &ExclusionSet) -> String {
        let engine = TemplateEngine::new(None).unwrap();
        let pool = BufferPool::new(GrowthPolicy::default());
        let cache = ReferenceDirectoryCache::new(None);
        let request = ResolveRequest {
            workspace_root: std::path::Path::new("/ws"),
            pool: &pool,
            reference_dirs: &cache,
        };
        let resolved = resolve_unit(unit, &request).unwrap();
        let synth = ProjectTextSynthesizer::new(&engine, "Ws", "Temp\\Bin\\Debug\\", &pool).unwrap();
        let buffer = synth.synthesize(unit, &resolved, exclusions, &pool).unwrap();
        String::from_utf8(buffer.to_vec()).unwrap()
    }

    #[test]
    fn no_dependencies_means_no_project_reference_block() {
        let mut unit = UnitRecord::new("Solo");
        unit.source_files = vec![PathBuf::from("Solo.cs")];
        let text = render(&unit, &ExclusionSet::default());
        assert!(!text.contains("<ProjectReference"));
        assert!(!text.contains("<Reference "), "empty reference block is omitted");
        assert!(text.contains("<Compile Include=\"Solo.cs\" />"));
    }

    #[test]
    fn nullable_only_when_resolved() {
        let mut unit = UnitRecord::new("Solo");
        unit.source_files = vec![PathBuf::from("Solo.cs")];
        let text = render(&unit, &ExclusionSet::default());
        assert!(!text.contains("<Nullable>"));
    }

    #[test]
    fn special_characters_are_escaped() {
        let mut unit = UnitRecord::new("R&D");
        unit.source_files = vec![PathBuf::from("Assets/<Gen>/A&B.cs")];
        unit.defines = vec!["A&B".to_string()];
        let text = render(&unit, &ExclusionSet::default());
        assert!(text.contains("<AssemblyName>R&amp;D</AssemblyName>"));
        assert!(text.contains("<Compile Include=\"Assets\\&lt;Gen&gt;\\A&amp;B.cs\" />"));
        assert!(text.contains("<DefineConstants>A&amp;B</DefineConstants>"));
    }
}
