//! Solution text synthesizer: the aggregate workspace manifest and the
//! companion editor settings.

use crate::buffer::{BufferPool, PooledBuffer};
use crate::context::{EditorSettingsContext, SolutionContext};
use crate::engine::{ManifestKind, TemplateEngine};
use crate::error::RenderError;
use crate::identifier::UnitIdentifier;

#[derive(Debug)]
pub struct SolutionTextSynthesizer<'a> {
    engine: &'a TemplateEngine,
}

impl<'a> SolutionTextSynthesizer<'a> {
    pub fn new(engine: &'a TemplateEngine) -> Self {
        SolutionTextSynthesizer { engine }
    }

    /// Render the aggregate manifest. `units` must already be in declaration
    /// order; no sorting happens here.
    pub fn synthesize<'pool>(
        &self,
        units: &[UnitIdentifier],
        pool: &'pool BufferPool,
    ) -> Result<PooledBuffer<'pool>, RenderError> {
        let ctx = SolutionContext::from_identifiers(units).to_tera_context()?;
        self.engine.render_to_buffer(ManifestKind::Solution, &ctx, pool)
    }

    pub fn editor_settings<'pool>(
        &self,
        workspace_name: &str,
        pool: &'pool BufferPool,
    ) -> Result<PooledBuffer<'pool>, RenderError> {
        let ctx = EditorSettingsContext::new(workspace_name)?.to_tera_context()?;
        self.engine.render_to_buffer(ManifestKind::EditorSettings, &ctx, pool)
    }
}
