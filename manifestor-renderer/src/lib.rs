//! # manifestor-renderer
//!
//! Turns unit records into manifest text: path resolution and encoding over
//! pooled bounded buffers, stable identifiers, and the tera templates for
//! project, solution and editor-settings files.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use manifestor_core::{ExclusionSet, GrowthPolicy, UnitRecord};
//! use manifestor_renderer::{
//!     resolve_unit, BufferPool, ProjectTextSynthesizer, ReferenceDirectoryCache,
//!     ResolveRequest, TemplateEngine,
//! };
//!
//! fn render(unit: &UnitRecord) -> Result<Vec<u8>, manifestor_renderer::RenderError> {
//!     let engine = TemplateEngine::new(None)?;
//!     let pool = BufferPool::new(GrowthPolicy::default());
//!     let cache = ReferenceDirectoryCache::new(None);
//!     let request = ResolveRequest {
//!         workspace_root: std::path::Path::new("/work/game"),
//!         pool: &pool,
//!         reference_dirs: &cache,
//!     };
//!     let resolved = resolve_unit(unit, &request)?;
//!     let synth = ProjectTextSynthesizer::new(&engine, "Game", "Temp\\Bin\\Debug\\", &pool)?;
//!     let buffer = synth.synthesize(unit, &resolved, &ExclusionSet::default(), &pool)?;
//!     Ok(buffer.to_vec())
//! }
//! ```

pub mod buffer;
pub mod context;
pub mod engine;
pub mod error;
pub mod identifier;
pub mod paths;
pub mod project;
pub mod reference_cache;
pub mod response_file;
pub mod solution;

pub use buffer::{BufferPool, Encoder, PooledBuffer, Separators};
pub use context::{EditorSettingsContext, ProjectContext, SolutionContext};
pub use engine::{ManifestKind, TemplateEngine};
pub use error::RenderError;
pub use identifier::{identifier, Guid, UnitIdentifier};
pub use paths::{resolve_unit, ResolveRequest, ResolvedUnit};
pub use project::ProjectTextSynthesizer;
pub use reference_cache::ReferenceDirectoryCache;
pub use response_file::ResponseFileOptions;
pub use solution::SolutionTextSynthesizer;
