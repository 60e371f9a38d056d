//! Sync orchestration: one pass over a snapshot.
//!
//! 1. Resolve the exclusion set once (provenance, then empty units).
//! 2. Start a rayon pool sized by `jobs`.
//! 3. Spawn one task per included unit: resolve → synthesize → transforms →
//!    commit. Each task stores its outcome in the slot at the unit's
//!    declaration index.
//! 4. Walk the slots in declaration order to build the identifier list and
//!    the report, so the aggregate never depends on completion order.
//! 5. Render and commit the aggregate manifest, then the companion settings.
//!    A failed commit of either lands in [`SyncReport::file_failures`].

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use manifestor_core::{ExclusionReason, ExclusionSet, Snapshot, SyncSettings, UnitName, UnitRecord};
use manifestor_renderer::{
    resolve_unit, BufferPool, ManifestKind, ProjectTextSynthesizer, ReferenceDirectoryCache,
    ResolveRequest, SolutionTextSynthesizer, TemplateEngine, UnitIdentifier,
};

use crate::error::SyncError;
use crate::hooks::PostProcessRegistry;
use crate::writer::{write_if_absent, write_if_changed, WriteResult};

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Where rendered manifests go. Called concurrently from worker tasks.
pub trait ManifestSink: Sync {
    fn commit(&self, kind: ManifestKind, path: &Path, content: &[u8])
        -> Result<WriteResult, SyncError>;
}

/// Commits to the filesystem with the write-if-changed policy. The companion
/// settings file is only ever created, never replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskSink {
    pub dry_run: bool,
}

impl ManifestSink for DiskSink {
    fn commit(
        &self,
        kind: ManifestKind,
        path: &Path,
        content: &[u8],
    ) -> Result<WriteResult, SyncError> {
        match kind {
            ManifestKind::EditorSettings => write_if_absent(path, content, self.dry_run),
            ManifestKind::Project | ManifestKind::Solution => {
                write_if_changed(path, content, self.dry_run)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A unit that produced no committed manifest this pass.
#[derive(Debug)]
pub struct UnitFailure {
    pub unit: UnitName,
    pub error: SyncError,
}

/// The aggregate or companion file could not be committed.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: SyncError,
}

/// Outcome of one pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Commits in declaration order, then the aggregate and companion files.
    pub writes: Vec<WriteResult>,
    pub failures: Vec<UnitFailure>,
    pub file_failures: Vec<FileFailure>,
    /// Units listed in the aggregate manifest, in declaration order.
    pub generated: Vec<UnitIdentifier>,
    pub excluded: Vec<(UnitName, ExclusionReason)>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.file_failures.is_empty()
    }

    pub fn written(&self) -> usize {
        self.writes
            .iter()
            .filter(|w| matches!(w, WriteResult::Written { .. }))
            .count()
    }

    fn record_commit(&mut self, path: &Path, result: Result<WriteResult, SyncError>) {
        match result {
            Ok(write) => self.writes.push(write),
            Err(error) => {
                tracing::warn!("{}: {}", path.display(), error);
                self.file_failures.push(FileFailure {
                    path: path.to_path_buf(),
                    error,
                });
            }
        }
    }
}

enum UnitOutcome {
    Committed { id: UnitIdentifier, write: WriteResult },
    CommitFailed { id: UnitIdentifier, error: SyncError },
    Failed { error: SyncError },
}

// ---------------------------------------------------------------------------
// SyncEngine
// ---------------------------------------------------------------------------

/// Long-lived engine state: templates, buffer pool, reference cache and
/// registered transforms. Build once, run many passes.
#[derive(Debug)]
pub struct SyncEngine {
    settings: SyncSettings,
    templates: TemplateEngine,
    pool: BufferPool,
    reference_dirs: ReferenceDirectoryCache,
    hooks: PostProcessRegistry,
}

impl SyncEngine {
    pub fn new(settings: SyncSettings) -> Result<Self, SyncError> {
        let templates = TemplateEngine::new(settings.template_dir.as_deref())?;
        let pool = BufferPool::new(settings.buffer);
        let reference_dirs = ReferenceDirectoryCache::new(settings.framework_root.clone());
        Ok(SyncEngine {
            settings,
            templates,
            pool,
            reference_dirs,
            hooks: PostProcessRegistry::new(),
        })
    }

    pub fn with_hooks(mut self, hooks: PostProcessRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn hooks_mut(&mut self) -> &mut PostProcessRegistry {
        &mut self.hooks
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Forget cached system reference directories.
    pub fn invalidate_reference_cache(&self) {
        self.reference_dirs.invalidate();
    }

    /// Run one pass, committing to disk.
    pub fn run(&self, snapshot: &Snapshot, dry_run: bool) -> Result<SyncReport, SyncError> {
        self.run_with_sink(snapshot, &DiskSink { dry_run })
    }

    /// Run one pass with a caller-provided sink.
    ///
    /// Per-unit failures end up in [`SyncReport::failures`] and failed
    /// commits of the aggregate files in [`SyncReport::file_failures`]. An
    /// invalid snapshot, worker pool start-up and rendering of the aggregate
    /// files are fatal.
    pub fn run_with_sink<S: ManifestSink>(
        &self,
        snapshot: &Snapshot,
        sink: &S,
    ) -> Result<SyncReport, SyncError> {
        let settings = &self.settings;
        let units = &snapshot.units;
        manifestor_core::snapshot::validate(snapshot)?;

        let mut exclusions = ExclusionSet::resolve(units, settings.enabled_provenance);
        exclusions.exclude_units_without_sources(units);

        let mut report = SyncReport::default();
        for unit in units {
            if let Some(reason) = exclusions.reason(&unit.name) {
                tracing::debug!("skipping {}: {}", unit.name, reason);
                report.excluded.push((unit.name.clone(), reason));
            }
        }

        let workers = build_worker_pool(settings.jobs)?;
        let project_synth = ProjectTextSynthesizer::new(
            &self.templates,
            &settings.workspace_name,
            &settings.output_path,
            &self.pool,
        )?;
        let request = ResolveRequest {
            workspace_root: &settings.workspace_root,
            pool: &self.pool,
            reference_dirs: &self.reference_dirs,
        };

        let slots: Vec<OnceLock<UnitOutcome>> = units.iter().map(|_| OnceLock::new()).collect();
        {
            let exclusions = &exclusions;
            let request = &request;
            let project_synth = &project_synth;
            let slots = &slots;
            workers.scope(|scope| {
                for (index, unit) in units.iter().enumerate() {
                    if exclusions.contains(&unit.name) {
                        continue;
                    }
                    scope.spawn(move |_| {
                        let outcome =
                            self.process_unit(unit, exclusions, request, project_synth, sink);
                        let first = slots[index].set(outcome).is_ok();
                        debug_assert!(first, "slot {index} written twice");
                    });
                }
            });
        }

        for (unit, slot) in units.iter().zip(slots) {
            let Some(outcome) = slot.into_inner() else {
                continue;
            };
            match outcome {
                UnitOutcome::Committed { id, write } => {
                    report.generated.push(id);
                    report.writes.push(write);
                }
                UnitOutcome::CommitFailed { id, error } => {
                    tracing::warn!("{}: {}", unit.name, error);
                    report.generated.push(id);
                    report.failures.push(UnitFailure {
                        unit: unit.name.clone(),
                        error,
                    });
                }
                UnitOutcome::Failed { error } => {
                    tracing::warn!("{}: {}", unit.name, error);
                    report.failures.push(UnitFailure {
                        unit: unit.name.clone(),
                        error,
                    });
                }
            }
        }

        let solution_synth = SolutionTextSynthesizer::new(&self.templates);
        let solution_path = settings.solution_path();
        let mut solution = solution_synth.synthesize(&report.generated, &self.pool)?;
        self.hooks
            .apply(ManifestKind::Solution, &solution_path, &mut solution)?;
        report.record_commit(
            &solution_path,
            sink.commit(ManifestKind::Solution, &solution_path, solution.as_bytes()),
        );

        if settings.companion_settings {
            let path = ManifestKind::editor_settings_path(&settings.workspace_root);
            let mut companion = solution_synth.editor_settings(&settings.workspace_name, &self.pool)?;
            self.hooks
                .apply(ManifestKind::EditorSettings, &path, &mut companion)?;
            report.record_commit(
                &path,
                sink.commit(ManifestKind::EditorSettings, &path, companion.as_bytes()),
            );
        }

        tracing::info!(
            "sync: {} generated, {} excluded, {} written, {} failed",
            report.generated.len(),
            report.excluded.len(),
            report.written(),
            report.failures.len() + report.file_failures.len()
        );
        Ok(report)
    }

    fn process_unit<S: ManifestSink>(
        &self,
        unit: &UnitRecord,
        exclusions: &ExclusionSet,
        request: &ResolveRequest<'_>,
        project_synth: &ProjectTextSynthesizer<'_>,
        sink: &S,
    ) -> UnitOutcome {
        let id = UnitIdentifier::new(&self.settings.workspace_name, &unit.name);
        let path = self.settings.project_path(unit.name.as_str());

        let rendered = resolve_unit(unit, request)
            .and_then(|resolved| project_synth.synthesize(unit, &resolved, exclusions, &self.pool))
            .and_then(|mut buffer| {
                self.hooks.apply(ManifestKind::Project, &path, &mut buffer)?;
                Ok(buffer)
            });
        let buffer = match rendered {
            Ok(buffer) => buffer,
            Err(error) => {
                return UnitOutcome::Failed {
                    error: error.into(),
                }
            }
        };

        match sink.commit(ManifestKind::Project, &path, buffer.as_bytes()) {
            Ok(write) => UnitOutcome::Committed { id, write },
            Err(error) => UnitOutcome::CommitFailed { id, error },
        }
    }
}

fn build_worker_pool(jobs: Option<usize>) -> Result<rayon::ThreadPool, SyncError> {
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("manifestor-worker-{i}"));
    if let Some(jobs) = jobs {
        builder = builder.num_threads(jobs);
    }
    Ok(builder.build()?)
}
