//! Units that get no manifest in the current pass.
//!
//! Computed once per pass, before any per-unit work is scheduled, and only
//! read afterwards.

use std::collections::HashMap;
use std::fmt;

use crate::types::{Provenance, ProvenanceMask, UnitName, UnitRecord};

/// Why a unit was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Its provenance category is not enabled.
    Provenance(Provenance),
    /// It has no source files.
    NoSources,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::Provenance(p) => write!(f, "{p} units disabled"),
            ExclusionReason::NoSources => write!(f, "no source files"),
        }
    }
}

/// Set of unit names excluded from manifest generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    excluded: HashMap<UnitName, ExclusionReason>,
}

impl ExclusionSet {
    /// Exclude every unit whose provenance category is not in `enabled`.
    ///
    /// Units without a provenance are never excluded here.
    pub fn resolve(units: &[UnitRecord], enabled: ProvenanceMask) -> Self {
        let excluded = units
            .iter()
            .filter_map(|unit| {
                let provenance = unit.provenance?;
                (!enabled.contains(provenance))
                    .then(|| (unit.name.clone(), ExclusionReason::Provenance(provenance)))
            })
            .collect();
        ExclusionSet { excluded }
    }

    /// Also exclude units with zero source files. A unit already excluded by
    /// provenance keeps that reason.
    pub fn exclude_units_without_sources(&mut self, units: &[UnitRecord]) {
        for unit in units.iter().filter(|u| !u.has_sources()) {
            self.excluded
                .entry(unit.name.clone())
                .or_insert(ExclusionReason::NoSources);
        }
    }

    pub fn contains(&self, name: &UnitName) -> bool {
        self.excluded.contains_key(name)
    }

    pub fn reason(&self, name: &UnitName) -> Option<ExclusionReason> {
        self.excluded.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn unit(name: &str, provenance: Option<Provenance>) -> UnitRecord {
        let mut u = UnitRecord::new(name);
        u.provenance = provenance;
        u.source_files.push(PathBuf::from(format!("{name}.cs")));
        u
    }

    #[test]
    fn disabled_category_is_excluded() {
        let units = vec![
            unit("Registry.Pkg", Some(Provenance::Registry)),
            unit("Embedded.Pkg", Some(Provenance::Embedded)),
        ];
        let set = ExclusionSet::resolve(&units, ProvenanceMask::default());
        assert!(set.contains(&UnitName::from("Registry.Pkg")));
        assert!(!set.contains(&UnitName::from("Embedded.Pkg")));
        assert_eq!(
            set.reason(&UnitName::from("Registry.Pkg")),
            Some(ExclusionReason::Provenance(Provenance::Registry))
        );
    }

    #[test]
    fn units_without_provenance_are_never_excluded() {
        let units = vec![unit("Assembly-CSharp", None)];
        let set = ExclusionSet::resolve(&units, ProvenanceMask::NONE);
        assert!(set.is_empty());
    }

    #[test]
    fn empty_units_are_added_without_overriding_provenance_reason() {
        let mut empty_registry = UnitRecord::new("Empty.Registry");
        empty_registry.provenance = Some(Provenance::Registry);
        let units = vec![empty_registry, UnitRecord::new("Empty"), unit("Full", None)];

        let mut set = ExclusionSet::resolve(&units, ProvenanceMask::default());
        set.exclude_units_without_sources(&units);

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.reason(&UnitName::from("Empty.Registry")),
            Some(ExclusionReason::Provenance(Provenance::Registry))
        );
        assert_eq!(
            set.reason(&UnitName::from("Empty")),
            Some(ExclusionReason::NoSources)
        );
        assert!(!set.contains(&UnitName::from("Full")));
    }
}
