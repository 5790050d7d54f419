// Copyright (c) 2016-2021 Fabian Schuiki

//! An ordered collection of source units.

use crate::srcfile::SourceUnit;
use std::cell::Cell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A set of source units that preserves insertion order.
///
/// Units are keyed by path; adding a unit whose path is already present is a
/// no-op. Adding a new unit invalidates a previous solve.
#[derive(Clone, Default)]
pub struct Fileset<'a> {
    units: Vec<&'a SourceUnit<'a>>,
    paths: HashSet<PathBuf>,
    solved: Cell<bool>,
}

impl<'a> Fileset<'a> {
    /// Create an empty fileset.
    pub fn new() -> Fileset<'a> {
        Default::default()
    }

    /// Add a unit. Returns `false` if a unit with the same path is already
    /// part of the set.
    pub fn add(&mut self, unit: &'a SourceUnit<'a>) -> bool {
        if !self.paths.insert(unit.path().to_path_buf()) {
            return false;
        }
        self.units.push(unit);
        self.solved.set(false);
        true
    }

    /// Add all units of another fileset.
    pub fn extend<I>(&mut self, units: I)
    where
        I: IntoIterator<Item = &'a SourceUnit<'a>>,
    {
        for unit in units {
            self.add(unit);
        }
    }

    /// Create a new fileset with the units that match a predicate.
    pub fn filter<F>(&self, mut pred: F) -> Fileset<'a>
    where
        F: FnMut(&SourceUnit<'a>) -> bool,
    {
        let mut result = Fileset::new();
        for &unit in &self.units {
            if pred(unit) {
                result.add(unit);
            }
        }
        result.solved.set(self.solved.get());
        result
    }

    /// The units that take part in dependency resolution.
    pub fn dep_units(&self) -> Fileset<'a> {
        self.filter(|u| u.is_hdl())
    }

    /// The auxiliary units, which carry no relations.
    pub fn aux_units(&self) -> Fileset<'a> {
        self.filter(|u| !u.is_hdl())
    }

    /// Find the unit with the given path.
    pub fn find<P: AsRef<Path>>(&self, path: P) -> Option<&'a SourceUnit<'a>> {
        let path = path.as_ref();
        self.units.iter().cloned().find(|u| u.path() == path)
    }

    pub fn contains(&self, unit: &SourceUnit) -> bool {
        self.paths.contains(unit.path())
    }

    /// Iterate over the units in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &'a SourceUnit<'a>> + '_ {
        self.units.iter().cloned()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Whether the dependency edges of the units reflect the current contents
    /// of the set.
    pub fn is_solved(&self) -> bool {
        self.solved.get()
    }

    pub(crate) fn mark_solved(&self) {
        self.solved.set(true);
    }
}

impl<'a, 'b> IntoIterator for &'b Fileset<'a> {
    type Item = &'a SourceUnit<'a>;
    type IntoIter = std::iter::Cloned<std::slice::Iter<'b, &'a SourceUnit<'a>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter().cloned()
    }
}
