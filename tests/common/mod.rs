// Copyright (c) 2016-2021 Fabian Schuiki
#![allow(dead_code)]

//! Utilities for resolution tests.

pub use hdldeps::*;

use hdldeps::source::get_source_manager;
use std::cell::Cell;

/// A fresh directory name for virtual files, unique within the test thread.
pub fn unique_dir(prefix: &str) -> String {
    thread_local!(static INDEX: Cell<usize> = Cell::new(0));
    let idx = INDEX.with(|i| {
        let v = i.get();
        i.set(v + 1);
        v
    });
    format!("/virtual/{}_{}", prefix, idx)
}

/// Register a virtual source file and add a unit for it to a fileset.
pub fn add<'a>(
    arenas: &'a Arenas<'a>,
    fileset: &mut Fileset<'a>,
    dir: &str,
    name: &str,
    text: &str,
) -> &'a SourceUnit<'a> {
    let _ = simple_logger::init_with_level(log::Level::Debug);
    let path = format!("{}/{}", dir, name);
    get_source_manager().add(&path, text);
    let unit = arenas.alloc_unit(SourceUnit::new(&path));
    fileset.add(unit);
    unit
}

/// The file names of a sequence of units.
pub fn names<'a, I>(units: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a SourceUnit<'a>>,
{
    units
        .into_iter()
        .map(|u| u.path().file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

/// The file names of the units a unit depends on.
pub fn deps(unit: &SourceUnit) -> Vec<String> {
    names(unit.depends_on())
}
