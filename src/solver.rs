// Copyright (c) 2016-2021 Fabian Schuiki

//! The dependency solver. Matches the relations used by each unit against the
//! relations provided by the others and derives the dependency edges and
//! levels that ordering and closure are based on.
//!
//! Solving happens in three phases:
//!
//! 1. The *parse phase* extracts the relations of every unit.
//! 2. The *match phase* resolves every use relation to the units providing it
//!    and adds dependency edges. It requires the relations of all units.
//! 3. The *level phase* assigns each unit its dependency level.

use crate::common::errors::*;
use crate::common::rel::{RelKind, Relation};
use crate::common::Session;
use crate::fileset::Fileset;
use crate::srcfile::SourceUnit;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Solve the dependencies of a fileset.
///
/// Returns the number of use relations that no unit provides. Fails if any of
/// the files cannot be read; all other problems are emitted as diagnostics.
pub fn solve<'a>(sess: &Session, fileset: &Fileset<'a>) -> DiagResult2<usize> {
    let mut units: Vec<_> = fileset.iter().filter(|u| u.is_hdl()).collect();
    units.sort();
    debug!("solving {} units", units.len());

    parse_phase(sess, &units)?;
    let unsatisfied = match_phase(sess, &units);
    level_phase(&units);
    fileset.mark_solved();

    if unsatisfied > 0 {
        info!(
            "solved {} units, {} relations unsatisfied",
            units.len(),
            unsatisfied
        );
    } else {
        info!("all {} units solved", units.len());
    }
    Ok(unsatisfied)
}

/// Extract the relations of all units. Every unit is attempted before an
/// error is returned.
fn parse_phase(sess: &Session, units: &[&SourceUnit]) -> DiagResult2<()> {
    let mut unreadable = Vec::new();
    for unit in units {
        if let Err(diag) = unit.parse_if_needed(sess) {
            sess.emit(diag);
            unreadable.push(unit.to_string());
        }
    }
    if unreadable.is_empty() {
        return Ok(());
    }
    let mut d = DiagBuilder2::error(format!(
        "{} source file{} could not be read",
        unreadable.len(),
        if unreadable.len() == 1 { "" } else { "s" }
    ));
    for path in unreadable {
        d = d.add_note(path);
    }
    Err(d)
}

/// Add dependency edges for every use relation. Returns the number of
/// unsatisfied relations.
fn match_phase<'a>(sess: &Session, units: &[&'a SourceUnit<'a>]) -> usize {
    for unit in units {
        unit.clear_deps();
    }

    // Index the providers of each unit key. `units` is sorted by path, so
    // every provider list is sorted as well.
    let mut providers: HashMap<(&str, RelKind), Vec<&'a SourceUnit<'a>>> = HashMap::new();
    for &unit in units {
        for rel in unit.provides() {
            let list = providers.entry((rel.key(), rel.kind())).or_default();
            if !list.contains(&unit) {
                list.push(unit);
            }
        }
    }

    let mut unsatisfied = 0;
    let mut reported: HashSet<(&Path, &Relation)> = HashSet::new();
    for &unit in units {
        for rel in unit.uses() {
            if sess.is_standard_lib(rel.library()) {
                trace!("{}: skipping `{}` from a standard library", unit, rel);
                continue;
            }
            if !reported.insert((unit.path(), rel)) {
                continue;
            }
            let providing = providers
                .get(&(rel.key(), rel.kind()))
                .map(|v| v.as_slice())
                .unwrap_or(&[]);
            let candidates: Vec<_> = providing.iter().cloned().filter(|&d| d != unit).collect();
            match candidates.len() {
                0 if providing.contains(&unit) => {
                    trace!("{}: `{}` is provided by the unit itself", unit, rel);
                }
                0 => {
                    sess.emit(DiagBuilder2::warning(format!(
                        "unsatisfied relation `{}` in {}",
                        rel, unit
                    )));
                    unsatisfied += 1;
                }
                1 => (),
                n => {
                    let mut d = DiagBuilder2::warning(format!(
                        "relation `{}` in {} is provided by {} files",
                        rel, unit, n
                    ));
                    for c in &candidates {
                        d = d.add_note(c.to_string());
                    }
                    sess.emit(d);
                }
            }
            for dep in candidates {
                trace!("{} depends on {} through `{}`", unit, dep, rel);
                unit.add_dep(dep);
            }
        }
    }
    unsatisfied
}

/// Compute the dependency level of every unit.
fn level_phase<'a>(units: &[&'a SourceUnit<'a>]) {
    for &unit in units {
        compute_level(unit);
    }
}

/// A unit on the depth-first search stack of `compute_level`.
struct Frame<'a> {
    unit: &'a SourceUnit<'a>,
    deps: Vec<&'a SourceUnit<'a>>,
    next: usize,
    level: usize,
}

impl<'a> Frame<'a> {
    fn new(unit: &'a SourceUnit<'a>) -> Frame<'a> {
        Frame {
            unit,
            deps: unit.depends_on(),
            next: 0,
            level: 0,
        }
    }
}

/// Compute the level of a unit and everything it depends on by depth-first
/// search. An edge to a unit that is currently on the search stack counts as
/// an edge to a unit of level 0.
fn compute_level<'a>(root: &'a SourceUnit<'a>) {
    if root.dep_level().is_some() {
        return;
    }
    let mut on_stack: HashSet<&'a Path> = HashSet::new();
    on_stack.insert(root.path());
    let mut stack = vec![Frame::new(root)];
    while let Some(frame) = stack.last_mut() {
        if let Some(&dep) = frame.deps.get(frame.next) {
            frame.next += 1;
            if on_stack.contains(dep.path()) {
                trace!("cycle between {} and {}", frame.unit, dep);
                frame.level = frame.level.max(1);
            } else if let Some(level) = dep.dep_level() {
                frame.level = frame.level.max(level + 1);
            } else {
                on_stack.insert(dep.path());
                stack.push(Frame::new(dep));
            }
            continue;
        }
        let unit = frame.unit;
        let level = frame.level;
        stack.pop();
        on_stack.remove(unit.path());
        unit.set_dep_level(level);
        if let Some(parent) = stack.last_mut() {
            parent.level = parent.level.max(level + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::source::get_source_manager;
    use crate::Arenas;

    fn add<'a>(arenas: &'a Arenas<'a>, fs: &mut Fileset<'a>, path: &str, text: &str) {
        get_source_manager().add(path, text);
        fs.add(arenas.alloc_unit(SourceUnit::new(path)));
    }

    #[test]
    fn chain_levels() {
        let sess = Session::new();
        let arenas = Arenas::new();
        let mut fs = Fileset::new();
        add(&arenas, &mut fs, "/virtual/solver_chain/a.v", "module a; b u(); endmodule");
        add(&arenas, &mut fs, "/virtual/solver_chain/b.v", "module b; c u(); endmodule");
        add(&arenas, &mut fs, "/virtual/solver_chain/c.v", "module c; endmodule");
        assert_eq!(solve(&sess, &fs).unwrap(), 0);
        let level = |p: &str| fs.find(p).unwrap().dep_level();
        assert_eq!(level("/virtual/solver_chain/c.v"), Some(0));
        assert_eq!(level("/virtual/solver_chain/b.v"), Some(1));
        assert_eq!(level("/virtual/solver_chain/a.v"), Some(2));
        assert!(fs.is_solved());
    }

    #[test]
    fn cycle_levels() {
        let sess = Session::new();
        let arenas = Arenas::new();
        let mut fs = Fileset::new();
        add(&arenas, &mut fs, "/virtual/solver_cycle/a.v", "module a; b u(); endmodule");
        add(&arenas, &mut fs, "/virtual/solver_cycle/b.v", "module b; a u(); endmodule");
        assert_eq!(solve(&sess, &fs).unwrap(), 0);
        // The search starts at `a`; the edge from `b` back to `a` counts as
        // level 0.
        let level = |p: &str| fs.find(p).unwrap().dep_level();
        assert_eq!(level("/virtual/solver_cycle/b.v"), Some(1));
        assert_eq!(level("/virtual/solver_cycle/a.v"), Some(2));
    }

    #[test]
    fn long_chains() {
        let sess = Session::new();
        let arenas = Arenas::new();
        let mut fs = Fileset::new();
        const N: usize = 50_000;
        for i in 0..N {
            let text = if i + 1 < N {
                format!("module m{}; m{} u(); endmodule", i, i + 1)
            } else {
                format!("module m{}; endmodule", i)
            };
            add(&arenas, &mut fs, &format!("/virtual/solver_long/m{}.v", i), &text);
        }
        assert_eq!(solve(&sess, &fs).unwrap(), 0);
        let level = |i: usize| {
            fs.find(format!("/virtual/solver_long/m{}.v", i))
                .unwrap()
                .dep_level()
        };
        assert_eq!(level(0), Some(N - 1));
        assert_eq!(level(N - 1), Some(0));
    }

    #[test]
    fn self_provided_relation() {
        let sess = Session::new();
        let arenas = Arenas::new();
        let mut fs = Fileset::new();
        add(
            &arenas,
            &mut fs,
            "/virtual/solver_self/a.vhd",
            "entity a is end; architecture rtl of a is begin end;",
        );
        assert_eq!(solve(&sess, &fs).unwrap(), 0);
        let a = fs.find("/virtual/solver_self/a.vhd").unwrap();
        assert!(a.depends_on().is_empty());
        assert_eq!(a.dep_level(), Some(0));
        assert!(sess.diagnostics().is_empty());
    }

    #[test]
    fn own_declaration_is_not_ambiguous() {
        let sess = Session::new();
        let arenas = Arenas::new();
        let mut fs = Fileset::new();
        add(
            &arenas,
            &mut fs,
            "/virtual/solver_own/a.vhd",
            "package p is end; use work.p.all; entity a is end;",
        );
        add(&arenas, &mut fs, "/virtual/solver_own/b.vhd", "package p is end;");
        assert_eq!(solve(&sess, &fs).unwrap(), 0);
        assert_eq!(sess.count(Severity::Warning), 0);
        let a = fs.find("/virtual/solver_own/a.vhd").unwrap();
        let deps: Vec<_> = a.depends_on().iter().map(|u| u.to_string()).collect();
        assert_eq!(deps, vec!["/virtual/solver_own/b.vhd"]);
    }

    #[test]
    fn standard_libraries_are_skipped() {
        let mut sess = Session::new();
        sess.opts.standard_libs = vec!["ieee".into()];
        let arenas = Arenas::new();
        let mut fs = Fileset::new();
        add(
            &arenas,
            &mut fs,
            "/virtual/solver_std/a.vhd",
            "library IEEE; use ieee.std_logic_1164.all; use work.missing.all; entity a is end;",
        );
        assert_eq!(solve(&sess, &fs).unwrap(), 1);
        assert_eq!(sess.count(Severity::Warning), 1);
    }

    #[test]
    fn unreadable_files_fail_after_parsing_all() {
        let sess = Session::new();
        let arenas = Arenas::new();
        let mut fs = Fileset::new();
        add(&arenas, &mut fs, "/virtual/solver_unreadable/a.v", "module a; endmodule");
        fs.add(arenas.alloc_unit(SourceUnit::new("/virtual/solver_unreadable/gone1.v")));
        fs.add(arenas.alloc_unit(SourceUnit::new("/virtual/solver_unreadable/gone2.v")));
        let err = solve(&sess, &fs).unwrap_err();
        assert_eq!(err.get_message(), "2 source files could not be read");
        assert!(fs.find("/virtual/solver_unreadable/a.v").unwrap().is_parsed());
        assert!(!fs.is_solved());
    }
}
