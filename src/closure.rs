// Copyright (c) 2016-2021 Fabian Schuiki

//! Extraction of the files a top-level unit needs.

use crate::common::errors::*;
use crate::common::rel::{RelKind, Relation};
use crate::common::Session;
use crate::fileset::Fileset;
use crate::solver::solve;
use crate::srcfile::SourceUnit;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Compute the subset of a fileset that the unit `top` transitively depends
/// on, including the file that declares `top`.
///
/// `top` names a VHDL entity or a Verilog module in the `work` library. If no
/// file declares it, a critical diagnostic is emitted and the entire fileset
/// is returned. The fileset is solved first if necessary. The result keeps
/// the insertion order of `fileset`.
///
/// The result may be larger than the set of units reachable over
/// `depends_on` edges. Every architecture and package body whose primary
/// unit is reached is added as well, together with its own dependencies.
pub fn closure<'a>(sess: &Session, fileset: &Fileset<'a>, top: &str) -> Fileset<'a> {
    if !fileset.is_solved() {
        if let Err(diag) = solve(sess, fileset) {
            sess.emit(diag);
            return fileset.clone();
        }
    }

    let candidates = [
        Relation::require("work", &top.to_lowercase(), RelKind::Entity),
        Relation::require("work", top, RelKind::Module),
    ];
    let top_unit = fileset
        .iter()
        .filter(|u| u.is_hdl())
        .find(|u| candidates.iter().any(|c| u.satisfies(c)));
    let top_unit = match top_unit {
        Some(u) => u,
        None => {
            sess.emit(
                DiagBuilder2::critical(format!("top level unit `{}` not found", top))
                    .add_note("no file declares an entity or module of that name")
                    .add_note("continuing with all files"),
            );
            return fileset.clone();
        }
    };
    debug!("top level unit `{}` is declared in {}", top, top_unit);

    // Secondary units that complete a primary unit, keyed by the primary.
    let mut secondaries: HashMap<&str, Vec<&'a SourceUnit<'a>>> = HashMap::new();
    for unit in fileset.iter().filter(|u| u.is_hdl()) {
        for rel in unit.provides() {
            if rel.kind() == RelKind::Architecture {
                secondaries.entry(rel.key()).or_default().push(unit);
            }
        }
    }

    let mut visited: HashSet<&'a Path> = HashSet::new();
    let mut pending = vec![top_unit];
    while let Some(unit) = pending.pop() {
        if !visited.insert(unit.path()) {
            continue;
        }
        trace!("closure enters {}", unit);
        pending.extend(unit.depends_on());
        for rel in unit.provides().filter(|r| r.kind().is_primary()) {
            if let Some(units) = secondaries.get(rel.key()) {
                pending.extend(units.iter().cloned());
            }
        }
    }

    let result = fileset.filter(|u| visited.contains(u.path()));
    debug!(
        "closure of `{}` keeps {} of {} files",
        top,
        result.len(),
        fileset.len()
    );
    result
}

/// Compute the files needed to build the unit `top`. These are the closure of
/// `top` plus all auxiliary files, in the insertion order of `fileset`.
pub fn build_set<'a>(sess: &Session, fileset: &Fileset<'a>, top: &str) -> Fileset<'a> {
    let needed = closure(sess, fileset, top);
    fileset.filter(|u| !u.is_hdl() || needed.contains(u))
}
