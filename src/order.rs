// Copyright (c) 2016-2021 Fabian Schuiki

//! Build ordering of a solved fileset.

use crate::fileset::Fileset;
use crate::srcfile::SourceUnit;

/// Order the units of a solved fileset such that every unit comes after the
/// units it depends on.
///
/// Auxiliary units come first in insertion order, followed by the HDL units
/// by ascending dependency level. Units on the same level are ordered by their
/// lower-cased path. If `reverse` is set, the entire sequence is reversed.
///
/// # Panics
///
/// Panics if an HDL unit has not been solved.
pub fn topological_order<'a>(fileset: &Fileset<'a>, reverse: bool) -> Vec<&'a SourceUnit<'a>> {
    let mut deps: Vec<_> = fileset.iter().filter(|u| u.is_hdl()).collect();
    deps.sort_by_cached_key(|u| {
        let level = match u.dep_level() {
            Some(l) => l,
            None => panic!("dependency level of {} requested before solving", u),
        };
        (level, u.path().to_string_lossy().to_lowercase())
    });
    let mut order: Vec<_> = fileset.iter().filter(|u| !u.is_hdl()).collect();
    order.extend(deps);
    if reverse {
        order.reverse();
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::source::get_source_manager;
    use crate::common::Session;
    use crate::solver::solve;
    use crate::Arenas;

    fn names(units: &[&SourceUnit]) -> Vec<String> {
        units
            .iter()
            .map(|u| u.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn levels_then_paths() {
        let sess = Session::new();
        let arenas = Arenas::new();
        let mut fs = Fileset::new();
        let sm = get_source_manager();
        sm.add("/virtual/order/top.v", "module top; mid u(); Leaf v(); endmodule");
        sm.add("/virtual/order/mid.v", "module mid; endmodule");
        sm.add("/virtual/order/Leaf.v", "module Leaf; endmodule");
        for p in &["/virtual/order/top.v", "/virtual/order/pins.xdc", "/virtual/order/mid.v"] {
            fs.add(arenas.alloc_unit(SourceUnit::new(p)));
        }
        fs.add(arenas.alloc_unit(SourceUnit::new("/virtual/order/Leaf.v")));
        fs.add(arenas.alloc_unit(SourceUnit::new("/virtual/order/run.tcl")));
        solve(&sess, &fs).unwrap();

        let order = topological_order(&fs, false);
        assert_eq!(names(&order), vec!["pins.xdc", "run.tcl", "Leaf.v", "mid.v", "top.v"]);
        let order = topological_order(&fs, true);
        assert_eq!(names(&order), vec!["top.v", "mid.v", "Leaf.v", "run.tcl", "pins.xdc"]);
    }

    #[test]
    #[should_panic(expected = "requested before solving")]
    fn unsolved_units_panic() {
        let arenas = Arenas::new();
        let mut fs = Fileset::new();
        fs.add(arenas.alloc_unit(SourceUnit::new("/virtual/order_unsolved/a.v")));
        topological_order(&fs, false);
    }
}
