// Copyright (c) 2016-2021 Fabian Schuiki

//! Dependency resolution across whole filesets.

mod common;
use common::*;
use hdldeps::errors::*;

#[test]
fn levels_follow_dependencies() {
    let sess = Session::new();
    let arenas = Arenas::new();
    let mut fs = Fileset::new();
    let dir = unique_dir("levels");
    let pkg = add(&arenas, &mut fs, &dir, "pkg.vhd", "package pkg is end package;");
    let leaf = add(
        &arenas,
        &mut fs,
        &dir,
        "leaf.vhd",
        "use work.pkg.all; entity leaf is end; architecture rtl of leaf is begin end;",
    );
    let top = add(
        &arenas,
        &mut fs,
        &dir,
        "top.vhd",
        "use work.pkg.all;\n\
         entity top is end;\n\
         architecture rtl of top is begin\n\
           u0: entity work.leaf;\n\
         end;",
    );
    assert_eq!(solve(&sess, &fs).unwrap(), 0);
    assert_eq!(pkg.dep_level(), Some(0));
    assert_eq!(leaf.dep_level(), Some(1));
    assert_eq!(top.dep_level(), Some(2));
    assert_eq!(deps(top), vec!["leaf.vhd", "pkg.vhd"]);
    for unit in &fs {
        for dep in unit.depends_on() {
            assert!(unit.dep_level() > dep.dep_level() || dep.depends_on().contains(&unit));
        }
    }
}

#[test]
fn cycles_count_as_level_zero() {
    let sess = Session::new();
    let arenas = Arenas::new();
    let mut fs = Fileset::new();
    let dir = unique_dir("cycle");
    let a = add(&arenas, &mut fs, &dir, "a.v", "module a; b i(); endmodule");
    let b = add(&arenas, &mut fs, &dir, "b.v", "module b; c i(); endmodule");
    let c = add(&arenas, &mut fs, &dir, "c.v", "module c; a i(); endmodule");
    assert_eq!(solve(&sess, &fs).unwrap(), 0);
    // The search enters at `a`, the first unit by path. The edge from `c`
    // back to `a` is cut.
    assert_eq!(c.dep_level(), Some(1));
    assert_eq!(b.dep_level(), Some(2));
    assert_eq!(a.dep_level(), Some(3));
}

#[test]
fn solving_twice_yields_the_same_result() {
    let sess = Session::new();
    let arenas = Arenas::new();
    let mut fs = Fileset::new();
    let dir = unique_dir("idempotent");
    let top = add(&arenas, &mut fs, &dir, "top.sv", "module top; mid m(); nope n(); endmodule");
    let mid = add(&arenas, &mut fs, &dir, "mid.sv", "module mid; endmodule");
    let first = solve(&sess, &fs).unwrap();
    let first_deps = deps(top);
    let levels = (top.dep_level(), mid.dep_level());
    let second = solve(&sess, &fs).unwrap();
    assert_eq!(first, 1);
    assert_eq!(first, second);
    assert_eq!(deps(top), first_deps);
    assert_eq!((top.dep_level(), mid.dep_level()), levels);
}

#[test]
fn no_unit_depends_on_itself() {
    let sess = Session::new();
    let arenas = Arenas::new();
    let mut fs = Fileset::new();
    let dir = unique_dir("self");
    let unit = add(
        &arenas,
        &mut fs,
        &dir,
        "all.vhd",
        "package p is end; package body p is end;\n\
         use work.p.all; entity e is end; architecture a of e is begin end;",
    );
    assert_eq!(solve(&sess, &fs).unwrap(), 0);
    assert!(unit.depends_on().is_empty());
    assert_eq!(unit.dep_level(), Some(0));
}

#[test]
fn closure_keeps_exactly_what_is_needed() {
    let sess = Session::new();
    let arenas = Arenas::new();
    let mut fs = Fileset::new();
    let dir = unique_dir("closure");
    add(&arenas, &mut fs, &dir, "a.v", "module A; B b(); endmodule");
    add(&arenas, &mut fs, &dir, "b.v", "module B; endmodule");
    add(&arenas, &mut fs, &dir, "c.v", "module C; B b(); endmodule");
    solve(&sess, &fs).unwrap();
    let result = closure(&sess, &fs, "A");
    assert_eq!(names(&result), vec!["a.v", "b.v"]);
    assert!(sess.diagnostics().is_empty());
}

#[test]
fn closure_without_top_fails_open() {
    let sess = Session::new();
    let arenas = Arenas::new();
    let mut fs = Fileset::new();
    let dir = unique_dir("failopen");
    add(&arenas, &mut fs, &dir, "a.v", "module A; endmodule");
    add(&arenas, &mut fs, &dir, "b.vhd", "entity b is end;");
    solve(&sess, &fs).unwrap();
    let result = closure(&sess, &fs, "missing");
    assert_eq!(names(&result), names(&fs));
    assert_eq!(sess.count(Severity::Critical), 1);
    assert_eq!(sess.count(Severity::Error), 0);
}

#[test]
fn ambiguous_relations_warn_once() {
    let sess = Session::new();
    let arenas = Arenas::new();
    let mut fs = Fileset::new();
    let dir = unique_dir("ambiguous");
    let top = add(
        &arenas,
        &mut fs,
        &dir,
        "top.v",
        "module top; dup a(); dup b(); endmodule",
    );
    add(&arenas, &mut fs, &dir, "z_dup.v", "module dup; endmodule");
    add(&arenas, &mut fs, &dir, "a_dup.v", "module dup; endmodule");
    assert_eq!(solve(&sess, &fs).unwrap(), 0);

    let warnings: Vec<_> = sess
        .diagnostics()
        .into_iter()
        .filter(|d| d.get_severity() == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].get_message().contains("provided by 2 files"));
    let notes: Vec<_> = warnings[0].notes().map(String::from).collect();
    assert_eq!(notes, vec![format!("{}/a_dup.v", dir), format!("{}/z_dup.v", dir)]);
    assert_eq!(deps(top), vec!["a_dup.v", "z_dup.v"]);
}

#[test]
fn order_breaks_ties_by_path() {
    let sess = Session::new();
    let arenas = Arenas::new();
    let mut fs = Fileset::new();
    let dir = unique_dir("order");
    add(&arenas, &mut fs, &dir, "top.v", "module top; b x(); A y(); endmodule");
    add(&arenas, &mut fs, &dir, "b.v", "module b; endmodule");
    add(&arenas, &mut fs, &dir, "A.v", "module A; endmodule");
    add(&arenas, &mut fs, &dir, "pins.xdc", "");
    solve(&sess, &fs).unwrap();

    let forward = names(topological_order(&fs, false));
    assert_eq!(forward, vec!["pins.xdc", "A.v", "b.v", "top.v"]);
    let mut backward = names(topological_order(&fs, true));
    backward.reverse();
    assert_eq!(backward, forward);
}

#[test]
fn unsatisfied_relations_are_counted() {
    let mut sess = Session::new();
    sess.opts.standard_libs = DEFAULT_STANDARD_LIBS.iter().map(|s| s.to_string()).collect();
    let arenas = Arenas::new();
    let mut fs = Fileset::new();
    let dir = unique_dir("unsatisfied");
    add(
        &arenas,
        &mut fs,
        &dir,
        "a.vhd",
        "library ieee; use ieee.std_logic_1164.all;\n\
         use work.missing_pkg.all;\n\
         entity a is end;\n\
         architecture rtl of a is begin\n\
           x: entity work.gone;\n\
           y: entity work.gone;\n\
         end;",
    );
    add(&arenas, &mut fs, &dir, "b.v", "module b; lost l(); endmodule");
    assert_eq!(solve(&sess, &fs).unwrap(), 3);
    assert_eq!(sess.count(Severity::Warning), 3);
}

#[test]
fn removing_a_provider_unsatisfies_its_users() {
    let sess = Session::new();
    let arenas = Arenas::new();
    let mut fs = Fileset::new();
    let dir = unique_dir("removal");
    add(&arenas, &mut fs, &dir, "top.v", "module top; mid m(); leaf l(); endmodule");
    add(&arenas, &mut fs, &dir, "mid.v", "module mid; leaf a(); leaf b(); endmodule");
    let leaf = add(&arenas, &mut fs, &dir, "leaf.v", "module leaf; endmodule");
    add(&arenas, &mut fs, &dir, "pkg.vhd", "package p is end;");
    add(&arenas, &mut fs, &dir, "user.vhd", "use work.p.all; entity user is end;");
    assert_eq!(solve(&sess, &fs).unwrap(), 0);

    let satisfied_by_leaf = fs
        .iter()
        .filter(|u| u != &leaf)
        .map(|u| u.uses().filter(|r| leaf.satisfies(r)).count())
        .sum::<usize>();
    assert_eq!(satisfied_by_leaf, 2);

    let without = fs.filter(|u| u != leaf);
    assert_eq!(solve(&sess, &without).unwrap(), satisfied_by_leaf);
    assert!(without.find(leaf.path()).is_none());
}

#[test]
fn scan_errors_are_isolated() {
    let sess = Session::new();
    let arenas = Arenas::new();
    let mut fs = Fileset::new();
    let dir = unique_dir("isolated");
    let bad = add(&arenas, &mut fs, &dir, "bad.vhd", "entity bad is end; constant c : string := \"oops");
    let good = add(&arenas, &mut fs, &dir, "good.v", "module good; endmodule");
    assert_eq!(solve(&sess, &fs).unwrap(), 0);
    assert!(bad.parse_error().is_some());
    assert!(bad.relations().is_empty());
    assert!(good.parse_error().is_none());
    assert_eq!(good.provides().count(), 1);
    assert_eq!(sess.count(Severity::Error), 1);
}

#[test]
fn build_set_keeps_auxiliary_files() {
    let sess = Session::new();
    let arenas = Arenas::new();
    let mut fs = Fileset::new();
    let dir = unique_dir("build_set");
    add(&arenas, &mut fs, &dir, "pins.xdc", "");
    add(&arenas, &mut fs, &dir, "top.vhd", "entity top is end; architecture a of top is begin end;");
    add(&arenas, &mut fs, &dir, "other.vhd", "entity other is end;");
    // Not solved beforehand; the closure solves lazily.
    let result = build_set(&sess, &fs, "top");
    assert_eq!(names(&result), vec!["pins.xdc", "top.vhd"]);
}
