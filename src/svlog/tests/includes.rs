// Copyright (c) 2016-2021 Fabian Schuiki

//! Include resolution across real and virtual files.

mod common;

use crate::common::*;
use hdldeps_common::errors::Severity;
use hdldeps_common::source::get_source_manager;
use std::fs;
use std::path::PathBuf;

#[test]
fn included_declarations_count() {
    let sess = Session::new();
    let dir = unique_dir();
    get_source_manager().add(
        &format!("{}/cells.vh", dir),
        "module cell_a; endmodule\n",
    );
    let rels = relations(
        &sess,
        &format!("{}/top.v", dir),
        "`include \"cells.vh\"\nmodule top; cell_a u0 (); endmodule\n",
        &[],
    );
    assert_eq!(
        rels,
        vec![
            "provide module work.cell_a",
            "provide module work.top",
            "use module work.cell_a",
        ]
    );
}

#[test]
fn include_from_disk() {
    let root = std::env::temp_dir().join("hdldeps-svlog-include-test");
    let inc = root.join("inc");
    fs::create_dir_all(&inc).unwrap();
    fs::write(inc.join("pkg_defs.svh"), "package defs; endpackage\n").unwrap();

    let sess = Session::new();
    let top = format!("{}/top.sv", unique_dir());
    let rels = relations(
        &sess,
        &top,
        "`include <pkg_defs.svh>\nmodule top; import defs::*; endmodule\n",
        &[PathBuf::from("/nonexistent/dir"), inc],
    );
    assert_eq!(
        rels,
        vec![
            "provide package work.defs",
            "provide module work.top",
            "use package work.defs",
        ]
    );
    assert!(sess.diagnostics().is_empty());
}

#[test]
fn missing_include_keeps_scanning() {
    let sess = Session::new();
    let rels = relations(
        &sess,
        &format!("{}/top.v", unique_dir()),
        "`include \"missing.vh\"\nmodule top; endmodule\n",
        &[PathBuf::from("/some/dir")],
    );
    assert_eq!(rels, vec!["provide module work.top"]);
    let diags = sess.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].get_severity(), Severity::Warning);
    assert_eq!(diags[0].get_message(), "cannot find include file `missing.vh`");
    assert_eq!(diags[0].notes().collect::<Vec<_>>(), vec!["searched in /some/dir"]);
}

#[test]
fn malformed_include_is_an_error() {
    let sess = Session::new();
    let dir = unique_dir();
    let sm = get_source_manager();
    sm.add(&format!("{}/bad.vh", dir), "/* never closed\n");
    let input = "`include \"bad.vh\"\nmodule top; endmodule\n";
    let source = sm.add(&format!("{}/top.v", dir), input);
    let err = extract_relations(&sess, source, input, &[], false).unwrap_err();
    assert_eq!(err.get_message(), "unterminated block comment");
}
