// Copyright (c) 2016-2021 Fabian Schuiki
#![allow(dead_code)]

//! Utilities for verilog tests.

pub use hdldeps_common::Session;
pub use hdldeps_svlog::*;

use hdldeps_common::source::get_source_manager;
use std::cell::Cell;
use std::path::PathBuf;

/// A fresh directory name for virtual files, unique within the test thread.
pub fn unique_dir() -> String {
    thread_local!(static INDEX: Cell<usize> = Cell::new(0));
    let idx = INDEX.with(|i| {
        let v = i.get();
        i.set(v + 1);
        v
    });
    format!("/virtual/svlog_test_{}", idx)
}

/// Add a virtual file and extract its relations, rendered as strings.
pub fn relations(sess: &Session, path: &str, input: &str, dirs: &[PathBuf]) -> Vec<String> {
    let _ = simple_logger::init_with_level(log::Level::Debug);
    let source = get_source_manager().add(path, input);
    let sv = path.ends_with(".sv") || path.ends_with(".svh");
    match extract_relations(sess, source, input, dirs, sv) {
        Ok(rels) => rels.into_iter().map(|r| r.to_string()).collect(),
        Err(e) => panic!("{}", e),
    }
}
