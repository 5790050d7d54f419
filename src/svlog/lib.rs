// Copyright (c) 2016-2021 Fabian Schuiki

//! This crate implements the Verilog and SystemVerilog relation scanner of the
//! hdldeps dependency resolver.

#[macro_use]
extern crate log;

pub mod cat;
pub mod lexer;
pub mod preproc;
pub mod scan;
pub mod token;

use hdldeps_common::errors::DiagResult2;
use hdldeps_common::rel::Relation;
use hdldeps_common::source::Source;
use hdldeps_common::Session;
use std::path::PathBuf;

/// Extract the relations of a Verilog or SystemVerilog source file.
///
/// Include directives are resolved against the directory of the file and then
/// `include_dirs`. Problems with includes are emitted as warnings through
/// `sess`. Returns an error if the text of the file or one of its includes
/// cannot be tokenized.
pub fn extract_relations(
    sess: &Session,
    source: Source,
    text: &str,
    include_dirs: &[PathBuf],
    system_verilog: bool,
) -> DiagResult2<Vec<Relation>> {
    let tokens = preproc::preprocess(sess, source, text, include_dirs)?;
    debug!("{}: {} tokens after preprocessing", source, tokens.len());
    Ok(scan::scan(&tokens, system_verilog))
}
