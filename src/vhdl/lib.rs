// Copyright (c) 2016-2021 Fabian Schuiki

//! This crate implements the VHDL relation scanner of the hdldeps dependency
//! resolver. It finds the design units a VHDL file declares and the ones it
//! references, without parsing the file.

#[macro_use]
extern crate log;

pub mod lexer;
pub mod scan;
pub mod token;

use hdldeps_common::errors::DiagResult2;
use hdldeps_common::rel::Relation;
use hdldeps_common::source::Source;

/// Extract the relations of a VHDL source file that is compiled into
/// `library`.
///
/// Returns an error if the text cannot be tokenized, e.g. because of an
/// unterminated string or comment.
pub fn extract_relations(source: Source, text: &str, library: &str) -> DiagResult2<Vec<Relation>> {
    let tokens = lexer::tokenize(source, text)?;
    debug!("{}: {} tokens", source, tokens.len());
    Ok(scan::scan(&tokens, library))
}
