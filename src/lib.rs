// Copyright (c) 2016-2021 Fabian Schuiki

//! A dependency resolver for hardware description language projects.
//!
//! Source files written in VHDL, Verilog, and SystemVerilog are scanned for
//! the design units they declare and use. The resulting relations are matched
//! across a fileset to compute dependency edges, a build order, and the subset
//! of files a top-level unit needs.
//!
//! ```no_run
//! use hdldeps::*;
//!
//! let sess = Session::new();
//! let arenas = Arenas::new();
//! let mut fileset = Fileset::new();
//! fileset.add(arenas.alloc_unit(SourceUnit::new("/proj/top.vhd")));
//! fileset.add(arenas.alloc_unit(SourceUnit::new("/proj/child.vhd")));
//! solve(&sess, &fileset).expect("unreadable source file");
//! let files = closure(&sess, &fileset, "top");
//! for unit in topological_order(&files, false) {
//!     println!("{}", unit);
//! }
//! ```

#[macro_use]
extern crate log;

// Re-export everything from the common crate.
pub use hdldeps_common as common;
pub use hdldeps_common::*;

// Pull in the language front-ends.
pub use hdldeps_svlog as svlog;
pub use hdldeps_vhdl as vhdl;

pub mod closure;
pub mod fileset;
pub mod makefile;
pub mod order;
pub mod origin;
pub mod solver;
pub mod srcfile;
pub mod tool;

pub use crate::closure::{build_set, closure};
pub use crate::fileset::Fileset;
pub use crate::order::topological_order;
pub use crate::solver::solve;
pub use crate::srcfile::{FileKind, SourceUnit};

use typed_arena::Arena;

/// A collection of arenas that source units are allocated in. Units refer to
/// each other through their dependency edges, so they must outlive every
/// fileset that holds them.
pub struct Arenas<'a> {
    units: Arena<SourceUnit<'a>>,
}

impl<'a> Arenas<'a> {
    /// Create a new collection of arenas.
    pub fn new() -> Arenas<'a> {
        Arenas {
            units: Arena::new(),
        }
    }

    /// Allocate a source unit.
    pub fn alloc_unit(&'a self, unit: SourceUnit<'a>) -> &'a SourceUnit<'a> {
        self.units.alloc(unit)
    }
}

impl<'a> Default for Arenas<'a> {
    fn default() -> Arenas<'a> {
        Arenas::new()
    }
}
